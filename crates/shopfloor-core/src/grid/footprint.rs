//! Footprint calculation: which cells a placement covers.
//!
//! Pure functions over `GridBounds`; no occupancy knowledge.

use crate::components::{Cell, Size2};

/// Half-open lattice bounds `[-width/2, width/2) x [-length/2, length/2)`.
///
/// Integer halving means an even dimension has one more negative index than
/// positive ones (width 10 gives x in -5..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub width: i32,
    pub length: i32,
}

impl GridBounds {
    pub fn new(width: i32, length: i32) -> Self {
        Self { width, length }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let half_width = self.width / 2;
        let half_length = self.length / 2;
        cell.x >= -half_width && cell.x < half_width && cell.z >= -half_length && cell.z < half_length
    }

    /// Number of addressable cells.
    pub fn cell_count(&self) -> usize {
        let half_width = self.width / 2;
        let half_length = self.length / 2;
        (2 * half_width.max(0)) as usize * (2 * half_length.max(0)) as usize
    }
}

/// Wrap any angle into `[0, 360)`.
pub fn normalize_rotation(rotation_degrees: i32) -> i32 {
    rotation_degrees.rem_euclid(360)
}

/// Planar offset of footprint cell `(x, y)` under `rotation_degrees`.
///
/// Square footprints ignore rotation. Rectangles use a fixed table: 0 and 270
/// keep the offset, 180 mirrors x, 90 mirrors the length axis. 270 is not the
/// mirror of 90; the catalog's rectangular pieces are authored for this.
fn rotated_offset(size: Size2, rotation_degrees: i32, x: i32, y: i32) -> (i32, i32) {
    if size.is_square() {
        return (x, y);
    }
    match normalize_rotation(rotation_degrees) {
        180 => (-x, y),
        90 => (x, -y),
        _ => (x, y),
    }
}

/// Cells covered by `size` anchored at `anchor` with the given rotation.
///
/// The anchor is always element 0. Returns an empty vec as soon as any cell
/// falls outside `bounds` or off the `i32` lattice; a partial footprint is
/// never returned.
pub fn footprint(bounds: GridBounds, anchor: Cell, size: Size2, rotation_degrees: i32) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(size.area().max(0) as usize);
    for x in 0..size.width {
        for y in 0..size.length {
            let (dx, dz) = rotated_offset(size, rotation_degrees, x, y);
            match anchor.checked_offset(dx, dz) {
                Some(cell) if bounds.contains(cell) => cells.push(cell),
                _ => return Vec::new(),
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> GridBounds {
        GridBounds::new(10, 10)
    }

    fn planar(cells: &[Cell]) -> Vec<(i32, i32)> {
        cells.iter().map(|c| (c.x, c.z)).collect()
    }

    #[test]
    fn test_bounds_half_open() {
        let b = bounds();
        assert!(b.contains(Cell::new(-5, -5)));
        assert!(b.contains(Cell::new(4, 4)));
        assert!(!b.contains(Cell::new(5, 0)));
        assert!(!b.contains(Cell::new(0, 5)));
        assert!(!b.contains(Cell::new(-6, 0)));
        assert_eq!(b.cell_count(), 100);
    }

    #[test]
    fn test_odd_dimensions_truncate() {
        let b = GridBounds::new(9, 3);
        assert!(b.contains(Cell::new(-4, -1)));
        assert!(!b.contains(Cell::new(4, 0)));
        assert!(!b.contains(Cell::new(0, 1)));
        assert_eq!(b.cell_count(), 16);
    }

    #[test]
    fn test_square_ignores_rotation() {
        for rotation in [0, 90, 180, 270] {
            let cells = footprint(bounds(), Cell::ZERO, Size2::new(2, 2), rotation);
            assert_eq!(planar(&cells), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        }
    }

    #[test]
    fn test_rectangle_rotation_table() {
        let tall = Size2::new(1, 2);
        assert_eq!(planar(&footprint(bounds(), Cell::ZERO, tall, 0)), vec![(0, 0), (0, 1)]);
        assert_eq!(planar(&footprint(bounds(), Cell::ZERO, tall, 270)), vec![(0, 0), (0, 1)]);
        assert_eq!(planar(&footprint(bounds(), Cell::ZERO, tall, 90)), vec![(0, 0), (0, -1)]);
        assert_eq!(planar(&footprint(bounds(), Cell::ZERO, tall, 180)), vec![(0, 0), (0, 1)]);

        let wide = Size2::new(2, 1);
        assert_eq!(planar(&footprint(bounds(), Cell::ZERO, wide, 180)), vec![(0, 0), (-1, 0)]);
    }

    #[test]
    fn test_rotation_is_normalized() {
        let wide = Size2::new(2, 1);
        assert_eq!(
            footprint(bounds(), Cell::ZERO, wide, -180),
            footprint(bounds(), Cell::ZERO, wide, 180)
        );
        assert_eq!(
            footprint(bounds(), Cell::ZERO, wide, 450),
            footprint(bounds(), Cell::ZERO, wide, 90)
        );
        assert_eq!(normalize_rotation(-90), 270);
    }

    #[test]
    fn test_out_of_bounds_is_all_or_nothing() {
        let cells = footprint(bounds(), Cell::new(4, 0), Size2::new(2, 1), 0);
        assert!(cells.is_empty());
        let cells = footprint(bounds(), Cell::new(0, -5), Size2::new(1, 2), 90);
        assert!(cells.is_empty());
    }

    #[test]
    fn test_anchor_at_lattice_edge_is_rejected() {
        let huge = GridBounds::new(i32::MAX, i32::MAX);
        assert!(footprint(huge, Cell::new(i32::MAX, 0), Size2::new(2, 1), 0).is_empty());
        assert!(footprint(huge, Cell::new(i32::MIN, 0), Size2::new(2, 1), 180).is_empty());
        assert!(footprint(huge, Cell::new(0, i32::MIN), Size2::new(1, 2), 90).is_empty());
        assert!(footprint(bounds(), Cell::new(i32::MAX, i32::MAX), Size2::new(3, 3), 0).is_empty());
    }

    #[test]
    fn test_cell_count_matches_area() {
        for (w, l) in [(1, 1), (1, 3), (2, 3), (4, 2)] {
            for rotation in [0, 90, 180, 270] {
                let size = Size2::new(w, l);
                let cells = footprint(bounds(), Cell::new(-1, 1), size, rotation);
                assert_eq!(cells.len() as i32, size.area());
                assert_eq!(cells[0], Cell::new(-1, 1));
            }
        }
    }
}

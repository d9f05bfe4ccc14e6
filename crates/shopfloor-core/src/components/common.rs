//! Common value types shared by the grid, the scene and persistence.

use serde::{Deserialize, Serialize};

/// Integer lattice coordinate.
///
/// Occupancy only looks at the planar `x`/`z` pair; `y` is carried so that
/// cells round-trip through save files unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Cell on the ground plane.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, y: 0, z }
    }

    pub fn with_height(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Offset along the planar axes, or `None` if a coordinate overflows.
    pub fn checked_offset(&self, dx: i32, dz: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y,
            z: self.z.checked_add(dz)?,
        })
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Footprint size in cells: `width` along x, `length` along z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size2 {
    pub width: i32,
    pub length: i32,
}

impl Size2 {
    pub const ONE: Self = Self {
        width: 1,
        length: 1,
    };

    pub fn new(width: i32, length: i32) -> Self {
        Self { width, length }
    }

    pub fn is_square(&self) -> bool {
        self.width == self.length
    }

    pub fn swapped(&self) -> Self {
        Self {
            width: self.length,
            length: self.width,
        }
    }

    /// Bounding box of this size once rotated; quarter turns swap the axes.
    pub fn rotated(&self, rotation_degrees: i32) -> Self {
        if rotation_degrees % 180 == 0 {
            *self
        } else {
            self.swapped()
        }
    }

    pub fn area(&self) -> i32 {
        self.width.saturating_mul(self.length)
    }
}

/// World-space position
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// World position of a cell's corner for a lattice of `cell_size` units.
    pub fn from_cell(cell: Cell, cell_size: f32) -> Self {
        Self {
            x: cell.x as f32 * cell_size,
            y: cell.y as f32 * cell_size,
            z: cell.z as f32 * cell_size,
        }
    }

    /// Component-wise rounding to the nearest integer.
    pub fn round_to_int(&self) -> (i32, i32, i32) {
        (
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        )
    }

    /// Nearest lattice cell for a lattice of `cell_size` units.
    pub fn to_cell(&self, cell_size: f32) -> Cell {
        let (x, y, z) = Self::new(self.x / cell_size, self.y / cell_size, self.z / cell_size).round_to_int();
        Cell::with_height(x, y, z)
    }

    /// True when both positions fall on the same cell of a `cell_size` lattice.
    pub fn same_cell(&self, other: &Self, cell_size: f32) -> bool {
        self.to_cell(cell_size) == other.to_cell(cell_size)
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

//! Occupancy grid - one per layer, the sole authority on who owns a cell.
//!
//! Records live in a small arena; every footprint cell maps to the same
//! arena slot, so a multi-cell object is inserted and removed as one unit.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::footprint::{footprint, GridBounds};
use crate::components::{Cell, PlacementRecord, Size2};
use crate::error::PlacementError;

/// Index of a record in a grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Cell-to-record mapping for a single layer.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    bounds: GridBounds,
    records: Vec<Option<PlacementRecord>>,
    /// Vacated arena slots, reused before growing
    free: Vec<usize>,
    cells: HashMap<Cell, RecordId>,
}

impl OccupancyGrid {
    /// Create an empty grid of `width` x `length` cells.
    pub fn new(width: i32, length: i32) -> Self {
        Self {
            bounds: GridBounds::new(width, length),
            records: Vec::new(),
            free: Vec::new(),
            cells: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    pub fn length(&self) -> i32 {
        self.bounds.length
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Cells a placement would cover, empty if it leaves the grid.
    pub fn footprint(&self, anchor: Cell, size: Size2, rotation_degrees: i32) -> Vec<Cell> {
        footprint(self.bounds, anchor, size, rotation_degrees)
    }

    /// True if the footprint is inside the grid and every cell is free.
    pub fn can_place(&self, anchor: Cell, size: Size2, rotation_degrees: i32) -> bool {
        let cells = self.footprint(anchor, size, rotation_degrees);
        !cells.is_empty() && cells.iter().all(|cell| !self.cells.contains_key(cell))
    }

    /// Claim the footprint for a new record.
    ///
    /// Callers are expected to have checked `can_place`; failing here means
    /// they did not, and the grid is left untouched.
    pub fn add(
        &mut self,
        anchor: Cell,
        size: Size2,
        type_code: i32,
        rotation_degrees: i32,
    ) -> Result<RecordId, PlacementError> {
        let cells = self.footprint(anchor, size, rotation_degrees);
        if cells.is_empty() {
            log::error!(
                "add of type {} at {} leaves the grid ({}x{}, rotation {})",
                type_code,
                anchor,
                size.width,
                size.length,
                rotation_degrees
            );
            return Err(PlacementError::EmptyFootprint {
                anchor,
                size,
                rotation: rotation_degrees,
            });
        }
        let record = PlacementRecord::new(cells, type_code, rotation_degrees);
        self.insert(record)
    }

    /// Insert a record exactly as given, keeping its cells and unique id.
    ///
    /// Used when restoring saved grids. Cells must be inside the grid and
    /// unclaimed.
    pub fn import_record(&mut self, record: PlacementRecord) -> Result<RecordId, PlacementError> {
        if let Some(&cell) = record.occupied_cells.iter().find(|c| !self.bounds.contains(**c)) {
            return Err(PlacementError::EmptyFootprint {
                anchor: cell,
                size: Size2::ONE,
                rotation: record.rotation_degrees,
            });
        }
        self.insert(record)
    }

    fn insert(&mut self, record: PlacementRecord) -> Result<RecordId, PlacementError> {
        for cell in &record.occupied_cells {
            if let Some(existing) = self.record_at(*cell) {
                log::error!(
                    "cell {} already claimed by {} while adding {}",
                    cell,
                    existing.unique_id,
                    record.unique_id
                );
                return Err(PlacementError::CellOccupied {
                    cell: *cell,
                    existing: existing.unique_id.clone(),
                });
            }
        }

        let id = match self.free.pop() {
            Some(slot) => RecordId(slot),
            None => {
                self.records.push(None);
                RecordId(self.records.len() - 1)
            }
        };
        for cell in &record.occupied_cells {
            self.cells.insert(*cell, id);
        }
        log::debug!(
            "placed {} over {} cells",
            record.unique_id,
            record.occupied_cells.len()
        );
        self.records[id.0] = Some(record);
        Ok(id)
    }

    /// Remove the record covering `cell` from every cell it occupies.
    pub fn remove(&mut self, cell: Cell) -> Result<PlacementRecord, PlacementError> {
        let id = *self
            .cells
            .get(&cell)
            .ok_or(PlacementError::NotOccupied(cell))?;
        let record = self.records[id.0]
            .take()
            .ok_or(PlacementError::NotOccupied(cell))?;
        for occupied in &record.occupied_cells {
            self.cells.remove(occupied);
        }
        self.free.push(id.0);
        log::debug!("removed {}", record.unique_id);
        Ok(record)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn record_id_at(&self, cell: Cell) -> Option<RecordId> {
        self.cells.get(&cell).copied()
    }

    pub fn record(&self, id: RecordId) -> Option<&PlacementRecord> {
        self.records.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn record_at(&self, cell: Cell) -> Option<&PlacementRecord> {
        self.record_id_at(cell).and_then(|id| self.record(id))
    }

    /// Catalog type of the object covering `cell`.
    pub fn type_at(&self, cell: Cell) -> Option<i32> {
        self.record_at(cell).map(|r| r.type_code)
    }

    /// Origin (first footprint cell) of the object covering `cell`.
    pub fn origin_at(&self, cell: Cell) -> Option<Cell> {
        self.record_at(cell).and_then(|r| r.origin())
    }

    pub fn rotation_at(&self, cell: Cell) -> Option<i32> {
        self.record_at(cell).map(|r| r.rotation_degrees)
    }

    pub fn unique_id_at(&self, cell: Cell) -> Option<&str> {
        self.record_at(cell).map(|r| r.unique_id.as_str())
    }

    /// Live records in arena order.
    pub fn placements(&self) -> impl Iterator<Item = (RecordId, &PlacementRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|r| (RecordId(i), r)))
    }

    pub fn placement_count(&self) -> usize {
        self.records.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check the internal mapping: every cell key is in bounds, points at a
    /// live record, and that record lists the cell. Every record's cells map
    /// back to it.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (cell, id) in &self.cells {
            if !self.bounds.contains(*cell) {
                return Err(format!("cell {} is out of bounds", cell));
            }
            let record = self
                .record(*id)
                .ok_or_else(|| format!("cell {} points at a vacated slot", cell))?;
            if !record.occupied_cells.contains(cell) {
                return Err(format!("cell {} is not part of {}", cell, record.unique_id));
            }
        }
        for (id, record) in self.placements() {
            for cell in &record.occupied_cells {
                if self.cells.get(cell) != Some(&id) {
                    return Err(format!("{} lost cell {}", record.unique_id, cell));
                }
            }
        }
        Ok(())
    }

    /// Human-readable dump of the grid contents.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Grid {}x{}: {} placements over {} cells",
            self.width(),
            self.length(),
            self.placement_count(),
            self.occupied_cell_count()
        );
        if self.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for (_, record) in self.placements() {
            let cells: Vec<String> = record.occupied_cells.iter().map(|c| c.to_string()).collect();
            let _ = writeln!(
                out,
                "  {} type={} rotation={} cells=[{}]",
                record.unique_id,
                record.type_code,
                record.rotation_degrees,
                cells.join(", ")
            );
        }
        out
    }
}

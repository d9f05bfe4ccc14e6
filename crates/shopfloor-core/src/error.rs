//! Invariant violations raised by the grid and the building states.
//!
//! These are caller bugs (a missed `can_place` check, an unknown catalog id),
//! not user-facing rejections. Rejections are plain `bool`s.

use crate::components::{Cell, Size2};

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// `add` targeted a cell another record already claims.
    CellOccupied { cell: Cell, existing: String },
    /// No catalog entry with this type code.
    UnknownObjectType(i32),
    /// The footprint leaves the grid bounds.
    EmptyFootprint {
        anchor: Cell,
        size: Size2,
        rotation: i32,
    },
    /// Removal or lookup that requires an occupied cell.
    NotOccupied(Cell),
    /// An edit was cancelled but the object could not go back where it was.
    RestoreBlocked { unique_id: String, origin: Cell },
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::CellOccupied { cell, existing } => {
                write!(f, "Cell {} is already occupied by {}", cell, existing)
            }
            PlacementError::UnknownObjectType(id) => write!(f, "No object with ID {}", id),
            PlacementError::EmptyFootprint {
                anchor,
                size,
                rotation,
            } => write!(
                f,
                "Footprint {}x{} at {} rotated {} leaves the grid",
                size.width, size.length, anchor, rotation
            ),
            PlacementError::NotOccupied(cell) => write!(f, "Cell {} is not occupied", cell),
            PlacementError::RestoreBlocked { unique_id, origin } => write!(
                f,
                "Cannot restore {} at {}: its cells are no longer free",
                unique_id, origin
            ),
        }
    }
}

impl std::error::Error for PlacementError {}

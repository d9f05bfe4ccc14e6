//! Placement records and the object type codes the engine cares about.

use super::common::Cell;
use serde::{Deserialize, Serialize};

/// Catalog type codes with special meaning to the engine.
pub mod type_codes {
    /// Base floor tile; the only type that lives on the floor layer.
    pub const FLOOR: i32 = 0;
    pub const SHELF: i32 = 2;
    pub const SHELF_WIDE: i32 = 3;

    /// Types whose placement, removal and moves are reported to the
    /// shelving bridge.
    pub fn is_container(type_code: i32) -> bool {
        type_code == SHELF || type_code == SHELF_WIDE
    }
}

/// Deterministic cross-reference key: `"{type}_{x}_{z}"` of the origin cell.
///
/// A placement without cells derives `"{type}_"`.
pub fn derive_unique_id(type_code: i32, origin: Option<Cell>) -> String {
    match origin {
        Some(cell) => format!("{}_{}_{}", type_code, cell.x, cell.z),
        None => format!("{}_", type_code),
    }
}

/// One placed object instance.
///
/// `occupied_cells[0]` is the origin cell; it anchors the unique id and the
/// instance position, so the order of `occupied_cells` must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub occupied_cells: Vec<Cell>,
    pub type_code: i32,
    pub rotation_degrees: i32,
    pub unique_id: String,
}

impl PlacementRecord {
    pub fn new(occupied_cells: Vec<Cell>, type_code: i32, rotation_degrees: i32) -> Self {
        let unique_id = derive_unique_id(type_code, occupied_cells.first().copied());
        Self {
            occupied_cells,
            type_code,
            rotation_degrees,
            unique_id,
        }
    }

    pub fn origin(&self) -> Option<Cell> {
        self.occupied_cells.first().copied()
    }

    pub fn is_container(&self) -> bool {
        type_codes::is_container(self.type_code)
    }
}

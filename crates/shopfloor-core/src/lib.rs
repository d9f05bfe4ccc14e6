//! Shopfloor Core - Grid Placement Engine
//!
//! Decides where multi-cell, rotatable objects may stand on a bounded grid,
//! tracks which object owns each cell, and drives the place / remove / edit
//! interaction modes that change it.
//!
//! # Architecture
//!
//! - **Grid**: footprint geometry and one `OccupancyGrid` per layer (floor, furniture)
//! - **States**: the three building modes, dispatched through `BuildingState`
//! - **Scene**: live instances stored as `hecs` entities
//! - **Collaborators**: preview feedback and the shelf store, behind traits
//! - **Persistence**: JSON or bincode snapshots of both grids and the shelves
//!
//! # Example
//!
//! ```rust,no_run
//! use shopfloor_core::prelude::*;
//!
//! let catalog = ObjectCatalog::from_json_str(
//!     r#"[{"id": 1, "name": "Counter", "base_size": {"width": 2, "length": 1}, "prefab": "counter"}]"#,
//! ).unwrap();
//! let mut system = PlacementSystem::new(&BuildConfig::default(), catalog);
//!
//! system.enter_place(1).unwrap();
//! system.hover(Cell::new(0, 0));
//! system.rotate(-1);
//! system.confirm(Cell::new(0, 0)).unwrap();
//! system.exit().unwrap();
//! ```

pub mod catalog;
pub mod collaborators;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod persistence;
pub mod scene;
pub mod states;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::{CatalogEntry, ObjectCatalog};
    pub use crate::collaborators::{ContainerBridge, HeadlessPreview, PreviewSurface, ShelfStore};
    pub use crate::components::*;
    pub use crate::config::{BuildConfig, SaveFormat};
    pub use crate::engine::PlacementSystem;
    pub use crate::error::PlacementError;
    pub use crate::grid::{LayerId, Layers, OccupancyGrid};
    pub use crate::persistence::SaveError;
    pub use crate::states::ModeKind;
}

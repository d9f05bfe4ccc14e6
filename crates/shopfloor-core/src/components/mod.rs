//! Plain data types used across the engine.
//!
//! Components are pure data structs. Grid logic lives in `grid`, interaction
//! logic in `states`.

mod common;
mod placement;
mod scene;
mod shelf;

pub use common::*;
pub use placement::*;
pub use scene::*;
pub use shelf::*;

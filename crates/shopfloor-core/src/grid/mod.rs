//! Grid occupancy - footprints, per-layer cell ownership, layer policy.

mod footprint;
mod layers;
mod occupancy;

pub use footprint::*;
pub use layers::*;
pub use occupancy::*;

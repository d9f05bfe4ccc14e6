//! Scene components attached to spawned instances.

use super::common::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque handle naming the asset an instance is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabRef(pub String);

impl PrefabRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Placement of an instance in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Yaw around the vertical axis, applied to the instance pivot
    pub rotation_degrees: i32,
}

impl Transform {
    pub fn new(position: Vec3, rotation_degrees: i32) -> Self {
        Self {
            position,
            rotation_degrees,
        }
    }
}

/// Marks an instance bound to a shelf record in the shelving bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerBinding {
    pub unique_id: String,
}

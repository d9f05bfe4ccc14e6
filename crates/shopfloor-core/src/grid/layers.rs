//! The two fixed occupancy layers and the type-to-layer policy.

use serde::{Deserialize, Serialize};

use super::occupancy::OccupancyGrid;
use crate::components::{type_codes, Cell};

/// Which occupancy layer an object lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerId {
    Floor,
    Furniture,
}

impl LayerId {
    pub const ALL: [LayerId; 2] = [LayerId::Floor, LayerId::Furniture];

    /// Floor tiles go on the floor layer, everything else is furniture.
    pub fn for_type(type_code: i32) -> Self {
        if type_code == type_codes::FLOOR {
            LayerId::Floor
        } else {
            LayerId::Furniture
        }
    }

    /// Key used for this layer in save files.
    pub fn save_key(&self) -> &'static str {
        match self {
            LayerId::Floor => "floorData",
            LayerId::Furniture => "furnitureData",
        }
    }

    pub fn from_save_key(key: &str) -> Option<Self> {
        match key {
            "floorData" => Some(LayerId::Floor),
            "furnitureData" => Some(LayerId::Furniture),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.save_key())
    }
}

/// Both occupancy grids of a session.
#[derive(Debug, Clone)]
pub struct Layers {
    pub floor: OccupancyGrid,
    pub furniture: OccupancyGrid,
}

impl Layers {
    /// Two empty grids of the same size.
    pub fn new(width: i32, length: i32) -> Self {
        Self {
            floor: OccupancyGrid::new(width, length),
            furniture: OccupancyGrid::new(width, length),
        }
    }

    pub fn get(&self, layer: LayerId) -> &OccupancyGrid {
        match layer {
            LayerId::Floor => &self.floor,
            LayerId::Furniture => &self.furniture,
        }
    }

    pub fn get_mut(&mut self, layer: LayerId) -> &mut OccupancyGrid {
        match layer {
            LayerId::Floor => &mut self.floor,
            LayerId::Furniture => &mut self.furniture,
        }
    }

    /// Layer holding an object at `cell`, furniture first since it sits on
    /// top of the floor.
    pub fn occupied_layer_at(&self, cell: Cell) -> Option<LayerId> {
        [LayerId::Furniture, LayerId::Floor]
            .into_iter()
            .find(|layer| self.get(*layer).is_occupied(cell))
    }

    pub fn placement_count(&self) -> usize {
        self.floor.placement_count() + self.furniture.placement_count()
    }
}

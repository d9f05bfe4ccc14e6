//! Scene gateway - the live instances standing on the grid.
//!
//! Instances are `hecs` entities carrying a `Transform` and a `PrefabRef`.
//! A separate spawn-ordered handle list gives position lookups a stable
//! first-found order, which archetype iteration would not.
//!
//! Positions are matched by the lattice cell they fall on, so two cells
//! closer than one world unit never alias.

use hecs::{Entity, World};

use crate::components::{ContainerBinding, PrefabRef, Transform, Vec3};

/// Owns every spawned instance.
pub struct SceneGateway {
    world: World,
    /// Handles in spawn order
    placed: Vec<Entity>,
    /// World units per cell, used when matching positions
    cell_size: f32,
}

impl SceneGateway {
    /// Gateway for a lattice of one world unit per cell.
    pub fn new() -> Self {
        Self::with_cell_size(1.0)
    }

    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            world: World::new(),
            placed: Vec::new(),
            cell_size,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Create an instance of `prefab` at `position` turned by `rotation_degrees`.
    pub fn spawn(&mut self, prefab: &PrefabRef, position: Vec3, rotation_degrees: i32) -> Entity {
        let entity = self
            .world
            .spawn((prefab.clone(), Transform::new(position, rotation_degrees)));
        self.placed.push(entity);
        entity
    }

    /// Destroy the first instance standing on the same cell as `position`.
    ///
    /// At most one instance is removed. Returns whether one was found.
    pub fn destroy_at(&mut self, position: Vec3) -> bool {
        self.destroy_where(position, None)
    }

    /// Like `destroy_at`, skipping instances of other prefabs. A floor tile
    /// and the furniture standing on it share a position.
    pub fn destroy_prefab_at(&mut self, position: Vec3, prefab: &PrefabRef) -> bool {
        self.destroy_where(position, Some(prefab))
    }

    fn destroy_where(&mut self, position: Vec3, prefab: Option<&PrefabRef>) -> bool {
        let Some(index) = self.position_index(position, prefab) else {
            log::warn!("no instance to destroy at {:?}", position);
            return false;
        };
        let entity = self.placed.remove(index);
        let _ = self.world.despawn(entity);
        true
    }

    /// First instance standing on the same cell as `position`.
    pub fn find_at(&self, position: Vec3) -> Option<Entity> {
        self.position_index(position, None).map(|i| self.placed[i])
    }

    /// First instance of `prefab` standing on the same cell as `position`.
    pub fn find_prefab_at(&self, position: Vec3, prefab: &PrefabRef) -> Option<Entity> {
        self.position_index(position, Some(prefab))
            .map(|i| self.placed[i])
    }

    fn position_index(&self, position: Vec3, prefab: Option<&PrefabRef>) -> Option<usize> {
        let cell = position.to_cell(self.cell_size);
        self.placed.iter().position(|entity| {
            let at_position = self
                .world
                .get::<&Transform>(*entity)
                .map(|t| t.position.to_cell(self.cell_size) == cell)
                .unwrap_or(false);
            let same_prefab = match prefab {
                Some(wanted) => self
                    .world
                    .get::<&PrefabRef>(*entity)
                    .map(|p| *p == *wanted)
                    .unwrap_or(false),
                None => true,
            };
            at_position && same_prefab
        })
    }

    /// Tag an instance as the physical side of a shelf record.
    pub fn bind_container(&mut self, entity: Entity, unique_id: &str) {
        let binding = ContainerBinding {
            unique_id: unique_id.to_string(),
        };
        if self.world.insert_one(entity, binding).is_err() {
            log::warn!("cannot bind {} to a despawned instance", unique_id);
        }
    }

    pub fn binding(&self, entity: Entity) -> Option<String> {
        self.world
            .get::<&ContainerBinding>(entity)
            .ok()
            .map(|b| b.unique_id.clone())
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    pub fn prefab(&self, entity: Entity) -> Option<PrefabRef> {
        self.world.get::<&PrefabRef>(entity).ok().map(|p| (*p).clone())
    }

    /// Live instances in spawn order.
    pub fn instances(&self) -> &[Entity] {
        &self.placed
    }

    pub fn instance_count(&self) -> usize {
        self.placed.len()
    }

    /// Count instances tagged with a container binding.
    pub fn container_count(&self) -> usize {
        self.world.query::<&ContainerBinding>().iter().count()
    }

    /// Despawn everything.
    pub fn clear(&mut self) {
        self.world.clear();
        self.placed.clear();
    }
}

impl Default for SceneGateway {
    fn default() -> Self {
        Self::new()
    }
}

//! Everything a building state touches, passed in explicitly.

use crate::catalog::ObjectCatalog;
use crate::collaborators::{ContainerBridge, NullPreview, PreviewSurface, ShelfStore};
use crate::components::{type_codes, Cell, PlacementRecord, PrefabRef, ShelfData, Size2, Vec3};
use crate::config::BuildConfig;
use crate::error::PlacementError;
use crate::grid::{LayerId, Layers};
use crate::scene::SceneGateway;

/// Shared state of a building session: both grids, the catalog, the live
/// scene and the two collaborators.
pub struct BuildContext {
    pub layers: Layers,
    pub catalog: ObjectCatalog,
    pub scene: SceneGateway,
    pub preview: Box<dyn PreviewSurface>,
    pub containers: Box<dyn ContainerBridge>,
}

impl BuildContext {
    /// Empty grids sized from `config`, no preview, an in-memory shelf store.
    pub fn new(config: &BuildConfig, catalog: ObjectCatalog) -> Self {
        Self {
            layers: Layers::new(config.grid_width, config.grid_length),
            catalog,
            scene: SceneGateway::with_cell_size(config.cell_size),
            preview: Box::new(NullPreview),
            containers: Box::new(ShelfStore::new()),
        }
    }

    pub fn with_preview(mut self, preview: impl PreviewSurface + 'static) -> Self {
        self.preview = Box::new(preview);
        self
    }

    pub fn with_containers(mut self, containers: impl ContainerBridge + 'static) -> Self {
        self.containers = Box::new(containers);
        self
    }

    /// World units per cell
    pub fn cell_size(&self) -> f32 {
        self.scene.cell_size()
    }

    pub fn cell_to_world(&self, cell: Cell) -> Vec3 {
        Vec3::from_cell(cell, self.cell_size())
    }

    /// Claim the footprint, spawn the instance and, for shelves, bind the
    /// instance and hand `shelf_data` to the shelving bridge.
    ///
    /// Validity must already have been checked.
    pub(crate) fn place_object(
        &mut self,
        type_code: i32,
        prefab: &PrefabRef,
        anchor: Cell,
        size: Size2,
        rotation_degrees: i32,
        shelf_data: ShelfData,
    ) -> Result<LayerId, PlacementError> {
        let layer = LayerId::for_type(type_code);
        let grid = self.layers.get_mut(layer);
        let id = grid.add(anchor, size, type_code, rotation_degrees)?;
        let (origin, unique_id) = match grid.record(id) {
            Some(record) => (record.origin().unwrap_or(anchor), record.unique_id.clone()),
            None => return Err(PlacementError::NotOccupied(anchor)),
        };

        self.spawn_instance(type_code, prefab, origin, rotation_degrees, &unique_id, shelf_data);
        Ok(layer)
    }

    /// Put a previously captured record back exactly as it was: same cells,
    /// same id, same rotation. Shelves are rebuilt under that id.
    pub(crate) fn restore_record(
        &mut self,
        record: PlacementRecord,
        shelf_data: ShelfData,
    ) -> Result<LayerId, PlacementError> {
        let Some(origin) = record.origin() else {
            return Err(PlacementError::RestoreBlocked {
                unique_id: record.unique_id,
                origin: Cell::ZERO,
            });
        };
        let prefab = match self.catalog.get(record.type_code) {
            Some(entry) => entry.prefab.clone(),
            None => return Err(PlacementError::UnknownObjectType(record.type_code)),
        };
        let layer = LayerId::for_type(record.type_code);
        let (type_code, rotation_degrees, unique_id) =
            (record.type_code, record.rotation_degrees, record.unique_id.clone());
        self.layers.get_mut(layer).import_record(record)?;
        self.spawn_instance(type_code, &prefab, origin, rotation_degrees, &unique_id, shelf_data);
        Ok(layer)
    }

    fn spawn_instance(
        &mut self,
        type_code: i32,
        prefab: &PrefabRef,
        origin: Cell,
        rotation_degrees: i32,
        unique_id: &str,
        shelf_data: ShelfData,
    ) {
        let position = self.cell_to_world(origin);
        self.scene.spawn(prefab, position, rotation_degrees);
        if type_codes::is_container(type_code) {
            self.rebind_container(type_code, origin, unique_id, shelf_data);
        }
    }

    /// Remove the object covering `cell` on `layer` from the grid and the
    /// scene. Shelves are dropped from the shelving bridge first.
    pub(crate) fn remove_object(
        &mut self,
        layer: LayerId,
        cell: Cell,
    ) -> Result<PlacementRecord, PlacementError> {
        let (origin, type_code, unique_id) = match self.layers.get(layer).record_at(cell) {
            Some(record) => (
                record.origin().unwrap_or(cell),
                record.type_code,
                record.unique_id.clone(),
            ),
            None => return Err(PlacementError::NotOccupied(cell)),
        };

        if type_codes::is_container(type_code) {
            self.containers.forget(&unique_id);
        }

        let record = self.layers.get_mut(layer).remove(cell)?;
        let position = self.cell_to_world(origin);
        match self.catalog.get(type_code) {
            Some(entry) => self.scene.destroy_prefab_at(position, &entry.prefab),
            None => self.scene.destroy_at(position),
        };
        Ok(record)
    }

    /// Find the `type_code` instance standing on `origin`, tag it and
    /// rebuild its shelf.
    pub(crate) fn rebind_container(
        &mut self,
        type_code: i32,
        origin: Cell,
        unique_id: &str,
        data: ShelfData,
    ) {
        let position = self.cell_to_world(origin);
        let instance = match self.catalog.get(type_code) {
            Some(entry) => self.scene.find_prefab_at(position, &entry.prefab),
            None => self.scene.find_at(position),
        };
        match instance {
            Some(entity) => self.scene.bind_container(entity, unique_id),
            None => log::warn!("no instance at {} for shelf {}", origin, unique_id),
        }
        self.containers.rebuild(unique_id, data);
    }
}

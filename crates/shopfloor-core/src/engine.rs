//! Placement system - the driver-facing entry point
//!
//! Owns the `BuildContext` and at most one active `BuildingState`. The driver
//! feeds it hovered cells, rotation ticks and confirms; entering a mode
//! always ends the previous one first.

use std::io::{Read, Write};
use std::path::Path;

use crate::catalog::ObjectCatalog;
use crate::components::{type_codes, Cell};
use crate::config::{BuildConfig, SaveFormat};
use crate::error::PlacementError;
use crate::grid::{normalize_rotation, LayerId, Layers};
use crate::persistence::{self, LoadedSession, SaveError};
use crate::states::{BuildContext, BuildingState, EditingState, ModeKind, PlacingState, RemovingState};

/// Degrees turned per rotation tick
pub const ROTATION_STEP: i32 = 90;

/// Main placement engine
pub struct PlacementSystem {
    ctx: BuildContext,
    state: Option<BuildingState>,
    /// Last cell forwarded to the active state
    last_cell: Option<Cell>,
    /// Rotation applied to the next placement, in [0, 360)
    rotation: i32,
    save_format: SaveFormat,
}

impl PlacementSystem {
    /// Empty grids sized from `config`.
    pub fn new(config: &BuildConfig, catalog: ObjectCatalog) -> Self {
        Self::with_context(BuildContext::new(config, catalog), config.save_format)
    }

    /// Drive an already assembled context, e.g. one with a custom preview.
    pub fn with_context(ctx: BuildContext, save_format: SaveFormat) -> Self {
        Self {
            ctx,
            state: None,
            last_cell: None,
            rotation: 0,
            save_format,
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut BuildContext {
        &mut self.ctx
    }

    pub fn layers(&self) -> &Layers {
        &self.ctx.layers
    }

    pub fn active_mode(&self) -> Option<ModeKind> {
        self.state.as_ref().map(BuildingState::kind)
    }

    pub fn state(&self) -> Option<&BuildingState> {
        self.state.as_ref()
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    // ── Modes ──

    /// Start placing objects of `type_code`.
    pub fn enter_place(&mut self, type_code: i32) -> Result<(), PlacementError> {
        self.exit()?;
        let state = PlacingState::new(&mut self.ctx, type_code, 0)?;
        log::info!("entered place mode for type {}", type_code);
        self.state = Some(BuildingState::Placing(state));
        Ok(())
    }

    pub fn enter_remove(&mut self) -> Result<(), PlacementError> {
        self.exit()?;
        self.state = Some(BuildingState::Removing(RemovingState::new(&mut self.ctx)));
        log::info!("entered remove mode");
        Ok(())
    }

    pub fn enter_edit(&mut self) -> Result<(), PlacementError> {
        self.exit()?;
        self.state = Some(BuildingState::Editing(EditingState::new(&mut self.ctx)));
        log::info!("entered edit mode");
        Ok(())
    }

    /// End the active mode. An edit still carrying an object puts it back,
    /// which is the only way exiting changes a grid.
    pub fn exit(&mut self) -> Result<Option<LayerId>, PlacementError> {
        self.last_cell = None;
        self.rotation = 0;
        let Some(mut state) = self.state.take() else {
            return Ok(None);
        };
        let kind = state.kind();
        let changed = state.end(&mut self.ctx)?;
        log::info!("left {:?} mode", kind);
        Ok(changed)
    }

    // ── Input ──

    /// Cursor moved to `cell`. Repeats of the same cell are ignored.
    pub fn hover(&mut self, cell: Cell) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if self.last_cell == Some(cell) {
            return;
        }
        self.last_cell = Some(cell);
        state.on_hover(&mut self.ctx, cell);
    }

    /// Turn by one step per tick: negative ticks turn clockwise (+90),
    /// positive ticks counter-clockwise (-90).
    pub fn rotate(&mut self, delta_ticks: i32) {
        let step = match delta_ticks.signum() {
            -1 => ROTATION_STEP,
            1 => -ROTATION_STEP,
            _ => return,
        };
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.rotation().is_none() {
            return;
        }
        self.rotation = normalize_rotation(self.rotation + step);
        let cell = self.last_cell.unwrap_or(Cell::ZERO);
        state.on_hover_with_rotation(&mut self.ctx, cell, self.rotation);
        self.ctx.preview.set_rotation(self.rotation);
    }

    /// Apply the active mode's action at `cell`.
    ///
    /// Returns the layer that changed. A finished edit leaves edit mode, and
    /// an edit pick-up shows the carried object under the cursor at once.
    pub fn confirm(&mut self, cell: Cell) -> Result<Option<LayerId>, PlacementError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };
        let was_carrying = state.rotation().is_some();
        let changed = state.on_confirm(&mut self.ctx, cell)?;
        if let Some(rotation) = state.rotation() {
            self.rotation = rotation;
            if !was_carrying {
                self.last_cell = Some(cell);
                state.on_hover(&mut self.ctx, cell);
            }
        }
        if state.is_finished() {
            self.exit()?;
        }
        Ok(changed)
    }

    /// Dump both grids at debug level.
    pub fn log_grids(&self) {
        for layer in LayerId::ALL {
            log::debug!("{}: {}", layer, self.ctx.layers.get(layer).describe());
        }
    }

    // ── Persistence ──

    pub fn save_to<W: Write>(&self, writer: W, format: SaveFormat) -> Result<(), SaveError> {
        let save = persistence::export_session(&self.ctx.layers, self.ctx.containers.as_ref());
        persistence::save_session(writer, &save, format)
    }

    pub fn load_from<R: Read>(&mut self, reader: R, format: SaveFormat) -> Result<(), SaveError> {
        let loaded = persistence::load_session(reader, format)?;
        self.install(loaded);
        Ok(())
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let save = persistence::export_session(&self.ctx.layers, self.ctx.containers.as_ref());
        persistence::save_to_path(path.as_ref(), &save, self.save_format)?;
        log::info!("saved {} placements to {}", self.ctx.layers.placement_count(), path.as_ref().display());
        Ok(())
    }

    /// Load `path`, or reset to empty grids of the current size when it does
    /// not exist.
    pub fn load_file_or_default(&mut self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let config = BuildConfig {
            grid_width: self.ctx.layers.floor.width(),
            grid_length: self.ctx.layers.floor.length(),
            cell_size: self.ctx.cell_size(),
            save_file: path.as_ref().to_path_buf(),
            save_format: self.save_format,
        };
        let loaded = persistence::load_or_default(path, &config)?;
        self.install(loaded);
        Ok(())
    }

    /// Replace the session with loaded grids and rebuild the scene from them.
    fn install(&mut self, loaded: LoadedSession) {
        if let Err(e) = self.exit() {
            log::warn!("discarding unfinished mode before load: {}", e);
        }
        self.ctx.scene.clear();
        self.ctx.layers = loaded.layers;
        self.ctx.containers.restore(loaded.shelf_snapshot);
        self.load_structures();
    }

    /// Spawn one instance per record at its origin and rebind shelves.
    pub fn load_structures(&mut self) {
        let mut pending = Vec::new();
        for layer in LayerId::ALL {
            for (_, record) in self.ctx.layers.get(layer).placements() {
                if let Some(origin) = record.origin() {
                    pending.push((
                        record.type_code,
                        origin,
                        record.rotation_degrees,
                        record.unique_id.clone(),
                    ));
                }
            }
        }

        let mut spawned = 0;
        for (type_code, origin, rotation, unique_id) in pending {
            let prefab = match self.ctx.catalog.get(type_code) {
                Some(entry) => entry.prefab.clone(),
                None => {
                    log::warn!("no prefab for type {} ({}), not spawned", type_code, unique_id);
                    continue;
                }
            };
            let position = self.ctx.cell_to_world(origin);
            self.ctx.scene.spawn(&prefab, position, rotation);
            spawned += 1;

            if type_codes::is_container(type_code) {
                let data = self.ctx.containers.lookup(&unique_id).unwrap_or_default();
                self.ctx.rebind_container(type_code, origin, &unique_id, data);
            }
        }
        log::info!("loaded {} structures", spawned);
    }
}

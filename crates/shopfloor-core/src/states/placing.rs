//! Placing mode - put a new object of one catalog type on the grid.

use super::context::BuildContext;
use crate::components::{Cell, PrefabRef, ShelfData, Size2};
use crate::error::PlacementError;
use crate::grid::LayerId;

#[derive(Debug, Clone)]
pub struct PlacingState {
    type_code: i32,
    prefab: PrefabRef,
    base_size: Size2,
    current_size: Size2,
    rotation_degrees: i32,
}

impl PlacingState {
    /// Start placing `type_code` and show its preview.
    ///
    /// Fails if the catalog has no such type.
    pub fn new(
        ctx: &mut BuildContext,
        type_code: i32,
        rotation_degrees: i32,
    ) -> Result<Self, PlacementError> {
        let entry = match ctx.catalog.get_mut(type_code) {
            Some(entry) => entry,
            None => {
                log::error!("cannot place unknown object type {}", type_code);
                return Err(PlacementError::UnknownObjectType(type_code));
            }
        };
        entry.apply_rotation(rotation_degrees);
        let state = Self {
            type_code,
            prefab: entry.prefab.clone(),
            base_size: entry.base_size,
            current_size: entry.current_size,
            rotation_degrees,
        };
        ctx.preview.show_placement(&state.prefab, state.current_size);
        Ok(state)
    }

    pub fn type_code(&self) -> i32 {
        self.type_code
    }

    pub fn rotation(&self) -> i32 {
        self.rotation_degrees
    }

    pub fn current_size(&self) -> Size2 {
        self.current_size
    }

    pub fn layer(&self) -> LayerId {
        LayerId::for_type(self.type_code)
    }

    pub fn is_valid_at(&self, ctx: &BuildContext, cell: Cell) -> bool {
        ctx.layers
            .get(self.layer())
            .can_place(cell, self.current_size, self.rotation_degrees)
    }

    pub fn on_hover(&mut self, ctx: &mut BuildContext, cell: Cell) {
        let valid = self.is_valid_at(ctx, cell);
        let position = ctx.cell_to_world(cell);
        ctx.preview.update(position, valid);
    }

    /// Take a new rotation; quarter turns swap the footprint's width and length.
    pub fn on_hover_with_rotation(&mut self, ctx: &mut BuildContext, cell: Cell, rotation_degrees: i32) {
        self.rotation_degrees = rotation_degrees;
        self.current_size = self.base_size.rotated(rotation_degrees);
        if let Some(entry) = ctx.catalog.get_mut(self.type_code) {
            entry.current_size = self.current_size;
        }
        self.on_hover(ctx, cell);
    }

    pub fn on_confirm(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
    ) -> Result<Option<LayerId>, PlacementError> {
        self.place(ctx, cell, ShelfData::default())
    }

    /// Place at `cell` if valid; shelves are built with `shelf_data`.
    pub(crate) fn place(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
        shelf_data: ShelfData,
    ) -> Result<Option<LayerId>, PlacementError> {
        if !self.is_valid_at(ctx, cell) {
            return Ok(None);
        }
        let layer = ctx.place_object(
            self.type_code,
            &self.prefab,
            cell,
            self.current_size,
            self.rotation_degrees,
            shelf_data,
        )?;
        log::debug!(
            "placed type {} at {} on {} (rotation {})",
            self.type_code,
            cell,
            layer,
            self.rotation_degrees
        );
        // The cell is taken now
        let position = ctx.cell_to_world(cell);
        ctx.preview.update(position, false);
        Ok(Some(layer))
    }

    pub fn end(&mut self, ctx: &mut BuildContext) {
        ctx.preview.hide();
    }
}

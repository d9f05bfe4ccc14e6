//! Removing mode - take whatever is under the cursor off the grid.

use super::context::BuildContext;
use crate::components::Cell;
use crate::error::PlacementError;
use crate::grid::LayerId;

#[derive(Debug, Clone, Default)]
pub struct RemovingState;

impl RemovingState {
    pub fn new(ctx: &mut BuildContext) -> Self {
        ctx.preview.show_remove_cursor();
        Self
    }

    /// Move the cursor. Removal feedback is always shown as invalid.
    pub fn on_hover(&mut self, ctx: &mut BuildContext, cell: Cell) {
        let position = ctx.cell_to_world(cell);
        ctx.preview.update(position, false);
    }

    /// Remove the object at `cell`, furniture before floor.
    pub fn on_confirm(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
    ) -> Result<Option<LayerId>, PlacementError> {
        let Some(layer) = ctx.layers.occupied_layer_at(cell) else {
            return Ok(None);
        };
        let record = ctx.remove_object(layer, cell)?;
        log::debug!("removed {} from {}", record.unique_id, layer);

        let position = ctx.cell_to_world(cell);
        ctx.preview.update(position, false);
        Ok(Some(layer))
    }

    pub fn end(&mut self, ctx: &mut BuildContext) {
        ctx.preview.hide();
    }
}

//! Editing mode - pick an object up and put it down elsewhere.
//!
//! Runs as a removal first. The click that picks an object up captures what
//! is needed to put it back, then the state switches to placing the same
//! type. Cancelling before it is put down restores it where it was.

use super::context::BuildContext;
use super::placing::PlacingState;
use super::removing::RemovingState;
use crate::components::{type_codes, Cell, PlacementRecord, ShelfData};
use crate::error::PlacementError;
use crate::grid::LayerId;

/// What was picked up, as it was before removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    /// The grid record verbatim, id and cells included
    pub record: PlacementRecord,
    pub origin: Cell,
    /// Shelf contents to carry along, for container types
    pub shelf_data: Option<ShelfData>,
}

impl Pickup {
    pub fn type_code(&self) -> i32 {
        self.record.type_code
    }

    pub fn unique_id(&self) -> &str {
        &self.record.unique_id
    }
}

#[derive(Debug, Clone)]
pub enum EditPhase {
    /// Waiting for the click that picks something up
    Removing(RemovingState),
    /// Carrying the picked-up object
    Placing(PlacingState),
    /// Put down, or ended
    Done,
}

#[derive(Debug, Clone)]
pub struct EditingState {
    phase: EditPhase,
    pickup: Option<Pickup>,
}

impl EditingState {
    pub fn new(ctx: &mut BuildContext) -> Self {
        Self {
            phase: EditPhase::Removing(RemovingState::new(ctx)),
            pickup: None,
        }
    }

    pub fn phase(&self) -> &EditPhase {
        &self.phase
    }

    pub fn pickup(&self) -> Option<&Pickup> {
        self.pickup.as_ref()
    }

    /// The object was put down and the session has nothing left to do.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, EditPhase::Done)
    }

    pub fn rotation(&self) -> Option<i32> {
        match &self.phase {
            EditPhase::Placing(placing) => Some(placing.rotation()),
            _ => None,
        }
    }

    pub fn on_hover(&mut self, ctx: &mut BuildContext, cell: Cell) {
        match &mut self.phase {
            EditPhase::Removing(removing) => removing.on_hover(ctx, cell),
            EditPhase::Placing(placing) => placing.on_hover(ctx, cell),
            EditPhase::Done => {}
        }
    }

    pub fn on_hover_with_rotation(&mut self, ctx: &mut BuildContext, cell: Cell, rotation_degrees: i32) {
        if let EditPhase::Placing(placing) = &mut self.phase {
            placing.on_hover_with_rotation(ctx, cell, rotation_degrees);
        }
    }

    pub fn on_confirm(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
    ) -> Result<Option<LayerId>, PlacementError> {
        match self.phase {
            EditPhase::Removing(_) => self.pick_up(ctx, cell),
            EditPhase::Placing(_) => self.put_down(ctx, cell),
            EditPhase::Done => Ok(None),
        }
    }

    fn pick_up(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
    ) -> Result<Option<LayerId>, PlacementError> {
        let Some(layer) = ctx.layers.occupied_layer_at(cell) else {
            return Ok(None);
        };
        let record = match ctx.layers.get(layer).record_at(cell) {
            Some(record) => record.clone(),
            None => return Err(PlacementError::NotOccupied(cell)),
        };
        // Resolve the type before anything is removed so a bad catalog
        // cannot lose the object.
        if ctx.catalog.get(record.type_code).is_none() {
            return Err(PlacementError::UnknownObjectType(record.type_code));
        }

        let shelf_data = if type_codes::is_container(record.type_code) {
            Some(ctx.containers.lookup(&record.unique_id).unwrap_or_default())
        } else {
            None
        };
        let pickup = Pickup {
            origin: record.origin().unwrap_or(cell),
            record,
            shelf_data,
        };

        let changed = match &mut self.phase {
            EditPhase::Removing(removing) => {
                let changed = removing.on_confirm(ctx, cell)?;
                removing.end(ctx);
                changed
            }
            _ => None,
        };

        let placing = PlacingState::new(ctx, pickup.type_code(), 0)?;
        log::info!(
            "picked up {} from {} (rotation {})",
            pickup.unique_id(),
            pickup.origin,
            pickup.record.rotation_degrees
        );
        self.pickup = Some(pickup);
        self.phase = EditPhase::Placing(placing);
        Ok(changed)
    }

    fn put_down(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
    ) -> Result<Option<LayerId>, PlacementError> {
        let EditPhase::Placing(placing) = &mut self.phase else {
            return Ok(None);
        };
        let shelf_data = self
            .pickup
            .as_ref()
            .and_then(|p| p.shelf_data.clone())
            .unwrap_or_default();
        let changed = placing.place(ctx, cell, shelf_data)?;
        if changed.is_some() {
            if let Some(pickup) = self.pickup.take() {
                log::info!("moved {} to {}", pickup.unique_id(), cell);
            }
            self.phase = EditPhase::Done;
        }
        Ok(changed)
    }

    /// Leave edit mode. An object still being carried goes back to where it
    /// was picked up, with its original rotation and shelf contents.
    pub fn end(&mut self, ctx: &mut BuildContext) -> Result<Option<LayerId>, PlacementError> {
        let carried = match self.phase {
            EditPhase::Placing(_) => self.pickup.take(),
            _ => None,
        };
        self.phase = EditPhase::Done;
        ctx.preview.hide();

        match carried {
            Some(pickup) => Self::restore(ctx, pickup).map(Some),
            None => Ok(None),
        }
    }

    fn restore(ctx: &mut BuildContext, pickup: Pickup) -> Result<LayerId, PlacementError> {
        let grid = ctx.layers.get(LayerId::for_type(pickup.type_code()));
        if pickup.record.occupied_cells.iter().any(|c| grid.is_occupied(*c)) {
            log::error!(
                "cannot restore {} at {}: cells no longer free",
                pickup.unique_id(),
                pickup.origin
            );
            return Err(PlacementError::RestoreBlocked {
                unique_id: pickup.record.unique_id,
                origin: pickup.origin,
            });
        }
        let unique_id = pickup.record.unique_id.clone();
        let layer = ctx.restore_record(pickup.record, pickup.shelf_data.unwrap_or_default())?;
        log::info!("restored {} at {}", unique_id, pickup.origin);
        Ok(layer)
    }
}

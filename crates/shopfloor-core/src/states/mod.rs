//! Building states - the three interaction modes and their shared context.
//!
//! Each mode handles the same four events. `BuildingState` dispatches them
//! to whichever mode is active.

pub mod context;
pub mod editing;
pub mod placing;
pub mod removing;

pub use context::BuildContext;
pub use editing::{EditPhase, EditingState, Pickup};
pub use placing::PlacingState;
pub use removing::RemovingState;

use crate::components::Cell;
use crate::error::PlacementError;
use crate::grid::LayerId;

/// Which mode a `BuildingState` is in, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Placing,
    Removing,
    Editing,
}

#[derive(Debug, Clone)]
pub enum BuildingState {
    Placing(PlacingState),
    Removing(RemovingState),
    Editing(EditingState),
}

impl BuildingState {
    pub fn kind(&self) -> ModeKind {
        match self {
            BuildingState::Placing(_) => ModeKind::Placing,
            BuildingState::Removing(_) => ModeKind::Removing,
            BuildingState::Editing(_) => ModeKind::Editing,
        }
    }

    /// Apply the action at `cell`. Returns the layer that changed, if any.
    pub fn on_confirm(
        &mut self,
        ctx: &mut BuildContext,
        cell: Cell,
    ) -> Result<Option<LayerId>, PlacementError> {
        match self {
            BuildingState::Placing(s) => s.on_confirm(ctx, cell),
            BuildingState::Removing(s) => s.on_confirm(ctx, cell),
            BuildingState::Editing(s) => s.on_confirm(ctx, cell),
        }
    }

    /// Refresh preview feedback for `cell`. Never mutates a grid.
    pub fn on_hover(&mut self, ctx: &mut BuildContext, cell: Cell) {
        match self {
            BuildingState::Placing(s) => s.on_hover(ctx, cell),
            BuildingState::Removing(s) => s.on_hover(ctx, cell),
            BuildingState::Editing(s) => s.on_hover(ctx, cell),
        }
    }

    /// Ignored while removing.
    pub fn on_hover_with_rotation(&mut self, ctx: &mut BuildContext, cell: Cell, rotation_degrees: i32) {
        match self {
            BuildingState::Placing(s) => s.on_hover_with_rotation(ctx, cell, rotation_degrees),
            BuildingState::Removing(_) => {}
            BuildingState::Editing(s) => s.on_hover_with_rotation(ctx, cell, rotation_degrees),
        }
    }

    /// Tear the mode down. Only an edit in progress can change a grid here,
    /// by putting the carried object back.
    pub fn end(&mut self, ctx: &mut BuildContext) -> Result<Option<LayerId>, PlacementError> {
        match self {
            BuildingState::Placing(s) => {
                s.end(ctx);
                Ok(None)
            }
            BuildingState::Removing(s) => {
                s.end(ctx);
                Ok(None)
            }
            BuildingState::Editing(s) => s.end(ctx),
        }
    }

    /// Whether the mode has completed on its own.
    pub fn is_finished(&self) -> bool {
        match self {
            BuildingState::Editing(s) => s.is_finished(),
            _ => false,
        }
    }

    /// Rotation the mode is placing with, if it is placing anything.
    pub fn rotation(&self) -> Option<i32> {
        match self {
            BuildingState::Placing(s) => Some(s.rotation()),
            BuildingState::Removing(_) => None,
            BuildingState::Editing(s) => s.rotation(),
        }
    }
}

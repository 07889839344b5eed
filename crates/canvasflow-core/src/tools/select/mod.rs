//! The select tool: pick, marquee, move, resize and rotate shapes.

mod brushing;
mod idle;
mod pinching;
mod pointing;
mod resizing;
mod rotating;
mod translating;

use crate::app::{App, SELECT_TOOL};
use crate::error::StateResult;
use crate::state::{PointerHandler, StateDef, StateId};

pub(crate) fn state() -> StateDef<App> {
    StateDef::new(SELECT_TOOL).initial("idle").children([
        idle::state(),
        pointing::canvas(),
        brushing::state(),
        pointing::shape(),
        pointing::selected_shape(),
        pointing::shape_behind_bounds(),
        pointing::bounds_background(),
        translating::state(),
        resizing::state(),
        rotating::state(),
        pinching::state(),
    ])
}

/// Whether the pointer has travelled far enough from the press to count as a drag.
fn is_dragging(app: &App) -> bool {
    app.inputs.exceeds_drag_threshold(app.settings.drag_threshold)
}

/// Run a state's pointer-move logic again at the current input position.
fn rerun_move(app: &mut App, id: StateId, on_move: PointerHandler<App>) -> StateResult {
    let event = app.current_pointer_event();
    on_move(app, id, &event)
}

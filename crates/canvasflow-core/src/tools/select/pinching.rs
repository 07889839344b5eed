use crate::app::App;
use crate::error::StateResult;
use crate::events::{PinchEvent, TransitionData};
use crate::state::{Handlers, StateDef, StateId};
use crate::tools::transition_tool;

pub(super) fn state() -> StateDef<App> {
    StateDef::new("pinching").handlers(Handlers {
        on_pinch,
        on_pinch_end,
        ..Handlers::default()
    })
}

fn on_pinch(app: &mut App, _: StateId, event: &PinchEvent) -> StateResult {
    app.viewport.pinch_zoom(event.point, event.delta, event.scale);
    Ok(())
}

fn on_pinch_end(app: &mut App, id: StateId, _: &PinchEvent) -> StateResult {
    transition_tool(app, id, "idle", TransitionData::None)
}

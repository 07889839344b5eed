use crate::app::App;
use crate::error::StateResult;
use crate::events::{BoundsTarget, EventTarget, PinchEvent, PointerEvent, TransitionData};
use crate::state::{ExitInfo, Handlers, StateDef, StateId};
use crate::tools::transition_tool;

pub(super) fn state() -> StateDef<App> {
    StateDef::new("idle")
        .handlers(Handlers {
            on_exit,
            on_pointer_enter,
            on_pointer_leave,
            on_pointer_down,
            on_pinch_start,
            ..Handlers::default()
        })
        .shortcut("Delete,Backspace", |app, _| app.delete_selected())
}

fn on_exit(app: &mut App, _: StateId, _: &ExitInfo) -> StateResult {
    app.hover(None);
    Ok(())
}

fn on_pointer_enter(app: &mut App, _: StateId, event: &PointerEvent) -> StateResult {
    if event.order > 0 {
        return Ok(());
    }
    if let EventTarget::Shape(id) = event.target {
        app.hover(Some(id));
    }
    Ok(())
}

fn on_pointer_leave(app: &mut App, _: StateId, event: &PointerEvent) -> StateResult {
    if event.order > 0 {
        return Ok(());
    }
    if let EventTarget::Shape(_) = event.target {
        app.hover(None);
    }
    Ok(())
}

fn on_pointer_down(app: &mut App, id: StateId, event: &PointerEvent) -> StateResult {
    // Holding ctrl ignores shapes.
    if app.inputs.modifiers.ctrl {
        return transition_tool(app, id, "pointingCanvas", TransitionData::None);
    }

    match event.target {
        EventTarget::Bounds(BoundsTarget::Center) => Ok(()),
        EventTarget::Bounds(BoundsTarget::Background) => {
            transition_tool(app, id, "pointingBoundsBackground", TransitionData::None)
        }
        EventTarget::Bounds(BoundsTarget::Rotate) => {
            transition_tool(app, id, "rotatingShapes", TransitionData::None)
        }
        EventTarget::Bounds(BoundsTarget::Handle(handle)) => {
            transition_tool(app, id, "resizingShapes", TransitionData::Handle(handle))
        }
        EventTarget::Shape(shape) => {
            let data = TransitionData::Shape(shape);
            if app.selection.is_selected(shape) {
                return transition_tool(app, id, "pointingSelectedShape", data);
            }
            let behind_bounds = app
                .selected_bounds()
                .is_some_and(|b| b.rotated().contains_point(app.inputs.current_point));
            if behind_bounds {
                transition_tool(app, id, "pointingShapeBehindBounds", data)
            } else {
                transition_tool(app, id, "pointingShape", data)
            }
        }
        EventTarget::Canvas => transition_tool(app, id, "pointingCanvas", TransitionData::None),
    }
}

fn on_pinch_start(app: &mut App, id: StateId, event: &PinchEvent) -> StateResult {
    transition_tool(app, id, "pinching", TransitionData::Pinch(*event))
}

//! Press states that wait to see whether the press becomes a drag.

use super::{is_dragging, rerun_move};
use crate::app::App;
use crate::error::StateResult;
use crate::events::{PinchEvent, PointerEvent, TransitionData, WheelEvent};
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{begin_session, end_session, transition_tool, Session};

fn to_pinching(app: &mut App, id: StateId, event: &PinchEvent) -> StateResult {
    transition_tool(app, id, "pinching", TransitionData::Pinch(*event))
}

fn end(app: &mut App, _: StateId, _: &ExitInfo) -> StateResult {
    end_session(app);
    Ok(())
}

/// Shape the press landed on, kept in the session.
fn pointed_shape(app: &App) -> Option<crate::shape::ShapeId> {
    match app.session {
        Session::Pointing { shape } => Some(shape),
        _ => None,
    }
}

fn begin_pointing(app: &mut App, info: &EnterInfo) {
    if let TransitionData::Shape(shape) = info.data {
        begin_session(app, Session::Pointing { shape });
    }
}

// --- pointingCanvas ---

pub(super) fn canvas() -> StateDef<App> {
    StateDef::new("pointingCanvas").handlers(Handlers {
        on_enter: canvas_enter,
        on_wheel: canvas_wheel,
        on_pointer_move: canvas_move,
        on_pointer_up: canvas_up,
        on_pinch_start: to_pinching,
        ..Handlers::default()
    })
}

fn canvas_enter(app: &mut App, _: StateId, _: &EnterInfo) -> StateResult {
    if !app.inputs.modifiers.shift {
        app.deselect_all();
    }
    Ok(())
}

fn canvas_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    rerun_move(app, id, canvas_move)
}

fn canvas_move(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if is_dragging(app) {
        return transition_tool(app, id, "brushing", TransitionData::None);
    }
    Ok(())
}

fn canvas_up(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if !app.inputs.modifiers.shift {
        app.deselect_all();
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

// --- pointingShape ---

pub(super) fn shape() -> StateDef<App> {
    StateDef::new("pointingShape").handlers(Handlers {
        on_enter: shape_enter,
        on_exit: end,
        on_wheel: translate_wheel,
        on_pointer_move: translate_on_drag,
        on_pointer_up: to_idle,
        on_pinch_start: to_pinching,
        ..Handlers::default()
    })
}

fn shape_enter(app: &mut App, _: StateId, info: &EnterInfo) -> StateResult {
    if let TransitionData::Shape(shape) = info.data {
        if app.inputs.modifiers.shift {
            app.selection.add(shape);
        } else {
            app.selection.select(shape);
        }
    }
    begin_pointing(app, info);
    Ok(())
}

fn translate_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    rerun_move(app, id, translate_on_drag)
}

fn translate_on_drag(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if is_dragging(app) {
        return transition_tool(app, id, "translating", TransitionData::None);
    }
    Ok(())
}

fn to_idle(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    transition_tool(app, id, "idle", TransitionData::None)
}

// --- pointingSelectedShape ---

pub(super) fn selected_shape() -> StateDef<App> {
    StateDef::new("pointingSelectedShape").handlers(Handlers {
        on_enter: pointing_enter,
        on_exit: end,
        on_wheel: translate_wheel,
        on_pointer_move: translate_on_drag,
        on_pointer_up: selected_shape_up,
        on_pinch_start: to_pinching,
        ..Handlers::default()
    })
}

fn pointing_enter(app: &mut App, _: StateId, info: &EnterInfo) -> StateResult {
    begin_pointing(app, info);
    Ok(())
}

fn selected_shape_up(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if let Some(shape) = pointed_shape(app) {
        if app.inputs.modifiers.shift {
            app.selection.deselect(shape);
        } else {
            app.selection.select(shape);
        }
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

// --- pointingShapeBehindBounds ---

pub(super) fn shape_behind_bounds() -> StateDef<App> {
    StateDef::new("pointingShapeBehindBounds").handlers(Handlers {
        on_enter: pointing_enter,
        on_exit: end,
        on_wheel: translate_wheel,
        on_pointer_move: translate_on_drag,
        on_pointer_up: behind_bounds_up,
        on_pinch_start: to_pinching,
        ..Handlers::default()
    })
}

fn behind_bounds_up(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if let Some(shape) = pointed_shape(app) {
        if app.inputs.modifiers.shift {
            app.selection.add(shape);
        } else {
            app.selection.select(shape);
        }
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

// --- pointingBoundsBackground ---

pub(super) fn bounds_background() -> StateDef<App> {
    StateDef::new("pointingBoundsBackground").handlers(Handlers {
        on_wheel: translate_wheel,
        on_pointer_move: translate_on_drag,
        on_pointer_up: bounds_background_up,
        on_pinch_start: to_pinching,
        ..Handlers::default()
    })
}

fn bounds_background_up(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    app.deselect_all();
    transition_tool(app, id, "idle", TransitionData::None)
}

//! The erase tool: drag over shapes to mark them, release to delete them.

use crate::app::{App, ERASE_TOOL};
use crate::error::StateResult;
use crate::events::{KeyEvent, PointerEvent, TransitionData, WheelEvent};
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{shapes_at, transition_tool};

pub(crate) fn state() -> StateDef<App> {
    StateDef::new(ERASE_TOOL).initial("idle").children([
        StateDef::new("idle").handlers(Handlers {
            on_pointer_down: idle_down,
            ..Handlers::default()
        }),
        StateDef::new("pointing").handlers(Handlers {
            on_enter: mark_under_pointer,
            on_exit: clear_marks,
            on_wheel: pointing_wheel,
            on_pointer_move: pointing_move,
            on_pointer_up: erase_marked,
            on_key_down: cancel,
            ..Handlers::default()
        }),
        StateDef::new("erasing").handlers(Handlers {
            on_enter: mark_under_pointer,
            on_exit: clear_marks,
            on_wheel: erasing_wheel,
            on_pointer_move: erasing_move,
            on_pointer_up: erase_marked,
            on_key_down: cancel,
            ..Handlers::default()
        }),
    ])
}

fn idle_down(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    transition_tool(app, id, "pointing", TransitionData::None)
}

fn mark(app: &mut App) {
    for id in shapes_at(app, app.inputs.current_point) {
        app.selection.add_erasing(id);
    }
}

fn mark_under_pointer(app: &mut App, _: StateId, _: &EnterInfo) -> StateResult {
    mark(app);
    Ok(())
}

fn clear_marks(app: &mut App, _: StateId, info: &ExitInfo) -> StateResult {
    // Marks carry over from pointing into erasing.
    if info.to_id != "erasing" {
        app.selection.take_erasing();
    }
    Ok(())
}

fn pointing_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    let event = app.current_pointer_event();
    pointing_move(app, id, &event)
}

fn pointing_move(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if app.inputs.exceeds_drag_threshold(app.settings.drag_threshold) {
        return transition_tool(app, id, "erasing", TransitionData::None);
    }
    Ok(())
}

fn erasing_wheel(app: &mut App, _: StateId, _: &WheelEvent) -> StateResult {
    mark(app);
    Ok(())
}

fn erasing_move(app: &mut App, _: StateId, _: &PointerEvent) -> StateResult {
    mark(app);
    Ok(())
}

fn erase_marked(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    let ids = app.selection.take_erasing();
    transition_tool(app, id, "idle", TransitionData::None)?;
    log::debug!("Erasing {} shapes", ids.len());
    app.delete_shapes(&ids)
}

fn cancel(app: &mut App, id: StateId, event: &KeyEvent) -> StateResult {
    if event.key != "Escape" {
        return Ok(());
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

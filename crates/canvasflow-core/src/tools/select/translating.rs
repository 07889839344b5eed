//! Moving the selected shapes.

use super::rerun_move;
use crate::app::App;
use crate::error::{ShapeError, StateResult};
use crate::events::{KeyEvent, PointerEvent, TransitionData, WheelEvent};
use crate::shape::ShapeUpdate;
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{begin_session, end_session, restore_shapes, transition_tool, Session, TranslateSnapshot};
use kurbo::Vec2;

pub(super) fn state() -> StateDef<App> {
    StateDef::new("translating").handlers(Handlers {
        on_enter,
        on_exit,
        on_wheel,
        on_pointer_move,
        on_pointer_up,
        on_key_down,
        ..Handlers::default()
    })
}

fn on_enter(app: &mut App, id: StateId, _: &EnterInfo) -> StateResult {
    let snapshots = app
        .selected_shapes()
        .iter()
        .map(|s| -> Result<_, ShapeError> {
            Ok(TranslateSnapshot {
                id: s.id(),
                point: s.point(),
                props: s.serialized()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    begin_session(app, Session::Translating { snapshots });
    rerun_move(app, id, on_pointer_move)
}

fn on_exit(app: &mut App, _: StateId, _: &ExitInfo) -> StateResult {
    end_session(app);
    Ok(())
}

fn on_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    rerun_move(app, id, on_pointer_move)
}

fn on_pointer_move(app: &mut App, _: StateId, _: &PointerEvent) -> StateResult {
    let Session::Translating { snapshots } = &app.session else {
        return Ok(());
    };
    let mut delta = app.inputs.drag_delta();
    if app.inputs.modifiers.shift {
        // Lock to the dominant axis.
        if delta.x.abs() > delta.y.abs() {
            delta = Vec2::new(delta.x, 0.0);
        } else {
            delta = Vec2::new(0.0, delta.y);
        }
    }
    let moves: Vec<_> = snapshots.iter().map(|s| (s.id, s.point + delta)).collect();
    for (id, point) in moves {
        app.shape_mut(id)?.update(&ShapeUpdate::point(point));
    }
    Ok(())
}

fn on_pointer_up(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    transition_tool(app, id, "idle", TransitionData::None)?;
    app.persist()?;
    Ok(())
}

fn on_key_down(app: &mut App, id: StateId, event: &KeyEvent) -> StateResult {
    if event.key != "Escape" {
        return Ok(());
    }
    if let Session::Translating { snapshots } = &app.session {
        let props: Vec<_> = snapshots.iter().map(|s| s.props.clone()).collect();
        restore_shapes(app, &props)?;
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

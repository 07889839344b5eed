//! Rotating the selection about the center of its bounds.

use super::rerun_move;
use crate::app::App;
use crate::error::{ShapeError, StateError, StateResult};
use crate::events::{KeyEvent, PointerEvent, TransitionData, WheelEvent};
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{
    begin_session, end_session, restore_shapes, transition_tool, RotateSession, RotateSnapshot, Session,
};
use crate::transform::{rotate_shape, rotation_delta, RotateStart};

pub(super) fn state() -> StateDef<App> {
    StateDef::new("rotatingShapes").handlers(Handlers {
        on_enter,
        on_exit,
        on_wheel,
        on_pointer_move,
        on_pointer_up,
        on_key_down,
        ..Handlers::default()
    })
}

fn on_enter(app: &mut App, _: StateId, _: &EnterInfo) -> StateResult {
    let bounds = app
        .selected_bounds()
        .ok_or(StateError::MissingSelectionBounds("rotatingShapes"))?;
    let snapshots = app
        .selected_shapes()
        .iter()
        .map(|s| -> Result<_, ShapeError> {
            Ok(RotateSnapshot {
                id: s.id(),
                start: RotateStart {
                    point: s.point(),
                    center: s.center(),
                    rotation: s.rotation(),
                    handles: s.handles().map(<[_]>::to_vec),
                },
                props: s.serialized()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let session = RotateSession {
        center: bounds.center(),
        start_point: app.inputs.current_point,
        snapshots,
    };
    begin_session(app, Session::Rotating(session));
    Ok(())
}

fn on_exit(app: &mut App, _: StateId, _: &ExitInfo) -> StateResult {
    end_session(app);
    Ok(())
}

fn on_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    rerun_move(app, id, on_pointer_move)
}

fn on_pointer_move(app: &mut App, _: StateId, _: &PointerEvent) -> StateResult {
    let Session::Rotating(session) = &app.session else {
        return Ok(());
    };
    let snap = app
        .inputs
        .modifiers
        .shift
        .then_some(app.settings.rotation_snap_segments);
    let delta = rotation_delta(session.center, session.start_point, app.inputs.current_point, snap);

    let updates: Vec<_> = session
        .snapshots
        .iter()
        .map(|s| (s.id, rotate_shape(&s.start, session.center, delta, snap)))
        .collect();
    for (id, update) in updates {
        app.shape_mut(id)?.update(&update);
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
    if let Session::Rotating(session) = &app.session {
        let props: Vec<_> = session.snapshots.iter().map(|s| s.props.clone()).collect();
        restore_shapes(app, &props)?;
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

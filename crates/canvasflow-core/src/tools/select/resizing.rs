//! Resizing the selection by a corner or edge handle.

use super::rerun_move;
use crate::app::App;
use crate::error::{ShapeError, StateError, StateResult};
use crate::events::{KeyEvent, PointerEvent, TransitionData, WheelEvent};
use crate::shape::ResizeInfo;
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{
    begin_session, end_session, restore_shapes, transition_tool, ResizeSession, Session, TransformSnapshot,
};
use crate::transform::{relative_transformed_bounds, transform_origin, transformed_bounds};

pub(super) fn state() -> StateDef<App> {
    StateDef::new("resizingShapes").handlers(Handlers {
        on_enter,
        on_exit,
        on_wheel,
        on_pointer_move,
        on_pointer_up,
        on_key_down,
        ..Handlers::default()
    })
}

fn on_enter(app: &mut App, _: StateId, info: &EnterInfo) -> StateResult {
    let TransitionData::Handle(handle) = info.data else {
        return Err(StateError::MissingTransitionData("resizingShapes", "resize handle"));
    };
    let initial_common = app
        .selected_bounds()
        .ok_or(StateError::MissingSelectionBounds("resizingShapes"))?;

    let shapes = app.selected_shapes();
    let rotation = match shapes.as_slice() {
        [single] => single.rotation(),
        _ => 0.0,
    };
    let snapshots = shapes
        .iter()
        .map(|s| -> Result<_, ShapeError> {
            let bounds = s.bounds();
            Ok(TransformSnapshot {
                id: s.id(),
                initial_bounds: bounds,
                props: s.serialized()?,
                transform_origin: transform_origin(&bounds, &initial_common),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("Resizing {} shapes by {:?}", snapshots.len(), handle);
    for snapshot in &snapshots {
        app.shape_mut(snapshot.id)?.on_resize_start();
    }
    begin_session(
        app,
        Session::Resizing(ResizeSession {
            handle,
            initial_common,
            rotation,
            snapshots,
        }),
    );
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
    let Session::Resizing(session) = &app.session else {
        return Ok(());
    };
    let next = transformed_bounds(
        &session.initial_common,
        session.handle,
        app.inputs.drag_delta(),
        session.rotation,
        app.inputs.modifiers.shift,
    );

    let updates: Vec<_> = session
        .snapshots
        .iter()
        .map(|s| {
            let bounds = relative_transformed_bounds(
                &next.bounds,
                &session.initial_common,
                &s.initial_bounds,
                next.flip_x(),
                next.flip_y(),
            );
            let info = ResizeInfo {
                handle: session.handle,
                initial_props: s.props.clone(),
                initial_bounds: s.initial_bounds,
                scale_x: next.scale_x,
                scale_y: next.scale_y,
                transform_origin: s.transform_origin,
            };
            (s.id, bounds, info)
        })
        .collect();

    for (id, bounds, info) in updates {
        app.shape_mut(id)?.on_resize(&bounds, &info)?;
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
    if let Session::Resizing(session) = &app.session {
        let props: Vec<_> = session.snapshots.iter().map(|s| s.props.clone()).collect();
        restore_shapes(app, &props)?;
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

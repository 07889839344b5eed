//! Tools that draw a new shape by dragging out its extent.
//!
//! Each tool runs `idle` → `pointing` → `creating`. The shape appears once the
//! press turns into a drag, follows the pointer while creating, and is kept
//! (as one undo step) on release. Escape while creating throws it away.

use crate::app::{App, LINE_TOOL, RECT_TOOL, SELECT_TOOL};
use crate::error::StateResult;
use crate::events::{KeyEvent, PointerEvent, TransitionData, WheelEvent};
use crate::geometry::{angle, snap_angle_to_segments};
use crate::shape::{LineShape, RectShape, Shape};
use crate::state::{EnterInfo, ExitInfo, Handlers, StateDef, StateId};
use crate::tools::{begin_session, end_session, transition_tool, Session};
use kurbo::{Point, Vec2};

/// Directions a Shift-constrained line snaps to.
const LINE_SNAP_SEGMENTS: u32 = 8;

/// A tool that builds one kind of shape from a drag.
pub trait ShapeTool {
    /// Name of the tool state under the root.
    const NAME: &'static str;

    /// The shape spanning a drag from `origin` to `current`.
    fn build(origin: Point, current: Point, constrained: bool) -> Box<dyn Shape>;
}

/// Draws rectangles. Shift keeps them square.
#[derive(Debug, Clone, Copy)]
pub struct RectTool;

impl ShapeTool for RectTool {
    const NAME: &'static str = RECT_TOOL;

    fn build(origin: Point, current: Point, constrained: bool) -> Box<dyn Shape> {
        let mut corner = current;
        if constrained {
            let d = current - origin;
            let side = d.x.abs().max(d.y.abs());
            corner = origin + Vec2::new(side.copysign(d.x), side.copysign(d.y));
        }
        Box::new(RectShape::from_corners(origin, corner))
    }
}

/// Draws straight lines. Shift snaps them to multiples of 45°.
#[derive(Debug, Clone, Copy)]
pub struct LineTool;

impl ShapeTool for LineTool {
    const NAME: &'static str = LINE_TOOL;

    fn build(origin: Point, current: Point, constrained: bool) -> Box<dyn Shape> {
        let mut end = current;
        if constrained {
            let length = (current - origin).hypot();
            let (sin, cos) = snap_angle_to_segments(angle(origin, current), LINE_SNAP_SEGMENTS).sin_cos();
            end = origin + Vec2::new(length * cos, length * sin);
        }
        Box::new(LineShape::new(origin, end))
    }
}

pub(crate) fn state<T: ShapeTool>() -> StateDef<App> {
    StateDef::new(T::NAME).initial("idle").children([
        StateDef::new("idle").handlers(Handlers {
            on_pointer_down: idle_down,
            ..Handlers::default()
        }),
        StateDef::new("pointing").handlers(Handlers {
            on_wheel: pointing_wheel,
            on_pointer_move: pointing_move,
            on_pointer_up: back_to_idle,
            on_key_down: pointing_key_down,
            ..Handlers::default()
        }),
        StateDef::new("creating").handlers(Handlers {
            on_enter: creating_enter::<T>,
            on_exit: creating_exit,
            on_wheel: creating_wheel::<T>,
            on_pointer_move: creating_move::<T>,
            on_pointer_up: creating_up,
            on_key_down: creating_key_down,
            ..Handlers::default()
        }),
    ])
}

fn idle_down(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    transition_tool(app, id, "pointing", TransitionData::None)
}

fn back_to_idle(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    transition_tool(app, id, "idle", TransitionData::None)
}

fn pointing_wheel(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    let event = app.current_pointer_event();
    pointing_move(app, id, &event)
}

fn pointing_move(app: &mut App, id: StateId, _: &PointerEvent) -> StateResult {
    if app.inputs.exceeds_drag_threshold(app.settings.drag_threshold) {
        app.deselect_all();
        return transition_tool(app, id, "creating", TransitionData::None);
    }
    Ok(())
}

fn pointing_key_down(app: &mut App, id: StateId, event: &KeyEvent) -> StateResult {
    if event.key != "Escape" {
        return Ok(());
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

fn build_at_pointer<T: ShapeTool>(app: &App) -> Box<dyn Shape> {
    T::build(
        app.inputs.origin_point,
        app.inputs.current_point,
        app.inputs.modifiers.shift,
    )
}

fn creating_enter<T: ShapeTool>(app: &mut App, _: StateId, _: &EnterInfo) -> StateResult {
    let built = build_at_pointer::<T>(app);
    let shape = app.add_shape(built);
    log::debug!("Creating {} shape {}", T::NAME, shape);
    app.select([shape]);
    begin_session(app, Session::Creating { shape });
    Ok(())
}

fn creating_exit(app: &mut App, _: StateId, _: &ExitInfo) -> StateResult {
    end_session(app);
    Ok(())
}

fn creating_wheel<T: ShapeTool>(app: &mut App, id: StateId, _: &WheelEvent) -> StateResult {
    let event = app.current_pointer_event();
    creating_move::<T>(app, id, &event)
}

fn creating_move<T: ShapeTool>(app: &mut App, _: StateId, _: &PointerEvent) -> StateResult {
    let Session::Creating { shape } = app.session else {
        return Ok(());
    };
    let next = build_at_pointer::<T>(app).serialized()?;
    app.shape_mut(shape)?.restore(&next)?;
    Ok(())
}

/// Keep the shape and hand it to the select tool.
fn creating_up(app: &mut App, _: StateId, _: &PointerEvent) -> StateResult {
    app.select_tool(SELECT_TOOL)?;
    app.persist()?;
    Ok(())
}

fn creating_key_down(app: &mut App, id: StateId, event: &KeyEvent) -> StateResult {
    if event.key != "Escape" {
        return Ok(());
    }
    if let Session::Creating { shape } = app.session {
        app.document.current_page_mut().remove_shapes(&[shape]);
        app.selection.deselect(shape);
    }
    transition_tool(app, id, "idle", TransitionData::None)
}

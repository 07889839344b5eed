//! Tools: subtrees of the root state that turn input into edits.

pub mod create;
pub mod erase;
pub mod select;

use crate::app::App;
use crate::error::{StateError, StateResult};
use crate::events::TransitionData;
use crate::geometry::Bounds;
use crate::shape::{SerializedShape, ShapeId};
use crate::spatial_index::SpatialIndex;
use crate::state::{self, StateContext, StateId};
use crate::transform::{ResizeHandle, RotateStart};
use kurbo::Point;

/// Data held by the active tool state for the length of one interaction.
#[derive(Debug, Default)]
pub enum Session {
    #[default]
    Idle,
    /// A press on a shape that has not turned into a drag yet.
    Pointing { shape: ShapeId },
    Brushing {
        initial_selection: Vec<ShapeId>,
        index: SpatialIndex,
    },
    Translating { snapshots: Vec<TranslateSnapshot> },
    Resizing(ResizeSession),
    Rotating(RotateSession),
    /// A shape being drawn by a creation tool.
    Creating { shape: ShapeId },
}

impl Session {
    /// Sessions that edit shapes hold the history paused until they end.
    fn pauses_history(&self) -> bool {
        matches!(
            self,
            Session::Translating { .. }
                | Session::Resizing(_)
                | Session::Rotating(_)
                | Session::Creating { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateSnapshot {
    pub id: ShapeId,
    pub point: Point,
    pub props: SerializedShape,
}

/// A shape's state when a resize started.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSnapshot {
    pub id: ShapeId,
    pub initial_bounds: Bounds,
    pub props: SerializedShape,
    pub transform_origin: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub handle: ResizeHandle,
    pub initial_common: Bounds,
    /// Rotation of the box being dragged; non-zero only for a single rotated shape.
    pub rotation: f64,
    pub snapshots: Vec<TransformSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateSnapshot {
    pub id: ShapeId,
    pub start: RotateStart,
    pub props: SerializedShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateSession {
    pub center: Point,
    pub start_point: Point,
    pub snapshots: Vec<RotateSnapshot>,
}

/// Start a session, pausing the history if it edits shapes.
pub(crate) fn begin_session(app: &mut App, session: Session) {
    if session.pauses_history() {
        app.history.pause();
    }
    app.session = session;
}

/// Drop the current session, resuming the history if it was paused for it.
pub(crate) fn end_session(app: &mut App) {
    if std::mem::take(&mut app.session).pauses_history() {
        app.history.resume();
    }
}

/// Transition the tool that owns `current`.
pub(crate) fn transition_tool(app: &mut App, current: StateId, to: &str, data: TransitionData) -> StateResult {
    let tool = app.states().parent(current).ok_or(StateError::StaleState)?;
    state::transition(app, tool, to, data)
}

/// Put shapes back exactly as they were serialized.
pub(crate) fn restore_shapes(app: &mut App, snapshots: &[SerializedShape]) -> StateResult {
    for props in snapshots {
        app.shape_mut(props.id)?.restore(props)?;
    }
    Ok(())
}

/// Shapes on the current page under `point`, back to front.
pub(crate) fn shapes_at(app: &App, point: Point) -> Vec<ShapeId> {
    app.document
        .current_page()
        .shapes()
        .iter()
        .filter(|s| s.hit_test_point(point))
        .map(|s| s.id())
        .collect()
}

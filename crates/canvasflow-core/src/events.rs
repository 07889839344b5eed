//! Input events routed through the state tree.

use crate::shape::ShapeId;
use crate::transform::ResizeHandle;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Part of the selection bounds under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundsTarget {
    /// A corner or edge resize handle.
    Handle(ResizeHandle),
    /// The rotation handle.
    Rotate,
    /// The center handle. Ignored by the select tool.
    Center,
    /// The inside of the bounds, not covering a shape.
    Background,
}

/// What a pointer event hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    Canvas,
    Shape(ShapeId),
    Bounds(BoundsTarget),
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub target: EventTarget,
    /// Depth of the target among overlapping hits; `0` is the topmost.
    pub order: usize,
    pub point: Point,
    pub modifiers: Modifiers,
    pub button: Option<PointerButton>,
}

impl PointerEvent {
    /// A left-button event on the canvas with no modifiers.
    pub fn canvas(point: Point) -> Self {
        Self {
            target: EventTarget::Canvas,
            order: 0,
            point,
            modifiers: Modifiers::default(),
            button: Some(PointerButton::Left),
        }
    }

    /// A left-button event on a shape with no modifiers.
    pub fn shape(id: ShapeId, point: Point) -> Self {
        Self {
            target: EventTarget::Shape(id),
            ..Self::canvas(point)
        }
    }

    /// A left-button event on part of the selection bounds.
    pub fn bounds(target: BoundsTarget, point: Point) -> Self {
        Self {
            target: EventTarget::Bounds(target),
            ..Self::canvas(point)
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A key event. `key` uses DOM-style names (`"Shift"`, `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Whether the key is itself a modifier (Shift, Alt, Control or Meta).
    pub fn is_modifier(&self) -> bool {
        matches!(
            self.key.as_str(),
            "Shift" | "Alt" | "Control" | "Ctrl" | "Meta"
        )
    }
}

/// A wheel or trackpad scroll. Unlike pointer events, `point` and `delta` are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub point: Point,
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

/// A two-finger pinch gesture sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchEvent {
    /// Gesture center in screen coordinates.
    pub point: Point,
    /// Pan since the previous sample, in screen pixels.
    pub delta: Vec2,
    /// Zoom factor since the previous sample.
    pub scale: f64,
    pub modifiers: Modifiers,
}

/// Any event the state tree can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Wheel(WheelEvent),
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    PointerMove(PointerEvent),
    PointerEnter(PointerEvent),
    PointerLeave(PointerEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    PinchStart(PinchEvent),
    Pinch(PinchEvent),
    PinchEnd(PinchEvent),
}

impl Event {
    /// Handler name, used in trace logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Wheel(_) => "wheel",
            Event::PointerDown(_) => "pointer_down",
            Event::PointerUp(_) => "pointer_up",
            Event::PointerMove(_) => "pointer_move",
            Event::PointerEnter(_) => "pointer_enter",
            Event::PointerLeave(_) => "pointer_leave",
            Event::KeyDown(_) => "key_down",
            Event::KeyUp(_) => "key_up",
            Event::PinchStart(_) => "pinch_start",
            Event::Pinch(_) => "pinch",
            Event::PinchEnd(_) => "pinch_end",
        }
    }
}

/// Payload handed from `transition` to the entered state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TransitionData {
    #[default]
    None,
    Handle(ResizeHandle),
    Shape(ShapeId),
    Pinch(PinchEvent),
}

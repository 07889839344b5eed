//! canvasflow core
//!
//! Platform-agnostic editor core for an infinite drawing canvas: a
//! hierarchical state machine that routes input into tools, and the
//! geometry that resizes and rotates selections of shapes.

pub mod app;
pub mod document;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod input;
pub mod selection;
pub mod settings;
pub mod shape;
pub mod shortcuts;
pub mod spatial_index;
pub mod state;
pub mod subscriptions;
pub mod tools;
pub mod transform;
pub mod viewport;

pub use app::{App, ERASE_TOOL, LINE_TOOL, RECT_TOOL, SELECT_TOOL};
pub use document::{Document, Page, SerializedDocument, SerializedPage};
pub use error::{SettingsError, ShapeError, StateError, StateResult};
pub use events::{
    BoundsTarget, Event, EventTarget, KeyEvent, Modifiers, PinchEvent, PointerButton, PointerEvent,
    TransitionData, WheelEvent,
};
pub use geometry::Bounds;
pub use history::History;
pub use input::InputState;
pub use selection::SelectionModel;
pub use settings::EditorSettings;
pub use shape::{LineShape, RectShape, SerializedShape, Shape, ShapeId, ShapeRegistry, ShapeUpdate};
pub use shortcuts::{Chord, KeyCombo, Platform};
pub use state::{StateContext, StateDef, StateId, StateTree};
pub use subscriptions::{LifecycleEvent, SubscriptionId};
pub use tools::create::{LineTool, RectTool, ShapeTool};
pub use transform::{Corner, Edge, ResizeHandle};
pub use viewport::Viewport;

//! Shape capability used by the tools, plus the built-in sample shapes.

mod line;
mod rect;

pub use line::{LineProps, LineShape};
pub use rect::{RectProps, RectShape};

use crate::error::ShapeError;
use crate::geometry::Bounds;
use crate::transform::ResizeHandle;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Hit tolerance for outline hit tests, in page units.
pub const HIT_TOLERANCE: f64 = 4.0;

/// Snapshot of a shape: enough to rebuild it through a [`ShapeRegistry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedShape {
    pub id: ShapeId,
    pub kind: String,
    pub props: serde_json::Value,
}

/// Geometry changes the tools ask a shape to apply. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeUpdate {
    pub point: Option<Point>,
    pub rotation: Option<f64>,
    /// New handle positions relative to `point`.
    pub handles: Option<Vec<Point>>,
}

impl ShapeUpdate {
    pub fn point(point: Point) -> Self {
        Self {
            point: Some(point),
            ..Default::default()
        }
    }
}

/// Context for [`Shape::on_resize`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeInfo {
    pub handle: ResizeHandle,
    /// Props captured when the resize started.
    pub initial_props: SerializedShape,
    pub initial_bounds: Bounds,
    /// Scale of the common bounds, negative on flipped axes.
    pub scale_x: f64,
    pub scale_y: f64,
    /// The shape's center as a normalized position inside the initial common bounds.
    pub transform_origin: Point,
}

/// A shape on a page.
///
/// The editor only reads geometry and asks for changes; how a shape stores or
/// redraws itself is up to the implementation.
pub trait Shape: fmt::Debug {
    fn id(&self) -> ShapeId;

    /// Kind name used by the [`ShapeRegistry`].
    fn kind(&self) -> &'static str;

    /// Anchor point (top-left of the unrotated shape).
    fn point(&self) -> Point;

    /// Rotation in radians about the center.
    fn rotation(&self) -> f64 {
        0.0
    }

    /// Unrotated bounds, carrying the shape's rotation.
    fn bounds(&self) -> Bounds;

    fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Axis-aligned bounds of the rotated shape.
    fn rotated_bounds(&self) -> Bounds {
        self.bounds().rotated()
    }

    /// Explicit handle points relative to [`Shape::point`], for shapes that have them.
    fn handles(&self) -> Option<&[Point]> {
        None
    }

    fn serialized(&self) -> Result<SerializedShape, ShapeError>;

    fn update(&mut self, update: &ShapeUpdate);

    /// Replace every prop with the snapshot's.
    fn restore(&mut self, snapshot: &SerializedShape) -> Result<(), ShapeError>;

    fn on_resize_start(&mut self) {}

    /// Fit the shape into `bounds` during a resize.
    fn on_resize(&mut self, bounds: &Bounds, info: &ResizeInfo) -> Result<(), ShapeError>;

    fn hit_test_point(&self, point: Point) -> bool;

    fn hit_test_bounds(&self, bounds: &Bounds) -> bool;
}

/// Encode a shape's props into a snapshot, tagging errors with the shape kind.
pub(crate) fn encode_props<T: Serialize>(id: ShapeId, kind: &str, props: &T) -> Result<SerializedShape, ShapeError> {
    let props = serde_json::to_value(props).map_err(|source| ShapeError::Encode {
        kind: kind.to_string(),
        source,
    })?;
    Ok(SerializedShape {
        id,
        kind: kind.to_string(),
        props,
    })
}

/// Decode props of a serialized shape, tagging errors with the shape kind.
pub(crate) fn decode_props<T: serde::de::DeserializeOwned>(
    snapshot: &SerializedShape,
) -> Result<T, ShapeError> {
    serde_json::from_value(snapshot.props.clone()).map_err(|source| ShapeError::Props {
        kind: snapshot.kind.clone(),
        source,
    })
}

/// Builds a shape from its snapshot.
pub type ShapeFactory = fn(&SerializedShape) -> Result<Box<dyn Shape>, ShapeError>;

/// Maps shape kind names to constructors.
#[derive(Clone)]
pub struct ShapeRegistry {
    factories: HashMap<String, ShapeFactory>,
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("ShapeRegistry").field("kinds", &kinds).finish()
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(RectShape::KIND, create_rect);
        registry.register(LineShape::KIND, create_line);
        registry
    }
}

fn create_rect(snapshot: &SerializedShape) -> Result<Box<dyn Shape>, ShapeError> {
    Ok(Box::new(RectShape::from_serialized(snapshot)?))
}

fn create_line(snapshot: &SerializedShape) -> Result<Box<dyn Shape>, ShapeError> {
    Ok(Box::new(LineShape::from_serialized(snapshot)?))
}

impl ShapeRegistry {
    /// A registry with no kinds.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: impl Into<String>, factory: ShapeFactory) {
        self.factories.insert(kind.into(), factory);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn create(&self, snapshot: &SerializedShape) -> Result<Box<dyn Shape>, ShapeError> {
        let factory = self
            .factories
            .get(&snapshot.kind)
            .ok_or_else(|| ShapeError::UnknownKind(snapshot.kind.clone()))?;
        factory(snapshot)
    }
}

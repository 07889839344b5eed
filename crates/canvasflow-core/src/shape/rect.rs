//! Rectangle shape.

use super::{decode_props, encode_props, ResizeInfo, SerializedShape, Shape, ShapeId, ShapeUpdate};
use crate::error::ShapeError;
use crate::geometry::{polygon_intersects_bounds, rotate_around, Bounds};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serialized props of a [`RectShape`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectProps {
    /// Top-left corner position.
    pub point: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
}

/// A rectangle with a scalar rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    id: ShapeId,
    props: RectProps,
}

impl RectShape {
    pub const KIND: &'static str = "rect";

    /// Minimum size a resize can shrink a rectangle to.
    pub const MIN_SIZE: f64 = 1.0;

    /// Create a new rectangle.
    pub fn new(point: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            props: RectProps {
                point,
                width,
                height,
                rotation: 0.0,
            },
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let b = Bounds::new(p1.x, p1.y, p2.x, p2.y);
        Self::new(b.top_left(), b.width(), b.height())
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.props.rotation = rotation;
        self
    }

    pub fn from_serialized(snapshot: &SerializedShape) -> Result<Self, ShapeError> {
        Ok(Self {
            id: snapshot.id,
            props: decode_props(snapshot)?,
        })
    }

    pub fn props(&self) -> &RectProps {
        &self.props
    }
}

impl Shape for RectShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn point(&self) -> Point {
        self.props.point
    }

    fn rotation(&self) -> f64 {
        self.props.rotation
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.props.point, self.props.width, self.props.height)
            .with_rotation(self.props.rotation)
    }

    fn serialized(&self) -> Result<SerializedShape, ShapeError> {
        encode_props(self.id, Self::KIND, &self.props)
    }

    fn update(&mut self, update: &ShapeUpdate) {
        if let Some(point) = update.point {
            self.props.point = point;
        }
        if let Some(rotation) = update.rotation {
            self.props.rotation = rotation;
        }
    }

    fn restore(&mut self, snapshot: &SerializedShape) -> Result<(), ShapeError> {
        self.props = decode_props(snapshot)?;
        Ok(())
    }

    fn on_resize(&mut self, bounds: &Bounds, _info: &ResizeInfo) -> Result<(), ShapeError> {
        self.props.point = bounds.top_left();
        self.props.width = bounds.width().max(Self::MIN_SIZE);
        self.props.height = bounds.height().max(Self::MIN_SIZE);
        Ok(())
    }

    fn hit_test_point(&self, point: Point) -> bool {
        let bounds = self.bounds();
        // Undo the rotation and test against the axis-aligned box.
        let local = rotate_around(point, bounds.center(), -self.props.rotation);
        bounds.contains_point(local)
    }

    fn hit_test_bounds(&self, bounds: &Bounds) -> bool {
        polygon_intersects_bounds(&self.bounds().rotated_corners(), bounds)
    }
}

//! Polyline shape with explicit handles.

use super::{decode_props, encode_props, ResizeInfo, SerializedShape, Shape, ShapeId, ShapeUpdate, HIT_TOLERANCE};
use crate::error::ShapeError;
use crate::geometry::{polyline_intersects_bounds, Bounds};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serialized props of a [`LineShape`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineProps {
    /// Top-left of the handles' bounds.
    pub point: Point,
    /// Points relative to `point`, in drawing order.
    pub handles: Vec<Point>,
}

/// A line segment or polyline. Rotation is baked into the handle positions.
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    id: ShapeId,
    props: LineProps,
}

impl LineShape {
    pub const KIND: &'static str = "line";

    /// Create a new line.
    pub fn new(start: Point, end: Point) -> Self {
        Self::from_points(&[start, end])
    }

    /// Create a polyline through page-space points.
    pub fn from_points(points: &[Point]) -> Self {
        let origin = Bounds::from_points(points)
            .map(|b| b.top_left())
            .unwrap_or(Point::ZERO);
        Self {
            id: Uuid::new_v4(),
            props: LineProps {
                point: origin,
                handles: points.iter().map(|p| (*p - origin).to_point()).collect(),
            },
        }
    }

    pub fn from_serialized(snapshot: &SerializedShape) -> Result<Self, ShapeError> {
        Ok(Self {
            id: snapshot.id,
            props: decode_props(snapshot)?,
        })
    }

    pub fn props(&self) -> &LineProps {
        &self.props
    }

    /// Handle positions in page space.
    pub fn all_points(&self) -> Vec<Point> {
        let offset = self.props.point.to_vec2();
        self.props.handles.iter().map(|h| *h + offset).collect()
    }
}

impl Shape for LineShape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn point(&self) -> Point {
        self.props.point
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.all_points())
            .unwrap_or_else(|| Bounds::from_origin_size(self.props.point, 0.0, 0.0))
    }

    fn handles(&self) -> Option<&[Point]> {
        Some(&self.props.handles)
    }

    fn serialized(&self) -> Result<SerializedShape, ShapeError> {
        encode_props(self.id, Self::KIND, &self.props)
    }

    fn update(&mut self, update: &ShapeUpdate) {
        if let Some(point) = update.point {
            self.props.point = point;
        }
        if let Some(handles) = &update.handles {
            self.props.handles = handles.clone();
        }
    }

    fn restore(&mut self, snapshot: &SerializedShape) -> Result<(), ShapeError> {
        self.props = decode_props(snapshot)?;
        Ok(())
    }

    /// Scale the initial handles into `bounds`, mirroring them on flipped axes.
    fn on_resize(&mut self, bounds: &Bounds, info: &ResizeInfo) -> Result<(), ShapeError> {
        let initial: LineProps = decode_props(&info.initial_props)?;
        let Some(hb) = Bounds::from_points(&initial.handles) else {
            return Ok(());
        };
        let flip_x = info.scale_x < 0.0;
        let flip_y = info.scale_y < 0.0;
        let normalize = |v: f64, min: f64, size: f64| if size == 0.0 { 0.0 } else { (v - min) / size };

        self.props.point = bounds.top_left();
        self.props.handles = initial
            .handles
            .iter()
            .map(|h| {
                let nx = normalize(h.x, hb.min_x(), hb.width());
                let ny = normalize(h.y, hb.min_y(), hb.height());
                Point::new(
                    (if flip_x { 1.0 - nx } else { nx }) * bounds.width(),
                    (if flip_y { 1.0 - ny } else { ny }) * bounds.height(),
                )
            })
            .collect();
        Ok(())
    }

    fn hit_test_point(&self, point: Point) -> bool {
        point_to_polyline_dist(point, &self.all_points()) <= HIT_TOLERANCE
    }

    fn hit_test_bounds(&self, bounds: &Bounds) -> bool {
        polyline_intersects_bounds(&self.all_points(), bounds)
    }
}

/// Distance from a point to a line segment (a→b).
fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv: Vec2 = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline.
fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [single] => (point - *single).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

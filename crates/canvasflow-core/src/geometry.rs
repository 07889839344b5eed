//! Bounding boxes and small geometry helpers shared by tools and shapes.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// An axis-aligned box with an optional rotation about its center.
///
/// `width` and `height` are derived from the edges and recomputed by every
/// constructor and mutator, so they always agree with `max - min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    rotation: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl Bounds {
    /// Create bounds from two opposite edges. Edges given in the wrong order are swapped.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
            rotation: 0.0,
        }
    }

    /// Create bounds from a top-left point and a size.
    pub fn from_origin_size(origin: Point, width: f64, height: f64) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    /// Smallest bounds containing all points, or `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bounds = Self::new(
                bounds.min_x.min(p.x),
                bounds.min_y.min(p.y),
                bounds.max_x.max(p.x),
                bounds.max_y.max(p.y),
            );
        }
        Some(bounds)
    }

    /// Smallest bounds containing every bounds in the iterator (rotation is ignored).
    pub fn common<I: IntoIterator<Item = Bounds>>(bounds: I) -> Option<Self> {
        bounds.into_iter().reduce(|a, b| {
            Self::new(
                a.min_x.min(b.min_x),
                a.min_y.min(b.min_y),
                a.max_x.max(b.max_x),
                a.max_y.max(b.max_y),
            )
        })
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Rotation in radians about the center.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Return a copy with the given rotation.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width / 2.0,
            self.min_y + self.height / 2.0,
        )
    }

    /// Move the bounds by a delta, keeping its size.
    pub fn translate(&mut self, delta: Vec2) {
        *self = Self::new(
            self.min_x + delta.x,
            self.min_y + delta.y,
            self.max_x + delta.x,
            self.max_y + delta.y,
        )
        .with_rotation(self.rotation);
    }

    /// Grow the bounds by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
        .with_rotation(self.rotation)
    }

    /// Corners in clockwise order starting at the top-left, ignoring rotation.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Corners rotated about the center by the bounds' rotation.
    pub fn rotated_corners(&self) -> [Point; 4] {
        let center = self.center();
        self.corners()
            .map(|corner| rotate_around(corner, center, self.rotation))
    }

    /// Axis-aligned bounds of the rotated corners.
    pub fn rotated(&self) -> Self {
        if self.rotation == 0.0 {
            return Self::new(self.min_x, self.min_y, self.max_x, self.max_y);
        }
        let corners = self.rotated_corners();
        let mut out = Self::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y);
        for c in &corners[1..] {
            out = Self::new(
                out.min_x.min(c.x),
                out.min_y.min(c.y),
                out.max_x.max(c.x),
                out.max_y.max(c.y),
            );
        }
        out
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Whether `other` lies entirely inside these bounds.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Whether the two bounds overlap or touch.
    pub fn collides(&self, other: &Bounds) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }
}

/// Angle in radians of the vector from `a` to `b`.
pub fn angle(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Rotate `point` about `center` by `radians`.
pub fn rotate_around(point: Point, center: Point, radians: f64) -> Point {
    if radians == 0.0 {
        return point;
    }
    let (sin, cos) = radians.sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Normalize an angle into `[0, 2π)`.
pub fn clamp_radians(radians: f64) -> f64 {
    radians.rem_euclid(TAU)
}

/// Snap an angle to the nearest of `segments` equal divisions of a full turn.
///
/// The result is normalized into `[0, 2π]`.
pub fn snap_angle_to_segments(radians: f64, segments: u32) -> f64 {
    let seg = TAU / f64::from(segments.max(1));
    ((clamp_radians(radians) + seg / 2.0) / seg).floor() * seg
}

/// Whether a convex polygon overlaps the bounds (separating axis test).
pub fn polygon_intersects_bounds(polygon: &[Point], bounds: &Bounds) -> bool {
    if polygon.is_empty() {
        return false;
    }
    let rect = bounds.corners();
    let mut axes: Vec<Vec2> = vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
    for i in 0..polygon.len() {
        let edge = polygon[(i + 1) % polygon.len()] - polygon[i];
        if edge.hypot2() > f64::EPSILON {
            axes.push(Vec2::new(-edge.y, edge.x));
        }
    }
    axes.iter().all(|axis| {
        let (a_min, a_max) = project(polygon, *axis);
        let (b_min, b_max) = project(&rect, *axis);
        a_max >= b_min && b_max >= a_min
    })
}

fn project(points: &[Point], axis: Vec2) -> (f64, f64) {
    points
        .iter()
        .map(|p| p.to_vec2().dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Whether any segment of a polyline touches the bounds.
pub fn polyline_intersects_bounds(points: &[Point], bounds: &Bounds) -> bool {
    // Any point inside the bounds?
    if points.iter().any(|p| bounds.contains_point(*p)) {
        return true;
    }
    // Any segment crosses an edge?
    let corners = bounds.corners();
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|&(c, d)| segments_intersect(w[0], w[1], c, d))
    })
}

/// Test if two line segments (a-b) and (c-d) intersect.
fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: check if endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

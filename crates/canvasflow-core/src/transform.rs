//! Resize and rotate math for a selection's bounding box.
//!
//! Everything here is pure: the select tool snapshots the selection, feeds the
//! drag into these functions and hands the results to each shape.

use crate::geometry::{rotate_around, snap_angle_to_segments, Bounds};
use crate::shape::ShapeUpdate;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A resize handle on the selection bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    Corner(Corner),
    Edge(Edge),
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Corner(Corner::TopLeft),
        ResizeHandle::Edge(Edge::Top),
        ResizeHandle::Corner(Corner::TopRight),
        ResizeHandle::Edge(Edge::Right),
        ResizeHandle::Corner(Corner::BottomRight),
        ResizeHandle::Edge(Edge::Bottom),
        ResizeHandle::Corner(Corner::BottomLeft),
        ResizeHandle::Edge(Edge::Left),
    ];

    fn moves_top(self) -> bool {
        matches!(
            self,
            Self::Edge(Edge::Top) | Self::Corner(Corner::TopLeft | Corner::TopRight)
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            Self::Edge(Edge::Bottom) | Self::Corner(Corner::BottomLeft | Corner::BottomRight)
        )
    }

    fn moves_left(self) -> bool {
        matches!(
            self,
            Self::Edge(Edge::Left) | Self::Corner(Corner::TopLeft | Corner::BottomLeft)
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            Self::Edge(Edge::Right) | Self::Corner(Corner::TopRight | Corner::BottomRight)
        )
    }

    /// Fractional position of the point that stays fixed while this handle is dragged.
    fn anchor(self) -> (f64, f64) {
        let fx = if self.moves_left() {
            1.0
        } else if self.moves_right() {
            0.0
        } else {
            0.5
        };
        let fy = if self.moves_top() {
            1.0
        } else if self.moves_bottom() {
            0.0
        } else {
            0.5
        };
        (fx, fy)
    }
}

/// Result of [`transformed_bounds`]. Scales are negative on flipped axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedBounds {
    pub bounds: Bounds,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl TransformedBounds {
    pub fn flip_x(&self) -> bool {
        self.scale_x < 0.0
    }

    pub fn flip_y(&self) -> bool {
        self.scale_y < 0.0
    }
}

fn or_one(v: f64) -> f64 {
    if v == 0.0 { 1.0 } else { v }
}

/// Bounds produced by dragging `handle` of `initial` by `delta` (page space).
///
/// `rotation` is the rotation of the box being resized; the delta is
/// counter-rotated into its frame and the result is shifted so that the
/// anchor opposite the handle does not move on the page. With
/// `aspect_locked` the dominant axis drives both (corners) or the cross axis
/// is re-centered (edges).
pub fn transformed_bounds(
    initial: &Bounds,
    handle: ResizeHandle,
    delta: Vec2,
    rotation: f64,
    aspect_locked: bool,
) -> TransformedBounds {
    let (ax0, ay0, ax1, ay1) = (
        initial.min_x(),
        initial.min_y(),
        initial.max_x(),
        initial.max_y(),
    );
    let (mut bx0, mut by0, mut bx1, mut by1) = (ax0, ay0, ax1, ay1);

    // Move the dragged edges in the box's own frame.
    let d = rotate_around(delta.to_point(), Point::ZERO, -rotation);
    if handle.moves_top() {
        by0 += d.y;
    }
    if handle.moves_bottom() {
        by1 += d.y;
    }
    if handle.moves_left() {
        bx0 += d.x;
    }
    if handle.moves_right() {
        bx1 += d.x;
    }

    let aw = ax1 - ax0;
    let ah = ay1 - ay0;

    if aspect_locked && aw != 0.0 && ah != 0.0 {
        let scale_x = (bx1 - bx0) / aw;
        let scale_y = (by1 - by0) / ah;
        let bw = (bx1 - bx0).abs();
        let bh = (by1 - by0).abs();
        let ar = aw / ah;
        let is_tall = ar < bw / bh;
        let tw = bw * if scale_y < 0.0 { 1.0 } else { -1.0 } / ar;
        let th = bh * if scale_x < 0.0 { 1.0 } else { -1.0 } * ar;

        match handle {
            ResizeHandle::Corner(Corner::TopLeft) => {
                if is_tall {
                    by0 = by1 + tw;
                } else {
                    bx0 = bx1 + th;
                }
            }
            ResizeHandle::Corner(Corner::TopRight) => {
                if is_tall {
                    by0 = by1 + tw;
                } else {
                    bx1 = bx0 - th;
                }
            }
            ResizeHandle::Corner(Corner::BottomRight) => {
                if is_tall {
                    by1 = by0 - tw;
                } else {
                    bx1 = bx0 - th;
                }
            }
            ResizeHandle::Corner(Corner::BottomLeft) => {
                if is_tall {
                    by1 = by0 - tw;
                } else {
                    bx0 = bx1 + th;
                }
            }
            ResizeHandle::Edge(Edge::Top | Edge::Bottom) => {
                let m = (bx0 + bx1) / 2.0;
                let w = bh * ar;
                bx0 = m - w / 2.0;
                bx1 = m + w / 2.0;
            }
            ResizeHandle::Edge(Edge::Left | Edge::Right) => {
                let m = (by0 + by1) / 2.0;
                let h = bw / ar;
                by0 = m - h / 2.0;
                by1 = m + h / 2.0;
            }
        }
    }

    // Keep the anchor fixed on the page when the box is rotated.
    if rotation.rem_euclid(std::f64::consts::TAU) != 0.0 {
        let (fx, fy) = handle.anchor();
        let c0 = Point::new((ax0 + ax1) / 2.0, (ay0 + ay1) / 2.0);
        let c1 = Point::new((bx0 + bx1) / 2.0, (by0 + by1) / 2.0);
        let a = Point::new(ax0 + (ax1 - ax0) * fx, ay0 + (ay1 - ay0) * fy);
        let b = Point::new(bx0 + (bx1 - bx0) * fx, by0 + (by1 - by0) * fy);
        let cv = rotate_around(b, c1, rotation) - rotate_around(a, c0, rotation);
        bx0 -= cv.x;
        bx1 -= cv.x;
        by0 -= cv.y;
        by1 -= cv.y;
    }

    let flip_x = bx1 < bx0;
    let flip_y = by1 < by0;
    let bounds = Bounds::new(bx0, by0, bx1, by1).with_rotation(rotation);

    TransformedBounds {
        scale_x: bounds.width() / or_one(aw) * if flip_x { -1.0 } else { 1.0 },
        scale_y: bounds.height() / or_one(ah) * if flip_y { -1.0 } else { 1.0 },
        bounds,
    }
}

/// Where a shape's initial bounds land inside the transformed common bounds.
///
/// Positions are taken relative to the initial common bounds and mirrored on
/// flipped axes.
pub fn relative_transformed_bounds(
    next: &Bounds,
    initial_common: &Bounds,
    initial_shape: &Bounds,
    flip_x: bool,
    flip_y: bool,
) -> Bounds {
    let cw = or_one(initial_common.width());
    let ch = or_one(initial_common.height());
    let nx = if flip_x {
        initial_common.max_x() - initial_shape.max_x()
    } else {
        initial_shape.min_x() - initial_common.min_x()
    } / cw;
    let ny = if flip_y {
        initial_common.max_y() - initial_shape.max_y()
    } else {
        initial_shape.min_y() - initial_common.min_y()
    } / ch;
    let nw = initial_shape.width() / cw;
    let nh = initial_shape.height() / ch;

    let min_x = next.min_x() + next.width() * nx;
    let min_y = next.min_y() + next.height() * ny;
    Bounds::new(
        min_x,
        min_y,
        min_x + next.width() * nw,
        min_y + next.height() * nh,
    )
    .with_rotation(initial_shape.rotation())
}

/// A shape's center as a normalized (0..1, 0..1) position inside the common bounds.
pub fn transform_origin(shape: &Bounds, common: &Bounds) -> Point {
    let c = shape.center();
    Point::new(
        (c.x - common.min_x()) / or_one(common.width()),
        (c.y - common.min_y()) / or_one(common.height()),
    )
}

/// Rotation delta for the pointer moving around `center`, optionally snapped.
pub fn rotation_delta(center: Point, start: Point, current: Point, snap: Option<u32>) -> f64 {
    let delta = crate::geometry::angle(center, current) - crate::geometry::angle(center, start);
    match snap {
        Some(segments) => snap_angle_to_segments(delta, segments),
        None => delta,
    }
}

/// Geometry of a shape captured when a rotation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateStart {
    pub point: Point,
    pub center: Point,
    pub rotation: f64,
    pub handles: Option<Vec<Point>>,
}

/// Update that rotates a shape by `angle_delta` about `origin`.
///
/// With `snap`, the shape's own rotation is also brought onto the nearest
/// segment. Shapes with handles keep their rotation and have the handles
/// rotated about their center instead, re-anchored to the new top-left.
pub fn rotate_shape(start: &RotateStart, origin: Point, angle_delta: f64, snap: Option<u32>) -> ShapeUpdate {
    let offset = match snap {
        Some(segments) => snap_angle_to_segments(start.rotation, segments) - start.rotation,
        None => 0.0,
    };
    let relative_center = (start.center - start.point).to_point();
    let rotated_center = rotate_around(start.center, origin, angle_delta);

    match &start.handles {
        Some(handles) => {
            let points: Vec<Point> = handles
                .iter()
                .map(|h| rotate_around(*h, relative_center, angle_delta + offset))
                .collect();
            let top_left = points.iter().fold(
                Point::new(f64::INFINITY, f64::INFINITY),
                |acc, p| Point::new(acc.x.min(p.x), acc.y.min(p.y)),
            );
            ShapeUpdate {
                point: Some(top_left + (rotated_center - relative_center)),
                rotation: None,
                handles: Some(points.iter().map(|p| (*p - top_left).to_point()).collect()),
            }
        }
        None => ShapeUpdate {
            point: Some((rotated_center - relative_center).to_point()),
            rotation: Some(start.rotation + angle_delta + offset),
            handles: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f64 = 1e-9;

    fn square() -> Bounds {
        Bounds::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_bottom_right_scenario() {
        let t = transformed_bounds(
            &square(),
            ResizeHandle::Corner(Corner::BottomRight),
            Vec2::new(50.0, 0.0),
            0.0,
            false,
        );
        assert_eq!(t.bounds, Bounds::new(0.0, 0.0, 150.0, 100.0));
        assert!((t.scale_x - 1.5).abs() < EPS);
        assert!((t.scale_y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_aspect_lock_corners() {
        let initial = Bounds::new(10.0, 20.0, 210.0, 120.0);
        let deltas = [
            Vec2::new(50.0, 0.0),
            Vec2::new(0.0, 80.0),
            Vec2::new(-30.0, 45.0),
            Vec2::new(-400.0, -10.0),
            Vec2::new(13.0, -170.0),
        ];
        for handle in ResizeHandle::ALL {
            let ResizeHandle::Corner(_) = handle else { continue };
            for delta in deltas {
                let t = transformed_bounds(&initial, handle, delta, 0.0, true);
                assert!(
                    (t.scale_x.abs() - t.scale_y.abs()).abs() < 1e-9,
                    "{handle:?} {delta:?}: {} vs {}",
                    t.scale_x,
                    t.scale_y
                );
            }
        }
    }

    #[test]
    fn test_free_scales_follow_delta_components() {
        let handle = ResizeHandle::Corner(Corner::BottomRight);
        let a = transformed_bounds(&square(), handle, Vec2::new(50.0, 10.0), 0.0, false);
        let b = transformed_bounds(&square(), handle, Vec2::new(50.0, 30.0), 0.0, false);
        assert!((a.scale_x - b.scale_x).abs() < EPS);
        assert!((a.scale_y - 1.1).abs() < EPS);
        assert!((b.scale_y - 1.3).abs() < EPS);
    }

    #[test]
    fn test_edge_aspect_lock_recenters_cross_axis() {
        let t = transformed_bounds(
            &square(),
            ResizeHandle::Edge(Edge::Right),
            Vec2::new(100.0, 0.0),
            0.0,
            true,
        );
        assert!((t.bounds.width() - 200.0).abs() < EPS);
        assert!((t.bounds.height() - 200.0).abs() < EPS);
        assert!((t.bounds.center().y - 50.0).abs() < EPS);
        assert!((t.bounds.min_x()).abs() < EPS);
    }

    #[test]
    fn test_flip_past_opposite_edge() {
        let t = transformed_bounds(
            &square(),
            ResizeHandle::Edge(Edge::Right),
            Vec2::new(-150.0, 0.0),
            0.0,
            false,
        );
        assert!(t.scale_x < 0.0);
        assert!(t.flip_x());
        assert!(!t.flip_y());
        assert!(t.bounds.min_x() <= t.bounds.max_x());
        assert!((t.bounds.min_x() + 50.0).abs() < EPS);
        assert!((t.bounds.max_x()).abs() < EPS);
        assert!((t.scale_x + 0.5).abs() < EPS);
    }

    #[test]
    fn test_zero_size_scales_against_one() {
        let line = Bounds::new(0.0, 0.0, 100.0, 0.0);
        let t = transformed_bounds(
            &line,
            ResizeHandle::Corner(Corner::BottomRight),
            Vec2::new(0.0, 20.0),
            0.0,
            true,
        );
        assert!(t.scale_x.is_finite() && t.scale_y.is_finite());
        assert!((t.scale_y - 20.0).abs() < EPS);
    }

    #[test]
    fn test_rotated_resize_keeps_anchor() {
        let rotation = FRAC_PI_2 / 3.0;
        let initial = Bounds::new(0.0, 0.0, 100.0, 60.0).with_rotation(rotation);
        let handle = ResizeHandle::Corner(Corner::BottomRight);
        // Top-left corner on the page before the drag.
        let before = initial.rotated_corners()[0];
        let t = transformed_bounds(&initial, handle, Vec2::new(40.0, 25.0), rotation, false);
        let after = t.bounds.rotated_corners()[0];
        assert!((before - after).hypot() < 1e-9, "{before:?} moved to {after:?}");
    }

    #[test]
    fn test_relative_bounds_mirror_on_flip() {
        let common = square();
        let shape = Bounds::new(0.0, 0.0, 20.0, 20.0);
        let next = Bounds::new(-100.0, 0.0, 0.0, 100.0);

        let kept = relative_transformed_bounds(&next, &common, &shape, false, false);
        assert!((kept.min_x() + 100.0).abs() < EPS && (kept.max_x() + 80.0).abs() < EPS);
        assert!((kept.max_y() - 20.0).abs() < EPS);

        let mirrored = relative_transformed_bounds(&next, &common, &shape, true, false);
        assert!((mirrored.min_x() + 20.0).abs() < EPS && mirrored.max_x().abs() < EPS);
        assert!((mirrored.max_y() - 20.0).abs() < EPS);
    }

    #[test]
    fn test_transform_origin() {
        let origin = transform_origin(&Bounds::new(50.0, 0.0, 100.0, 50.0), &square());
        assert!((origin.x - 0.75).abs() < EPS);
        assert!((origin.y - 0.25).abs() < EPS);
    }

    #[test]
    fn test_rotation_delta_snaps() {
        let seg = TAU / 24.0;
        for i in 0..72 {
            let a = f64::from(i) * 0.0913;
            let current = Point::new(a.cos() * 50.0, a.sin() * 50.0);
            let d = rotation_delta(Point::ZERO, Point::new(50.0, 0.0), current, Some(24));
            let k = (d / seg).round();
            assert!((d - k * seg).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rotate_scalar_shape_about_origin() {
        let start = RotateStart {
            point: Point::new(100.0, 0.0),
            center: Point::new(110.0, 10.0),
            rotation: 0.1,
            handles: None,
        };
        let update = rotate_shape(&start, Point::ZERO, PI, None);
        let point = update.point.unwrap();
        // Center rotates to (-110, -10); point stays offset by (-10, -10) from it.
        assert!((point.x + 120.0).abs() < EPS);
        assert!((point.y + 20.0).abs() < EPS);
        assert!((update.rotation.unwrap() - (0.1 + PI)).abs() < EPS);
        assert!(update.handles.is_none());
    }

    #[test]
    fn test_rotate_snaps_shape_rotation() {
        let start = RotateStart {
            point: Point::ZERO,
            center: Point::new(10.0, 10.0),
            rotation: 0.3,
            handles: None,
        };
        let seg = TAU / 24.0;
        let update = rotate_shape(&start, Point::new(10.0, 10.0), seg * 2.0, Some(24));
        let r = update.rotation.unwrap();
        assert!((r - (r / seg).round() * seg).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_handles_reanchors() {
        // Horizontal line from (0,0) to (100,0), anchored at (50,50).
        let start = RotateStart {
            point: Point::new(50.0, 50.0),
            center: Point::new(100.0, 50.0),
            rotation: 0.0,
            handles: Some(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]),
        };
        let update = rotate_shape(&start, Point::new(100.0, 50.0), FRAC_PI_2, None);
        let handles = update.handles.unwrap();
        let point = update.point.unwrap();
        assert!(update.rotation.is_none());
        // Now vertical, centered on the same point.
        let abs: Vec<Point> = handles.iter().map(|h| point + h.to_vec2()).collect();
        assert!((abs[0].x - 100.0).abs() < EPS && (abs[0].y - 0.0).abs() < EPS);
        assert!((abs[1].x - 100.0).abs() < EPS && (abs[1].y - 100.0).abs() < EPS);
        assert!(handles.iter().all(|h| h.x >= -EPS && h.y >= -EPS));
    }
}

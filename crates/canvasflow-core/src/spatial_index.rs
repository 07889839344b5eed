//! R-tree over shape bounds, used by the marquee to find candidates.

use crate::geometry::Bounds;
use crate::shape::ShapeId;
use rstar::{RTree, RTreeObject, AABB};

/// A shape's axis-aligned (rotated) bounds in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub id: ShapeId,
    pub bounds: Bounds,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_x(), self.bounds.min_y()],
            [self.bounds.max_x(), self.bounds.max_y()],
        )
    }
}

/// Spatial index of shapes on a page.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index in one pass.
    pub fn bulk_load<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ShapeId, Bounds)>,
    {
        let entries = entries
            .into_iter()
            .map(|(id, bounds)| SpatialEntry { id, bounds })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, id: ShapeId, bounds: Bounds) {
        self.tree.insert(SpatialEntry { id, bounds });
    }

    /// Entries whose bounds overlap or touch `area`.
    pub fn query(&self, area: &Bounds) -> Vec<SpatialEntry> {
        let envelope = AABB::from_corners([area.min_x(), area.min_y()], [area.max_x(), area.max_y()]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}

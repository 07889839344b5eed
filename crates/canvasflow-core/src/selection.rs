//! Selection, hover and erase sets, plus the marquee brush.

use crate::geometry::Bounds;
use crate::shape::ShapeId;

/// Which shapes the user has selected, hovers or is about to erase.
///
/// `selected_ids` keeps selection order and never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionModel {
    selected_ids: Vec<ShapeId>,
    hovered_id: Option<ShapeId>,
    erasing_ids: Vec<ShapeId>,
    brush: Option<Bounds>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.selected_ids
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_ids.is_empty()
    }

    /// Replace the selection.
    pub fn set_selected(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.selected_ids.clear();
        for id in ids {
            if !self.selected_ids.contains(&id) {
                self.selected_ids.push(id);
            }
        }
    }

    /// Select only this shape.
    pub fn select(&mut self, id: ShapeId) {
        self.set_selected([id]);
    }

    pub fn add(&mut self, id: ShapeId) {
        if !self.selected_ids.contains(&id) {
            self.selected_ids.push(id);
        }
    }

    pub fn deselect(&mut self, id: ShapeId) {
        self.selected_ids.retain(|s| *s != id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
    }

    /// Drop ids that no longer refer to shapes.
    pub fn retain(&mut self, mut exists: impl FnMut(ShapeId) -> bool) {
        self.selected_ids.retain(|id| exists(*id));
        self.erasing_ids.retain(|id| exists(*id));
        if self.hovered_id.is_some_and(|id| !exists(id)) {
            self.hovered_id = None;
        }
    }

    pub fn hovered_id(&self) -> Option<ShapeId> {
        self.hovered_id
    }

    pub fn set_hovered(&mut self, id: Option<ShapeId>) {
        self.hovered_id = id;
    }

    pub fn erasing_ids(&self) -> &[ShapeId] {
        &self.erasing_ids
    }

    pub fn add_erasing(&mut self, id: ShapeId) {
        if !self.erasing_ids.contains(&id) {
            self.erasing_ids.push(id);
        }
    }

    /// Empty the erase set, returning what it held.
    pub fn take_erasing(&mut self) -> Vec<ShapeId> {
        std::mem::take(&mut self.erasing_ids)
    }

    pub fn brush(&self) -> Option<&Bounds> {
        self.brush.as_ref()
    }

    pub fn set_brush(&mut self, brush: Option<Bounds>) {
        self.brush = brush;
    }
}

/// Combine a marquee hit set with the selection from before the drag.
///
/// With `shift`, candidates that are all already selected are removed from
/// the initial selection (a toggle); otherwise they are added. Without
/// `shift`, the candidates replace the selection.
pub fn brush_selection(initial: &[ShapeId], candidates: &[ShapeId], shift: bool) -> Vec<ShapeId> {
    if !shift {
        return candidates.to_vec();
    }
    if !candidates.is_empty() && candidates.iter().all(|id| initial.contains(id)) {
        return initial
            .iter()
            .copied()
            .filter(|id| !candidates.contains(id))
            .collect();
    }
    let mut out = initial.to_vec();
    for id in candidates {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

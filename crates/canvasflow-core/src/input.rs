//! Pointer and keyboard state accumulated from routed events.

use crate::events::{KeyEvent, Modifiers, PointerButton, PointerEvent, WheelEvent};
use kurbo::{Point, Vec2};
use std::collections::HashSet;

/// Tracks the pointer between events. All points are in page coordinates.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Where the current (or last) press started.
    pub origin_point: Point,
    pub current_point: Point,
    pub previous_point: Point,
    pub modifiers: Modifiers,
    pub is_pointer_down: bool,
    pub is_pinching: bool,
    /// Button of the current press.
    pub button: Option<PointerButton>,
    pressed_keys: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) {
        self.previous_point = event.point;
        self.current_point = event.point;
        self.origin_point = event.point;
        self.modifiers = event.modifiers;
        self.button = event.button;
        self.is_pointer_down = true;
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) {
        self.previous_point = self.current_point;
        self.current_point = event.point;
        self.modifiers = event.modifiers;
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) {
        self.previous_point = self.current_point;
        self.current_point = event.point;
        self.modifiers = event.modifiers;
        self.is_pointer_down = false;
    }

    /// Scrolling moves the page under a still pointer.
    pub fn wheel(&mut self, event: &WheelEvent, page_point: Point) {
        self.previous_point = self.current_point;
        self.current_point = page_point;
        self.modifiers = event.modifiers;
    }

    pub fn key_down(&mut self, event: &KeyEvent) {
        self.pressed_keys.insert(event.key.clone());
        self.modifiers = event.modifiers;
    }

    pub fn key_up(&mut self, event: &KeyEvent) {
        self.pressed_keys.remove(&event.key);
        self.modifiers = event.modifiers;
    }

    pub fn pinch_start(&mut self) {
        self.is_pinching = true;
    }

    pub fn pinch_end(&mut self) {
        self.is_pinching = false;
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Movement since the previous event.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.previous_point
    }

    /// Movement since the press started.
    pub fn drag_delta(&self) -> Vec2 {
        self.current_point - self.origin_point
    }

    /// Whether the pointer has moved further than `threshold` from the press origin.
    pub fn exceeds_drag_threshold(&self, threshold: f64) -> bool {
        self.drag_delta().hypot() > threshold
    }
}

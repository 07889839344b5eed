//! Editor configuration.

use crate::error::SettingsError;
use crate::shortcuts::Platform;
use serde::{Deserialize, Serialize};

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Tunable behavior of the editor core.
///
/// Every field has a default, so a partial JSON document only needs to name
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Page-space distance the pointer must travel before a press becomes a drag.
    pub drag_threshold: f64,
    /// Number of segments a full turn is divided into when rotation snaps (24 = 15°).
    pub rotation_snap_segments: u32,
    /// Maximum number of undo states kept by the history.
    pub max_history: usize,
    /// Platform used to resolve `mod` in shortcut chords.
    pub platform: Platform,
    /// Multiplicative zoom step used by the zoom shortcuts.
    pub zoom_step: f64,
    /// Minimum camera zoom.
    pub min_zoom: f64,
    /// Maximum camera zoom.
    pub max_zoom: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            rotation_snap_segments: 24,
            max_history: MAX_UNDO_HISTORY,
            platform: Platform::current(),
            zoom_step: 1.25,
            min_zoom: 0.1,
            max_zoom: 8.0,
        }
    }
}

impl EditorSettings {
    /// Parse settings from a JSON document and validate them.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.rotation_snap_segments == 0 {
            return Err(SettingsError::Invalid {
                field: "rotation_snap_segments",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.drag_threshold >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "drag_threshold",
                reason: format!("must be non-negative, got {}", self.drag_threshold),
            });
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(SettingsError::Invalid {
                field: "min_zoom",
                reason: format!("must be in (0, {}], got {}", self.max_zoom, self.min_zoom),
            });
        }
        if !(self.zoom_step > 1.0) {
            return Err(SettingsError::Invalid {
                field: "zoom_step",
                reason: format!("must be greater than 1, got {}", self.zoom_step),
            });
        }
        Ok(())
    }
}

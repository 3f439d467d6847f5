// Application settings
// Loaded from ~/.config/notegrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid geometry (unscaled)
    #[serde(rename = "grid.defaultColumnWidth")]
    pub default_column_width: f32,

    #[serde(rename = "grid.rowHeight")]
    pub row_height: f32,

    #[serde(rename = "grid.textSize")]
    pub text_size: f32,

    // Zoom
    #[serde(rename = "zoom.minScale")]
    pub min_scale: f32,

    #[serde(rename = "zoom.maxScale")]
    pub max_scale: f32,

    #[serde(rename = "zoom.doubleTapScale")]
    pub double_tap_scale: f32,

    #[serde(rename = "zoom.doubleTapAltScale")]
    pub double_tap_alt_scale: f32,

    // Panning
    #[serde(rename = "pan.overscrollDamping")]
    pub overscroll_damping: f32,

    #[serde(rename = "pan.touchSlop")]
    pub touch_slop: f32,

    // Pane synchronization
    #[serde(rename = "sync.anchorTolerance")]
    pub anchor_tolerance: f32,

    #[serde(rename = "sync.selfHealThreshold")]
    pub self_heal_threshold: f32,

    // History
    #[serde(rename = "history.maxEntries")]
    pub history_max_entries: usize,

    // Persistence
    #[serde(rename = "persist.rowHeightSaveDelayMs")]
    pub row_height_save_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Grid
            default_column_width: 120.0,
            row_height: 44.0,
            text_size: 14.0,
            // Zoom
            min_scale: 0.6,
            max_scale: 2.5,
            double_tap_scale: 1.0,
            double_tap_alt_scale: 0.8,
            // Panning
            overscroll_damping: 0.3,
            touch_slop: 8.0,
            // Sync
            anchor_tolerance: 2.0,
            self_heal_threshold: 1.0,
            // History
            history_max_entries: 100,
            // Persistence
            row_height_save_delay_ms: 300,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Grid geometry at scale 1.0
    "grid.defaultColumnWidth": 120,
    "grid.rowHeight": 44,
    "grid.textSize": 14,

    // Zoom limits and double-tap presets
    "zoom.minScale": 0.6,
    "zoom.maxScale": 2.5,
    "zoom.doubleTapScale": 1.0,
    "zoom.doubleTapAltScale": 0.8,

    // Rubber-band factor past the scroll edges
    "pan.overscrollDamping": 0.3,
    "pan.touchSlop": 8,

    // Pane alignment (px)
    "sync.anchorTolerance": 2,
    "sync.selfHealThreshold": 1,

    // Undo depth
    "history.maxEntries": 100,

    // Delay before a resized row height is written
    "persist.rowHeightSaveDelayMs": 300
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a specific file. Missing keys take defaults;
    /// unreadable or malformed files yield `Settings::default()`.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
        .sanitized()
    }

    /// Parse settings JSON, ignoring lines that start with `//`.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Repair values a hand-edited file can get wrong: inverted zoom
    /// limits, non-positive sizes, damping outside (0, 1].
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_scale > 0.0) {
            self.min_scale = defaults.min_scale;
        }
        if !(self.max_scale >= self.min_scale) {
            self.max_scale = self.min_scale.max(defaults.max_scale);
        }
        if !(self.default_column_width > 0.0) {
            self.default_column_width = defaults.default_column_width;
        }
        if !(self.row_height > 0.0) {
            self.row_height = defaults.row_height;
        }
        if !(self.overscroll_damping > 0.0 && self.overscroll_damping <= 1.0) {
            self.overscroll_damping = defaults.overscroll_damping;
        }
        self.double_tap_scale = self.double_tap_scale.clamp(self.min_scale, self.max_scale);
        self.double_tap_alt_scale = self.double_tap_alt_scale.clamp(self.min_scale, self.max_scale);
        self
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_matches_defaults() {
        let parsed = Settings::parse(DEFAULT_FILE).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed = Settings::parse(r#"{ "zoom.maxScale": 3.0 }"#).unwrap();
        assert_eq!(parsed.max_scale, 3.0);
        assert_eq!(parsed.min_scale, 0.6);
        assert_eq!(parsed.history_max_entries, 100);
    }

    #[test]
    fn test_comment_lines_stripped() {
        let parsed = Settings::parse("{\n  // note\n  \"grid.rowHeight\": 30\n}").unwrap();
        assert_eq!(parsed.row_height, 30.0);
    }

    #[test]
    fn test_sanitize_inverted_limits() {
        let s = Settings { min_scale: 2.0, max_scale: 1.0, ..Settings::default() }.sanitized();
        assert!(s.max_scale >= s.min_scale);
        assert!(s.double_tap_scale >= s.min_scale && s.double_tap_scale <= s.max_scale);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings { touch_slop: 12.0, ..Settings::default() };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}

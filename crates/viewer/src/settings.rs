//! Viewer settings

use std::path::PathBuf;

use floorplan::FloorPlanConfig;
use serde::{Deserialize, Serialize};

/// Window and visualization settings, persisted as JSON in the user config dir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Forced tier; `None` runs device detection at startup
    pub low_performance_mode: Option<bool>,
    /// Initial window size in points
    pub window_size: [f32; 2],
    /// Show the room light status panel
    pub show_light_panel: bool,
    /// Camera and interaction tuning
    pub floor_plan: FloorPlanConfig,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            low_performance_mode: None,
            window_size: [1280.0, 800.0],
            show_light_panel: true,
            floor_plan: FloorPlanConfig::default(),
        }
    }
}

impl ViewerSettings {
    fn path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "interior", "floorplan-viewer")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid settings JSON: {e}"))
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            return;
        };
        if let Some(dir) = path.parent() {
            if std::fs::create_dir_all(dir).is_err() {
                return;
            }
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            if let Err(e) = std::fs::write(&path, json) {
                tracing::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let s = ViewerSettings::from_json(r#"{ "low_performance_mode": true, "floor_plan": { "zoom_step": 0.5 } }"#)
            .unwrap();
        assert_eq!(s.low_performance_mode, Some(true));
        assert_eq!(s.floor_plan.zoom_step, 0.5);
        assert_eq!(s.floor_plan.rotate_speed, FloorPlanConfig::default().rotate_speed);
        assert_eq!(s.window_size, ViewerSettings::default().window_size);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let s = ViewerSettings::default();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(ViewerSettings::from_json(&json).unwrap(), s);
    }
}

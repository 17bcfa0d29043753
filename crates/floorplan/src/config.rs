//! Interaction and camera tuning

use serde::{Deserialize, Serialize};

/// Tunable constants for the camera controller and interaction router.
///
/// Hosts may load this from a settings file or a JSON string; missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorPlanConfig {
    /// Radians of orbit per pixel of drag (`k_rot`)
    pub rotate_speed: f32,
    /// Zoom change per wheel tick
    pub zoom_step: f32,
    /// Minimum time between applied orbit updates (ms)
    pub orbit_throttle_ms: u64,
    /// Minimum time between applied zoom updates (ms)
    pub zoom_throttle_ms: u64,
    /// Cursor travel (px) above which a press-release no longer counts as a click
    pub drag_click_tolerance: f32,
    /// Initial camera position; its distance to the target is the base distance
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
}

impl Default for FloorPlanConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_step: 0.25,
            orbit_throttle_ms: 50,
            zoom_throttle_ms: 100,
            drag_click_tolerance: 5.0,
            camera_position: [0.0, 16.0, 16.0],
            camera_target: [0.0, 0.0, 0.0],
            fov_degrees: 50.0,
        }
    }
}

impl FloorPlanConfig {
    /// Parse from JSON, falling back to defaults for absent fields
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid floor plan config: {e}"))
    }
}

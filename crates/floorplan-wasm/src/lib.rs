//! Browser host for the floor plan.
//!
//! `mountFloorPlan(container, lowPerformanceMode?, configJson?)` attaches a
//! WebGL2 canvas to the container and returns a handle whose `unmount()`
//! cancels the frame loop, removes every listener and releases the GL context.
//! The DOM half only exists on `wasm32`; the JSON exports below work anywhere.

use floorplan::lighting::LightingRig;
use floorplan::scene::{build_scene, SceneGraph};
use floorplan::RenderQuality;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod dom;

/// Everything the scene builder produces for one tier
#[derive(Serialize)]
struct FloorPlanExport {
    quality: RenderQuality,
    scene: SceneGraph,
    lighting: LightingRig,
}

/// Build the scene for a tier and serialize it as JSON
pub fn scene_json(low_performance_mode: bool) -> Result<String, String> {
    let quality = RenderQuality::from_low_mode(low_performance_mode);
    let mut scene = build_scene(&quality);
    let lighting = LightingRig::build(&mut scene, &quality);
    serde_json::to_string(&FloorPlanExport {
        quality,
        scene,
        lighting,
    })
    .map_err(|e| format!("Scene serialization failed: {e}"))
}

/// Floor plan scene, lights and quality profile as a JSON string
#[wasm_bindgen(js_name = floorPlanJson)]
pub fn floor_plan_json(low_performance_mode: bool) -> Result<String, JsError> {
    scene_json(low_performance_mode).map_err(|e| JsError::new(&e))
}

/// Resolved render-quality profile as a plain JS object
#[wasm_bindgen(js_name = renderQuality)]
pub fn render_quality(low_performance_mode: bool) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&RenderQuality::from_low_mode(low_performance_mode))
        .map_err(|e| JsError::new(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_json_reflects_tier() {
        let high: serde_json::Value = serde_json::from_str(&scene_json(false).unwrap()).unwrap();
        let low: serde_json::Value = serde_json::from_str(&scene_json(true).unwrap()).unwrap();
        assert_eq!(high["lighting"]["room_lights"].as_array().unwrap().len(), 5);
        assert!(low["lighting"]["room_lights"].as_array().unwrap().is_empty());
        assert_eq!(low["quality"]["frame_interval"], 2);
        assert!(high["scene"]["nodes"].as_array().unwrap().len() > low["scene"]["nodes"].as_array().unwrap().len());
    }
}

//! Performance tier detection and the render-quality profile derived from it.
//!
//! The tier is decided once at mount and never re-evaluated. Everything that
//! depends on it (shadows, fog, light count, geometry density, frame cadence)
//! reads the resolved [`RenderQuality`] instead of re-checking a flag.

use serde::{Deserialize, Serialize};

/// User-agent fragments that mark a mobile device (matched case-insensitively).
const MOBILE_AGENT_PATTERNS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Devices reporting less memory than this (in GB) get the low tier
const MIN_DEVICE_MEMORY_GB: f32 = 4.0;

/// Devices reporting fewer logical cores than this get the low tier
const MIN_LOGICAL_CORES: u32 = 4;

/// Naive directional shadow-map size; the high tier uses half of it
pub const NAIVE_SHADOW_MAP: u32 = 2048;

/// Session-fixed quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Low,
    #[default]
    High,
}

impl PerformanceTier {
    /// Tier from the host's `low_performance_mode` flag
    pub fn from_low_mode(low_performance_mode: bool) -> Self {
        if low_performance_mode {
            PerformanceTier::Low
        } else {
            PerformanceTier::High
        }
    }

    /// Run the one-shot device heuristic
    pub fn detect(profile: &DeviceProfile) -> Self {
        let tier = Self::from_low_mode(profile.is_constrained());
        tracing::info!(
            ?tier,
            mobile = profile.is_mobile(),
            memory_gb = ?profile.device_memory_gb,
            cores = ?profile.logical_cores,
            "performance tier selected"
        );
        tier
    }

    pub fn is_low(&self) -> bool {
        matches!(self, PerformanceTier::Low)
    }
}

/// What the running environment reports about the device.
///
/// Memory and core count are optional because not every environment exposes
/// them; a missing signal never pushes the device into the low tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub user_agent: String,
    pub device_memory_gb: Option<f32>,
    pub logical_cores: Option<u32>,
}

impl DeviceProfile {
    pub fn is_mobile(&self) -> bool {
        let agent = self.user_agent.to_ascii_lowercase();
        MOBILE_AGENT_PATTERNS.iter().any(|p| agent.contains(p))
    }

    /// Any single signal is enough to mark the device as constrained
    pub fn is_constrained(&self) -> bool {
        self.is_mobile()
            || self.device_memory_gb.is_some_and(|gb| gb < MIN_DEVICE_MEMORY_GB)
            || self.logical_cores.is_some_and(|c| c < MIN_LOGICAL_CORES)
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

/// Every tier-dependent rendering decision, resolved once at mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderQuality {
    pub tier: PerformanceTier,
    /// Shadow casting/receiving flags on nodes and lights
    pub shadows: bool,
    pub fog: Option<Fog>,
    /// Whether the five room point lights (and their fixtures) exist
    pub point_lights: bool,
    /// Antialiasing preference passed to the rendering context
    pub antialias: bool,
    /// Radial segments for cylinders
    pub radial_segments: u32,
    /// (rings, sectors) for spheres
    pub sphere_segments: (u32, u32),
    /// Render every n-th scheduled frame
    pub frame_interval: u32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_shadow_map: u32,
    pub point_shadow_map: u32,
    pub background: [f32; 3],
}

const BACKGROUND: [f32; 3] = [0.96, 0.95, 0.93];

impl RenderQuality {
    pub fn for_tier(tier: PerformanceTier) -> Self {
        match tier {
            PerformanceTier::High => Self {
                tier,
                shadows: true,
                fog: Some(Fog {
                    color: BACKGROUND,
                    near: 30.0,
                    far: 80.0,
                }),
                point_lights: true,
                antialias: true,
                radial_segments: 24,
                sphere_segments: (16, 16),
                frame_interval: 1,
                ambient_intensity: 0.4,
                directional_intensity: 0.8,
                directional_shadow_map: NAIVE_SHADOW_MAP / 2,
                point_shadow_map: 256,
                background: BACKGROUND,
            },
            PerformanceTier::Low => Self {
                tier,
                shadows: false,
                fog: None,
                point_lights: false,
                antialias: false,
                radial_segments: 10,
                sphere_segments: (6, 8),
                frame_interval: 2,
                ambient_intensity: 0.6,
                directional_intensity: 0.6,
                directional_shadow_map: 0,
                point_shadow_map: 0,
                background: BACKGROUND,
            },
        }
    }

    pub fn from_low_mode(low_performance_mode: bool) -> Self {
        Self::for_tier(PerformanceTier::from_low_mode(low_performance_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(agent: &str, memory: Option<f32>, cores: Option<u32>) -> DeviceProfile {
        DeviceProfile {
            user_agent: agent.to_string(),
            device_memory_gb: memory,
            logical_cores: cores,
        }
    }

    const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/126.0";
    const PHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";

    #[test]
    fn test_mobile_agent_is_low() {
        assert_eq!(PerformanceTier::detect(&profile(PHONE, Some(8.0), Some(8))), PerformanceTier::Low);
        assert_eq!(
            PerformanceTier::detect(&profile("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)", None, None)),
            PerformanceTier::Low
        );
    }

    #[test]
    fn test_memory_and_cores_thresholds() {
        assert_eq!(PerformanceTier::detect(&profile(DESKTOP, Some(2.0), Some(8))), PerformanceTier::Low);
        assert_eq!(PerformanceTier::detect(&profile(DESKTOP, Some(8.0), Some(2))), PerformanceTier::Low);
        assert_eq!(PerformanceTier::detect(&profile(DESKTOP, Some(4.0), Some(4))), PerformanceTier::High);
    }

    #[test]
    fn test_missing_signals_fall_back_to_agent() {
        assert_eq!(PerformanceTier::detect(&profile(DESKTOP, None, None)), PerformanceTier::High);
        assert_eq!(PerformanceTier::detect(&profile(PHONE, None, None)), PerformanceTier::Low);
    }

    #[test]
    fn test_low_quality_profile() {
        let low = RenderQuality::from_low_mode(true);
        let high = RenderQuality::from_low_mode(false);
        assert!(!low.shadows && low.fog.is_none() && !low.point_lights);
        assert!(high.shadows && high.fog.is_some() && high.point_lights);
        assert!(low.ambient_intensity > high.ambient_intensity);
        assert!(low.directional_intensity < high.directional_intensity);
        assert!(low.radial_segments < high.radial_segments);
        assert_eq!(low.frame_interval, 2);
        assert_eq!(high.frame_interval, 1);
        assert_eq!(high.directional_shadow_map, 1024);
    }
}

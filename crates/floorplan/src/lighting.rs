//! Ambient, directional and per-room point lights.
//!
//! Room lights are plain records in a `Vec`; each one stores the arena ids of
//! its fixture marker and glow sphere so a toggle can update both without any
//! reference into the scene graph.

use serde::{Deserialize, Serialize};

use crate::quality::RenderQuality;
use crate::scene::floor_plan::Room;
use crate::scene::{GroupId, Material, NodeId, NodeTag, SceneGraph, SceneNode, Shape};

/// Fixture marker opacity while its light is on / off
pub const FIXTURE_OPACITY_ON: f32 = 0.9;
pub const FIXTURE_OPACITY_OFF: f32 = 0.3;
/// Glow emissive strength while its light is on / off
pub const GLOW_EMISSIVE_ON: f32 = 0.6;
pub const GLOW_EMISSIVE_OFF: f32 = 0.05;

const GLOW_OPACITY: f32 = 0.2;
const FIXTURE_RADIUS: f32 = 0.15;
const GLOW_RADIUS: f32 = 0.4;
/// Height of the ceiling fixtures
const FIXTURE_HEIGHT: f32 = 2.6;
/// Influence radius of every point light
const POINT_LIGHT_RANGE: f32 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// The light shines from here towards the origin
    pub position: [f32; 3],
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
}

/// A toggleable point light over one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLight {
    pub index: usize,
    pub room: Room,
    pub name: String,
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub base_intensity: f32,
    pub intensity: f32,
    pub range: f32,
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
    pub on: bool,
    pub fixture: NodeId,
    pub glow: NodeId,
}

/// Colour and intensity per room, in light-index order
const ROOM_LIGHTS: [(Room, [f32; 3], f32); 5] = [
    (Room::Bedroom, [1.0, 0.82, 0.6], 0.8),
    (Room::LivingRoom, [1.0, 0.95, 0.82], 1.0),
    (Room::Dining, [1.0, 0.76, 0.48], 0.9),
    (Room::Kitchen, [0.88, 0.94, 1.0], 1.2),
    (Room::Bathroom, [0.8, 0.9, 1.0], 0.7),
];

/// All lights of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingRig {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub room_lights: Vec<RoomLight>,
}

impl LightingRig {
    /// Create the lights for `quality`, adding fixture and glow nodes to
    /// `graph` when point lights are enabled
    pub fn build(graph: &mut SceneGraph, quality: &RenderQuality) -> Self {
        let ambient = AmbientLight {
            color: [1.0, 1.0, 1.0],
            intensity: quality.ambient_intensity,
        };
        let directional = DirectionalLight {
            color: [1.0, 0.98, 0.95],
            intensity: quality.directional_intensity,
            position: [10.0, 20.0, 10.0],
            cast_shadow: quality.shadows,
            shadow_map_size: if quality.shadows {
                quality.directional_shadow_map
            } else {
                0
            },
        };

        let room_lights = if quality.point_lights {
            let group = graph.add_group("light_fixtures");
            ROOM_LIGHTS
                .iter()
                .enumerate()
                .map(|(index, &(room, color, intensity))| {
                    add_room_light(graph, group, quality, index, room, color, intensity)
                })
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(point_lights = room_lights.len(), "lighting rig built");

        Self {
            ambient,
            directional,
            room_lights,
        }
    }

    pub fn point_light_count(&self) -> usize {
        self.room_lights.len()
    }

    pub fn light(&self, index: usize) -> Option<&RoomLight> {
        self.room_lights.get(index)
    }

    /// Resolve a fixture marker node back to its light index
    pub fn light_for_fixture(&self, node: NodeId) -> Option<usize> {
        self.room_lights.iter().position(|l| l.fixture == node)
    }

    /// Flip a room light and mirror the state on its fixture and glow.
    /// Returns the new on/off state, or `None` for an unknown index.
    pub fn toggle(&mut self, index: usize, graph: &mut SceneGraph) -> Option<bool> {
        let light = self.room_lights.get_mut(index)?;
        light.on = !light.on;
        light.intensity = if light.on { light.base_intensity } else { 0.0 };

        if let Some(fixture) = graph.node_mut(light.fixture) {
            fixture.material.opacity = if light.on {
                FIXTURE_OPACITY_ON
            } else {
                FIXTURE_OPACITY_OFF
            };
        }
        if let Some(glow) = graph.node_mut(light.glow) {
            glow.material.emissive_intensity = if light.on {
                GLOW_EMISSIVE_ON
            } else {
                GLOW_EMISSIVE_OFF
            };
        }

        tracing::info!(index, room = %light.name, on = light.on, "room light toggled");
        Some(light.on)
    }
}

fn add_room_light(
    graph: &mut SceneGraph,
    group: GroupId,
    quality: &RenderQuality,
    index: usize,
    room: Room,
    color: [f32; 3],
    intensity: f32,
) -> RoomLight {
    let [x, z] = room.center();
    let position = [x, FIXTURE_HEIGHT, z];
    let (rings, sectors) = quality.sphere_segments;

    let fixture = graph.add_node(
        group,
        SceneNode::new(
            format!("fixture_{index}"),
            Shape::Sphere {
                radius: FIXTURE_RADIUS,
                rings,
                sectors,
            },
            Material::glowing(color, FIXTURE_OPACITY_ON, 1.0),
            position,
        )
        .tagged(NodeTag::Fixture { light: index }),
    );
    let glow = graph.add_node(
        group,
        SceneNode::new(
            format!("glow_{index}"),
            Shape::Sphere {
                radius: GLOW_RADIUS,
                rings,
                sectors,
            },
            Material::glowing(color, GLOW_OPACITY, GLOW_EMISSIVE_ON),
            position,
        )
        .tagged(NodeTag::Glow { light: index }),
    );

    RoomLight {
        index,
        room,
        name: room.display_name().to_string(),
        position,
        color,
        base_intensity: intensity,
        intensity,
        range: POINT_LIGHT_RANGE,
        cast_shadow: quality.shadows,
        shadow_map_size: quality.point_shadow_map,
        on: true,
        fixture,
        glow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig(low: bool) -> (SceneGraph, LightingRig) {
        let quality = RenderQuality::from_low_mode(low);
        let mut graph = SceneGraph::new(&quality);
        let rig = LightingRig::build(&mut graph, &quality);
        (graph, rig)
    }

    #[test]
    fn test_low_tier_has_no_point_lights() {
        let (graph, rig) = rig(true);
        assert_eq!(rig.point_light_count(), 0);
        assert!(graph.is_empty());
        assert!(!rig.directional.cast_shadow);
    }

    #[test]
    fn test_high_tier_lights_are_distinct() {
        let (graph, rig) = rig(false);
        assert_eq!(rig.point_light_count(), 5);
        for (i, light) in rig.room_lights.iter().enumerate() {
            assert_eq!(light.index, i);
            assert_eq!(graph.node(light.fixture).unwrap().tag, NodeTag::Fixture { light: i });
            assert_eq!(graph.node(light.glow).unwrap().tag, NodeTag::Glow { light: i });
            assert!(light.range > 0.0 && light.cast_shadow);
            assert!(light.shadow_map_size < rig.directional.shadow_map_size);
            for other in &rig.room_lights[i + 1..] {
                assert_ne!(light.position, other.position);
                assert_ne!(light.color, other.color);
                assert_ne!(light.base_intensity, other.base_intensity);
            }
        }
        assert_eq!(rig.directional.shadow_map_size, crate::quality::NAIVE_SHADOW_MAP / 2);
    }

    #[test]
    fn test_directional_shadow_map_comes_from_quality() {
        let quality = RenderQuality {
            directional_shadow_map: 512,
            ..RenderQuality::from_low_mode(false)
        };
        let mut graph = SceneGraph::new(&quality);
        let rig = LightingRig::build(&mut graph, &quality);
        assert_eq!(rig.directional.shadow_map_size, 512);
    }

    #[test]
    fn test_toggle_off_dims_fixture_and_glow() {
        let (mut graph, mut rig) = rig(false);
        assert_eq!(rig.toggle(2, &mut graph), Some(false));
        let light = rig.light(2).unwrap();
        assert_eq!(light.intensity, 0.0);
        assert_eq!(graph.node(light.fixture).unwrap().material.opacity, FIXTURE_OPACITY_OFF);
        assert_eq!(graph.node(light.glow).unwrap().material.emissive_intensity, GLOW_EMISSIVE_OFF);
        // Neighbours untouched
        assert!(rig.light(1).unwrap().on && rig.light(3).unwrap().on);
    }

    #[test]
    fn test_double_toggle_restores_base_intensity() {
        let (mut graph, mut rig) = rig(false);
        for i in 0..rig.point_light_count() {
            let base = rig.light(i).unwrap().base_intensity;
            rig.toggle(i, &mut graph);
            rig.toggle(i, &mut graph);
            let light = rig.light(i).unwrap();
            assert!(light.on);
            assert_eq!(light.intensity, base);
            assert_eq!(graph.node(light.fixture).unwrap().material.opacity, FIXTURE_OPACITY_ON);
            assert_eq!(graph.node(light.glow).unwrap().material.emissive_intensity, GLOW_EMISSIVE_ON);
        }
    }

    #[test]
    fn test_toggle_unknown_index_is_none() {
        let (mut graph, mut rig) = rig(false);
        assert_eq!(rig.toggle(9, &mut graph), None);
        let (mut graph, mut rig) = self::rig(true);
        assert_eq!(rig.toggle(0, &mut graph), None);
    }
}

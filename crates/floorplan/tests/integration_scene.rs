//! Integration tests for scene construction across both performance tiers.

use floorplan::lighting::LightingRig;
use floorplan::mesh::mesh_for_node;
use floorplan::scene::{build_scene, NodeTag, SceneGraph, Shape};
use floorplan::RenderQuality;

fn lit_scene(low: bool) -> (SceneGraph, LightingRig) {
    let quality = RenderQuality::from_low_mode(low);
    let mut graph = build_scene(&quality);
    let rig = LightingRig::build(&mut graph, &quality);
    (graph, rig)
}

fn triangle_count(graph: &SceneGraph) -> usize {
    graph.nodes.iter().map(|n| mesh_for_node(n).triangle_count()).sum()
}

#[test]
fn test_low_tier_has_no_point_lights_or_shadows() {
    let (graph, rig) = lit_scene(true);
    assert_eq!(rig.point_light_count(), 0);
    assert!(!rig.directional.cast_shadow);
    for node in &graph.nodes {
        assert!(!node.cast_shadow, "{} casts a shadow", node.name);
        assert!(!node.receive_shadow, "{} receives a shadow", node.name);
        assert!(!matches!(node.tag, NodeTag::Fixture { .. } | NodeTag::Glow { .. }));
    }
    assert!(graph.fog.is_none());
}

#[test]
fn test_high_tier_has_five_indexed_lights() {
    let (graph, rig) = lit_scene(false);
    assert_eq!(rig.point_light_count(), 5);

    let mut indices: Vec<usize> = rig.room_lights.iter().map(|l| l.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);

    for light in &rig.room_lights {
        let fixture = graph.node(light.fixture).unwrap();
        assert_eq!(fixture.tag, NodeTag::Fixture { light: light.index });
        assert_eq!(rig.light_for_fixture(light.fixture), Some(light.index));
    }
    assert!(graph.nodes.iter().any(|n| n.cast_shadow));
    assert!(graph.fog.is_some());
}

#[test]
fn test_low_tier_geometry_is_lighter() {
    let (high, _) = lit_scene(false);
    let (low, _) = lit_scene(true);
    assert!(triangle_count(&low) < triangle_count(&high));
    assert!(low.len() < high.len());
}

#[test]
fn test_structure_is_identical_across_tiers() {
    let (high, _) = lit_scene(false);
    let (low, _) = lit_scene(true);
    let names = |g: &SceneGraph, group: &str| -> Vec<String> {
        g.group_by_name(group)
            .unwrap()
            .nodes
            .iter()
            .map(|id| g.node(*id).unwrap().name.clone())
            .collect()
    };
    assert_eq!(names(&high, "floor_plan"), names(&low, "floor_plan"));
    assert_eq!(names(&high, "furniture"), names(&low, "furniture"));
}

#[test]
fn test_construction_is_deterministic() {
    assert_eq!(lit_scene(false), lit_scene(false));
    assert_eq!(lit_scene(true), lit_scene(true));
}

#[test]
fn test_every_shape_has_positive_size() {
    let (graph, _) = lit_scene(false);
    for node in &graph.nodes {
        let ok = match node.shape {
            Shape::Box { size } => size.iter().all(|s| *s > 0.0),
            Shape::Cylinder { radius, height, .. } => radius > 0.0 && height > 0.0,
            Shape::Sphere { radius, .. } => radius > 0.0,
            Shape::Plane { width, depth } => width > 0.0 && depth > 0.0,
        };
        assert!(ok, "{} has a degenerate shape", node.name);
    }
}

#[test]
fn test_scene_serializes() {
    let (graph, rig) = lit_scene(false);
    let json = serde_json::to_string(&graph).unwrap();
    let back: SceneGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, graph);
    assert!(serde_json::to_string(&rig).unwrap().contains("Kitchen"));
}

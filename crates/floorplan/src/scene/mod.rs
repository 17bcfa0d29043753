//! Scene graph arena: nodes, shapes, materials and named groups.
//!
//! Nodes are stored in a flat `Vec` and addressed by [`NodeId`]. Groups hold
//! node ids, never references, so anything that needs to find a node later
//! (light fixtures, renderer caches) keeps an index.

pub mod floor_plan;
pub mod furniture;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::quality::{Fog, RenderQuality};

/// Index of a node in [`SceneGraph::nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Index of a group in [`SceneGraph::groups`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub usize);

/// Solid shape with its size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Box {
        size: [f32; 3],
    },
    Cylinder {
        radius: f32,
        height: f32,
        segments: u32,
    },
    Sphere {
        radius: f32,
        rings: u32,
        sectors: u32,
    },
    /// Horizontal rectangle facing +Y
    Plane {
        width: f32,
        depth: f32,
    },
}

/// Flat-colour material, optionally transparent and emissive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Material {
    pub fn flat(color: [f32; 3]) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
        }
    }

    pub fn glowing(color: [f32; 3], opacity: f32, emissive_intensity: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: true,
            emissive: color,
            emissive_intensity,
        }
    }
}

/// What a node represents, used by picking and by hosts that label things
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeTag {
    Structure,
    Door,
    RoomFloor,
    Furniture,
    /// Clickable proxy of the room light with this index
    Fixture { light: usize },
    Glow { light: usize },
}

/// A positioned, oriented shape with a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub shape: Shape,
    pub material: Material,
    pub position: [f32; 3],
    /// Euler XYZ rotation in radians
    pub rotation: [f32; 3],
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub tag: NodeTag,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, shape: Shape, material: Material, position: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            shape,
            material,
            position,
            rotation: [0.0; 3],
            cast_shadow: false,
            receive_shadow: false,
            tag: NodeTag::Structure,
        }
    }

    pub fn rotated_y(mut self, angle: f32) -> Self {
        self.rotation[1] = angle;
        self
    }

    pub fn tagged(mut self, tag: NodeTag) -> Self {
        self.tag = tag;
        self
    }

    /// Apply shadow flags, but only when the quality profile allows shadows
    pub fn shadows(mut self, quality: &RenderQuality, cast: bool, receive: bool) -> Self {
        self.cast_shadow = quality.shadows && cast;
        self.receive_shadow = quality.shadows && receive;
        self
    }

    /// Local → world transform
    pub fn model_matrix(&self) -> Mat4 {
        let [rx, ry, rz] = self.rotation;
        Mat4::from_rotation_translation(
            Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            Vec3::from(self.position),
        )
    }
}

/// Named list of node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub nodes: Vec<NodeId>,
}

/// Node arena plus scene-wide settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    pub nodes: Vec<SceneNode>,
    pub groups: Vec<Group>,
    pub background: [f32; 3],
    pub fog: Option<Fog>,
}

impl SceneGraph {
    /// Empty scene carrying the quality profile's background and fog
    pub fn new(quality: &RenderQuality) -> Self {
        Self {
            nodes: Vec::new(),
            groups: Vec::new(),
            background: quality.background,
            fog: quality.fog,
        }
    }

    pub fn add_group(&mut self, name: &str) -> GroupId {
        self.groups.push(Group {
            name: name.to_string(),
            nodes: Vec::new(),
        });
        GroupId(self.groups.len() - 1)
    }

    /// Append a node to the arena and to `group`
    pub fn add_node(&mut self, group: GroupId, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.groups[group.0].nodes.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Iterate `(id, node)` over the whole arena
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the static floor plan and furniture for a quality profile.
///
/// Lights are added separately by [`crate::lighting::LightingRig::build`].
pub fn build_scene(quality: &RenderQuality) -> SceneGraph {
    let mut graph = SceneGraph::new(quality);
    floor_plan::build_floor_plan(&mut graph, quality);
    furniture::build_furniture(&mut graph, quality);
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_follow_insertion_order() {
        let quality = RenderQuality::from_low_mode(false);
        let mut graph = SceneGraph::new(&quality);
        let g = graph.add_group("things");
        let a = graph.add_node(g, SceneNode::new("a", Shape::Box { size: [1.0; 3] }, Material::flat([1.0; 3]), [0.0; 3]));
        let b = graph.add_node(g, SceneNode::new("b", Shape::Box { size: [1.0; 3] }, Material::flat([1.0; 3]), [1.0, 0.0, 0.0]));
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(graph.group(g).nodes, vec![a, b]);
        assert_eq!(graph.node(b).unwrap().name, "b");
    }

    #[test]
    fn test_shadow_flags_follow_quality() {
        let high = RenderQuality::from_low_mode(false);
        let low = RenderQuality::from_low_mode(true);
        let node = || SceneNode::new("n", Shape::Box { size: [1.0; 3] }, Material::flat([1.0; 3]), [0.0; 3]);
        let n = node().shadows(&high, true, false);
        assert!(n.cast_shadow && !n.receive_shadow);
        let n = node().shadows(&low, true, true);
        assert!(!n.cast_shadow && !n.receive_shadow);
    }

    #[test]
    fn test_model_matrix_rotates_about_y() {
        let node = SceneNode::new("n", Shape::Box { size: [1.0; 3] }, Material::flat([1.0; 3]), [2.0, 0.0, 0.0])
            .rotated_y(std::f32::consts::FRAC_PI_2);
        let p = node.model_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(2.0, 0.0, -1.0)).length() < 1e-5);
    }
}

//! Walls, doors and room floors of the apartment plan.
//!
//! The plan is a 20 × 16 rectangle centred on the origin (x ∈ [-10, 10],
//! z ∈ [-8, 8]) split into five rooms:
//!
//! ```text
//!  z=-8 +-----------+-----------------------+
//!       |  bedroom  |      living room      |
//!  z=0  +------+----+-------+---------------+
//!       | bath |   dining   |    kitchen    |
//!  z=8  +------+------------+---------------+
//!     x=-10  x=-5 x=-2     x=2             x=10
//! ```

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use super::{GroupId, Material, NodeTag, SceneGraph, SceneNode, Shape};
use crate::quality::RenderQuality;

pub const WALL_HEIGHT: f32 = 3.0;
pub const WALL_THICKNESS: f32 = 0.2;
/// Offset that keeps door faces off the wall faces (z-fighting)
pub const DOOR_EPSILON: f32 = 0.02;
/// Height of room sub-floors above the slab top
pub const ROOM_FLOOR_OFFSET: f32 = 0.01;

const DOOR_FRAME_SIZE: [f32; 2] = [1.1, 2.2];
const DOOR_SLAB_SIZE: [f32; 2] = [0.9, 2.1];
const SLAB_THICKNESS: f32 = 0.2;

const WALL_COLOR: [f32; 3] = [0.93, 0.91, 0.88];
const SLAB_COLOR: [f32; 3] = [0.7, 0.7, 0.68];
const FRAME_COLOR: [f32; 3] = [0.4, 0.3, 0.22];
const DOOR_COLOR: [f32; 3] = [0.58, 0.42, 0.3];

/// Floor finish of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flooring {
    Wood,
    Tile,
    Carpet,
}

impl Flooring {
    pub fn color(&self) -> [f32; 3] {
        match self {
            Flooring::Wood => [0.62, 0.45, 0.3],
            Flooring::Tile => [0.86, 0.86, 0.83],
            Flooring::Carpet => [0.66, 0.6, 0.55],
        }
    }
}

/// The five rooms of the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Room {
    Bedroom,
    LivingRoom,
    Dining,
    Kitchen,
    Bathroom,
}

impl Room {
    pub const ALL: [Room; 5] = [
        Room::Bedroom,
        Room::LivingRoom,
        Room::Dining,
        Room::Kitchen,
        Room::Bathroom,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Room::Bedroom => "Bedroom",
            Room::LivingRoom => "Living Room",
            Room::Dining => "Dining",
            Room::Kitchen => "Kitchen",
            Room::Bathroom => "Bathroom",
        }
    }

    pub fn flooring(&self) -> Flooring {
        match self {
            Room::Bedroom => Flooring::Carpet,
            Room::LivingRoom | Room::Dining => Flooring::Wood,
            Room::Kitchen | Room::Bathroom => Flooring::Tile,
        }
    }

    /// `[min_x, max_x, min_z, max_z]` measured on wall centre lines
    pub fn bounds(&self) -> [f32; 4] {
        match self {
            Room::Bedroom => [-10.0, -2.0, -8.0, 0.0],
            Room::LivingRoom => [-2.0, 10.0, -8.0, 0.0],
            Room::Bathroom => [-10.0, -5.0, 0.0, 8.0],
            Room::Dining => [-5.0, 2.0, 0.0, 8.0],
            Room::Kitchen => [2.0, 10.0, 0.0, 8.0],
        }
    }

    /// Centre on the floor plane as `[x, z]`
    pub fn center(&self) -> [f32; 2] {
        let [x0, x1, z0, z1] = self.bounds();
        [(x0 + x1) * 0.5, (z0 + z1) * 0.5]
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        let [x0, x1, z0, z1] = self.bounds();
        (x0..=x1).contains(&x) && (z0..=z1).contains(&z)
    }
}

/// Declarative placement shared by walls and doors.
///
/// `size` is `[length, height, thickness]` along the local axes; a rotation
/// of π/2 about Y turns an east-west element into a north-south one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    pub position: [f32; 3],
    pub size: [f32; 3],
    pub rotation: Option<f32>,
}

impl PlanSpec {
    fn rotation_y(&self) -> f32 {
        self.rotation.unwrap_or(0.0)
    }

    /// Unit normal of the element in world space (its local +Z)
    pub fn normal(&self) -> [f32; 3] {
        let r = self.rotation_y();
        [r.sin(), 0.0, r.cos()]
    }
}

fn wall(x: f32, z: f32, length: f32, rotation: Option<f32>) -> PlanSpec {
    PlanSpec {
        position: [x, WALL_HEIGHT * 0.5, z],
        size: [length, WALL_HEIGHT, WALL_THICKNESS],
        rotation,
    }
}

fn door(x: f32, z: f32, rotation: Option<f32>) -> PlanSpec {
    let [w, h] = DOOR_FRAME_SIZE;
    PlanSpec {
        position: [x, h * 0.5, z],
        size: [w, h, WALL_THICKNESS + 2.0 * DOOR_EPSILON],
        rotation,
    }
}

/// Outer perimeter; lengths overlap at the corners so the box is closed
pub fn exterior_walls() -> Vec<PlanSpec> {
    let t = WALL_THICKNESS;
    vec![
        wall(0.0, -8.0, 20.0 + t, None),
        wall(0.0, 8.0, 20.0 + t, None),
        wall(-10.0, 0.0, 16.0 + t, Some(FRAC_PI_2)),
        wall(10.0, 0.0, 16.0 + t, Some(FRAC_PI_2)),
    ]
}

pub fn interior_walls() -> Vec<PlanSpec> {
    vec![
        // Splits the sleeping/living half from the service half
        wall(0.0, 0.0, 20.0, None),
        // Bedroom | living room
        wall(-2.0, -4.0, 8.0, Some(FRAC_PI_2)),
        // Bathroom | dining
        wall(-5.0, 4.0, 8.0, Some(FRAC_PI_2)),
        // Dining | kitchen: open for the first 3 units and lowered
        PlanSpec {
            position: [2.0, 1.2, 5.5],
            size: [5.0, 2.4, WALL_THICKNESS],
            rotation: Some(FRAC_PI_2),
        },
    ]
}

pub fn doors() -> Vec<PlanSpec> {
    vec![
        // Front door into the dining area
        door(-1.5, 8.0, None),
        door(-3.5, 0.0, None),
        door(0.5, 0.0, None),
        door(-5.0, 2.0, Some(FRAC_PI_2)),
        // Patio door off the living room
        door(10.0, -4.0, Some(FRAC_PI_2)),
    ]
}

/// Add slab, walls, doors and room floors under a `floor_plan` group
pub fn build_floor_plan(graph: &mut SceneGraph, quality: &RenderQuality) -> GroupId {
    let group = graph.add_group("floor_plan");

    graph.add_node(
        group,
        SceneNode::new(
            "floor_slab",
            Shape::Box {
                size: [20.0 + 2.0 * WALL_THICKNESS, SLAB_THICKNESS, 16.0 + 2.0 * WALL_THICKNESS],
            },
            Material::flat(SLAB_COLOR),
            [0.0, -SLAB_THICKNESS * 0.5, 0.0],
        )
        .shadows(quality, false, true),
    );

    for (i, spec) in exterior_walls().iter().enumerate() {
        add_wall(graph, group, quality, format!("exterior_wall_{i}"), spec);
    }
    for (i, spec) in interior_walls().iter().enumerate() {
        add_wall(graph, group, quality, format!("interior_wall_{i}"), spec);
    }
    for (i, spec) in doors().iter().enumerate() {
        add_door(graph, group, quality, i, spec);
    }

    let inset = WALL_THICKNESS;
    for room in Room::ALL {
        let [x0, x1, z0, z1] = room.bounds();
        let [cx, cz] = room.center();
        graph.add_node(
            group,
            SceneNode::new(
                format!("floor_{room:?}").to_lowercase(),
                Shape::Plane {
                    width: x1 - x0 - inset,
                    depth: z1 - z0 - inset,
                },
                Material::flat(room.flooring().color()),
                [cx, ROOM_FLOOR_OFFSET, cz],
            )
            .tagged(NodeTag::RoomFloor)
            .shadows(quality, false, true),
        );
    }

    tracing::debug!(nodes = graph.group(group).nodes.len(), "floor plan built");
    group
}

fn add_wall(graph: &mut SceneGraph, group: GroupId, quality: &RenderQuality, name: String, spec: &PlanSpec) {
    graph.add_node(
        group,
        SceneNode::new(name, Shape::Box { size: spec.size }, Material::flat(WALL_COLOR), spec.position)
            .rotated_y(spec.rotation_y())
            .shadows(quality, true, true),
    );
}

/// Frame box plus a thinner, narrower slab pushed `DOOR_EPSILON` along the
/// wall normal. Face depths (wall ±t/2, frame ±(t/2+ε), slab +t/2+2.5ε /
/// −t/2−0.5ε) never coincide.
fn add_door(graph: &mut SceneGraph, group: GroupId, quality: &RenderQuality, index: usize, spec: &PlanSpec) {
    graph.add_node(
        group,
        SceneNode::new(
            format!("door_frame_{index}"),
            Shape::Box { size: spec.size },
            Material::flat(FRAME_COLOR),
            spec.position,
        )
        .rotated_y(spec.rotation_y())
        .tagged(NodeTag::Door)
        .shadows(quality, true, true),
    );

    let [nx, _, nz] = spec.normal();
    let [px, _, pz] = spec.position;
    let [w, h] = DOOR_SLAB_SIZE;
    graph.add_node(
        group,
        SceneNode::new(
            format!("door_{index}"),
            Shape::Box {
                size: [w, h, WALL_THICKNESS + 3.0 * DOOR_EPSILON],
            },
            Material::flat(DOOR_COLOR),
            [px + nx * DOOR_EPSILON, h * 0.5, pz + nz * DOOR_EPSILON],
        )
        .rotated_y(spec.rotation_y())
        .tagged(NodeTag::Door)
        .shadows(quality, true, true),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perimeter_is_closed() {
        let walls = exterior_walls();
        let spans_x = walls.iter().filter(|w| w.rotation.is_none()).all(|w| w.size[0] >= 20.0);
        let spans_z = walls.iter().filter(|w| w.rotation.is_some()).all(|w| w.size[0] >= 16.0);
        assert_eq!(walls.len(), 4);
        assert!(spans_x && spans_z);
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        for a in Room::ALL {
            for b in Room::ALL {
                if a == b {
                    continue;
                }
                let [cx, cz] = a.center();
                assert!(!b.contains(cx, cz), "{a:?} centre lies in {b:?}");
            }
        }
    }

    #[test]
    fn test_doors_sit_on_walls() {
        let walls: Vec<PlanSpec> = exterior_walls().into_iter().chain(interior_walls()).collect();
        for d in doors() {
            let on_wall = walls.iter().any(|w| {
                let along_x = w.rotation.is_none() == d.rotation.is_none();
                let (wx, wz, dx, dz) = if w.rotation.is_none() {
                    (w.position[0], w.position[2], d.position[0], d.position[2])
                } else {
                    (w.position[2], w.position[0], d.position[2], d.position[0])
                };
                along_x && (wz - dz).abs() < 1e-4 && (wx - dx).abs() <= w.size[0] * 0.5
            });
            assert!(on_wall, "door at {:?} is not on a wall", d.position);
        }
    }

    #[test]
    fn test_door_slab_offset_along_normal() {
        let quality = RenderQuality::from_low_mode(false);
        let mut graph = SceneGraph::new(&quality);
        build_floor_plan(&mut graph, &quality);
        let frame = graph.nodes.iter().find(|n| n.name == "door_frame_3").unwrap();
        let slab = graph.nodes.iter().find(|n| n.name == "door_3").unwrap();
        // North-south door: nudged along +X
        assert!((slab.position[0] - frame.position[0] - DOOR_EPSILON).abs() < 1e-5);
        assert!((slab.position[2] - frame.position[2]).abs() < 1e-5);
    }

    #[test]
    fn test_room_floors_above_slab() {
        let quality = RenderQuality::from_low_mode(true);
        let mut graph = SceneGraph::new(&quality);
        build_floor_plan(&mut graph, &quality);
        let floors: Vec<_> = graph.nodes.iter().filter(|n| n.tag == NodeTag::RoomFloor).collect();
        assert_eq!(floors.len(), 5);
        assert!(floors.iter().all(|f| f.position[1] > 0.0 && f.position[1] < 0.05));
    }
}

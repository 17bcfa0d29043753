//! Furniture sets, one per furnished room. All coordinates are hand-placed
//! against the wall layout in [`super::floor_plan`].

use std::f32::consts::FRAC_PI_2;

use super::{GroupId, Material, NodeTag, SceneGraph, SceneNode, Shape};
use crate::quality::RenderQuality;
use crate::scene::floor_plan::Room;

const WOOD_DARK: [f32; 3] = [0.36, 0.25, 0.18];
const WOOD_LIGHT: [f32; 3] = [0.72, 0.57, 0.4];
const FABRIC: [f32; 3] = [0.45, 0.52, 0.6];
const LINEN: [f32; 3] = [0.95, 0.93, 0.9];
const CHARCOAL: [f32; 3] = [0.15, 0.15, 0.17];
const CABINET: [f32; 3] = [0.88, 0.87, 0.84];
const STEEL: [f32; 3] = [0.75, 0.76, 0.78];

/// Distance of the dining chairs from the table centre
const CHAIR_RADIUS: f32 = 1.25;

/// One furniture piece before it becomes a node
struct Piece {
    name: &'static str,
    shape: Shape,
    color: [f32; 3],
    position: [f32; 3],
    rotation_y: f32,
}

fn block(name: &'static str, size: [f32; 3], color: [f32; 3], position: [f32; 3]) -> Piece {
    Piece {
        name,
        shape: Shape::Box { size },
        color,
        position,
        rotation_y: 0.0,
    }
}

fn bedroom() -> Vec<Piece> {
    vec![
        block("bed", [2.0, 0.5, 2.2], LINEN, [-6.0, 0.25, -6.6]),
        block("headboard", [2.1, 1.1, 0.12], WOOD_DARK, [-6.0, 0.55, -7.8]),
        block("nightstand_left", [0.5, 0.55, 0.45], WOOD_DARK, [-7.4, 0.275, -7.4]),
        block("nightstand_right", [0.5, 0.55, 0.45], WOOD_DARK, [-4.6, 0.275, -7.4]),
    ]
}

fn living_room() -> Vec<Piece> {
    vec![
        block("sofa", [3.0, 0.8, 1.0], FABRIC, [4.0, 0.4, -6.8]),
        block("coffee_table", [1.4, 0.4, 0.8], WOOD_LIGHT, [4.0, 0.2, -4.8]),
        block("tv_stand", [2.4, 0.5, 0.45], WOOD_DARK, [4.0, 0.25, -0.6]),
        block("tv", [1.9, 1.1, 0.08], CHARCOAL, [4.0, 1.05, -0.6]),
    ]
}

/// Round table with four chairs at 90° around it, each turned to face the table
fn dining(quality: &RenderQuality) -> Vec<Piece> {
    let [cx, cz] = Room::Dining.center();
    let mut pieces = vec![Piece {
        name: "dining_table",
        shape: Shape::Cylinder {
            radius: 0.8,
            height: 0.75,
            segments: quality.radial_segments,
        },
        color: WOOD_LIGHT,
        position: [cx, 0.375, cz],
        rotation_y: 0.0,
    }];

    const CHAIRS: [&str; 4] = ["chair_east", "chair_south", "chair_west", "chair_north"];
    for (i, name) in CHAIRS.into_iter().enumerate() {
        let angle = i as f32 * FRAC_PI_2;
        pieces.push(Piece {
            name,
            shape: Shape::Box { size: [0.5, 0.5, 0.5] },
            color: WOOD_DARK,
            position: [cx + CHAIR_RADIUS * angle.cos(), 0.25, cz + CHAIR_RADIUS * angle.sin()],
            rotation_y: -angle,
        });
    }
    pieces
}

fn kitchen() -> Vec<Piece> {
    vec![
        block("island", [2.4, 0.9, 1.0], WOOD_LIGHT, [6.0, 0.45, 3.6]),
        block("cabinets", [4.0, 0.9, 0.6], CABINET, [6.6, 0.45, 7.55]),
        block("upper_cabinets", [4.0, 0.7, 0.35], CABINET, [6.6, 2.1, 7.72]),
        block("fridge", [0.9, 1.9, 0.75], STEEL, [9.35, 0.95, 7.45]),
        block("stove", [0.8, 0.92, 0.6], CHARCOAL, [4.1, 0.46, 7.55]),
    ]
}

/// Add every furniture piece under a `furniture` group
pub fn build_furniture(graph: &mut SceneGraph, quality: &RenderQuality) -> GroupId {
    let group = graph.add_group("furniture");

    let pieces = bedroom()
        .into_iter()
        .chain(living_room())
        .chain(dining(quality))
        .chain(kitchen());

    for piece in pieces {
        graph.add_node(
            group,
            SceneNode::new(piece.name, piece.shape, Material::flat(piece.color), piece.position)
                .rotated_y(piece.rotation_y)
                .tagged(NodeTag::Furniture)
                .shadows(quality, true, true),
        );
    }

    group
}

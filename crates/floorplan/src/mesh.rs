use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::scene::{SceneNode, Shape};

/// Floats per interleaved vertex
pub const VERTEX_STRIDE: usize = 9;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Local-space mesh for a node's shape, tinted with its material colour
pub fn mesh_for_node(node: &SceneNode) -> MeshData {
    let color = node.material.color;
    match node.shape {
        Shape::Box { size: [w, h, d] } => cube(w, h, d, color),
        Shape::Cylinder {
            radius,
            height,
            segments,
        } => cylinder(radius, height, segments.max(3), color),
        Shape::Sphere {
            radius,
            rings,
            sectors,
        } => sphere(radius, rings.max(2), sectors.max(3), color),
        Shape::Plane { width, depth } => plane(width, depth, color),
    }
}

// ── Primitives ───────────────────────────────────────────────
//
// Every triangle winds counter-clockwise seen from the side its normal
// points to.

/// `(normal, u, v)` per box face with `u × v == normal`
const BOX_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Axis-aligned box centred on the origin, flat normals per face
pub fn cube(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let half = Vec3::new(w, h, d) * 0.5;
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(24 * VERTEX_STRIDE),
        indices: Vec::with_capacity(36),
    };
    for (normal, u, v) in BOX_FACES {
        push_face(&mut mesh, normal * half, u * half, v * half, normal, color);
    }
    mesh
}

/// Flat rectangle in the XZ plane facing +Y
pub fn plane(width: f32, depth: f32, color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::default();
    push_face(
        &mut mesh,
        Vec3::ZERO,
        Vec3::Z * (depth * 0.5),
        Vec3::X * (width * 0.5),
        Vec3::Y,
        color,
    );
    mesh
}

/// Upright cylinder centred on the origin. The side shares one smooth
/// column of vertices per segment edge; caps are flat fans.
pub fn cylinder(radius: f32, height: f32, segments: u32, color: [f32; 3]) -> MeshData {
    let hh = height * 0.5;
    let rim = ring(segments);
    let mut mesh = MeshData::default();

    let base = mesh.vertex_count() as u32;
    for &(c, s) in &rim {
        let n = Vec3::new(c, 0.0, s);
        push_vert(&mut mesh, Vec3::new(radius * c, -hh, radius * s), n, color);
        push_vert(&mut mesh, Vec3::new(radius * c, hh, radius * s), n, color);
    }
    for i in 0..segments {
        let bottom = base + 2 * i;
        let top = bottom + 1;
        let (next_bottom, next_top) = (bottom + 2, bottom + 3);
        mesh.indices
            .extend_from_slice(&[bottom, top, next_top, bottom, next_top, next_bottom]);
    }

    push_disc(&mut mesh, &rim, radius, hh, Vec3::Y, color);
    push_disc(&mut mesh, &rim, radius, -hh, Vec3::NEG_Y, color);
    mesh
}

/// UV sphere centred on the origin
pub fn sphere(radius: f32, rings: u32, sectors: u32, color: [f32; 3]) -> MeshData {
    let around = ring(sectors);
    let mut mesh = MeshData::default();

    for r in 0..=rings {
        let (sin_phi, cos_phi) = (PI * r as f32 / rings as f32).sin_cos();
        for &(c, s) in &around {
            let n = Vec3::new(sin_phi * c, cos_phi, sin_phi * s);
            push_vert(&mut mesh, n * radius, n, color);
        }
    }

    let row = sectors + 1;
    for r in 0..rings {
        for s in 0..sectors {
            let here = r * row + s;
            let below = here + row;
            mesh.indices
                .extend_from_slice(&[here, here + 1, below, here + 1, below + 1, below]);
        }
    }
    mesh
}

// ── Helpers ──────────────────────────────────────────────────

/// `(cos, sin)` of `segments + 1` evenly spaced angles; the last repeats the first
fn ring(segments: u32) -> Vec<(f32, f32)> {
    (0..=segments)
        .map(|i| {
            let (s, c) = (TAU * (i % segments) as f32 / segments as f32).sin_cos();
            (c, s)
        })
        .collect()
}

fn push_vert(mesh: &mut MeshData, p: Vec3, n: Vec3, c: [f32; 3]) {
    mesh.vertices
        .extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

/// Quad spanning `center ± u ± v`
fn push_face(mesh: &mut MeshData, center: Vec3, u: Vec3, v: Vec3, normal: Vec3, color: [f32; 3]) {
    let base = mesh.vertex_count() as u32;
    for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
        push_vert(mesh, corner, normal, color);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Triangle fan at height `y` facing `normal` (±Y)
fn push_disc(mesh: &mut MeshData, rim: &[(f32, f32)], radius: f32, y: f32, normal: Vec3, color: [f32; 3]) {
    let center = mesh.vertex_count() as u32;
    push_vert(mesh, Vec3::new(0.0, y, 0.0), normal, color);
    for &(c, s) in rim {
        push_vert(mesh, Vec3::new(radius * c, y, radius * s), normal, color);
    }
    for i in 0..(rim.len() as u32 - 1) {
        let (a, b) = (center + 1 + i, center + 2 + i);
        if normal.y > 0.0 {
            mesh.indices.extend_from_slice(&[center, b, a]);
        } else {
            mesh.indices.extend_from_slice(&[center, a, b]);
        }
    }
}

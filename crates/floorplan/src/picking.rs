use glam::Vec3;

use crate::lighting::LightingRig;
use crate::scene::{NodeTag, SceneGraph, Shape};

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Ray-sphere intersection.
/// Returns the distance along the ray to the nearest hit in front of the origin, or None.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = (-half_b - sqrt_d) / a;
    let far = (-half_b + sqrt_d) / a;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Origin inside the sphere
        Some(far)
    } else {
        None
    }
}

/// Light index of the nearest fixture marker hit by the ray.
///
/// Only fixture-tagged sphere nodes are tested; walls, furniture and glow
/// halos never block or register a hit.
pub fn pick_fixture(ray: &Ray, graph: &SceneGraph, rig: &LightingRig) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for light in &rig.room_lights {
        let Some(node) = graph.node(light.fixture) else {
            continue;
        };
        let (NodeTag::Fixture { light: index }, Shape::Sphere { radius, .. }) = (node.tag, &node.shape) else {
            continue;
        };
        if let Some(dist) = ray_sphere(ray, Vec3::from(node.position), *radius) {
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((index, dist));
            }
        }
    }

    best.map(|(index, _)| index)
}

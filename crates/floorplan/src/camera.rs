use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::FloorPlanConfig;
use crate::picking::Ray;

/// Polar angle stays this far away from either pole
pub const POLAR_MARGIN: f32 = 0.1;
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;

const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Spherical coordinates around a target (Y up).
///
/// `theta` is the azimuth measured from +Z towards +X, `phi` the polar angle
/// measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit camera state, updated only through [`reduce`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    /// Fixed look-at point
    pub target: Vec3,
    pub zoom: f32,
    /// Camera distance at zoom 1
    pub base_distance: f32,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub aspect: f32,
}

/// Inputs the camera reducer understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// Pointer drag delta in pixels
    Orbit { delta: Vec2, rotate_speed: f32 },
    /// Net wheel ticks; positive (wheel down) zooms in
    Zoom { ticks: i32, step: f32 },
    Resize { width: u32, height: u32 },
}

impl CameraState {
    /// Initial camera from config. The position is pulled off the poles into
    /// the allowed polar range; a position on the target falls back to the
    /// default offset.
    pub fn new(config: &FloorPlanConfig, aspect: f32) -> Self {
        let target = Vec3::from(config.camera_target);
        let mut s = Spherical::from_offset(Vec3::from(config.camera_position) - target);
        if s.radius <= f32::EPSILON {
            let fallback = FloorPlanConfig::default();
            s = Spherical::from_offset(Vec3::from(fallback.camera_position) - Vec3::from(fallback.camera_target));
        }
        s.phi = s.phi.clamp(POLAR_MARGIN, PI - POLAR_MARGIN);
        Self {
            position: target + s.to_offset(),
            target,
            zoom: 1.0,
            base_distance: s.radius,
            fov: config.fov_degrees.to_radians(),
            aspect,
        }
    }

    /// Distance implied by the zoom scalar
    pub fn distance(&self) -> f32 {
        self.base_distance / self.zoom
    }

    /// Current azimuth/polar angle derived from position and target
    pub fn spherical(&self) -> Spherical {
        Spherical::from_offset(self.position - self.target)
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect, NEAR, FAR)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through normalized device coordinates (-1..1, y up)
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let vp_inv = self.view_projection().inverse();

        let near_world = vp_inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.position,
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Project a world point to normalized device coordinates
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let p = self.view_projection() * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(p.x / p.w, p.y / p.w))
    }
}

/// Pure camera update: `(state, action) -> state'`
pub fn reduce(state: CameraState, action: CameraAction) -> CameraState {
    match action {
        CameraAction::Orbit { delta, rotate_speed } => orbit(state, delta, rotate_speed),
        CameraAction::Zoom { ticks, step } => zoom(state, ticks, step),
        CameraAction::Resize { width, height } => CameraState {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            ..state
        },
    }
}

fn orbit(state: CameraState, delta: Vec2, rotate_speed: f32) -> CameraState {
    let mut s = state.spherical();
    s.theta -= delta.x * rotate_speed;
    s.phi = (s.phi + delta.y * rotate_speed).clamp(POLAR_MARGIN, PI - POLAR_MARGIN);
    s.radius = state.distance();
    CameraState {
        position: state.target + s.to_offset(),
        ..state
    }
}

fn zoom(state: CameraState, ticks: i32, step: f32) -> CameraState {
    let zoom = (state.zoom + ticks as f32 * step).clamp(MIN_ZOOM, MAX_ZOOM);
    let direction = (state.position - state.target).normalize_or_zero();
    CameraState {
        zoom,
        position: state.target + direction * (state.base_distance / zoom),
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraState {
        CameraState::new(&FloorPlanConfig::default(), 16.0 / 9.0)
    }

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vec3::new(3.0, 4.0, -5.0);
        assert_vec_eq(Spherical::from_offset(offset).to_offset(), offset);
    }

    #[test]
    fn test_orbit_horizontal_drag_changes_azimuth_only() {
        let start = camera();
        let before = start.spherical();
        let next = reduce(
            start,
            CameraAction::Orbit {
                delta: Vec2::new(100.0, 0.0),
                rotate_speed: 0.005,
            },
        );
        let after = next.spherical();
        assert!((after.theta - (before.theta - 0.5)).abs() < 1e-4);
        assert!((after.phi - before.phi).abs() < 1e-4);
        assert_eq!(next.target, start.target);
    }

    #[test]
    fn test_orbit_clamps_polar_angle() {
        let mut state = camera();
        for dy in [10_000.0, -10_000.0, 3_000.0] {
            state = reduce(
                state,
                CameraAction::Orbit {
                    delta: Vec2::new(0.0, dy),
                    rotate_speed: 0.005,
                },
            );
            let phi = state.spherical().phi;
            assert!((POLAR_MARGIN - 1e-4..=PI - POLAR_MARGIN + 1e-4).contains(&phi), "phi = {phi}");
        }
    }

    #[test]
    fn test_zoom_clamps_and_keeps_direction() {
        let start = camera();
        let dir = (start.position - start.target).normalize();
        let zoomed = reduce(start, CameraAction::Zoom { ticks: 100, step: 0.25 });
        assert_eq!(zoomed.zoom, MAX_ZOOM);
        assert_vec_eq((zoomed.position - zoomed.target).normalize(), dir);
        assert!(((zoomed.position - zoomed.target).length() - start.base_distance / MAX_ZOOM).abs() < 1e-3);

        let out = reduce(zoomed, CameraAction::Zoom { ticks: -100, step: 0.25 });
        assert_eq!(out.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let state = reduce(camera(), CameraAction::Resize { width: 800, height: 600 });
        assert!((state.aspect - 800.0 / 600.0).abs() < 1e-6);
        let state = reduce(state, CameraAction::Resize { width: 800, height: 0 });
        assert!(state.aspect.is_finite());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let state = camera();
        let ray = state.ray_through(Vec2::ZERO);
        let to_target = (state.target - state.position).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_project_target_is_screen_center() {
        let state = camera();
        let ndc = state.project(state.target).unwrap();
        assert!(ndc.length() < 1e-4);
    }
}

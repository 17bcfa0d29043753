//! Interactive 3D floor-plan core.
//!
//! Hosts (the native viewer, the browser crate) supply a [`render_loop::SceneRenderer`],
//! a [`render_loop::FrameScheduler`] and a [`bindings::EventSurface`]; everything
//! else (tier selection, scene construction, lights, camera, input routing,
//! teardown) lives here and is testable headless through [`harness::TestHarness`].

pub mod bindings;
pub mod camera;
pub mod config;
pub mod gl_renderer;
pub mod harness;
pub mod interaction;
pub mod lighting;
pub mod mesh;
pub mod picking;
pub mod quality;
pub mod render_loop;
pub mod scene;
pub mod session;

pub use config::FloorPlanConfig;
pub use quality::{DeviceProfile, PerformanceTier, RenderQuality};
pub use session::{ContainerSize, FloorPlanSession, MountedFloorPlan};

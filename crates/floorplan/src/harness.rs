//! Headless test harness.
//!
//! Stands in for a host page: a recording renderer, a manually-fired frame
//! scheduler and an in-memory event surface. Each fake is a cheap clone over
//! shared state so tests can inspect it after the session has been dropped.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::bindings::{EventKind, EventSurface, InputSink, ListenTarget};
use crate::camera::CameraState;
use crate::config::FloorPlanConfig;
use crate::interaction::{InputEvent, RouterOutcome};
use crate::render_loop::{FrameScheduler, FrameView, SceneRenderer};
use crate::scene::NodeId;
use crate::session::{ContainerSize, FloorPlanSession, MountedFloorPlan};

/// Interval between simulated animation frames
pub const FRAME_TIME: Duration = Duration::from_millis(16);

// ── Renderer ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RenderLog {
    pub resizes: Vec<(u32, u32)>,
    pub renders: usize,
    pub disposed: Vec<NodeId>,
    pub context_releases: usize,
    pub last_camera: Option<CameraState>,
    /// Room light intensities seen by the last render
    pub last_intensities: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<RenderLog>>,
}

impl RecordingRenderer {
    pub fn log(&self) -> Ref<'_, RenderLog> {
        self.log.borrow()
    }
}

impl SceneRenderer for RecordingRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().resizes.push((width, height));
    }

    fn render(&mut self, view: &FrameView<'_>) {
        let mut log = self.log.borrow_mut();
        log.renders += 1;
        log.last_camera = Some(*view.camera);
        log.last_intensities = view.lighting.room_lights.iter().map(|l| l.intensity).collect();
    }

    fn dispose_node(&mut self, id: NodeId) {
        self.log.borrow_mut().disposed.push(id);
    }

    fn release_context(&mut self) {
        self.log.borrow_mut().context_releases += 1;
    }
}

// ── Frame scheduler ──────────────────────────────────────────

#[derive(Debug, Default)]
struct SchedulerState {
    next_handle: u32,
    pending: Option<u32>,
    requested: usize,
    cancelled: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> Option<u32> {
        self.state.borrow().pending
    }

    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u32;

    fn request(&mut self) -> u32 {
        let mut s = self.state.borrow_mut();
        s.next_handle += 1;
        s.requested += 1;
        s.pending = Some(s.next_handle);
        s.next_handle
    }

    fn cancel(&mut self, handle: u32) {
        let mut s = self.state.borrow_mut();
        if s.pending == Some(handle) {
            s.pending = None;
            s.cancelled += 1;
        }
    }
}

// ── Event surface ────────────────────────────────────────────

#[derive(Debug, Default)]
struct SurfaceState {
    next_handle: usize,
    active: Vec<(usize, ListenTarget, EventKind)>,
    removed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl FakeSurface {
    pub fn active(&self) -> Vec<(ListenTarget, EventKind)> {
        self.state.borrow().active.iter().map(|&(_, t, k)| (t, k)).collect()
    }

    pub fn is_listening(&self, target: ListenTarget, kind: EventKind) -> bool {
        self.active().contains(&(target, kind))
    }

    pub fn removed_count(&self) -> usize {
        self.state.borrow().removed
    }
}

impl EventSurface for FakeSurface {
    type Handle = usize;

    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> usize {
        let mut s = self.state.borrow_mut();
        s.next_handle += 1;
        let handle = s.next_handle;
        s.active.push((handle, target, kind));
        handle
    }

    fn unlisten(&mut self, handle: usize) {
        let mut s = self.state.borrow_mut();
        let before = s.active.len();
        s.active.retain(|&(h, _, _)| h != handle);
        if s.active.len() < before {
            s.removed += 1;
        }
    }
}

// ── Harness ──────────────────────────────────────────────────

pub type HarnessSession = FloorPlanSession<RecordingRenderer, ManualScheduler>;

/// A mounted floor plan driven by synthetic input and frames
pub struct TestHarness {
    mounted: MountedFloorPlan<RecordingRenderer, ManualScheduler, FakeSurface>,
    session: Rc<RefCell<HarnessSession>>,
    pub renderer: RecordingRenderer,
    pub scheduler: ManualScheduler,
    pub surface: FakeSurface,
    now: Duration,
}

impl TestHarness {
    /// Mount into a container of the given size; `None` when mount is refused
    pub fn mount(low_performance_mode: bool, width: u32, height: u32) -> Option<Self> {
        Self::mount_with(low_performance_mode, width, height, FloorPlanConfig::default())
    }

    pub fn mount_with(low_performance_mode: bool, width: u32, height: u32, config: FloorPlanConfig) -> Option<Self> {
        let renderer = RecordingRenderer::default();
        let scheduler = ManualScheduler::default();
        let surface = FakeSurface::default();

        let session = FloorPlanSession::mount(
            Some(ContainerSize { width, height }),
            low_performance_mode,
            config,
            renderer.clone(),
            scheduler.clone(),
        )?;
        let mounted = MountedFloorPlan::new(session, surface.clone());

        Some(Self {
            session: mounted.session(),
            mounted,
            renderer,
            scheduler,
            surface,
            now: Duration::ZERO,
        })
    }

    pub fn session(&self) -> Ref<'_, HarnessSession> {
        self.session.borrow()
    }

    pub fn camera(&self) -> CameraState {
        *self.session.borrow().camera()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    // ── Input ────────────────────────────────────────────────

    pub fn dispatch(&mut self, event: InputEvent) -> RouterOutcome {
        self.session.borrow_mut().dispatch(event)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> RouterOutcome {
        let at = self.now;
        self.dispatch(InputEvent::PointerDown {
            position: Vec2::new(x, y),
            at,
        })
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> RouterOutcome {
        let at = self.now;
        self.dispatch(InputEvent::PointerMove {
            position: Vec2::new(x, y),
            at,
        })
    }

    pub fn pointer_up(&mut self) -> RouterOutcome {
        let at = self.now;
        self.dispatch(InputEvent::PointerUp { at })
    }

    /// One wheel tick; positive is wheel-down
    pub fn wheel(&mut self, delta_y: f32) -> RouterOutcome {
        let at = self.now;
        self.dispatch(InputEvent::Wheel { delta_y, at })
    }

    pub fn click(&mut self, x: f32, y: f32) -> RouterOutcome {
        let at = self.now;
        self.dispatch(InputEvent::Click {
            position: Vec2::new(x, y),
            at,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> RouterOutcome {
        self.dispatch(InputEvent::Resize { width, height })
    }

    /// Press, move in `steps` equal increments one frame apart, release
    pub fn drag(&mut self, from: Vec2, to: Vec2, steps: u32) {
        self.pointer_down(from.x, from.y);
        let steps = steps.max(1);
        for i in 1..=steps {
            self.advance(FRAME_TIME);
            let p = from.lerp(to, i as f32 / steps as f32);
            self.pointer_move(p.x, p.y);
        }
        self.advance(FRAME_TIME);
        self.pointer_up();
    }

    /// Canvas pixel position of room light `index`'s fixture
    pub fn light_screen_position(&self, index: usize) -> Option<Vec2> {
        let session = self.session.borrow();
        let light = session.lighting().light(index)?;
        let ndc = session.camera().project(Vec3::from(light.position))?;
        let viewport = session.viewport();
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }

    /// Click on the fixture of room light `index`
    pub fn click_light(&mut self, index: usize) -> Option<RouterOutcome> {
        let p = self.light_screen_position(index)?;
        Some(self.click(p.x, p.y))
    }

    // ── Frames ───────────────────────────────────────────────

    /// Fire `n` scheduled frames; stops early if nothing is scheduled.
    /// Returns how many of them were drawn.
    pub fn run_frames(&mut self, n: usize) -> usize {
        let mut drawn = 0;
        for _ in 0..n {
            if self.scheduler.pending().is_none() {
                break;
            }
            self.advance(FRAME_TIME);
            let now = self.now;
            if self.session.borrow_mut().frame(now) {
                drawn += 1;
            }
        }
        drawn
    }

    pub fn unmount(&mut self) {
        self.mounted.unmount();
    }

    pub fn listener_count(&self) -> usize {
        self.mounted.listener_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_mounts_and_binds() {
        let h = TestHarness::mount(false, 800, 600).unwrap();
        assert_eq!(h.listener_count(), 6);
        assert!(h.surface.is_listening(ListenTarget::Canvas, EventKind::Click));
        assert!(h.surface.is_listening(ListenTarget::Window, EventKind::PointerUp));
        assert_eq!(h.scheduler.pending(), Some(1));
    }

    #[test]
    fn test_low_tier_does_not_bind_click() {
        let h = TestHarness::mount(true, 800, 600).unwrap();
        assert_eq!(h.listener_count(), 5);
        assert!(!h.surface.is_listening(ListenTarget::Canvas, EventKind::Click));
    }

    #[test]
    fn test_run_frames_stops_after_unmount() {
        let mut h = TestHarness::mount(false, 800, 600).unwrap();
        assert_eq!(h.run_frames(3), 3);
        h.unmount();
        assert_eq!(h.run_frames(3), 0);
    }
}

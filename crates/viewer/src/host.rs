//! Native implementations of the floor plan host seams.
//!
//! The GL context is only reachable inside egui's paint callback, so the
//! renderer side here just records what to draw ([`FrameSnapshot`]) and which
//! GPU resources to free; the paint callback applies both.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use floorplan::bindings::{EventKind, EventSurface, ListenTarget};
use floorplan::gl_renderer::FrameSnapshot;
use floorplan::render_loop::{FrameScheduler, FrameView, SceneRenderer};
use floorplan::scene::NodeId;
use floorplan::DeviceProfile;

/// State shared between the session's renderer and the paint callback
#[derive(Debug, Default)]
pub struct PaintQueue {
    /// Latest drawn frame; skipped low-tier frames leave it untouched
    pub frame: Option<FrameSnapshot>,
    pub disposals: Vec<NodeId>,
    /// Set once teardown asked for the context to go away; nothing is drawn after
    pub released: bool,
}

pub type SharedPaintQueue = Arc<Mutex<PaintQueue>>;

#[derive(Debug, Clone, Default)]
pub struct SnapshotRenderer {
    queue: SharedPaintQueue,
}

impl SnapshotRenderer {
    pub fn new(queue: SharedPaintQueue) -> Self {
        Self { queue }
    }

    fn with_queue(&self, f: impl FnOnce(&mut PaintQueue)) {
        match self.queue.lock() {
            Ok(mut q) => f(&mut q),
            Err(_) => tracing::error!("paint queue lock poisoned"),
        }
    }
}

impl SceneRenderer for SnapshotRenderer {
    /// The paint callback draws into egui's clip rect, so there is no
    /// surface to size here
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, view: &FrameView<'_>) {
        let frame = FrameSnapshot::capture(view);
        self.with_queue(|q| {
            if !q.released {
                q.frame = Some(frame);
            }
        });
    }

    fn dispose_node(&mut self, id: NodeId) {
        self.with_queue(|q| q.disposals.push(id));
    }

    fn release_context(&mut self) {
        self.with_queue(|q| {
            q.frame = None;
            q.released = true;
        });
    }
}

// ── Frame scheduling ─────────────────────────────────────────

#[derive(Debug, Default)]
struct RepaintState {
    next: u64,
    pending: Option<u64>,
}

/// Frames are "delivered" by the app's update loop; a pending request keeps
/// egui repainting
#[derive(Debug, Clone, Default)]
pub struct RepaintScheduler {
    state: Rc<RefCell<RepaintState>>,
}

impl RepaintScheduler {
    /// Take the pending request, if any, so the caller can run that frame
    pub fn fire(&self) -> Option<u64> {
        self.state.borrow_mut().pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }
}

impl FrameScheduler for RepaintScheduler {
    type Handle = u64;

    fn request(&mut self) -> u64 {
        let mut s = self.state.borrow_mut();
        s.next += 1;
        s.pending = Some(s.next);
        s.next
    }

    fn cancel(&mut self, handle: u64) {
        let mut s = self.state.borrow_mut();
        if s.pending == Some(handle) {
            s.pending = None;
        }
    }
}

// ── Event surface ────────────────────────────────────────────

/// Tracks which event kinds the session wants; the translator drops the rest
#[derive(Debug, Clone, Default)]
pub struct WindowSurface {
    listening: Rc<RefCell<HashSet<EventKind>>>,
}

impl WindowSurface {
    pub fn is_listening(&self, kind: EventKind) -> bool {
        self.listening.borrow().contains(&kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listening.borrow().len()
    }
}

impl EventSurface for WindowSurface {
    type Handle = EventKind;

    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> EventKind {
        tracing::trace!(?target, ?kind, "listen");
        self.listening.borrow_mut().insert(kind);
        kind
    }

    fn unlisten(&mut self, kind: EventKind) {
        self.listening.borrow_mut().remove(&kind);
    }
}

/// What a desktop can tell about itself. There is no user agent or memory
/// probe without extra crates, so only the core count is reported.
pub fn native_device_profile() -> DeviceProfile {
    DeviceProfile {
        user_agent: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        device_memory_gb: None,
        logical_cores: std::thread::available_parallelism()
            .ok()
            .map(|n| n.get() as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_fire_and_cancel() {
        let mut s = RepaintScheduler::default();
        let h = s.request();
        assert!(s.is_pending());
        assert_eq!(s.fire(), Some(h));
        assert!(!s.is_pending());

        let h = s.request();
        s.cancel(h);
        assert_eq!(s.fire(), None);
    }

    #[test]
    fn test_released_queue_takes_no_frames() {
        use floorplan::camera::CameraState;
        use floorplan::lighting::LightingRig;
        use floorplan::scene::build_scene;
        use floorplan::{FloorPlanConfig, RenderQuality};

        let quality = RenderQuality::from_low_mode(true);
        let mut scene = build_scene(&quality);
        let lighting = LightingRig::build(&mut scene, &quality);
        let camera = CameraState::new(&FloorPlanConfig::default(), 1.0);
        let view = FrameView {
            scene: &scene,
            lighting: &lighting,
            camera: &camera,
            quality: &quality,
        };

        let queue: SharedPaintQueue = Arc::new(Mutex::new(PaintQueue::default()));
        let mut renderer = SnapshotRenderer::new(Arc::clone(&queue));
        renderer.render(&view);
        assert!(queue.lock().unwrap().frame.is_some());

        renderer.release_context();
        renderer.render(&view);
        let q = queue.lock().unwrap();
        assert!(q.released);
        assert!(q.frame.is_none());
    }

    #[test]
    fn test_surface_listen_unlisten() {
        let mut surface = WindowSurface::default();
        let h = surface.listen(ListenTarget::Canvas, EventKind::Click);
        assert!(surface.is_listening(EventKind::Click));
        surface.unlisten(h);
        assert_eq!(surface.listener_count(), 0);
    }

    #[test]
    fn test_desktop_profile_is_not_mobile() {
        assert!(!native_device_profile().is_mobile());
    }
}

//! One mounted visualization: scene, lights, camera, router and render loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec2;

use crate::bindings::{EventSurface, InputSink, ListenerGuard};
use crate::camera::{reduce, CameraAction, CameraState};
use crate::config::FloorPlanConfig;
use crate::interaction::{InputEvent, InteractionRouter, RouterOutcome};
use crate::lighting::LightingRig;
use crate::quality::RenderQuality;
use crate::render_loop::{FrameScheduler, FrameView, RenderLoop, SceneRenderer};
use crate::scene::{build_scene, SceneGraph};

/// Layout size of the host container in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

pub struct FloorPlanSession<R: SceneRenderer, F: FrameScheduler> {
    quality: RenderQuality,
    graph: SceneGraph,
    lighting: LightingRig,
    camera: CameraState,
    router: InteractionRouter,
    renderer: R,
    render_loop: RenderLoop<F>,
    viewport: Vec2,
    torn_down: bool,
}

impl<R: SceneRenderer, F: FrameScheduler> FloorPlanSession<R, F> {
    /// Build the scene for the chosen tier and start the render loop.
    ///
    /// Returns `None` without touching the renderer when there is no
    /// container or it has no layout height yet.
    pub fn mount(
        container: Option<ContainerSize>,
        low_performance_mode: bool,
        config: FloorPlanConfig,
        mut renderer: R,
        scheduler: F,
    ) -> Option<Self> {
        let Some(size) = container else {
            tracing::debug!("no container, skipping mount");
            return None;
        };
        if size.height == 0 {
            tracing::warn!(width = size.width, "container has no height, skipping mount");
            return None;
        }

        let quality = RenderQuality::from_low_mode(low_performance_mode);
        let mut graph = build_scene(&quality);
        let lighting = LightingRig::build(&mut graph, &quality);
        let camera = CameraState::new(&config, size.width.max(1) as f32 / size.height as f32);
        let router = InteractionRouter::new(&config, &quality);

        renderer.resize(size.width, size.height);
        let mut render_loop = RenderLoop::new(scheduler, &quality);
        render_loop.start();

        tracing::info!(
            tier = ?quality.tier,
            width = size.width,
            height = size.height,
            nodes = graph.len(),
            lights = lighting.point_light_count(),
            "floor plan mounted"
        );

        Some(Self {
            quality,
            graph,
            lighting,
            camera,
            router,
            renderer,
            render_loop,
            viewport: Vec2::new(size.width as f32, size.height as f32),
            torn_down: false,
        })
    }

    pub fn quality(&self) -> &RenderQuality {
        &self.quality
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn render_loop(&self) -> &RenderLoop<F> {
        &self.render_loop
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            scene: &self.graph,
            lighting: &self.lighting,
            camera: &self.camera,
            quality: &self.quality,
        }
    }

    /// A scheduled frame fired. Applies coalesced input whose throttle window
    /// has passed, then draws if the cadence allows. Returns true if drawn.
    pub fn frame(&mut self, now: Duration) -> bool {
        if self.torn_down {
            return false;
        }
        self.router.flush(now, &mut self.camera);
        if !self.render_loop.tick() {
            return false;
        }
        self.render_now();
        true
    }

    /// Sync camera aspect and output size to the container, then redraw
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.torn_down {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.camera = reduce(self.camera, CameraAction::Resize { width, height });
        self.renderer.resize(width, height);
        self.render_now();
    }

    pub fn render_now(&mut self) {
        let view = FrameView {
            scene: &self.graph,
            lighting: &self.lighting,
            camera: &self.camera,
            quality: &self.quality,
        };
        self.renderer.render(&view);
    }

    /// Cancel the frame loop and release every GPU resource. Runs once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.render_loop.stop();
        for (id, _) in self.graph.iter() {
            self.renderer.dispose_node(id);
        }
        self.renderer.release_context();
        tracing::info!(
            frames = self.render_loop.frames_elapsed(),
            rendered = self.render_loop.frames_rendered(),
            "floor plan torn down"
        );
    }
}

impl<R: SceneRenderer, F: FrameScheduler> InputSink for FloorPlanSession<R, F> {
    fn dispatch(&mut self, event: InputEvent) -> RouterOutcome {
        if self.torn_down {
            return RouterOutcome::default();
        }
        if let InputEvent::Resize { width, height } = event {
            self.resize(width, height);
            return RouterOutcome::default();
        }
        self.router.handle(
            &event,
            &mut self.camera,
            &mut self.graph,
            &mut self.lighting,
            self.viewport,
        )
    }
}

impl<R: SceneRenderer, F: FrameScheduler> Drop for FloorPlanSession<R, F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// A session shared with host callbacks plus the listeners feeding it
pub struct MountedFloorPlan<R: SceneRenderer, F: FrameScheduler, S: EventSurface> {
    session: Rc<RefCell<FloorPlanSession<R, F>>>,
    listeners: Option<ListenerGuard<S>>,
}

impl<R: SceneRenderer, F: FrameScheduler, S: EventSurface> MountedFloorPlan<R, F, S> {
    pub fn new(session: FloorPlanSession<R, F>, surface: S) -> Self {
        let listeners = InteractionRouter::bind(surface, session.quality());
        Self {
            session: Rc::new(RefCell::new(session)),
            listeners: Some(listeners),
        }
    }

    pub fn session(&self) -> Rc<RefCell<FloorPlanSession<R, F>>> {
        Rc::clone(&self.session)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.as_ref().map_or(0, ListenerGuard::len)
    }

    /// Detach listeners and tear the session down; safe to call repeatedly
    pub fn unmount(&mut self) {
        drop(self.listeners.take());
        match self.session.try_borrow_mut() {
            Ok(mut session) => session.teardown(),
            // A host callback is mid-dispatch; the session tears itself down
            // when its last reference drops
            Err(_) => tracing::warn!("session busy during unmount, deferring teardown"),
        }
    }
}

impl<R: SceneRenderer, F: FrameScheduler, S: EventSurface> Drop for MountedFloorPlan<R, F, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{ManualScheduler, RecordingRenderer};

    fn mount(low: bool) -> FloorPlanSession<RecordingRenderer, ManualScheduler> {
        FloorPlanSession::mount(
            Some(ContainerSize { width: 800, height: 600 }),
            low,
            FloorPlanConfig::default(),
            RecordingRenderer::default(),
            ManualScheduler::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_container_is_noop() {
        let renderer = RecordingRenderer::default();
        let session = FloorPlanSession::mount(
            None,
            false,
            FloorPlanConfig::default(),
            renderer.clone(),
            ManualScheduler::default(),
        );
        assert!(session.is_none());
        assert!(renderer.log().resizes.is_empty());
    }

    #[test]
    fn test_zero_height_container_is_noop() {
        let session = FloorPlanSession::mount(
            Some(ContainerSize { width: 800, height: 0 }),
            false,
            FloorPlanConfig::default(),
            RecordingRenderer::default(),
            ManualScheduler::default(),
        );
        assert!(session.is_none());
    }

    #[test]
    fn test_resize_renders_immediately() {
        let mut session = mount(true);
        let out = session.dispatch(InputEvent::Resize { width: 1000, height: 500 });
        assert_eq!(out, RouterOutcome::default());
        let log = session.renderer().log();
        assert_eq!(log.resizes.last(), Some(&(1000, 500)));
        assert_eq!(log.renders, 1);
        assert!((session.camera().aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_teardown_disposes_everything_once() {
        let mut session = mount(false);
        let nodes = session.scene().len();
        session.teardown();
        session.teardown();
        let log = session.renderer().log();
        assert_eq!(log.disposed.len(), nodes);
        assert_eq!(log.context_releases, 1);
        drop(log);
        assert!(!session.frame(Duration::ZERO));
    }

    #[test]
    fn test_drop_tears_down() {
        let session = mount(false);
        let renderer = session.renderer().clone();
        drop(session);
        assert_eq!(renderer.log().context_releases, 1);
    }
}

//! Floor plan viewport panel with OpenGL rendering

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use egui::Ui;
use floorplan::bindings::InputSink;
use floorplan::gl_renderer::GlRenderer;
use floorplan::scene::SceneGraph;
use floorplan::{ContainerSize, FloorPlanConfig, FloorPlanSession, MountedFloorPlan};
use floorplan_viewer_lib::host::{PaintQueue, RepaintScheduler, SharedPaintQueue, SnapshotRenderer, WindowSurface};
use floorplan_viewer_lib::input::InputTranslator;

pub type NativeSession = FloorPlanSession<SnapshotRenderer, RepaintScheduler>;

pub struct FloorPlanViewport {
    low_performance_mode: bool,
    config: FloorPlanConfig,
    mounted: Option<MountedFloorPlan<SnapshotRenderer, RepaintScheduler, WindowSurface>>,
    session: Option<Rc<RefCell<NativeSession>>>,
    scheduler: RepaintScheduler,
    surface: WindowSurface,
    translator: InputTranslator,
    queue: SharedPaintQueue,
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// Scene geometry waiting to be uploaded by the next paint callback
    pending_upload: Arc<Mutex<Option<SceneGraph>>>,
    started: Instant,
}

impl FloorPlanViewport {
    pub fn new(low_performance_mode: bool, config: FloorPlanConfig) -> Self {
        Self {
            low_performance_mode,
            config,
            mounted: None,
            session: None,
            scheduler: RepaintScheduler::default(),
            surface: WindowSurface::default(),
            translator: InputTranslator::default(),
            queue: Arc::new(Mutex::new(PaintQueue::default())),
            gl_renderer: None,
            pending_upload: Arc::new(Mutex::new(None)),
            started: Instant::now(),
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("GL renderer unavailable: {e}"),
        }
    }

    pub fn session(&self) -> Option<&Rc<RefCell<NativeSession>>> {
        self.session.as_ref()
    }

    pub fn show(&mut self, ui: &mut Ui) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        if self.mounted.is_none() {
            self.mount(ui, rect);
        }
        let Some(session) = self.session.clone() else {
            return;
        };

        // ── Input ────────────────────────────────────────────
        let now = self.started.elapsed();
        let events = ui.input(|i| i.raw.events.clone());
        let surface = self.surface.clone();
        let mut inputs = self.translator.translate(&events, rect, now, |k| surface.is_listening(k));
        if let Some(resize) = self.translator.resize(ui.ctx().screen_rect(), rect) {
            inputs.push(resize);
        }
        for input in inputs {
            let outcome = session.borrow_mut().dispatch(input);
            if let Some((index, on)) = outcome.toggled {
                tracing::debug!(index, on, "light toggled from viewport");
            }
        }

        // ── Frame ────────────────────────────────────────────
        if self.scheduler.fire().is_some() {
            session.borrow_mut().frame(now);
        }
        if self.scheduler.is_pending() {
            ui.ctx().request_repaint();
        }

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect);
        }
    }

    fn mount(&mut self, ui: &Ui, rect: egui::Rect) {
        let container = (rect.height() >= 1.0).then(|| ContainerSize {
            width: rect.width().round() as u32,
            height: rect.height().round() as u32,
        });
        let Some(session) = FloorPlanSession::mount(
            container,
            self.low_performance_mode,
            self.config.clone(),
            SnapshotRenderer::new(Arc::clone(&self.queue)),
            self.scheduler.clone(),
        ) else {
            return;
        };

        if let Ok(mut upload) = self.pending_upload.lock() {
            *upload = Some(session.scene().clone());
        }
        self.translator.resize(ui.ctx().screen_rect(), rect);

        let mounted = MountedFloorPlan::new(session, self.surface.clone());
        self.session = Some(mounted.session());
        self.mounted = Some(mounted);
    }

    fn paint(&self, ui: &mut Ui, rect: egui::Rect) {
        let Some(gl_renderer) = &self.gl_renderer else {
            ui.painter().rect_filled(rect, 0.0, egui::Color32::from_gray(235));
            return;
        };

        let renderer = Arc::clone(gl_renderer);
        let queue = Arc::clone(&self.queue);
        let upload = Arc::clone(&self.pending_upload);

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();
                let (Ok(mut r), Ok(mut q)) = (renderer.lock(), queue.lock()) else {
                    return;
                };
                if q.released {
                    return;
                }

                if let Some(scene) = upload.lock().ok().and_then(|mut u| u.take()) {
                    if let Err(e) = r.upload_scene(gl, &scene) {
                        tracing::error!("Scene upload failed: {e}");
                    }
                }
                for id in q.disposals.drain(..) {
                    r.dispose_node(gl, id);
                }

                if let Some(frame) = &q.frame {
                    let clip = info.viewport_in_pixels();
                    r.draw(gl, frame, [clip.left_px, clip.from_bottom_px, clip.width_px, clip.height_px]);
                }
            })),
        };
        ui.painter().add(callback);
    }

    /// Unmount the session and free GPU state
    pub fn destroy(&mut self, gl: Option<&glow::Context>) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.unmount();
        }
        self.session = None;

        if let (Some(gl), Some(renderer)) = (gl, self.gl_renderer.take()) {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(gl);
            }
        }
    }
}

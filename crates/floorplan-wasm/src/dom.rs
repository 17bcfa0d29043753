//! DOM host: canvas, WebGL2 renderer, `requestAnimationFrame` loop and
//! event listeners.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use floorplan::bindings::{EventKind, EventSurface, InputSink, ListenTarget};
use floorplan::gl_renderer::{FrameSnapshot, GlRenderer};
use floorplan::interaction::InputEvent;
use floorplan::render_loop::{FrameScheduler, FrameView, SceneRenderer};
use floorplan::scene::{NodeId, SceneGraph};
use floorplan::{
    ContainerSize, DeviceProfile, FloorPlanConfig, FloorPlanSession, MountedFloorPlan, PerformanceTier,
    RenderQuality,
};
use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, WebGl2RenderingContext,
    WheelEvent, Window,
};

type WebSession = FloorPlanSession<WebGlRenderer, RafScheduler>;
/// Filled after mount; callbacks hold it weakly so they never keep a session alive
type SessionSlot = Rc<RefCell<Weak<RefCell<WebSession>>>>;
type RafSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

fn with_session<R>(slot: &SessionSlot, f: impl FnOnce(&mut WebSession) -> R) -> Option<R> {
    let session = slot.borrow().upgrade()?;
    let Ok(mut session) = session.try_borrow_mut() else {
        tracing::trace!("session busy, event dropped");
        return None;
    };
    Some(f(&mut session))
}

fn event_time(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

// ── Tier detection ───────────────────────────────────────────

/// Mobile user agent, < 4 GB device memory or < 4 logical cores
#[wasm_bindgen(js_name = detectLowPerformanceMode)]
pub fn detect_low_performance_mode() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let navigator = window.navigator();
    let device_memory_gb = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|gb| gb as f32);
    let cores = navigator.hardware_concurrency();
    let profile = DeviceProfile {
        user_agent: navigator.user_agent().unwrap_or_default(),
        device_memory_gb,
        logical_cores: (cores > 0.0).then_some(cores as u32),
    };
    PerformanceTier::detect(&profile).is_low()
}

// ── Renderer ─────────────────────────────────────────────────

pub struct WebGlRenderer {
    gl: glow::Context,
    context: WebGl2RenderingContext,
    canvas: HtmlCanvasElement,
    renderer: Option<GlRenderer>,
    size: (u32, u32),
}

impl WebGlRenderer {
    fn new(context: WebGl2RenderingContext, canvas: HtmlCanvasElement) -> Result<Self, String> {
        let gl = glow::Context::from_webgl2_context(context.clone());
        let renderer = GlRenderer::new(&gl)?;
        Ok(Self {
            gl,
            context,
            canvas,
            renderer: Some(renderer),
            size: (0, 0),
        })
    }

    fn upload(&mut self, scene: &SceneGraph) -> Result<(), String> {
        match &mut self.renderer {
            Some(r) => r.upload_scene(&self.gl, scene),
            None => Err("GL context already released".to_string()),
        }
    }

    fn lose_context(&self) {
        let Ok(Some(ext)) = self.context.get_extension("WEBGL_lose_context") else {
            return;
        };
        let lose = js_sys::Reflect::get(&ext, &JsValue::from_str("loseContext"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        if let Some(lose) = lose {
            let _ = lose.call0(&ext);
        }
    }
}

impl SceneRenderer for WebGlRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn render(&mut self, view: &FrameView<'_>) {
        let Some(renderer) = &self.renderer else {
            return;
        };
        let frame = FrameSnapshot::capture(view);
        let (w, h) = self.size;
        renderer.draw(&self.gl, &frame, [0, 0, w as i32, h as i32]);
    }

    fn dispose_node(&mut self, id: NodeId) {
        if let Some(renderer) = &mut self.renderer {
            renderer.dispose_node(&self.gl, id);
        }
    }

    fn release_context(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy(&self.gl);
        }
        self.lose_context();
    }
}

// ── Frame scheduling ─────────────────────────────────────────

pub struct RafScheduler {
    window: Window,
    callback: RafSlot,
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request(&mut self) -> i32 {
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            return 0;
        };
        match self.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("requestAnimationFrame failed: {e:?}");
                0
            }
        }
    }

    fn cancel(&mut self, handle: i32) {
        if handle != 0 {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}

// ── Event listeners ──────────────────────────────────────────

pub struct DomListener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

pub struct DomSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    container: HtmlElement,
    session: SessionSlot,
}

/// DOM event → input event, positions relative to the canvas
fn translate(kind: EventKind, event: &web_sys::Event, container: &HtmlElement) -> Option<InputEvent> {
    let at = event_time(event.time_stamp());
    let offset = || {
        event
            .dyn_ref::<MouseEvent>()
            .map(|m| Vec2::new(m.offset_x() as f32, m.offset_y() as f32))
    };
    Some(match kind {
        EventKind::PointerDown => InputEvent::PointerDown { position: offset()?, at },
        EventKind::PointerMove => InputEvent::PointerMove { position: offset()?, at },
        EventKind::PointerUp => InputEvent::PointerUp { at },
        EventKind::Click => InputEvent::Click { position: offset()?, at },
        EventKind::Wheel => InputEvent::Wheel {
            delta_y: event.dyn_ref::<WheelEvent>()?.delta_y() as f32,
            at,
        },
        EventKind::Resize => InputEvent::Resize {
            width: container.client_width().max(0) as u32,
            height: container.client_height().max(0) as u32,
        },
    })
}

impl EventSurface for DomSurface {
    type Handle = DomListener;

    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> DomListener {
        let target: EventTarget = match target {
            ListenTarget::Canvas => self.canvas.clone().into(),
            ListenTarget::Window => self.window.clone().into(),
        };
        let session = Rc::clone(&self.session);
        let container = self.container.clone();

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(input) = translate(kind, &event, &container) else {
                return;
            };
            if let Some(outcome) = with_session(&session, |s| s.dispatch(input)) {
                if outcome.prevent_default {
                    event.prevent_default();
                }
            }
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(kind.passive());
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind.dom_name(),
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            tracing::error!("Failed to add {} listener: {e:?}", kind.dom_name());
        }

        DomListener {
            target,
            name: kind.dom_name(),
            closure,
        }
    }

    fn unlisten(&mut self, listener: DomListener) {
        let _ = listener
            .target
            .remove_event_listener_with_callback(listener.name, listener.closure.as_ref().unchecked_ref());
    }
}

// ── Mount ────────────────────────────────────────────────────

/// A mounted floor plan; call `unmount()` before discarding the container
#[wasm_bindgen]
pub struct FloorPlanHandle {
    mounted: Option<MountedFloorPlan<WebGlRenderer, RafScheduler, DomSurface>>,
    canvas: HtmlCanvasElement,
    raf: RafSlot,
}

#[wasm_bindgen]
impl FloorPlanHandle {
    /// Cancel the frame loop, remove listeners, release GPU resources and
    /// detach the canvas. Safe to call more than once.
    pub fn unmount(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.unmount();
            tracing::info!("floor plan unmounted");
        }
        self.raf.borrow_mut().take();
        self.canvas.remove();
    }

    #[wasm_bindgen(getter, js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }
}

impl Drop for FloorPlanHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn create_canvas(document: &Document, container: &HtmlElement) -> Result<HtmlCanvasElement, String> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| "created element is not a canvas".to_string())?;
    let style = canvas.style();
    for (prop, value) in [("display", "block"), ("width", "100%"), ("height", "100%"), ("touch-action", "none")] {
        style.set_property(prop, value).map_err(|e| format!("{e:?}"))?;
    }
    container.append_child(&canvas).map_err(|e| format!("{e:?}"))?;
    Ok(canvas)
}

fn webgl2_context(canvas: &HtmlCanvasElement, quality: &RenderQuality) -> Result<WebGl2RenderingContext, String> {
    let options = js_sys::Object::new();
    let power = if quality.tier.is_low() { "low-power" } else { "high-performance" };
    for (key, value) in [
        ("antialias", JsValue::from_bool(quality.antialias)),
        ("powerPreference", JsValue::from_str(power)),
    ] {
        js_sys::Reflect::set(&options, &JsValue::from_str(key), &value).map_err(|e| format!("{e:?}"))?;
    }
    canvas
        .get_context_with_context_options("webgl2", &options)
        .map_err(|e| format!("{e:?}"))?
        .ok_or_else(|| "WebGL2 is not available".to_string())?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| "context is not WebGL2".to_string())
}

fn mount_into(
    window: Window,
    container: &HtmlElement,
    canvas: &HtmlCanvasElement,
    low_performance_mode: bool,
    config: FloorPlanConfig,
) -> Result<Option<FloorPlanHandle>, String> {
    let quality = RenderQuality::from_low_mode(low_performance_mode);
    let context = webgl2_context(canvas, &quality)?;
    let renderer = WebGlRenderer::new(context, canvas.clone())?;

    let slot: SessionSlot = Rc::new(RefCell::new(Weak::new()));
    let raf: RafSlot = Rc::new(RefCell::new(None));
    let frame_slot = Rc::clone(&slot);
    *raf.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        with_session(&frame_slot, |s| s.frame(event_time(timestamp)));
    }));
    let scheduler = RafScheduler {
        window: window.clone(),
        callback: Rc::clone(&raf),
    };

    let size = ContainerSize {
        width: container.client_width().max(0) as u32,
        height: container.client_height().max(0) as u32,
    };
    let Some(mut session) = FloorPlanSession::mount(Some(size), low_performance_mode, config, renderer, scheduler) else {
        return Ok(None);
    };
    // A failed upload drops the session, which tears it down
    let scene = session.scene().clone();
    session.renderer_mut().upload(&scene)?;

    let surface = DomSurface {
        window,
        canvas: canvas.clone(),
        container: container.clone(),
        session: Rc::clone(&slot),
    };
    let mounted = MountedFloorPlan::new(session, surface);
    *slot.borrow_mut() = Rc::downgrade(&mounted.session());

    Ok(Some(FloorPlanHandle {
        mounted: Some(mounted),
        canvas: canvas.clone(),
        raf,
    }))
}

/// Mount the floor plan into `container`. Returns `undefined` when the
/// container has no layout height yet.
#[wasm_bindgen(js_name = mountFloorPlan)]
pub fn mount_floor_plan(
    container: &HtmlElement,
    low_performance_mode: Option<bool>,
    config_json: Option<String>,
) -> Result<Option<FloorPlanHandle>, JsError> {
    let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
    let document = window.document().ok_or_else(|| JsError::new("no document"))?;
    let config = match config_json {
        Some(json) => FloorPlanConfig::from_json(&json).map_err(|e| JsError::new(&e))?,
        None => FloorPlanConfig::default(),
    };
    let low = low_performance_mode.unwrap_or_else(detect_low_performance_mode);

    let canvas = create_canvas(&document, container).map_err(|e| JsError::new(&e))?;
    match mount_into(window, container, &canvas, low, config) {
        Ok(Some(handle)) => Ok(Some(handle)),
        Ok(None) => {
            canvas.remove();
            Ok(None)
        }
        Err(e) => {
            canvas.remove();
            tracing::error!("Floor plan mount failed: {e}");
            Err(JsError::new(&e))
        }
    }
}

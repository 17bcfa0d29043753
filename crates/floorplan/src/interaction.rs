//! Pointer, wheel and click handling.
//!
//! The router turns raw input into camera reducer actions and light toggles.
//! Orbit and zoom are throttled by coalescing: every event is reduced, in
//! order, into a staged camera state, and the staged state is published to
//! the live camera on the next allowed update, on a frame flush, or on
//! pointer-up. Clamping happens per event, so the published state is exactly
//! what processing each event in sequence would give.

use std::time::Duration;

use glam::Vec2;

use crate::bindings::{EventKind, EventSurface, ListenerGuard};
use crate::camera::{reduce, CameraAction, CameraState};
use crate::config::FloorPlanConfig;
use crate::lighting::LightingRig;
use crate::picking::pick_fixture;
use crate::quality::RenderQuality;
use crate::scene::SceneGraph;

/// Input delivered by a host. Positions are in pixels relative to the
/// canvas' top-left corner; `at` is the event timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Vec2, at: Duration },
    PointerMove { position: Vec2, at: Duration },
    /// Released anywhere, not only over the canvas
    PointerUp { at: Duration },
    /// Positive `delta_y` is a wheel-down tick
    Wheel { delta_y: f32, at: Duration },
    Click { position: Vec2, at: Duration },
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::PointerDown { .. } => EventKind::PointerDown,
            InputEvent::PointerMove { .. } => EventKind::PointerMove,
            InputEvent::PointerUp { .. } => EventKind::PointerUp,
            InputEvent::Wheel { .. } => EventKind::Wheel,
            InputEvent::Click { .. } => EventKind::Click,
            InputEvent::Resize { .. } => EventKind::Resize,
        }
    }
}

/// What handling one event changed
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouterOutcome {
    pub camera_moved: bool,
    /// `(light index, new on/off state)`
    pub toggled: Option<(usize, bool)>,
    /// Host should cancel the browser default (page scroll on wheel)
    pub prevent_default: bool,
}

/// Lets at most one update through per interval
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// True (and records `now`) when the window since the last update has passed
    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        last: Vec2,
        /// Total cursor travel since pointer-down (px)
        travel: f32,
    },
}

pub struct InteractionRouter {
    config: FloorPlanConfig,
    clicks_enabled: bool,
    drag: DragState,
    /// Set when a drag ends so the click that follows it is ignored
    suppress_click: bool,
    /// Camera with every processed orbit/zoom applied, not yet published
    staged: Option<CameraState>,
    orbit_dirty: bool,
    zoom_dirty: bool,
    orbit_throttle: Throttle,
    zoom_throttle: Throttle,
}

impl InteractionRouter {
    pub fn new(config: &FloorPlanConfig, quality: &RenderQuality) -> Self {
        Self {
            config: config.clone(),
            clicks_enabled: quality.point_lights,
            drag: DragState::Idle,
            suppress_click: false,
            staged: None,
            orbit_dirty: false,
            zoom_dirty: false,
            orbit_throttle: Throttle::new(Duration::from_millis(config.orbit_throttle_ms)),
            zoom_throttle: Throttle::new(Duration::from_millis(config.zoom_throttle_ms)),
        }
    }

    /// Event kinds a host must listen to for this quality profile
    pub fn event_kinds(quality: &RenderQuality) -> Vec<EventKind> {
        let mut kinds = vec![
            EventKind::PointerDown,
            EventKind::PointerMove,
            EventKind::PointerUp,
            EventKind::Wheel,
            EventKind::Resize,
        ];
        if quality.point_lights {
            kinds.push(EventKind::Click);
        }
        kinds
    }

    /// Attach every listener the router needs; dropping the guard detaches them
    pub fn bind<S: EventSurface>(surface: S, quality: &RenderQuality) -> ListenerGuard<S> {
        ListenerGuard::attach(surface, &Self::event_kinds(quality))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn handle(
        &mut self,
        event: &InputEvent,
        camera: &mut CameraState,
        graph: &mut SceneGraph,
        lighting: &mut LightingRig,
        viewport: Vec2,
    ) -> RouterOutcome {
        let mut outcome = RouterOutcome::default();

        match *event {
            InputEvent::PointerDown { position, .. } => {
                self.drag = DragState::Dragging {
                    last: position,
                    travel: 0.0,
                };
                self.suppress_click = false;
            }
            InputEvent::PointerMove { position, at } => {
                if let DragState::Dragging { last, travel } = &mut self.drag {
                    let delta = position - *last;
                    *travel += delta.length();
                    *last = position;
                    if delta != Vec2::ZERO {
                        let rotate_speed = self.config.rotate_speed;
                        self.stage(camera, CameraAction::Orbit { delta, rotate_speed });
                        self.orbit_dirty = true;
                    }
                    if self.orbit_dirty && self.orbit_throttle.ready(at) {
                        outcome.camera_moved = self.publish(camera);
                    }
                }
            }
            InputEvent::PointerUp { .. } => {
                if let DragState::Dragging { travel, .. } = self.drag {
                    outcome.camera_moved = self.publish(camera);
                    self.suppress_click = travel > self.config.drag_click_tolerance;
                }
                self.drag = DragState::Idle;
            }
            InputEvent::Wheel { delta_y, at } => {
                outcome.prevent_default = true;
                if delta_y != 0.0 {
                    let ticks = if delta_y > 0.0 { 1 } else { -1 };
                    let step = self.config.zoom_step;
                    self.stage(camera, CameraAction::Zoom { ticks, step });
                    self.zoom_dirty = true;
                    if self.zoom_throttle.ready(at) {
                        outcome.camera_moved = self.publish(camera);
                    }
                }
            }
            InputEvent::Click { position, .. } => {
                if !self.clicks_enabled {
                    return outcome;
                }
                if self.suppress_click {
                    self.suppress_click = false;
                    return outcome;
                }
                let Some(ndc) = to_ndc(position, viewport) else {
                    return outcome;
                };
                let ray = camera.ray_through(ndc);
                if let Some(index) = pick_fixture(&ray, graph, lighting) {
                    outcome.toggled = lighting.toggle(index, graph).map(|on| (index, on));
                }
            }
            InputEvent::Resize { .. } => {}
        }

        outcome
    }

    /// Publish staged input once a throttle window for it has passed.
    /// Returns true when the camera moved.
    pub fn flush(&mut self, now: Duration, camera: &mut CameraState) -> bool {
        let due = (self.orbit_dirty && self.orbit_throttle.ready(now))
            || (self.zoom_dirty && self.zoom_throttle.ready(now));
        due && self.publish(camera)
    }

    fn stage(&mut self, camera: &CameraState, action: CameraAction) {
        let base = self.staged.unwrap_or(*camera);
        self.staged = Some(reduce(base, action));
    }

    /// Copy the staged orbit and zoom onto the live camera. Aspect stays the
    /// live one since resizes bypass staging.
    fn publish(&mut self, camera: &mut CameraState) -> bool {
        self.orbit_dirty = false;
        self.zoom_dirty = false;
        let Some(staged) = self.staged.take() else {
            return false;
        };
        camera.position = staged.position;
        camera.zoom = staged.zoom;
        true
    }
}

/// Canvas pixel position → normalized device coordinates (y up)
pub fn to_ndc(position: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        position.x / viewport.x * 2.0 - 1.0,
        1.0 - position.y / viewport.y * 2.0,
    ))
}

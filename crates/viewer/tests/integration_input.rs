//! Integration tests for native input translation feeding a real session.

use std::time::Duration;

use egui::{Event, Modifiers, MouseWheelUnit, PointerButton, Pos2, Rect, Vec2};
use floorplan::bindings::EventKind;
use floorplan::interaction::InputEvent;
use floorplan::render_loop::FrameScheduler;
use floorplan::{ContainerSize, FloorPlanConfig, FloorPlanSession, MountedFloorPlan};
use floorplan_viewer_lib::host::{PaintQueue, RepaintScheduler, SnapshotRenderer, WindowSurface};
use floorplan_viewer_lib::input::InputTranslator;

fn rect() -> Rect {
    Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(800.0, 600.0))
}

fn press(x: f32, y: f32, pressed: bool) -> Event {
    Event::PointerButton {
        pos: Pos2::new(x, y),
        button: PointerButton::Primary,
        pressed,
        modifiers: Modifiers::default(),
    }
}

fn wheel(dy: f32) -> Event {
    Event::MouseWheel {
        unit: MouseWheelUnit::Line,
        delta: Vec2::new(0.0, dy),
        modifiers: Modifiers::default(),
    }
}

fn all(_: EventKind) -> bool {
    true
}

#[test]
fn test_press_is_local_to_viewport() {
    let mut t = InputTranslator::default();
    let out = t.translate(&[press(150.0, 80.0, true)], rect(), Duration::ZERO, all);
    assert_eq!(
        out,
        vec![InputEvent::PointerDown {
            position: glam::Vec2::new(50.0, 30.0),
            at: Duration::ZERO,
        }]
    );
}

#[test]
fn test_release_outside_still_ends_drag() {
    let mut t = InputTranslator::default();
    t.translate(&[press(150.0, 80.0, true)], rect(), Duration::ZERO, all);
    let out = t.translate(&[press(5.0, 5.0, false)], rect(), Duration::from_millis(10), all);
    assert_eq!(out, vec![InputEvent::PointerUp { at: Duration::from_millis(10) }]);
}

#[test]
fn test_release_inside_adds_click_unless_filtered() {
    let mut t = InputTranslator::default();
    t.translate(&[press(150.0, 80.0, true)], rect(), Duration::ZERO, all);
    let out = t.translate(&[press(150.0, 80.0, false)], rect(), Duration::ZERO, all);
    assert_eq!(out.len(), 2);
    assert_eq!(out[1].kind(), EventKind::Click);

    t.translate(&[press(150.0, 80.0, true)], rect(), Duration::ZERO, all);
    let out = t.translate(&[press(150.0, 80.0, false)], rect(), Duration::ZERO, |k| {
        k != EventKind::Click
    });
    assert_eq!(out.len(), 1);
}

#[test]
fn test_wheel_only_over_viewport_and_inverted() {
    let mut t = InputTranslator::default();
    let out = t.translate(&[wheel(-1.0)], rect(), Duration::ZERO, all);
    assert!(out.is_empty());

    let out = t.translate(
        &[Event::PointerMoved(Pos2::new(300.0, 300.0)), wheel(-1.0)],
        rect(),
        Duration::ZERO,
        all,
    );
    assert_eq!(out.last(), Some(&InputEvent::Wheel { delta_y: 1.0, at: Duration::ZERO }));
}

#[test]
fn test_resize_follows_window_not_layout() {
    let mut t = InputTranslator::default();
    let window = Rect::from_min_size(Pos2::ZERO, Vec2::new(1200.0, 800.0));
    assert_eq!(t.resize(window, rect()), None);
    assert_eq!(t.resize(window, rect()), None);

    // Side panel dragged: viewport shrinks, window unchanged
    let narrower = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(700.0, 600.0));
    assert_eq!(t.resize(window, narrower), None);

    // Window resized: container size is re-read
    let bigger_window = Rect::from_min_size(Pos2::ZERO, Vec2::new(1400.0, 900.0));
    let bigger = Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 500.0));
    assert_eq!(
        t.resize(bigger_window, bigger),
        Some(InputEvent::Resize { width: 1000, height: 500 })
    );
}

#[test]
fn test_native_session_unmount_clears_everything() {
    let queue = std::sync::Arc::new(std::sync::Mutex::new(PaintQueue::default()));
    let scheduler = RepaintScheduler::default();
    let surface = WindowSurface::default();
    let session = FloorPlanSession::mount(
        Some(ContainerSize { width: 800, height: 600 }),
        false,
        FloorPlanConfig::default(),
        SnapshotRenderer::new(queue.clone()),
        scheduler.clone(),
    )
    .unwrap();
    let mut mounted = MountedFloorPlan::new(session, surface.clone());
    assert!(surface.is_listening(EventKind::Click));

    let shared = mounted.session();
    assert!(scheduler.fire().is_some());
    assert!(shared.borrow_mut().frame(Duration::from_millis(16)));
    assert!(queue.lock().unwrap().frame.is_some());

    mounted.unmount();
    assert_eq!(surface.listener_count(), 0);
    assert!(!scheduler.is_pending());
    let q = queue.lock().unwrap();
    assert!(q.released);
    assert!(q.frame.is_none());
    assert_eq!(q.disposals.len(), shared.borrow().scene().len());
}

#[test]
fn test_scheduler_handles_are_unique() {
    let mut s = RepaintScheduler::default();
    assert_ne!(s.request(), s.request());
}

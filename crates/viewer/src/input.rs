//! egui raw events → floor plan input events.
//!
//! Mirrors DOM semantics: presses, moves, wheel and clicks count only over the
//! viewport rect, while a release anywhere in the window ends a drag.

use std::time::Duration;

use egui::{Event, PointerButton, Pos2, Rect};
use floorplan::bindings::EventKind;
use floorplan::interaction::InputEvent;
use glam::Vec2;

#[derive(Debug, Default)]
pub struct InputTranslator {
    /// Primary button went down inside the viewport
    pressed_inside: bool,
    hover: Option<Pos2>,
    last_window: Option<(u32, u32)>,
}

impl InputTranslator {
    /// Translate one frame's worth of raw events. `listening` filters out
    /// kinds the session has no listener for.
    pub fn translate(
        &mut self,
        events: &[Event],
        rect: Rect,
        now: Duration,
        listening: impl Fn(EventKind) -> bool,
    ) -> Vec<InputEvent> {
        let local = |p: Pos2| Vec2::new(p.x - rect.min.x, p.y - rect.min.y);
        let mut out = Vec::new();

        for event in events {
            match event {
                Event::PointerMoved(pos) => {
                    self.hover = Some(*pos);
                    if rect.contains(*pos) {
                        out.push(InputEvent::PointerMove {
                            position: local(*pos),
                            at: now,
                        });
                    }
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    let inside = rect.contains(*pos);
                    if *pressed {
                        self.pressed_inside = inside;
                        if inside {
                            out.push(InputEvent::PointerDown {
                                position: local(*pos),
                                at: now,
                            });
                        }
                    } else {
                        out.push(InputEvent::PointerUp { at: now });
                        if inside && self.pressed_inside {
                            out.push(InputEvent::Click {
                                position: local(*pos),
                                at: now,
                            });
                        }
                        self.pressed_inside = false;
                    }
                }
                Event::MouseWheel { delta, .. } => {
                    let over = self.hover.is_some_and(|p| rect.contains(p));
                    if over && delta.y != 0.0 {
                        // egui: positive y scrolls content down, i.e. wheel up
                        out.push(InputEvent::Wheel {
                            delta_y: -delta.y,
                            at: now,
                        });
                    }
                }
                Event::PointerGone => self.hover = None,
                _ => {}
            }
        }

        out.retain(|e| listening(e.kind()));
        out
    }

    /// A `Resize` event when the window (`screen`) changed size since the
    /// last call, carrying the viewport's current size. Layout changes inside
    /// an unchanged window, such as dragging a side panel, are not resizes.
    /// The first call only records the size.
    pub fn resize(&mut self, screen: Rect, viewport: Rect) -> Option<InputEvent> {
        let window = rounded(screen);
        match self.last_window.replace(window) {
            Some(previous) if previous != window => {
                let (width, height) = rounded(viewport);
                Some(InputEvent::Resize { width, height })
            }
            _ => None,
        }
    }
}

fn rounded(rect: Rect) -> (u32, u32) {
    (rect.width().round().max(0.0) as u32, rect.height().round().max(0.0) as u32)
}

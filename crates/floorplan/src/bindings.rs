//! Host event wiring.
//!
//! A host (browser DOM, native window) implements [`EventSurface`]; the router
//! asks it for listeners through [`ListenerGuard`], which removes every one of
//! them when dropped or detached.

use crate::interaction::{InputEvent, RouterOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    Click,
    Resize,
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    /// The rendering surface itself
    Canvas,
    /// The whole window, so a release outside the canvas still ends a drag
    Window,
}

impl EventKind {
    pub fn target(&self) -> ListenTarget {
        match self {
            EventKind::PointerUp | EventKind::Resize => ListenTarget::Window,
            _ => ListenTarget::Canvas,
        }
    }

    /// DOM event name
    pub fn dom_name(&self) -> &'static str {
        match self {
            EventKind::PointerDown => "pointerdown",
            EventKind::PointerMove => "pointermove",
            EventKind::PointerUp => "pointerup",
            EventKind::Wheel => "wheel",
            EventKind::Click => "click",
            EventKind::Resize => "resize",
        }
    }

    /// Wheel listeners must be able to cancel page scrolling
    pub fn passive(&self) -> bool {
        !matches!(self, EventKind::Wheel)
    }
}

/// Something listeners can be attached to and removed from
pub trait EventSurface {
    type Handle;

    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> Self::Handle;
    fn unlisten(&mut self, handle: Self::Handle);
}

/// Receives translated input from a host
pub trait InputSink {
    fn dispatch(&mut self, event: InputEvent) -> RouterOutcome;
}

/// Owns every listener registered for one mount
pub struct ListenerGuard<S: EventSurface> {
    surface: S,
    handles: Vec<S::Handle>,
}

impl<S: EventSurface> ListenerGuard<S> {
    pub fn attach(mut surface: S, kinds: &[EventKind]) -> Self {
        let handles = kinds.iter().map(|&kind| surface.listen(kind.target(), kind)).collect();
        Self { surface, handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Remove all listeners; calling it again does nothing
    pub fn detach(&mut self) {
        let handles = std::mem::take(&mut self.handles);
        if !handles.is_empty() {
            tracing::debug!(count = handles.len(), "detaching listeners");
        }
        for handle in handles {
            self.surface.unlisten(handle);
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: EventSurface> Drop for ListenerGuard<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::FakeSurface;

    #[test]
    fn test_targets() {
        assert_eq!(EventKind::PointerUp.target(), ListenTarget::Window);
        assert_eq!(EventKind::Resize.target(), ListenTarget::Window);
        assert_eq!(EventKind::Wheel.target(), ListenTarget::Canvas);
        assert!(!EventKind::Wheel.passive());
        assert!(EventKind::PointerMove.passive());
    }

    #[test]
    fn test_guard_removes_on_drop() {
        let surface = FakeSurface::default();
        {
            let guard = ListenerGuard::attach(surface.clone(), &[EventKind::PointerDown, EventKind::Resize]);
            assert_eq!(guard.len(), 2);
            assert_eq!(surface.active().len(), 2);
            assert!(surface.is_listening(ListenTarget::Window, EventKind::Resize));
        }
        assert!(surface.active().is_empty());
    }

    #[test]
    fn test_detach_twice_is_noop() {
        let surface = FakeSurface::default();
        let mut guard = ListenerGuard::attach(surface.clone(), &[EventKind::Wheel]);
        guard.detach();
        guard.detach();
        assert!(guard.is_empty());
        assert_eq!(surface.removed_count(), 1);
    }
}

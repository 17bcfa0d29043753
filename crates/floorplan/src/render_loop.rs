//! Recurring frame callback with tier-dependent cadence.

use crate::camera::CameraState;
use crate::lighting::LightingRig;
use crate::quality::RenderQuality;
use crate::scene::{NodeId, SceneGraph};

/// Requests and cancels per-frame callbacks (e.g. `requestAnimationFrame`)
pub trait FrameScheduler {
    type Handle;

    fn request(&mut self) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Everything a renderer reads to draw one frame
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    pub scene: &'a SceneGraph,
    pub lighting: &'a LightingRig,
    pub camera: &'a CameraState,
    pub quality: &'a RenderQuality,
}

/// Backend that turns a [`FrameView`] into pixels and owns GPU resources
pub trait SceneRenderer {
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, view: &FrameView<'_>);
    /// Free the geometry and material of one node
    fn dispose_node(&mut self, id: NodeId);
    /// Drop the rendering context itself; called last during teardown
    fn release_context(&mut self);
}

pub struct RenderLoop<F: FrameScheduler> {
    scheduler: F,
    pending: Option<F::Handle>,
    frame_interval: u32,
    /// Scheduled frames delivered so far
    frames: u64,
    rendered: u64,
    running: bool,
}

impl<F: FrameScheduler> RenderLoop<F> {
    pub fn new(scheduler: F, quality: &RenderQuality) -> Self {
        Self {
            scheduler,
            pending: None,
            frame_interval: quality.frame_interval.max(1),
            frames: 0,
            rendered: 0,
            running: false,
        }
    }

    /// Schedule the first frame
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.pending = Some(self.scheduler.request());
    }

    /// Called when a scheduled frame fires. Always schedules the next one and
    /// returns whether this frame should be drawn.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.frames += 1;
        self.pending = Some(self.scheduler.request());

        let draw = (self.frames - 1) % self.frame_interval as u64 == 0;
        if draw {
            self.rendered += 1;
        }
        draw
    }

    /// Cancel the pending frame; further ticks are ignored
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.frames
    }

    pub fn frames_rendered(&self) -> u64 {
        self.rendered
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::ManualScheduler;

    fn draws(low: bool, frames: usize) -> Vec<bool> {
        let quality = RenderQuality::from_low_mode(low);
        let mut lp = RenderLoop::new(ManualScheduler::default(), &quality);
        lp.start();
        (0..frames).map(|_| lp.tick()).collect()
    }

    #[test]
    fn test_high_tier_draws_every_frame() {
        assert!(draws(false, 6).into_iter().all(|d| d));
    }

    #[test]
    fn test_low_tier_draws_odd_frames() {
        assert_eq!(draws(true, 6), vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_every_tick_schedules_next_frame() {
        let quality = RenderQuality::from_low_mode(true);
        let scheduler = ManualScheduler::default();
        let mut lp = RenderLoop::new(scheduler.clone(), &quality);
        lp.start();
        for _ in 0..4 {
            lp.tick();
        }
        assert_eq!(scheduler.requested(), 5);
        assert!(scheduler.pending().is_some());
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let quality = RenderQuality::from_low_mode(false);
        let scheduler = ManualScheduler::default();
        let mut lp = RenderLoop::new(scheduler.clone(), &quality);
        lp.start();
        lp.tick();
        lp.stop();
        assert!(scheduler.pending().is_none());
        assert_eq!(scheduler.cancelled(), 1);
        assert!(!lp.tick());
        assert_eq!(lp.frames_elapsed(), 1);
        // Second stop has nothing left to cancel
        lp.stop();
        assert_eq!(scheduler.cancelled(), 1);
    }
}

//! Pointer position and per-frame velocity.
//!
//! Host input events only record a position. Velocity is derived once per
//! frame by [`PointerTracker::sample_frame`], so it measures displacement per
//! frame no matter how many events arrived in between.

use glam::DVec2;

/// Pointer state as seen by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: DVec2,
    /// Displacement since the previous frame (px/frame).
    pub velocity: DVec2,
    /// Length of `velocity`.
    pub speed: f64,
}

/// Tracks the latest pointer position and the position at the last frame start.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    current: DVec2,
    previous: DVec2,
    velocity: DVec2,
    entered: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer position in surface coordinates.
    ///
    /// The first event snaps both current and previous position to the event
    /// so the first frame does not see a jump from the origin. Non-finite
    /// coordinates are ignored.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = DVec2::new(x, y);
        if !p.is_finite() {
            return;
        }
        if !self.entered {
            self.previous = p;
            self.entered = true;
        }
        self.current = p;
    }

    /// Whether any pointer event has been received.
    pub fn has_entered(&self) -> bool {
        self.entered
    }

    /// Latest recorded position, if any.
    pub fn position(&self) -> Option<DVec2> {
        self.entered.then_some(self.current)
    }

    /// Velocity measured by the most recent [`sample_frame`](Self::sample_frame).
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Derives this frame's velocity and advances the frame-start position.
    ///
    /// Returns `None` until the first pointer event.
    pub fn sample_frame(&mut self) -> Option<PointerSample> {
        if !self.entered {
            return None;
        }
        self.velocity = self.current - self.previous;
        self.previous = self.current;
        Some(PointerSample {
            position: self.current,
            velocity: self.velocity,
            speed: self.velocity.length(),
        })
    }
}

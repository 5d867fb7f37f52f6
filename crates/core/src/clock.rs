//! Converts host frame timestamps into a clamped per-frame `dt`.

/// Tracks the previous frame timestamp.
///
/// The first frame has no predecessor and yields `dt = 0`. Deltas are clamped
/// to `max_dt` so a stalled tab does not fling particles across the surface
/// when it resumes.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    max_dt: f64,
}

impl FrameClock {
    pub fn new(max_dt: f64) -> Self {
        Self {
            last: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Records `now` (seconds) and returns the clamped elapsed time.
    ///
    /// Negative or non-finite deltas (clock jumps, bogus timestamps) yield 0.
    pub fn advance(&mut self, now: f64) -> f64 {
        let dt = match self.last {
            Some(prev) => now - prev,
            None => 0.0,
        };
        if now.is_finite() {
            self.last = Some(now);
        }
        if dt.is_finite() && dt > 0.0 {
            dt.min(self.max_dt)
        } else {
            0.0
        }
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }

    pub fn set_max_dt(&mut self, max_dt: f64) {
        self.max_dt = max_dt.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_dt() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.advance(12.5), 0.0);
    }

    #[test]
    fn regular_frames_report_elapsed_time() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(1.0);
        let dt = clock.advance(1.0 + 1.0 / 60.0);
        assert!((dt - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn stall_is_clamped_to_max_dt() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(0.0);
        assert_eq!(clock.advance(5.0), 0.1);
    }

    #[test]
    fn backwards_time_yields_zero() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(2.0);
        assert_eq!(clock.advance(1.0), 0.0);
        let dt = clock.advance(1.05);
        assert!((dt - 0.05).abs() < 1e-12);
    }

    #[test]
    fn non_finite_timestamp_is_ignored() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(1.0);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        let dt = clock.advance(1.02);
        assert!((dt - 0.02).abs() < 1e-12);
    }

    #[test]
    fn negative_max_dt_is_treated_as_zero() {
        let mut clock = FrameClock::new(-1.0);
        clock.advance(0.0);
        assert_eq!(clock.advance(1.0), 0.0);
        assert_eq!(clock.max_dt(), 0.0);
    }
}

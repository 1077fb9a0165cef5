//! Frame clock
//!
//! Turns host animation-frame timestamps into simulation deltas. Frames that
//! arrive faster than the fps cap are dropped, and while the page is hidden
//! time stops accruing so nothing jumps on resume.

/// Outcome of offering a host timestamp to the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStep {
    /// Too soon after the last accepted frame; skip update and render
    Dropped,
    /// Host is hidden; timestamp resynced, skip update and render
    Suspended,
    /// Run one update with this many elapsed milliseconds
    Advance(f32),
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp of the last accepted (or resynced) frame
    last_ms: f64,
    /// Minimum interval between accepted frames
    min_frame_ms: f64,
    suspended: bool,
    /// Instantaneous rate of the last accepted frame
    fps: f32,
}

impl FrameClock {
    pub fn new(max_fps: f64, now_ms: f64) -> Self {
        Self {
            last_ms: now_ms,
            min_frame_ms: 1000.0 / max_fps.max(1.0),
            suspended: false,
            fps: 0.0,
        }
    }

    pub fn min_frame_ms(&self) -> f64 {
        self.min_frame_ms
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Change the fps cap (e.g. after a settings change)
    pub fn set_max_fps(&mut self, max_fps: f64) {
        self.min_frame_ms = 1000.0 / max_fps.max(1.0);
    }

    /// Host visibility changed. Resuming resyncs the timestamp so the
    /// hidden interval never reaches the simulation.
    pub fn set_suspended(&mut self, suspended: bool, now_ms: f64) {
        if self.suspended != suspended {
            log::info!("Clock {}", if suspended { "suspended" } else { "resumed" });
        }
        self.suspended = suspended;
        if !suspended {
            self.last_ms = now_ms;
        }
    }

    /// Offer a host frame timestamp
    pub fn advance(&mut self, now_ms: f64) -> FrameStep {
        if self.suspended {
            self.last_ms = now_ms;
            return FrameStep::Suspended;
        }

        let delta = now_ms - self.last_ms;
        if delta < self.min_frame_ms {
            return FrameStep::Dropped;
        }

        self.fps = (1000.0 / delta) as f32;
        self.last_ms = now_ms;
        FrameStep::Advance(delta as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_frames_above_cap() {
        let mut clock = FrameClock::new(60.0, 0.0);
        assert_eq!(clock.advance(10.0), FrameStep::Dropped);
        // Dropped frame doesn't move the reference point
        assert_eq!(clock.advance(20.0), FrameStep::Advance(20.0));
        assert!((clock.fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_mobile_cap_is_coarser() {
        let mut clock = FrameClock::new(45.0, 0.0);
        assert_eq!(clock.advance(17.0), FrameStep::Dropped);
        assert_eq!(clock.advance(23.0), FrameStep::Advance(23.0));
    }

    #[test]
    fn test_suspend_resyncs_without_backlog() {
        let mut clock = FrameClock::new(60.0, 0.0);
        assert_eq!(clock.advance(20.0), FrameStep::Advance(20.0));

        clock.set_suspended(true, 25.0);
        assert_eq!(clock.advance(5_000.0), FrameStep::Suspended);
        assert_eq!(clock.advance(10_000.0), FrameStep::Suspended);

        clock.set_suspended(false, 10_010.0);
        // First frame after resume is a normal small step, not a 10s jump
        assert_eq!(clock.advance(10_030.0), FrameStep::Advance(20.0));
    }

    #[test]
    fn test_set_max_fps() {
        let mut clock = FrameClock::new(60.0, 0.0);
        clock.set_max_fps(30.0);
        assert!((clock.min_frame_ms() - 33.333).abs() < 0.01);
        assert_eq!(clock.advance(20.0), FrameStep::Dropped);
    }
}

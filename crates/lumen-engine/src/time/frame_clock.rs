use std::time::{Duration, Instant};

/// Timing snapshot for one loop iteration.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds elapsed since the previous tick (clamped).
    pub elapsed: f64,

    /// Monotonic timestamp of this tick.
    pub now: Instant,

    /// Number of ticks before this one.
    pub frame_index: u64,
}

/// Produces clamped elapsed-time values between loop iterations.
///
/// The clamp keeps `update` stable after debugger pauses, window drags that
/// stall the event loop, or a tight loop that would otherwise report zero.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    min_step: Duration,
    max_step: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(min_step: Duration, max_step: Duration) -> Self {
        debug_assert!(min_step <= max_step);
        Self {
            last: Instant::now(),
            frame_index: 0,
            min_step,
            max_step,
        }
    }

    /// Restarts measurement from now, e.g. after the window was restored.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let step = now
            .saturating_duration_since(self.last)
            .clamp(self.min_step, self.max_step);
        self.last = now;

        let ft = FrameTime {
            elapsed: step.as_secs_f64(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_clamped_to_max() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start + Duration::from_secs(3));
        assert_eq!(ft.elapsed, 0.25);
    }

    #[test]
    fn elapsed_is_clamped_to_min() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start);
        assert_eq!(ft.elapsed, Duration::from_micros(100).as_secs_f64());
    }

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        assert_eq!(clock.tick_at(start + Duration::from_millis(16)).frame_index, 0);
        assert_eq!(clock.tick_at(start + Duration::from_millis(32)).frame_index, 1);
    }

    #[test]
    fn elapsed_measures_since_previous_tick() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        clock.tick_at(start + Duration::from_millis(10));
        let ft = clock.tick_at(start + Duration::from_millis(30));
        assert!((ft.elapsed - 0.020).abs() < 1e-9);
    }
}

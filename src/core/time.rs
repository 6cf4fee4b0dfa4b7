//! Frame timing utilities

use std::time::{Duration, Instant};

/// Gates work driven by the host's per-frame callback to a maximum rate.
///
/// The host calls [`ready`](Self::ready) every animation frame; it returns
/// `true` at most once per interval. A slow frame simply delays the next
/// tick, there is no catch-up.
#[derive(Clone, Debug)]
pub struct FrameGate {
    interval: Duration,
    last_tick: Option<Instant>,
    tick_count: u64,
}

impl FrameGate {
    /// Gate at `target_fps` ticks per second. Non-positive rates disable
    /// gating (every frame ticks); rates too low for a `Duration` gate at
    /// `Duration::MAX`.
    pub fn new(target_fps: f32) -> Self {
        let interval = if target_fps > 0.0 {
            interval_for_fps(target_fps).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self::with_interval(interval)
    }

    /// Gate with an explicit interval between ticks.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
            tick_count: 0,
        }
    }

    /// Returns `true` if a tick is due at `now`, recording it as taken.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.last_tick {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_tick = Some(now);
            self.tick_count += 1;
        }
        due
    }

    /// Forget the last tick so the next call to `ready` fires immediately.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// Change the interval without resetting the phase.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks granted since creation
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Interval between ticks at `fps`, `None` when the rate is not positive
/// or the interval does not fit a `Duration`.
pub fn interval_for_fps(fps: f32) -> Option<Duration> {
    if !(fps > 0.0) {
        return None;
    }
    Duration::try_from_secs_f32(1.0 / fps).ok()
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(60.0)
    }
}

//! Time-based counter animation.
//!
//! Counters interpolate from a start value to an end value over a fixed
//! duration. The displayed value depends only on elapsed monotonic time,
//! never on how many frames were drawn, so a slow terminal and a fast one
//! reach the end value at the same moment:
//!
//! ```text
//! progress = min(elapsed / duration, 1)
//! value    = floor(progress * (end - start) + start)
//! ```
//!
//! Frames are pulled from a [`Clock`], which is injectable so tests can step
//! time deterministically.

pub mod stats;

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonic time source for animations.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin. Never decreases.
    fn now(&self) -> Duration;

    /// Wait until the next frame.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// Counter animation
// ---------------------------------------------------------------------------

/// Linear interpolation from `start` to `end` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    pub start: f64,
    pub end: f64,
    pub duration: Duration,
}

impl CounterAnimation {
    pub fn new(start: f64, end: f64, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    /// Fraction of the animation completed after `elapsed`, in `[0, 1]`.
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Displayed (floored) value after `elapsed`.
    pub fn value_at(&self, elapsed: Duration) -> i64 {
        let progress = self.progress_at(elapsed);
        (progress * (self.end - self.start) + self.start).floor() as i64
    }

    /// Drive the animation to completion, calling `on_frame` once per frame.
    ///
    /// The last frame is always drawn at or after `duration` and carries the
    /// final value, which is also returned.
    pub fn run<F>(&self, clock: &dyn Clock, frame_interval: Duration, mut on_frame: F) -> i64
    where
        F: FnMut(i64),
    {
        let start = clock.now();
        loop {
            let elapsed = clock.now().saturating_sub(start);
            let value = self.value_at(elapsed);
            on_frame(value);
            if elapsed >= self.duration {
                return value;
            }
            clock.sleep(frame_interval);
        }
    }
}

/// Animation timing shared by the controller and the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSettings {
    pub duration: Duration,
    pub frame_interval: Duration,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

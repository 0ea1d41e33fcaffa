use std::time::Duration;

use crate::params::model::{Direction, Playback, ScrollDuration};

/// Pure time → offset mapping for the seamless loop.
///
/// One cycle moves the doubled strip by exactly one copy width `W`. Offsets are in
/// `[-W, 0]`; both ends show the same pixels, which is what hides the seam.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopTimeline {
    pub duration: ScrollDuration,
    pub direction: Direction,
}

impl LoopTimeline {
    pub fn new(duration: ScrollDuration, direction: Direction) -> Self {
        Self {
            duration,
            direction,
        }
    }

    pub fn period(self) -> Duration {
        self.duration.as_duration()
    }

    /// Cycle progress in `[0, 1)` after `elapsed` of uninterrupted playback.
    pub fn phase_at(self, elapsed: Duration) -> f64 {
        let period = self.period().as_secs_f64();
        (elapsed.as_secs_f64() / period).fract()
    }

    /// Advance `phase` by `dt` at this timeline's speed, wrapping into `[0, 1)`.
    pub fn advance(self, phase: f64, dt: Duration) -> f64 {
        let period = self.period().as_secs_f64();
        (phase + dt.as_secs_f64() / period).rem_euclid(1.0)
    }

    /// Horizontal translation of the strip for `phase`, given one copy's width.
    pub fn offset_at_phase(self, phase: f64, content_width: u32) -> f64 {
        let w = f64::from(content_width);
        let progress = match self.direction.playback() {
            Playback::Normal => phase,
            Playback::Reverse => 1.0 - phase,
        };
        -(progress * w)
    }

    pub fn offset_at(self, elapsed: Duration, content_width: u32) -> f64 {
        self.offset_at_phase(self.phase_at(elapsed), content_width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/timeline.rs"]
mod tests;

//! Tick-based value tweens (alpha fades)

use serde::{Deserialize, Serialize};

/// Easing curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Fast start, gentle finish
    EaseOutQuad,
}

impl Easing {
    /// Map linear progress in [0, 1] onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => t * (2.0 - t),
        }
    }
}

/// Interpolates a value between two endpoints over a number of ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub start_tick: u64,
    pub duration_ticks: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, start_tick: u64, duration_ticks: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_tick,
            duration_ticks,
            easing,
        }
    }

    /// Value at `tick` (held at `from` before the start, `to` after the end)
    pub fn value_at(&self, tick: u64) -> f32 {
        let elapsed = tick.saturating_sub(self.start_tick);
        let t = if self.duration_ticks == 0 {
            1.0
        } else {
            elapsed as f32 / self.duration_ticks as f32
        };
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    pub fn is_finished(&self, tick: u64) -> bool {
        tick >= self.start_tick + self.duration_ticks
    }
}

//! Fixed-step frame clock

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Accumulates real frame time and hands out whole simulation steps
#[derive(Debug, Clone, Default)]
pub struct FixedStepClock {
    accumulator: f32,
    /// Timestamp of the previous frame in milliseconds, if any
    last_time: Option<f64>,
}

impl FixedStepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp (ms, as given by `requestAnimationFrame`).
    /// Returns the number of fixed steps to run this frame.
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.advance_by(dt)
    }

    /// Feed an elapsed time in seconds. Returns the number of fixed steps to run.
    pub fn advance_by(&mut self, dt: f32) -> u32 {
        // Clamp long frames (tab switches, debugger pauses)
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Forget accumulated time (after a pause, so resuming doesn't fast-forward)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }
}

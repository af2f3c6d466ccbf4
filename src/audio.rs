//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bike crashed
    Explosion,
    /// Game paused
    Pause,
    /// Game resumed
    Resume,
}

impl SoundEffect {
    /// The sound a simulation event makes, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::PlayerExploded { .. } => Some(SoundEffect::Explosion),
            _ => None,
        }
    }
}

/// Output level for every effect
#[cfg(target_arch = "wasm32")]
const MASTER_VOLUME: f32 = 0.8;

/// Audio manager for the game
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    ctx: Option<AudioContext>,
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = MASTER_VOLUME;
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Explosion => self.play_explosion(ctx, vol),
            SoundEffect::Pause => self.play_blip(ctx, vol, 600.0, 300.0),
            SoundEffect::Resume => self.play_blip(ctx, vol, 300.0, 600.0),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Crash - low rumble with a crackle on top
    fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.6)
            .ok();
        osc.frequency().set_value_at_time(120.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(25.0, t + 0.6)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.7).ok();

        for (i, freq) in [1800.0, 1200.0, 900.0].iter().enumerate() {
            let delay = i as f64 * 0.05;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) {
                let t = t + delay;
                gain.gain().set_value_at_time(vol * 0.15, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.1).ok();
            }
        }
    }

    /// Short sweep between two pitches
    fn play_blip(&self, ctx: &AudioContext, vol: f32, from: f32, to: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.15)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explosions_make_noise() {
        let boom = GameEvent::PlayerExploded {
            player: 1,
            explosion: 2,
        };
        assert_eq!(SoundEffect::for_event(&boom), Some(SoundEffect::Explosion));
        assert_eq!(
            SoundEffect::for_event(&GameEvent::TrailActivated { trail: 3 }),
            None
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PlayerDestroyed { player: 1 }),
            None
        );
    }
}

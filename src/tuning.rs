//! Gameplay tuning
//!
//! Data-driven balance values for bikes, trails and explosions. Read-only to the
//! simulation; persisted as JSON in LocalStorage on the web build.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating tuning values
#[derive(Debug, Error)]
pub enum TuningError {
    /// JSON could not be parsed or had the wrong shape
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values parsed but break an invariant
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Balance values for the light-cycle simulation
///
/// Magnitudes are in pixels per second, rotation in degrees per frame, durations in
/// milliseconds (converted to ticks with [`crate::ms_to_ticks`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Bike kinematics ===
    /// Magnitude a bike spawns with
    pub starting_magnitude: f32,
    /// Top speed
    pub max_magnitude: f32,
    /// Magnitude gained (throttle) or lost (coasting) per frame
    pub magnitude_increment: f32,
    /// Degrees turned per frame while a turn key is held
    pub rotation_speed: f32,

    // === Trails ===
    /// Minimum magnitude before a bike starts laying trail
    pub trail_required_magnitude: f32,
    /// Delay before a fresh trail segment becomes collidable
    pub trail_activation_ms: u32,
    /// Time an active trail segment stays before fading out
    pub trail_timeout_ms: u32,
    /// Fade-out duration at the end of a trail segment's life
    pub trail_fade_ms: u32,
    /// Whether a bike's own trail is lethal to it
    pub self_collision: bool,

    // === Explosions ===
    /// Total explosion lifetime
    pub explosion_timeout_ms: u32,
    /// Fade-out duration at the end of an explosion's life
    pub explosion_fade_ms: u32,
    /// Duration of one pass through the explosion animation reel
    pub explosion_animation_ms: u32,
    /// Delay between a bike exploding and its removal
    pub player_destroy_delay_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_magnitude: 1.0,
            max_magnitude: 300.0,
            magnitude_increment: 5.0,
            rotation_speed: 7.0,

            trail_required_magnitude: 150.0,
            trail_activation_ms: 200,
            trail_timeout_ms: 10_000,
            trail_fade_ms: 500,
            self_collision: false,

            explosion_timeout_ms: 1500,
            explosion_fade_ms: 500,
            explosion_animation_ms: 250,
            player_destroy_delay_ms: 100,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Overlay the fields present in `json` onto this tuning
    ///
    /// The result is validated before anything is changed; on error `self` is untouched.
    pub fn merge_json(&mut self, json: &str) -> Result<(), TuningError> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(overrides) = overrides else {
            return Err(TuningError::Invalid("tuning overrides must be a JSON object"));
        };

        let mut merged = serde_json::to_value(&*self)?;
        if let serde_json::Value::Object(fields) = &mut merged {
            for (key, value) in overrides {
                if fields.contains_key(&key) {
                    fields.insert(key, value);
                } else {
                    log::warn!("Ignoring unknown tuning key '{}'", key);
                }
            }
        }

        let merged: Tuning = serde_json::from_value(merged)?;
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let finite = [
            self.starting_magnitude,
            self.max_magnitude,
            self.magnitude_increment,
            self.rotation_speed,
            self.trail_required_magnitude,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(TuningError::Invalid("values must be finite"));
        }
        if self.starting_magnitude < 1.0 {
            return Err(TuningError::Invalid("starting_magnitude must be at least 1"));
        }
        if self.max_magnitude < self.starting_magnitude {
            return Err(TuningError::Invalid(
                "max_magnitude must not be below starting_magnitude",
            ));
        }
        if self.magnitude_increment < 0.0 {
            return Err(TuningError::Invalid("magnitude_increment must not be negative"));
        }
        if self.rotation_speed < 0.0 {
            return Err(TuningError::Invalid("rotation_speed must not be negative"));
        }
        if self.explosion_fade_ms > self.explosion_timeout_ms {
            return Err(TuningError::Invalid(
                "explosion_fade_ms must not exceed explosion_timeout_ms",
            ));
        }
        Ok(())
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "lightcycle_tuning";

    /// Load tuning from LocalStorage (WASM only), falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Stored tuning rejected, using defaults: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Native builds have no LocalStorage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

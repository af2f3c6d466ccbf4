//! Light Cycle - a Tron-style light-cycle arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bike kinematics, trails, collisions, explosions)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native input and frame clock
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz frame tick)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the host will feed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 960.0;
    pub const VIEWPORT_HEIGHT: f32 = 640.0;

    /// Bike sprite size
    pub const BIKE_SIZE: f32 = 32.0;
    /// Bike hitbox: a 12px wide strip down the middle of the sprite
    pub const BIKE_HITBOX_MIN: (f32, f32) = (10.0, 0.0);
    pub const BIKE_HITBOX_MAX: (f32, f32) = (22.0, 32.0);

    /// Trail segment size
    pub const TRAIL_WIDTH: f32 = 1.0;
    pub const TRAIL_HEIGHT: f32 = 6.0;

    /// Explosion sprite size (centred over the bike)
    pub const EXPLOSION_SIZE: f32 = 64.0;
    /// Explosion animation frames
    pub const EXPLOSION_FRAMES: u32 = 6;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit heading for a rotation in degrees (0 = up, clockwise positive, y down)
#[inline]
pub fn heading_from_degrees(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.sin(), -rad.cos())
}

/// Rotate a point about a pivot by `degrees` (clockwise on screen)
#[inline]
pub fn rotate_about(point: Vec2, pivot: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - pivot;
    pivot + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Convert a duration in milliseconds to whole simulation ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u64 {
    let ticks = (ms as f32 / 1000.0) / consts::SIM_DT;
    // Guard against 199.99999 style float error before ceil
    (ticks - 1e-3).ceil().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(367.0), 7.0);
        assert_eq!(normalize_degrees(-7.0), 353.0);
        assert!(normalize_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn test_heading_points_up_at_zero() {
        let h = heading_from_degrees(0.0);
        assert!(h.x.abs() < 1e-6);
        assert!((h.y + 1.0).abs() < 1e-6);

        let right = heading_from_degrees(90.0);
        assert!((right.x - 1.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);
    }

    #[test]
    fn test_rotate_about_quarter_turn() {
        // On screen (y down) a clockwise quarter turn takes "up" to "right"
        let p = rotate_about(Vec2::new(0.0, -10.0), Vec2::ZERO, 90.0);
        assert!((p.x - 10.0).abs() < 1e-4);
        assert!(p.y.abs() < 1e-4);
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(100), 5);
        assert_eq!(ms_to_ticks(200), 10);
        assert_eq!(ms_to_ticks(1500), 75);
        assert_eq!(ms_to_ticks(10), 1);
    }
}

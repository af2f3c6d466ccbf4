//! Explosion effect left where a bike crashed

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::components::{Positionable, Rotatable};
use super::schedule::TaskHandle;
use super::tween::Tween;
use crate::consts::{EXPLOSION_FRAMES, EXPLOSION_SIZE};
use crate::normalize_degrees;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub rotation: f32,
    /// Current animation reel frame
    pub frame: u32,
    pub alpha: f32,
    pub fade: Option<Tween>,
    pub spawn_tick: u64,
    pub tasks: Vec<TaskHandle>,
}

impl Explosion {
    pub fn new(id: u32, pos: Vec2, rotation: f32, tick: u64) -> Self {
        Self {
            id,
            pos,
            rotation: normalize_degrees(rotation),
            frame: 0,
            alpha: 1.0,
            fade: None,
            spawn_tick: tick,
            tasks: Vec::new(),
        }
    }

    /// Advance the reel (plays once, holds the last frame) and the fade
    pub fn update(&mut self, tick: u64, animation_ticks: u64) {
        let elapsed = tick.saturating_sub(self.spawn_tick);
        self.frame = if animation_ticks == 0 {
            EXPLOSION_FRAMES - 1
        } else {
            ((elapsed * EXPLOSION_FRAMES as u64) / animation_ticks).min(EXPLOSION_FRAMES as u64 - 1)
                as u32
        };
        if let Some(fade) = &self.fade {
            self.alpha = fade.value_at(tick);
        }
    }

    pub fn forget_task(&mut self, handle: TaskHandle) {
        self.tasks.retain(|&h| h != handle);
    }
}

impl Positionable for Explosion {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(EXPLOSION_SIZE)
    }

    fn origin(&self) -> Vec2 {
        Vec2::splat(EXPLOSION_SIZE / 2.0)
    }
}

impl Rotatable for Explosion {
    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reel_plays_once() {
        let mut explosion = Explosion::new(1, Vec2::ZERO, 0.0, 10);
        // 250 ms reel at 50 Hz
        let reel = 13;
        explosion.update(10, reel);
        assert_eq!(explosion.frame, 0);
        explosion.update(17, reel);
        assert_eq!(explosion.frame, 3);
        explosion.update(200, reel);
        assert_eq!(explosion.frame, EXPLOSION_FRAMES - 1);
    }
}

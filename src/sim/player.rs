//! Light-cycle bikes

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::components::{Collidable, InputReceiver, Positionable, Rotatable};
use super::input::{InputLatch, Key};
use super::schedule::TaskHandle;
use crate::consts::*;
use crate::normalize_degrees;

/// Lowest magnitude a bike can have; at this speed it is stopped
pub const MIN_MAGNITUDE: f32 = 1.0;

/// Bike lifecycle. Destruction removes the bike from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifeState {
    #[default]
    Alive,
    /// Exploding: input ignored, velocity pinned to zero
    Locked,
}

/// Bike colour scheme, also used for its trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Livery {
    Cyan,
    Orange,
}

impl Livery {
    /// Trail colour as RGBA
    pub fn trail_color(self) -> [f32; 4] {
        match self {
            Livery::Cyan => [0.0, 1.0, 1.0, 1.0],
            Livery::Orange => [1.0, 120.0 / 255.0, 0.0, 1.0],
        }
    }
}

/// How a bike is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    /// Steered by the arrow keys
    Keyboard(InputLatch),
    /// Not steered; keeps whatever velocity it has
    Static,
}

/// A bike entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Degrees, 0 = up, wrapped to [0, 360)
    pub rotation: f32,
    /// Pixels per second
    pub vel: Vec2,
    /// Current speed, in [MIN_MAGNITUDE, max_magnitude]
    pub magnitude: f32,
    pub livery: Livery,
    pub control: Control,
    pub state: LifeState,
    /// Trail segments this bike has laid that are still alive
    pub trails: Vec<u32>,
    /// Pending deferred tasks acting on this bike
    pub tasks: Vec<TaskHandle>,
}

impl Player {
    pub fn new(id: u32, pos: Vec2, rotation: f32, livery: Livery, control: Control) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(BIKE_SIZE),
            rotation: normalize_degrees(rotation),
            vel: Vec2::ZERO,
            magnitude: MIN_MAGNITUDE,
            livery,
            control,
            state: LifeState::Alive,
            trails: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == LifeState::Locked
    }

    /// Lock the bike. Returns false if it was already locked.
    pub fn lock(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.state = LifeState::Locked;
        self.vel = Vec2::ZERO;
        if let Control::Keyboard(latch) = &mut self.control {
            latch.clear();
        }
        true
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    pub fn is_controllable(&self) -> bool {
        matches!(self.control, Control::Keyboard(_))
    }

    /// Held keys, for keyboard-driven bikes
    pub fn latch(&self) -> Option<&InputLatch> {
        match &self.control {
            Control::Keyboard(latch) => Some(latch),
            Control::Static => None,
        }
    }

    /// Drop a trail segment from this bike's list (no-op if absent)
    pub fn remove_trail(&mut self, trail_id: u32) {
        self.trails.retain(|&t| t != trail_id);
    }

    /// Forget a task handle once the task has run
    pub fn forget_task(&mut self, handle: TaskHandle) {
        self.tasks.retain(|&h| h != handle);
    }
}

impl Positionable for Player {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn origin(&self) -> Vec2 {
        self.size * 0.5
    }
}

impl Rotatable for Player {
    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }
}

impl Collidable for Player {
    fn local_hitbox(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(BIKE_HITBOX_MIN.0, BIKE_HITBOX_MIN.1),
            Vec2::new(BIKE_HITBOX_MAX.0, BIKE_HITBOX_MAX.1),
        )
    }

    fn is_collidable(&self) -> bool {
        true
    }
}

impl InputReceiver for Player {
    fn key_down(&mut self, key: Key) {
        if self.is_locked() {
            return;
        }
        if let Control::Keyboard(latch) = &mut self.control {
            latch.key_down(key);
        }
    }

    fn key_up(&mut self, key: Key) {
        if self.is_locked() {
            return;
        }
        if let Control::Keyboard(latch) = &mut self.control {
            latch.key_up(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bike() -> Player {
        Player::new(1, Vec2::new(100.0, 100.0), 90.0, Livery::Cyan, Control::Keyboard(InputLatch::default()))
    }

    #[test]
    fn test_new_bike_defaults() {
        let p = bike();
        assert_eq!(p.magnitude, MIN_MAGNITUDE);
        assert_eq!(p.vel, Vec2::ZERO);
        assert_eq!(p.centre(), Vec2::new(116.0, 116.0));
        assert_eq!(p.extent(), BIKE_SIZE);
        assert!(!p.is_moving());
    }

    #[test]
    fn test_lock_is_one_shot() {
        let mut p = bike();
        p.vel = Vec2::new(10.0, 0.0);
        assert!(p.lock());
        assert_eq!(p.vel, Vec2::ZERO);
        assert!(!p.lock());
        assert!(p.is_locked());
    }

    #[test]
    fn test_locked_bike_ignores_keys() {
        let mut p = bike();
        p.key_down(Key::Up);
        assert!(p.latch().is_some_and(|l| l.up));
        p.lock();
        assert!(p.latch().is_some_and(|l| !l.up));
        p.key_down(Key::Left);
        assert_eq!(p.latch(), Some(&InputLatch::default()));
    }

    #[test]
    fn test_static_bike_has_no_latch() {
        let mut p = Player::new(2, Vec2::ZERO, 0.0, Livery::Orange, Control::Static);
        p.key_down(Key::Up);
        assert!(p.latch().is_none());
        assert!(!p.is_controllable());
    }

    #[test]
    fn test_rotation_wraps_on_set() {
        let mut p = bike();
        p.set_rotation(-7.0);
        assert_eq!(p.rotation(), 353.0);
        p.set_rotation(727.0);
        assert!((p.rotation() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_hitbox_is_central_strip() {
        let p = Player::new(3, Vec2::ZERO, 0.0, Livery::Cyan, Control::Static);
        let obb = p.hitbox();
        assert!((obb.centre - Vec2::new(16.0, 16.0)).length() < 1e-4);
        assert!((obb.half_extents - Vec2::new(6.0, 16.0)).length() < 1e-4);
    }
}

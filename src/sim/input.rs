//! Directional input latch
//!
//! Key events arrive one at a time from the host; the latch only remembers which
//! directional keys are currently held. The integrator reads it once per frame.

use serde::{Deserialize, Serialize};

/// Directional keys a bike responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Left,
    Right,
}

impl Key {
    /// Map a legacy DOM key code (37/38/39 arrow keys)
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            37 => Some(Key::Left),
            38 => Some(Key::Up),
            39 => Some(Key::Right),
            _ => None,
        }
    }

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "Up" => Some(Key::Up),
            "ArrowLeft" | "Left" => Some(Key::Left),
            "ArrowRight" | "Right" => Some(Key::Right),
            _ => None,
        }
    }
}

/// Which directional keys are held right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLatch {
    pub up: bool,
    pub left: bool,
    pub right: bool,
}

impl InputLatch {
    pub fn key_down(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn key_up(&mut self, key: Key) {
        self.set(key, false);
    }

    fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Up => self.up = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Up => self.up,
            Key::Left => self.left,
            Key::Right => self.right,
        }
    }

    /// Net turn: -1 left, +1 right, 0 for neither or both
    pub fn turn(&self) -> i8 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Release everything
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from_key_code(38), Some(Key::Up));
        assert_eq!(Key::from_key_code(37), Some(Key::Left));
        assert_eq!(Key::from_key_code(39), Some(Key::Right));
        assert_eq!(Key::from_key_code(40), None);
        assert_eq!(Key::from_key_name("ArrowRight"), Some(Key::Right));
        assert_eq!(Key::from_key_name("ArrowDown"), None);
        assert_eq!(Key::from_key_name("w"), None);
    }

    #[test]
    fn test_latch_last_write_wins() {
        let mut latch = InputLatch::default();
        latch.key_down(Key::Up);
        latch.key_down(Key::Up);
        assert!(latch.is_held(Key::Up));
        latch.key_up(Key::Up);
        assert!(!latch.is_held(Key::Up));
        // Release without press is harmless
        latch.key_up(Key::Left);
        assert_eq!(latch, InputLatch::default());
    }

    #[test]
    fn test_turn_cancels_when_both_held() {
        let mut latch = InputLatch::default();
        assert_eq!(latch.turn(), 0);
        latch.key_down(Key::Left);
        assert_eq!(latch.turn(), -1);
        latch.key_down(Key::Right);
        assert_eq!(latch.turn(), 0);
        latch.key_up(Key::Left);
        assert_eq!(latch.turn(), 1);
    }
}

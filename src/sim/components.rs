//! Capability traits shared by the simulation entities
//!
//! Each entity type implements the capabilities it has; systems are written
//! against the traits rather than the concrete types.

use glam::Vec2;

use super::collision::Obb;
use super::input::Key;
use crate::heading_from_degrees;

/// Something with a position, size and local origin in screen space
pub trait Positionable {
    /// Top-left corner
    fn pos(&self) -> Vec2;
    fn set_pos(&mut self, pos: Vec2);
    /// Width and height
    fn size(&self) -> Vec2;
    /// Rotation pivot, relative to `pos`
    fn origin(&self) -> Vec2;

    /// Absolute centre of rotation
    fn centre(&self) -> Vec2 {
        self.pos() + self.origin()
    }

    /// Largest dimension, the distance an entity must travel to fully leave an edge
    fn extent(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y)
    }
}

/// Something with a heading in degrees (0 = up, clockwise positive)
pub trait Rotatable {
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, degrees: f32);

    /// Unit vector the entity faces
    fn heading(&self) -> Vec2 {
        heading_from_degrees(self.rotation())
    }
}

/// Something that takes part in collision checks
pub trait Collidable: Positionable + Rotatable {
    /// Hitbox rectangle in unrotated local sprite coordinates (min, max)
    fn local_hitbox(&self) -> (Vec2, Vec2);

    /// Whether hits against this entity currently count
    fn is_collidable(&self) -> bool;

    /// World-space oriented hitbox
    fn hitbox(&self) -> Obb {
        let (min, max) = self.local_hitbox();
        Obb::from_local_rect(self.pos(), self.origin(), self.rotation(), min, max)
    }
}

/// Something driven by directional key events
pub trait InputReceiver {
    fn key_down(&mut self, key: Key);
    fn key_up(&mut self, key: Key);
}

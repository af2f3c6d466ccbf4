//! Bike kinematics
//!
//! "Tank" acceleration: the throttle ramps magnitude by a fixed step per frame,
//! releasing it ramps back down to a hard stop. There is no friction curve.

use glam::Vec2;

use super::components::{Positionable, Rotatable};
use super::player::{Control, MIN_MAGNITUDE, Player};
use crate::tuning::Tuning;

/// Turn, throttle and set velocity for one frame from the bike's held keys
///
/// Static bikes keep their velocity. Locked bikes always end the frame stopped.
pub fn integrate(player: &mut Player, tuning: &Tuning) {
    if player.is_locked() {
        player.vel = Vec2::ZERO;
        return;
    }

    let Control::Keyboard(latch) = player.control else {
        return;
    };

    let turn = latch.turn();
    if turn != 0 {
        let rotation = player.rotation() + f32::from(turn) * tuning.rotation_speed;
        player.set_rotation(rotation);
    }

    let heading = player.heading();

    if latch.up {
        player.magnitude = (player.magnitude + tuning.magnitude_increment).min(tuning.max_magnitude);
        player.vel = heading * player.magnitude;
    } else {
        player.magnitude = (player.magnitude - tuning.magnitude_increment).max(MIN_MAGNITUDE);
        if player.magnitude <= MIN_MAGNITUDE {
            player.magnitude = MIN_MAGNITUDE;
            player.vel = Vec2::ZERO;
        } else {
            player.vel = heading * player.magnitude;
        }
    }
}

/// Move an entity by `vel * dt`. Returns whether its position changed.
pub fn apply_motion<E: Positionable>(entity: &mut E, vel: Vec2, dt: f32) -> bool {
    if vel == Vec2::ZERO {
        return false;
    }
    let before = entity.pos();
    let after = before + vel * dt;
    entity.set_pos(after);
    after != before
}

/// Teleport an entity that has fully left the viewport to the opposite edge
pub fn wrap_position<E: Positionable>(entity: &mut E, viewport: Vec2) {
    let extent = entity.extent();
    let mut pos = entity.pos();

    if pos.x > viewport.x {
        pos.x = -extent;
    } else if pos.x < -extent {
        pos.x = viewport.x;
    }

    if pos.y > viewport.y {
        pos.y = -extent;
    } else if pos.y < -extent {
        pos.y = viewport.y;
    }

    entity.set_pos(pos);
}

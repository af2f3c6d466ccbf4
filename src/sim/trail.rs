//! Trail segments laid behind fast bikes

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::components::{Collidable, Positionable, Rotatable};
use super::player::Livery;
use super::schedule::TaskHandle;
use super::tween::Tween;
use crate::consts::{TRAIL_HEIGHT, TRAIL_WIDTH};
use crate::normalize_degrees;
use crate::tuning::Tuning;

/// A short-lived collidable marker of a bike's path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub rotation: f32,
    /// Bike that laid this segment; cleared if the bike is destroyed first
    pub owner: Option<u32>,
    pub livery: Livery,
    /// Collidable once the activation delay has passed
    pub active: bool,
    pub alpha: f32,
    /// Running fade-out, if any
    pub fade: Option<Tween>,
    pub spawn_tick: u64,
    /// Pending deferred tasks acting on this segment
    pub tasks: Vec<TaskHandle>,
}

impl Trail {
    /// Create an inactive segment centred on `centre`
    pub fn new(id: u32, centre: Vec2, rotation: f32, owner: u32, livery: Livery, tick: u64) -> Self {
        Self {
            id,
            pos: centre - Self::dimensions() * 0.5,
            rotation: normalize_degrees(rotation),
            owner: Some(owner),
            livery,
            active: false,
            alpha: 1.0,
            fade: None,
            spawn_tick: tick,
            tasks: Vec::new(),
        }
    }

    pub fn dimensions() -> Vec2 {
        Vec2::new(TRAIL_WIDTH, TRAIL_HEIGHT)
    }

    pub fn is_owned_by(&self, player_id: u32) -> bool {
        self.owner == Some(player_id)
    }

    /// Advance the fade tween
    pub fn update(&mut self, tick: u64) {
        if let Some(fade) = &self.fade {
            self.alpha = fade.value_at(tick);
        }
    }

    pub fn forget_task(&mut self, handle: TaskHandle) {
        self.tasks.retain(|&h| h != handle);
    }
}

/// Whether a bike moving at `magnitude` lays trail
pub fn should_emit(magnitude: f32, tuning: &Tuning) -> bool {
    magnitude >= tuning.trail_required_magnitude
}

impl Positionable for Trail {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn size(&self) -> Vec2 {
        Self::dimensions()
    }

    fn origin(&self) -> Vec2 {
        Self::dimensions() * 0.5
    }
}

impl Rotatable for Trail {
    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }
}

impl Collidable for Trail {
    fn local_hitbox(&self) -> (Vec2, Vec2) {
        (Vec2::ZERO, Self::dimensions())
    }

    fn is_collidable(&self) -> bool {
        self.active
    }
}

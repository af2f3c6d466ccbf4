//! Simulation context
//!
//! `World` owns every entity, the task scheduler and the RNG. Hosts construct one
//! explicitly and pass it to `tick`; there is no ambient game state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::components::{InputReceiver, Positionable};
use super::explosion::Explosion;
use super::input::{InputLatch, Key};
use super::player::{Control, Livery, Player};
use super::schedule::{ScheduledTask, Scheduler, Task, TaskHandle};
use super::trail::Trail;
use super::tween::{Easing, Tween};
use crate::consts::*;
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Whether the simulation is advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    Paused,
}

/// Things that happened during a tick, for the host to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TrailSpawned { trail: u32, owner: u32 },
    TrailActivated { trail: u32 },
    TrailExpired { trail: u32, owner: Option<u32> },
    PlayerExploded { player: u32, explosion: u32 },
    PlayerDestroyed { player: u32 },
    ExplosionFinished { explosion: u32 },
}

/// Description of a bike to spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSpec {
    /// Top-left corner
    pub pos: Vec2,
    /// Degrees, 0 = up
    pub rotation: f32,
    pub livery: Livery,
    /// Steered by the keyboard, or a static obstacle
    pub controllable: bool,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG was created from
    pub seed: u64,
    pub tuning: Tuning,
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Bikes (sorted by id for determinism)
    pub players: Vec<Player>,
    /// Trail segments (sorted by id for determinism)
    pub trails: Vec<Trail>,
    /// Explosions (sorted by id for determinism)
    pub explosions: Vec<Explosion>,
    pub scheduler: Scheduler,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl World {
    pub fn new(tuning: Tuning, viewport: Vec2, seed: u64) -> Self {
        log::info!(
            "World created ({}x{}, seed {})",
            viewport.x,
            viewport.y,
            seed
        );
        Self {
            seed,
            tuning,
            viewport,
            time_ticks: 0,
            phase: GamePhase::Running,
            players: Vec::new(),
            trails: Vec::new(),
            explosions: Vec::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a bike to the world
    pub fn spawn_player(&mut self, spec: PlayerSpec) -> u32 {
        let id = self.next_entity_id();
        let control = if spec.controllable {
            Control::Keyboard(InputLatch::default())
        } else {
            Control::Static
        };
        let mut player = Player::new(id, spec.pos, spec.rotation, spec.livery, control);
        player.magnitude = self.tuning.starting_magnitude;
        log::debug!("Spawned {:?} bike {} at {:?}", spec.livery, id, spec.pos);
        self.players.push(player);
        id
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn trail(&self, id: u32) -> Option<&Trail> {
        self.trails.iter().find(|t| t.id == id)
    }

    pub fn explosion(&self, id: u32) -> Option<&Explosion> {
        self.explosions.iter().find(|e| e.id == id)
    }

    /// Forward a key press to a bike. Unknown bikes are ignored.
    pub fn key_down(&mut self, player_id: u32, key: Key) {
        if let Some(player) = self.player_mut(player_id) {
            player.key_down(key);
        }
    }

    /// Forward a key release to a bike. Unknown bikes are ignored.
    pub fn key_up(&mut self, player_id: u32, key: Key) {
        if let Some(player) = self.player_mut(player_id) {
            player.key_up(key);
        }
    }

    pub fn pause(&mut self) {
        if self.phase != GamePhase::Paused {
            log::info!("Pausing game");
            self.phase = GamePhase::Paused;
        }
    }

    pub fn unpause(&mut self) {
        if self.phase == GamePhase::Paused {
            log::info!("Unpausing game");
            self.phase = GamePhase::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.unpause();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Change the viewport (host canvas resized)
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Tear down: remove every entity and cancel every pending task
    pub fn clear(&mut self) {
        log::info!(
            "Clearing world ({} bikes, {} trails, {} explosions)",
            self.players.len(),
            self.trails.len(),
            self.explosions.len()
        );
        self.players.clear();
        self.trails.clear();
        self.explosions.clear();
        self.scheduler.clear();
        self.events.clear();
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Lay a trail segment at a bike's centre. Returns the segment's ID.
    pub fn spawn_trail(&mut self, owner_id: u32) -> Option<u32> {
        let tick = self.time_ticks;
        let activation = tick + ms_to_ticks(self.tuning.trail_activation_ms);
        let id = self.next_entity_id();

        let player = self.players.iter_mut().find(|p| p.id == owner_id)?;
        let mut trail = Trail::new(id, player.centre(), player.rotation, owner_id, player.livery, tick);
        player.trails.push(id);

        trail
            .tasks
            .push(self.scheduler.schedule(id, activation, Task::ActivateTrail));
        self.trails.push(trail);
        self.events.push(GameEvent::TrailSpawned {
            trail: id,
            owner: owner_id,
        });
        Some(id)
    }

    /// Crash a bike: lock it, leave an explosion and schedule its removal
    ///
    /// Returns false if the bike is unknown or already locked.
    pub fn explode_player(&mut self, player_id: u32) -> bool {
        let tick = self.time_ticks;
        let destroy_at = tick + ms_to_ticks(self.tuning.player_destroy_delay_ms);

        let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) else {
            return false;
        };
        if !player.lock() {
            return false;
        }
        // Centre the larger explosion sprite over the bike
        let offset = Vec2::splat((EXPLOSION_SIZE - BIKE_SIZE) / 2.0);
        let explosion_pos = player.pos - offset;
        let handle = self.scheduler.schedule(player_id, destroy_at, Task::DestroyPlayer);
        player.tasks.push(handle);

        let id = self.next_entity_id();
        let rotation = self.rng.random_range(0..360) as f32;
        let mut explosion = Explosion::new(id, explosion_pos, rotation, tick);
        let timeout = self.tuning.explosion_timeout_ms;
        let fade_start = timeout.saturating_sub(self.tuning.explosion_fade_ms);
        explosion.tasks.push(self.scheduler.schedule(
            id,
            tick + ms_to_ticks(fade_start),
            Task::FadeExplosion,
        ));
        explosion.tasks.push(self.scheduler.schedule(
            id,
            tick + ms_to_ticks(timeout),
            Task::ExpireExplosion,
        ));
        self.explosions.push(explosion);

        log::info!("Bike {} exploded", player_id);
        self.events.push(GameEvent::PlayerExploded {
            player: player_id,
            explosion: id,
        });
        true
    }

    /// Remove a bike. Its pending tasks are cancelled and its trails orphaned.
    pub fn destroy_player(&mut self, player_id: u32) {
        let Some(idx) = self.players.iter().position(|p| p.id == player_id) else {
            return;
        };
        let player = self.players.remove(idx);
        self.cancel_tasks(&player.tasks);
        for trail in self.trails.iter_mut().filter(|t| t.is_owned_by(player_id)) {
            trail.owner = None;
        }
        log::debug!("Bike {} destroyed, {} trail segments orphaned", player_id, player.trails.len());
        self.events.push(GameEvent::PlayerDestroyed { player: player_id });
    }

    /// Remove a trail segment and drop it from its owner's list
    pub fn destroy_trail(&mut self, trail_id: u32) {
        let Some(idx) = self.trails.iter().position(|t| t.id == trail_id) else {
            return;
        };
        let trail = self.trails.remove(idx);
        self.cancel_tasks(&trail.tasks);
        if let Some(owner) = trail.owner.and_then(|id| self.player_mut(id)) {
            owner.remove_trail(trail_id);
        }
        self.events.push(GameEvent::TrailExpired {
            trail: trail_id,
            owner: trail.owner,
        });
    }

    pub fn destroy_explosion(&mut self, explosion_id: u32) {
        let Some(idx) = self.explosions.iter().position(|e| e.id == explosion_id) else {
            return;
        };
        let explosion = self.explosions.remove(idx);
        self.cancel_tasks(&explosion.tasks);
        self.events.push(GameEvent::ExplosionFinished {
            explosion: explosion_id,
        });
    }

    fn cancel_tasks(&mut self, handles: &[TaskHandle]) {
        for &handle in handles {
            self.scheduler.cancel(handle);
        }
    }

    /// Run a task that has come due
    pub(crate) fn run_task(&mut self, scheduled: ScheduledTask) {
        let now = self.time_ticks;
        let ScheduledTask {
            handle,
            owner,
            task,
            ..
        } = scheduled;

        match task {
            Task::ActivateTrail => {
                let fade_at = now + ms_to_ticks(self.tuning.trail_timeout_ms);
                let Some(trail) = self.trails.iter_mut().find(|t| t.id == owner) else {
                    log::warn!("Dropping {:?} for missing trail {}", task, owner);
                    return;
                };
                trail.forget_task(handle);
                trail.active = true;
                trail
                    .tasks
                    .push(self.scheduler.schedule(owner, fade_at, Task::FadeTrail));
                self.events.push(GameEvent::TrailActivated { trail: owner });
            }
            Task::FadeTrail => {
                let fade_ticks = ms_to_ticks(self.tuning.trail_fade_ms);
                let Some(trail) = self.trails.iter_mut().find(|t| t.id == owner) else {
                    log::warn!("Dropping {:?} for missing trail {}", task, owner);
                    return;
                };
                trail.forget_task(handle);
                trail.fade = Some(Tween::new(trail.alpha, 0.0, now, fade_ticks, Easing::EaseOutQuad));
                trail
                    .tasks
                    .push(self.scheduler.schedule(owner, now + fade_ticks, Task::ExpireTrail));
            }
            Task::ExpireTrail => {
                if let Some(trail) = self.trails.iter_mut().find(|t| t.id == owner) {
                    trail.forget_task(handle);
                    trail.active = false;
                }
                self.destroy_trail(owner);
            }
            Task::DestroyPlayer => {
                if let Some(player) = self.player_mut(owner) {
                    player.forget_task(handle);
                }
                self.destroy_player(owner);
            }
            Task::FadeExplosion => {
                let fade_ticks = ms_to_ticks(self.tuning.explosion_fade_ms);
                let Some(explosion) = self.explosions.iter_mut().find(|e| e.id == owner) else {
                    log::warn!("Dropping {:?} for missing explosion {}", task, owner);
                    return;
                };
                explosion.forget_task(handle);
                explosion.fade = Some(Tween::new(1.0, 0.0, now, fade_ticks, Easing::Linear));
            }
            Task::ExpireExplosion => {
                self.destroy_explosion(owner);
            }
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.players.sort_by_key(|p| p.id);
        self.trails.sort_by_key(|t| t.id);
        self.explosions.sort_by_key(|e| e.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Tuning::default(), Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT), 42)
    }

    fn cyan(pos: Vec2) -> PlayerSpec {
        PlayerSpec {
            pos,
            rotation: 90.0,
            livery: Livery::Cyan,
            controllable: true,
        }
    }

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut w = world();
        let a = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        let b = w.spawn_player(cyan(Vec2::new(300.0, 100.0)));
        assert!(b > a);
        assert!(w.player(a).is_some_and(|p| p.is_controllable()));
    }

    #[test]
    fn test_explode_is_one_shot() {
        let mut w = world();
        let id = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        assert!(w.explode_player(id));
        assert!(!w.explode_player(id));
        assert_eq!(w.explosions.len(), 1);
        let explosion = &w.explosions[0];
        assert_eq!(explosion.pos, Vec2::new(84.0, 84.0));
        assert!(explosion.rotation >= 0.0 && explosion.rotation < 360.0);

        let events = w.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::PlayerExploded { .. }))
                .count(),
            1
        );
        assert!(w.drain_events().is_empty());
    }

    #[test]
    fn test_trail_registered_with_owner() {
        let mut w = world();
        let id = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        let trail = w.spawn_trail(id).unwrap();
        assert_eq!(w.player(id).unwrap().trails, vec![trail]);
        assert_eq!(w.trail(trail).unwrap().centre(), Vec2::new(116.0, 116.0));
        assert_eq!(w.spawn_trail(999), None);
    }

    #[test]
    fn test_trail_destroyed_first_leaves_owner_list() {
        let mut w = world();
        let id = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        let trail = w.spawn_trail(id).unwrap();
        w.destroy_trail(trail);
        assert!(w.player(id).unwrap().trails.is_empty());
        assert!(w.scheduler.is_empty());
    }

    #[test]
    fn test_owner_destroyed_first_orphans_trails() {
        let mut w = world();
        let id = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        let trail = w.spawn_trail(id).unwrap();
        w.destroy_player(id);
        assert_eq!(w.trail(trail).unwrap().owner, None);
        // Expiring an orphan is a plain removal
        w.destroy_trail(trail);
        assert!(w.trails.is_empty());
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::TrailExpired { trail, owner: None }));
    }

    #[test]
    fn test_destroy_cancels_pending_tasks() {
        let mut w = world();
        let id = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        w.explode_player(id);
        // destroy + explosion fade + explosion expiry
        assert_eq!(w.scheduler.len(), 3);
        w.destroy_player(id);
        assert_eq!(w.scheduler.len(), 2);
    }

    #[test]
    fn test_task_for_missing_entity_is_dropped() {
        let mut w = world();
        let handle = w.scheduler.schedule(77, 0, Task::FadeTrail);
        let task = ScheduledTask {
            handle,
            owner: 77,
            due_tick: 0,
            task: Task::FadeTrail,
        };
        w.run_task(task);
        assert!(w.trails.is_empty());
        assert!(w.events.is_empty());
    }

    #[test]
    fn test_pause_toggle() {
        let mut w = world();
        assert!(!w.is_paused());
        w.toggle_pause();
        assert!(w.is_paused());
        w.pause();
        assert!(w.is_paused());
        w.toggle_pause();
        assert_eq!(w.phase, GamePhase::Running);
    }

    #[test]
    fn test_clear_tears_everything_down() {
        let mut w = world();
        let id = w.spawn_player(cyan(Vec2::new(100.0, 100.0)));
        w.spawn_trail(id);
        w.explode_player(id);
        w.clear();
        assert!(w.players.is_empty());
        assert!(w.trails.is_empty());
        assert!(w.explosions.is_empty());
        assert!(w.scheduler.is_empty());
    }

    #[test]
    fn test_same_seed_same_explosion_rotation() {
        let mut a = world();
        let mut b = world();
        let pa = a.spawn_player(cyan(Vec2::ZERO));
        let pb = b.spawn_player(cyan(Vec2::ZERO));
        a.explode_player(pa);
        b.explode_player(pb);
        assert_eq!(a.explosions[0].rotation, b.explosions[0].rotation);
    }
}

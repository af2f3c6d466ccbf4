//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world one frame deterministically.

use super::collision::obb_overlap;
use super::components::Collidable;
use super::kinematics::{apply_motion, integrate, wrap_position};
use super::state::World;
use super::trail::should_emit;
use crate::ms_to_ticks;

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, dt: f32) {
    if world.is_paused() {
        return;
    }

    world.time_ticks += 1;
    let now = world.time_ticks;

    // Deferred work first, so a bike due for removal is gone before it moves
    for task in world.scheduler.take_due(now) {
        world.run_task(task);
    }

    // Heading and velocity from held keys
    for player in &mut world.players {
        integrate(player, &world.tuning);
    }

    // Motion, then trail emission for bikes that actually moved
    let mut emitters = Vec::new();
    for player in &mut world.players {
        let vel = player.vel;
        let moved = apply_motion(player, vel, dt);
        if moved && !player.is_locked() && should_emit(player.magnitude, &world.tuning) {
            emitters.push(player.id);
        }
    }
    for id in emitters {
        world.spawn_trail(id);
    }

    for player in &mut world.players {
        wrap_position(player, world.viewport);
    }

    // Gather every crash against post-movement positions, then apply them together
    for id in find_crashes(world) {
        world.explode_player(id);
    }

    let animation_ticks = ms_to_ticks(world.tuning.explosion_animation_ms);
    for explosion in &mut world.explosions {
        explosion.update(now, animation_ticks);
    }
    for trail in &mut world.trails {
        trail.update(now);
    }

    // Ensure deterministic ordering
    world.normalize_order();
}

/// IDs of live bikes that hit another bike or a lethal trail this frame
fn find_crashes(world: &World) -> Vec<u32> {
    let mut crashed = Vec::new();
    let hitboxes: Vec<_> = world.players.iter().map(|p| p.hitbox()).collect();

    for (i, a) in world.players.iter().enumerate() {
        for (j, b) in world.players.iter().enumerate().skip(i + 1) {
            if a.is_locked() && b.is_locked() {
                continue;
            }
            if obb_overlap(&hitboxes[i], &hitboxes[j]) {
                log::debug!("Bikes {} and {} collided", a.id, b.id);
                crashed.push(a.id);
                crashed.push(b.id);
            }
        }
    }

    for (i, player) in world.players.iter().enumerate() {
        if player.is_locked() {
            continue;
        }
        let hit_trail = world.trails.iter().find(|trail| {
            trail.is_collidable()
                && (world.tuning.self_collision || !trail.is_owned_by(player.id))
                && obb_overlap(&hitboxes[i], &trail.hitbox())
        });
        if let Some(trail) = hit_trail {
            log::debug!("Bike {} hit trail {}", player.id, trail.id);
            crashed.push(player.id);
        }
    }

    crashed.sort_unstable();
    crashed.dedup();
    crashed
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::*;
    use crate::sim::input::Key;
    use crate::sim::player::Livery;
    use crate::sim::state::{GameEvent, PlayerSpec};
    use crate::tuning::Tuning;

    fn world_with(tuning: Tuning) -> World {
        World::new(tuning, Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT), 7)
    }

    fn bike(pos: Vec2, rotation: f32, controllable: bool) -> PlayerSpec {
        PlayerSpec {
            pos,
            rotation,
            livery: Livery::Cyan,
            controllable,
        }
    }

    fn count_trail_spawns(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::TrailSpawned { .. }))
            .count()
    }

    #[test]
    fn test_held_throttle_moves_bike() {
        let mut world = world_with(Tuning::default());
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 90.0, true));
        world.key_down(id, Key::Up);
        for _ in 0..10 {
            tick(&mut world, SIM_DT);
        }
        let p = world.player(id).unwrap();
        assert_eq!(p.magnitude, 51.0);
        assert!(p.pos.x > 100.0);
        assert!((p.pos.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_idle_bike_never_moves() {
        let mut world = world_with(Tuning::default());
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 0.0, true));
        for _ in 0..500 {
            tick(&mut world, SIM_DT);
        }
        let p = world.player(id).unwrap();
        assert_eq!(p.vel, Vec2::ZERO);
        assert_eq!(p.pos, Vec2::new(100.0, 100.0));
        assert!(world.trails.is_empty());
    }

    #[test]
    fn test_trail_threshold_is_inclusive() {
        // Hold speed constant so the threshold is tested exactly
        let tuning = Tuning {
            magnitude_increment: 0.0,
            ..Tuning::default()
        };

        let mut world = world_with(tuning.clone());
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 90.0, true));
        world.player_mut(id).unwrap().magnitude = 150.0;
        world.key_down(id, Key::Up);
        tick(&mut world, SIM_DT);
        assert_eq!(count_trail_spawns(&world.drain_events()), 1);
        assert_eq!(world.player(id).unwrap().trails.len(), 1);

        let mut world = world_with(tuning);
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 90.0, true));
        world.player_mut(id).unwrap().magnitude = 149.0;
        world.key_down(id, Key::Up);
        tick(&mut world, SIM_DT);
        assert_eq!(count_trail_spawns(&world.drain_events()), 0);
    }

    #[test]
    fn test_wrap_after_motion() {
        let mut world = world_with(Tuning::default());
        let id = world.spawn_player(bike(Vec2::new(VIEWPORT_WIDTH + 1.0, 100.0), 0.0, true));
        tick(&mut world, SIM_DT);
        assert_eq!(world.player(id).unwrap().pos.x, -BIKE_SIZE);
    }

    #[test]
    fn test_overlapping_bikes_both_explode_once() {
        let mut world = world_with(Tuning::default());
        let a = world.spawn_player(bike(Vec2::new(200.0, 200.0), 0.0, true));
        let b = world.spawn_player(bike(Vec2::new(204.0, 200.0), 0.0, false));

        tick(&mut world, SIM_DT);
        tick(&mut world, SIM_DT);

        assert!(world.player(a).unwrap().is_locked());
        assert!(world.player(b).unwrap().is_locked());
        let events = world.drain_events();
        let exploded: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PlayerExploded { player, .. } => Some(*player),
                _ => None,
            })
            .collect();
        assert_eq!(exploded, vec![a, b]);
        assert_eq!(world.explosions.len(), 2);
    }

    #[test]
    fn test_locked_bike_ignores_keys_and_is_removed() {
        let mut world = world_with(Tuning::default());
        let a = world.spawn_player(bike(Vec2::new(200.0, 200.0), 0.0, true));
        world.spawn_player(bike(Vec2::new(204.0, 200.0), 0.0, false));
        tick(&mut world, SIM_DT);
        assert!(world.player(a).unwrap().is_locked());

        world.key_down(a, Key::Up);
        world.key_down(a, Key::Left);
        for _ in 0..4 {
            tick(&mut world, SIM_DT);
            assert_eq!(world.player(a).unwrap().vel, Vec2::ZERO);
        }

        // 100 ms destroy delay at 50 Hz
        tick(&mut world, SIM_DT);
        assert!(world.player(a).is_none());
        assert!(world
            .drain_events()
            .contains(&GameEvent::PlayerDestroyed { player: a }));
    }

    #[test]
    fn test_explosion_fades_and_expires() {
        let mut world = world_with(Tuning::default());
        let a = world.spawn_player(bike(Vec2::new(200.0, 200.0), 0.0, false));
        world.explode_player(a);

        // Fade starts after 1000 ms, expiry at 1500 ms
        for _ in 0..60 {
            tick(&mut world, SIM_DT);
        }
        let explosion = &world.explosions[0];
        assert!(explosion.alpha < 1.0);
        assert_eq!(explosion.frame, EXPLOSION_FRAMES - 1);

        for _ in 0..15 {
            tick(&mut world, SIM_DT);
        }
        assert!(world.explosions.is_empty());
    }

    #[test]
    fn test_trail_lifecycle() {
        let tuning = Tuning {
            trail_activation_ms: 100,
            trail_timeout_ms: 200,
            trail_fade_ms: 100,
            ..Tuning::default()
        };
        let mut world = world_with(tuning);
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 0.0, true));
        let trail = world.spawn_trail(id).unwrap();

        for _ in 0..4 {
            tick(&mut world, SIM_DT);
        }
        assert!(!world.trail(trail).unwrap().active);
        tick(&mut world, SIM_DT);
        assert!(world.trail(trail).unwrap().active);

        // 10 ticks active, then a 5 tick fade
        for _ in 0..12 {
            tick(&mut world, SIM_DT);
        }
        let fading = world.trail(trail).unwrap();
        assert!(fading.alpha < 1.0);
        assert!(fading.active);

        for _ in 0..3 {
            tick(&mut world, SIM_DT);
        }
        assert!(world.trail(trail).is_none());
        assert!(world.player(id).unwrap().trails.is_empty());
    }

    #[test]
    fn test_own_trail_is_safe_unless_self_collision() {
        for self_collision in [false, true] {
            let tuning = Tuning {
                self_collision,
                ..Tuning::default()
            };
            let mut world = world_with(tuning);
            let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 0.0, true));
            let trail = world.spawn_trail(id).unwrap();
            // Activation takes 10 ticks; the bike sits on its own trail the whole time
            for _ in 0..10 {
                tick(&mut world, SIM_DT);
            }
            assert!(world.trail(trail).unwrap().active);
            assert_eq!(world.player(id).unwrap().is_locked(), self_collision);
        }
    }

    #[test]
    fn test_active_foreign_trail_is_lethal() {
        let mut world = world_with(Tuning::default());
        let layer = world.spawn_player(bike(Vec2::new(100.0, 100.0), 0.0, false));
        let trail = world.spawn_trail(layer).unwrap();
        // Move the layer away, then park a victim on the trail
        world.player_mut(layer).unwrap().pos = Vec2::new(500.0, 500.0);
        let victim = world.spawn_player(bike(Vec2::new(100.0, 100.0), 0.0, false));

        for _ in 0..9 {
            tick(&mut world, SIM_DT);
        }
        assert!(!world.trail(trail).unwrap().active);
        assert!(!world.player(victim).unwrap().is_locked());

        tick(&mut world, SIM_DT);
        assert!(world.player(victim).unwrap().is_locked());
        assert!(!world.player(layer).unwrap().is_locked());
    }

    #[test]
    fn test_orphaned_trail_outlives_owner() {
        let mut world = world_with(Tuning::default());
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 0.0, false));
        let trail = world.spawn_trail(id).unwrap();
        world.destroy_player(id);
        for _ in 0..20 {
            tick(&mut world, SIM_DT);
        }
        let orphan = world.trail(trail).unwrap();
        assert!(orphan.active);
        assert_eq!(orphan.owner, None);
    }

    #[test]
    fn test_paused_world_is_frozen() {
        let mut world = world_with(Tuning::default());
        let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 90.0, true));
        world.key_down(id, Key::Up);
        world.pause();
        for _ in 0..10 {
            tick(&mut world, SIM_DT);
        }
        assert_eq!(world.time_ticks, 0);
        assert_eq!(world.player(id).unwrap().pos, Vec2::new(100.0, 100.0));
        world.unpause();
        tick(&mut world, SIM_DT);
        assert_eq!(world.time_ticks, 1);
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed and inputs end identical
        let run = || {
            let mut world = world_with(Tuning::default());
            let id = world.spawn_player(bike(Vec2::new(100.0, 100.0), 90.0, true));
            world.spawn_player(bike(Vec2::new(600.0, 110.0), 0.0, false));
            world.key_down(id, Key::Up);
            for i in 0..200 {
                if i == 50 {
                    world.key_down(id, Key::Right);
                }
                if i == 60 {
                    world.key_up(id, Key::Right);
                }
                tick(&mut world, SIM_DT);
            }
            world
        };

        let a = run();
        let b = run();
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.players.len(), b.players.len());
        assert_eq!(a.trails.len(), b.trails.len());
        for (pa, pb) in a.players.iter().zip(&b.players) {
            assert_eq!(pa.pos, pb.pos);
            assert_eq!(pa.rotation, pb.rotation);
        }
        for (ea, eb) in a.explosions.iter().zip(&b.explosions) {
            assert_eq!(ea.rotation, eb.rotation);
        }
    }
}

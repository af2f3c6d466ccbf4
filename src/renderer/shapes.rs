//! Shape generation for 2D primitives
//!
//! Everything is built in viewport pixels (y down) and converted to NDC by the
//! render state.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors, with_alpha};
use crate::consts::{BIKE_HITBOX_MAX, BIKE_HITBOX_MIN, EXPLOSION_FRAMES, EXPLOSION_SIZE};
use crate::sim::{Collidable, Explosion, Obb, Player, Positionable, Rotatable, Trail, World};

/// Grid line spacing in pixels
const GRID_SPACING: f32 = 64.0;

/// Map a viewport pixel position to normalized device coordinates
pub fn viewport_to_ndc(viewport: Vec2, p: Vec2) -> Vec2 {
    Vec2::new(p.x / viewport.x * 2.0 - 1.0, 1.0 - p.y / viewport.y * 2.0)
}

/// Push two triangles covering a quad given in winding order
fn push_quad(vertices: &mut Vec<Vertex>, corners: [Vec2; 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    for p in [a, b, c, a, c, d] {
        vertices.push(Vertex::new(p.x, p.y, color));
    }
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Faint background grid
pub fn grid(viewport: Vec2) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let mut x = GRID_SPACING;
    while x < viewport.x {
        push_quad(
            &mut vertices,
            [
                Vec2::new(x, 0.0),
                Vec2::new(x + 1.0, 0.0),
                Vec2::new(x + 1.0, viewport.y),
                Vec2::new(x, viewport.y),
            ],
            colors::GRID,
        );
        x += GRID_SPACING;
    }
    let mut y = GRID_SPACING;
    while y < viewport.y {
        push_quad(
            &mut vertices,
            [
                Vec2::new(0.0, y),
                Vec2::new(viewport.x, y),
                Vec2::new(viewport.x, y + 1.0),
                Vec2::new(0.0, y + 1.0),
            ],
            colors::GRID,
        );
        y += GRID_SPACING;
    }
    vertices
}

/// Bike body (the hitbox strip) with a canopy at the front
pub fn bike(player: &Player) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(12);
    // Exploding bikes are drawn dimmed under their explosion
    let alpha = if player.is_locked() { 0.4 } else { 1.0 };
    let body = player.livery.trail_color();
    push_quad(&mut vertices, player.hitbox().corners(), with_alpha(body, alpha));

    let (min, max) = (Vec2::from(BIKE_HITBOX_MIN), Vec2::from(BIKE_HITBOX_MAX));
    let canopy = Obb::from_local_rect(
        player.pos(),
        player.origin(),
        player.rotation(),
        Vec2::new(min.x + 3.0, min.y + 4.0),
        Vec2::new(max.x - 3.0, min.y + 12.0),
    );
    push_quad(&mut vertices, canopy.corners(), with_alpha(colors::BIKE_CANOPY, alpha));
    vertices
}

/// A trail segment in its owner's colour
pub fn trail(trail: &Trail) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    // Not yet collidable segments are drawn at half strength
    let strength = if trail.active { 1.0 } else { 0.5 };
    let color = with_alpha(trail.livery.trail_color(), trail.alpha * strength);
    push_quad(&mut vertices, trail.hitbox().corners(), color);
    vertices
}

/// Explosion flare growing with the animation frame, plus a hot core
pub fn explosion(explosion: &Explosion) -> Vec<Vertex> {
    let progress = (explosion.frame + 1) as f32 / EXPLOSION_FRAMES as f32;
    let size = EXPLOSION_SIZE * progress;
    let inset = (EXPLOSION_SIZE - size) * 0.5;
    let flare = Obb::from_local_rect(
        explosion.pos(),
        explosion.origin(),
        explosion.rotation(),
        Vec2::splat(inset),
        Vec2::splat(inset + size),
    );

    let mut vertices = Vec::new();
    push_quad(
        &mut vertices,
        flare.corners(),
        with_alpha(colors::EXPLOSION_FLARE, explosion.alpha),
    );
    vertices.extend(circle(
        explosion.centre(),
        size * 0.3,
        with_alpha(colors::EXPLOSION_CORE, explosion.alpha * (1.0 - progress * 0.5)),
        16,
    ));
    vertices
}

/// Every vertex for one frame: grid, trails, bikes, then explosions on top
pub fn world_vertices(world: &World) -> Vec<Vertex> {
    let mut vertices = grid(world.viewport);
    for t in &world.trails {
        vertices.extend(trail(t));
    }
    for p in &world.players {
        vertices.extend(bike(p));
    }
    for e in &world.explosions {
        vertices.extend(explosion(e));
    }
    vertices
}

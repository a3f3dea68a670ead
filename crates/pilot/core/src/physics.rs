//! Deterministic per-tick kinematics shared by the reactive predictor and the
//! planner rollouts.
//!
//! Order within a step is fixed: turn, thrust, clamp to max speed, friction,
//! integrate, wrap.

use crate::action::MoveAction;
use crate::config::ShipParams;
use crate::geometry::{Arena, Vec2};
use crate::world::{CraftState, KinematicBody, Projectile};

/// Advances the craft by one sub-step under `action`.
pub fn step_craft(craft: &mut CraftState, action: MoveAction, ship: &ShipParams, arena: &Arena) {
    let dt = ship.dt;
    craft.heading += action.turn().sign() * ship.rotation_rate * dt;

    let mut velocity = craft.body.velocity;
    if action.thrust() {
        velocity += Vec2::from_angle(craft.heading) * (ship.thrust * dt);
    }
    let speed = velocity.length();
    if speed > ship.max_speed {
        velocity = velocity * (ship.max_speed / speed);
    }
    velocity = velocity * ship.friction;

    craft.body.velocity = velocity;
    craft.body.position = arena.wrap(craft.body.position + velocity * dt);
}

/// Moves a body along its own velocity and wraps it.
pub fn advect(body: &mut KinematicBody, dt: f64, arena: &Arena) {
    body.position = arena.wrap(body.position + body.velocity * dt);
}

/// Advects every projectile one tick and drops the expired ones.
pub fn step_projectiles(projectiles: &mut Vec<Projectile>, dt: f64, arena: &Arena) {
    projectiles.retain_mut(|p| {
        advect(&mut p.body, dt, arena);
        p.lifetime = p.lifetime.saturating_sub(1);
        p.lifetime > 0
    });
}

/// Circle overlap under wrap.
pub fn collides(a: &KinematicBody, b: &KinematicBody, arena: &Arena) -> bool {
    arena.distance(a.position, b.position) < a.radius + b.radius
}

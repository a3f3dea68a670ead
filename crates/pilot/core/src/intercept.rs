//! Closed-form lead aim for constant-speed projectiles.

use crate::geometry::{Arena, Vec2};

/// Below this magnitude the quadratic coefficient is treated as zero.
const LINEAR_EPSILON: f64 = 1e-6;

/// A solved shot: when the projectile meets the target and where to point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intercept {
    /// Time of flight in ticks.
    pub time: f64,
    /// Unit aim direction.
    pub direction: Vec2,
    /// Aim angle in radians.
    pub angle: f64,
}

/// Relative kinematics of a target as seen from the shooter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterceptProblem {
    /// Wrapped target position minus shooter position.
    pub offset: Vec2,
    /// Target velocity minus shooter velocity.
    pub relative_velocity: Vec2,
    pub projectile_speed: f64,
}

impl InterceptProblem {
    pub fn new(
        arena: &Arena,
        shooter: (Vec2, Vec2),
        target: (Vec2, Vec2),
        projectile_speed: f64,
    ) -> Self {
        Self {
            offset: arena.delta(shooter.0, target.0).vector(),
            relative_velocity: target.1 - shooter.1,
            projectile_speed,
        }
    }

    /// Smallest strictly positive meeting time, or `None` if the projectile
    /// can never reach the target.
    pub fn solve(&self) -> Option<Intercept> {
        let r = self.offset;
        let w = self.relative_velocity;
        let s = self.projectile_speed;

        let a = w.dot(w) - s * s;
        let b = 2.0 * r.dot(w);
        let c = r.dot(r);

        let time = if a.abs() < LINEAR_EPSILON {
            if b.abs() < f64::EPSILON {
                return None;
            }
            let t = -c / b;
            (t > 0.0).then_some(t)?
        } else {
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                return None;
            }
            let root = disc.sqrt();
            let t1 = (-b - root) / (2.0 * a);
            let t2 = (-b + root) / (2.0 * a);
            match (t1 > 0.0, t2 > 0.0) {
                (true, true) => t1.min(t2),
                (true, false) => t1,
                (false, true) => t2,
                (false, false) => return None,
            }
        };

        let direction = (r + w * time).normalized()?;
        Some(Intercept {
            time,
            direction,
            angle: direction.angle(),
        })
    }
}

/// Convenience wrapper over [`InterceptProblem::solve`].
pub fn solve_intercept(
    arena: &Arena,
    shooter: (Vec2, Vec2),
    target: (Vec2, Vec2),
    projectile_speed: f64,
) -> Option<Intercept> {
    InterceptProblem::new(arena, shooter, target, projectile_speed).solve()
}

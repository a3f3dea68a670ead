use std::f64::consts::FRAC_PI_2;

use tracing::trace;

use super::{BehaviorContext, Steering};
use crate::aim::{gate_bounds, only_large_left};
use crate::geometry::normalize_angle;
use crate::intercept::solve_intercept;
use crate::steering::PdGains;
use crate::world::{Boss, Hazard, HazardSize};

enum Quarry<'a> {
    Rock(&'a Hazard),
    Boss(&'a Boss),
}

/// Chases the most valuable target. A boss inside its engagement ring's
/// outer edge comes first, matching the aim plan's target choice; otherwise
/// the smallest rock, then the nearest; the nearest boss when no rocks remain.
pub fn hunt(ctx: &BehaviorContext<'_>) -> Steering {
    let snapshot = ctx.snapshot;
    let arena = &snapshot.arena;
    let craft = &snapshot.craft;
    let origin = craft.position();

    let nearest_boss = snapshot.bosses.iter().min_by(|a, b| {
        arena
            .distance(origin, a.body.position)
            .total_cmp(&arena.distance(origin, b.body.position))
    });
    let engaged_boss = nearest_boss
        .filter(|b| arena.distance(origin, b.body.position) < ctx.config.boss.ring_outer);

    let quarry = engaged_boss
        .map(Quarry::Boss)
        .or_else(|| {
            snapshot
                .hazards
                .iter()
                .min_by(|a, b| {
                    b.size.rank().cmp(&a.size.rank()).then_with(|| {
                        arena
                            .distance(origin, a.body.position)
                            .total_cmp(&arena.distance(origin, b.body.position))
                    })
                })
                .map(Quarry::Rock)
        })
        .or_else(|| nearest_boss.map(Quarry::Boss));
    let Some(quarry) = quarry else {
        return Steering::IDLE;
    };

    let body = match quarry {
        Quarry::Rock(h) => h.body,
        Quarry::Boss(b) => b.body,
    };
    let ship = &ctx.config.ship;
    let Some(shot) = solve_intercept(
        arena,
        (origin, craft.velocity()),
        (body.position, body.velocity),
        ship.projectile_speed,
    ) else {
        return Steering::IDLE;
    };
    let ok_lifetime = shot.time <= f64::from(ship.projectile_lifetime);

    let gains = &ctx.config.steering;
    let hunt_cfg = &ctx.config.hunt;
    let steer = ctx.controller.steer(
        ctx.heading(),
        ctx.previous_heading,
        shot.angle,
        PdGains {
            kp: gains.aim_kp,
            kd: gains.aim_kd,
        },
    );
    let aligned = steer.aligned(hunt_cfg.aligned_tolerance);
    let delta = arena.delta(origin, body.position);
    let dist = delta.distance;

    match quarry {
        Quarry::Boss(_) => {
            let boss_cfg = &ctx.config.boss;
            let in_range = dist > boss_cfg.ring_inner && dist < boss_cfg.ring_outer;
            let mut out = Steering {
                turn: steer.turn,
                fire: ok_lifetime && in_range && aligned,
                ..Steering::IDLE
            };

            if dist < boss_cfg.ring_outer {
                let radial = delta.vector() * (1.0 / (dist + 1e-6));
                let velocity = craft.velocity();
                let inbound = velocity.dot(radial);
                let radial_angle = delta.bearing();

                if dist < boss_cfg.ring_inner || inbound < boss_cfg.inbound_speed {
                    let tangential = velocity.dot(radial.perp());
                    let tangent = if tangential >= 0.0 {
                        radial_angle + FRAC_PI_2
                    } else {
                        radial_angle - FRAC_PI_2
                    };
                    let orbit = ctx.controller.steer(
                        ctx.heading(),
                        ctx.previous_heading,
                        tangent,
                        PdGains {
                            kp: gains.orbit_kp,
                            kd: gains.orbit_kd,
                        },
                    );
                    trace!(dist, inbound, tangent, "orbiting boss");
                    out.turn = orbit.turn;
                    out.thrust = true;
                    out.holds_heading = true;
                } else if dist > boss_cfg.ring_outer - boss_cfg.drift_margin {
                    let approach_error = normalize_angle(radial_angle - ctx.heading()).abs();
                    out.thrust = approach_error < hunt_cfg.drift_alignment;
                }
            }
            out
        }
        Quarry::Rock(rock) => {
            let gates = if snapshot.hazards.len() <= hunt_cfg.sparse_count {
                &hunt_cfg.sparse_gates
            } else {
                &hunt_cfg.gates
            };
            let only_large = only_large_left(snapshot);
            let (min, max) = gate_bounds(gates, rock.size, only_large);
            let in_range = dist > min && dist < max;

            let small_count = snapshot
                .hazards
                .iter()
                .filter(|h| h.size == HazardSize::Small)
                .count();
            let cleanup = small_count >= hunt_cfg.cleanup_small_count;
            let large_kick = only_large && steer.error.abs() < hunt_cfg.large_kick_tolerance;

            Steering {
                thrust: true,
                turn: steer.turn,
                fire: ok_lifetime && in_range && (aligned || cleanup || large_kick),
                holds_heading: false,
                captured: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use crate::action::Turn;
    use crate::behavior::test_support::*;
    use crate::config::PilotConfig;
    use crate::geometry::Vec2;
    use crate::world::{BossKind, EntityId, KinematicBody};

    use super::*;

    fn rock(id: u32, x: f64, y: f64, size: HazardSize) -> Hazard {
        Hazard::new(
            EntityId(id),
            KinematicBody::new(Vec2::new(x, y), Vec2::ZERO, size.radius()),
            size,
        )
    }

    fn run_hunt(snap: &crate::world::WorldSnapshot, previous: f64) -> Steering {
        let config = PilotConfig::default();
        let assessment = assess(snap, &config);
        let ctx = BehaviorContext {
            snapshot: snap,
            assessment: &assessment,
            config: &config,
            controller: controller(&config),
            previous_heading: previous,
            pickup: None,
        };
        hunt(&ctx)
    }

    #[test]
    fn fires_at_aligned_small_rock_in_range() {
        let snap = snapshot(500.0, 500.0, 0.0).with_hazard(rock(1, 700.0, 500.0, HazardSize::Small));
        let s = run_hunt(&snap, 0.0);
        assert!(s.fire);
        assert!(s.thrust);
        assert_eq!(s.turn, Turn::None);
    }

    #[test]
    fn large_rock_too_close_is_held() {
        let snap = snapshot(500.0, 500.0, 0.0)
            .with_hazard(rock(1, 700.0, 500.0, HazardSize::Large))
            .with_hazard(rock(2, 500.0, 1300.0, HazardSize::Medium))
            .with_hazard(rock(3, 1300.0, 1300.0, HazardSize::Medium))
            .with_hazard(rock(4, 1300.0, 500.0, HazardSize::Medium));
        // Medium rocks rank higher; point at the nearest medium instead.
        let s = run_hunt(&snap, 0.0);
        assert!(s.thrust);

        let lone = snapshot(500.0, 500.0, 0.0)
            .with_hazard(rock(1, 700.0, 500.0, HazardSize::Large))
            .with_hazard(rock(2, 1500.0, 1500.0, HazardSize::Large))
            .with_hazard(rock(3, 100.0, 1500.0, HazardSize::Large))
            .with_hazard(rock(4, 1500.0, 100.0, HazardSize::Large));
        let s = run_hunt(&lone, 0.0);
        assert!(!s.fire);
    }

    #[test]
    fn orbits_boss_inside_keep_out() {
        let boss = Boss::new(EntityId(9), BossKind::Standard, Vec2::new(650.0, 500.0));
        let snap = snapshot(500.0, 500.0, 0.0).with_boss(boss);
        let s = run_hunt(&snap, 0.0);

        assert!(s.holds_heading);
        assert!(s.thrust);
        assert!(!s.fire);
        // Tangent of a boss bearing 0 is ±π/2; from a nose at 0 the
        // controller must turn rather than keep approaching.
        assert_ne!(s.turn, Turn::None);
    }

    #[test]
    fn fires_at_boss_in_ring_without_orbiting() {
        let boss = Boss::new(EntityId(9), BossKind::Tank, Vec2::new(1100.0, 500.0));
        let snap = snapshot(500.0, 500.0, 0.0).with_boss(boss);
        let s = run_hunt(&snap, 0.0);
        assert!(s.fire);
        assert!(!s.holds_heading);
    }

    #[test]
    fn boss_in_the_ring_outranks_small_rocks() {
        let boss = Boss::new(EntityId(9), BossKind::Tank, Vec2::new(500.0, 1100.0));
        let snap = snapshot(500.0, 500.0, 0.0)
            .with_hazard(rock(1, 700.0, 500.0, HazardSize::Small))
            .with_boss(boss);
        let s = run_hunt(&snap, 0.0);

        // Boss bears +π/2 (y down); the nose turns toward it instead of
        // firing at the aligned rock.
        assert_eq!(s.turn, Turn::Right);
        assert!(!s.fire);

        let far = Boss::new(EntityId(9), BossKind::Tank, Vec2::new(1500.0, 1500.0));
        let snap = snapshot(500.0, 500.0, 0.0)
            .with_hazard(rock(1, 700.0, 500.0, HazardSize::Small))
            .with_boss(far);
        assert!(run_hunt(&snap, 0.0).fire);
    }

    #[test]
    fn drifts_back_toward_distant_boss_only_when_facing_it() {
        let boss = Boss::new(EntityId(9), BossKind::Tank, Vec2::new(1350.0, 500.0));
        let facing = run_hunt(&snapshot(500.0, 500.0, 0.0).with_boss(boss), 0.0);
        assert!(facing.thrust);

        let away = run_hunt(&snapshot(500.0, 500.0, PI).with_boss(boss), PI);
        assert!(!away.thrust);
    }
}

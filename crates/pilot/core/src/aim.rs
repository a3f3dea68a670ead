//! Per-tick firing solution, computed independently of the movement behavior.

use std::f64::consts::PI;

use crate::config::{PilotConfig, RangeGates};
use crate::geometry::normalize_angle;
use crate::intercept::solve_intercept;
use crate::threat::Approach;
use crate::world::{BossKind, EntityId, HazardSize, KinematicBody, WorldSnapshot};

/// What the aim plan is pointed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AimTarget {
    Hazard { id: EntityId, size: HazardSize },
    Boss { id: EntityId, kind: BossKind },
}

impl AimTarget {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Hazard { id, .. } | Self::Boss { id, .. } => *id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimPlan {
    pub target: AimTarget,
    /// Lead angle, or the direct bearing when no intercept exists.
    pub angle: f64,
    /// Time of flight in ticks; `None` for a direct-aim fallback.
    pub time_of_flight: Option<f64>,
    pub distance: f64,
    pub ok_lifetime: bool,
    pub in_range: bool,
}

impl AimPlan {
    /// Heading error allowed before firing.
    pub fn fire_tolerance(&self, config: &PilotConfig, evade_utility: f64) -> f64 {
        let aim = &config.aim;
        if evade_utility > aim.pressure_threshold {
            return aim.pressured_tolerance;
        }
        match self.target {
            AimTarget::Hazard {
                size: HazardSize::Small,
                ..
            } => aim.small_tolerance,
            AimTarget::Hazard {
                size: HazardSize::Medium,
                ..
            } => aim.medium_tolerance,
            _ => aim.large_tolerance,
        }
    }

    /// True when every gate passes and the nose is within tolerance.
    pub fn should_fire(&self, heading: f64, config: &PilotConfig, evade_utility: f64) -> bool {
        if !(self.ok_lifetime && self.in_range) {
            return false;
        }
        let error = normalize_angle(self.angle - heading).abs();
        error < self.fire_tolerance(config, evade_utility)
    }
}

/// Picks the most attractive target and solves the shot against it.
pub fn compute_aim_plan(snapshot: &WorldSnapshot, config: &PilotConfig) -> Option<AimPlan> {
    let arena = &snapshot.arena;
    let craft = &snapshot.craft;
    let boss_cfg = &config.boss;

    let alignment = |bearing: f64| {
        (1.0 - normalize_angle(bearing - craft.heading).abs() / PI).max(0.0)
    };

    let mut best: Option<(f64, AimTarget, KinematicBody)> = None;
    let mut consider = |score: f64, target: AimTarget, body: KinematicBody| {
        if best.as_ref().is_none_or(|(s, _, _)| score > *s) {
            best = Some((score, target, body));
        }
    };

    for hazard in &snapshot.hazards {
        let delta = arena.delta(craft.position(), hazard.body.position);
        let d = delta.distance;
        let relative_velocity = hazard.body.velocity - craft.velocity();
        let relative_speed = relative_velocity.length();

        let reach = craft.body.radius + hazard.body.radius;
        let on_course =
            Approach::from_relative(delta.vector(), relative_velocity).distance_sq < reach * reach;

        let score = f64::from(hazard.size.rank()) * 10.0
            + alignment(delta.bearing()) * 20.0
            + (10.0 - relative_speed * 0.5).max(0.0)
            + if on_course { 15.0 } else { 0.0 }
            - if d < 200.0 {
                0.0
            } else {
                ((d - 200.0) * 0.05).min(30.0)
            };
        consider(
            score,
            AimTarget::Hazard {
                id: hazard.id,
                size: hazard.size,
            },
            hazard.body,
        );
    }

    for boss in &snapshot.bosses {
        let delta = arena.delta(craft.position(), boss.body.position);
        let d = delta.distance;
        if d < boss_cfg.keep_out || !boss_cfg.in_ring(d) {
            continue;
        }
        let score = 80.0
            + alignment(delta.bearing()) * 30.0
            + (50.0 - (d - boss_cfg.ring_centre()).abs() * 0.1).max(0.0);
        consider(
            score,
            AimTarget::Boss {
                id: boss.id,
                kind: boss.kind,
            },
            boss.body,
        );
    }

    let (target, body) = match best {
        Some((_, target, body)) => (target, body),
        None => {
            let boss = snapshot.bosses.first()?;
            (
                AimTarget::Boss {
                    id: boss.id,
                    kind: boss.kind,
                },
                boss.body,
            )
        }
    };

    let ship = &config.ship;
    let delta = arena.delta(craft.position(), body.position);
    let (angle, time_of_flight) = match solve_intercept(
        arena,
        (craft.position(), craft.velocity()),
        (body.position, body.velocity),
        ship.projectile_speed,
    ) {
        Some(shot) => (shot.angle, Some(shot.time)),
        None if delta.distance <= config.aim.direct_aim_range => (delta.bearing(), None),
        None => return None,
    };

    let (min, max) = match target {
        AimTarget::Boss { .. } => (boss_cfg.keep_out, boss_cfg.ring_outer),
        AimTarget::Hazard { size, .. } => {
            gate_bounds(&config.aim.gates, size, only_large_left(snapshot))
        }
    };

    Some(AimPlan {
        target,
        angle,
        time_of_flight,
        distance: delta.distance,
        ok_lifetime: time_of_flight.is_none_or(|t| t <= f64::from(ship.projectile_lifetime)),
        in_range: delta.distance > min && delta.distance < max,
    })
}

/// Non-empty rock field consisting solely of large rocks.
pub(crate) fn only_large_left(snapshot: &WorldSnapshot) -> bool {
    !snapshot.hazards.is_empty()
        && snapshot
            .hazards
            .iter()
            .all(|h| h.size == HazardSize::Large)
}

pub(crate) fn gate_bounds(gates: &RangeGates, size: HazardSize, only_large: bool) -> (f64, f64) {
    let min = match size {
        HazardSize::Large => gates.large_min,
        HazardSize::Medium => gates.medium_min,
        HazardSize::Small => gates.small_min,
    };
    let max = if only_large {
        gates.max_only_large
    } else {
        gates.max
    };
    (min, max)
}

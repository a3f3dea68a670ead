//! Feature extraction for the arbiter.
//!
//! Reduces a threat assessment and the pickup field to the handful of counts
//! and scores the utility model reads, including the pickup choice that the
//! collect behavior later flies to.

use crate::config::PickupConfig;
use crate::threat::ThreatAssessment;
use crate::world::{Loadout, Pickup, PickupKind, WorldSnapshot};

/// Inputs to the utility model, extracted from one tick's threats and pickups.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecisionFeatures {
    pub emergency_count: usize,
    pub immediate_count: usize,
    /// Hostile projectiles due to hit within the projectile window.
    pub incoming_projectiles: usize,
    pub boss_emergency: bool,
    pub threat_count: usize,
    /// Best pickup worth going for, if any.
    pub pickup: Option<PickupChoice>,
}

impl DecisionFeatures {
    pub fn extract(
        assessment: &ThreatAssessment,
        snapshot: &WorldSnapshot,
        pickups: &PickupConfig,
    ) -> Self {
        Self {
            emergency_count: assessment.emergency_count(),
            immediate_count: assessment.immediate_count(),
            incoming_projectiles: assessment.incoming_projectile_count(),
            boss_emergency: assessment.boss_emergency,
            threat_count: assessment.len(),
            pickup: best_pickup(snapshot, pickups),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupChoice {
    pub pickup: Pickup,
    pub distance: f64,
    /// Desirability scaled by proximity.
    pub score: f64,
}

/// Base desirability of `kind` plus bonuses for what the craft lacks.
pub fn pickup_desirability(kind: PickupKind, snapshot: &WorldSnapshot, config: &PickupConfig) -> f64 {
    let mut desire = kind.base_desirability();
    if kind == PickupKind::Shield && !snapshot.craft.loadout.contains(Loadout::SHIELD) {
        desire += config.shield_bonus;
    }
    if !snapshot.bosses.is_empty() {
        desire += config.boss_bonus;
    }
    if snapshot.hazards.len() >= config.crowd_threshold {
        desire += config.crowd_bonus;
    }
    desire
}

/// Highest-scoring reachable pickup. Pickups past `max_distance` are ignored.
pub fn best_pickup(snapshot: &WorldSnapshot, config: &PickupConfig) -> Option<PickupChoice> {
    let origin = snapshot.craft.position();
    let mut best: Option<PickupChoice> = None;

    for pickup in &snapshot.pickups {
        let distance = snapshot.arena.distance(origin, pickup.position);
        if distance > config.max_distance {
            continue;
        }
        let score = pickup_desirability(pickup.kind, snapshot, config)
            * (1.0 - distance / config.max_distance);
        if score > best.map_or(0.0, |b| b.score) {
            best = Some(PickupChoice {
                pickup: *pickup,
                distance,
                score,
            });
        }
    }

    best
}

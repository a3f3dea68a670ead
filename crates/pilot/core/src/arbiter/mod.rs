//! Utility-based behavior arbitration.
//!
//! Every tick the arbiter scores the fixed behavior menu from a set of
//! [`DecisionFeatures`] and picks the highest utility.
//!
//! # Determinism
//!
//! Selection is a pure function of the [`UtilityVector`]. Behaviors are
//! evaluated in declaration order and a later behavior only wins with a
//! strictly greater utility, so exact ties always resolve to the earlier one.
//!
//! # Telemetry
//!
//! [`UtilityArbiter`] remembers the previous and current behavior and counts
//! how often the choice changed. None of that history feeds back into the
//! next selection.

mod features;

pub use features::{DecisionFeatures, PickupChoice, best_pickup, pickup_desirability};

use strum::IntoEnumIterator;

use crate::config::UtilityWeights;

/// The fixed behavior menu, in tie-breaking order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Behavior {
    Evade,
    Avoid,
    Hunt,
    Collect,
    Patrol,
}

/// One utility per behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtilityVector {
    pub evade: f64,
    pub avoid: f64,
    pub hunt: f64,
    pub collect: f64,
    pub patrol: f64,
}

impl UtilityVector {
    /// Scores every behavior as a weighted linear combination of features.
    pub fn evaluate(features: &DecisionFeatures, weights: &UtilityWeights) -> Self {
        let emergency = features.emergency_count as f64;
        let immediate = features.immediate_count as f64;
        let projectiles = features.incoming_projectiles as f64;
        let boss = if features.boss_emergency { 1.0 } else { 0.0 };

        let evade = weights.evade_emergency * emergency
            + weights.evade_immediate * immediate
            + weights.evade_projectile * projectiles
            + weights.evade_boss * boss;
        let avoid = weights.avoid_immediate * immediate;
        let hunt = if features.threat_count > 0
            && features.emergency_count == 0
            && !features.boss_emergency
        {
            weights.hunt_base
        } else {
            0.0
        };
        let collect = features.pickup.as_ref().map_or(0.0, |choice| {
            weights.collect_floor.max(hunt - weights.collect_offset)
                + weights.collect_score * choice.score
        });
        let patrol = if features.threat_count == 0 {
            weights.patrol_idle
        } else {
            0.0
        };

        Self {
            evade,
            avoid,
            hunt,
            collect,
            patrol,
        }
    }

    pub fn get(&self, behavior: Behavior) -> f64 {
        match behavior {
            Behavior::Evade => self.evade,
            Behavior::Avoid => self.avoid,
            Behavior::Hunt => self.hunt,
            Behavior::Collect => self.collect,
            Behavior::Patrol => self.patrol,
        }
    }

    /// Every behavior paired with its utility, in menu order.
    pub fn iter(&self) -> impl Iterator<Item = (Behavior, f64)> + '_ {
        Behavior::iter().map(move |b| (b, self.get(b)))
    }
}

/// Result of one arbitration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub behavior: Behavior,
    pub utility: f64,
    /// True when this tick's behavior differs from the previous tick's.
    pub changed: bool,
}

/// Behavior selector with observability state.
#[derive(Clone, Debug, Default)]
pub struct UtilityArbiter {
    current: Option<Behavior>,
    previous: Option<Behavior>,
    changes: u64,
}

impl UtilityArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argmax over the menu; the first-enumerated behavior wins exact ties.
    pub fn select(utilities: &UtilityVector) -> (Behavior, f64) {
        let mut best = (Behavior::Evade, f64::NEG_INFINITY);

        for (behavior, utility) in utilities.iter() {
            tracing::trace!(%behavior, utility, "utility");
            if utility > best.1 {
                best = (behavior, utility);
            }
        }

        best
    }

    /// Selects a behavior and records it for telemetry.
    pub fn decide(&mut self, utilities: &UtilityVector) -> Decision {
        let (behavior, utility) = Self::select(utilities);
        let changed = self.current != Some(behavior);
        if changed {
            self.changes += 1;
            tracing::debug!(
                from = ?self.current,
                to = %behavior,
                utility,
                "behavior changed"
            );
        }
        self.previous = self.current.replace(behavior);

        Decision {
            behavior,
            utility,
            changed,
        }
    }

    pub fn current(&self) -> Option<Behavior> {
        self.current
    }

    pub fn previous(&self) -> Option<Behavior> {
        self.previous
    }

    /// Number of times the selected behavior changed.
    pub fn change_count(&self) -> u64 {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> DecisionFeatures {
        DecisionFeatures::default()
    }

    #[test]
    fn empty_field_patrols() {
        let u = UtilityVector::evaluate(&features(), &UtilityWeights::default());
        assert_eq!(UtilityArbiter::select(&u).0, Behavior::Patrol);
        assert_eq!(u.patrol, 0.25);
    }

    #[test]
    fn distant_threat_hunts() {
        let f = DecisionFeatures {
            threat_count: 3,
            ..features()
        };
        let u = UtilityVector::evaluate(&f, &UtilityWeights::default());
        assert_eq!(UtilityArbiter::select(&u), (Behavior::Hunt, 0.55));
    }

    #[test]
    fn emergency_evades_and_suppresses_hunt() {
        let f = DecisionFeatures {
            threat_count: 1,
            emergency_count: 1,
            immediate_count: 1,
            ..features()
        };
        let u = UtilityVector::evaluate(&f, &UtilityWeights::default());
        assert_eq!(u.hunt, 0.0);
        assert!((u.evade - 0.75).abs() < 1e-12);
        assert_eq!(UtilityArbiter::select(&u).0, Behavior::Evade);
    }

    #[test]
    fn boss_emergency_dominates() {
        let f = DecisionFeatures {
            threat_count: 1,
            boss_emergency: true,
            ..features()
        };
        let u = UtilityVector::evaluate(&f, &UtilityWeights::default());
        assert_eq!(u.evade, 2.0);
        assert_eq!(UtilityArbiter::select(&u).0, Behavior::Evade);
    }

    #[test]
    fn ties_go_to_first_enumerated() {
        let u = UtilityVector {
            evade: 0.3,
            avoid: 0.3,
            hunt: 0.3,
            collect: 0.3,
            patrol: 0.3,
        };
        for _ in 0..10 {
            assert_eq!(UtilityArbiter::select(&u).0, Behavior::Evade);
        }

        let u = UtilityVector {
            hunt: 0.5,
            collect: 0.5,
            ..UtilityVector::default()
        };
        assert_eq!(UtilityArbiter::select(&u).0, Behavior::Hunt);
    }

    #[test]
    fn telemetry_tracks_changes_without_affecting_choice() {
        let mut arbiter = UtilityArbiter::new();
        let hunt = UtilityVector {
            hunt: 0.55,
            ..UtilityVector::default()
        };
        let patrol = UtilityVector {
            patrol: 0.25,
            ..UtilityVector::default()
        };

        assert!(arbiter.decide(&hunt).changed);
        assert!(!arbiter.decide(&hunt).changed);
        let d = arbiter.decide(&patrol);
        assert!(d.changed);
        assert_eq!(d.behavior, Behavior::Patrol);
        assert_eq!(arbiter.previous(), Some(Behavior::Hunt));
        assert_eq!(arbiter.current(), Some(Behavior::Patrol));
        assert_eq!(arbiter.change_count(), 2);
    }
}

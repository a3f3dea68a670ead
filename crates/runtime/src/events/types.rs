//! Event payloads published on the bus.

use serde::{Deserialize, Serialize};

use pilot_core::Behavior;

/// Why a planner response did not become the active plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// Computed for a session epoch that has since been reset.
    StaleEpoch,
    /// Every tick of the plan was already in the past on arrival.
    Exhausted,
    /// The active plan came from a newer snapshot.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannerEvent {
    Requested {
        epoch: u64,
        tick: u64,
        horizon: u32,
        urgent: bool,
    },
    /// The request queue was full; the tick went on without a new request.
    RequestDropped { epoch: u64, tick: u64 },
    Completed {
        epoch: u64,
        origin_tick: u64,
        score: f64,
        generations: u32,
        evaluated: usize,
        elapsed_us: u64,
        budget_exhausted: bool,
    },
    Failed { epoch: u64, origin_tick: u64, message: String },
    Adopted {
        epoch: u64,
        origin_tick: u64,
        tick: u64,
        skipped: usize,
        score: f64,
    },
    Discarded {
        epoch: u64,
        origin_tick: u64,
        tick: u64,
        reason: DiscardReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionEvent {
    BehaviorChanged {
        tick: u64,
        from: Option<Behavior>,
        to: Behavior,
        utility: f64,
    },
    /// The session was reset and its epoch advanced.
    SessionReset { epoch: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_kind_tag() {
        let event = PlannerEvent::Discarded {
            epoch: 3,
            origin_tick: 120,
            tick: 131,
            reason: DiscardReason::StaleEpoch,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "discarded");
        assert_eq!(json["reason"], "stale_epoch");

        let back: PlannerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}

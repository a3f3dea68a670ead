//! Per-tick consumption of planner output.

use tracing::debug;

use crate::action::MoveAction;
use crate::planner::PlannedSequence;

/// A planned sequence expanded to one action per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    actions: Vec<MoveAction>,
    score: f64,
    /// Tick of the snapshot the plan was computed from.
    origin_tick: u64,
}

impl Plan {
    pub fn from_sequence(sequence: &PlannedSequence, origin_tick: u64) -> Self {
        let repeat = sequence.control_repeat.max(1) as usize;
        let actions = sequence
            .actions
            .iter()
            .flat_map(|&a| std::iter::repeat_n(a, repeat))
            .collect();
        Self {
            actions,
            score: sequence.score,
            origin_tick,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn origin_tick(&self) -> u64 {
        self.origin_tick
    }

    pub fn actions(&self) -> &[MoveAction] {
        &self.actions
    }
}

/// What happened to a plan offered to the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Adoption {
    /// Now active; `skipped` ticks were dropped to catch up with the host.
    Adopted { skipped: usize },
    /// Every tick of the plan already lies in the past.
    Exhausted,
    /// The active plan was computed from a newer snapshot.
    Superseded,
}

/// Owns the active plan and a cursor that only moves forward.
#[derive(Clone, Debug, Default)]
pub struct PlanExecutor {
    plan: Option<Plan>,
    cursor: usize,
}

impl PlanExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers `plan` at host tick `now`. Ticks elapsed since the plan's
    /// snapshot are skipped.
    pub fn adopt(&mut self, plan: Plan, now: u64) -> Adoption {
        if let Some(active) = &self.plan
            && self.cursor < active.len()
            && active.origin_tick > plan.origin_tick
        {
            debug!(
                active = active.origin_tick,
                offered = plan.origin_tick,
                "plan superseded"
            );
            return Adoption::Superseded;
        }

        let skipped = now.saturating_sub(plan.origin_tick) as usize;
        if skipped >= plan.len() {
            debug!(origin = plan.origin_tick, now, len = plan.len(), "plan exhausted on arrival");
            return Adoption::Exhausted;
        }

        self.plan = Some(plan);
        self.cursor = skipped;
        Adoption::Adopted { skipped }
    }

    /// Action for the current tick; advances the cursor.
    pub fn next_action(&mut self) -> Option<MoveAction> {
        let action = self.peek()?;
        self.cursor += 1;
        Some(action)
    }

    pub fn peek(&self) -> Option<MoveAction> {
        self.plan.as_ref()?.actions.get(self.cursor).copied()
    }

    pub fn is_active(&self) -> bool {
        self.peek().is_some()
    }

    pub fn remaining(&self) -> usize {
        self.plan
            .as_ref()
            .map_or(0, |p| p.len().saturating_sub(self.cursor))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn clear(&mut self) {
        self.plan = None;
        self.cursor = 0;
    }
}

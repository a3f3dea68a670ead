//! Planner throughput and handoff statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Counters shared between the planner worker and the session.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct PlannerMetrics {
    /// Requests handed to the worker
    requested: AtomicU64,

    /// Requests that could not be queued because one was already waiting
    dropped_requests: AtomicU64,

    /// Queued requests replaced by a newer one before the worker got to them
    superseded_requests: AtomicU64,

    /// Searches that produced a plan
    completed: AtomicU64,

    /// Searches that returned an error or whose blocking task died
    failed: AtomicU64,

    /// Plans that became active
    adopted: AtomicU64,

    /// Responses from a previous session epoch
    stale_responses: AtomicU64,

    /// Same-epoch plans rejected as exhausted or superseded
    discarded_plans: AtomicU64,

    /// Searches that ran out of time budget
    budget_exhausted: AtomicU64,

    /// Rollouts evaluated across all searches
    evaluated: AtomicU64,

    /// Total search time (nanoseconds)
    total_planning_nanos: AtomicU64,
}

impl PlannerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_request(&self) {
        self.dropped_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded_request(&self) {
        self.superseded_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a finished search.
    pub fn record_completion(&self, elapsed: Duration, evaluated: usize, budget_exhausted: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.evaluated.fetch_add(evaluated as u64, Ordering::Relaxed);
        self.total_planning_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
        if budget_exhausted {
            self.budget_exhausted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_adoption(&self) {
        self.adopted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_response(&self) {
        self.stale_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded_plan(&self) {
        self.discarded_plans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn adopted(&self) -> u64 {
        self.adopted.load(Ordering::Relaxed)
    }

    pub fn stale_responses(&self) -> u64 {
        self.stale_responses.load(Ordering::Relaxed)
    }

    /// Average wall-clock time per completed search.
    pub fn avg_planning_time(&self) -> Duration {
        let completed = self.completed();
        if completed == 0 {
            Duration::ZERO
        } else {
            let total_nanos = self.total_planning_nanos.load(Ordering::Relaxed);
            Duration::from_nanos(total_nanos / completed)
        }
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Individual fields are read atomically; the snapshot as a whole may mix
    /// values from concurrent updates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requested: self.requested(),
            dropped_requests: self.dropped_requests.load(Ordering::Relaxed),
            superseded_requests: self.superseded_requests.load(Ordering::Relaxed),
            completed: self.completed(),
            failed: self.failed(),
            adopted: self.adopted(),
            stale_responses: self.stale_responses(),
            discarded_plans: self.discarded_plans.load(Ordering::Relaxed),
            budget_exhausted: self.budget_exhausted.load(Ordering::Relaxed),
            evaluated: self.evaluated.load(Ordering::Relaxed),
            avg_planning_time: self.avg_planning_time(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requested: u64,
    pub dropped_requests: u64,
    pub superseded_requests: u64,
    pub completed: u64,
    pub failed: u64,
    pub adopted: u64,
    pub stale_responses: u64,
    pub discarded_plans: u64,
    pub budget_exhausted: u64,
    pub evaluated: u64,
    pub avg_planning_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_ignores_failures() {
        let metrics = PlannerMetrics::new();
        assert_eq!(metrics.avg_planning_time(), Duration::ZERO);

        metrics.record_completion(Duration::from_millis(4), 100, false);
        metrics.record_completion(Duration::from_millis(2), 50, true);
        metrics.record_failure();

        let snap = metrics.snapshot();
        assert_eq!(snap.completed, 2);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.evaluated, 150);
        assert_eq!(snap.budget_exhausted, 1);
        assert_eq!(snap.avg_planning_time, Duration::from_millis(3));
    }
}

//! Planner worker that owns the [`pilot_core::Planner`].
//!
//! Receives [`PlanJob`]s from the session, runs each search on the blocking
//! thread pool, and sends a [`PlanResponse`] back. Only the newest queued job
//! is served; older ones are dropped unserved.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pilot_core::{PlanError, PlanOutcome, PlanRequest, Planner, PlannerConfig};

use super::metrics::PlannerMetrics;
use crate::events::{EventBus, PlannerEvent};

/// A request tagged with the session epoch it belongs to.
#[derive(Debug, Clone)]
pub struct PlanJob {
    pub epoch: u64,
    pub request: PlanRequest,
}

impl PlanJob {
    pub fn origin_tick(&self) -> u64 {
        self.request.snapshot.tick
    }
}

/// Why a job produced no plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanFailure {
    #[error(transparent)]
    Rejected(#[from] PlanError),

    #[error("planning task aborted: {0}")]
    Aborted(String),
}

/// Worker reply for one job.
#[derive(Debug, Clone)]
pub struct PlanResponse {
    pub epoch: u64,
    pub origin_tick: u64,
    pub outcome: Result<PlanOutcome, PlanFailure>,
}

/// Background task that serves planning jobs.
pub struct PlannerWorker {
    config: PlannerConfig,
    planner: Option<Planner>,
    current_epoch: Option<u64>,
    request_rx: mpsc::Receiver<PlanJob>,
    response_tx: mpsc::Sender<PlanResponse>,
    event_bus: EventBus,
    metrics: Arc<PlannerMetrics>,
}

impl PlannerWorker {
    pub fn new(
        config: PlannerConfig,
        request_rx: mpsc::Receiver<PlanJob>,
        response_tx: mpsc::Sender<PlanResponse>,
        event_bus: EventBus,
        metrics: Arc<PlannerMetrics>,
    ) -> Self {
        info!(
            population = config.population,
            generations = config.generations,
            fidelity = %config.fidelity,
            seeded = config.seed.is_some(),
            "PlannerWorker initialized"
        );

        Self {
            planner: Some(Planner::new(config)),
            config,
            current_epoch: None,
            request_rx,
            response_tx,
            event_bus,
            metrics,
        }
    }

    /// Main worker loop. Ends when the session drops its request sender or
    /// stops listening for responses.
    pub async fn run(mut self) {
        while let Some(mut job) = self.request_rx.recv().await {
            while let Ok(newer) = self.request_rx.try_recv() {
                debug!(
                    dropped = job.origin_tick(),
                    newer = newer.origin_tick(),
                    "superseded queued plan request"
                );
                self.metrics.record_superseded_request();
                job = newer;
            }

            let response = self.serve(job).await;
            if self.response_tx.send(response).await.is_err() {
                debug!("plan response receiver dropped");
                break;
            }
        }

        info!("PlannerWorker shutting down");
    }

    async fn serve(&mut self, job: PlanJob) -> PlanResponse {
        let epoch = job.epoch;
        let origin_tick = job.origin_tick();

        let mut planner = self
            .planner
            .take()
            .unwrap_or_else(|| Planner::new(self.config));
        if self.current_epoch != Some(epoch) {
            planner.reset();
            self.current_epoch = Some(epoch);
        }

        let joined = tokio::task::spawn_blocking(move || {
            let outcome = planner.plan(&job.request);
            (planner, outcome)
        })
        .await;

        let outcome = match joined {
            Ok((planner, outcome)) => {
                self.planner = Some(planner);
                outcome
            }
            Err(err) => {
                // The planner went down with the task; a fresh one is built on
                // the next job.
                warn!(error = %err, epoch, origin_tick, "planning task failed");
                self.metrics.record_failure();
                self.event_bus.publish(PlannerEvent::Failed {
                    epoch,
                    origin_tick,
                    message: err.to_string(),
                });
                return PlanResponse {
                    epoch,
                    origin_tick,
                    outcome: Err(PlanFailure::Aborted(err.to_string())),
                };
            }
        };

        match &outcome {
            Ok(result) => {
                let stats = &result.stats;
                self.metrics
                    .record_completion(stats.elapsed, stats.evaluated, stats.budget_exhausted);
                self.event_bus.publish(PlannerEvent::Completed {
                    epoch,
                    origin_tick,
                    score: result.sequence.score,
                    generations: stats.generations,
                    evaluated: stats.evaluated,
                    elapsed_us: stats.elapsed.as_micros() as u64,
                    budget_exhausted: stats.budget_exhausted,
                });
            }
            Err(err) => {
                warn!(error = %err, epoch, origin_tick, "planning request rejected");
                self.metrics.record_failure();
                self.event_bus.publish(PlannerEvent::Failed {
                    epoch,
                    origin_tick,
                    message: err.to_string(),
                });
            }
        }

        PlanResponse {
            epoch,
            origin_tick,
            outcome: outcome.map_err(PlanFailure::from),
        }
    }
}

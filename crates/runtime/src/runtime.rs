//! High-level runtime orchestrator.
//!
//! The runtime owns the planner worker, wires up the request/response
//! channels, and hands the tick loop a [`PilotSession`] to drive.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use pilot_core::{PilotOutput, WorldSnapshot};

use crate::api::{PlannerHandle, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::session::PilotSession;
use crate::workers::{MetricsSnapshot, PlanJob, PlanResponse, PlannerMetrics, PlannerWorker};

/// Autopilot runtime: a session for the game loop plus the background planner.
///
/// Must be built inside a Tokio runtime; the planner searches on Tokio's
/// blocking pool.
pub struct PilotRuntime {
    session: PilotSession,
    event_bus: EventBus,
    metrics: Arc<PlannerMetrics>,
    planner_worker_handle: Option<JoinHandle<()>>,
}

impl PilotRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Decide the controls for one game tick. Never blocks.
    pub fn tick(&mut self, snapshot: &WorldSnapshot) -> PilotOutput {
        self.session.tick(snapshot)
    }

    /// Drop every plan tied to the current life. Call on respawn.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn session(&self) -> &PilotSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PilotSession {
        &mut self.session
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Shutdown the runtime gracefully.
    ///
    /// Dropping the session closes the request channel, which ends the
    /// worker loop once its current search returns.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.session);

        if let Some(handle) = self.planner_worker_handle {
            handle.await.map_err(RuntimeError::WorkerJoin)?;
        }

        info!("pilot runtime stopped");
        Ok(())
    }
}

/// Builder for [`PilotRuntime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Run with or without the planner worker
    pub fn enable_planner(mut self, enable: bool) -> Self {
        self.config.enable_planner = enable;
        self
    }

    pub async fn build(self) -> Result<PilotRuntime> {
        self.config.validate()?;

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let metrics = Arc::new(PlannerMetrics::new());

        let (planner, planner_worker_handle) = if self.config.enable_planner {
            let (request_tx, request_rx) =
                mpsc::channel::<PlanJob>(self.config.request_buffer.max(1));
            let (response_tx, response_rx) =
                mpsc::channel::<PlanResponse>(self.config.response_buffer.max(1));

            let worker = PlannerWorker::new(
                self.config.planner,
                request_rx,
                response_tx,
                event_bus.clone(),
                Arc::clone(&metrics),
            );
            let handle = tokio::spawn(async move {
                worker.run().await;
            });

            (
                Some(PlannerHandle::new(request_tx, response_rx)),
                Some(handle),
            )
        } else {
            info!("planner disabled; pilot runs reactively");
            (None, None)
        };

        let session = PilotSession::new(
            self.config,
            planner,
            event_bus.clone(),
            Arc::clone(&metrics),
        )?;

        Ok(PilotRuntime {
            session,
            event_bus,
            metrics,
            planner_worker_handle,
        })
    }
}

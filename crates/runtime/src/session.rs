//! Non-blocking pilot session for the host's fixed-timestep loop.
//!
//! Every [`PilotSession::tick`] polls finished plans, maybe queues a new
//! request, takes the planned action for the tick and runs the reactive
//! [`Autopilot`]. Nothing in here awaits; a slow or missing planner only
//! means the reactive layer keeps full control.
//!
//! Plans carry the session epoch they were requested under. [`reset`]
//! advances the epoch, so anything still in flight for the old one is
//! dropped when it arrives.
//!
//! [`reset`]: PilotSession::reset

use std::sync::Arc;

use tracing::{debug, info, warn};

use pilot_core::{Adoption, Autopilot, Plan, PlanExecutor, PlanRequest, PilotOutput, WorldSnapshot};

use crate::api::{PlannerHandle, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{DecisionEvent, DiscardReason, EventBus, PlannerEvent};
use crate::workers::{PlanResponse, PlannerMetrics};

pub struct PilotSession {
    config: RuntimeConfig,
    autopilot: Autopilot,
    executor: PlanExecutor,
    planner: Option<PlannerHandle>,
    event_bus: EventBus,
    metrics: Arc<PlannerMetrics>,
    epoch: u64,
    in_flight: bool,
    last_request_tick: Option<u64>,
}

impl PilotSession {
    pub(crate) fn new(
        config: RuntimeConfig,
        planner: Option<PlannerHandle>,
        event_bus: EventBus,
        metrics: Arc<PlannerMetrics>,
    ) -> Result<Self> {
        let autopilot = Autopilot::new(config.pilot)?;
        Ok(Self {
            config,
            autopilot,
            executor: PlanExecutor::new(),
            planner,
            event_bus,
            metrics,
            epoch: 0,
            in_flight: false,
            last_request_tick: None,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn executor(&self) -> &PlanExecutor {
        &self.executor
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight
    }

    /// False once the planner is disabled or its worker has gone away.
    pub fn has_planner(&self) -> bool {
        self.planner.is_some()
    }

    /// Decides the controls for `snapshot.tick`.
    pub fn tick(&mut self, snapshot: &WorldSnapshot) -> PilotOutput {
        self.poll_responses(snapshot.tick);
        self.maybe_request(snapshot);

        let planned = self.executor.next_action();
        let output = self.autopilot.decide(snapshot, planned);

        if output.telemetry.behavior_changed {
            self.event_bus.publish(DecisionEvent::BehaviorChanged {
                tick: snapshot.tick,
                from: self.autopilot.arbiter().previous(),
                to: output.telemetry.behavior,
                utility: output.telemetry.utilities.get(output.telemetry.behavior),
            });
        }
        output
    }

    /// Starts a new epoch: the active plan, any in-flight response and the
    /// autopilot's per-life state are all dropped. Call on respawn or mode
    /// change.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.executor.clear();
        self.autopilot.reset();
        self.in_flight = false;
        self.last_request_tick = None;

        info!(epoch = self.epoch, "pilot session reset");
        self.event_bus
            .publish(DecisionEvent::SessionReset { epoch: self.epoch });
    }

    fn poll_responses(&mut self, now: u64) {
        let Some(planner) = self.planner.as_mut() else {
            return;
        };
        let mut responses = Vec::new();
        while let Some(response) = planner.try_recv() {
            responses.push(response);
        }
        let closed = planner.is_closed();
        for response in responses {
            self.accept(response, now);
        }
        if closed {
            warn!(epoch = self.epoch, "planner worker stopped; continuing reactively");
            self.planner = None;
            self.in_flight = false;
        }
    }

    fn accept(&mut self, response: PlanResponse, now: u64) {
        let PlanResponse {
            epoch,
            origin_tick,
            outcome,
        } = response;

        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, origin_tick, "dropping stale-epoch plan");
            self.metrics.record_stale_response();
            self.event_bus.publish(PlannerEvent::Discarded {
                epoch,
                origin_tick,
                tick: now,
                reason: DiscardReason::StaleEpoch,
            });
            return;
        }
        self.in_flight = false;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, origin_tick, "no plan this cycle; staying reactive");
                return;
            }
        };

        let score = outcome.sequence.score;
        let plan = Plan::from_sequence(&outcome.sequence, origin_tick);
        match self.executor.adopt(plan, now) {
            Adoption::Adopted { skipped } => {
                self.metrics.record_adoption();
                self.event_bus.publish(PlannerEvent::Adopted {
                    epoch,
                    origin_tick,
                    tick: now,
                    skipped,
                    score,
                });
            }
            rejected => {
                let reason = match rejected {
                    Adoption::Exhausted => DiscardReason::Exhausted,
                    _ => DiscardReason::Superseded,
                };
                self.metrics.record_discarded_plan();
                self.event_bus.publish(PlannerEvent::Discarded {
                    epoch,
                    origin_tick,
                    tick: now,
                    reason,
                });
            }
        }
    }

    fn maybe_request(&mut self, snapshot: &WorldSnapshot) {
        let Some(planner) = self.planner.as_ref() else {
            return;
        };
        if self.in_flight {
            return;
        }

        let now = snapshot.tick;
        let cadence = self.config.cadence.select(snapshot);
        let consumed = self.last_request_tick.map(|last| now.saturating_sub(last));
        if consumed.is_some_and(|elapsed| elapsed < cadence.interval) {
            return;
        }

        let mut request = PlanRequest::new(snapshot.clone(), cadence.horizon)
            .with_ship(self.config.pilot.ship)
            .with_control_repeat(self.config.control_repeat)
            .with_samples(self.config.planner.population)
            .with_ticks_consumed(u32::try_from(consumed.unwrap_or(0)).unwrap_or(u32::MAX));
        if let Some(budget) = self.config.time_budget {
            request = request.with_time_budget(budget);
        }

        let job = crate::workers::PlanJob {
            epoch: self.epoch,
            request,
        };
        match planner.try_submit(job) {
            Ok(()) => {
                self.in_flight = true;
                self.last_request_tick = Some(now);
                self.metrics.record_request();
                self.event_bus.publish(PlannerEvent::Requested {
                    epoch: self.epoch,
                    tick: now,
                    horizon: cadence.horizon,
                    urgent: cadence.urgent,
                });
            }
            Err(RuntimeError::PlannerBusy) => {
                self.metrics.record_dropped_request();
                self.event_bus.publish(PlannerEvent::RequestDropped {
                    epoch: self.epoch,
                    tick: now,
                });
            }
            Err(err) => {
                warn!(error = %err, "planner unavailable; continuing reactively");
                self.planner = None;
                self.in_flight = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use pilot_core::{Arena, CraftState, MovementSource, ShipParams, Vec2};

    use super::*;
    use crate::workers::PlanJob;

    fn open_space(tick: u64) -> WorldSnapshot {
        WorldSnapshot::new(
            Arena::new(1600.0, 1200.0),
            CraftState::new(Vec2::new(800.0, 600.0), Vec2::ZERO, 0.0, 15.0),
        )
        .at_tick(tick)
    }

    fn session(
        config: RuntimeConfig,
    ) -> (
        PilotSession,
        mpsc::Receiver<PlanJob>,
        mpsc::Sender<PlanResponse>,
    ) {
        let (request_tx, request_rx) = mpsc::channel(1);
        let (response_tx, response_rx) = mpsc::channel(1);
        let session = PilotSession::new(
            config,
            Some(PlannerHandle::new(request_tx, response_rx)),
            EventBus::new(),
            Arc::new(PlannerMetrics::new()),
        )
        .unwrap();
        (session, request_rx, response_tx)
    }

    #[test]
    fn requests_plan_for_the_piloted_hull() {
        let mut config = RuntimeConfig::default();
        config.pilot.ship = ShipParams {
            radius: 40.0,
            max_speed: 3.0,
            ..ShipParams::new()
        };
        let calm_horizon = config.cadence.calm.horizon;
        let (mut session, mut requests, _responses) = session(config);

        session.tick(&open_space(0));

        let job = requests.try_recv().unwrap();
        assert_eq!(job.epoch, 0);
        assert_eq!(job.request.ship.radius, 40.0);
        assert_eq!(job.request.ship.max_speed, 3.0);
        assert_eq!(job.request.horizon, calm_horizon);
    }

    #[test]
    fn a_stopped_worker_releases_the_pending_request() {
        let (mut session, requests, responses) = session(RuntimeConfig::default());

        session.tick(&open_space(0));
        assert!(session.has_request_in_flight());

        drop(requests);
        drop(responses);
        let output = session.tick(&open_space(1));

        assert!(!session.has_planner());
        assert!(!session.has_request_in_flight());
        assert_eq!(output.telemetry.movement, MovementSource::Reactive);
    }
}

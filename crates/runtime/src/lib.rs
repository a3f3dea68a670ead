//! Runtime orchestration for the autopilot.
//!
//! Hosts a fixed-timestep game loop on one side and the population planner on
//! a Tokio worker on the other. The loop calls [`PilotRuntime::tick`] every
//! frame and always gets an answer immediately; plans arrive whenever the
//! worker finishes and are adopted, fast-forwarded or discarded by the
//! [`PilotSession`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`session`] is the tick-side state machine
//! - [`api`] exposes the handle and error types
//! - [`events`] provides the topic-based event bus
//! - [`config`] loads settings from the environment
//! - `workers` keeps the planner task internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;
pub mod session;

mod workers;

pub use api::{PlannerHandle, Result, RuntimeError};
pub use config::{Cadence, CadenceConfig, RuntimeConfig};
pub use events::{DecisionEvent, DiscardReason, Event, EventBus, PlannerEvent, Topic};
pub use runtime::{PilotRuntime, RuntimeBuilder};
pub use session::PilotSession;
pub use workers::{MetricsSnapshot, PlanFailure, PlanJob, PlanResponse, PlannerMetrics};

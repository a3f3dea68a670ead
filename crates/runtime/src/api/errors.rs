//! Error types surfaced by the runtime API.
//!
//! Wraps core validation failures and worker coordination failures so hosts
//! can bubble them up with one type.
use thiserror::Error;

use pilot_core::{ConfigError, PlanError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("a planning request is already queued")]
    PlannerBusy,

    #[error("planner worker request channel closed")]
    RequestChannelClosed,

    #[error("planner worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid runtime setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

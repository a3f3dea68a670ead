//! Error types for snapshot validation, planner requests, and configuration.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlanError>;

/// Reasons a planning request or snapshot is rejected before any search runs.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("arena dimensions must be finite and positive (got {width}x{height})")]
    InvalidArena { width: f64, height: f64 },

    #[error("snapshot contains a non-finite body")]
    NonFiniteBody,

    #[error("planning horizon must be at least one tick")]
    ZeroHorizon,

    #[error("control repeat must be at least one tick")]
    ZeroControlRepeat,

    #[error("horizon {horizon} is shorter than control repeat {control_repeat}")]
    HorizonShorterThanRepeat { horizon: u32, control_repeat: u32 },

    #[error("population must contain at least one sequence")]
    EmptyPopulation,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid tunables.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

impl ConfigError {
    pub(crate) fn check_positive(field: &'static str, value: f64) -> std::result::Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NotPositive { field, value })
        }
    }

    pub(crate) fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> std::result::Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}

//! Runtime configuration and environment loading.
use std::env;
use std::time::Duration;

use pilot_core::{Fidelity, PilotConfig, PlannerConfig, WorldSnapshot};

use crate::api::{Result, RuntimeError};

/// Replanning cadence chosen for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Ticks between planning requests.
    pub interval: u64,
    /// Planning horizon in ticks.
    pub horizon: u32,
    pub urgent: bool,
}

/// Adaptive replanning: short and frequent near danger, long and lazy
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceConfig {
    pub near_hazard: f64,
    pub near_boss: f64,
    pub urgent: Cadence,
    pub calm: Cadence,
}

impl CadenceConfig {
    pub const fn new() -> Self {
        Self {
            near_hazard: 220.0,
            near_boss: 400.0,
            urgent: Cadence {
                interval: 2,
                horizon: 30,
                urgent: true,
            },
            calm: Cadence {
                interval: 6,
                horizon: 60,
                urgent: false,
            },
        }
    }

    pub fn select(&self, snapshot: &WorldSnapshot) -> Cadence {
        let hazard_close = snapshot
            .nearest_hazard_distance()
            .is_some_and(|d| d < self.near_hazard);
        let boss_close = snapshot
            .nearest_boss_distance()
            .is_some_and(|d| d < self.near_boss);
        if hazard_close || boss_close {
            self.urgent
        } else {
            self.calm
        }
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime configuration shared across the session and the planner worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub pilot: PilotConfig,
    pub planner: PlannerConfig,
    pub cadence: CadenceConfig,
    /// Physics sub-steps each planned action is held for.
    pub control_repeat: u32,
    /// Wall-clock budget per search; `None` runs every generation.
    pub time_budget: Option<Duration>,
    /// Queued planning requests. One is enough: the worker only serves the
    /// newest.
    pub request_buffer: usize,
    pub response_buffer: usize,
    pub event_buffer_size: usize,
    /// Run the planner worker at all; without it the pilot is purely reactive.
    pub enable_planner: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pilot: PilotConfig::default(),
            planner: PlannerConfig::default(),
            cadence: CadenceConfig::default(),
            control_repeat: pilot_core::DEFAULT_CONTROL_REPEAT,
            time_budget: Some(Duration::from_millis(12)),
            request_buffer: 1,
            response_buffer: 4,
            event_buffer_size: 100,
            enable_planner: true,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PILOT_PLANNER` - Run the planner worker (default: true)
    /// - `PILOT_SEED` - Fixed planner RNG seed (default: OS entropy)
    /// - `PILOT_SAMPLES` - Planner population size (default: 100)
    /// - `PILOT_GENERATIONS` - Generations per search (default: 3)
    /// - `PILOT_FIDELITY` - `fast` or `full` boss modelling (default: fast)
    /// - `PILOT_TIME_BUDGET_MS` - Search budget in ms, 0 for none (default: 12)
    /// - `PILOT_CONTROL_REPEAT` - Sub-steps per planned action (default: 3)
    /// - `PILOT_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(enable) = parse::<bool>(&lookup, "PILOT_PLANNER")? {
            config.enable_planner = enable;
        }
        if let Some(seed) = parse::<u64>(&lookup, "PILOT_SEED")? {
            config.planner.seed = Some(seed);
        }
        if let Some(samples) = parse::<usize>(&lookup, "PILOT_SAMPLES")? {
            config.planner.population = samples;
        }
        if let Some(generations) = parse::<u32>(&lookup, "PILOT_GENERATIONS")? {
            config.planner.generations = generations;
        }
        if let Some(fidelity) = parse::<Fidelity>(&lookup, "PILOT_FIDELITY")? {
            config.planner.fidelity = fidelity;
        }
        if let Some(ms) = parse::<u64>(&lookup, "PILOT_TIME_BUDGET_MS")? {
            config.time_budget = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(repeat) = parse::<u32>(&lookup, "PILOT_CONTROL_REPEAT")? {
            config.control_repeat = repeat;
        }
        if let Some(capacity) = parse::<usize>(&lookup, "PILOT_EVENT_BUFFER")? {
            config.event_buffer_size = capacity.max(1);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.pilot.validate()?;
        self.planner.validate()?;
        if self.planner.population == 0 {
            return Err(RuntimeError::InvalidSetting {
                key: "planner.population",
                reason: "must be at least 1".into(),
            });
        }
        if self.control_repeat == 0 {
            return Err(RuntimeError::InvalidSetting {
                key: "control_repeat",
                reason: "must be at least 1".into(),
            });
        }
        for cadence in [self.cadence.urgent, self.cadence.calm] {
            if cadence.horizon < self.control_repeat {
                return Err(RuntimeError::InvalidSetting {
                    key: "cadence.horizon",
                    reason: format!(
                        "horizon {} is shorter than control repeat {}",
                        cadence.horizon, self.control_repeat
                    ),
                });
            }
        }
        Ok(())
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err: T::Err| RuntimeError::InvalidSetting {
            key,
            reason: err.to_string(),
        })
}

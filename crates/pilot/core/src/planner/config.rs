use crate::config::BossConfig;
use crate::error::ConfigError;

/// How faithfully rollouts model bosses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Fidelity {
    /// Bosses drift at their snapshot velocity.
    #[default]
    Fast,
    /// Bosses pursue the simulated craft and fire through their variant
    /// capabilities.
    Full,
}

/// Terms of the rollout objective.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringWeights {
    /// Score of any rollout that collides. Returned as-is.
    pub catastrophic_penalty: f64,
    /// Reward per pixel of clearance per sub-step.
    pub clearance_reward: f64,
    /// Clearance beyond this earns nothing more.
    pub clearance_cap: f64,
    pub safety_floor: f64,
    /// Multiplies the squared deficit below `safety_floor`.
    pub floor_penalty: f64,
    pub hard_floor: f64,
    /// Added once if the rollout ever dipped under `hard_floor`.
    pub hard_floor_penalty: f64,
    /// Reward per pixel closed toward the targeted pickup.
    pub pickup_progress: f64,
    pub pickup_bonus: f64,
    pub boss_danger_radius: f64,
    /// Penalty per px/tick of closing speed toward a boss inside the danger
    /// radius.
    pub boss_inbound_penalty: f64,
    /// Reward per sub-step spent inside the engagement ring.
    pub boss_ring_reward: f64,
    /// Half-angle of a boss's firing cone.
    pub firing_line_cone: f64,
    pub firing_line_range: f64,
    pub firing_line_penalty: f64,
    /// Penalty per coasting action.
    pub idle_penalty: f64,
    /// Penalty for reversing the turn direction between actions.
    pub turn_reversal_penalty: f64,
}

impl ScoringWeights {
    pub const CATASTROPHIC_PENALTY: f64 = -100_000.0;

    pub const fn new() -> Self {
        Self {
            catastrophic_penalty: Self::CATASTROPHIC_PENALTY,
            clearance_reward: 0.02,
            clearance_cap: 200.0,
            safety_floor: 40.0,
            floor_penalty: 0.5,
            hard_floor: 10.0,
            hard_floor_penalty: -5_000.0,
            pickup_progress: 2.0,
            pickup_bonus: 500.0,
            boss_danger_radius: 300.0,
            boss_inbound_penalty: 5.0,
            boss_ring_reward: 2.0,
            firing_line_cone: 0.2,
            firing_line_range: 700.0,
            firing_line_penalty: 10.0,
            idle_penalty: 0.5,
            turn_reversal_penalty: 1.0,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Population search parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    pub population: usize,
    pub generations: u32,
    pub elite_fraction: f64,
    pub crossover_probability: f64,
    pub mutation_rate: f64,
    /// Mutated copies of the shifted previous winner seeded each cycle.
    pub warm_start_mutants: usize,
    pub warm_start_mutation_rate: f64,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub fidelity: Fidelity,
    pub weights: ScoringWeights,
    pub boss: BossConfig,
}

impl PlannerConfig {
    pub const DEFAULT_POPULATION: usize = 100;
    pub const DEFAULT_GENERATIONS: u32 = 3;

    pub const fn new() -> Self {
        Self {
            population: Self::DEFAULT_POPULATION,
            generations: Self::DEFAULT_GENERATIONS,
            elite_fraction: 0.25,
            crossover_probability: 0.7,
            mutation_rate: 0.2,
            warm_start_mutants: 5,
            warm_start_mutation_rate: 0.15,
            seed: None,
            fidelity: Fidelity::Fast,
            weights: ScoringWeights::new(),
            boss: BossConfig::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fidelity(mut self, fidelity: Fidelity) -> Self {
        self.fidelity = fidelity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_range("planner.elite_fraction", self.elite_fraction, 0.0, 1.0)?;
        ConfigError::check_range(
            "planner.crossover_probability",
            self.crossover_probability,
            0.0,
            1.0,
        )?;
        ConfigError::check_range("planner.mutation_rate", self.mutation_rate, 0.0, 1.0)?;
        ConfigError::check_range(
            "planner.warm_start_mutation_rate",
            self.warm_start_mutation_rate,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new()
    }
}

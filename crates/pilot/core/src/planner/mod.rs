//! Receding-horizon planner: an anytime, elitist population search over
//! movement-only action sequences.
//!
//! Each call to [`Planner::plan`] seeds a population (warm start from the
//! previous winner plus attack, pickup and dodge biased modes), scores it by
//! forward simulation, and breeds the top quartile for a fixed number of
//! generations or until the time budget runs out. Elites keep their scores
//! across generations so the best score never decreases.

mod config;
mod rollout;
mod sequence;

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::action::{MoveAction, Turn};
use crate::config::ShipParams;
use crate::error::{PlanError, Result};
use crate::geometry::normalize_angle;
use crate::world::WorldSnapshot;

pub use config::{Fidelity, PlannerConfig, ScoringWeights};
pub use rollout::Rollout;
pub use sequence::ActionSequence;

/// Previous winners scoring at or below this are not reused.
const WARM_START_FLOOR: f64 = -1_000.0;

/// Default number of physics sub-steps each planned action is held for.
pub const DEFAULT_CONTROL_REPEAT: u32 = 3;

/// One planning job. The snapshot is owned so the request can cross threads.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRequest {
    pub snapshot: WorldSnapshot,
    /// Type parameters of the craft being planned for.
    pub ship: ShipParams,
    /// Horizon in ticks.
    pub horizon: u32,
    pub control_repeat: u32,
    /// Population size.
    pub samples: usize,
    pub time_budget: Option<Duration>,
    /// Ticks executed since the previous plan was requested; used to shift
    /// the warm-start winner.
    pub ticks_consumed: u32,
}

impl PlanRequest {
    pub fn new(snapshot: WorldSnapshot, horizon: u32) -> Self {
        Self {
            snapshot,
            ship: ShipParams::new(),
            horizon,
            control_repeat: DEFAULT_CONTROL_REPEAT,
            samples: PlannerConfig::DEFAULT_POPULATION,
            time_budget: None,
            ticks_consumed: 0,
        }
    }

    pub fn with_ship(mut self, ship: ShipParams) -> Self {
        self.ship = ship;
        self
    }

    pub fn with_control_repeat(mut self, control_repeat: u32) -> Self {
        self.control_repeat = control_repeat;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn with_ticks_consumed(mut self, ticks: u32) -> Self {
        self.ticks_consumed = ticks;
        self
    }

    /// Number of actions in each candidate sequence.
    pub fn sequence_len(&self) -> usize {
        (self.horizon / self.control_repeat.max(1)) as usize
    }

    pub fn validate(&self) -> Result<()> {
        self.snapshot.validate()?;
        self.ship.validate()?;
        if self.horizon == 0 {
            return Err(PlanError::ZeroHorizon);
        }
        if self.control_repeat == 0 {
            return Err(PlanError::ZeroControlRepeat);
        }
        if self.horizon < self.control_repeat {
            return Err(PlanError::HorizonShorterThanRepeat {
                horizon: self.horizon,
                control_repeat: self.control_repeat,
            });
        }
        if self.samples == 0 {
            return Err(PlanError::EmptyPopulation);
        }
        Ok(())
    }
}

/// The winning sequence of a search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannedSequence {
    pub actions: Vec<MoveAction>,
    pub score: f64,
    pub control_repeat: u32,
}

impl PlannedSequence {
    /// Ticks covered once every action is held for `control_repeat` ticks.
    pub fn ticks(&self) -> usize {
        self.actions.len() * self.control_repeat as usize
    }
}

/// Search instrumentation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanStats {
    pub generations: u32,
    pub evaluated: usize,
    /// Best score in the population after each generation.
    pub best_history: Vec<f64>,
    pub elapsed: Duration,
    pub budget_exhausted: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanOutcome {
    pub sequence: PlannedSequence,
    pub stats: PlanStats,
}

/// Stateful planner. Keeps its RNG and the previous winner between calls.
#[derive(Clone, Debug)]
pub struct Planner {
    config: PlannerConfig,
    rng: ChaCha8Rng,
    last_winner: Option<ActionSequence>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            last_winner: None,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Forgets the warm-start winner, e.g. after the craft respawns.
    pub fn reset(&mut self) {
        self.last_winner = None;
    }

    /// Runs one search. Always evaluates at least one candidate, so a valid
    /// request yields a plan even with a zero time budget.
    pub fn plan(&mut self, request: &PlanRequest) -> Result<PlanOutcome> {
        request.validate()?;
        self.config.validate()?;

        let started = Instant::now();
        let len = request.sequence_len();
        let config = self.config;
        let rollout = Rollout::new(
            &request.snapshot,
            &request.ship,
            &config,
            request.control_repeat,
        );
        let mut population = self.seed(request, len);
        let mut stats = PlanStats::default();
        let generations = self.config.generations.max(1);

        for generation in 0..generations {
            let exhausted = evaluate(&mut population, &rollout, request, started, &mut stats);
            sort_by_score(&mut population);
            stats.generations += 1;
            if let Some(best) = population.first().and_then(|s| s.score) {
                stats.best_history.push(best);
            }
            if exhausted {
                stats.budget_exhausted = true;
                break;
            }
            if generation + 1 < generations {
                population = self.breed(population, request.samples);
            }
        }
        stats.elapsed = started.elapsed();

        let winner = population
            .into_iter()
            .find(ActionSequence::is_scored)
            .ok_or(PlanError::EmptyPopulation)?;
        let score = winner.score.unwrap_or(self.config.weights.catastrophic_penalty);

        debug!(
            score,
            generations = stats.generations,
            evaluated = stats.evaluated,
            budget_exhausted = stats.budget_exhausted,
            elapsed_us = stats.elapsed.as_micros() as u64,
            "plan complete"
        );

        let sequence = PlannedSequence {
            actions: winner.actions.clone(),
            score,
            control_repeat: request.control_repeat,
        };
        self.last_winner = Some(winner);
        Ok(PlanOutcome { sequence, stats })
    }

    fn seed(&mut self, request: &PlanRequest, len: usize) -> Vec<ActionSequence> {
        let n = request.samples;
        let mut population = Vec::with_capacity(n);

        if let Some(previous) = &self.last_winner
            && previous.score.is_some_and(|s| s > WARM_START_FLOOR)
        {
            let steps = (request.ticks_consumed / request.control_repeat) as usize;
            let shifted = previous.shifted(steps, len);
            for _ in 0..self.config.warm_start_mutants {
                population.push(shifted.mutate(self.config.warm_start_mutation_rate, &mut self.rng));
            }
            population.insert(0, shifted);
        }

        let remaining = n.saturating_sub(population.len());
        let attack = remaining / 2;
        let pickup = remaining / 4;
        let evade = remaining / 4;

        for _ in 0..attack {
            population.push(ActionSequence::attack(len, &mut self.rng));
        }
        let approach = pickup_approach(&request.snapshot, &request.ship, request.control_repeat);
        for _ in 0..pickup {
            let seq = match approach {
                Some((turn, steps)) => ActionSequence::pursue(len, turn, steps, &mut self.rng),
                None => ActionSequence::random(len, &mut self.rng),
            };
            population.push(seq);
        }
        for _ in 0..evade {
            population.push(ActionSequence::dodge(len, &mut self.rng));
        }
        while population.len() < n {
            population.push(ActionSequence::random(len, &mut self.rng));
        }
        population.truncate(n);
        population
    }

    /// Keeps the elites (with their scores) and refills to `target` with
    /// crossover or mutation offspring.
    fn breed(&mut self, mut population: Vec<ActionSequence>, target: usize) -> Vec<ActionSequence> {
        let scored = population.iter().filter(|s| s.is_scored()).count();
        let elite_count = ((population.len() as f64 * self.config.elite_fraction) as usize)
            .max(1)
            .min(scored.max(1));
        population.truncate(elite_count);

        while population.len() < target {
            let a = self.rng.gen_range(0..elite_count);
            let child = if self.rng.gen_bool(self.config.crossover_probability) {
                let b = self.rng.gen_range(0..elite_count);
                ActionSequence::crossover(&population[a], &population[b], &mut self.rng)
            } else {
                population[a].mutate(self.config.mutation_rate, &mut self.rng)
            };
            population.push(child);
        }
        population
    }
}

/// Scores every unscored sequence. Returns `true` when the budget ran out
/// before the population was fully scored.
fn evaluate(
    population: &mut [ActionSequence],
    rollout: &Rollout<'_>,
    request: &PlanRequest,
    started: Instant,
    stats: &mut PlanStats,
) -> bool {
    for seq in population.iter_mut().filter(|s| !s.is_scored()) {
        let over_budget = request
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget);
        if over_budget && stats.evaluated > 0 {
            return true;
        }
        seq.score = Some(rollout.score(&seq.actions));
        stats.evaluated += 1;
    }
    false
}

fn sort_by_score(population: &mut [ActionSequence]) {
    population.sort_by(|a, b| {
        let a = a.score.unwrap_or(f64::NEG_INFINITY);
        let b = b.score.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}

/// Turn direction and number of actions needed to face the nearest pickup.
fn pickup_approach(
    snapshot: &WorldSnapshot,
    ship: &ShipParams,
    control_repeat: u32,
) -> Option<(Turn, usize)> {
    let craft = &snapshot.craft;
    let origin = craft.position();
    let target = snapshot
        .pickups
        .iter()
        .map(|p| snapshot.arena.delta(origin, p.position))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;

    let error = normalize_angle(target.bearing() - craft.heading);
    let turn = if error > 0.0 { Turn::Right } else { Turn::Left };
    let per_action = ship.rotation_rate * ship.dt * f64::from(control_repeat);
    let steps = (error.abs() / per_action).ceil() as usize;
    Some((turn, steps))
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Arena, Vec2};
    use crate::world::{CraftState, EntityId, Hazard, HazardSize, KinematicBody, Pickup, PickupKind};

    use super::*;

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot::new(
            Arena::new(2000.0, 2000.0),
            CraftState::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 0.0, 15.0),
        )
    }

    fn seeded() -> Planner {
        Planner::new(PlannerConfig::default().with_seed(11))
    }

    #[test]
    fn rejects_malformed_requests() {
        let mut planner = seeded();
        let snap = snapshot();

        let zero = PlanRequest::new(snap.clone(), 0);
        assert_eq!(planner.plan(&zero), Err(PlanError::ZeroHorizon));

        let repeat = PlanRequest::new(snap.clone(), 30).with_control_repeat(0);
        assert_eq!(planner.plan(&repeat), Err(PlanError::ZeroControlRepeat));

        let short = PlanRequest::new(snap.clone(), 2).with_control_repeat(3);
        assert_eq!(
            planner.plan(&short),
            Err(PlanError::HorizonShorterThanRepeat {
                horizon: 2,
                control_repeat: 3
            })
        );

        let empty = PlanRequest::new(snap.clone(), 30).with_samples(0);
        assert_eq!(planner.plan(&empty), Err(PlanError::EmptyPopulation));

        let no_hull = PlanRequest::new(snap.clone(), 30).with_ship(ShipParams {
            radius: 0.0,
            ..ShipParams::new()
        });
        assert!(matches!(
            planner.plan(&no_hull),
            Err(PlanError::Config(crate::error::ConfigError::NotPositive {
                field: "ship.radius",
                ..
            }))
        ));

        let mut bad_arena = snap;
        bad_arena.arena = Arena::new(0.0, 100.0);
        assert!(matches!(
            planner.plan(&PlanRequest::new(bad_arena, 30)),
            Err(PlanError::InvalidArena { .. })
        ));
    }

    #[test]
    fn sequence_length_follows_control_repeat() {
        let outcome = seeded().plan(&PlanRequest::new(snapshot(), 60)).unwrap();
        assert_eq!(outcome.sequence.actions.len(), 20);
        assert_eq!(outcome.sequence.ticks(), 60);
        assert_eq!(outcome.stats.generations, 3);
        assert_eq!(outcome.stats.best_history.len(), 3);
    }

    #[test]
    fn best_score_never_decreases_across_generations() {
        let snap = snapshot()
            .with_hazard(Hazard::new(
                EntityId(1),
                KinematicBody::new(Vec2::new(1150.0, 1000.0), Vec2::new(-2.0, 0.0), 40.0),
                HazardSize::Large,
            ))
            .with_hazard(Hazard::new(
                EntityId(2),
                KinematicBody::new(Vec2::new(1000.0, 1180.0), Vec2::new(0.0, -1.5), 20.0),
                HazardSize::Medium,
            ));
        let mut config = PlannerConfig::default().with_seed(3);
        config.generations = 6;
        let outcome = Planner::new(config)
            .plan(&PlanRequest::new(snap, 60).with_samples(40))
            .unwrap();

        let history = &outcome.stats.best_history;
        assert_eq!(history.len(), 6);
        assert!(history.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(outcome.sequence.score, *history.last().unwrap());
    }

    #[test]
    fn exhausted_budget_still_scores_one_candidate() {
        let request = PlanRequest::new(snapshot(), 30).with_time_budget(Duration::ZERO);
        let outcome = seeded().plan(&request).unwrap();

        assert_eq!(outcome.stats.evaluated, 1);
        assert!(outcome.stats.budget_exhausted);
        assert_eq!(outcome.stats.generations, 1);
        assert_eq!(outcome.sequence.actions.len(), 10);
    }

    #[test]
    fn seeded_planners_agree() {
        let request = PlanRequest::new(snapshot(), 30).with_samples(20);
        let a = seeded().plan(&request).unwrap();
        let b = seeded().plan(&request).unwrap();
        assert_eq!(a.sequence, b.sequence);
    }

    #[test]
    fn dodges_a_rock_dead_ahead() {
        let snap = snapshot().with_hazard(Hazard::new(
            EntityId(1),
            KinematicBody::new(Vec2::new(1250.0, 1000.0), Vec2::new(-3.0, 0.0), 40.0),
            HazardSize::Large,
        ));
        let outcome = seeded().plan(&PlanRequest::new(snap, 60)).unwrap();
        assert!(outcome.sequence.score > ScoringWeights::CATASTROPHIC_PENALTY);
    }

    #[test]
    fn warm_start_survives_into_next_plan() {
        let mut planner = seeded();
        let snap = snapshot().with_pickup(Pickup::new(
            EntityId(3),
            PickupKind::Shield,
            Vec2::new(1300.0, 1000.0),
        ));
        let first = planner.plan(&PlanRequest::new(snap.clone(), 30)).unwrap();
        let second = planner
            .plan(&PlanRequest::new(snap, 30).with_ticks_consumed(6))
            .unwrap();

        // The shifted winner competes again, so quality cannot collapse.
        assert!(second.sequence.score > ScoringWeights::CATASTROPHIC_PENALTY);
        assert!(first.sequence.score > 0.0);

        planner.reset();
        assert!(planner.last_winner.is_none());
    }

    #[test]
    fn pickup_seed_turns_toward_the_pickup() {
        let snap = snapshot().with_pickup(Pickup::new(
            EntityId(3),
            PickupKind::Bomb,
            Vec2::new(1000.0, 1400.0),
        ));
        let (turn, steps) = pickup_approach(&snap, &ShipParams::default(), 3).unwrap();
        assert_eq!(turn, Turn::Right);
        // π/2 at 0.3 rad per action.
        assert_eq!(steps, 6);
        assert!(pickup_approach(&snapshot(), &ShipParams::default(), 3).is_none());
    }
}

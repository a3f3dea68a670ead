//! Forward simulation and scoring of one candidate sequence.

use crate::action::{MoveAction, Turn};
use crate::geometry::{Arena, normalize_angle};
use crate::physics::{advect, collides, step_craft, step_projectiles};
use crate::world::{
    Boss, CraftState, EntityId, KinematicBody, Loadout, Pickup, Projectile, WorldSnapshot,
};

use super::config::{Fidelity, PlannerConfig};
use crate::config::ShipParams;
#[cfg(test)]
use super::config::ScoringWeights;

/// Scores sequences against one frozen snapshot.
#[derive(Clone, Debug)]
pub struct Rollout<'a> {
    snapshot: &'a WorldSnapshot,
    ship: &'a ShipParams,
    config: &'a PlannerConfig,
    control_repeat: u32,
    hazards: Vec<KinematicBody>,
    projectiles: Vec<Projectile>,
}

struct SimState {
    craft: CraftState,
    hazards: Vec<KinematicBody>,
    projectiles: Vec<Projectile>,
    bosses: Vec<Boss>,
    pickups: Vec<Pickup>,
    next_id: u32,
}

impl<'a> Rollout<'a> {
    pub fn new(
        snapshot: &'a WorldSnapshot,
        ship: &'a ShipParams,
        config: &'a PlannerConfig,
        control_repeat: u32,
    ) -> Self {
        Self {
            snapshot,
            ship,
            config,
            control_repeat: control_repeat.max(1),
            hazards: snapshot.hazards.iter().map(|h| h.body).collect(),
            projectiles: snapshot.hostile_projectiles().copied().collect(),
        }
    }

    /// Simulates `actions` and returns the accumulated objective. Any collision
    /// ends the rollout with exactly the catastrophic penalty.
    pub fn score(&self, actions: &[MoveAction]) -> f64 {
        let w = &self.config.weights;
        let shielded = self.snapshot.craft.loadout.contains(Loadout::SHIELD);

        let mut state = SimState {
            craft: self.snapshot.craft,
            hazards: self.hazards.clone(),
            projectiles: self.projectiles.clone(),
            bosses: self.snapshot.bosses.clone(),
            pickups: self.snapshot.pickups.clone(),
            next_id: u32::MAX / 2,
        };
        state.craft.body.radius = self.ship.radius;

        let mut score = 0.0;
        let mut min_clearance = f64::INFINITY;
        let mut pickup_distance = nearest_pickup(&state, &self.snapshot.arena).map(|(_, d)| d);
        let mut last_turn = Turn::None;

        for &action in actions {
            if action == MoveAction::Coast {
                score -= w.idle_penalty;
            }
            let turn = action.turn();
            if turn != Turn::None && last_turn != Turn::None && turn != last_turn {
                score -= w.turn_reversal_penalty;
            }
            if turn != Turn::None {
                last_turn = turn;
            }

            for _ in 0..self.control_repeat {
                self.advance(&mut state, action);

                if !shielded && self.collided(&state) {
                    return w.catastrophic_penalty;
                }

                let clearance = self.clearance(&state);
                min_clearance = min_clearance.min(clearance);
                score += w.clearance_reward * clearance.min(w.clearance_cap);
                if clearance < w.safety_floor {
                    let deficit = w.safety_floor - clearance;
                    score -= w.floor_penalty * deficit * deficit;
                }

                score += self.pickup_terms(&mut state, &mut pickup_distance);
                score += self.boss_terms(&state);
            }
        }

        if min_clearance < w.hard_floor {
            score += w.hard_floor_penalty;
        }
        score
    }

    fn advance(&self, state: &mut SimState, action: MoveAction) {
        let arena = &self.snapshot.arena;
        let dt = self.ship.dt;

        step_craft(&mut state.craft, action, self.ship, arena);
        for body in &mut state.hazards {
            advect(body, dt, arena);
        }
        step_projectiles(&mut state.projectiles, dt, arena);

        let target = state.craft.position();
        let full = self.config.fidelity == Fidelity::Full;
        for boss in &mut state.bosses {
            let kind = boss.kind;
            if full {
                kind.pursue(boss, target, arena);
            }
            advect(&mut boss.body, dt, arena);
            if full && let Some(shot) = kind.fire(boss, EntityId(state.next_id)) {
                state.next_id = state.next_id.wrapping_add(1);
                state.projectiles.push(shot);
            }
        }
    }

    fn collided(&self, state: &SimState) -> bool {
        let arena = &self.snapshot.arena;
        let craft = &state.craft.body;
        state.hazards.iter().any(|h| collides(craft, h, arena))
            || state.projectiles.iter().any(|p| collides(craft, &p.body, arena))
            || state.bosses.iter().any(|b| collides(craft, &b.body, arena))
    }

    /// Gap between the craft's edge and the nearest body's edge.
    fn clearance(&self, state: &SimState) -> f64 {
        let arena = &self.snapshot.arena;
        let craft = &state.craft.body;
        state
            .hazards
            .iter()
            .chain(state.projectiles.iter().map(|p| &p.body))
            .chain(state.bosses.iter().map(|b| &b.body))
            .map(|b| arena.distance(craft.position, b.position) - craft.radius - b.radius)
            .fold(f64::INFINITY, f64::min)
    }

    fn pickup_terms(&self, state: &mut SimState, last_distance: &mut Option<f64>) -> f64 {
        let w = &self.config.weights;
        let Some((index, distance)) = nearest_pickup(state, &self.snapshot.arena) else {
            return 0.0;
        };

        let mut reward = 0.0;
        if let Some(previous) = *last_distance {
            reward += w.pickup_progress * (previous - distance);
        }

        if distance < state.craft.body.radius + state.pickups[index].radius {
            reward += w.pickup_bonus;
            state.pickups.swap_remove(index);
            *last_distance = nearest_pickup(state, &self.snapshot.arena).map(|(_, d)| d);
        } else {
            *last_distance = Some(distance);
        }
        reward
    }

    fn boss_terms(&self, state: &SimState) -> f64 {
        let w = &self.config.weights;
        let ring = &self.config.boss;
        let arena = &self.snapshot.arena;
        let craft = &state.craft;
        let mut terms = 0.0;

        for boss in &state.bosses {
            let delta = arena.delta(craft.position(), boss.body.position);
            let d = delta.distance;
            let toward = delta.vector() * (1.0 / d.max(f64::EPSILON));
            let closing = (craft.velocity() - boss.body.velocity).dot(toward);

            if d < w.boss_danger_radius && closing > 0.0 {
                terms -= w.boss_inbound_penalty * closing;
            }
            if ring.in_ring(d) {
                terms += w.boss_ring_reward;
            }

            let line_of_fire = normalize_angle((-delta.vector()).angle() - boss.heading).abs();
            if d < w.firing_line_range && line_of_fire < w.firing_line_cone {
                terms -= w.firing_line_penalty;
            }
        }
        terms
    }
}

fn nearest_pickup(state: &SimState, arena: &Arena) -> Option<(usize, f64)> {
    let origin = state.craft.position();
    state
        .pickups
        .iter()
        .map(|p| arena.distance(origin, p.position))
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use crate::geometry::Vec2;
    use crate::world::{Hazard, HazardSize, PickupKind};

    use super::*;

    const SHIP: ShipParams = ShipParams::new();

    fn open_space() -> WorldSnapshot {
        WorldSnapshot::new(
            Arena::new(2000.0, 2000.0),
            CraftState::new(Vec2::new(1000.0, 1000.0), Vec2::ZERO, 0.0, 15.0),
        )
    }

    fn rock_at(x: f64, y: f64, vx: f64) -> Hazard {
        Hazard::new(
            EntityId(1),
            KinematicBody::new(Vec2::new(x, y), Vec2::new(vx, 0.0), 40.0),
            HazardSize::Large,
        )
    }

    #[test]
    fn collision_returns_exactly_the_catastrophic_penalty() {
        let snap = open_space().with_hazard(rock_at(1100.0, 1000.0, -4.0));
        let config = PlannerConfig::default();
        let rollout = Rollout::new(&snap, &SHIP, &config, 3);

        let score = rollout.score(&[MoveAction::Thrust; 4]);
        assert_eq!(score, ScoringWeights::CATASTROPHIC_PENALTY);
    }

    #[test]
    fn shield_skips_collisions() {
        let mut snap = open_space().with_hazard(rock_at(1100.0, 1000.0, -4.0));
        snap.craft = snap.craft.with_loadout(Loadout::SHIELD);
        let config = PlannerConfig::default();

        let score = Rollout::new(&snap, &SHIP, &config, 3).score(&[MoveAction::Thrust; 4]);
        assert!(score > ScoringWeights::CATASTROPHIC_PENALTY);
    }

    #[test]
    fn collisions_use_the_requested_hull() {
        let snap = open_space().with_hazard(Hazard::new(
            EntityId(2),
            KinematicBody::new(Vec2::new(1000.0, 1080.0), Vec2::ZERO, 40.0),
            HazardSize::Large,
        ));
        let config = PlannerConfig::default();
        let plan = [MoveAction::Coast; 2];

        let slim = Rollout::new(&snap, &SHIP, &config, 1).score(&plan);
        assert!(slim > ScoringWeights::CATASTROPHIC_PENALTY);

        let wide = ShipParams {
            radius: 45.0,
            ..ShipParams::new()
        };
        let score = Rollout::new(&snap, &wide, &config, 1).score(&plan);
        assert_eq!(score, ScoringWeights::CATASTROPHIC_PENALTY);
    }

    #[test]
    fn fleeing_beats_ramming() {
        let snap = open_space().with_hazard(rock_at(1200.0, 1000.0, -1.0));
        let config = PlannerConfig::default();
        let rollout = Rollout::new(&snap, &SHIP, &config, 3);

        let ram = rollout.score(&[MoveAction::Thrust; 10]);
        let flee = rollout.score(&[MoveAction::TurnLeft; 10]);
        assert!(flee > ram);
    }

    #[test]
    fn collecting_a_pickup_earns_the_bonus() {
        let snap = open_space().with_pickup(crate::world::Pickup::new(
            EntityId(5),
            PickupKind::Shield,
            Vec2::new(1060.0, 1000.0),
        ));
        let config = PlannerConfig::default();
        let rollout = Rollout::new(&snap, &SHIP, &config, 3);

        let toward = rollout.score(&[MoveAction::Thrust; 6]);
        let away = rollout.score(&[MoveAction::TurnLeft; 6]);
        assert!(toward - away > config.weights.pickup_bonus * 0.5);
    }

    #[test]
    fn coasting_and_reversals_cost_points() {
        let config = PlannerConfig::default();
        let snap = open_space();
        let rollout = Rollout::new(&snap, &SHIP, &config, 1);

        let steady = rollout.score(&[MoveAction::TurnLeft, MoveAction::TurnLeft]);
        let zigzag = rollout.score(&[MoveAction::TurnLeft, MoveAction::TurnRight]);
        let idle = rollout.score(&[MoveAction::Coast, MoveAction::Coast]);
        assert!(steady > zigzag);
        assert!(steady > idle);
    }

    #[test]
    fn full_fidelity_bosses_shoot_back() {
        use crate::world::{Boss, BossKind};

        let mut boss = Boss::new(EntityId(7), BossKind::Standard, Vec2::new(1300.0, 1000.0))
            .with_heading(std::f64::consts::PI);
        boss.fire_cooldown = 0;
        let snap = open_space().with_boss(boss);

        let fast = PlannerConfig::default();
        let full = PlannerConfig::default().with_fidelity(Fidelity::Full);
        let plan = [MoveAction::Coast; 12];

        let fast_score = Rollout::new(&snap, &SHIP, &fast, 3).score(&plan);
        let full_score = Rollout::new(&snap, &SHIP, &full, 3).score(&plan);
        assert!(fast_score > ScoringWeights::CATASTROPHIC_PENALTY);
        assert!(full_score < fast_score);
    }
}

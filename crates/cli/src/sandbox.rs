//! A small stand-in game world for exercising the pilot without a real host.
//!
//! Rocks drift and split, shots travel and expire, and pickups sit still
//! until collected. Everything is seeded, so a run can be replayed.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use pilot_core::physics;
use pilot_core::{
    Arena, ControlIntent, CraftState, EntityId, Hazard, HazardSize, KinematicBody, Loadout, Pickup,
    PickupKind, Projectile, ProjectileOwner, ShipParams, Vec2, WorldSnapshot,
};

const ROCKS_PER_WAVE: usize = 6;
const FIRE_COOLDOWN: u32 = 8;
const SPAWN_CLEARANCE: f64 = 250.0;
const PICKUP_CHANCE: f64 = 0.15;
const SHIELD_TICKS: u32 = 300;

/// What happened during one world step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub rocks_destroyed: u32,
    pub pickups_collected: u32,
    pub died: bool,
}

/// Totals across a whole run.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub deaths: u32,
    pub rocks_destroyed: u32,
    pub pickups_collected: u32,
    pub waves_cleared: u32,
    pub shots_fired: u32,
}

pub struct Sandbox {
    arena: Arena,
    ship: ShipParams,
    rng: ChaCha8Rng,
    tick: u64,
    next_id: u32,
    craft: CraftState,
    hazards: Vec<Hazard>,
    projectiles: Vec<Projectile>,
    pickups: Vec<Pickup>,
    cooldown: u32,
    shield_ticks: u32,
    summary: RunSummary,
}

impl Sandbox {
    pub fn new(arena: Arena, ship: ShipParams, seed: u64) -> Self {
        let mut sandbox = Self {
            arena,
            ship,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            next_id: 1,
            craft: Self::fresh_craft(arena, &ship),
            hazards: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            cooldown: 0,
            shield_ticks: 0,
            summary: RunSummary::default(),
        };
        sandbox.spawn_wave();
        sandbox
    }

    fn fresh_craft(arena: Arena, ship: &ShipParams) -> CraftState {
        CraftState::new(
            Vec2::new(arena.width / 2.0, arena.height / 2.0),
            Vec2::ZERO,
            -std::f64::consts::FRAC_PI_2,
            ship.radius,
        )
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn_wave(&mut self) {
        for _ in 0..ROCKS_PER_WAVE {
            let position = loop {
                let candidate = Vec2::new(
                    self.rng.gen_range(0.0..self.arena.width),
                    self.rng.gen_range(0.0..self.arena.height),
                );
                if self.arena.distance(candidate, self.craft.position()) > SPAWN_CLEARANCE {
                    break candidate;
                }
            };
            self.spawn_rock(position, HazardSize::Large);
        }
    }

    fn spawn_rock(&mut self, position: Vec2, size: HazardSize) {
        let speed = match size {
            HazardSize::Large => self.rng.gen_range(0.5..1.5),
            HazardSize::Medium => self.rng.gen_range(1.0..2.5),
            HazardSize::Small => self.rng.gen_range(1.5..3.5),
        };
        let velocity = Vec2::from_angle(self.rng.gen_range(0.0..TAU)) * speed;
        let id = self.allocate_id();
        self.hazards.push(Hazard::new(
            id,
            KinematicBody::new(position, velocity, size.radius()),
            size,
        ));
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.tick,
            ..self.summary
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let mut craft = self.craft;
        if self.shield_ticks > 0 {
            craft.loadout |= Loadout::SHIELD;
        }
        WorldSnapshot {
            hazards: self.hazards.clone(),
            projectiles: self.projectiles.clone(),
            pickups: self.pickups.clone(),
            ..WorldSnapshot::new(self.arena, craft).at_tick(self.tick)
        }
    }

    /// Applies one tick of controls and advances the world.
    pub fn step(&mut self, intent: ControlIntent) -> StepReport {
        let mut report = StepReport::default();
        let dt = self.ship.dt;

        physics::step_craft(&mut self.craft, intent.movement(), &self.ship, &self.arena);
        for hazard in &mut self.hazards {
            physics::advect(&mut hazard.body, dt, &self.arena);
        }
        physics::step_projectiles(&mut self.projectiles, dt, &self.arena);

        self.cooldown = self.cooldown.saturating_sub(1);
        self.shield_ticks = self.shield_ticks.saturating_sub(1);
        if intent.fire && self.cooldown == 0 {
            self.fire();
        }

        report.rocks_destroyed = self.resolve_hits();

        let craft_body = self.craft.body;
        if self.shield_ticks == 0
            && self
                .hazards
                .iter()
                .any(|h| physics::collides(&craft_body, &h.body, &self.arena))
        {
            report.died = true;
            self.summary.deaths += 1;
            self.respawn();
        }

        let before = self.pickups.len();
        let position = self.craft.position();
        let reach = self.craft.body.radius;
        let arena = self.arena;
        let mut shielded = false;
        self.pickups.retain(|p| {
            let touched = arena.distance(position, p.position) < reach + p.radius;
            shielded |= touched && p.kind == PickupKind::Shield;
            !touched
        });
        if shielded {
            self.shield_ticks = SHIELD_TICKS;
        }
        report.pickups_collected = (before - self.pickups.len()) as u32;
        self.summary.pickups_collected += report.pickups_collected;

        if self.hazards.is_empty() {
            self.summary.waves_cleared += 1;
            self.spawn_wave();
        }

        self.tick += 1;
        report
    }

    fn fire(&mut self) {
        let direction = Vec2::from_angle(self.craft.heading);
        let position = self.craft.position() + direction * self.craft.body.radius;
        let id = self.allocate_id();
        self.projectiles.push(Projectile {
            id,
            body: KinematicBody::new(
                position,
                self.craft.velocity() + direction * self.ship.projectile_speed,
                2.0,
            ),
            lifetime: self.ship.projectile_lifetime,
            owner: ProjectileOwner::Craft,
        });
        self.cooldown = FIRE_COOLDOWN;
        self.summary.shots_fired += 1;
    }

    fn resolve_hits(&mut self) -> u32 {
        let mut destroyed = Vec::new();
        let arena = self.arena;
        self.projectiles.retain(|shot| {
            if shot.owner != ProjectileOwner::Craft {
                return true;
            }
            let hit = self.hazards.iter().position(|h| {
                !destroyed.contains(&h.id) && physics::collides(&shot.body, &h.body, &arena)
            });
            match hit {
                Some(index) => {
                    destroyed.push(self.hazards[index].id);
                    false
                }
                None => true,
            }
        });

        let mut fragments = Vec::new();
        self.hazards.retain(|h| {
            if destroyed.contains(&h.id) {
                fragments.push((h.body.position, h.size));
                false
            } else {
                true
            }
        });

        for (position, size) in fragments {
            let smaller = match size {
                HazardSize::Large => Some(HazardSize::Medium),
                HazardSize::Medium => Some(HazardSize::Small),
                HazardSize::Small => None,
            };
            if let Some(smaller) = smaller {
                self.spawn_rock(position, smaller);
                self.spawn_rock(position, smaller);
            }
            if self.rng.gen_bool(PICKUP_CHANCE) {
                let kind = if self.rng.gen_bool(0.5) {
                    PickupKind::Shield
                } else {
                    PickupKind::RapidFire
                };
                let id = self.allocate_id();
                self.pickups.push(Pickup::new(id, kind, position));
            }
        }

        let count = destroyed.len() as u32;
        self.summary.rocks_destroyed += count;
        count
    }

    fn respawn(&mut self) {
        self.craft = Self::fresh_craft(self.arena, &self.ship);
        self.projectiles.clear();
        self.cooldown = 0;
        self.shield_ticks = 0;
        let center = self.craft.position();
        let arena = self.arena;
        self.hazards
            .retain(|h| arena.distance(h.body.position, center) > SPAWN_CLEARANCE);
    }
}

#[cfg(test)]
mod tests {
    use pilot_core::{MoveAction, Turn};

    use super::*;

    fn sandbox() -> Sandbox {
        Sandbox::new(Arena::new(1600.0, 1200.0), ShipParams::default(), 3)
    }

    #[test]
    fn waves_spawn_clear_of_the_craft() {
        let sandbox = sandbox();
        let snapshot = sandbox.snapshot();
        assert_eq!(snapshot.hazards.len(), ROCKS_PER_WAVE);
        assert!(snapshot.nearest_hazard_distance().unwrap() > SPAWN_CLEARANCE - 40.0);
    }

    #[test]
    fn same_seed_same_world() {
        let mut a = sandbox();
        let mut b = sandbox();
        let intent = MoveAction::from_parts(true, Turn::Left).with_fire(true);
        for _ in 0..50 {
            assert_eq!(a.step(intent), b.step(intent));
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn firing_respects_the_cooldown() {
        let mut sandbox = sandbox();
        let intent = ControlIntent {
            fire: true,
            ..ControlIntent::IDLE
        };
        for _ in 0..FIRE_COOLDOWN {
            sandbox.step(intent);
        }
        assert_eq!(sandbox.summary().shots_fired, 1);
        assert_eq!(sandbox.tick(), u64::from(FIRE_COOLDOWN));
    }
}

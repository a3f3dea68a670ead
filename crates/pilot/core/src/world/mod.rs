//! Read-only world snapshot handed to the pilot every tick.
//!
//! Every type here is a value copy of the authoritative game state. The pilot
//! never mutates the host world; it only reads these snapshots and emits
//! [`crate::ControlIntent`]s back.

mod boss;
mod hazard;
mod pickup;

pub use boss::{Boss, BossKind};
pub use hazard::{Hazard, HazardSize, Projectile, ProjectileOwner};
pub use pickup::{Pickup, PickupKind};

use bitflags::bitflags;

use crate::error::PlanError;
use crate::geometry::{Arena, Vec2};

/// Host-assigned identifier for any world entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

/// Position, velocity and collision radius of a circular body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
}

impl KinematicBody {
    pub const fn new(position: Vec2, velocity: Vec2, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.radius.is_finite()
    }
}

bitflags! {
    /// Power-ups currently active on the craft.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Loadout: u8 {
        const SHIELD      = 1 << 0;
        const RAPID_FIRE  = 1 << 1;
        const TRIPLE_SHOT = 1 << 2;
        const LASER       = 1 << 3;
    }
}

/// The controlled craft.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CraftState {
    pub body: KinematicBody,
    /// Nose direction in radians.
    pub heading: f64,
    pub loadout: Loadout,
}

impl CraftState {
    pub fn new(position: Vec2, velocity: Vec2, heading: f64, radius: f64) -> Self {
        Self {
            body: KinematicBody::new(position, velocity, radius),
            heading,
            loadout: Loadout::empty(),
        }
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = loadout;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }
}

/// Everything the pilot may look at for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    pub arena: Arena,
    /// Host simulation tick at which this snapshot was taken.
    pub tick: u64,
    pub craft: CraftState,
    pub hazards: Vec<Hazard>,
    pub projectiles: Vec<Projectile>,
    pub bosses: Vec<Boss>,
    pub pickups: Vec<Pickup>,
}

impl WorldSnapshot {
    pub fn new(arena: Arena, craft: CraftState) -> Self {
        Self {
            arena,
            craft,
            ..Self::default()
        }
    }

    pub fn at_tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_hazard(mut self, hazard: Hazard) -> Self {
        self.hazards.push(hazard);
        self
    }

    pub fn with_projectile(mut self, projectile: Projectile) -> Self {
        self.projectiles.push(projectile);
        self
    }

    pub fn with_boss(mut self, boss: Boss) -> Self {
        self.bosses.push(boss);
        self
    }

    pub fn with_pickup(mut self, pickup: Pickup) -> Self {
        self.pickups.push(pickup);
        self
    }

    /// Hostile projectiles only; the craft's own shots are never threats.
    pub fn hostile_projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter().filter(|p| p.is_hostile())
    }

    /// Wrapped distance from the craft to the closest hazard, if any.
    pub fn nearest_hazard_distance(&self) -> Option<f64> {
        let origin = self.craft.position();
        self.hazards
            .iter()
            .map(|h| self.arena.distance(origin, h.body.position))
            .min_by(f64::total_cmp)
    }

    /// Wrapped distance from the craft to the closest boss, if any.
    pub fn nearest_boss_distance(&self) -> Option<f64> {
        let origin = self.craft.position();
        self.bosses
            .iter()
            .map(|b| self.arena.distance(origin, b.body.position))
            .min_by(f64::total_cmp)
    }

    /// Rejects snapshots the geometry cannot work with.
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.arena.is_valid() {
            return Err(PlanError::InvalidArena {
                width: self.arena.width,
                height: self.arena.height,
            });
        }

        let craft_ok = self.craft.body.is_finite() && self.craft.heading.is_finite();
        let bodies_ok = self.hazards.iter().all(|h| h.body.is_finite())
            && self.projectiles.iter().all(|p| p.body.is_finite())
            && self.bosses.iter().all(|b| b.body.is_finite());
        if !craft_ok || !bodies_ok {
            return Err(PlanError::NonFiniteBody);
        }

        Ok(())
    }
}

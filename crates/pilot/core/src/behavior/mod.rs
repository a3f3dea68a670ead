//! Behavior handlers.
//!
//! Each handler turns the current snapshot and threat picture into a
//! [`Steering`] for one tick. Handlers are stateless; anything they need from
//! the previous tick arrives through [`BehaviorContext`].

mod avoid;
mod collect;
mod evade;
mod hunt;

pub use avoid::avoid;
pub use collect::collect;
pub use evade::evade;
pub use hunt::hunt;

use std::f64::consts::FRAC_PI_2;

use crate::action::Turn;
use crate::arbiter::{Behavior, PickupChoice};
use crate::config::PilotConfig;
use crate::geometry::normalize_angle;
use crate::steering::HeadingController;
use crate::threat::{Threat, ThreatAssessment};
use crate::world::WorldSnapshot;

/// Read-only inputs shared by every handler.
#[derive(Clone, Copy, Debug)]
pub struct BehaviorContext<'a> {
    pub snapshot: &'a WorldSnapshot,
    pub assessment: &'a ThreatAssessment,
    pub config: &'a PilotConfig,
    pub controller: HeadingController,
    /// Craft heading observed on the previous tick.
    pub previous_heading: f64,
    pub pickup: Option<PickupChoice>,
}

impl BehaviorContext<'_> {
    pub fn heading(&self) -> f64 {
        self.snapshot.craft.heading
    }

    /// Threat lies within the forward half-plane of the nose.
    pub fn in_forward_arc(&self, threat: &Threat) -> bool {
        normalize_angle(threat.bearing - self.heading()).abs() < FRAC_PI_2
    }
}

/// One tick of handler output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub thrust: bool,
    pub turn: Turn,
    pub fire: bool,
    /// The handler needs the turn channel for movement and the aim plan must
    /// not take it over.
    pub holds_heading: bool,
    /// The pursued pickup is within capture radius.
    pub captured: bool,
}

impl Steering {
    pub const IDLE: Self = Self {
        thrust: false,
        turn: Turn::None,
        fire: false,
        holds_heading: false,
        captured: false,
    };
}

/// Dispatches to the handler for `behavior`.
pub fn run(behavior: Behavior, ctx: &BehaviorContext<'_>) -> Steering {
    match behavior {
        Behavior::Evade => evade(ctx),
        Behavior::Avoid => avoid(ctx),
        Behavior::Hunt => hunt(ctx),
        Behavior::Collect => collect(ctx),
        Behavior::Patrol => patrol(ctx),
    }
}

/// Drift.
pub fn patrol(_ctx: &BehaviorContext<'_>) -> Steering {
    Steering::IDLE
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{PilotConfig, ShipParams};
    use crate::geometry::{Arena, Vec2};
    use crate::steering::HeadingController;
    use crate::threat::ThreatAssessment;
    use crate::world::{CraftState, WorldSnapshot};

    pub fn snapshot(x: f64, y: f64, heading: f64) -> WorldSnapshot {
        WorldSnapshot::new(
            Arena::new(2000.0, 2000.0),
            CraftState::new(Vec2::new(x, y), Vec2::ZERO, heading, ShipParams::DEFAULT_RADIUS),
        )
    }

    pub fn assess(snapshot: &WorldSnapshot, config: &PilotConfig) -> ThreatAssessment {
        ThreatAssessment::assess(snapshot, config.ship.radius, &config.threat, &config.boss)
    }

    pub fn controller(config: &PilotConfig) -> HeadingController {
        HeadingController::new(&config.ship)
    }
}

//! The reactive autopilot: one synchronous decision per host tick.
//!
//! Each tick runs threat assessment, arbitration, the chosen behavior handler
//! and the aim plan, then merges them with the planner's movement for the tick:
//!
//! - the handler's movement replaces the planned action when there is no
//!   plan, when evading, or when a boss is inside its keep-out distance;
//! - the aim plan owns the turn channel unless the active handler holds it;
//! - fire is the handler's fire or the aim plan's, never the planner's;
//! - thrust is dropped above the cruise speed unless evading.

use tracing::debug;

use crate::action::{ControlIntent, MoveAction, Turn};
use crate::aim::{AimPlan, compute_aim_plan};
use crate::arbiter::{Behavior, DecisionFeatures, UtilityArbiter, UtilityVector};
use crate::behavior::{self, BehaviorContext};
use crate::config::PilotConfig;
use crate::error::ConfigError;
use crate::steering::{HeadingController, PdGains};
use crate::threat::ThreatAssessment;
use crate::world::{EntityId, WorldSnapshot};

/// Where this tick's movement came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MovementSource {
    Planner,
    Reactive,
}

/// Everything observable about one decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub behavior: Behavior,
    pub utilities: UtilityVector,
    pub behavior_changed: bool,
    pub movement: MovementSource,
    pub threat_count: usize,
    pub boss_emergency: bool,
    pub aim: Option<AimPlan>,
    pub pickup_target: Option<EntityId>,
    /// Thrust was requested but dropped by the speed governor.
    pub throttled: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PilotOutput {
    pub intent: ControlIntent,
    pub telemetry: Telemetry,
}

/// Reactive controller state carried between ticks.
#[derive(Clone, Debug)]
pub struct Autopilot {
    config: PilotConfig,
    controller: HeadingController,
    arbiter: UtilityArbiter,
    previous_heading: Option<f64>,
    pickup_target: Option<EntityId>,
}

impl Autopilot {
    pub fn new(config: PilotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            controller: HeadingController::new(&config.ship),
            config,
            arbiter: UtilityArbiter::new(),
            previous_heading: None,
            pickup_target: None,
        })
    }

    pub fn config(&self) -> &PilotConfig {
        &self.config
    }

    pub fn arbiter(&self) -> &UtilityArbiter {
        &self.arbiter
    }

    pub fn pickup_target(&self) -> Option<EntityId> {
        self.pickup_target
    }

    /// Drops per-life state after a respawn.
    pub fn reset(&mut self) {
        self.previous_heading = None;
        self.pickup_target = None;
    }

    /// Decides this tick's controls. `planned` is the planner's movement for
    /// the tick, if a plan is active.
    pub fn decide(&mut self, snapshot: &WorldSnapshot, planned: Option<MoveAction>) -> PilotOutput {
        let config = &self.config;
        let craft = &snapshot.craft;
        let heading = craft.heading;
        let previous_heading = self.previous_heading.unwrap_or(heading);

        let assessment =
            ThreatAssessment::assess(snapshot, config.ship.radius, &config.threat, &config.boss);
        let features = DecisionFeatures::extract(&assessment, snapshot, &config.pickup);
        let utilities = UtilityVector::evaluate(&features, &config.utility);
        let decision = self.arbiter.decide(&utilities);

        let ctx = BehaviorContext {
            snapshot,
            assessment: &assessment,
            config,
            controller: self.controller,
            previous_heading,
            pickup: features.pickup,
        };
        let steering = behavior::run(decision.behavior, &ctx);

        if steering.captured {
            self.pickup_target = None;
        } else if decision.behavior == Behavior::Collect {
            self.pickup_target = features.pickup.map(|c| c.pickup.id);
        }

        let reactive = planned.is_none()
            || decision.behavior == Behavior::Evade
            || assessment.boss_emergency;
        let (mut thrust, mut turn, movement) = match planned {
            Some(action) if !reactive => (action.thrust(), action.turn(), MovementSource::Planner),
            _ => (steering.thrust, steering.turn, MovementSource::Reactive),
        };

        let aim = compute_aim_plan(snapshot, config);
        let heading_held = reactive && steering.holds_heading;
        if let Some(plan) = &aim
            && !heading_held
        {
            turn = self.aim_turn(plan, heading, previous_heading);
        }

        let fire = steering.fire
            || aim
                .as_ref()
                .is_some_and(|plan| plan.should_fire(heading, config, utilities.evade));

        let mut throttled = false;
        if thrust && decision.behavior != Behavior::Evade {
            let cruise = config.throttle.cruise_speed(snapshot.nearest_hazard_distance());
            if craft.body.speed() > cruise {
                thrust = false;
                throttled = true;
            }
        }

        self.previous_heading = Some(heading);

        let intent = ControlIntent { thrust, turn, fire };
        debug!(
            tick = snapshot.tick,
            behavior = %decision.behavior,
            utility = decision.utility,
            movement = %movement,
            thrust,
            turn = ?turn,
            fire,
            "pilot decision"
        );

        PilotOutput {
            intent,
            telemetry: Telemetry {
                behavior: decision.behavior,
                utilities,
                behavior_changed: decision.changed,
                movement,
                threat_count: assessment.len(),
                boss_emergency: assessment.boss_emergency,
                aim,
                pickup_target: self.pickup_target,
                throttled,
            },
        }
    }

    fn aim_turn(&self, plan: &AimPlan, heading: f64, previous: f64) -> Turn {
        let gains = PdGains {
            kp: self.config.steering.aim_kp,
            kd: self.config.steering.aim_kd,
        };
        self.controller.steer(heading, previous, plan.angle, gains).turn
    }
}

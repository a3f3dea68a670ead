//! Deterministic decision engine for an autonomous arcade-shooter pilot.
//!
//! `pilot-core` holds everything the pilot decides with and nothing it runs on:
//! toroidal geometry, the shared per-tick physics, intercept solving, threat
//! assessment, utility arbitration, behavior handlers, the aim plan, the
//! population planner and the plan executor. The [`Autopilot`] stitches the
//! reactive parts together once per host tick; the [`Planner`] is meant to run
//! off the tick thread and feed a [`PlanExecutor`]. All APIs are synchronous
//! and free of I/O.
pub mod action;
pub mod aim;
pub mod arbiter;
pub mod behavior;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intercept;
pub mod physics;
pub mod pilot;
pub mod plan;
pub mod planner;
pub mod steering;
pub mod threat;
pub mod world;

pub use action::{ControlIntent, ControlKeys, MoveAction, Turn};
pub use aim::{AimPlan, AimTarget, compute_aim_plan};
pub use arbiter::{Behavior, Decision, DecisionFeatures, PickupChoice, UtilityArbiter, UtilityVector};
pub use behavior::{BehaviorContext, Steering};
pub use config::{
    AimConfig, BossConfig, HuntConfig, PickupConfig, PilotConfig, RangeGates, ShipParams,
    SteeringGains, ThreatConfig, ThrottleConfig, UtilityWeights,
};
pub use error::{ConfigError, PlanError, Result};
pub use geometry::{Arena, Vec2, WrappedDelta, normalize_angle, wrapped_delta};
pub use intercept::{Intercept, InterceptProblem, solve_intercept};
pub use pilot::{Autopilot, MovementSource, PilotOutput, Telemetry};
pub use plan::{Adoption, Plan, PlanExecutor};
pub use planner::{
    ActionSequence, DEFAULT_CONTROL_REPEAT, Fidelity, PlanOutcome, PlanRequest, PlanStats,
    PlannedSequence, Planner, PlannerConfig, Rollout, ScoringWeights,
};
pub use steering::{HeadingController, PdGains, Steer};
pub use threat::{Approach, Threat, ThreatAssessment, ThreatKind};
pub use world::{
    Boss, BossKind, CraftState, EntityId, Hazard, HazardSize, KinematicBody, Loadout, Pickup,
    PickupKind, Projectile, ProjectileOwner, WorldSnapshot,
};

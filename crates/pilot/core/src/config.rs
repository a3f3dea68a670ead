//! Tunable parameters for the reactive pilot.
//!
//! Every struct carries its defaults as associated constants so callers can
//! reference a single value without building the whole tree.

use crate::error::ConfigError;

/// Physical parameters of the controlled craft type.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShipParams {
    /// Acceleration per tick while thrusting.
    pub thrust: f64,
    /// Radians turned per tick while a turn key is held.
    pub rotation_rate: f64,
    /// Velocity multiplier applied every tick.
    pub friction: f64,
    pub max_speed: f64,
    pub radius: f64,
    pub projectile_speed: f64,
    /// Projectile lifetime in ticks.
    pub projectile_lifetime: u32,
    /// Tick length.
    pub dt: f64,
}

impl ShipParams {
    pub const DEFAULT_THRUST: f64 = 0.5;
    pub const DEFAULT_ROTATION_RATE: f64 = 0.1;
    pub const DEFAULT_FRICTION: f64 = 0.99;
    pub const DEFAULT_MAX_SPEED: f64 = 10.0;
    pub const DEFAULT_RADIUS: f64 = 15.0;
    pub const DEFAULT_PROJECTILE_SPEED: f64 = 15.0;
    pub const DEFAULT_PROJECTILE_LIFETIME: u32 = 60;
    pub const DEFAULT_DT: f64 = 1.0;

    pub const fn new() -> Self {
        Self {
            thrust: Self::DEFAULT_THRUST,
            rotation_rate: Self::DEFAULT_ROTATION_RATE,
            friction: Self::DEFAULT_FRICTION,
            max_speed: Self::DEFAULT_MAX_SPEED,
            radius: Self::DEFAULT_RADIUS,
            projectile_speed: Self::DEFAULT_PROJECTILE_SPEED,
            projectile_lifetime: Self::DEFAULT_PROJECTILE_LIFETIME,
            dt: Self::DEFAULT_DT,
        }
    }

    /// Farthest a projectile travels before expiring.
    pub fn projectile_range(&self) -> f64 {
        self.projectile_speed * f64::from(self.projectile_lifetime)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("ship.thrust", self.thrust)?;
        ConfigError::check_positive("ship.rotation_rate", self.rotation_rate)?;
        ConfigError::check_range("ship.friction", self.friction, 0.0, 1.0)?;
        ConfigError::check_positive("ship.max_speed", self.max_speed)?;
        ConfigError::check_positive("ship.radius", self.radius)?;
        ConfigError::check_positive("ship.projectile_speed", self.projectile_speed)?;
        ConfigError::check_positive("ship.dt", self.dt)?;
        Ok(())
    }
}

impl Default for ShipParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Threat partition thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThreatConfig {
    /// Distance (added to the body radius) that always counts as an emergency.
    pub emergency_radius: f64,
    /// Collision-course threats only count as immediate inside this distance.
    pub danger_radius: f64,
    /// Collision horizon in ticks for rocks.
    pub immediate_window: f64,
    /// Collision horizon in ticks for hostile projectiles.
    pub projectile_window: f64,
}

impl ThreatConfig {
    pub const DEFAULT_EMERGENCY_RADIUS: f64 = 100.0;
    pub const DEFAULT_DANGER_RADIUS: f64 = 300.0;
    pub const DEFAULT_IMMEDIATE_WINDOW: f64 = 90.0;
    pub const DEFAULT_PROJECTILE_WINDOW: f64 = 60.0;

    pub const fn new() -> Self {
        Self {
            emergency_radius: Self::DEFAULT_EMERGENCY_RADIUS,
            danger_radius: Self::DEFAULT_DANGER_RADIUS,
            immediate_window: Self::DEFAULT_IMMEDIATE_WINDOW,
            projectile_window: Self::DEFAULT_PROJECTILE_WINDOW,
        }
    }
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Boss engagement geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossConfig {
    /// Hard floor on distance to a boss.
    pub keep_out: f64,
    pub ring_inner: f64,
    pub ring_outer: f64,
    /// Radial speed (px/tick, negative = closing) that triggers orbiting.
    pub inbound_speed: f64,
    /// Distance inside `ring_outer` past which the craft drifts back in.
    pub drift_margin: f64,
}

impl BossConfig {
    pub const DEFAULT_KEEP_OUT: f64 = 180.0;
    pub const DEFAULT_RING_INNER: f64 = 400.0;
    pub const DEFAULT_RING_OUTER: f64 = 900.0;
    pub const DEFAULT_INBOUND_SPEED: f64 = -1.0;
    pub const DEFAULT_DRIFT_MARGIN: f64 = 100.0;

    pub const fn new() -> Self {
        Self {
            keep_out: Self::DEFAULT_KEEP_OUT,
            ring_inner: Self::DEFAULT_RING_INNER,
            ring_outer: Self::DEFAULT_RING_OUTER,
            inbound_speed: Self::DEFAULT_INBOUND_SPEED,
            drift_margin: Self::DEFAULT_DRIFT_MARGIN,
        }
    }

    pub fn in_ring(&self, distance: f64) -> bool {
        distance >= self.ring_inner && distance <= self.ring_outer
    }

    pub fn ring_centre(&self) -> f64 {
        (self.ring_inner + self.ring_outer) * 0.5
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum/maximum firing distance per target class.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeGates {
    pub large_min: f64,
    pub medium_min: f64,
    pub small_min: f64,
    pub max: f64,
    /// Used instead of `max` once only large rocks remain.
    pub max_only_large: f64,
}

/// Aim-plan target selection and firing tolerances.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AimConfig {
    pub gates: RangeGates,
    /// Without an intercept solution, aim straight at targets this close.
    pub direct_aim_range: f64,
    pub small_tolerance: f64,
    pub medium_tolerance: f64,
    pub large_tolerance: f64,
    /// Tolerance used while the evade utility is elevated.
    pub pressured_tolerance: f64,
    /// Evade utility above which `pressured_tolerance` applies.
    pub pressure_threshold: f64,
}

impl AimConfig {
    pub const DEFAULT_GATES: RangeGates = RangeGates {
        large_min: 280.0,
        medium_min: 120.0,
        small_min: 0.0,
        max: 700.0,
        max_only_large: 900.0,
    };
    pub const DEFAULT_DIRECT_AIM_RANGE: f64 = 140.0;

    pub const fn new() -> Self {
        Self {
            gates: Self::DEFAULT_GATES,
            direct_aim_range: Self::DEFAULT_DIRECT_AIM_RANGE,
            small_tolerance: 0.10,
            medium_tolerance: 0.16,
            large_tolerance: 0.30,
            pressured_tolerance: 0.45,
            pressure_threshold: 0.3,
        }
    }
}

impl Default for AimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Hunt behaviour gates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HuntConfig {
    pub gates: RangeGates,
    /// Relaxed gates once few rocks remain.
    pub sparse_gates: RangeGates,
    /// Rock count at or below which `sparse_gates` apply.
    pub sparse_count: usize,
    pub aligned_tolerance: f64,
    /// Small rocks at or above this count fire without waiting for alignment.
    pub cleanup_small_count: usize,
    /// Heading error allowed for the "only large rocks left" shot.
    pub large_kick_tolerance: f64,
    /// Heading error allowed before drifting back toward a distant boss.
    pub drift_alignment: f64,
}

impl HuntConfig {
    pub const DEFAULT_GATES: RangeGates = RangeGates {
        large_min: 320.0,
        medium_min: 180.0,
        small_min: 110.0,
        max: 650.0,
        max_only_large: 900.0,
    };
    pub const DEFAULT_SPARSE_GATES: RangeGates = RangeGates {
        large_min: 260.0,
        medium_min: 140.0,
        small_min: 110.0,
        max: 650.0,
        max_only_large: 900.0,
    };

    pub const fn new() -> Self {
        Self {
            gates: Self::DEFAULT_GATES,
            sparse_gates: Self::DEFAULT_SPARSE_GATES,
            sparse_count: 3,
            aligned_tolerance: 0.06,
            cleanup_small_count: 4,
            large_kick_tolerance: 0.35,
            drift_alignment: 0.3,
        }
    }
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Pickup desirability and approach parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PickupConfig {
    /// Pickups farther than this are ignored.
    pub max_distance: f64,
    pub capture_radius: f64,
    /// Thrust only while farther than this from the pickup.
    pub thrust_distance: f64,
    pub align_tolerance: f64,
    pub shield_bonus: f64,
    pub boss_bonus: f64,
    pub crowd_bonus: f64,
    pub crowd_threshold: usize,
}

impl PickupConfig {
    pub const fn new() -> Self {
        Self {
            max_distance: 900.0,
            capture_radius: 30.0,
            thrust_distance: 50.0,
            align_tolerance: 0.05,
            shield_bonus: 1.0,
            boss_bonus: 0.3,
            crowd_bonus: 0.2,
            crowd_threshold: 8,
        }
    }
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller gains for the discrete heading controller.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteeringGains {
    pub aim_kp: f64,
    pub aim_kd: f64,
    pub evade_kp: f64,
    pub pickup_kp: f64,
    pub orbit_kp: f64,
    pub orbit_kd: f64,
    /// Heading error below which the avoid behaviour stops turning.
    pub avoid_deadband: f64,
}

impl SteeringGains {
    pub const fn new() -> Self {
        Self {
            aim_kp: 0.6,
            aim_kd: 0.2,
            evade_kp: 0.25,
            pickup_kp: 0.12,
            orbit_kp: 0.8,
            orbit_kd: 0.3,
            avoid_deadband: 0.1,
        }
    }
}

impl Default for SteeringGains {
    fn default() -> Self {
        Self::new()
    }
}

/// Weights of the utility arbiter's linear model.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UtilityWeights {
    pub evade_emergency: f64,
    pub evade_immediate: f64,
    pub evade_projectile: f64,
    pub evade_boss: f64,
    pub avoid_immediate: f64,
    pub hunt_base: f64,
    pub collect_floor: f64,
    pub collect_offset: f64,
    pub collect_score: f64,
    pub patrol_idle: f64,
}

impl UtilityWeights {
    pub const fn new() -> Self {
        Self {
            evade_emergency: 0.5,
            evade_immediate: 0.25,
            evade_projectile: 0.7,
            evade_boss: 2.0,
            avoid_immediate: 0.15,
            hunt_base: 0.55,
            collect_floor: 0.5,
            collect_offset: 0.05,
            collect_score: 0.1,
            patrol_idle: 0.25,
        }
    }
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Cruise-speed governor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThrottleConfig {
    /// Nearest-rock distance below which the crowded cruise speed applies.
    pub crowded_range: f64,
    pub crowded_speed: f64,
    pub open_speed: f64,
}

impl ThrottleConfig {
    pub const fn new() -> Self {
        Self {
            crowded_range: 260.0,
            crowded_speed: 2.8,
            open_speed: 7.0,
        }
    }

    pub fn cruise_speed(&self, nearest_hazard: Option<f64>) -> f64 {
        match nearest_hazard {
            Some(d) if d < self.crowded_range => self.crowded_speed,
            _ => self.open_speed,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete configuration of the reactive pilot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PilotConfig {
    pub ship: ShipParams,
    pub threat: ThreatConfig,
    pub boss: BossConfig,
    pub aim: AimConfig,
    pub hunt: HuntConfig,
    pub pickup: PickupConfig,
    pub steering: SteeringGains,
    pub utility: UtilityWeights,
    pub throttle: ThrottleConfig,
}

impl PilotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ship.validate()?;
        ConfigError::check_positive("threat.danger_radius", self.threat.danger_radius)?;
        ConfigError::check_positive("boss.keep_out", self.boss.keep_out)?;
        ConfigError::check_range(
            "boss.ring_inner",
            self.boss.ring_inner,
            self.boss.keep_out,
            self.boss.ring_outer,
        )?;
        ConfigError::check_positive("pickup.max_distance", self.pickup.max_distance)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PilotConfig::default().validate().is_ok());
        assert_eq!(ShipParams::default().projectile_range(), 900.0);
    }

    #[test]
    fn rejects_friction_above_one() {
        let mut config = PilotConfig::default();
        config.ship.friction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "ship.friction", .. })
        ));
    }

    #[test]
    fn throttle_tightens_near_rocks() {
        let throttle = ThrottleConfig::default();
        assert_eq!(throttle.cruise_speed(Some(100.0)), 2.8);
        assert_eq!(throttle.cruise_speed(Some(400.0)), 7.0);
        assert_eq!(throttle.cruise_speed(None), 7.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: PilotConfig =
            serde_json::from_str(r#"{ "boss": { "keep_out": 220.0 } }"#).unwrap();
        assert_eq!(config.boss.keep_out, 220.0);
        assert_eq!(config.boss.ring_inner, BossConfig::DEFAULT_RING_INNER);
        assert_eq!(config.ship, ShipParams::default());
    }
}

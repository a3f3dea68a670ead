//! Discrete heading controller.
//!
//! The host only accepts left/right/none per tick, so the continuous PD
//! command is reduced to its sign. Errors smaller than half a turn step are
//! left alone, since one more step would overshoot further than it corrects.

use crate::action::Turn;
use crate::config::ShipParams;
use crate::geometry::normalize_angle;

/// Proportional and derivative gains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PdGains {
    pub kp: f64,
    pub kd: f64,
}

impl PdGains {
    pub const fn proportional(kp: f64) -> Self {
        Self { kp, kd: 0.0 }
    }
}

/// One tick of heading control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steer {
    pub turn: Turn,
    /// Signed heading error in (-π, π] before turning.
    pub error: f64,
}

impl Steer {
    pub fn aligned(&self, tolerance: f64) -> bool {
        self.error.abs() < tolerance
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadingController {
    /// Radians turned by one held turn key over one tick.
    step: f64,
}

impl HeadingController {
    pub fn new(ship: &ShipParams) -> Self {
        Self {
            step: ship.rotation_rate * ship.dt,
        }
    }

    /// Steers from `heading` toward `target`. `previous` is the heading seen on
    /// the prior tick and feeds the derivative term.
    pub fn steer(&self, heading: f64, previous: f64, target: f64, gains: PdGains) -> Steer {
        let error = normalize_angle(target - heading);
        if error.abs() <= self.step * 0.5 {
            return Steer {
                turn: Turn::None,
                error,
            };
        }

        let angular_velocity = normalize_angle(heading - previous);
        let command = gains.kp * error - gains.kd * angular_velocity;
        let turn = if command > 0.0 {
            Turn::Right
        } else if command < 0.0 {
            Turn::Left
        } else {
            Turn::None
        };
        Steer { turn, error }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn controller() -> HeadingController {
        HeadingController::new(&ShipParams::default())
    }

    #[test]
    fn turns_toward_target_by_shortest_way() {
        let c = controller();
        let right = c.steer(0.0, 0.0, 1.0, PdGains::proportional(0.5));
        assert_eq!(right.turn, Turn::Right);

        let left = c.steer(0.2, 0.2, -2.5, PdGains::proportional(0.5));
        assert_eq!(left.turn, Turn::Left);

        // Across the ±π seam the short way is to the left.
        let seam = c.steer(-3.0, -3.0, 3.0, PdGains::proportional(0.5));
        assert_eq!(seam.turn, Turn::Left);
    }

    #[test]
    fn half_step_deadband() {
        let c = controller();
        let s = c.steer(0.0, 0.0, 0.04, PdGains::proportional(1.0));
        assert_eq!(s.turn, Turn::None);
        assert!(s.aligned(0.06));
    }

    #[test]
    fn derivative_term_brakes_fast_rotation() {
        let c = controller();
        let gains = PdGains { kp: 0.1, kd: 1.0 };
        // Small error to the right but already spinning right quickly.
        let s = c.steer(0.3, 0.1, 0.4, gains);
        assert_eq!(s.turn, Turn::Left);
    }

    #[test]
    fn reverse_heading_picks_a_side() {
        let c = controller();
        let s = c.steer(0.0, 0.0, PI, PdGains::proportional(0.25));
        assert_eq!(s.turn, Turn::Right);
        assert!((s.error - PI).abs() < 1e-12);
    }
}

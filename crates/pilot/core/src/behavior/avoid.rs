use super::{BehaviorContext, Steering};
use crate::action::Turn;
use crate::geometry::{Vec2, normalize_angle};

/// Steers along the summed repulsion of every immediate threat.
///
/// Each threat pushes with `(r_threat + r_craft) / d²` along the direction
/// pointing away from it.
pub fn avoid(ctx: &BehaviorContext<'_>) -> Steering {
    let craft_radius = ctx.config.ship.radius;
    let mut repulsion = Vec2::ZERO;
    let mut any_ahead = false;

    for threat in ctx.assessment.immediate() {
        let d = threat.distance.max(1.0);
        let weight = (threat.radius + craft_radius) / (d * d);
        repulsion += Vec2::from_angle(threat.bearing) * -weight;
        any_ahead |= ctx.in_forward_arc(threat);
    }

    let turn = match repulsion.normalized() {
        Some(direction) => {
            let error = normalize_angle(direction.angle() - ctx.heading());
            if error.abs() <= ctx.config.steering.avoid_deadband {
                Turn::None
            } else if error > 0.0 {
                Turn::Right
            } else {
                Turn::Left
            }
        }
        None => Turn::None,
    };

    Steering {
        thrust: true,
        turn,
        fire: any_ahead,
        holds_heading: true,
        captured: false,
    }
}

use std::f64::consts::PI;

use tracing::debug;

use super::{BehaviorContext, Steering};
use crate::steering::PdGains;

/// Flees the nearest emergency threat (or incoming projectile if there is no
/// emergency), thrusting the whole time and firing at anything ahead.
pub fn evade(ctx: &BehaviorContext<'_>) -> Steering {
    let assessment = ctx.assessment;
    let mut flagged: Vec<_> = assessment.emergency().collect();
    if flagged.is_empty() {
        flagged = assessment.incoming_projectiles().collect();
    }

    let Some(nearest) = flagged
        .iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
    else {
        return Steering::IDLE;
    };

    let escape = nearest.bearing + PI;
    let steer = ctx.controller.steer(
        ctx.heading(),
        ctx.previous_heading,
        escape,
        PdGains::proportional(ctx.config.steering.evade_kp),
    );
    debug!(
        threat = ?nearest.id,
        distance = nearest.distance,
        escape,
        "evading"
    );

    Steering {
        thrust: true,
        turn: steer.turn,
        fire: flagged.iter().any(|t| ctx.in_forward_arc(t)),
        holds_heading: true,
        captured: false,
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Turn;
    use crate::behavior::test_support::*;
    use crate::config::PilotConfig;
    use crate::geometry::Vec2;
    use crate::world::{EntityId, Hazard, HazardSize, KinematicBody};

    use super::*;

    fn rock(x: f64, y: f64) -> Hazard {
        Hazard::new(
            EntityId(1),
            KinematicBody::new(Vec2::new(x, y), Vec2::ZERO, 20.0),
            HazardSize::Medium,
        )
    }

    #[test]
    fn turns_away_and_fires_at_threat_ahead() {
        let config = PilotConfig::default();
        let snap = snapshot(500.0, 500.0, 0.0).with_hazard(rock(560.0, 500.0));
        let assessment = assess(&snap, &config);
        let ctx = BehaviorContext {
            snapshot: &snap,
            assessment: &assessment,
            config: &config,
            controller: controller(&config),
            previous_heading: 0.0,
            pickup: None,
        };

        let s = evade(&ctx);
        assert!(s.thrust);
        assert!(s.fire);
        assert_eq!(s.turn, Turn::Right);
        assert!(s.holds_heading);
    }

    #[test]
    fn threat_behind_is_not_shot() {
        let config = PilotConfig::default();
        // Nose points away from the rock, which is directly behind.
        let snap = snapshot(500.0, 500.0, PI).with_hazard(rock(560.0, 500.0));
        let assessment = assess(&snap, &config);
        let ctx = BehaviorContext {
            snapshot: &snap,
            assessment: &assessment,
            config: &config,
            controller: controller(&config),
            previous_heading: PI,
            pickup: None,
        };

        let s = evade(&ctx);
        assert!(!s.fire);
        assert_eq!(s.turn, Turn::None);
    }
}

use super::{BehaviorContext, Steering};
use crate::steering::PdGains;

/// Flies to the chosen pickup, thrusting only once lined up with it.
pub fn collect(ctx: &BehaviorContext<'_>) -> Steering {
    let Some(choice) = ctx.pickup else {
        return Steering::IDLE;
    };
    let cfg = &ctx.config.pickup;
    let delta = ctx
        .snapshot
        .arena
        .delta(ctx.snapshot.craft.position(), choice.pickup.position);

    let steer = ctx.controller.steer(
        ctx.heading(),
        ctx.previous_heading,
        delta.bearing(),
        PdGains::proportional(ctx.config.steering.pickup_kp),
    );

    Steering {
        thrust: delta.distance > cfg.thrust_distance && steer.aligned(cfg.align_tolerance),
        turn: steer.turn,
        fire: false,
        holds_heading: false,
        captured: delta.distance < cfg.capture_radius,
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Turn;
    use crate::arbiter::best_pickup;
    use crate::behavior::test_support::*;
    use crate::config::PilotConfig;
    use crate::geometry::Vec2;
    use crate::world::{EntityId, Pickup, PickupKind};

    use super::*;

    fn ctx_for(heading: f64, pickup_at: Vec2) -> Steering {
        let config = PilotConfig::default();
        let snap = snapshot(500.0, 500.0, heading).with_pickup(Pickup::new(
            EntityId(4),
            PickupKind::Shield,
            pickup_at,
        ));
        let assessment = assess(&snap, &config);
        let ctx = BehaviorContext {
            snapshot: &snap,
            assessment: &assessment,
            config: &config,
            controller: controller(&config),
            previous_heading: heading,
            pickup: best_pickup(&snap, &config.pickup),
        };
        collect(&ctx)
    }

    #[test]
    fn thrusts_when_lined_up() {
        let s = ctx_for(0.0, Vec2::new(800.0, 500.0));
        assert!(s.thrust);
        assert_eq!(s.turn, Turn::None);
        assert!(!s.captured);
    }

    #[test]
    fn turns_before_thrusting() {
        let s = ctx_for(0.0, Vec2::new(500.0, 800.0));
        assert!(!s.thrust);
        assert_eq!(s.turn, Turn::Right);
    }

    #[test]
    fn capture_radius_clears_target() {
        let s = ctx_for(0.0, Vec2::new(520.0, 500.0));
        assert!(s.captured);
        assert!(!s.thrust);
    }
}

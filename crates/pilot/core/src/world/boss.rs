use crate::geometry::{Arena, Vec2, normalize_angle};

use super::{EntityId, KinematicBody, Projectile, ProjectileOwner};

/// Lifetime of every boss projectile, in ticks.
pub const BOSS_PROJECTILE_LIFETIME: u32 = 60;

/// Standoff distance below which a pursuing boss stops closing in.
const PURSUIT_STOP_DISTANCE: f64 = 200.0;
/// Velocity decay applied while a pursuing boss holds position.
const PURSUIT_BRAKE: f64 = 0.95;
/// Half-width of the sniper's hold band around its preferred distance.
const STANDOFF_BAND: f64 = 50.0;

/// Boss variant.
///
/// Every variant shares the standard pursue-and-shoot behaviour and only
/// overrides the stat table entries that differ. The sniper additionally
/// replaces pursuit with a standoff pattern.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumCount,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BossKind {
    #[default]
    Standard,
    Speed,
    Tank,
    Sniper,
    Swarm,
    Shield,
}

impl BossKind {
    pub const fn radius(self) -> f64 {
        match self {
            Self::Speed => 35.0,
            Self::Tank => 50.0,
            Self::Swarm => 45.0,
            Self::Standard | Self::Sniper | Self::Shield => 40.0,
        }
    }

    /// Cruise speed in px/tick.
    pub const fn pursuit_speed(self) -> f64 {
        match self {
            Self::Speed => 4.0,
            Self::Tank => 1.0,
            Self::Sniper | Self::Shield => 1.5,
            Self::Standard | Self::Swarm => 2.0,
        }
    }

    /// Fraction of the heading error closed per tick.
    pub const fn turn_rate(self) -> f64 {
        match self {
            Self::Sniper => 0.02,
            _ => 0.05,
        }
    }

    /// Ticks between shots.
    pub const fn fire_interval(self) -> u32 {
        match self {
            Self::Speed => 30,
            Self::Tank => 90,
            Self::Sniper => 120,
            Self::Swarm => 45,
            Self::Standard | Self::Shield => 60,
        }
    }

    pub const fn projectile_speed(self) -> f64 {
        match self {
            Self::Tank => 4.0,
            Self::Sniper => 15.0,
            _ => 8.0,
        }
    }

    pub const fn projectile_radius(self) -> f64 {
        match self {
            Self::Speed => 4.0,
            Self::Tank => 8.0,
            Self::Sniper => 3.0,
            _ => 5.0,
        }
    }

    /// Distance the variant tries to hold from its target, if it kites.
    pub const fn preferred_distance(self) -> Option<f64> {
        match self {
            Self::Sniper => Some(400.0),
            _ => None,
        }
    }

    /// Advances heading and velocity one tick toward `target`.
    ///
    /// Position integration is left to the caller so that planner rollouts
    /// and the stand-in host share one advection path.
    pub fn pursue(self, boss: &mut Boss, target: Vec2, arena: &Arena) {
        let delta = arena.delta(boss.body.position, target);
        let error = normalize_angle(delta.bearing() - boss.heading);
        boss.heading = normalize_angle(boss.heading + error * self.turn_rate());

        let speed = self.pursuit_speed();
        let facing = Vec2::from_angle(boss.heading);
        boss.body.velocity = match self.preferred_distance() {
            Some(preferred) if delta.distance < preferred - STANDOFF_BAND => -facing * speed,
            Some(preferred) if delta.distance > preferred + STANDOFF_BAND => facing * speed,
            Some(_) => Vec2::from_angle(boss.heading + std::f64::consts::FRAC_PI_2) * (speed * 0.5),
            None if delta.distance > PURSUIT_STOP_DISTANCE => facing * speed,
            None => boss.body.velocity * PURSUIT_BRAKE,
        };
    }

    /// Ticks the fire cooldown and emits a projectile along the heading once
    /// it has elapsed.
    pub fn fire(self, boss: &mut Boss, id: EntityId) -> Option<Projectile> {
        if boss.fire_cooldown > 0 {
            boss.fire_cooldown -= 1;
            return None;
        }
        boss.fire_cooldown = self.fire_interval();

        let facing = Vec2::from_angle(boss.heading);
        Some(Projectile {
            id,
            body: KinematicBody::new(
                boss.body.position + facing * boss.body.radius,
                facing * self.projectile_speed(),
                self.projectile_radius(),
            ),
            lifetime: BOSS_PROJECTILE_LIFETIME,
            owner: ProjectileOwner::Hostile,
        })
    }
}

/// A boss as seen in one snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Boss {
    pub id: EntityId,
    pub body: KinematicBody,
    pub heading: f64,
    pub health: u32,
    pub fire_cooldown: u32,
    pub kind: BossKind,
}

impl Boss {
    /// A boss of `kind` at rest, using the variant's nominal radius.
    pub fn new(id: EntityId, kind: BossKind, position: Vec2) -> Self {
        Self {
            id,
            body: KinematicBody::new(position, Vec2::ZERO, kind.radius()),
            heading: 0.0,
            health: 50,
            fire_cooldown: kind.fire_interval(),
            kind,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.body.velocity = velocity;
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn variants_override_only_what_differs() {
        assert_eq!(BossKind::Shield.fire_interval(), BossKind::Standard.fire_interval());
        assert_eq!(BossKind::Tank.fire_interval(), 90);
        assert_eq!(BossKind::Sniper.projectile_speed(), 15.0);
        assert!(BossKind::iter().all(|k| k.radius() > 0.0 && k.pursuit_speed() > 0.0));
        assert_eq!(BossKind::Sniper.to_string(), "sniper");
    }

    #[test]
    fn standard_boss_closes_in_and_brakes_near_target() {
        let arena = Arena::new(1000.0, 800.0);
        let mut far = Boss::new(EntityId(1), BossKind::Standard, Vec2::new(100.0, 100.0));
        BossKind::Standard.pursue(&mut far, Vec2::new(700.0, 100.0), &arena);
        assert!(far.body.velocity.x > 0.0);
        assert!((far.body.velocity.length() - 2.0).abs() < 1e-9);

        let mut near = far.with_velocity(Vec2::new(2.0, 0.0));
        BossKind::Standard.pursue(&mut near, Vec2::new(200.0, 100.0), &arena);
        assert!((near.body.velocity.x - 1.9).abs() < 1e-9);
    }

    #[test]
    fn sniper_backs_off_when_too_close() {
        let arena = Arena::new(2000.0, 2000.0);
        let mut sniper = Boss::new(EntityId(2), BossKind::Sniper, Vec2::new(500.0, 500.0));
        BossKind::Sniper.pursue(&mut sniper, Vec2::new(600.0, 500.0), &arena);
        assert!(sniper.body.velocity.x < 0.0);
    }

    #[test]
    fn fire_respects_cooldown() {
        let mut boss = Boss::new(EntityId(3), BossKind::Speed, Vec2::new(0.0, 0.0));
        boss.fire_cooldown = 1;
        assert!(BossKind::Speed.fire(&mut boss, EntityId(10)).is_none());

        let shot = BossKind::Speed.fire(&mut boss, EntityId(11));
        let shot = shot.unwrap();
        assert!(shot.is_hostile());
        assert_eq!(shot.lifetime, BOSS_PROJECTILE_LIFETIME);
        assert!((shot.body.velocity.x - 8.0).abs() < 1e-9);
        assert_eq!(boss.fire_cooldown, 30);
    }
}

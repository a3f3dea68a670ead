//! Per-tick threat classification.
//!
//! Every hazard, hostile projectile and boss is turned into a [`Threat`] with
//! closest-point-of-approach data and a priority, then partitioned into the
//! emergency / immediate / projectile subsets the arbiter counts.

use crate::config::{BossConfig, ThreatConfig};
use crate::geometry::{Arena, Vec2};
use crate::world::{BossKind, CraftState, EntityId, HazardSize, KinematicBody, WorldSnapshot};

/// Assumed closing speed used to turn boss distance into a collision time.
const BOSS_CLOSING_SPEED: f64 = 5.0;

/// Coarse type tag of a threat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ThreatKind {
    Hazard(HazardSize),
    Projectile,
    Boss(BossKind),
}

/// Closest point of approach between two bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Approach {
    /// Ticks until minimum separation (0 if already separating or static).
    pub time: f64,
    /// Squared separation at that time.
    pub distance_sq: f64,
}

impl Approach {
    /// CPA from a wrapped offset and relative velocity.
    pub fn from_relative(offset: Vec2, relative_velocity: Vec2) -> Self {
        let w2 = relative_velocity.length_squared();
        let time = if w2 > 0.0 {
            (-offset.dot(relative_velocity) / w2).max(0.0)
        } else {
            0.0
        };
        let miss = offset + relative_velocity * time;
        Self {
            time,
            distance_sq: miss.length_squared(),
        }
    }
}

/// A body annotated with its danger to the craft.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threat {
    pub id: EntityId,
    pub kind: ThreatKind,
    /// Wrapped offset from the craft.
    pub offset: Vec2,
    pub relative_velocity: Vec2,
    pub distance: f64,
    /// Bearing from the craft to the threat.
    pub bearing: f64,
    /// Effective radius (bosses include the keep-out margin).
    pub radius: f64,
    pub approach: Approach,
    pub will_collide: bool,
    /// CPA time when on a collision course, infinity otherwise.
    pub time_to_collision: f64,
    pub priority: f64,
}

impl Threat {
    pub fn is_projectile(&self) -> bool {
        matches!(self.kind, ThreatKind::Projectile)
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, ThreatKind::Boss(_))
    }

    pub fn hazard_size(&self) -> Option<HazardSize> {
        match self.kind {
            ThreatKind::Hazard(size) => Some(size),
            _ => None,
        }
    }
}

/// Sorted threats plus the subsets derived from them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThreatAssessment {
    /// All threats, highest priority first.
    pub threats: Vec<Threat>,
    emergency_radius: f64,
    danger_radius: f64,
    immediate_window: f64,
    projectile_window: f64,
    /// A boss is inside the keep-out distance.
    pub boss_emergency: bool,
}

impl ThreatAssessment {
    pub fn assess(
        snapshot: &WorldSnapshot,
        craft_radius: f64,
        config: &ThreatConfig,
        boss_config: &BossConfig,
    ) -> Self {
        let arena = &snapshot.arena;
        let craft = &snapshot.craft;
        let mut threats = Vec::with_capacity(
            snapshot.hazards.len() + snapshot.projectiles.len() + snapshot.bosses.len(),
        );

        for hazard in &snapshot.hazards {
            let threat = relative_threat(
                arena,
                craft,
                craft_radius,
                hazard.id,
                ThreatKind::Hazard(hazard.size),
                &hazard.body,
            );
            let r = hazard.body.radius;
            let priority = if threat.will_collide {
                r * 3.0 / (threat.approach.time + 0.1)
            } else {
                r * 2.0 / threat.distance.max(f64::EPSILON)
            };
            threats.push(Threat { priority, ..threat });
        }

        for projectile in snapshot.hostile_projectiles() {
            let threat = relative_threat(
                arena,
                craft,
                craft_radius,
                projectile.id,
                ThreatKind::Projectile,
                &projectile.body,
            );
            let priority = if threat.will_collide {
                200.0 / (threat.approach.time + 0.05)
            } else {
                50.0 / threat.distance.max(f64::EPSILON)
            };
            threats.push(Threat { priority, ..threat });
        }

        let mut boss_emergency = false;
        for boss in &snapshot.bosses {
            let delta = arena.delta(craft.position(), boss.body.position);
            let distance = delta.distance;
            let radius = boss.body.radius + boss_config.keep_out;
            boss_emergency |= distance < boss_config.keep_out;

            let relative_velocity = boss.body.velocity - craft.velocity();
            threats.push(Threat {
                id: boss.id,
                kind: ThreatKind::Boss(boss.kind),
                offset: delta.vector(),
                relative_velocity,
                distance,
                bearing: delta.bearing(),
                radius,
                approach: Approach::from_relative(delta.vector(), relative_velocity),
                will_collide: false,
                time_to_collision: distance / BOSS_CLOSING_SPEED,
                priority: if distance < radius {
                    2000.0 / (distance + 1.0)
                } else {
                    1000.0 / distance.max(f64::EPSILON)
                },
            });
        }

        threats.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        Self {
            threats,
            emergency_radius: config.emergency_radius,
            danger_radius: config.danger_radius,
            immediate_window: config.immediate_window,
            projectile_window: config.projectile_window,
            boss_emergency,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.threats.is_empty()
    }

    pub fn len(&self) -> usize {
        self.threats.len()
    }

    fn in_emergency(&self, t: &Threat) -> bool {
        t.distance < self.emergency_radius + t.radius
    }

    /// Threats inside the emergency radius (grown by their own radius).
    pub fn emergency(&self) -> impl Iterator<Item = &Threat> {
        self.threats.iter().filter(|t| self.in_emergency(t))
    }

    /// Threats colliding soon within the danger radius, plus every emergency.
    pub fn immediate(&self) -> impl Iterator<Item = &Threat> {
        self.threats.iter().filter(|t| {
            (t.time_to_collision < self.immediate_window && t.distance < self.danger_radius)
                || self.in_emergency(t)
        })
    }

    /// Hostile projectiles due to hit within the projectile window.
    pub fn incoming_projectiles(&self) -> impl Iterator<Item = &Threat> {
        self.threats
            .iter()
            .filter(|t| t.is_projectile() && t.time_to_collision < self.projectile_window)
    }

    pub fn hazards(&self) -> impl Iterator<Item = &Threat> {
        self.threats.iter().filter(|t| t.hazard_size().is_some())
    }

    pub fn emergency_count(&self) -> usize {
        self.emergency().count()
    }

    pub fn immediate_count(&self) -> usize {
        self.immediate().count()
    }

    pub fn incoming_projectile_count(&self) -> usize {
        self.incoming_projectiles().count()
    }
}

fn relative_threat(
    arena: &Arena,
    craft: &CraftState,
    craft_radius: f64,
    id: EntityId,
    kind: ThreatKind,
    body: &KinematicBody,
) -> Threat {
    let delta = arena.delta(craft.position(), body.position);
    let relative_velocity = body.velocity - craft.velocity();
    let approach = Approach::from_relative(delta.vector(), relative_velocity);
    let reach = craft_radius + body.radius;
    let will_collide = approach.distance_sq < reach * reach;

    Threat {
        id,
        kind,
        offset: delta.vector(),
        relative_velocity,
        distance: delta.distance,
        bearing: delta.bearing(),
        radius: body.radius,
        approach,
        will_collide,
        time_to_collision: if will_collide {
            approach.time
        } else {
            f64::INFINITY
        },
        priority: 0.0,
    }
}

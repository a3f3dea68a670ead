use crate::geometry::Vec2;

use super::EntityId;

/// Power-up type dropped into the arena.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum PickupKind {
    Shield,
    RapidFire,
    TripleShot,
    SlowTime,
    Companion,
    Bomb,
    SpeedBoost,
    DoublePoints,
    AutoAim,
    ExtraLife,
    DoubleDamage,
}

impl PickupKind {
    /// Desirability before situational bonuses.
    pub const fn base_desirability(self) -> f64 {
        match self {
            Self::Shield => 0.8,
            Self::RapidFire => 0.6,
            Self::TripleShot => 0.55,
            Self::SlowTime => 0.45,
            _ => 0.3,
        }
    }
}

/// A pickup waiting to be collected.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pickup {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f64,
    pub kind: PickupKind,
}

impl Pickup {
    pub fn new(id: EntityId, kind: PickupKind, position: Vec2) -> Self {
        Self {
            id,
            position,
            radius: 20.0,
            kind,
        }
    }
}

use super::{EntityId, KinematicBody};

/// Fragment size class of a rock. Rocks split large → medium → small.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum HazardSize {
    Large,
    Medium,
    Small,
}

impl HazardSize {
    /// Nominal collision radius for this size.
    pub const fn radius(self) -> f64 {
        match self {
            Self::Large => 40.0,
            Self::Medium => 20.0,
            Self::Small => 10.0,
        }
    }

    /// Target preference rank: small fragments are worth the most.
    pub const fn rank(self) -> u32 {
        match self {
            Self::Small => 3,
            Self::Medium => 2,
            Self::Large => 1,
        }
    }

    /// Infers a size class from a radius (for hosts that only report radii).
    pub fn from_radius(radius: f64) -> Self {
        if radius >= 30.0 {
            Self::Large
        } else if radius >= 15.0 {
            Self::Medium
        } else {
            Self::Small
        }
    }
}

/// A drifting rock.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hazard {
    pub id: EntityId,
    pub body: KinematicBody,
    pub size: HazardSize,
}

impl Hazard {
    pub fn new(id: EntityId, body: KinematicBody, size: HazardSize) -> Self {
        Self { id, body, size }
    }
}

/// Who fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ProjectileOwner {
    Craft,
    Hostile,
}

/// A shot in flight with a remaining lifetime in ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projectile {
    pub id: EntityId,
    pub body: KinematicBody,
    pub lifetime: u32,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn hostile(id: EntityId, body: KinematicBody, lifetime: u32) -> Self {
        Self {
            id,
            body,
            lifetime,
            owner: ProjectileOwner::Hostile,
        }
    }

    pub fn is_hostile(&self) -> bool {
        self.owner == ProjectileOwner::Hostile
    }
}

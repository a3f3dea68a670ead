//! Control outputs: the reactive intent and the planner's movement alphabet.
use bitflags::bitflags;

/// Discrete turn command for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Turn {
    Left,
    Right,
    #[default]
    None,
}

impl Turn {
    /// Heading change direction: left is negative.
    pub const fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::None => 0.0,
        }
    }
}

bitflags! {
    /// Key mask view of a [`ControlIntent`] for hosts that read raw input.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ControlKeys: u8 {
        const THRUST = 1 << 0;
        const LEFT   = 1 << 1;
        const RIGHT  = 1 << 2;
        const FIRE   = 1 << 3;
    }
}

/// What the pilot asks the host to do this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlIntent {
    pub thrust: bool,
    pub turn: Turn,
    pub fire: bool,
}

impl ControlIntent {
    pub const IDLE: Self = Self {
        thrust: false,
        turn: Turn::None,
        fire: false,
    };

    pub fn keys(&self) -> ControlKeys {
        let mut keys = ControlKeys::empty();
        keys.set(ControlKeys::THRUST, self.thrust);
        keys.set(ControlKeys::LEFT, self.turn == Turn::Left);
        keys.set(ControlKeys::RIGHT, self.turn == Turn::Right);
        keys.set(ControlKeys::FIRE, self.fire);
        keys
    }

    /// Movement part only.
    pub fn movement(&self) -> MoveAction {
        MoveAction::from_parts(self.thrust, self.turn)
    }
}

impl From<ControlKeys> for ControlIntent {
    fn from(keys: ControlKeys) -> Self {
        let turn = match (keys.contains(ControlKeys::LEFT), keys.contains(ControlKeys::RIGHT)) {
            (true, false) => Turn::Left,
            (false, true) => Turn::Right,
            _ => Turn::None,
        };
        Self {
            thrust: keys.contains(ControlKeys::THRUST),
            turn,
            fire: keys.contains(ControlKeys::FIRE),
        }
    }
}

/// Movement-only action used by the planner.
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
    strum::FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum MoveAction {
    #[default]
    Coast,
    Thrust,
    TurnLeft,
    TurnRight,
    ThrustLeft,
    ThrustRight,
}

impl MoveAction {
    pub const fn from_parts(thrust: bool, turn: Turn) -> Self {
        match (thrust, turn) {
            (false, Turn::None) => Self::Coast,
            (true, Turn::None) => Self::Thrust,
            (false, Turn::Left) => Self::TurnLeft,
            (false, Turn::Right) => Self::TurnRight,
            (true, Turn::Left) => Self::ThrustLeft,
            (true, Turn::Right) => Self::ThrustRight,
        }
    }

    pub const fn thrust(self) -> bool {
        matches!(self, Self::Thrust | Self::ThrustLeft | Self::ThrustRight)
    }

    pub const fn turn(self) -> Turn {
        match self {
            Self::TurnLeft | Self::ThrustLeft => Turn::Left,
            Self::TurnRight | Self::ThrustRight => Turn::Right,
            Self::Coast | Self::Thrust => Turn::None,
        }
    }

    /// Lifts this movement into a full intent with the given fire flag.
    pub const fn with_fire(self, fire: bool) -> ControlIntent {
        ControlIntent {
            thrust: self.thrust(),
            turn: self.turn(),
            fire,
        }
    }
}

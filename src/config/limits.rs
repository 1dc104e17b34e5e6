//! Limit switch and soft limit configuration types.

use serde::Deserialize;

use super::units::Length;
use crate::motion::Direction;

/// Electrical polarity of a limit switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitSwitchPolarity {
    /// Circuit closes when the switch is pressed.
    #[default]
    NormallyOpen,
    /// Circuit opens when the switch is pressed.
    NormallyClosed,
}

impl LimitSwitchPolarity {
    /// Whether a raw "circuit closed" reading means the switch is pressed.
    #[inline]
    pub const fn is_active(self, circuit_closed: bool) -> bool {
        match self {
            LimitSwitchPolarity::NormallyOpen => circuit_closed,
            LimitSwitchPolarity::NormallyClosed => !circuit_closed,
        }
    }
}

/// Where the limit switches of an axis are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitSwitchSource {
    /// Wired to the axis' own controller.
    Local,
    /// Wired to another device on the bus.
    Remote,
}

/// Soft travel limits in display units.
///
/// Either side may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SoftLimits {
    /// Lowest allowed position.
    pub reverse: Option<Length>,
    /// Highest allowed position.
    pub forward: Option<Length>,
}

impl SoftLimits {
    /// Create new soft limits.
    pub fn new(reverse: Option<Length>, forward: Option<Length>) -> Self {
        Self { reverse, forward }
    }

    /// Limit on one side.
    pub fn get(&self, direction: Direction) -> Option<Length> {
        match direction {
            Direction::Forward => self.forward,
            Direction::Reverse => self.reverse,
            Direction::Neutral => None,
        }
    }

    /// Check if limits are valid (reverse < forward when both set).
    pub fn is_valid(&self) -> bool {
        match (self.reverse, self.forward) {
            (Some(r), Some(f)) => r < f,
            _ => true,
        }
    }

    /// Check if a position is within limits.
    pub fn contains(&self, position: Length) -> bool {
        self.reverse.map_or(true, |r| position >= r) && self.forward.map_or(true, |f| position <= f)
    }

    /// True if travelling in `direction` from `position` would cross a limit.
    pub fn blocks(&self, direction: Direction, position: Length) -> bool {
        match direction {
            Direction::Forward => self.forward.map_or(false, |f| position >= f),
            Direction::Reverse => self.reverse.map_or(false, |r| position <= r),
            Direction::Neutral => false,
        }
    }
}

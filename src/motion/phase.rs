//! Phase (sign convention) of a motor or sensor.

use super::Direction;
use crate::config::units::{Length, Rate};

/// Sign convention applied to values crossing into native units.
///
/// `Reversed` means positive native output corresponds to the logically
/// negative direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Native and logical signs agree.
    #[default]
    Normal,
    /// Native sign is the opposite of the logical sign.
    Reversed,
}

impl Phase {
    /// Phase from a "reversed" flag.
    #[inline]
    pub const fn from_reversed(reversed: bool) -> Self {
        if reversed {
            Phase::Reversed
        } else {
            Phase::Normal
        }
    }

    /// Compose two phases; two reversals cancel.
    #[inline]
    pub const fn then(self, other: Phase) -> Self {
        match (self, other) {
            (Phase::Normal, p) | (p, Phase::Normal) => p,
            (Phase::Reversed, Phase::Reversed) => Phase::Normal,
        }
    }

    /// True for Reversed.
    #[inline]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Phase::Reversed)
    }

    /// Apply to a length (phase is its own inverse).
    #[inline]
    pub fn length(self, value: Length) -> Length {
        match self {
            Phase::Normal => value,
            Phase::Reversed => -value,
        }
    }

    /// Apply to a rate (phase is its own inverse).
    #[inline]
    pub fn rate(self, value: Rate) -> Rate {
        match self {
            Phase::Normal => value,
            Phase::Reversed => -value,
        }
    }

    /// Apply to a direction (phase is its own inverse).
    #[inline]
    pub const fn direction(self, direction: Direction) -> Direction {
        match self {
            Phase::Normal => direction,
            Phase::Reversed => direction.opposite(),
        }
    }
}

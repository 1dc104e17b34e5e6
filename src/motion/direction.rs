//! Direction of travel.

use serde::Deserialize;

/// Logical direction of axis travel.
///
/// Rates and distances are always non-negative magnitudes; polarity is carried
/// by the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward the forward limit (positive positions).
    Forward,
    /// Toward the reverse limit (negative positions).
    Reverse,
    /// No travel.
    Neutral,
}

impl Direction {
    /// Both travel directions, forward first.
    pub const TRAVEL: [Direction; 2] = [Direction::Forward, Direction::Reverse];

    /// Get direction from a signed canonical value.
    #[inline]
    pub fn from_sign(value: i64) -> Self {
        match value {
            v if v > 0 => Direction::Forward,
            v if v < 0 => Direction::Reverse,
            _ => Direction::Neutral,
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub const fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
            Direction::Neutral => 0,
        }
    }

    /// True for Neutral.
    #[inline]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Direction::Neutral)
    }

    /// Opposite travel direction; Neutral stays Neutral.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
            Direction::Neutral => Direction::Neutral,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
            Direction::Neutral => "neutral",
        }
    }
}

impl core::ops::Not for Direction {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opposite()
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_round_trip() {
        for d in [Direction::Forward, Direction::Reverse, Direction::Neutral] {
            assert_eq!(Direction::from_sign(d.sign()), d);
        }
    }

    #[test]
    fn test_opposite() {
        assert_eq!(!Direction::Forward, Direction::Reverse);
        assert_eq!(!Direction::Neutral, Direction::Neutral);
    }
}

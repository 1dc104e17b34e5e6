//! Capability flags and their dependency rules.
//!
//! A capability names one thing an axis (or a backend) can do. Capabilities
//! are declared once in the axis configuration and never change afterwards.

use bitflags::bitflags;

use crate::motion::Direction;

bitflags! {
    /// Set of named capabilities of an axis or a controller backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u32 {
        /// Output can be driven in a commanded direction.
        const CONTROL_DIRECTION                       = 1 << 0;
        /// Closed-loop (or software) absolute position control.
        const CONTROL_POSITION                        = 1 << 1;
        /// Output rate can be commanded.
        const CONTROL_RATE                            = 1 << 2;
        /// Forward travel is allowed.
        const FORWARD                                 = 1 << 3;
        /// Reverse travel is allowed.
        const REVERSE                                 = 1 << 4;
        /// A hard limit switch stops forward travel.
        const FORWARD_HARD_LIMIT_SWITCH               = 1 << 5;
        /// A hard limit switch stops reverse travel.
        const REVERSE_HARD_LIMIT_SWITCH               = 1 << 6;
        /// A soft limit stops forward travel.
        const FORWARD_SOFT_LIMIT_SWITCH               = 1 << 7;
        /// A soft limit stops reverse travel.
        const REVERSE_SOFT_LIMIT_SWITCH               = 1 << 8;
        /// Position can be read from a sensor.
        const READ_POSITION                           = 1 << 9;
        /// Rate can be read from a sensor.
        const READ_RATE                               = 1 << 10;
        /// Direction of travel can be read.
        const READ_DIRECTION                          = 1 << 11;
        /// A gearing multiplier sits between sensor and drive output.
        const SENSOR_TO_DRIVE_SCALE                   = 1 << 12;
        /// A default rate is configured for seeks and calibration.
        const DEFAULT_RATE                            = 1 << 13;
        /// Neutral output behavior (brake/coast) is configured.
        const NEUTRAL_BEHAVIOR                        = 1 << 14;
        /// Axis is known to be absent; every request is downgraded to Disabled.
        const DISCONNECTED                            = 1 << 15;
        /// Limit switches are wired to the axis' own controller.
        const LOCAL_HARD_LIMIT_SWITCH                 = 1 << 16;
        /// Limit switches are wired to a different device.
        const REMOTE_HARD_LIMIT_SWITCH                = 1 << 17;
        /// Forward limit switch re-zeroes the position sensor.
        const FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR = 1 << 18;
        /// Reverse limit switch re-zeroes the position sensor.
        const REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR = 1 << 19;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::empty()
    }
}

/// Prerequisites of a single capability.
#[derive(Debug, Clone, Copy)]
pub struct Prerequisite {
    /// Capability the rule applies to.
    pub capability: Capabilities,
    /// All of these must be present.
    pub all_of: Capabilities,
    /// At least one of these must be present (ignored when empty).
    pub any_of: Capabilities,
}

const fn rule(capability: Capabilities, all_of: Capabilities, any_of: Capabilities) -> Prerequisite {
    Prerequisite {
        capability,
        all_of,
        any_of,
    }
}

const NONE: Capabilities = Capabilities::empty();

/// Dependency table checked at configuration construction.
pub const PREREQUISITES: &[Prerequisite] = &[
    rule(Capabilities::FORWARD, Capabilities::CONTROL_DIRECTION, NONE),
    rule(Capabilities::REVERSE, Capabilities::CONTROL_DIRECTION, NONE),
    rule(Capabilities::CONTROL_RATE, Capabilities::CONTROL_DIRECTION, NONE),
    rule(Capabilities::CONTROL_POSITION, Capabilities::READ_POSITION, NONE),
    rule(
        Capabilities::FORWARD_HARD_LIMIT_SWITCH,
        Capabilities::FORWARD,
        Capabilities::LOCAL_HARD_LIMIT_SWITCH.union(Capabilities::REMOTE_HARD_LIMIT_SWITCH),
    ),
    rule(
        Capabilities::REVERSE_HARD_LIMIT_SWITCH,
        Capabilities::REVERSE,
        Capabilities::LOCAL_HARD_LIMIT_SWITCH.union(Capabilities::REMOTE_HARD_LIMIT_SWITCH),
    ),
    rule(
        Capabilities::FORWARD_SOFT_LIMIT_SWITCH,
        Capabilities::FORWARD.union(Capabilities::READ_POSITION),
        NONE,
    ),
    rule(
        Capabilities::REVERSE_SOFT_LIMIT_SWITCH,
        Capabilities::REVERSE.union(Capabilities::READ_POSITION),
        NONE,
    ),
    rule(Capabilities::READ_DIRECTION, Capabilities::READ_RATE, NONE),
    rule(
        Capabilities::SENSOR_TO_DRIVE_SCALE,
        NONE,
        Capabilities::READ_POSITION
            .union(Capabilities::READ_RATE)
            .union(Capabilities::CONTROL_RATE),
    ),
    rule(Capabilities::DEFAULT_RATE, Capabilities::CONTROL_RATE, NONE),
    rule(Capabilities::NEUTRAL_BEHAVIOR, Capabilities::CONTROL_DIRECTION, NONE),
    rule(
        Capabilities::LOCAL_HARD_LIMIT_SWITCH,
        NONE,
        Capabilities::FORWARD_HARD_LIMIT_SWITCH.union(Capabilities::REVERSE_HARD_LIMIT_SWITCH),
    ),
    rule(
        Capabilities::REMOTE_HARD_LIMIT_SWITCH,
        NONE,
        Capabilities::FORWARD_HARD_LIMIT_SWITCH.union(Capabilities::REVERSE_HARD_LIMIT_SWITCH),
    ),
    rule(
        Capabilities::FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR,
        Capabilities::FORWARD_HARD_LIMIT_SWITCH.union(Capabilities::READ_POSITION),
        NONE,
    ),
    rule(
        Capabilities::REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR,
        Capabilities::REVERSE_HARD_LIMIT_SWITCH.union(Capabilities::READ_POSITION),
        NONE,
    ),
];

/// Pairs that may not be declared together.
pub const MUTUALLY_EXCLUSIVE: &[Capabilities] = &[Capabilities::LOCAL_HARD_LIMIT_SWITCH
    .union(Capabilities::REMOTE_HARD_LIMIT_SWITCH)];

impl Prerequisite {
    /// Return the unmet part of this rule for `declared`, if any.
    pub fn unmet(&self, declared: Capabilities) -> Option<Capabilities> {
        if !declared.contains(self.capability) {
            return None;
        }
        let missing_all = self.all_of.difference(declared);
        if !missing_all.is_empty() {
            return Some(missing_all);
        }
        if !self.any_of.is_empty() && !declared.intersects(self.any_of) {
            return Some(self.any_of);
        }
        None
    }
}

impl Capabilities {
    /// True if every capability in `other` is present.
    #[inline]
    pub fn has_all(self, other: Capabilities) -> bool {
        self.contains(other)
    }

    /// True if at least one capability in `other` is present.
    #[inline]
    pub fn has_any(self, other: Capabilities) -> bool {
        self.intersects(other)
    }

    /// Capabilities of `other` that are absent from `self`.
    #[inline]
    pub fn missing(self, other: Capabilities) -> Capabilities {
        other.difference(self)
    }

    /// Travel capability for `direction` (empty for neutral).
    pub const fn travel(direction: Direction) -> Capabilities {
        match direction {
            Direction::Forward => Capabilities::FORWARD,
            Direction::Reverse => Capabilities::REVERSE,
            Direction::Neutral => Capabilities::empty(),
        }
    }

    /// Hard limit switch capability for `direction`.
    pub const fn hard_limit_switch(direction: Direction) -> Capabilities {
        match direction {
            Direction::Forward => Capabilities::FORWARD_HARD_LIMIT_SWITCH,
            Direction::Reverse => Capabilities::REVERSE_HARD_LIMIT_SWITCH,
            Direction::Neutral => Capabilities::empty(),
        }
    }

    /// Soft limit capability for `direction`.
    pub const fn soft_limit_switch(direction: Direction) -> Capabilities {
        match direction {
            Direction::Forward => Capabilities::FORWARD_SOFT_LIMIT_SWITCH,
            Direction::Reverse => Capabilities::REVERSE_SOFT_LIMIT_SWITCH,
            Direction::Neutral => Capabilities::empty(),
        }
    }

    /// Sensor-reset capability of the hard limit switch in `direction`.
    pub const fn resets_sensor(direction: Direction) -> Capabilities {
        match direction {
            Direction::Forward => Capabilities::FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR,
            Direction::Reverse => Capabilities::REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR,
            Direction::Neutral => Capabilities::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_requires_control_direction() {
        let r = PREREQUISITES
            .iter()
            .find(|r| r.capability == Capabilities::FORWARD)
            .unwrap();
        assert_eq!(r.unmet(Capabilities::FORWARD), Some(Capabilities::CONTROL_DIRECTION));
        assert_eq!(
            r.unmet(Capabilities::FORWARD | Capabilities::CONTROL_DIRECTION),
            None
        );
    }

    #[test]
    fn test_any_of_rule() {
        let r = PREREQUISITES
            .iter()
            .find(|r| r.capability == Capabilities::FORWARD_HARD_LIMIT_SWITCH)
            .unwrap();
        let base = Capabilities::FORWARD_HARD_LIMIT_SWITCH
            | Capabilities::FORWARD
            | Capabilities::CONTROL_DIRECTION;
        assert!(r.unmet(base).is_some());
        assert!(r.unmet(base | Capabilities::REMOTE_HARD_LIMIT_SWITCH).is_none());
    }

    #[test]
    fn test_undeclared_rule_is_ignored() {
        for r in PREREQUISITES {
            assert!(r.unmet(Capabilities::empty()).is_none());
        }
    }

    #[test]
    fn test_missing() {
        let have = Capabilities::CONTROL_DIRECTION | Capabilities::FORWARD;
        let want = Capabilities::FORWARD | Capabilities::REVERSE;
        assert_eq!(have.missing(want), Capabilities::REVERSE);
        assert!(have.has_any(want));
        assert!(!have.has_all(want));
    }
}

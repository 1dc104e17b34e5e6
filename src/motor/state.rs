//! Motor target states.
//!
//! A target state is an immutable value: the motor replaces it on every
//! accepted transition and never edits it in place.

use core::fmt;

use crate::backend::ControllerState;
use crate::config::units::{Length, Rate};
use crate::config::Capabilities;
use crate::error::MotorError;
use crate::motion::Direction;

/// The operation a motor is commanded to pursue.
///
/// Two states are equal when their variant and every parameter are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetState {
    /// Output off.
    #[default]
    Disabled,
    /// Hold wherever the axis currently is.
    HoldingCurrentPosition,
    /// Drive in a direction at a non-negative rate.
    MovingInDirectionAtRate {
        /// Direction of travel.
        direction: Direction,
        /// Rate magnitude in display units.
        rate: Rate,
    },
    /// Drive to an absolute display position.
    MovingToAbsolutePosition {
        /// Target position.
        position: Length,
    },
    /// Drive a non-negative distance in a direction.
    MovingToRelativePosition {
        /// Direction of travel.
        direction: Direction,
        /// Distance magnitude in display units.
        distance: Length,
    },
    /// Seek the hard limit switch in a direction, then re-zero the sensor.
    CalibratingSensorInDirection {
        /// Direction of the limit to seek.
        direction: Direction,
    },
}

impl TargetState {
    /// Operation name, used in errors and logs.
    pub const fn operation(&self) -> &'static str {
        match self {
            TargetState::Disabled => "disable",
            TargetState::HoldingCurrentPosition => "hold_current_position",
            TargetState::MovingInDirectionAtRate { .. } => "move_in_direction_at_rate",
            TargetState::MovingToAbsolutePosition { .. } => "move_to_absolute_position",
            TargetState::MovingToRelativePosition { .. } => "move_to_relative_position",
            TargetState::CalibratingSensorInDirection { .. } => "calibrate_sensor_in_direction",
        }
    }

    /// Direction of travel, if the state has one.
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            TargetState::MovingInDirectionAtRate { direction, .. }
            | TargetState::MovingToRelativePosition { direction, .. }
            | TargetState::CalibratingSensorInDirection { direction } => Some(*direction),
            _ => None,
        }
    }

    /// Capabilities the axis must declare to enter this state.
    pub fn required_capabilities(&self) -> Capabilities {
        match *self {
            TargetState::Disabled | TargetState::HoldingCurrentPosition => Capabilities::empty(),
            TargetState::MovingInDirectionAtRate { direction, .. } => {
                Capabilities::CONTROL_DIRECTION
                    | Capabilities::CONTROL_RATE
                    | Capabilities::travel(direction)
            }
            TargetState::MovingToAbsolutePosition { .. } => {
                Capabilities::CONTROL_POSITION | Capabilities::READ_POSITION
            }
            TargetState::MovingToRelativePosition { direction, .. } => {
                Capabilities::CONTROL_POSITION
                    | Capabilities::READ_POSITION
                    | Capabilities::travel(direction)
            }
            TargetState::CalibratingSensorInDirection { direction } => {
                Capabilities::CONTROL_DIRECTION
                    | Capabilities::CONTROL_RATE
                    | Capabilities::DEFAULT_RATE
                    | Capabilities::travel(direction)
                    | Capabilities::hard_limit_switch(direction)
                    | Capabilities::resets_sensor(direction)
            }
        }
    }

    /// Check parameters that do not depend on the axis.
    pub fn validate(&self) -> Result<(), MotorError> {
        if matches!(self.direction(), Some(Direction::Neutral)) {
            return Err(MotorError::InvalidArgument("neutral direction for a directional move"));
        }
        match self {
            TargetState::MovingInDirectionAtRate { rate, .. } if rate.is_negative() => {
                Err(MotorError::InvalidArgument("negative rate"))
            }
            TargetState::MovingToRelativePosition { distance, .. } if distance.is_negative() => {
                Err(MotorError::InvalidArgument("negative distance"))
            }
            _ => Ok(()),
        }
    }

    /// Native controller state this target maps to.
    pub const fn controller_state(&self) -> ControllerState {
        match self {
            TargetState::Disabled => ControllerState::Disabled,
            TargetState::HoldingCurrentPosition => ControllerState::HoldingPosition,
            TargetState::MovingToAbsolutePosition { .. }
            | TargetState::MovingToRelativePosition { .. } => ControllerState::SetPosition,
            TargetState::MovingInDirectionAtRate { .. }
            | TargetState::CalibratingSensorInDirection { .. } => ControllerState::Moving,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetState::Disabled => write!(f, "Disabled"),
            TargetState::HoldingCurrentPosition => write!(f, "HoldingCurrentPosition"),
            TargetState::MovingInDirectionAtRate { direction, rate } => {
                write!(f, "MovingInDirectionAtRate({}, {})", direction, rate)
            }
            TargetState::MovingToAbsolutePosition { position } => {
                write!(f, "MovingToAbsolutePosition({})", position)
            }
            TargetState::MovingToRelativePosition { direction, distance } => {
                write!(f, "MovingToRelativePosition({}, {})", direction, distance)
            }
            TargetState::CalibratingSensorInDirection { direction } => {
                write!(f, "CalibratingSensorInDirection({})", direction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_includes_parameters() {
        let a = TargetState::MovingInDirectionAtRate {
            direction: Direction::Forward,
            rate: Rate::inches_per_second(10.0),
        };
        let b = TargetState::MovingInDirectionAtRate {
            direction: Direction::Forward,
            rate: Rate::inches_per_second(10.5),
        };
        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_ne!(TargetState::Disabled, TargetState::HoldingCurrentPosition);
    }

    #[test]
    fn test_reverse_requires_reverse() {
        let state = TargetState::MovingInDirectionAtRate {
            direction: Direction::Reverse,
            rate: Rate::inches_per_second(5.0),
        };
        assert!(state.required_capabilities().contains(Capabilities::REVERSE));
        assert!(!state.required_capabilities().contains(Capabilities::FORWARD));
    }

    #[test]
    fn test_validate() {
        let neutral = TargetState::MovingToRelativePosition {
            direction: Direction::Neutral,
            distance: Length::inches(1.0),
        };
        assert!(matches!(neutral.validate(), Err(MotorError::InvalidArgument(_))));

        let negative = TargetState::MovingInDirectionAtRate {
            direction: Direction::Forward,
            rate: Rate::inches_per_second(-1.0),
        };
        assert!(matches!(negative.validate(), Err(MotorError::InvalidArgument(_))));
        assert!(TargetState::Disabled.validate().is_ok());
    }

    #[test]
    fn test_controller_state_mapping() {
        assert_eq!(
            TargetState::CalibratingSensorInDirection { direction: Direction::Reverse }
                .controller_state(),
            ControllerState::Moving
        );
        assert_eq!(
            TargetState::HoldingCurrentPosition.controller_state(),
            ControllerState::HoldingPosition
        );
    }
}

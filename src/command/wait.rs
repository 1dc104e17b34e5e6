//! Commands that poll a completion predicate without setting a target.

use super::{Command, CommandStatus};
use crate::backend::ControllerBackend;
use crate::config::units::{Length, Rate};
use crate::error::Result;
use crate::motion::Direction;
use crate::motor::{Motor, TargetState};

/// Complete once the hard limit switch at one end is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitForHardLimitSwitch {
    /// End of travel to watch.
    pub direction: Direction,
    /// Take exclusive use of the axis while waiting.
    pub owns_axis: bool,
}

impl WaitForHardLimitSwitch {
    /// Watch the switch at the `direction` end.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            owns_axis: false,
        }
    }

    /// Hold the axis for the duration of the wait.
    pub fn owning(mut self) -> Self {
        self.owns_axis = true;
        self
    }
}

impl Command for WaitForHardLimitSwitch {
    fn name(&self) -> &'static str {
        "WaitForHardLimitSwitch"
    }

    fn requires_axis(&self) -> bool {
        self.owns_axis
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(None)
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        Ok(status(motor.hard_limit_switch_active(self.direction)?))
    }
}

/// Complete once the position error is within a tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitForTargetPosition {
    /// Allowed position error.
    pub tolerance: Length,
    /// Take exclusive use of the axis while waiting.
    pub owns_axis: bool,
}

impl WaitForTargetPosition {
    /// Wait for the position to settle within `tolerance`.
    pub fn new(tolerance: Length) -> Self {
        Self {
            tolerance,
            owns_axis: false,
        }
    }

    /// Hold the axis for the duration of the wait.
    pub fn owning(mut self) -> Self {
        self.owns_axis = true;
        self
    }
}

impl Command for WaitForTargetPosition {
    fn name(&self) -> &'static str {
        "WaitForTargetPosition"
    }

    fn requires_axis(&self) -> bool {
        self.owns_axis
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(None)
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        Ok(status(motor.position_error_within(self.tolerance)?))
    }
}

/// Complete once the rate error is within a tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitForTargetRate {
    /// Allowed rate error.
    pub tolerance: Rate,
    /// Take exclusive use of the axis while waiting.
    pub owns_axis: bool,
}

impl WaitForTargetRate {
    /// Wait for the rate to settle within `tolerance`.
    pub fn new(tolerance: Rate) -> Self {
        Self {
            tolerance,
            owns_axis: false,
        }
    }

    /// Hold the axis for the duration of the wait.
    pub fn owning(mut self) -> Self {
        self.owns_axis = true;
        self
    }
}

impl Command for WaitForTargetRate {
    fn name(&self) -> &'static str {
        "WaitForTargetRate"
    }

    fn requires_axis(&self) -> bool {
        self.owns_axis
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(None)
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        Ok(status(motor.rate_error_within(self.tolerance)?))
    }
}

fn status(done: bool) -> CommandStatus {
    if done {
        CommandStatus::Complete
    } else {
        CommandStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SimulatedController, SmartBackend};
    use crate::config::{AxisConfig, Capabilities, LimitSwitchPolarity, UnitExt};
    use crate::error::{Error, MotorError};

    fn motor() -> Motor<SmartBackend<SimulatedController>> {
        let config = AxisConfig::builder("lift")
            .capabilities(
                Capabilities::CONTROL_DIRECTION
                    | Capabilities::CONTROL_RATE
                    | Capabilities::REVERSE
                    | Capabilities::READ_POSITION
                    | Capabilities::READ_RATE
                    | Capabilities::REVERSE_HARD_LIMIT_SWITCH
                    | Capabilities::LOCAL_HARD_LIMIT_SWITCH,
            )
            .hard_limit(
                Direction::Reverse,
                Some(0.0.inches()),
                LimitSwitchPolarity::NormallyClosed,
            )
            .build()
            .unwrap();
        Motor::new(config, SmartBackend::new(SimulatedController::new())).unwrap()
    }

    #[test]
    fn test_waits_do_not_own_the_axis() {
        let mut motor = motor();
        let mut wait = WaitForHardLimitSwitch::new(Direction::Reverse);
        assert!(!wait.requires_axis());
        wait.activate(&mut motor).unwrap();
        wait.interrupt(&mut motor).unwrap();
        assert_eq!(motor.backend().controller().command_count(), 0);
        assert!(WaitForHardLimitSwitch::new(Direction::Reverse).owning().requires_axis());
    }

    #[test]
    fn test_limit_switch_polarity() {
        let mut motor = motor();
        let mut wait = WaitForHardLimitSwitch::new(Direction::Reverse);
        // Normally closed: an intact circuit means the switch is released.
        motor
            .backend_mut()
            .controller_mut()
            .set_limit_switch_closed(Direction::Reverse, true);
        assert_eq!(wait.poll(&mut motor).unwrap(), CommandStatus::Running);
        motor
            .backend_mut()
            .controller_mut()
            .set_limit_switch_closed(Direction::Reverse, false);
        assert_eq!(wait.poll(&mut motor).unwrap(), CommandStatus::Complete);
    }

    #[test]
    fn test_rate_wait_follows_target() {
        let mut motor = motor();
        let mut wait = WaitForTargetRate::new(0.1.inches_per_second());
        // No rate target while disabled.
        assert_eq!(wait.poll(&mut motor).unwrap(), CommandStatus::Running);

        motor
            .move_in_direction_at_rate(Direction::Reverse, 3.0.inches_per_second())
            .unwrap();
        assert_eq!(wait.poll(&mut motor).unwrap(), CommandStatus::Complete);
    }

    #[test]
    fn test_unsupported_predicate() {
        let config = AxisConfig::builder("roller")
            .capabilities(Capabilities::CONTROL_DIRECTION | Capabilities::CONTROL_RATE)
            .build()
            .unwrap();
        let mut motor = Motor::new(config, SmartBackend::new(SimulatedController::new())).unwrap();
        let mut wait = WaitForTargetPosition::new(1.0.inches());
        assert!(matches!(
            wait.poll(&mut motor),
            Err(Error::Motor(MotorError::UnsupportedOperation { .. }))
        ));
    }
}

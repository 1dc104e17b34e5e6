//! Commands that own the axis and set its target state.

use super::{Command, CommandStatus, Completion};
use crate::backend::ControllerBackend;
use crate::config::units::{Length, Rate};
use crate::error::Result;
use crate::motion::Direction;
use crate::motor::{Motor, TargetState};

/// Turn the output off. Always issued, even when already disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disable;

impl Command for Disable {
    fn name(&self) -> &'static str {
        "Disable"
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(Some(TargetState::Disabled))
    }

    fn poll<B: ControllerBackend>(&mut self, _motor: &mut Motor<B>) -> Result<CommandStatus> {
        Ok(CommandStatus::Complete)
    }

    fn interrupt<B: ControllerBackend>(&mut self, _motor: &mut Motor<B>) -> Result<()> {
        Ok(())
    }
}

/// Hold the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hold;

impl Command for Hold {
    fn name(&self) -> &'static str {
        "Hold"
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(Some(TargetState::HoldingCurrentPosition))
    }

    fn poll<B: ControllerBackend>(&mut self, _motor: &mut Motor<B>) -> Result<CommandStatus> {
        Ok(CommandStatus::Complete)
    }
}

/// Drive in a direction, at the axis default rate unless one is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveInDirectionAtRate {
    /// Direction of travel.
    pub direction: Direction,
    /// Rate magnitude; `None` uses the configured default rate.
    pub rate: Option<Rate>,
    /// When to report completion; `Sync` waits for the rate to settle.
    pub completion: Completion<Rate>,
}

impl MoveInDirectionAtRate {
    /// Move at `rate`, completing at once.
    pub fn new(direction: Direction, rate: Rate) -> Self {
        Self {
            direction,
            rate: Some(rate),
            completion: Completion::Async,
        }
    }

    /// Move at the configured default rate, completing at once.
    pub fn at_default_rate(direction: Direction) -> Self {
        Self {
            direction,
            rate: None,
            completion: Completion::Async,
        }
    }

    /// Complete only once the live rate is within `tolerance` of the target.
    pub fn sync(mut self, tolerance: Rate) -> Self {
        self.completion = Completion::Sync(tolerance);
        self
    }
}

impl Command for MoveInDirectionAtRate {
    fn name(&self) -> &'static str {
        "MoveInDirectionAtRate"
    }

    fn target<B: ControllerBackend>(&self, motor: &Motor<B>) -> Result<Option<TargetState>> {
        let rate = match self.rate {
            Some(rate) => rate,
            None => motor.config().default_rate()?,
        };
        Ok(Some(TargetState::MovingInDirectionAtRate {
            direction: self.direction,
            rate,
        }))
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        match self.completion {
            Completion::Async => Ok(CommandStatus::Complete),
            Completion::Sync(tolerance) => settled(motor.rate_error_within(tolerance)?),
        }
    }
}

/// Drive to an absolute position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveToAbsolutePosition {
    /// Target position.
    pub position: Length,
    /// When to report completion.
    pub completion: Completion<Length>,
}

impl MoveToAbsolutePosition {
    /// Move to `position`, completing at once.
    pub fn new(position: Length) -> Self {
        Self {
            position,
            completion: Completion::Async,
        }
    }

    /// Complete only once the position error is within `tolerance`.
    pub fn sync(mut self, tolerance: Length) -> Self {
        self.completion = Completion::Sync(tolerance);
        self
    }
}

impl Command for MoveToAbsolutePosition {
    fn name(&self) -> &'static str {
        "MoveToAbsolutePosition"
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(Some(TargetState::MovingToAbsolutePosition {
            position: self.position,
        }))
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        match self.completion {
            Completion::Async => Ok(CommandStatus::Complete),
            Completion::Sync(tolerance) => settled(motor.position_error_within(tolerance)?),
        }
    }
}

/// Drive a distance from wherever the axis is when activated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveToRelativePosition {
    /// Direction of travel.
    pub direction: Direction,
    /// Distance magnitude.
    pub distance: Length,
    /// When to report completion.
    pub completion: Completion<Length>,
}

impl MoveToRelativePosition {
    /// Move `distance` in `direction`, completing at once.
    pub fn new(direction: Direction, distance: Length) -> Self {
        Self {
            direction,
            distance,
            completion: Completion::Async,
        }
    }

    /// Complete only once the position error is within `tolerance`.
    pub fn sync(mut self, tolerance: Length) -> Self {
        self.completion = Completion::Sync(tolerance);
        self
    }
}

impl Command for MoveToRelativePosition {
    fn name(&self) -> &'static str {
        "MoveToRelativePosition"
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(Some(TargetState::MovingToRelativePosition {
            direction: self.direction,
            distance: self.distance,
        }))
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        match self.completion {
            Completion::Async => Ok(CommandStatus::Complete),
            Completion::Sync(tolerance) => settled(motor.position_error_within(tolerance)?),
        }
    }
}

/// Seek a hard limit switch and re-zero the sensor on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrate {
    /// Direction of the limit to seek.
    pub direction: Direction,
    /// `Sync` waits until the motor has finished calibrating.
    pub completion: Completion<()>,
}

impl Calibrate {
    /// Seek the limit in `direction`, completing at once.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            completion: Completion::Async,
        }
    }

    /// Complete only once the switch has tripped and the axis holds.
    pub fn sync(mut self) -> Self {
        self.completion = Completion::Sync(());
        self
    }
}

impl Command for Calibrate {
    fn name(&self) -> &'static str {
        "Calibrate"
    }

    fn target<B: ControllerBackend>(&self, _motor: &Motor<B>) -> Result<Option<TargetState>> {
        Ok(Some(TargetState::CalibratingSensorInDirection {
            direction: self.direction,
        }))
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        let calibrating = TargetState::CalibratingSensorInDirection {
            direction: self.direction,
        };
        match self.completion {
            Completion::Async => Ok(CommandStatus::Complete),
            Completion::Sync(()) => settled(motor.state() != calibrating),
        }
    }
}

fn settled(done: bool) -> Result<CommandStatus> {
    Ok(if done {
        CommandStatus::Complete
    } else {
        CommandStatus::Running
    })
}

//! Discrete requests against one axis.
//!
//! A command either owns the axis (it sets a target state and, when
//! interrupted, leaves the axis holding position) or merely watches it (a
//! wait command polling a completion predicate). Commands are driven by a
//! [`Subsystem`] once per control cycle and never block.

mod basic;
mod subsystem;
mod wait;

pub use basic::{
    Calibrate, Disable, Hold, MoveInDirectionAtRate, MoveToAbsolutePosition,
    MoveToRelativePosition,
};
pub use subsystem::{Subsystem, WaitId, MAX_WAITERS};
pub use wait::{WaitForHardLimitSwitch, WaitForTargetPosition, WaitForTargetRate};

use tracing::debug;

use crate::backend::ControllerBackend;
use crate::config::DefaultCommand;
use crate::error::Result;
use crate::motor::{Motor, TargetState};

/// Progress reported by [`Command::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandStatus {
    /// Poll again next cycle.
    Running,
    /// The completion predicate holds.
    Complete,
}

/// How many cycles a motion command takes to report completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion<T> {
    /// Complete as soon as the operation is issued.
    Async,
    /// Complete once the motion settles within the given tolerance.
    Sync(T),
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Completion::Async
    }
}

/// Operations every command provides.
pub trait Command {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the command takes exclusive use of the axis.
    fn requires_axis(&self) -> bool {
        true
    }

    /// Target state this command requests, if any.
    fn target<B: ControllerBackend>(&self, motor: &Motor<B>) -> Result<Option<TargetState>>;

    /// True if activating would request the state the motor already pursues.
    ///
    /// `Disabled` is never redundant.
    fn is_redundant<B: ControllerBackend>(&self, motor: &Motor<B>) -> bool {
        match self.target(motor) {
            Ok(Some(target)) => target != TargetState::Disabled && target == motor.state(),
            _ => false,
        }
    }

    /// Issue the command's request.
    ///
    /// A redundant request still reaches the motor, which skips the hardware
    /// call but re-runs auto-zero for a hold.
    fn activate<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<()> {
        let Some(target) = self.target(motor)? else {
            return Ok(());
        };
        if self.is_redundant(motor) {
            debug!(axis = motor.name(), command = self.name(), "already in requested state");
        }
        motor.request(target)
    }

    /// Check the completion predicate.
    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus>;

    /// Another command claimed the axis while this one was running.
    fn interrupt<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<()> {
        if self.requires_axis() {
            motor.hold_current_position()
        } else {
            Ok(())
        }
    }
}

/// Every concrete command, so subsystems can store them by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisCommand {
    /// See [`Disable`].
    Disable(Disable),
    /// See [`Hold`].
    Hold(Hold),
    /// See [`MoveInDirectionAtRate`].
    MoveInDirectionAtRate(MoveInDirectionAtRate),
    /// See [`MoveToAbsolutePosition`].
    MoveToAbsolutePosition(MoveToAbsolutePosition),
    /// See [`MoveToRelativePosition`].
    MoveToRelativePosition(MoveToRelativePosition),
    /// See [`Calibrate`].
    Calibrate(Calibrate),
    /// See [`WaitForHardLimitSwitch`].
    WaitForHardLimitSwitch(WaitForHardLimitSwitch),
    /// See [`WaitForTargetPosition`].
    WaitForTargetPosition(WaitForTargetPosition),
    /// See [`WaitForTargetRate`].
    WaitForTargetRate(WaitForTargetRate),
}

macro_rules! dispatch {
    ($self:expr, $cmd:ident => $body:expr) => {
        match $self {
            AxisCommand::Disable($cmd) => $body,
            AxisCommand::Hold($cmd) => $body,
            AxisCommand::MoveInDirectionAtRate($cmd) => $body,
            AxisCommand::MoveToAbsolutePosition($cmd) => $body,
            AxisCommand::MoveToRelativePosition($cmd) => $body,
            AxisCommand::Calibrate($cmd) => $body,
            AxisCommand::WaitForHardLimitSwitch($cmd) => $body,
            AxisCommand::WaitForTargetPosition($cmd) => $body,
            AxisCommand::WaitForTargetRate($cmd) => $body,
        }
    };
}

impl Command for AxisCommand {
    fn name(&self) -> &'static str {
        dispatch!(self, c => c.name())
    }

    fn requires_axis(&self) -> bool {
        dispatch!(self, c => c.requires_axis())
    }

    fn target<B: ControllerBackend>(&self, motor: &Motor<B>) -> Result<Option<TargetState>> {
        dispatch!(self, c => c.target(motor))
    }

    fn is_redundant<B: ControllerBackend>(&self, motor: &Motor<B>) -> bool {
        dispatch!(self, c => c.is_redundant(motor))
    }

    fn activate<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<()> {
        dispatch!(self, c => c.activate(motor))
    }

    fn poll<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<CommandStatus> {
        dispatch!(self, c => c.poll(motor))
    }

    fn interrupt<B: ControllerBackend>(&mut self, motor: &mut Motor<B>) -> Result<()> {
        dispatch!(self, c => c.interrupt(motor))
    }
}

impl From<DefaultCommand> for AxisCommand {
    fn from(command: DefaultCommand) -> Self {
        match command {
            DefaultCommand::Disable => AxisCommand::Disable(Disable),
            DefaultCommand::Hold => AxisCommand::Hold(Hold),
        }
    }
}

macro_rules! impl_from_command {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for AxisCommand {
                fn from(command: $variant) -> Self {
                    AxisCommand::$variant(command)
                }
            }
        )*
    };
}

impl_from_command!(
    Disable,
    Hold,
    MoveInDirectionAtRate,
    MoveToAbsolutePosition,
    MoveToRelativePosition,
    Calibrate,
    WaitForHardLimitSwitch,
    WaitForTargetPosition,
    WaitForTargetRate,
);

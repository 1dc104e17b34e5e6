//! Per-axis command slot.

use heapless::Vec;
use tracing::{debug, info, warn};

use super::{AxisCommand, Command, CommandStatus, Disable};
use crate::backend::ControllerBackend;
use crate::error::{Error, MotorError, Result};
use crate::motor::Motor;

/// Maximum number of wait commands watching one axis.
pub const MAX_WAITERS: usize = 8;

/// Handle for a wait command registered with [`Subsystem::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaitId(u32);

#[derive(Debug, Clone, Copy)]
struct Slot {
    command: AxisCommand,
    status: CommandStatus,
}

/// One axis together with the commands acting on it.
///
/// At most one command owns the axis at a time; any number of wait commands
/// (up to [`MAX_WAITERS`]) may watch it. When no command owns the axis the
/// default command is activated on the next tick. A command that completes
/// keeps ownership until it is replaced or cancelled.
pub struct Subsystem<B: ControllerBackend> {
    motor: Motor<B>,
    default_command: AxisCommand,
    owner: Option<Slot>,
    waiters: Vec<(WaitId, Slot), MAX_WAITERS>,
    next_wait: u32,
}

impl<B: ControllerBackend> Subsystem<B> {
    /// Wrap `motor`, using its configured default command.
    pub fn new(motor: Motor<B>) -> Self {
        let default_command = AxisCommand::from(motor.config().default_command());
        Self {
            motor,
            default_command,
            owner: None,
            waiters: Vec::new(),
            next_wait: 0,
        }
    }

    /// Replace the default command.
    pub fn with_default_command(mut self, command: impl Into<AxisCommand>) -> Self {
        self.default_command = command.into();
        self
    }

    /// The owned motor.
    pub fn motor(&self) -> &Motor<B> {
        &self.motor
    }

    /// The owned motor, mutably.
    pub fn motor_mut(&mut self) -> &mut Motor<B> {
        &mut self.motor
    }

    /// Name of the command owning the axis, if any.
    pub fn owner(&self) -> Option<&'static str> {
        self.owner.as_ref().map(|slot| slot.command.name())
    }

    /// Progress of the command owning the axis, if any.
    pub fn owner_status(&self) -> Option<CommandStatus> {
        self.owner.as_ref().map(|slot| slot.status)
    }

    /// Give the axis to `command`, interrupting a still-running owner.
    ///
    /// If activation fails the axis is left unowned, so the default command
    /// takes over on the next tick.
    pub fn claim(&mut self, command: impl Into<AxisCommand>) -> Result<()> {
        let mut command = command.into();
        if !command.requires_axis() {
            return Err(Error::Motor(MotorError::InvalidArgument(
                "command does not take the axis",
            )));
        }

        if let Some(mut previous) = self.owner.take() {
            if previous.status == CommandStatus::Running {
                info!(
                    axis = self.motor.name(),
                    interrupted = previous.command.name(),
                    by = command.name(),
                    "command interrupted"
                );
                if let Err(error) = previous.command.interrupt(&mut self.motor) {
                    warn!(axis = self.motor.name(), error = %error, "interrupt failed");
                }
            }
        }

        command.activate(&mut self.motor)?;
        debug!(axis = self.motor.name(), command = command.name(), "axis claimed");
        self.owner = Some(Slot {
            command,
            status: CommandStatus::Running,
        });
        Ok(())
    }

    /// Release the axis; the default command takes over on the next tick.
    pub fn cancel(&mut self) -> Result<()> {
        let Some(mut previous) = self.owner.take() else {
            return Ok(());
        };
        debug!(axis = self.motor.name(), command = previous.command.name(), "command cancelled");
        if previous.status == CommandStatus::Running {
            previous.command.interrupt(&mut self.motor)?;
        }
        Ok(())
    }

    /// Start watching the axis with a non-owning command.
    pub fn watch(&mut self, command: impl Into<AxisCommand>) -> Result<WaitId> {
        let mut command = command.into();
        if command.requires_axis() {
            return Err(Error::Motor(MotorError::InvalidArgument(
                "command takes the axis; use claim",
            )));
        }
        command.activate(&mut self.motor)?;
        let id = WaitId(self.next_wait);
        let slot = Slot {
            command,
            status: CommandStatus::Running,
        };
        self.waiters
            .push((id, slot))
            .map_err(|_| Error::Motor(MotorError::InvalidArgument("too many wait commands")))?;
        self.next_wait = self.next_wait.wrapping_add(1);
        Ok(id)
    }

    /// Progress of a wait command. A completed wait is removed on this call.
    ///
    /// Returns `None` for an unknown or already collected handle.
    pub fn wait_status(&mut self, id: WaitId) -> Option<CommandStatus> {
        let index = self.waiters.iter().position(|(wait, _)| *wait == id)?;
        let status = self.waiters[index].1.status;
        if status == CommandStatus::Complete {
            self.waiters.swap_remove(index);
        }
        Some(status)
    }

    /// Stop watching without waiting for completion.
    pub fn release(&mut self, id: WaitId) {
        self.waiters.retain(|(wait, _)| *wait != id);
    }

    /// Per-cycle tick: default command, motor tick, then command polls.
    ///
    /// An unavailable axis gets [`Disable`] instead of its default command.
    /// A command whose poll fails is dropped; the first error is returned
    /// after every other command has been polled.
    pub fn periodic(&mut self) -> Result<()> {
        let mut first_error = None;

        if self.owner.is_none() {
            let mut command = if self.motor.is_available() {
                self.default_command
            } else {
                AxisCommand::from(Disable)
            };
            debug!(axis = self.motor.name(), command = command.name(), "default command");
            match command.activate(&mut self.motor) {
                Ok(()) => {
                    self.owner = Some(Slot {
                        command,
                        status: CommandStatus::Running,
                    });
                }
                Err(error) => {
                    warn!(
                        axis = self.motor.name(),
                        command = command.name(),
                        error = %error,
                        "default command failed"
                    );
                    first_error = Some(error);
                }
            }
        }

        if let Err(error) = self.motor.periodic() {
            first_error.get_or_insert(error);
        }

        let mut owner_failed = false;

        if let Some(slot) = self.owner.as_mut() {
            if slot.status == CommandStatus::Running {
                match slot.command.poll(&mut self.motor) {
                    Ok(status) => {
                        if status == CommandStatus::Complete {
                            debug!(
                                axis = self.motor.name(),
                                command = slot.command.name(),
                                "command complete"
                            );
                        }
                        slot.status = status;
                    }
                    Err(error) => {
                        warn!(
                            axis = self.motor.name(),
                            command = slot.command.name(),
                            error = %error,
                            "command failed"
                        );
                        owner_failed = true;
                        first_error.get_or_insert(error);
                    }
                }
            }
        }
        if owner_failed {
            self.owner = None;
        }

        let motor = &mut self.motor;
        self.waiters.retain_mut(|(_, slot)| {
            if slot.status == CommandStatus::Complete {
                return true;
            }
            match slot.command.poll(motor) {
                Ok(status) => {
                    slot.status = status;
                    true
                }
                Err(error) => {
                    warn!(
                        axis = motor.name(),
                        command = slot.command.name(),
                        error = %error,
                        "wait command failed"
                    );
                    first_error.get_or_insert(error);
                    false
                }
            }
        });

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

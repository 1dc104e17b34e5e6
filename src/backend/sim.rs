//! In-memory smart controller for tests and bench bring-up.

use super::hardware::{ControlMode, SmartController};
use crate::config::NeutralBehavior;
use crate::error::HardwareFault;
use crate::motion::Direction;

/// A [`SmartController`] with no hardware behind it.
///
/// Counts the commands it receives, integrates velocity when advanced and
/// can be forced into a disconnected state where every call fails.
#[derive(Debug, Clone)]
pub struct SimulatedController {
    mode: ControlMode,
    position: f64,
    velocity: f64,
    percent_full_scale: f64,
    limit_closed: [bool; 2],
    disconnected: bool,
    inverted: (bool, bool),
    neutral_behavior: NeutralBehavior,
    commands: u32,
    resets: u32,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedController {
    /// A disabled controller at position zero with both switches open.
    pub fn new() -> Self {
        Self {
            mode: ControlMode::Disabled,
            position: 0.0,
            velocity: 0.0,
            percent_full_scale: 100.0,
            limit_closed: [false; 2],
            disconnected: false,
            inverted: (false, false),
            neutral_behavior: NeutralBehavior::Coast,
            commands: 0,
            resets: 0,
        }
    }

    /// Last control mode received.
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Number of `set_control` calls accepted.
    pub fn command_count(&self) -> u32 {
        self.commands
    }

    /// Number of sensor position overwrites accepted.
    pub fn reset_count(&self) -> u32 {
        self.resets
    }

    /// Raw sensor position.
    pub fn sensor(&self) -> f64 {
        self.position
    }

    /// Move the sensor without a command, as slippage would.
    pub fn set_sensor(&mut self, position: f64) {
        self.position = position;
    }

    /// Close or open the limit switch circuit at the `direction` end.
    pub fn set_limit_switch_closed(&mut self, direction: Direction, closed: bool) {
        match direction {
            Direction::Forward => self.limit_closed[0] = closed,
            Direction::Reverse => self.limit_closed[1] = closed,
            Direction::Neutral => {}
        }
    }

    /// Make every subsequent call fail with `HardwareFault::Disconnected`.
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.disconnected = disconnected;
    }

    /// Native inversion flags as (motor, sensor).
    pub fn inverted(&self) -> (bool, bool) {
        self.inverted
    }

    /// Configured neutral behavior.
    pub fn neutral_behavior(&self) -> NeutralBehavior {
        self.neutral_behavior
    }

    /// Native rate produced by full percent output.
    pub fn set_percent_full_scale(&mut self, rate: f64) {
        self.percent_full_scale = rate;
    }

    /// Advance the simulation by `dt` native time units.
    pub fn advance(&mut self, dt: f64) {
        self.velocity = match self.mode {
            ControlMode::Disabled => 0.0,
            ControlMode::PercentOutput(fraction) => fraction * self.percent_full_scale,
            ControlMode::Velocity(v) => v,
            ControlMode::Position(target) => {
                let v = if dt > 0.0 { (target - self.position) / dt } else { 0.0 };
                self.position = target;
                self.velocity = v;
                return;
            }
        };
        self.position += self.velocity * dt;
    }

    fn connected(&self) -> Result<(), HardwareFault> {
        if self.disconnected {
            Err(HardwareFault::Disconnected)
        } else {
            Ok(())
        }
    }
}

impl SmartController for SimulatedController {
    fn set_control(&mut self, mode: ControlMode) -> Result<(), HardwareFault> {
        self.connected()?;
        self.mode = mode;
        self.velocity = match mode {
            ControlMode::Velocity(v) => v,
            ControlMode::PercentOutput(fraction) => fraction * self.percent_full_scale,
            ControlMode::Disabled | ControlMode::Position(_) => 0.0,
        };
        self.commands += 1;
        Ok(())
    }

    fn position(&mut self) -> Result<f64, HardwareFault> {
        self.connected()?;
        Ok(self.position)
    }

    fn velocity(&mut self) -> Result<f64, HardwareFault> {
        self.connected()?;
        Ok(self.velocity)
    }

    fn set_position(&mut self, position: f64) -> Result<(), HardwareFault> {
        self.connected()?;
        self.position = position;
        self.resets += 1;
        Ok(())
    }

    fn limit_switch_closed(&mut self, direction: Direction) -> Result<bool, HardwareFault> {
        self.connected()?;
        Ok(match direction {
            Direction::Forward => self.limit_closed[0],
            Direction::Reverse => self.limit_closed[1],
            Direction::Neutral => false,
        })
    }

    fn set_inverted(&mut self, motor: bool, sensor: bool) -> Result<(), HardwareFault> {
        self.connected()?;
        self.inverted = (motor, sensor);
        Ok(())
    }

    fn set_neutral_behavior(&mut self, behavior: NeutralBehavior) -> Result<(), HardwareFault> {
        self.connected()?;
        self.neutral_behavior = behavior;
        Ok(())
    }
}

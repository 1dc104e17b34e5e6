//! Controller backends.
//!
//! A backend drives one hardware family in sensor/motor-native units. The
//! family is closed: [`ControllerBackend`] is sealed and every implementation
//! has a [`BackendKind`] that is matched exhaustively when capabilities are
//! reported.

mod encoded;
pub mod hardware;
mod percent;
mod sim;
mod smart;

pub use encoded::EncodedPercentBackend;
pub use hardware::{
    ControlMode, LimitSwitch, PercentOutput, PwmMotor, QuadratureEncoder, SmartController,
    SwitchInput, Unwired,
};
pub use percent::PercentBackend;
pub use sim::SimulatedController;
pub use smart::SmartBackend;

use crate::config::{
    Capabilities, LengthUnit, LimitSwitchPolarity, LimitSwitchSource, NeutralBehavior, RateUnit,
};
use crate::config::units::{Length, Rate};
use crate::error::{MotorError, Result};
use crate::motion::Direction;

/// What the physical hardware is doing, in native terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Output off.
    #[default]
    Disabled,
    /// Holding a captured position.
    HoldingPosition,
    /// Driving toward a position setpoint.
    SetPosition,
    /// Driving at a rate.
    Moving,
}

/// The hardware families a backend can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendKind {
    /// Closed-loop controller with integrated sensor.
    Smart,
    /// Open-loop percent-output controller.
    Percent,
    /// Percent-output controller paired with an external encoder.
    EncodedPercent,
}

const LIMIT_SWITCHES: Capabilities = Capabilities::FORWARD_HARD_LIMIT_SWITCH
    .union(Capabilities::REVERSE_HARD_LIMIT_SWITCH)
    .union(Capabilities::REMOTE_HARD_LIMIT_SWITCH);

const OPEN_LOOP: Capabilities = Capabilities::CONTROL_DIRECTION
    .union(Capabilities::CONTROL_RATE)
    .union(Capabilities::FORWARD)
    .union(Capabilities::REVERSE)
    .union(Capabilities::DEFAULT_RATE)
    .union(Capabilities::NEUTRAL_BEHAVIOR)
    .union(Capabilities::SENSOR_TO_DRIVE_SCALE)
    .union(Capabilities::DISCONNECTED)
    .union(LIMIT_SWITCHES);

const SENSED: Capabilities = Capabilities::CONTROL_POSITION
    .union(Capabilities::READ_POSITION)
    .union(Capabilities::READ_RATE)
    .union(Capabilities::READ_DIRECTION)
    .union(Capabilities::FORWARD_SOFT_LIMIT_SWITCH)
    .union(Capabilities::REVERSE_SOFT_LIMIT_SWITCH)
    .union(Capabilities::FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR)
    .union(Capabilities::REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR);

impl BackendKind {
    /// Capabilities this family can satisfy.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            BackendKind::Smart => OPEN_LOOP
                .union(SENSED)
                .union(Capabilities::LOCAL_HARD_LIMIT_SWITCH),
            BackendKind::Percent => OPEN_LOOP,
            BackendKind::EncodedPercent => OPEN_LOOP.union(SENSED),
        }
    }

    /// Whether the hardware can invert its output natively.
    pub const fn supports_motor_inversion(self) -> bool {
        match self {
            BackendKind::Smart => true,
            BackendKind::Percent | BackendKind::EncodedPercent => false,
        }
    }

    /// Whether the hardware can invert its sensor natively.
    pub const fn supports_sensor_inversion(self) -> bool {
        match self {
            BackendKind::Smart => true,
            BackendKind::Percent | BackendKind::EncodedPercent => false,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::Smart => "smart",
            BackendKind::Percent => "percent",
            BackendKind::EncodedPercent => "encoded-percent",
        }
    }
}

/// Settings pushed to a backend once, before its first command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeSettings {
    /// Unit of positions read from and written to the sensor.
    pub sensor_length_unit: LengthUnit,
    /// Unit of rates read from the sensor.
    pub sensor_rate_unit: RateUnit,
    /// Unit of rates commanded to the motor.
    pub motor_rate_unit: RateUnit,
    /// Invert the output natively.
    pub invert_motor: bool,
    /// Invert the sensor natively.
    pub invert_sensor: bool,
    /// Neutral output behavior, if configured.
    pub neutral_behavior: Option<NeutralBehavior>,
    /// Polarity of the forward hard limit switch, if present.
    pub forward_polarity: Option<LimitSwitchPolarity>,
    /// Polarity of the reverse hard limit switch, if present.
    pub reverse_polarity: Option<LimitSwitchPolarity>,
    /// Where the hard limit switches are wired.
    pub limit_switch_source: Option<LimitSwitchSource>,
}

impl Default for NativeSettings {
    fn default() -> Self {
        Self {
            sensor_length_unit: LengthUnit::Inches,
            sensor_rate_unit: RateUnit::INCHES_PER_SECOND,
            motor_rate_unit: RateUnit::INCHES_PER_SECOND,
            invert_motor: false,
            invert_sensor: false,
            neutral_behavior: None,
            forward_polarity: None,
            reverse_polarity: None,
            limit_switch_source: None,
        }
    }
}

impl NativeSettings {
    /// Polarity of the switch in `direction`.
    pub fn polarity(&self, direction: Direction) -> Option<LimitSwitchPolarity> {
        match direction {
            Direction::Forward => self.forward_polarity,
            Direction::Reverse => self.reverse_polarity,
            Direction::Neutral => None,
        }
    }
}

/// Build the error a backend returns for an operation outside its family.
pub(crate) fn unsupported(operation: &'static str, missing: Capabilities) -> crate::error::Error {
    MotorError::UnsupportedOperation { operation, missing }.into()
}

/// Low-level operation set shared by every controller family.
///
/// Every length and rate is expressed in native units and native sign;
/// directions are native except for limit switches, which are named by the
/// physical end of travel they guard.
pub trait ControllerBackend: private::Sealed {
    /// Family of this backend.
    fn kind(&self) -> BackendKind;

    /// Capabilities this backend can satisfy.
    fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    /// Whether output inversion is applied natively.
    fn supports_motor_inversion(&self) -> bool {
        self.kind().supports_motor_inversion()
    }

    /// Whether sensor inversion is applied natively.
    fn supports_sensor_inversion(&self) -> bool {
        self.kind().supports_sensor_inversion()
    }

    /// Apply native settings. Called once before any other operation.
    fn configure(&mut self, settings: &NativeSettings) -> Result<()>;

    /// Turn the output off.
    fn disable(&mut self) -> Result<()>;

    /// Hold the current position (or stop, without a sensor).
    fn hold_current_position(&mut self) -> Result<()>;

    /// Drive in `direction` at `rate` (a non-negative magnitude).
    fn move_in_direction_at_rate(&mut self, direction: Direction, rate: Rate) -> Result<()>;

    /// Drive to an absolute sensor position.
    fn move_to_absolute_position(&mut self, position: Length) -> Result<()>;

    /// Drive `distance` (a non-negative magnitude) in `direction`.
    fn move_to_relative_position(&mut self, direction: Direction, distance: Length) -> Result<()>;

    /// Overwrite the sensor position.
    fn reset_sensor_position(&mut self, position: Length) -> Result<()>;

    /// Read the sensor position.
    fn current_position(&mut self) -> Result<Length>;

    /// Read the sensor rate (signed).
    fn current_rate(&mut self) -> Result<Rate>;

    /// Whether the hard limit switch at the `direction` end is pressed.
    fn limit_switch_active(&mut self, direction: Direction) -> Result<bool>;

    /// Seek the hard limit switch in `direction` at `rate`.
    fn calibrate_sensor_in_direction(&mut self, direction: Direction, rate: Rate) -> Result<()>;

    /// What the hardware is currently doing.
    fn state(&self) -> ControllerState;

    /// Per-cycle work (software control loops).
    fn periodic(&mut self) -> Result<()> {
        Ok(())
    }
}

mod private {
    pub trait Sealed {}
    impl<C: super::SmartController, F: super::SwitchInput, R: super::SwitchInput> Sealed
        for super::SmartBackend<C, F, R>
    {
    }
    impl<M: super::PercentOutput, F: super::SwitchInput, R: super::SwitchInput> Sealed
        for super::PercentBackend<M, F, R>
    {
    }
    impl<
            M: super::PercentOutput,
            E: super::QuadratureEncoder,
            F: super::SwitchInput,
            R: super::SwitchInput,
        > Sealed for super::EncodedPercentBackend<M, E, F, R>
    {
    }
}

/// Read a polarity-corrected switch from a [`SwitchInput`].
pub(crate) fn read_switch<S: SwitchInput>(
    input: &mut S,
    polarity: Option<LimitSwitchPolarity>,
) -> Result<bool> {
    let closed = input.is_closed()?;
    Ok(polarity.unwrap_or_default().is_active(closed))
}

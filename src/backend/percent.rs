//! Backend for open-loop percent-output controllers.

use super::hardware::{PercentOutput, SwitchInput, Unwired};
use super::{
    read_switch, unsupported, BackendKind, ControllerBackend, ControllerState, NativeSettings,
};
use crate::config::units::{Length, Rate};
use crate::config::Capabilities;
use crate::error::Result;
use crate::motion::Direction;

/// Fraction of full output for `rate` in `direction`, clamped to [-1, 1].
pub(crate) fn output_fraction(direction: Direction, rate: Rate, full_scale: Rate) -> f64 {
    (direction.sign() as f64 * rate.fraction_of(full_scale)).clamp(-1.0, 1.0)
}

/// Drives a [`PercentOutput`] with no sensor.
///
/// Rates are commanded open-loop as a fraction of `full_scale`, the native
/// rate reached at full output. Holding position means stopping.
pub struct PercentBackend<M, F = Unwired, R = Unwired>
where
    M: PercentOutput,
    F: SwitchInput,
    R: SwitchInput,
{
    motor: M,
    forward_switch: F,
    reverse_switch: R,
    full_scale: Rate,
    settings: NativeSettings,
    state: ControllerState,
}

impl<M: PercentOutput> PercentBackend<M, Unwired, Unwired> {
    /// Backend without limit switches.
    pub fn new(motor: M, full_scale: Rate) -> Self {
        Self::with_switches(motor, full_scale, Unwired, Unwired)
    }
}

impl<M, F, R> PercentBackend<M, F, R>
where
    M: PercentOutput,
    F: SwitchInput,
    R: SwitchInput,
{
    /// Backend with limit switches on separate inputs.
    pub fn with_switches(motor: M, full_scale: Rate, forward: F, reverse: R) -> Self {
        Self {
            motor,
            forward_switch: forward,
            reverse_switch: reverse,
            full_scale,
            settings: NativeSettings::default(),
            state: ControllerState::Disabled,
        }
    }

    /// The wrapped output.
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// The wrapped output, mutably.
    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }

    fn stop(&mut self, state: ControllerState) -> Result<()> {
        self.motor.set_neutral()?;
        self.state = state;
        Ok(())
    }
}

impl<M, F, R> ControllerBackend for PercentBackend<M, F, R>
where
    M: PercentOutput,
    F: SwitchInput,
    R: SwitchInput,
{
    fn kind(&self) -> BackendKind {
        BackendKind::Percent
    }

    fn configure(&mut self, settings: &NativeSettings) -> Result<()> {
        self.settings = *settings;
        if let Some(behavior) = settings.neutral_behavior {
            self.motor.set_neutral_behavior(behavior)?;
        }
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.stop(ControllerState::Disabled)
    }

    fn hold_current_position(&mut self) -> Result<()> {
        self.stop(ControllerState::HoldingPosition)
    }

    fn move_in_direction_at_rate(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        self.motor
            .set_percent(output_fraction(direction, rate, self.full_scale))?;
        self.state = ControllerState::Moving;
        Ok(())
    }

    fn move_to_absolute_position(&mut self, _position: Length) -> Result<()> {
        Err(unsupported("move_to_absolute_position", Capabilities::CONTROL_POSITION))
    }

    fn move_to_relative_position(&mut self, _direction: Direction, _distance: Length) -> Result<()> {
        Err(unsupported("move_to_relative_position", Capabilities::CONTROL_POSITION))
    }

    fn reset_sensor_position(&mut self, _position: Length) -> Result<()> {
        Err(unsupported("reset_sensor_position", Capabilities::READ_POSITION))
    }

    fn current_position(&mut self) -> Result<Length> {
        Err(unsupported("current_position", Capabilities::READ_POSITION))
    }

    fn current_rate(&mut self) -> Result<Rate> {
        Err(unsupported("current_rate", Capabilities::READ_RATE))
    }

    fn limit_switch_active(&mut self, direction: Direction) -> Result<bool> {
        let polarity = self.settings.polarity(direction);
        match direction {
            Direction::Forward => read_switch(&mut self.forward_switch, polarity),
            Direction::Reverse => read_switch(&mut self.reverse_switch, polarity),
            Direction::Neutral => Ok(false),
        }
    }

    fn calibrate_sensor_in_direction(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        self.move_in_direction_at_rate(direction, rate)
    }

    fn state(&self) -> ControllerState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, HardwareFault, MotorError};

    #[derive(Default)]
    struct FakeOutput {
        fraction: f64,
        neutral_calls: u32,
    }

    impl PercentOutput for FakeOutput {
        fn set_percent(&mut self, fraction: f64) -> core::result::Result<(), HardwareFault> {
            self.fraction = fraction;
            Ok(())
        }

        fn set_neutral(&mut self) -> core::result::Result<(), HardwareFault> {
            self.fraction = 0.0;
            self.neutral_calls += 1;
            Ok(())
        }
    }

    #[test]
    fn test_rate_is_fraction_of_full_scale() {
        let mut backend = PercentBackend::new(FakeOutput::default(), Rate::inches_per_second(40.0));
        backend
            .move_in_direction_at_rate(Direction::Reverse, Rate::inches_per_second(10.0))
            .unwrap();
        assert!((backend.motor().fraction + 0.25).abs() < 1e-12);

        backend
            .move_in_direction_at_rate(Direction::Forward, Rate::inches_per_second(80.0))
            .unwrap();
        assert_eq!(backend.motor().fraction, 1.0);
    }

    #[test]
    fn test_hold_stops_output() {
        let mut backend = PercentBackend::new(FakeOutput::default(), Rate::inches_per_second(40.0));
        backend.hold_current_position().unwrap();
        assert_eq!(backend.motor().neutral_calls, 1);
        assert_eq!(backend.state(), ControllerState::HoldingPosition);
    }

    #[test]
    fn test_position_is_unsupported() {
        let mut backend = PercentBackend::new(FakeOutput::default(), Rate::inches_per_second(40.0));
        assert!(matches!(
            backend.move_to_absolute_position(Length::inches(3.0)),
            Err(Error::Motor(MotorError::UnsupportedOperation { .. }))
        ));
        assert!(backend.current_position().is_err());
    }
}

//! Backend for percent-output controllers paired with an external encoder.

use super::hardware::{PercentOutput, QuadratureEncoder, SwitchInput, Unwired};
use super::percent::output_fraction;
use super::{read_switch, BackendKind, ControllerBackend, ControllerState, NativeSettings};
use crate::config::units::{Length, Rate};
use crate::error::Result;
use crate::motion::Direction;

/// Drives a [`PercentOutput`] and closes a proportional position loop in
/// software over a [`QuadratureEncoder`].
///
/// The loop runs in [`ControllerBackend::periodic`] and once whenever a new
/// position setpoint is accepted.
pub struct EncodedPercentBackend<M, E, F = Unwired, R = Unwired>
where
    M: PercentOutput,
    E: QuadratureEncoder,
    F: SwitchInput,
    R: SwitchInput,
{
    motor: M,
    encoder: E,
    forward_switch: F,
    reverse_switch: R,
    full_scale: Rate,
    gain: f64,
    deadband: f64,
    setpoint: Option<f64>,
    settings: NativeSettings,
    state: ControllerState,
}

impl<M: PercentOutput, E: QuadratureEncoder> EncodedPercentBackend<M, E, Unwired, Unwired> {
    /// Backend without limit switches.
    ///
    /// `gain` is the output fraction per native count of position error.
    pub fn new(motor: M, encoder: E, full_scale: Rate, gain: f64) -> Self {
        Self::with_switches(motor, encoder, full_scale, gain, Unwired, Unwired)
    }
}

impl<M, E, F, R> EncodedPercentBackend<M, E, F, R>
where
    M: PercentOutput,
    E: QuadratureEncoder,
    F: SwitchInput,
    R: SwitchInput,
{
    /// Backend with limit switches on separate inputs.
    pub fn with_switches(
        motor: M,
        encoder: E,
        full_scale: Rate,
        gain: f64,
        forward: F,
        reverse: R,
    ) -> Self {
        Self {
            motor,
            encoder,
            forward_switch: forward,
            reverse_switch: reverse,
            full_scale,
            gain,
            deadband: 0.0,
            setpoint: None,
            settings: NativeSettings::default(),
            state: ControllerState::Disabled,
        }
    }

    /// Position error (in counts) inside which the output is neutral.
    pub fn with_deadband(mut self, counts: f64) -> Self {
        self.deadband = counts.abs();
        self
    }

    /// The wrapped output.
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// The wrapped encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// The wrapped encoder, mutably.
    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }

    /// Active position setpoint in counts.
    pub fn setpoint(&self) -> Option<f64> {
        self.setpoint
    }

    fn counts(&self, value: Length) -> f64 {
        value.value_in(self.settings.sensor_length_unit)
    }

    fn track(&mut self, setpoint: f64, state: ControllerState) -> Result<()> {
        self.setpoint = Some(setpoint);
        self.state = state;
        self.drive()
    }

    fn drive(&mut self) -> Result<()> {
        let Some(setpoint) = self.setpoint else {
            return Ok(());
        };
        let error = setpoint - self.encoder.count()? as f64;
        if error.abs() <= self.deadband {
            self.motor.set_neutral()?;
        } else {
            self.motor.set_percent((self.gain * error).clamp(-1.0, 1.0))?;
        }
        Ok(())
    }
}

impl<M, E, F, R> ControllerBackend for EncodedPercentBackend<M, E, F, R>
where
    M: PercentOutput,
    E: QuadratureEncoder,
    F: SwitchInput,
    R: SwitchInput,
{
    fn kind(&self) -> BackendKind {
        BackendKind::EncodedPercent
    }

    fn configure(&mut self, settings: &NativeSettings) -> Result<()> {
        self.settings = *settings;
        if let Some(behavior) = settings.neutral_behavior {
            self.motor.set_neutral_behavior(behavior)?;
        }
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.motor.set_neutral()?;
        self.setpoint = None;
        self.state = ControllerState::Disabled;
        Ok(())
    }

    fn hold_current_position(&mut self) -> Result<()> {
        let here = self.encoder.count()? as f64;
        self.track(here, ControllerState::HoldingPosition)
    }

    fn move_in_direction_at_rate(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        self.motor
            .set_percent(output_fraction(direction, rate, self.full_scale))?;
        self.setpoint = None;
        self.state = ControllerState::Moving;
        Ok(())
    }

    fn move_to_absolute_position(&mut self, position: Length) -> Result<()> {
        let target = self.counts(position);
        self.track(target, ControllerState::SetPosition)
    }

    fn move_to_relative_position(&mut self, direction: Direction, distance: Length) -> Result<()> {
        let here = self.encoder.count()? as f64;
        let target = here + direction.sign() as f64 * self.counts(distance);
        self.track(target, ControllerState::SetPosition)
    }

    fn reset_sensor_position(&mut self, position: Length) -> Result<()> {
        let counts = libm::round(self.counts(position)) as i64;
        let before = self.encoder.count()?;
        self.encoder.set_count(counts)?;
        // Keep a held setpoint on the same physical spot.
        if let Some(setpoint) = self.setpoint.as_mut() {
            *setpoint += (counts - before) as f64;
        }
        Ok(())
    }

    fn current_position(&mut self) -> Result<Length> {
        let counts = self.encoder.count()?;
        Ok(Length::new(counts as f64, self.settings.sensor_length_unit))
    }

    fn current_rate(&mut self) -> Result<Rate> {
        let rate = self.encoder.rate()?;
        Ok(Rate::new(rate, self.settings.sensor_rate_unit))
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

    fn periodic(&mut self) -> Result<()> {
        match self.state {
            ControllerState::HoldingPosition | ControllerState::SetPosition => self.drive(),
            ControllerState::Disabled | ControllerState::Moving => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LengthUnit;
    use crate::error::HardwareFault;

    #[derive(Default)]
    struct FakeOutput {
        fraction: f64,
    }

    impl PercentOutput for FakeOutput {
        fn set_percent(&mut self, fraction: f64) -> core::result::Result<(), HardwareFault> {
            self.fraction = fraction;
            Ok(())
        }

        fn set_neutral(&mut self) -> core::result::Result<(), HardwareFault> {
            self.fraction = 0.0;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeEncoder {
        count: i64,
    }

    impl QuadratureEncoder for FakeEncoder {
        fn count(&mut self) -> core::result::Result<i64, HardwareFault> {
            Ok(self.count)
        }

        fn rate(&mut self) -> core::result::Result<f64, HardwareFault> {
            Ok(0.0)
        }

        fn set_count(&mut self, count: i64) -> core::result::Result<(), HardwareFault> {
            self.count = count;
            Ok(())
        }
    }

    fn backend() -> EncodedPercentBackend<FakeOutput, FakeEncoder> {
        let mut backend = EncodedPercentBackend::new(
            FakeOutput::default(),
            FakeEncoder::default(),
            Rate::inches_per_second(40.0),
            0.01,
        )
        .with_deadband(2.0);
        let settings = NativeSettings {
            sensor_length_unit: LengthUnit::Ticks { per_inch: 100.0 },
            ..NativeSettings::default()
        };
        backend.configure(&settings).unwrap();
        backend
    }

    #[test]
    fn test_proportional_loop() {
        let mut backend = backend();
        backend
            .move_to_absolute_position(Length::inches(0.5))
            .unwrap();
        // 50 counts of error at 0.01 per count.
        assert!((backend.motor().fraction - 0.5).abs() < 1e-9);

        backend.encoder_mut().count = 49;
        backend.periodic().unwrap();
        assert_eq!(backend.motor().fraction, 0.0);

        backend.encoder_mut().count = 300;
        backend.periodic().unwrap();
        assert_eq!(backend.motor().fraction, -1.0);
    }

    #[test]
    fn test_reset_shifts_held_setpoint() {
        let mut backend = backend();
        backend.encoder_mut().count = 120;
        backend.hold_current_position().unwrap();
        backend.reset_sensor_position(Length::inches(0.0)).unwrap();
        assert_eq!(backend.setpoint(), Some(0.0));
        assert_eq!(backend.encoder().count, 0);
    }

    #[test]
    fn test_rate_move_drops_setpoint() {
        let mut backend = backend();
        backend.hold_current_position().unwrap();
        backend
            .move_in_direction_at_rate(Direction::Forward, Rate::inches_per_second(20.0))
            .unwrap();
        assert_eq!(backend.setpoint(), None);
        assert!((backend.motor().fraction - 0.5).abs() < 1e-12);
    }
}

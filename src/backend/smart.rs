//! Backend for closed-loop smart controllers.

use tracing::debug;

use super::hardware::{ControlMode, SmartController, SwitchInput, Unwired};
use super::{read_switch, BackendKind, ControllerBackend, ControllerState, NativeSettings};
use crate::config::units::{Length, Rate};
use crate::config::LimitSwitchSource;
use crate::error::Result;
use crate::motion::Direction;

/// Drives a [`SmartController`] using its own closed loops.
///
/// Limit switches are read from the controller when the source is local and
/// from the `F`/`R` inputs when it is remote.
pub struct SmartBackend<C, F = Unwired, R = Unwired>
where
    C: SmartController,
    F: SwitchInput,
    R: SwitchInput,
{
    controller: C,
    forward_switch: F,
    reverse_switch: R,
    settings: NativeSettings,
    state: ControllerState,
}

impl<C: SmartController> SmartBackend<C, Unwired, Unwired> {
    /// Backend whose limit switches (if any) are wired to the controller.
    pub fn new(controller: C) -> Self {
        Self::with_remote_switches(controller, Unwired, Unwired)
    }
}

impl<C, F, R> SmartBackend<C, F, R>
where
    C: SmartController,
    F: SwitchInput,
    R: SwitchInput,
{
    /// Backend with limit switches wired to other inputs.
    pub fn with_remote_switches(controller: C, forward: F, reverse: R) -> Self {
        Self {
            controller,
            forward_switch: forward,
            reverse_switch: reverse,
            settings: NativeSettings::default(),
            state: ControllerState::Disabled,
        }
    }

    /// The wrapped controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// The wrapped controller, mutably.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    fn command(&mut self, mode: ControlMode, state: ControllerState) -> Result<()> {
        self.controller.set_control(mode)?;
        self.state = state;
        Ok(())
    }

    fn position_value(&mut self) -> Result<f64> {
        Ok(self.controller.position()?)
    }

    fn rate_value(&self, direction: Direction, rate: Rate) -> f64 {
        direction.sign() as f64 * rate.value_in(self.settings.motor_rate_unit)
    }
}

impl<C, F, R> ControllerBackend for SmartBackend<C, F, R>
where
    C: SmartController,
    F: SwitchInput,
    R: SwitchInput,
{
    fn kind(&self) -> BackendKind {
        BackendKind::Smart
    }

    fn configure(&mut self, settings: &NativeSettings) -> Result<()> {
        self.settings = *settings;
        self.controller
            .set_inverted(settings.invert_motor, settings.invert_sensor)?;
        if let Some(behavior) = settings.neutral_behavior {
            self.controller.set_neutral_behavior(behavior)?;
        }
        debug!(
            invert_motor = settings.invert_motor,
            invert_sensor = settings.invert_sensor,
            "smart controller configured"
        );
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        self.command(ControlMode::Disabled, ControllerState::Disabled)
    }

    fn hold_current_position(&mut self) -> Result<()> {
        let here = self.position_value()?;
        self.command(ControlMode::Position(here), ControllerState::HoldingPosition)
    }

    fn move_in_direction_at_rate(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        let velocity = self.rate_value(direction, rate);
        self.command(ControlMode::Velocity(velocity), ControllerState::Moving)
    }

    fn move_to_absolute_position(&mut self, position: Length) -> Result<()> {
        let target = position.value_in(self.settings.sensor_length_unit);
        self.command(ControlMode::Position(target), ControllerState::SetPosition)
    }

    fn move_to_relative_position(&mut self, direction: Direction, distance: Length) -> Result<()> {
        let here = self.position_value()?;
        let delta = direction.sign() as f64 * distance.value_in(self.settings.sensor_length_unit);
        self.command(ControlMode::Position(here + delta), ControllerState::SetPosition)
    }

    fn reset_sensor_position(&mut self, position: Length) -> Result<()> {
        let value = position.value_in(self.settings.sensor_length_unit);
        self.controller.set_position(value)?;
        Ok(())
    }

    fn current_position(&mut self) -> Result<Length> {
        let value = self.position_value()?;
        Ok(Length::new(value, self.settings.sensor_length_unit))
    }

    fn current_rate(&mut self) -> Result<Rate> {
        let value = self.controller.velocity()?;
        Ok(Rate::new(value, self.settings.sensor_rate_unit))
    }

    fn limit_switch_active(&mut self, direction: Direction) -> Result<bool> {
        let polarity = self.settings.polarity(direction);
        match (self.settings.limit_switch_source, direction) {
            (_, Direction::Neutral) => Ok(false),
            (Some(LimitSwitchSource::Remote), Direction::Forward) => {
                read_switch(&mut self.forward_switch, polarity)
            }
            (Some(LimitSwitchSource::Remote), Direction::Reverse) => {
                read_switch(&mut self.reverse_switch, polarity)
            }
            _ => {
                let closed = self.controller.limit_switch_closed(direction)?;
                Ok(polarity.unwrap_or_default().is_active(closed))
            }
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
    use crate::backend::SimulatedController;
    use crate::config::{LimitSwitchPolarity, LengthUnit, RateUnit, TimeUnit};

    const TICKS: LengthUnit = LengthUnit::Ticks { per_inch: 100.0 };

    fn settings() -> NativeSettings {
        NativeSettings {
            sensor_length_unit: TICKS,
            sensor_rate_unit: RateUnit::new(TICKS, TimeUnit::HundredMilliseconds),
            motor_rate_unit: RateUnit::new(TICKS, TimeUnit::HundredMilliseconds),
            forward_polarity: Some(LimitSwitchPolarity::NormallyClosed),
            limit_switch_source: Some(LimitSwitchSource::Local),
            ..NativeSettings::default()
        }
    }

    #[test]
    fn test_rate_in_native_units() {
        let mut backend = SmartBackend::new(SimulatedController::new());
        backend.configure(&settings()).unwrap();
        backend
            .move_in_direction_at_rate(Direction::Reverse, Rate::inches_per_second(10.0))
            .unwrap();
        // 10 in/s at 100 ticks/in is 100 ticks per 100 ms.
        match backend.controller().mode() {
            ControlMode::Velocity(v) => assert!((v + 100.0).abs() < 1e-9),
            other => panic!("unexpected mode {:?}", other),
        }
        assert_eq!(backend.state(), ControllerState::Moving);
    }

    #[test]
    fn test_relative_move_targets_from_here() {
        let mut sim = SimulatedController::new();
        sim.set_sensor(250.0);
        let mut backend = SmartBackend::new(sim);
        backend.configure(&settings()).unwrap();
        backend
            .move_to_relative_position(Direction::Forward, Length::inches(1.5))
            .unwrap();
        match backend.controller().mode() {
            ControlMode::Position(p) => assert!((p - 400.0).abs() < 1e-9),
            other => panic!("unexpected mode {:?}", other),
        }
        assert_eq!(backend.state(), ControllerState::SetPosition);
    }

    #[test]
    fn test_local_switch_polarity() {
        let mut backend = SmartBackend::new(SimulatedController::new());
        backend.configure(&settings()).unwrap();
        // Normally closed: an open circuit means pressed.
        assert!(backend.limit_switch_active(Direction::Forward).unwrap());
        backend
            .controller_mut()
            .set_limit_switch_closed(Direction::Forward, true);
        assert!(!backend.limit_switch_active(Direction::Forward).unwrap());
    }

    #[test]
    fn test_disconnected_controller_rejects() {
        let mut sim = SimulatedController::new();
        sim.set_disconnected(true);
        let mut backend = SmartBackend::new(sim);
        assert!(backend.disable().is_err());
        assert_eq!(backend.state(), ControllerState::Disabled);
    }
}

//! Unit tests for pin-level limit switches.

use axis_control::backend::{LimitSwitch, PercentBackend, PercentOutput, Unwired};
use axis_control::config::{AxisConfig, Capabilities, LimitSwitchPolarity};
use axis_control::error::HardwareFault;
use axis_control::{Direction, Motor, TargetState, UnitExt};
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};

#[derive(Default)]
struct FakeOutput {
    fraction: f64,
}

impl PercentOutput for FakeOutput {
    fn set_percent(&mut self, fraction: f64) -> Result<(), HardwareFault> {
        self.fraction = fraction;
        Ok(())
    }

    fn set_neutral(&mut self) -> Result<(), HardwareFault> {
        self.fraction = 0.0;
        Ok(())
    }
}

type SwitchedMotor = Motor<PercentBackend<FakeOutput, LimitSwitch<PinMock>, Unwired>>;

fn motor(pin: PinMock, polarity: LimitSwitchPolarity) -> SwitchedMotor {
    let config = AxisConfig::builder("conveyor")
        .capabilities(
            Capabilities::CONTROL_DIRECTION
                | Capabilities::CONTROL_RATE
                | Capabilities::FORWARD
                | Capabilities::FORWARD_HARD_LIMIT_SWITCH
                | Capabilities::REMOTE_HARD_LIMIT_SWITCH,
        )
        .hard_limit(Direction::Forward, None, polarity)
        .build()
        .unwrap();
    let backend = PercentBackend::with_switches(
        FakeOutput::default(),
        20.0.inches_per_second(),
        LimitSwitch::new(pin),
        Unwired,
    );
    Motor::new(config, backend).unwrap()
}

/// Test that a grounded input reads as a pressed normally-open switch.
#[test]
fn test_normally_open_switch() {
    let expectations = [
        PinTransaction::get(PinState::Low),
        PinTransaction::get(PinState::High),
    ];
    let mut pin = PinMock::new(&expectations);
    let mut motor = motor(pin.clone(), LimitSwitchPolarity::NormallyOpen);

    assert!(motor.hard_limit_switch_active(Direction::Forward).unwrap());
    assert!(!motor.hard_limit_switch_active(Direction::Forward).unwrap());
    pin.done();
}

/// Test that the tick stops a forward move once the switch is pressed.
#[test]
fn test_tick_stops_at_switch() {
    let expectations = [
        PinTransaction::get(PinState::Low),
        PinTransaction::get(PinState::High),
    ];
    let mut pin = PinMock::new(&expectations);
    let mut motor = motor(pin.clone(), LimitSwitchPolarity::NormallyClosed);

    motor
        .move_in_direction_at_rate(Direction::Forward, 10.0.inches_per_second())
        .unwrap();
    assert!((motor.backend().motor().fraction - 0.5).abs() < 1e-12);

    // Normally closed: a closed circuit means the switch is released.
    motor.periodic().unwrap();
    assert!(matches!(
        motor.state(),
        TargetState::MovingInDirectionAtRate { .. }
    ));

    motor.periodic().unwrap();
    assert_eq!(motor.state(), TargetState::HoldingCurrentPosition);
    assert_eq!(motor.backend().motor().fraction, 0.0);
    pin.done();
}

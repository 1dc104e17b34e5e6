//! Integration tests for axis-control.
//!
//! These tests verify the complete workflow from TOML parsing through the
//! motor state machine down to simulated hardware.

mod unit;

use axis_control::backend::hardware::ControlMode;
use axis_control::backend::{EncodedPercentBackend, PercentOutput, QuadratureEncoder};
use axis_control::command::{
    Calibrate, Hold, MoveInDirectionAtRate, MoveToAbsolutePosition, WaitForHardLimitSwitch,
};
use axis_control::config::{AxisConfig, Capabilities, LengthUnit, TimeUnit};
use axis_control::error::{HardwareFault, MotorError};
use axis_control::{
    parse_config, CommandStatus, Direction, Error, Motor, MotorSystem, SimulatedController,
    SmartBackend, Subsystem, TargetState, UnitExt,
};

// =============================================================================
// Test configuration data
// =============================================================================

const ROBOT: &str = r#"
[axes.elevator]
name = "elevator"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | CONTROL_POSITION | FORWARD | REVERSE | READ_POSITION | READ_RATE | FORWARD_HARD_LIMIT_SWITCH | REVERSE_HARD_LIMIT_SWITCH | LOCAL_HARD_LIMIT_SWITCH | FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR | REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR | DEFAULT_RATE"
forward_hard_limit = 48.0
reverse_hard_limit = 0.0
forward_limit_switch_polarity = "normally_open"
reverse_limit_switch_polarity = "normally_open"
auto_zero_tolerance = 0.05
default_rate = 6.0
default_command = "hold"

[axes.intake]
name = "intake"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | FORWARD"

[axes.climber]
name = "climber"
capabilities = "DISCONNECTED | CONTROL_DIRECTION | CONTROL_RATE | CONTROL_POSITION | FORWARD | REVERSE | READ_POSITION"
"#;

type SimBackend = SmartBackend<SimulatedController>;

fn system() -> MotorSystem {
    MotorSystem::from_config(parse_config(ROBOT).expect("Failed to parse TOML"))
}

fn sim() -> SimBackend {
    SmartBackend::new(SimulatedController::new())
}

fn controller(motor: &Motor<SimBackend>) -> &SimulatedController {
    motor.backend().controller()
}

fn controller_mut(motor: &mut Motor<SimBackend>) -> &mut SimulatedController {
    motor.backend_mut().controller_mut()
}

// =============================================================================
// Transition guards
// =============================================================================

#[test]
fn repeated_request_is_issued_once() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    for _ in 0..3 {
        motor
            .move_in_direction_at_rate(Direction::Forward, 4.0.inches_per_second())
            .unwrap();
    }
    assert_eq!(controller(&motor).command_count(), 1);
}

#[test]
fn invalid_arguments_are_rejected_before_hardware() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    let neutral = motor.move_to_relative_position(Direction::Neutral, 2.0.inches());
    assert!(matches!(
        neutral,
        Err(Error::Motor(MotorError::InvalidArgument(_)))
    ));
    let negative =
        motor.move_in_direction_at_rate(Direction::Reverse, (-4.0).inches_per_second());
    assert!(matches!(
        negative,
        Err(Error::Motor(MotorError::InvalidArgument(_)))
    ));
    assert_eq!(controller(&motor).command_count(), 0);
    assert_eq!(motor.state(), TargetState::Disabled);
}

#[test]
fn undeclared_direction_is_unsupported() {
    let mut motor = system().build_motor("intake", sim()).unwrap();
    let result = motor.move_in_direction_at_rate(Direction::Reverse, 1.0.inches_per_second());
    assert!(matches!(
        result,
        Err(Error::Motor(MotorError::UnsupportedOperation { .. }))
    ));
    assert!(motor
        .move_in_direction_at_rate(Direction::Forward, 1.0.inches_per_second())
        .is_ok());
}

#[test]
fn disconnected_axis_is_held_disabled() {
    let mut motor = system().build_motor("climber", sim()).unwrap();
    let result = motor.move_to_absolute_position(24.0.inches());
    assert_eq!(result, Err(Error::Motor(MotorError::Disconnected)));
    assert_eq!(motor.state(), TargetState::Disabled);
    assert_eq!(controller(&motor).command_count(), 0);
    assert_eq!(controller(&motor).inverted(), (false, false));
}

#[test]
fn hardware_rejection_keeps_previous_state() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    motor.hold_current_position().unwrap();
    controller_mut(&mut motor).set_disconnected(true);
    let result = motor.move_to_absolute_position(12.0.inches());
    assert_eq!(
        result,
        Err(Error::Motor(MotorError::HardwareRejected(
            HardwareFault::Disconnected
        )))
    );
    assert_eq!(motor.state(), TargetState::HoldingCurrentPosition);
}

// =============================================================================
// Auto-zero and calibration
// =============================================================================

#[test]
fn hold_at_forward_limit_resets_sensor() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    let moving = TargetState::MovingInDirectionAtRate {
        direction: Direction::Forward,
        rate: 6.0.inches_per_second(),
    };
    motor.request(moving).unwrap();

    controller_mut(&mut motor).set_sensor(47.2);
    controller_mut(&mut motor).set_limit_switch_closed(Direction::Forward, true);
    motor.hold_current_position().unwrap();

    assert_eq!(controller(&motor).sensor(), 48.0);
    assert_eq!(motor.current_position().unwrap(), 48.0.inches());
    assert_eq!(motor.previous_state(), moving);
}

#[test]
fn redundant_hold_still_auto_zeroes() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    motor.hold_current_position().unwrap();
    let commands = controller(&motor).command_count();

    controller_mut(&mut motor).set_sensor(0.4);
    controller_mut(&mut motor).set_limit_switch_closed(Direction::Reverse, true);
    motor.hold_current_position().unwrap();

    assert_eq!(controller(&motor).sensor(), 0.0);
    assert_eq!(controller(&motor).command_count(), commands);
}

#[test]
fn calibration_seeks_reverse_limit() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    controller_mut(&mut motor).set_sensor(10.0);
    motor.calibrate_sensor_in_direction(Direction::Reverse).unwrap();

    let mut cycles = 0;
    while motor.state() != TargetState::HoldingCurrentPosition {
        controller_mut(&mut motor).advance(0.5);
        if controller(&motor).sensor() <= 3.0 {
            controller_mut(&mut motor).set_limit_switch_closed(Direction::Reverse, true);
        }
        motor.periodic().unwrap();
        cycles += 1;
        assert!(cycles < 10, "calibration never finished");
    }
    assert_eq!(motor.current_position().unwrap(), 0.0.inches());
}

// =============================================================================
// Unit conversion end to end
// =============================================================================

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

#[derive(Default)]
struct FakeEncoder {
    count: i64,
}

impl QuadratureEncoder for FakeEncoder {
    fn count(&mut self) -> Result<i64, HardwareFault> {
        Ok(self.count)
    }

    fn rate(&mut self) -> Result<f64, HardwareFault> {
        Ok(0.0)
    }

    fn set_count(&mut self, count: i64) -> Result<(), HardwareFault> {
        self.count = count;
        Ok(())
    }
}

#[test]
fn scaled_reversed_axis_round_trips() {
    let config = AxisConfig::builder("wrist")
        .capabilities(
            Capabilities::CONTROL_DIRECTION
                | Capabilities::CONTROL_RATE
                | Capabilities::CONTROL_POSITION
                | Capabilities::FORWARD
                | Capabilities::REVERSE
                | Capabilities::READ_POSITION
                | Capabilities::SENSOR_TO_DRIVE_SCALE,
        )
        .sensor_units(LengthUnit::Ticks { per_inch: 100.0 }, TimeUnit::Seconds)
        .sensor_to_drive_scale(3.0)
        .phase(true, false)
        .build()
        .unwrap();
    let backend = EncodedPercentBackend::new(
        FakeOutput::default(),
        FakeEncoder::default(),
        30.0.inches_per_second(),
        0.001,
    );
    let mut motor = Motor::new(config, backend).unwrap();

    motor.move_to_absolute_position(5.0.inches()).unwrap();
    // 5 in, times 3, phase reversed: -15 in of sensor travel.
    let setpoint = motor.backend().setpoint().expect("no setpoint");
    assert!((setpoint + 1500.0).abs() < 1e-6);
    assert_eq!(motor.backend().motor().fraction, -1.0);

    motor.backend_mut().encoder_mut().set_count(-1500).unwrap();
    assert_eq!(motor.current_position().unwrap(), 5.0.inches());
    assert!(motor.position_error_within(0.01.inches()).unwrap());
}

// =============================================================================
// Commands and subsystems
// =============================================================================

#[test]
fn subsystem_runs_default_then_commands() {
    let mut system = system();
    let motor = system.register_motor("elevator", sim()).unwrap();
    let mut elevator = Subsystem::new(motor);

    elevator.periodic().unwrap();
    assert_eq!(elevator.owner(), Some("Hold"));

    elevator
        .claim(MoveToAbsolutePosition::new(30.0.inches()).sync(0.1.inches()))
        .unwrap();
    let wait = elevator
        .watch(WaitForHardLimitSwitch::new(Direction::Forward))
        .unwrap();
    elevator.periodic().unwrap();
    assert_eq!(elevator.owner_status(), Some(CommandStatus::Running));

    elevator
        .motor_mut()
        .backend_mut()
        .controller_mut()
        .advance(0.02);
    elevator.periodic().unwrap();
    assert_eq!(elevator.owner_status(), Some(CommandStatus::Complete));
    assert_eq!(elevator.wait_status(wait), Some(CommandStatus::Running));
    elevator.release(wait);
    assert_eq!(elevator.wait_status(wait), None);
}

#[test]
fn claim_interrupts_running_calibration() {
    let motor = system().build_motor("elevator", sim()).unwrap();
    let mut elevator = Subsystem::new(motor).with_default_command(Hold);

    elevator
        .claim(Calibrate::new(Direction::Reverse).sync())
        .unwrap();
    elevator.periodic().unwrap();
    assert_eq!(elevator.owner_status(), Some(CommandStatus::Running));

    elevator
        .claim(MoveInDirectionAtRate::at_default_rate(Direction::Forward))
        .unwrap();
    assert_eq!(
        elevator.motor().previous_state(),
        TargetState::HoldingCurrentPosition
    );
    match elevator.motor().backend().controller().mode() {
        ControlMode::Velocity(v) => assert!((v - 6.0).abs() < 1e-9),
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn diagnostics_report_state_and_switches() {
    let mut motor = system().build_motor("elevator", sim()).unwrap();
    controller_mut(&mut motor).set_limit_switch_closed(Direction::Reverse, true);
    motor.hold_current_position().unwrap();
    motor.dump_diagnostics();

    let line = motor.diagnostics();
    assert!(line.starts_with("elevator: target=HoldingCurrentPosition previous=Disabled"));
    assert!(line.contains("controller=HoldingPosition"));
    assert!(line.ends_with("fwd_limit=clear rev_limit=active"));
}

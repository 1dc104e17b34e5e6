//! Unit tests for TOML configuration parsing.

use axis_control::config::{
    parse_config, Capabilities, DefaultCommand, LengthUnit, LimitSwitchPolarity, NeutralBehavior,
    RateUnit, TimeUnit,
};
use axis_control::{Direction, Length, Phase, Rate};

const ELEVATOR: &str = r#"
[axes.elevator]
name = "elevator"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | CONTROL_POSITION | FORWARD | REVERSE | READ_POSITION | READ_RATE | REVERSE_HARD_LIMIT_SWITCH | LOCAL_HARD_LIMIT_SWITCH | REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR | FORWARD_SOFT_LIMIT_SWITCH | SENSOR_TO_DRIVE_SCALE | DEFAULT_RATE | NEUTRAL_BEHAVIOR"
sensor_length_unit = { ticks = { per_inch = 4096.0 } }
sensor_rate_unit = { length = { ticks = { per_inch = 4096.0 } }, time = "hundred_milliseconds" }
reverse_hard_limit = 0.0
reverse_limit_switch_polarity = "normally_closed"
forward_soft_limit = 60.0
sensor_to_drive_scale = 2.0
default_rate = 12.0
neutral_behavior = "brake"
default_command = "hold"
motor_phase_reversed = true
"#;

/// Test parsing a fully specified axis.
#[test]
fn test_parse_axis_config() {
    let config = parse_config(ELEVATOR).expect("Failed to parse TOML");
    let axis = config.axis("elevator").expect("Axis not found");

    let ticks = LengthUnit::Ticks { per_inch: 4096.0 };
    assert_eq!(axis.name(), "elevator");
    assert!(axis.has_all(Capabilities::CONTROL_POSITION | Capabilities::REVERSE_HARD_LIMIT_SWITCH));
    assert_eq!(axis.display_length_unit(), LengthUnit::Inches);
    assert_eq!(axis.sensor_length_unit(), ticks);
    assert_eq!(axis.sensor_rate_unit(), RateUnit::new(ticks, TimeUnit::HundredMilliseconds));
    // The motor frame defaults to the sensor length unit.
    assert_eq!(axis.motor_length_unit(), ticks);
    assert_eq!(axis.motor_rate_unit(), RateUnit::new(ticks, TimeUnit::Seconds));

    assert_eq!(axis.hard_limit(Direction::Reverse).unwrap(), Length::inches(0.0));
    assert_eq!(
        axis.limit_switch_polarity(Direction::Reverse).unwrap(),
        LimitSwitchPolarity::NormallyClosed
    );
    assert_eq!(axis.soft_limit(Direction::Forward).unwrap(), Length::inches(60.0));
    assert_eq!(axis.sensor_to_drive_scale().unwrap(), 2.0);
    assert_eq!(axis.default_rate().unwrap(), Rate::inches_per_second(12.0));
    assert_eq!(axis.neutral_behavior().unwrap(), NeutralBehavior::Brake);
    assert_eq!(axis.default_command(), DefaultCommand::Hold);
    assert_eq!(axis.motor_phase(), Phase::Reversed);
    assert_eq!(axis.sensor_phase(), Phase::Normal);
}

/// Test that omitted optional fields fall back to their defaults.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[axes.intake]
name = "intake"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | FORWARD | REVERSE | FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR"
"#;
    // Resets-sensor needs the forward switch and a position sensor.
    assert!(parse_config(toml_str).is_err());

    let toml_str = r#"
[axes.intake]
name = "intake"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | FORWARD | REVERSE"
"#;
    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let axis = config.axis("intake").unwrap();
    assert_eq!(axis.default_command(), DefaultCommand::Disable);
    assert_eq!(axis.effective_scale(), 1.0);
    assert_eq!(axis.display_rate_unit(), RateUnit::INCHES_PER_SECOND);
    assert!(axis.default_rate().is_err());
    assert!(axis.auto_zero_tolerance().is_err());
}

/// Test metric display units.
#[test]
fn test_parse_metric_display_units() {
    let toml_str = r#"
[axes.arm]
name = "arm"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | CONTROL_POSITION | FORWARD | REVERSE | READ_POSITION | FORWARD_SOFT_LIMIT_SWITCH | REVERSE_SOFT_LIMIT_SWITCH"
display_length_unit = "millimeters"
reverse_soft_limit = -100.0
forward_soft_limit = 250.0
"#;
    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let limits = config.axis("arm").unwrap().soft_limits();
    let forward = limits.forward.unwrap();
    assert_eq!(forward.unit(), LengthUnit::Millimeters);
    assert!((forward.value_in(LengthUnit::Inches) - 250.0 / 25.4).abs() < 1e-9);
}

/// Test several axes keep their declaration order.
#[test]
fn test_parse_multiple_axes() {
    let toml_str = r#"
[axes.left_drive]
name = "left_drive"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | FORWARD | REVERSE"

[axes.right_drive]
name = "right_drive"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | FORWARD | REVERSE"
motor_phase_reversed = true
"#;
    let config = parse_config(toml_str).expect("Failed to parse TOML");
    let names: Vec<_> = config.axis_names().collect();
    assert_eq!(names, ["left_drive", "right_drive"]);
}

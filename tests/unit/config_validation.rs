//! Unit tests for configuration validation.

use axis_control::config::{
    parse_config, validate_config, AxisConfig, Capabilities, LengthUnit, LimitSwitchPolarity,
    RobotConfig, TimeUnit, MAX_NAME_LEN,
};
use axis_control::error::{ConfigError, Error};
use axis_control::{Direction, Length, UnitExt};

fn open_loop() -> Capabilities {
    Capabilities::CONTROL_DIRECTION | Capabilities::CONTROL_RATE | Capabilities::FORWARD
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let mut config = RobotConfig::default();
    config
        .insert(AxisConfig::builder("shooter").capabilities(open_loop()).build().unwrap())
        .unwrap();
    assert!(validate_config(&config).is_ok());
}

/// Test that a capability without its prerequisite is rejected.
#[test]
fn test_missing_prerequisite() {
    let result = AxisConfig::builder("shooter")
        .capabilities(Capabilities::FORWARD)
        .build();
    match result {
        Err(Error::Config(ConfigError::MissingPrerequisite { capability, requires })) => {
            assert_eq!(capability, Capabilities::FORWARD);
            assert_eq!(requires, Capabilities::CONTROL_DIRECTION);
        }
        other => panic!("Expected MissingPrerequisite, got {:?}", other.map(|_| ())),
    }
}

/// Test that local and remote limit switch sources cannot be combined.
#[test]
fn test_exclusive_switch_sources() {
    let result = AxisConfig::builder("hood")
        .capabilities(
            open_loop()
                | Capabilities::FORWARD_HARD_LIMIT_SWITCH
                | Capabilities::LOCAL_HARD_LIMIT_SWITCH
                | Capabilities::REMOTE_HARD_LIMIT_SWITCH,
        )
        .hard_limit(Direction::Forward, None, LimitSwitchPolarity::NormallyOpen)
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MutuallyExclusive(_)))
    ));
}

/// Test the parameter-iff-capability rule in both directions.
#[test]
fn test_parameter_presence() {
    let missing = AxisConfig::builder("hood")
        .capabilities(open_loop() | Capabilities::DEFAULT_RATE)
        .build();
    assert!(matches!(
        missing,
        Err(Error::Config(ConfigError::MissingParameter("default_rate")))
    ));

    let unexpected = AxisConfig::builder("hood")
        .capabilities(open_loop())
        .default_rate(3.0.inches_per_second())
        .build();
    assert!(matches!(
        unexpected,
        Err(Error::Config(ConfigError::UnexpectedParameter("default_rate")))
    ));
}

/// Test that soft limits must lie inside hard limits.
#[test]
fn test_soft_limit_inside_hard_limit() {
    let result = AxisConfig::builder("lift")
        .capabilities(
            open_loop()
                | Capabilities::READ_POSITION
                | Capabilities::FORWARD_HARD_LIMIT_SWITCH
                | Capabilities::LOCAL_HARD_LIMIT_SWITCH
                | Capabilities::FORWARD_SOFT_LIMIT_SWITCH,
        )
        .hard_limit(
            Direction::Forward,
            Some(Length::inches(40.0)),
            LimitSwitchPolarity::NormallyOpen,
        )
        .soft_limit(Direction::Forward, Length::inches(41.0))
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::SoftLimitOutsideHardLimit { .. }))
    ));
}

/// Test that validation failures surface while loading TOML.
#[test]
fn test_invalid_toml_axis_fails_at_load() {
    let toml_str = r#"
[axes.lift]
name = "lift"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | SENSOR_TO_DRIVE_SCALE"
sensor_to_drive_scale = -2.0
"#;
    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test that a table key must match the axis name.
#[test]
fn test_key_must_match_name() {
    let toml_str = r#"
[axes.lift]
name = "elevator"
capabilities = "CONTROL_DIRECTION"
"#;
    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::AxisNotFound(_)))));
}

/// Test that a tick unit with no positive count per inch is rejected.
#[test]
fn test_zero_tick_unit_fails_at_load() {
    let toml_str = r#"
[axes.lift]
name = "lift"
capabilities = "CONTROL_DIRECTION | CONTROL_RATE | FORWARD"
sensor_length_unit = { ticks = { per_inch = 0.0 } }
"#;
    match parse_config(toml_str) {
        Err(Error::Config(ConfigError::ParseError(msg))) => {
            assert!(msg.contains("tick unit"), "unexpected message: {}", msg);
        }
        other => panic!("Expected ParseError, got {:?}", other.map(|_| ())),
    }
}

/// Test that a negative tick unit cannot silently flip the axis.
#[test]
fn test_negative_tick_unit_is_rejected() {
    let result = AxisConfig::builder("lift")
        .capabilities(open_loop())
        .sensor_units(LengthUnit::Ticks { per_inch: -4096.0 }, TimeUnit::HundredMilliseconds)
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidUnit { frame: "sensor", .. }))
    ));
}

/// Test that names longer than the name buffer are reported, not emptied.
#[test]
fn test_overlong_axis_name() {
    let name = "left_drivetrain_side_master_talon_srx";
    assert!(name.len() > MAX_NAME_LEN);
    let result = AxisConfig::builder(name).capabilities(open_loop()).build();
    assert_eq!(
        result.err(),
        Some(Error::Config(ConfigError::NameTooLong(name.len())))
    );

    let exact = "a".repeat(MAX_NAME_LEN);
    let config = AxisConfig::builder(&exact)
        .capabilities(open_loop())
        .build()
        .unwrap();
    assert_eq!(config.name(), exact);
}

//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motion::Direction;

use super::axis::AxisConfig;
use super::capability::{Capabilities, MUTUALLY_EXCLUSIVE, PREREQUISITES};
use super::units::LengthUnit;
use super::RobotConfig;

/// Validate a robot configuration.
///
/// Checks every axis (see [`validate_axis`]) and that each axis' `name`
/// matches the key it is registered under.
pub fn validate_config(config: &RobotConfig) -> Result<()> {
    for (key, axis) in config.axes.iter() {
        validate_axis(axis)?;
        if key.as_str() != axis.name() {
            return Err(Error::Config(ConfigError::AxisNotFound(key.clone())));
        }
    }
    Ok(())
}

/// Validate one axis configuration.
///
/// Checks:
/// - Capability prerequisites and mutual exclusions
/// - Parameters are present exactly when their capability is declared
/// - Tick units count a finite, positive number per inch
/// - Rate units use the length unit of their frame
/// - Hard limits are ordered and soft limits lie inside them
/// - Scale and default rate are strictly positive
pub fn validate_axis(config: &AxisConfig) -> Result<()> {
    validate_capabilities(config.capabilities)?;
    validate_parameters(config)?;
    validate_units(config)?;
    validate_values(config)
}

fn validate_capabilities(declared: Capabilities) -> Result<()> {
    for rule in PREREQUISITES {
        if let Some(requires) = rule.unmet(declared) {
            return Err(Error::Config(ConfigError::MissingPrerequisite {
                capability: rule.capability,
                requires,
            }));
        }
    }
    for exclusive in MUTUALLY_EXCLUSIVE {
        if declared.contains(*exclusive) {
            return Err(Error::Config(ConfigError::MutuallyExclusive(*exclusive)));
        }
    }
    Ok(())
}

/// A parameter must be present iff `required`.
fn presence(name: &'static str, present: bool, required: bool) -> Result<()> {
    match (present, required) {
        (false, true) => Err(Error::Config(ConfigError::MissingParameter(name))),
        (true, false) => Err(Error::Config(ConfigError::UnexpectedParameter(name))),
        _ => Ok(()),
    }
}

fn validate_parameters(config: &AxisConfig) -> Result<()> {
    let caps = config.capabilities;
    let has = |c: Capabilities| caps.has_all(c);

    presence(
        "forward_hard_limit",
        config.forward_hard_limit.is_some(),
        has(Capabilities::FORWARD_HARD_LIMIT_SWITCH | Capabilities::READ_POSITION),
    )?;
    presence(
        "reverse_hard_limit",
        config.reverse_hard_limit.is_some(),
        has(Capabilities::REVERSE_HARD_LIMIT_SWITCH | Capabilities::READ_POSITION),
    )?;
    presence(
        "forward_limit_switch_polarity",
        config.forward_polarity.is_some(),
        has(Capabilities::FORWARD_HARD_LIMIT_SWITCH),
    )?;
    presence(
        "reverse_limit_switch_polarity",
        config.reverse_polarity.is_some(),
        has(Capabilities::REVERSE_HARD_LIMIT_SWITCH),
    )?;
    presence(
        "forward_soft_limit",
        config.soft_limits.forward.is_some(),
        has(Capabilities::FORWARD_SOFT_LIMIT_SWITCH),
    )?;
    presence(
        "reverse_soft_limit",
        config.soft_limits.reverse.is_some(),
        has(Capabilities::REVERSE_SOFT_LIMIT_SWITCH),
    )?;
    presence(
        "default_rate",
        config.default_rate.is_some(),
        has(Capabilities::DEFAULT_RATE),
    )?;
    presence(
        "sensor_to_drive_scale",
        config.sensor_to_drive_scale.is_some(),
        has(Capabilities::SENSOR_TO_DRIVE_SCALE),
    )?;
    presence(
        "neutral_behavior",
        config.neutral_behavior.is_some(),
        has(Capabilities::NEUTRAL_BEHAVIOR),
    )?;

    // Optional, but meaningless without a sensor-resetting switch.
    let resets = caps.has_any(
        Capabilities::FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR
            | Capabilities::REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR,
    );
    if config.auto_zero_tolerance.is_some() && !resets {
        return Err(Error::Config(ConfigError::UnexpectedParameter(
            "auto_zero_tolerance",
        )));
    }

    Ok(())
}

fn validate_units(config: &AxisConfig) -> Result<()> {
    let frames = [
        ("display", config.display_length_unit),
        ("sensor", config.sensor_length_unit),
        ("motor", config.motor_length_unit),
    ];
    for (frame, unit) in frames {
        if let LengthUnit::Ticks { per_inch } = unit {
            if !per_inch.is_finite() || per_inch <= 0.0 {
                return Err(Error::Config(ConfigError::InvalidUnit { frame, per_inch }));
            }
        }
    }
    if config.display_rate_unit.length != config.display_length_unit {
        return Err(Error::Config(ConfigError::UnitMismatch("display")));
    }
    if config.sensor_rate_unit.length != config.sensor_length_unit {
        return Err(Error::Config(ConfigError::UnitMismatch("sensor")));
    }
    if config.motor_rate_unit.length != config.motor_length_unit {
        return Err(Error::Config(ConfigError::UnitMismatch("motor")));
    }
    Ok(())
}

fn validate_values(config: &AxisConfig) -> Result<()> {
    if let Some(scale) = config.sensor_to_drive_scale {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidScale(scale)));
        }
    }

    if let Some(rate) = config.default_rate {
        if rate.is_negative() || rate.is_zero() {
            return Err(Error::Config(ConfigError::InvalidDefaultRate(rate.value())));
        }
    }

    if let Some(tolerance) = config.auto_zero_tolerance {
        if tolerance.is_negative() {
            return Err(Error::Config(ConfigError::UnexpectedParameter(
                "auto_zero_tolerance",
            )));
        }
    }

    if let (Some(reverse), Some(forward)) = (config.reverse_hard_limit, config.forward_hard_limit) {
        if reverse >= forward {
            return Err(Error::Config(ConfigError::InvalidLimits {
                reverse: reverse.value(),
                forward: forward.value(),
            }));
        }
    }

    let soft = config.soft_limits;
    if let (Some(reverse), Some(forward)) = (soft.reverse, soft.forward) {
        if !soft.is_valid() {
            return Err(Error::Config(ConfigError::InvalidLimits {
                reverse: reverse.value(),
                forward: forward.value(),
            }));
        }
    }

    for direction in Direction::TRAVEL {
        let hard = match direction {
            Direction::Forward => config.forward_hard_limit,
            _ => config.reverse_hard_limit,
        };
        if let (Some(soft), Some(hard)) = (soft.get(direction), hard) {
            let outside = match direction {
                Direction::Forward => soft > hard,
                _ => soft < hard,
            };
            if outside {
                return Err(Error::Config(ConfigError::SoftLimitOutsideHardLimit {
                    soft: soft.value(),
                    hard: hard.value(),
                }));
            }
        }
    }

    Ok(())
}

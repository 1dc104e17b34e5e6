//! Per-axis capability configuration.
//!
//! An [`AxisConfig`] is immutable once built. Construction (from code via
//! [`AxisConfigBuilder`] or from TOML) runs full cross-validation, so a value
//! of this type is always internally consistent.

use heapless::String;
use serde::Deserialize;

use super::capability::Capabilities;
use super::limits::{LimitSwitchPolarity, LimitSwitchSource, SoftLimits};
use super::units::{Length, LengthUnit, Rate, RateUnit, TimeUnit};
use super::validation::validate_axis;
use crate::error::{ConfigError, Error, Result};
use crate::motion::{Direction, Phase};

/// Default tolerance for auto-zero comparisons, in display units.
pub const DEFAULT_AUTO_ZERO_TOLERANCE: f64 = 0.01;

/// Longest axis name, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Copy `name` into a fixed-capacity axis name.
///
/// # Errors
///
/// Returns `NameTooLong` if `name` exceeds [`MAX_NAME_LEN`] bytes.
pub fn axis_name(name: &str) -> Result<String<MAX_NAME_LEN>> {
    String::try_from(name).map_err(|_| Error::Config(ConfigError::NameTooLong(name.len())))
}

/// Output behavior when the controller is in neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NeutralBehavior {
    /// Let the mechanism spin down freely.
    #[default]
    Coast,
    /// Short the windings to stop quickly.
    Brake,
}

/// Command an axis falls back to when nothing else holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DefaultCommand {
    /// Disable the output.
    #[default]
    Disable,
    /// Hold the current position.
    Hold,
}

/// Immutable configuration of one physical axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawAxisConfig")]
pub struct AxisConfig {
    pub(super) name: String<MAX_NAME_LEN>,
    pub(super) capabilities: Capabilities,
    pub(super) display_length_unit: LengthUnit,
    pub(super) sensor_length_unit: LengthUnit,
    pub(super) motor_length_unit: LengthUnit,
    pub(super) display_rate_unit: RateUnit,
    pub(super) sensor_rate_unit: RateUnit,
    pub(super) motor_rate_unit: RateUnit,
    pub(super) forward_hard_limit: Option<Length>,
    pub(super) reverse_hard_limit: Option<Length>,
    pub(super) soft_limits: SoftLimits,
    pub(super) forward_polarity: Option<LimitSwitchPolarity>,
    pub(super) reverse_polarity: Option<LimitSwitchPolarity>,
    pub(super) auto_zero_tolerance: Option<Length>,
    pub(super) default_rate: Option<Rate>,
    pub(super) sensor_to_drive_scale: Option<f64>,
    pub(super) motor_phase_reversed: bool,
    pub(super) sensor_phase_reversed: bool,
    pub(super) neutral_behavior: Option<NeutralBehavior>,
    pub(super) default_command: DefaultCommand,
}

fn unsupported(missing: Capabilities) -> Error {
    Error::Config(ConfigError::UnsupportedCapability(missing))
}

impl AxisConfig {
    /// Start building a configuration for the axis `name`.
    pub fn builder(name: &str) -> AxisConfigBuilder {
        AxisConfigBuilder::new(name)
    }

    /// Axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared capabilities.
    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// True if every capability in `caps` is declared.
    #[inline]
    pub fn has_all(&self, caps: Capabilities) -> bool {
        self.capabilities.has_all(caps)
    }

    /// True if at least one capability in `caps` is declared.
    #[inline]
    pub fn has_any(&self, caps: Capabilities) -> bool {
        self.capabilities.has_any(caps)
    }

    /// Fail with `UnsupportedCapability` unless every capability in `caps` is declared.
    pub fn require_all(&self, caps: Capabilities) -> Result<()> {
        let missing = self.capabilities.missing(caps);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(unsupported(missing))
        }
    }

    /// Fail with `UnsupportedCapability` unless one capability in `caps` is declared.
    pub fn require_any(&self, caps: Capabilities) -> Result<()> {
        if caps.is_empty() || self.capabilities.has_any(caps) {
            Ok(())
        } else {
            Err(unsupported(caps))
        }
    }

    /// True if the axis is marked as physically absent.
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.has_all(Capabilities::DISCONNECTED)
    }

    /// Unit of positions shown to subsystems.
    #[inline]
    pub fn display_length_unit(&self) -> LengthUnit {
        self.display_length_unit
    }

    /// Unit of positions reported by the sensor.
    #[inline]
    pub fn sensor_length_unit(&self) -> LengthUnit {
        self.sensor_length_unit
    }

    /// Unit of distances native to the motor controller.
    #[inline]
    pub fn motor_length_unit(&self) -> LengthUnit {
        self.motor_length_unit
    }

    /// Unit of rates shown to subsystems.
    #[inline]
    pub fn display_rate_unit(&self) -> RateUnit {
        self.display_rate_unit
    }

    /// Unit of rates reported by the sensor.
    #[inline]
    pub fn sensor_rate_unit(&self) -> RateUnit {
        self.sensor_rate_unit
    }

    /// Unit of rates commanded to the motor controller.
    #[inline]
    pub fn motor_rate_unit(&self) -> RateUnit {
        self.motor_rate_unit
    }

    /// Position at which the hard limit switch in `direction` trips.
    pub fn hard_limit(&self, direction: Direction) -> Result<Length> {
        self.require_all(Capabilities::hard_limit_switch(direction) | Capabilities::READ_POSITION)?;
        match direction {
            Direction::Forward => self.forward_hard_limit,
            Direction::Reverse => self.reverse_hard_limit,
            Direction::Neutral => None,
        }
        .ok_or(unsupported(Capabilities::hard_limit_switch(direction)))
    }

    /// Soft limit position in `direction`.
    pub fn soft_limit(&self, direction: Direction) -> Result<Length> {
        self.require_all(Capabilities::soft_limit_switch(direction))?;
        self.soft_limits
            .get(direction)
            .ok_or(unsupported(Capabilities::soft_limit_switch(direction)))
    }

    /// Both soft limits; sides without the capability are `None`.
    #[inline]
    pub fn soft_limits(&self) -> SoftLimits {
        self.soft_limits
    }

    /// Electrical polarity of the hard limit switch in `direction`.
    pub fn limit_switch_polarity(&self, direction: Direction) -> Result<LimitSwitchPolarity> {
        self.require_all(Capabilities::hard_limit_switch(direction))?;
        match direction {
            Direction::Forward => self.forward_polarity,
            Direction::Reverse => self.reverse_polarity,
            Direction::Neutral => None,
        }
        .ok_or(unsupported(Capabilities::hard_limit_switch(direction)))
    }

    /// Where the hard limit switches are wired.
    pub fn limit_switch_source(&self) -> Result<LimitSwitchSource> {
        self.require_any(
            Capabilities::LOCAL_HARD_LIMIT_SWITCH | Capabilities::REMOTE_HARD_LIMIT_SWITCH,
        )?;
        if self.has_all(Capabilities::REMOTE_HARD_LIMIT_SWITCH) {
            Ok(LimitSwitchSource::Remote)
        } else {
            Ok(LimitSwitchSource::Local)
        }
    }

    /// True if the hard limit switch in `direction` re-zeroes the sensor.
    #[inline]
    pub fn hard_limit_resets_sensor(&self, direction: Direction) -> bool {
        !direction.is_neutral() && self.has_all(Capabilities::resets_sensor(direction))
    }

    /// Tolerance used to decide whether auto-zero must correct the sensor.
    pub fn auto_zero_tolerance(&self) -> Result<Length> {
        self.require_any(
            Capabilities::FORWARD_HARD_LIMIT_SWITCH_RESETS_SENSOR
                | Capabilities::REVERSE_HARD_LIMIT_SWITCH_RESETS_SENSOR,
        )?;
        Ok(self.auto_zero_tolerance.unwrap_or_else(|| {
            Length::new(DEFAULT_AUTO_ZERO_TOLERANCE, self.display_length_unit)
        }))
    }

    /// Rate used for seeks and calibration.
    pub fn default_rate(&self) -> Result<Rate> {
        self.require_all(Capabilities::DEFAULT_RATE)?;
        self.default_rate.ok_or(unsupported(Capabilities::DEFAULT_RATE))
    }

    /// Gearing multiplier between drive output and sensor.
    pub fn sensor_to_drive_scale(&self) -> Result<f64> {
        self.require_all(Capabilities::SENSOR_TO_DRIVE_SCALE)?;
        self.sensor_to_drive_scale
            .ok_or(unsupported(Capabilities::SENSOR_TO_DRIVE_SCALE))
    }

    /// Gearing multiplier, or 1.0 when the axis declares none.
    #[inline]
    pub fn effective_scale(&self) -> f64 {
        self.sensor_to_drive_scale.unwrap_or(1.0)
    }

    /// Neutral output behavior.
    pub fn neutral_behavior(&self) -> Result<NeutralBehavior> {
        self.require_all(Capabilities::NEUTRAL_BEHAVIOR)?;
        self.neutral_behavior
            .ok_or(unsupported(Capabilities::NEUTRAL_BEHAVIOR))
    }

    /// Sign convention of the motor output.
    #[inline]
    pub fn motor_phase(&self) -> Phase {
        Phase::from_reversed(self.motor_phase_reversed)
    }

    /// Sign convention of the sensor.
    #[inline]
    pub fn sensor_phase(&self) -> Phase {
        Phase::from_reversed(self.sensor_phase_reversed)
    }

    /// Command to fall back to when the axis is idle.
    #[inline]
    pub fn default_command(&self) -> DefaultCommand {
        self.default_command
    }
}

/// Builder for [`AxisConfig`]; `build()` validates.
#[derive(Debug, Clone)]
pub struct AxisConfigBuilder {
    config: AxisConfig,
    name_error: Option<Error>,
}

impl AxisConfigBuilder {
    /// Create a builder with inch/second units and no capabilities.
    pub fn new(name: &str) -> Self {
        let (name, name_error) = match axis_name(name) {
            Ok(name) => (name, None),
            Err(e) => (String::new(), Some(e)),
        };
        Self {
            name_error,
            config: AxisConfig {
                name,
                capabilities: Capabilities::empty(),
                display_length_unit: LengthUnit::Inches,
                sensor_length_unit: LengthUnit::Inches,
                motor_length_unit: LengthUnit::Inches,
                display_rate_unit: RateUnit::INCHES_PER_SECOND,
                sensor_rate_unit: RateUnit::INCHES_PER_SECOND,
                motor_rate_unit: RateUnit::INCHES_PER_SECOND,
                forward_hard_limit: None,
                reverse_hard_limit: None,
                soft_limits: SoftLimits::default(),
                forward_polarity: None,
                reverse_polarity: None,
                auto_zero_tolerance: None,
                default_rate: None,
                sensor_to_drive_scale: None,
                motor_phase_reversed: false,
                sensor_phase_reversed: false,
                neutral_behavior: None,
                default_command: DefaultCommand::Disable,
            },
        }
    }

    /// Declare capabilities (added to any already declared).
    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.config.capabilities |= caps;
        self
    }

    /// Set the display length unit; rate unit follows with a per-second base.
    pub fn display_units(mut self, length: LengthUnit, time: TimeUnit) -> Self {
        self.config.display_length_unit = length;
        self.config.display_rate_unit = RateUnit::new(length, time);
        self
    }

    /// Set sensor-native length and rate units.
    pub fn sensor_units(mut self, length: LengthUnit, time: TimeUnit) -> Self {
        self.config.sensor_length_unit = length;
        self.config.sensor_rate_unit = RateUnit::new(length, time);
        self
    }

    /// Set controller-native length and rate units.
    pub fn motor_units(mut self, length: LengthUnit, time: TimeUnit) -> Self {
        self.config.motor_length_unit = length;
        self.config.motor_rate_unit = RateUnit::new(length, time);
        self
    }

    /// Set the hard limit position and switch polarity in `direction`.
    pub fn hard_limit(
        mut self,
        direction: Direction,
        position: Option<Length>,
        polarity: LimitSwitchPolarity,
    ) -> Self {
        match direction {
            Direction::Forward => {
                self.config.forward_hard_limit = position;
                self.config.forward_polarity = Some(polarity);
            }
            Direction::Reverse => {
                self.config.reverse_hard_limit = position;
                self.config.reverse_polarity = Some(polarity);
            }
            Direction::Neutral => {}
        }
        self
    }

    /// Set the soft limit in `direction`.
    pub fn soft_limit(mut self, direction: Direction, position: Length) -> Self {
        match direction {
            Direction::Forward => self.config.soft_limits.forward = Some(position),
            Direction::Reverse => self.config.soft_limits.reverse = Some(position),
            Direction::Neutral => {}
        }
        self
    }

    /// Set the auto-zero tolerance.
    pub fn auto_zero_tolerance(mut self, tolerance: Length) -> Self {
        self.config.auto_zero_tolerance = Some(tolerance);
        self
    }

    /// Set the default rate.
    pub fn default_rate(mut self, rate: Rate) -> Self {
        self.config.default_rate = Some(rate);
        self
    }

    /// Set the sensor-to-drive multiplier.
    pub fn sensor_to_drive_scale(mut self, scale: f64) -> Self {
        self.config.sensor_to_drive_scale = Some(scale);
        self
    }

    /// Set motor and sensor phase inversion.
    pub fn phase(mut self, motor_reversed: bool, sensor_reversed: bool) -> Self {
        self.config.motor_phase_reversed = motor_reversed;
        self.config.sensor_phase_reversed = sensor_reversed;
        self
    }

    /// Set neutral output behavior.
    pub fn neutral_behavior(mut self, behavior: NeutralBehavior) -> Self {
        self.config.neutral_behavior = Some(behavior);
        self
    }

    /// Set the default command.
    pub fn default_command(mut self, command: DefaultCommand) -> Self {
        self.config.default_command = command;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first inconsistency found.
    pub fn build(self) -> Result<AxisConfig> {
        if let Some(e) = self.name_error {
            return Err(e);
        }
        let mut config = self.config;
        let display = config.display_length_unit;
        let display_rate = config.display_rate_unit;
        config.forward_hard_limit = config.forward_hard_limit.map(|l| l.convert_to(display));
        config.reverse_hard_limit = config.reverse_hard_limit.map(|l| l.convert_to(display));
        config.soft_limits.forward = config.soft_limits.forward.map(|l| l.convert_to(display));
        config.soft_limits.reverse = config.soft_limits.reverse.map(|l| l.convert_to(display));
        config.auto_zero_tolerance = config.auto_zero_tolerance.map(|l| l.convert_to(display));
        config.default_rate = config.default_rate.map(|r| r.convert_to(display_rate));
        validate_axis(&config)?;
        Ok(config)
    }
}

/// TOML shape of an axis; lengths are plain numbers in display units.
#[derive(Debug, Clone, Deserialize)]
struct RawAxisConfig {
    name: String<MAX_NAME_LEN>,
    #[serde(default)]
    capabilities: Capabilities,
    #[serde(default)]
    display_length_unit: LengthUnit,
    #[serde(default)]
    sensor_length_unit: Option<LengthUnit>,
    #[serde(default)]
    motor_length_unit: Option<LengthUnit>,
    #[serde(default)]
    display_rate_unit: Option<RateUnit>,
    #[serde(default)]
    sensor_rate_unit: Option<RateUnit>,
    #[serde(default)]
    motor_rate_unit: Option<RateUnit>,
    #[serde(default)]
    forward_hard_limit: Option<f64>,
    #[serde(default)]
    reverse_hard_limit: Option<f64>,
    #[serde(default)]
    forward_soft_limit: Option<f64>,
    #[serde(default)]
    reverse_soft_limit: Option<f64>,
    #[serde(default)]
    forward_limit_switch_polarity: Option<LimitSwitchPolarity>,
    #[serde(default)]
    reverse_limit_switch_polarity: Option<LimitSwitchPolarity>,
    #[serde(default)]
    auto_zero_tolerance: Option<f64>,
    #[serde(default)]
    default_rate: Option<f64>,
    #[serde(default)]
    sensor_to_drive_scale: Option<f64>,
    #[serde(default)]
    motor_phase_reversed: bool,
    #[serde(default)]
    sensor_phase_reversed: bool,
    #[serde(default)]
    neutral_behavior: Option<NeutralBehavior>,
    #[serde(default)]
    default_command: DefaultCommand,
}

impl TryFrom<RawAxisConfig> for AxisConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAxisConfig) -> core::result::Result<Self, Self::Error> {
        let display = raw.display_length_unit;
        let display_rate = raw
            .display_rate_unit
            .unwrap_or(RateUnit::new(display, TimeUnit::Seconds));
        let sensor = raw.sensor_length_unit.unwrap_or(display);
        let motor = raw.motor_length_unit.unwrap_or(sensor);
        let length = |v: f64| Length::new(v, display);

        let config = AxisConfig {
            name: raw.name,
            capabilities: raw.capabilities,
            display_length_unit: display,
            sensor_length_unit: sensor,
            motor_length_unit: motor,
            display_rate_unit: display_rate,
            sensor_rate_unit: raw
                .sensor_rate_unit
                .unwrap_or(RateUnit::new(sensor, display_rate.time)),
            motor_rate_unit: raw
                .motor_rate_unit
                .unwrap_or(RateUnit::new(motor, display_rate.time)),
            forward_hard_limit: raw.forward_hard_limit.map(length),
            reverse_hard_limit: raw.reverse_hard_limit.map(length),
            soft_limits: SoftLimits::new(
                raw.reverse_soft_limit.map(length),
                raw.forward_soft_limit.map(length),
            ),
            forward_polarity: raw.forward_limit_switch_polarity,
            reverse_polarity: raw.reverse_limit_switch_polarity,
            auto_zero_tolerance: raw.auto_zero_tolerance.map(length),
            default_rate: raw.default_rate.map(|v| Rate::new(v, display_rate)),
            sensor_to_drive_scale: raw.sensor_to_drive_scale,
            motor_phase_reversed: raw.motor_phase_reversed,
            sensor_phase_reversed: raw.sensor_phase_reversed,
            neutral_behavior: raw.neutral_behavior,
            default_command: raw.default_command,
        };

        match validate_axis(&config) {
            Ok(()) => Ok(config),
            Err(Error::Config(e)) => Err(e),
            Err(Error::Motor(_)) => Err(ConfigError::UnsupportedCapability(config.capabilities)),
        }
    }
}

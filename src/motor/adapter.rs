//! Unit-conversion adapter between display units and a backend.
//!
//! Conversion order, display to native:
//! 1. unit conversion into the sensor (positions) or motor (rates) unit,
//! 2. multiplication by the sensor-to-drive scale,
//! 3. phase negation.
//!
//! Native to display runs the inverse steps in reverse order. The phase
//! applied in software is the motor phase when the backend cannot invert its
//! output natively, composed with the sensor phase when it cannot invert its
//! sensor natively. Limit switches are named by physical end and are never
//! phase-corrected.

use crate::backend::{ControllerBackend, ControllerState, NativeSettings};
use crate::config::units::{Length, LengthUnit, Rate, RateUnit};
use crate::config::{AxisConfig, Capabilities};
use crate::error::Result;
use crate::motion::{Direction, Phase};

/// Wraps a backend so callers only ever see display units.
pub struct UnitAdapter<B: ControllerBackend> {
    backend: B,
    display_length: LengthUnit,
    display_rate: RateUnit,
    sensor_length: LengthUnit,
    sensor_rate: RateUnit,
    motor_rate: RateUnit,
    scale: f64,
    phase: Phase,
}

impl<B: ControllerBackend> UnitAdapter<B> {
    /// Build the adapter for `config` over `backend`.
    pub fn new(config: &AxisConfig, backend: B) -> Self {
        let motor_phase = if backend.supports_motor_inversion() {
            Phase::Normal
        } else {
            config.motor_phase()
        };
        let sensor_phase = if backend.supports_sensor_inversion() {
            Phase::Normal
        } else {
            config.sensor_phase()
        };
        Self {
            display_length: config.display_length_unit(),
            display_rate: config.display_rate_unit(),
            sensor_length: config.sensor_length_unit(),
            sensor_rate: config.sensor_rate_unit(),
            motor_rate: config.motor_rate_unit(),
            scale: config.effective_scale(),
            phase: motor_phase.then(sensor_phase),
            backend,
        }
    }

    /// Settings the backend needs before its first command.
    pub fn native_settings(&self, config: &AxisConfig) -> NativeSettings {
        NativeSettings {
            sensor_length_unit: self.sensor_length,
            sensor_rate_unit: self.sensor_rate,
            motor_rate_unit: self.motor_rate,
            invert_motor: self.backend.supports_motor_inversion()
                && config.motor_phase().is_reversed(),
            invert_sensor: self.backend.supports_sensor_inversion()
                && config.sensor_phase().is_reversed(),
            neutral_behavior: config.neutral_behavior().ok(),
            forward_polarity: config.limit_switch_polarity(Direction::Forward).ok(),
            reverse_polarity: config.limit_switch_polarity(Direction::Reverse).ok(),
            limit_switch_source: config.limit_switch_source().ok(),
        }
    }

    /// Phase applied in software.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The wrapped backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The wrapped backend, mutably.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Capabilities of the wrapped backend.
    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    /// Display position to native sensor position.
    pub fn to_native_position(&self, position: Length) -> Length {
        let native = position.convert_to(self.sensor_length).scale(self.scale);
        self.phase.length(native)
    }

    /// Native sensor position to display position.
    pub fn to_display_position(&self, position: Length) -> Length {
        self.phase
            .length(position)
            .scale(1.0 / self.scale)
            .convert_to(self.display_length)
    }

    /// Display distance magnitude to native distance magnitude.
    pub fn to_native_distance(&self, distance: Length) -> Length {
        distance.convert_to(self.sensor_length).scale(self.scale)
    }

    /// Display rate magnitude to native motor rate magnitude.
    pub fn to_native_rate(&self, rate: Rate) -> Rate {
        rate.convert_to(self.motor_rate).scale(self.scale)
    }

    /// Native sensor rate (signed) to display rate (signed).
    pub fn to_display_rate(&self, rate: Rate) -> Rate {
        self.phase
            .rate(rate)
            .scale(1.0 / self.scale)
            .convert_to(self.display_rate)
    }

    /// Logical direction to native direction.
    #[inline]
    pub fn to_native_direction(&self, direction: Direction) -> Direction {
        self.phase.direction(direction)
    }

    /// Push native settings to the backend.
    pub fn configure(&mut self, settings: &NativeSettings) -> Result<()> {
        self.backend.configure(settings)
    }

    /// Turn the output off.
    pub fn disable(&mut self) -> Result<()> {
        self.backend.disable()
    }

    /// Hold the current position.
    pub fn hold_current_position(&mut self) -> Result<()> {
        self.backend.hold_current_position()
    }

    /// Drive in `direction` at the display rate magnitude `rate`.
    pub fn move_in_direction_at_rate(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        let native = self.to_native_rate(rate);
        let direction = self.to_native_direction(direction);
        self.backend.move_in_direction_at_rate(direction, native)
    }

    /// Drive to a display position.
    pub fn move_to_absolute_position(&mut self, position: Length) -> Result<()> {
        let native = self.to_native_position(position);
        self.backend.move_to_absolute_position(native)
    }

    /// Drive the display distance magnitude `distance` in `direction`.
    pub fn move_to_relative_position(&mut self, direction: Direction, distance: Length) -> Result<()> {
        let native = self.to_native_distance(distance);
        let direction = self.to_native_direction(direction);
        self.backend.move_to_relative_position(direction, native)
    }

    /// Overwrite the sensor so that it reads the display position `position`.
    pub fn reset_sensor_position(&mut self, position: Length) -> Result<()> {
        let native = self.to_native_position(position);
        self.backend.reset_sensor_position(native)
    }

    /// Live position in display units.
    pub fn current_position(&mut self) -> Result<Length> {
        let native = self.backend.current_position()?;
        Ok(self.to_display_position(native))
    }

    /// Live signed rate in display units.
    pub fn current_rate(&mut self) -> Result<Rate> {
        let native = self.backend.current_rate()?;
        Ok(self.to_display_rate(native))
    }

    /// Whether the hard limit switch at the `direction` end is pressed.
    pub fn limit_switch_active(&mut self, direction: Direction) -> Result<bool> {
        self.backend.limit_switch_active(direction)
    }

    /// Seek the limit in `direction` at the display rate magnitude `rate`.
    pub fn calibrate_sensor_in_direction(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        let native = self.to_native_rate(rate);
        let direction = self.to_native_direction(direction);
        self.backend.calibrate_sensor_in_direction(direction, native)
    }

    /// What the hardware is doing.
    #[inline]
    pub fn controller_state(&self) -> ControllerState {
        self.backend.state()
    }

    /// Per-cycle backend work.
    pub fn periodic(&mut self) -> Result<()> {
        self.backend.periodic()
    }
}

//! Motor state machine.
//!
//! Every requested operation runs through one transition function:
//!
//! 1. An unavailable axis (disconnected, or with a failed encoder) is forced
//!    to `Disabled` and the request is rejected.
//! 2. The axis must declare the capabilities the target state needs.
//! 3. Parameters must be legal (non-negative magnitudes, a real direction,
//!    absolute targets inside soft limits).
//! 4. A request identical to the current state is a successful no-op,
//!    except `Disabled`, which is always forwarded.
//! 5. The operation is forwarded through the adapter; a backend failure
//!    leaves the state unchanged.
//! 6. The current state becomes the previous one and the request becomes
//!    current.
//!
//! Entering or re-affirming `HoldingCurrentPosition` first auto-zeroes the
//! sensor against any active hard limit switch that resets it.

use core::mem;

use tracing::{debug, info, warn};

use super::adapter::UnitAdapter;
use super::diagnostics::{DiagnosticsString, Snapshot, Transition};
use super::state::TargetState;
use crate::backend::{ControllerBackend, ControllerState};
use crate::config::units::{Length, Rate};
use crate::config::{AxisConfig, Capabilities};
use crate::error::{ConfigError, Error, MotorError, Result};
use crate::motion::Direction;

fn signed(direction: Direction, rate: Rate) -> Rate {
    match direction {
        Direction::Reverse => -rate,
        Direction::Forward | Direction::Neutral => rate,
    }
}

/// Targets a transition resolves to, for the completion predicates.
#[derive(Debug, Clone, Copy, Default)]
struct Resolved {
    position: Option<Length>,
    rate: Option<Rate>,
}

/// One actuator axis: configuration, adapter and target-state machine.
pub struct Motor<B: ControllerBackend> {
    config: AxisConfig,
    adapter: UnitAdapter<B>,
    current: TargetState,
    previous: TargetState,
    last_transition: Option<Transition>,
    encoder_functional: bool,
    targets: Resolved,
}

impl<B: ControllerBackend> Motor<B> {
    /// Create a motor in the `Disabled` state.
    ///
    /// Native settings are pushed to the backend unless the axis is marked
    /// disconnected, in which case the backend is never touched.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedCapability` if the backend family
    /// cannot satisfy a declared capability, or the backend's configuration
    /// error.
    pub fn new(config: AxisConfig, backend: B) -> Result<Self> {
        let adapter = UnitAdapter::new(&config, backend);
        let needed = config.capabilities().difference(Capabilities::DISCONNECTED);
        let missing = adapter.capabilities().missing(needed);
        if !missing.is_empty() {
            return Err(Error::Config(ConfigError::UnsupportedCapability(missing)));
        }

        let mut motor = Self {
            config,
            adapter,
            current: TargetState::Disabled,
            previous: TargetState::Disabled,
            last_transition: None,
            encoder_functional: true,
            targets: Resolved::default(),
        };

        if motor.config.is_disconnected() {
            warn!(axis = motor.name(), "axis marked disconnected; held in Disabled");
        } else {
            let settings = motor.adapter.native_settings(&motor.config);
            motor.adapter.configure(&settings)?;
            info!(
                axis = motor.name(),
                backend = motor.adapter.backend().kind().name(),
                "motor ready"
            );
        }
        Ok(motor)
    }

    /// Axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Axis configuration.
    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Current target state.
    #[inline]
    pub fn state(&self) -> TargetState {
        self.current
    }

    /// Previous target state.
    #[inline]
    pub fn previous_state(&self) -> TargetState {
        self.previous
    }

    /// Most recent accepted or forced transition.
    #[inline]
    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    /// What the hardware is doing.
    #[inline]
    pub fn controller_state(&self) -> ControllerState {
        self.adapter.controller_state()
    }

    /// The wrapped backend.
    #[inline]
    pub fn backend(&self) -> &B {
        self.adapter.backend()
    }

    /// The wrapped backend, mutably.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        self.adapter.backend_mut()
    }

    /// Position the current target resolves to, in display units.
    #[inline]
    pub fn position_target(&self) -> Option<Length> {
        self.targets.position
    }

    /// Signed rate the current target resolves to, in display units.
    #[inline]
    pub fn rate_target(&self) -> Option<Rate> {
        self.targets.rate
    }

    /// Whether the position sensor is trusted.
    #[inline]
    pub fn is_encoder_functional(&self) -> bool {
        self.encoder_functional
    }

    /// Whether the axis accepts requests: connected, with a working sensor.
    pub fn is_available(&self) -> bool {
        self.unavailable().is_none()
    }

    /// Flag the position sensor as working or failed.
    ///
    /// A failed sensor forces the motor to `Disabled` and rejects every
    /// further request until the flag is cleared.
    pub fn set_encoder_functional(&mut self, functional: bool) {
        self.encoder_functional = functional;
        if !functional {
            self.force_disabled(MotorError::EncoderFault);
        }
    }

    /// Turn the output off. Always forwarded, even when already disabled.
    pub fn disable(&mut self) -> Result<()> {
        self.request(TargetState::Disabled)
    }

    /// Hold the current position, auto-zeroing first.
    pub fn hold_current_position(&mut self) -> Result<()> {
        self.request(TargetState::HoldingCurrentPosition)
    }

    /// Drive in `direction` at the non-negative `rate`.
    pub fn move_in_direction_at_rate(&mut self, direction: Direction, rate: Rate) -> Result<()> {
        self.request(TargetState::MovingInDirectionAtRate { direction, rate })
    }

    /// Drive to an absolute position.
    pub fn move_to_absolute_position(&mut self, position: Length) -> Result<()> {
        self.request(TargetState::MovingToAbsolutePosition { position })
    }

    /// Drive the non-negative `distance` in `direction`.
    pub fn move_to_relative_position(&mut self, direction: Direction, distance: Length) -> Result<()> {
        self.request(TargetState::MovingToRelativePosition { direction, distance })
    }

    /// Seek the hard limit switch in `direction` at the default rate.
    ///
    /// [`Motor::periodic`] finishes the calibration once the switch trips.
    pub fn calibrate_sensor_in_direction(&mut self, direction: Direction) -> Result<()> {
        self.request(TargetState::CalibratingSensorInDirection { direction })
    }

    /// Run one requested transition.
    pub fn request(&mut self, requested: TargetState) -> Result<()> {
        let requested = self.in_display_units(requested);

        if let Some(reason) = self.unavailable() {
            self.force_disabled(reason.clone());
            if requested == TargetState::Disabled {
                return Ok(());
            }
            return Err(self.reject(&requested, reason));
        }

        let missing = self
            .config
            .capabilities()
            .missing(requested.required_capabilities());
        if !missing.is_empty() {
            let error = MotorError::UnsupportedOperation {
                operation: requested.operation(),
                missing,
            };
            return Err(self.reject(&requested, error));
        }

        if let Err(error) = self.check_parameters(&requested) {
            return Err(self.reject(&requested, error));
        }

        if requested == self.current && requested != TargetState::Disabled {
            if requested == TargetState::HoldingCurrentPosition {
                if let Err(error) = self.auto_zero() {
                    return Err(self.reject(&requested, error));
                }
            }
            debug!(axis = self.name(), state = %requested, "redundant request ignored");
            return Ok(());
        }

        if requested == TargetState::HoldingCurrentPosition {
            if let Err(error) = self.auto_zero() {
                return Err(self.reject(&requested, error));
            }
        }

        let resolved = match self.resolve(&requested) {
            Ok(resolved) => resolved,
            Err(error) => return Err(self.reject(&requested, error)),
        };

        if let Err(error) = self.apply(&requested) {
            return Err(self.reject(&requested, error));
        }

        self.targets = resolved;
        self.install(requested);
        info!(
            axis = self.name(),
            previous = %self.previous,
            current = %self.current,
            "transition accepted"
        );
        Ok(())
    }

    /// Overwrite the sensor so it reads `position`.
    pub fn reset_sensor_position(&mut self, position: Length) -> Result<()> {
        self.ensure_readable("reset_sensor_position", Capabilities::READ_POSITION)?;
        let position = position.convert_to(self.config.display_length_unit());
        self.adapter.reset_sensor_position(position)?;
        info!(axis = self.name(), position = %position, "sensor position reset");
        Ok(())
    }

    /// Live position in display units.
    pub fn current_position(&mut self) -> Result<Length> {
        self.ensure_readable("current_position", Capabilities::READ_POSITION)?;
        self.adapter.current_position()
    }

    /// Live signed rate in display units.
    pub fn current_rate(&mut self) -> Result<Rate> {
        self.ensure_readable("current_rate", Capabilities::READ_RATE)?;
        self.adapter.current_rate()
    }

    /// Live direction of travel.
    pub fn current_direction(&mut self) -> Result<Direction> {
        self.ensure_readable("current_direction", Capabilities::READ_DIRECTION)?;
        let rate = self.adapter.current_rate()?;
        Ok(Direction::from_sign(rate.canonical()))
    }

    /// Whether the hard limit switch at the `direction` end is pressed.
    pub fn hard_limit_switch_active(&mut self, direction: Direction) -> Result<bool> {
        if direction.is_neutral() {
            return Err(MotorError::InvalidArgument("neutral direction for a limit switch").into());
        }
        self.ensure_readable(
            "hard_limit_switch_active",
            Capabilities::hard_limit_switch(direction),
        )?;
        self.adapter.limit_switch_active(direction)
    }

    /// True if the live position is within `tolerance` of the resolved target.
    ///
    /// Returns `false` while no position target is active.
    pub fn position_error_within(&mut self, tolerance: Length) -> Result<bool> {
        let position = self.current_position()?;
        Ok(self
            .targets
            .position
            .map_or(false, |target| position.approx_eq(target, tolerance)))
    }

    /// True if the live rate is within `tolerance` of the resolved target rate.
    ///
    /// Returns `false` while no rate target is active.
    pub fn rate_error_within(&mut self, tolerance: Rate) -> Result<bool> {
        let rate = self.current_rate()?;
        Ok(self
            .targets
            .rate
            .map_or(false, |target| rate.approx_eq(target, tolerance)))
    }

    /// Per-cycle tick.
    ///
    /// Runs the backend's own loop, stops directional moves that reach a hard
    /// or soft limit and finishes calibration once its limit switch trips.
    pub fn periodic(&mut self) -> Result<()> {
        if self.unavailable().is_some() {
            return Ok(());
        }
        self.adapter.periodic()?;

        match self.current {
            TargetState::MovingInDirectionAtRate { direction, .. } => {
                if self.travel_blocked(direction)? {
                    info!(axis = self.name(), direction = %direction, "limit reached; holding");
                    self.request(TargetState::HoldingCurrentPosition)?;
                }
            }
            TargetState::CalibratingSensorInDirection { direction } => {
                if self.adapter.limit_switch_active(direction)? {
                    info!(axis = self.name(), direction = %direction, "calibration limit reached");
                    self.request(TargetState::HoldingCurrentPosition)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Human-readable summary of target state, live position and limits.
    pub fn diagnostics(&mut self) -> DiagnosticsString {
        let readable = self.unavailable().is_none();
        let read = |motor: &Self, caps: Capabilities| readable && motor.config.has_all(caps);

        let position = if read(self, Capabilities::READ_POSITION) {
            self.adapter.current_position().ok()
        } else {
            None
        };
        let rate = if read(self, Capabilities::READ_RATE) {
            self.adapter.current_rate().ok()
        } else {
            None
        };
        let forward_limit = if read(self, Capabilities::FORWARD_HARD_LIMIT_SWITCH) {
            self.adapter.limit_switch_active(Direction::Forward).ok()
        } else {
            None
        };
        let reverse_limit = if read(self, Capabilities::REVERSE_HARD_LIMIT_SWITCH) {
            self.adapter.limit_switch_active(Direction::Reverse).ok()
        } else {
            None
        };

        Snapshot {
            axis: self.name(),
            current: self.current,
            previous: self.previous,
            controller: self.adapter.controller_state(),
            position,
            rate,
            forward_limit,
            reverse_limit,
        }
        .render()
    }

    /// Write [`Motor::diagnostics`] to the log.
    pub fn dump_diagnostics(&mut self) {
        let line = self.diagnostics();
        info!(axis = self.name(), "{}", line.as_str());
    }

    fn unavailable(&self) -> Option<MotorError> {
        if self.config.is_disconnected() {
            Some(MotorError::Disconnected)
        } else if !self.encoder_functional {
            Some(MotorError::EncoderFault)
        } else {
            None
        }
    }

    fn ensure_readable(&self, operation: &'static str, caps: Capabilities) -> Result<()> {
        if let Some(reason) = self.unavailable() {
            return Err(reason.into());
        }
        let missing = self.config.capabilities().missing(caps);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MotorError::UnsupportedOperation { operation, missing }.into())
        }
    }

    fn in_display_units(&self, state: TargetState) -> TargetState {
        let length = self.config.display_length_unit();
        let rate = self.config.display_rate_unit();
        match state {
            TargetState::MovingInDirectionAtRate { direction, rate: r } => {
                TargetState::MovingInDirectionAtRate {
                    direction,
                    rate: r.convert_to(rate),
                }
            }
            TargetState::MovingToAbsolutePosition { position } => {
                TargetState::MovingToAbsolutePosition {
                    position: position.convert_to(length),
                }
            }
            TargetState::MovingToRelativePosition { direction, distance } => {
                TargetState::MovingToRelativePosition {
                    direction,
                    distance: distance.convert_to(length),
                }
            }
            other => other,
        }
    }

    fn check_parameters(&self, requested: &TargetState) -> core::result::Result<(), MotorError> {
        requested.validate()?;
        if let TargetState::MovingToAbsolutePosition { position } = requested {
            if !self.config.soft_limits().contains(*position) {
                return Err(MotorError::InvalidArgument("target outside soft limits"));
            }
        }
        Ok(())
    }

    fn resolve(&mut self, requested: &TargetState) -> Result<Resolved> {
        let zero = Rate::zero(self.config.display_rate_unit());
        Ok(match *requested {
            TargetState::Disabled => Resolved::default(),
            TargetState::HoldingCurrentPosition => Resolved {
                position: if self.config.has_all(Capabilities::READ_POSITION) {
                    Some(self.adapter.current_position()?)
                } else {
                    None
                },
                rate: Some(zero),
            },
            TargetState::MovingInDirectionAtRate { direction, rate } => Resolved {
                position: None,
                rate: Some(signed(direction, rate)),
            },
            TargetState::MovingToAbsolutePosition { position } => Resolved {
                position: Some(position),
                rate: Some(zero),
            },
            TargetState::MovingToRelativePosition { direction, distance } => {
                let start = self.adapter.current_position()?;
                let target = match direction {
                    Direction::Reverse => start.checked_sub(distance),
                    Direction::Forward | Direction::Neutral => start.checked_add(distance),
                }
                .ok_or(MotorError::InvalidArgument("relative target out of range"))?;
                if !self.config.soft_limits().contains(target) {
                    return Err(MotorError::InvalidArgument("target outside soft limits").into());
                }
                Resolved {
                    position: Some(target),
                    rate: Some(zero),
                }
            }
            TargetState::CalibratingSensorInDirection { direction } => Resolved {
                position: None,
                rate: Some(signed(direction, self.config.default_rate()?)),
            },
        })
    }

    fn apply(&mut self, requested: &TargetState) -> Result<()> {
        match *requested {
            TargetState::Disabled => self.adapter.disable(),
            TargetState::HoldingCurrentPosition => self.adapter.hold_current_position(),
            TargetState::MovingInDirectionAtRate { direction, rate } => {
                self.adapter.move_in_direction_at_rate(direction, rate)
            }
            TargetState::MovingToAbsolutePosition { position } => {
                self.adapter.move_to_absolute_position(position)
            }
            TargetState::MovingToRelativePosition { direction, distance } => {
                self.adapter.move_to_relative_position(direction, distance)
            }
            TargetState::CalibratingSensorInDirection { direction } => {
                let rate = self.config.default_rate()?;
                self.adapter.calibrate_sensor_in_direction(direction, rate)
            }
        }
    }

    fn install(&mut self, next: TargetState) {
        let previous = mem::replace(&mut self.current, next);
        self.previous = previous;
        self.last_transition = Some(Transition {
            previous,
            current: next,
        });
    }

    fn reject(&self, requested: &TargetState, error: impl Into<Error>) -> Error {
        let error = error.into();
        warn!(
            axis = self.name(),
            current = %self.current,
            requested = %requested,
            error = %error,
            "request rejected"
        );
        error
    }

    /// Move to `Disabled` without a transition request.
    ///
    /// A disconnected axis is never touched; an axis with a failed encoder
    /// still has its output turned off.
    fn force_disabled(&mut self, reason: MotorError) {
        if self.current == TargetState::Disabled {
            return;
        }
        if reason == MotorError::EncoderFault {
            if let Err(error) = self.adapter.disable() {
                warn!(axis = self.name(), error = %error, "failed to disable output");
            }
        }
        self.targets = Resolved::default();
        self.install(TargetState::Disabled);
        warn!(
            axis = self.name(),
            previous = %self.previous,
            reason = %reason,
            "forced to Disabled"
        );
    }

    /// Re-zero the sensor against an active, sensor-resetting hard limit.
    ///
    /// Returns `true` if the sensor was corrected.
    fn auto_zero(&mut self) -> Result<bool> {
        for direction in Direction::TRAVEL {
            if !self.config.hard_limit_resets_sensor(direction) {
                continue;
            }
            if !self.adapter.limit_switch_active(direction)? {
                continue;
            }
            let limit = self.config.hard_limit(direction)?;
            let tolerance = self.config.auto_zero_tolerance()?;
            let position = self.adapter.current_position()?;
            if position.approx_eq(limit, tolerance) {
                debug!(axis = self.name(), direction = %direction, "sensor already at limit");
                return Ok(false);
            }
            self.adapter.reset_sensor_position(limit)?;
            info!(
                axis = self.name(),
                direction = %direction,
                from = %position,
                to = %limit,
                "sensor re-zeroed at hard limit"
            );
            return Ok(true);
        }
        Ok(false)
    }

    fn travel_blocked(&mut self, direction: Direction) -> Result<bool> {
        if self.config.has_all(Capabilities::hard_limit_switch(direction))
            && self.adapter.limit_switch_active(direction)?
        {
            return Ok(true);
        }
        if self.config.has_all(Capabilities::soft_limit_switch(direction)) {
            let position = self.adapter.current_position()?;
            return Ok(self.config.soft_limits().blocks(direction, position));
        }
        Ok(false)
    }
}

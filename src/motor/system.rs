//! Robot facade for multi-axis configuration.
//!
//! Provides a high-level API for building motors from a single configuration.

use heapless::{FnvIndexSet, String};
use tracing::info;

use crate::backend::ControllerBackend;
use crate::config::{axis_name, AxisConfig, RobotConfig, MAX_AXES, MAX_NAME_LEN};
use crate::error::{ConfigError, Error, Result};

use super::builder::MotorBuilder;
use super::driver::Motor;

/// A facade for building motors from a robot configuration.
///
/// Motors are generic over their backend, so the caller owns them; the
/// facade only tracks which axes have been brought up.
///
/// # Example
///
/// ```rust,ignore
/// use axis_control::{MotorSystem, SmartBackend};
///
/// let config = axis_control::load_config("robot.toml")?;
/// let mut system = MotorSystem::from_config(config);
///
/// let mut elevator = system.register_motor("elevator", SmartBackend::new(talon))?;
/// elevator.hold_current_position()?;
/// ```
pub struct MotorSystem {
    config: RobotConfig,
    registered: FnvIndexSet<String<MAX_NAME_LEN>, MAX_AXES>,
}

impl MotorSystem {
    /// Create a new system from configuration. No motors are built.
    pub fn from_config(config: RobotConfig) -> Self {
        Self {
            config,
            registered: FnvIndexSet::new(),
        }
    }

    /// Get the robot configuration.
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Get an axis configuration by name.
    pub fn axis_config(&self, name: &str) -> Option<&AxisConfig> {
        self.config.axis(name)
    }

    /// Check if an axis name exists in the configuration.
    pub fn has_axis(&self, name: &str) -> bool {
        self.config.axis(name).is_some()
    }

    /// List all configured axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.config.axis_names()
    }

    /// Build a motor for `name` and mark the axis as registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis doesn't exist, is already registered, or
    /// the backend cannot drive it.
    pub fn register_motor<B: ControllerBackend>(&mut self, name: &str, backend: B) -> Result<Motor<B>> {
        let key = axis_name(name)?;
        if self.registered.contains(&key) {
            return Err(Error::Config(ConfigError::UnexpectedParameter(
                "axis registered twice",
            )));
        }
        let motor = self.build_motor(name, backend)?;
        self.registered
            .insert(key)
            .map_err(|_| Error::Config(ConfigError::TooManyAxes(MAX_AXES)))?;
        info!(axis = name, registered = self.registered.len(), "axis registered");
        Ok(motor)
    }

    /// Build a motor from configuration without registering it.
    pub fn build_motor<B: ControllerBackend>(&self, name: &str, backend: B) -> Result<Motor<B>> {
        MotorBuilder::new()
            .from_config(&self.config, name)?
            .backend(backend)
            .build()
    }

    /// Check if an axis has been registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.iter().any(|k| k.as_str() == name)
    }

    /// Get the number of registered axes.
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }
}

//! Builder pattern for Motor.

use crate::backend::ControllerBackend;
use crate::config::{AxisConfig, RobotConfig};
use crate::error::{ConfigError, Error, Result};

use super::driver::Motor;

/// Builder for creating [`Motor`] instances.
pub struct MotorBuilder<B: ControllerBackend> {
    config: Option<AxisConfig>,
    backend: Option<B>,
}

impl<B: ControllerBackend> Default for MotorBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ControllerBackend> MotorBuilder<B> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            backend: None,
        }
    }

    /// Set the axis configuration.
    pub fn config(mut self, config: AxisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the controller backend.
    pub fn backend(mut self, backend: B) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Take the axis configuration from a robot configuration by name.
    pub fn from_config(self, robot: &RobotConfig, axis_name: &str) -> Result<Self> {
        let axis = robot.require_axis(axis_name)?;
        Ok(self.config(axis.clone()))
    }

    /// Build the Motor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or backend is missing, or if
    /// the backend cannot satisfy the axis.
    pub fn build(self) -> Result<Motor<B>> {
        let config = self
            .config
            .ok_or(Error::Config(ConfigError::MissingParameter("config")))?;
        let backend = self
            .backend
            .ok_or(Error::Config(ConfigError::MissingParameter("backend")))?;
        Motor::new(config, backend)
    }
}

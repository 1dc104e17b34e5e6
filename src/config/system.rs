//! Robot configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::axis::{axis_name, AxisConfig, MAX_NAME_LEN};
use crate::error::{ConfigError, Error, Result};

/// Maximum number of axes in one robot.
pub const MAX_AXES: usize = 16;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    /// Named axis configurations, each validated on deserialization.
    pub axes: FnvIndexMap<String<MAX_NAME_LEN>, AxisConfig, MAX_AXES>,
}

impl RobotConfig {
    /// Get an axis configuration by name.
    pub fn axis(&self, name: &str) -> Option<&AxisConfig> {
        self.axes
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get an axis configuration by name, or `AxisNotFound`.
    ///
    /// A name too long to be configured reports `NameTooLong`.
    pub fn require_axis(&self, name: &str) -> Result<&AxisConfig> {
        let key = axis_name(name)?;
        self.axis(name)
            .ok_or(Error::Config(ConfigError::AxisNotFound(key)))
    }

    /// Register an axis under its own name.
    pub fn insert(&mut self, axis: AxisConfig) -> Result<()> {
        let key = axis.name.clone();
        self.axes
            .insert(key, axis)
            .map_err(|_| Error::Config(ConfigError::TooManyAxes(MAX_AXES)))?;
        Ok(())
    }

    /// List all axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(|s| s.as_str())
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            axes: FnvIndexMap::new(),
        }
    }
}

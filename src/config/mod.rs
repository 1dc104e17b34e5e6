//! Configuration module for axis-control.
//!
//! Provides the capability model, unit-tagged quantities and per-axis
//! configuration, built in code or loaded from TOML files (with `std`).

mod axis;
mod capability;
mod limits;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{
    axis_name, AxisConfig, AxisConfigBuilder, DefaultCommand, NeutralBehavior,
    DEFAULT_AUTO_ZERO_TOLERANCE, MAX_NAME_LEN,
};
pub use capability::{Capabilities, Prerequisite, MUTUALLY_EXCLUSIVE, PREREQUISITES};
pub use limits::{LimitSwitchPolarity, LimitSwitchSource, SoftLimits};
pub use system::{RobotConfig, MAX_AXES};
pub use validation::{validate_axis, validate_config};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Length, LengthUnit, Rate, RateUnit, TimeUnit, UnitExt};

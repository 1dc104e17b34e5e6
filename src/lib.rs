//! # axis-control
//!
//! Capability-checked actuator control with unit-correct conversions over
//! heterogeneous motor-controller backends.
//!
//! ## Features
//!
//! - **Capability-driven**: Each axis declares what it can do; the declaration
//!   is validated once and every request is checked against it
//! - **Typed units**: Lengths and rates carry their unit; display, sensor and
//!   motor frames are converted explicitly, including gearing and phase
//! - **Guarded state machine**: One transition function with idempotence,
//!   soft limits and auto-zeroing at hard limit switches
//! - **Backends**: Smart closed-loop controllers, percent-output controllers
//!   and percent output paired with a quadrature encoder
//! - **embedded-hal 1.0**: `SetDutyCycle` for PWM motors, `InputPin` for switches
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axis_control::{Direction, MotorSystem, SmartBackend, UnitExt};
//!
//! // Load and validate configuration from TOML
//! let config = axis_control::load_config("robot.toml")?;
//! let mut system = MotorSystem::from_config(config);
//!
//! // Bind an axis to its controller
//! let mut elevator = system.register_motor("elevator", SmartBackend::new(talon))?;
//!
//! // Request operations in display units
//! elevator.move_to_absolute_position(24.0.inches())?;
//! elevator.calibrate_sensor_in_direction(Direction::Reverse)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and `std::error::Error`
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;

// Re-exports for ergonomic API
pub use backend::{
    ControllerBackend, ControllerState, EncodedPercentBackend, PercentBackend,
    SimulatedController, SmartBackend,
};
pub use command::{AxisCommand, Command, CommandStatus, Completion, Subsystem};
pub use config::{validate_config, AxisConfig, Capabilities, RobotConfig};
pub use error::{Error, Result};
pub use motion::{Direction, Phase};
pub use motor::{state, Motor, MotorSystem, TargetState};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Length, LengthUnit, Rate, RateUnit, TimeUnit, UnitExt};

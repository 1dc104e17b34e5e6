//! Error types for axis-control.
//!
//! Configuration errors are fatal at startup; motor errors are runtime
//! rejections that leave the motor's target state unchanged.

use core::fmt;

use crate::config::Capabilities;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all axis-control operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor transition or backend error
    Motor(MotorError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// A declared capability is missing one of its prerequisites
    MissingPrerequisite {
        /// Capability that was declared
        capability: Capabilities,
        /// Prerequisite set that is not satisfied
        requires: Capabilities,
    },
    /// Two capabilities that cannot be combined were both declared
    MutuallyExclusive(Capabilities),
    /// A parameter required by the declared capabilities was not supplied
    MissingParameter(&'static str),
    /// A parameter was supplied without the capability that uses it
    UnexpectedParameter(&'static str),
    /// Hard limits are inverted (reverse must be below forward)
    InvalidLimits {
        /// Reverse limit in display units
        reverse: f64,
        /// Forward limit in display units
        forward: f64,
    },
    /// A soft limit lies outside the hard limit on the same side
    SoftLimitOutsideHardLimit {
        /// Soft limit in display units
        soft: f64,
        /// Hard limit in display units
        hard: f64,
    },
    /// Sensor-to-drive scale must be finite and > 0
    InvalidScale(f64),
    /// Default rate must be > 0
    InvalidDefaultRate(f64),
    /// A rate unit does not use the length unit of its frame
    UnitMismatch(&'static str),
    /// Tick unit of a frame is not a finite, positive count per inch
    InvalidUnit {
        /// Frame the unit belongs to
        frame: &'static str,
        /// Configured counts per inch
        per_inch: f64,
    },
    /// Axis name does not fit the fixed-capacity name buffer
    NameTooLong(usize),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// Axis table is full
    TooManyAxes(usize),
    /// Reading a field or building a motor needs capabilities that are absent
    UnsupportedCapability(Capabilities),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Runtime motor errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// A request parameter violates a local invariant
    InvalidArgument(&'static str),
    /// The axis capabilities do not cover the requested operation
    UnsupportedOperation {
        /// Operation that was requested
        operation: &'static str,
        /// Capabilities the operation needs but the axis lacks
        missing: Capabilities,
    },
    /// The backend could not execute the native command
    HardwareRejected(HardwareFault),
    /// Axis is marked disconnected; it is held in Disabled
    Disconnected,
    /// Position sensor flagged non-functional; it is held in Disabled
    EncoderFault,
}

/// Faults reported at the hardware boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareFault {
    /// Device did not answer
    Disconnected,
    /// Device answered too late
    Timeout,
    /// Digital pin read/write failed
    Pin,
    /// PWM output failed
    Pwm,
    /// Bus or device-level rejection
    Bus,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MissingPrerequisite { capability, requires } => {
                write!(f, "Capability {:?} requires {:?}", capability, requires)
            }
            ConfigError::MutuallyExclusive(caps) => {
                write!(f, "Capabilities {:?} are mutually exclusive", caps)
            }
            ConfigError::MissingParameter(name) => write!(f, "Missing parameter '{}'", name),
            ConfigError::UnexpectedParameter(name) => {
                write!(f, "Parameter '{}' supplied without its capability", name)
            }
            ConfigError::InvalidLimits { reverse, forward } => {
                write!(f, "Invalid hard limits: reverse ({}) must be < forward ({})", reverse, forward)
            }
            ConfigError::SoftLimitOutsideHardLimit { soft, hard } => {
                write!(f, "Soft limit {} lies outside hard limit {}", soft, hard)
            }
            ConfigError::InvalidScale(v) => write!(f, "Invalid sensor-to-drive scale: {}. Must be > 0", v),
            ConfigError::InvalidDefaultRate(v) => write!(f, "Invalid default rate: {}. Must be > 0", v),
            ConfigError::UnitMismatch(frame) => {
                write!(f, "Rate unit of the {} frame does not use its length unit", frame)
            }
            ConfigError::InvalidUnit { frame, per_inch } => {
                write!(f, "Invalid {} tick unit: {} per inch. Must be > 0", frame, per_inch)
            }
            ConfigError::NameTooLong(len) => {
                write!(f, "Axis name is {} bytes (max {})", len, crate::config::MAX_NAME_LEN)
            }
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            ConfigError::TooManyAxes(max) => write!(f, "Too many axes (max {})", max),
            ConfigError::UnsupportedCapability(caps) => {
                write!(f, "Unsupported capability: {:?}", caps)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::InvalidArgument(what) => write!(f, "Invalid argument: {}", what),
            MotorError::UnsupportedOperation { operation, missing } => {
                write!(f, "Operation '{}' unsupported, missing {:?}", operation, missing)
            }
            MotorError::HardwareRejected(fault) => write!(f, "Hardware rejected command: {}", fault),
            MotorError::Disconnected => write!(f, "Axis is disconnected"),
            MotorError::EncoderFault => write!(f, "Position sensor is not functional"),
        }
    }
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareFault::Disconnected => write!(f, "device disconnected"),
            HardwareFault::Timeout => write!(f, "device timeout"),
            HardwareFault::Pin => write!(f, "GPIO pin operation failed"),
            HardwareFault::Pwm => write!(f, "PWM operation failed"),
            HardwareFault::Bus => write!(f, "bus error"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<HardwareFault> for MotorError {
    fn from(e: HardwareFault) -> Self {
        MotorError::HardwareRejected(e)
    }
}

impl From<HardwareFault> for Error {
    fn from(e: HardwareFault) -> Self {
        Error::Motor(MotorError::HardwareRejected(e))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for HardwareFault {}

//! Motion module for axis-control.
//!
//! Direction of travel and phase (sign convention) of motors and sensors.

mod direction;
mod phase;

pub use direction::Direction;
pub use phase::Phase;

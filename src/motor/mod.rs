//! Motor module for axis-control.
//!
//! Provides the target-state machine, the unit adapter it drives backends
//! through, and the robot-level facade.

mod adapter;
mod builder;
mod diagnostics;
mod driver;
pub mod state;
mod system;

pub use adapter::UnitAdapter;
pub use builder::MotorBuilder;
pub use diagnostics::{
    DiagnosticsString, Snapshot, Transition, DIAGNOSTICS_CAPACITY, TRUNCATION_MARKER,
};
pub use driver::Motor;
pub use state::TargetState;
pub use system::MotorSystem;

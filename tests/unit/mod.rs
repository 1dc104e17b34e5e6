//! Unit test harness for axis-control.
//!
//! This module organizes unit tests for each component of the library.

mod config_parsing;
mod config_validation;
mod limit_switch;

//! Safety monitoring
//!
//! Detects communication loss and forces the motor to stop.

pub mod failsafe;

pub use failsafe::{FailsafeStatus, FailsafeWatchdog};

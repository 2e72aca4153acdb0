//! Motion control
//!
//! Applies commands to the motor driver and enforces the failsafe.

pub mod controller;

pub use controller::MotionController;

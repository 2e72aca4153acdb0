//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod motor;

pub use motor::{Duty, MotorDriver, MotorError, DUTY_MAX};

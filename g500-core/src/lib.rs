//! Board-agnostic core logic for the G500 drive controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Motor driver trait (H-bridge capability set)
//! - Speed map calibration and fixed timing constants
//! - Direction state machine
//! - Communication-loss failsafe
//! - Motion controller tying commands, state and driver together

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod safety;
pub mod state;
pub mod traits;

pub use motion::MotionController;
pub use state::{Direction, MotionState};
pub use traits::{Duty, MotorDriver, MotorError};

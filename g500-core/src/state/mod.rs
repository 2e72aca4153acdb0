//! Motion state
//!
//! Defines the direction state machine and the single motion state
//! instance it lives in.

pub mod machine;

pub use machine::{Direction, MotionState};

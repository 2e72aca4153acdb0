//! Motor driver implementations
//!
//! - H-bridge (L298N, TB6612 and similar): PWM enable line plus two
//!   complementary direction lines

pub mod hbridge;

pub use hbridge::{HBridge, Polarity};

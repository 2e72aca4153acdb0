//! G500 Serial Protocol
//!
//! This crate defines the line-oriented serial protocol between a host
//! (Serial Monitor, Raspberry Pi bridge, ...) and the G500 drive controller.
//!
//! # Protocol Overview
//!
//! Every message is a single `\n`-terminated line at 115200 baud. Two input
//! dialects share the stream:
//!
//! ```text
//! 1..9          set speed level
//! F | B | R     drive forward / backward (R is a legacy alias of B)
//! S             stop (coast)
//! {"t": -0.5}   signed throttle in [-1.0, 1.0], capped by the speed level
//! ```
//!
//! The controller answers with one compact JSON object per state change:
//!
//! ```text
//! {"status":"forward","speed":5}
//! {"status":"speed","level":3}
//! {"status":"failsafe"}
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod status;
pub mod throttle;

pub use command::{Command, Heading, SpeedLevel};
pub use line::{Line, LineReader, MAX_LINE_LEN};
pub use status::{ReportError, StatusEvent, StatusLine, StatusReporter, MAX_STATUS_LEN};

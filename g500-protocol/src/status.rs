//! Status replies sent back to the host
//!
//! Each state change produces one compact JSON object on its own line:
//!
//! ```text
//! {"status":"ready","speed":5}
//! {"status":"forward","speed":5}
//! {"status":"backward","speed":5}
//! {"status":"stop","speed":5}
//! {"status":"speed","level":3}
//! {"status":"failsafe"}
//! ```

use embedded_io::Write;
use heapless::String;
use serde::Serialize;

use crate::command::SpeedLevel;

/// Maximum encoded status length in bytes, newline included
pub const MAX_STATUS_LEN: usize = 48;

/// An encoded status line
pub type StatusLine = String<MAX_STATUS_LEN>;

/// Events reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusEvent {
    /// Firmware booted, motor coasting
    Ready { speed: SpeedLevel },
    /// Driving forward
    Forward { speed: SpeedLevel },
    /// Driving backward
    Backward { speed: SpeedLevel },
    /// Coasting
    Stop { speed: SpeedLevel },
    /// Speed level changed
    #[serde(rename = "speed")]
    SpeedChanged { level: SpeedLevel },
    /// Input timed out, motor forced to stop
    Failsafe,
}

impl Serialize for SpeedLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.get())
    }
}

impl StatusEvent {
    /// Encode as a compact JSON object (without the trailing newline)
    pub fn encode(&self) -> Result<StatusLine, serde_json_core::ser::Error> {
        serde_json_core::to_string(self)
    }
}

/// Errors that can occur while reporting a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError<E> {
    /// Encoded status did not fit the line buffer
    Encode,
    /// Transport write failed
    Write(E),
}

/// Writes one newline-terminated status line per event
pub struct StatusReporter<W> {
    tx: W,
}

impl<W: Write> StatusReporter<W> {
    /// Create a reporter on top of a serial transmitter
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    /// Emit a single event
    ///
    /// The whole line is written with one `write_all` and flushed, so
    /// events are never batched together.
    pub fn report(&mut self, event: &StatusEvent) -> Result<(), ReportError<W::Error>> {
        let mut line = event.encode().map_err(|_| ReportError::Encode)?;
        line.push('\n').map_err(|_| ReportError::Encode)?;

        self.tx
            .write_all(line.as_bytes())
            .map_err(ReportError::Write)?;
        self.tx.flush().map_err(ReportError::Write)
    }

    /// Access the underlying transmitter
    pub fn inner(&self) -> &W {
        &self.tx
    }

    /// Release the underlying transmitter
    pub fn into_inner(self) -> W {
        self.tx
    }
}

//! Communication-loss failsafe
//!
//! Tracks the time since the last accepted input line. Once it exceeds
//! [`FAILSAFE_TIMEOUT_MS`] the motor must be stopped, and the trip is
//! reported exactly once until input resumes.

use crate::config::FAILSAFE_TIMEOUT_MS;

/// Failsafe condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailsafeStatus {
    /// Input is recent enough
    Ok,
    /// Timeout exceeded and not yet acted upon
    Expired,
    /// Already tripped, waiting for input
    Tripped,
}

/// Input watchdog
///
/// Timestamps are milliseconds of a free-running `u32` uptime counter;
/// elapsed time uses wrapping subtraction so counter rollover is harmless.
#[derive(Debug, Clone)]
pub struct FailsafeWatchdog {
    /// Uptime of the last accepted input (ms)
    last_input_ms: u32,
    /// Motor was stopped by the failsafe since the last input
    tripped: bool,
}

impl FailsafeWatchdog {
    /// Create a watchdog whose timer starts at `now_ms`
    pub fn new(now_ms: u32) -> Self {
        Self {
            last_input_ms: now_ms,
            tripped: false,
        }
    }

    /// Record an accepted input line, re-arming the watchdog
    pub fn input_received(&mut self, now_ms: u32) {
        self.last_input_ms = now_ms;
        self.tripped = false;
    }

    /// Milliseconds since the last input
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_input_ms)
    }

    /// Check the watchdog at `now_ms`
    pub fn check(&self, now_ms: u32) -> FailsafeStatus {
        if self.tripped {
            FailsafeStatus::Tripped
        } else if self.elapsed_ms(now_ms) > FAILSAFE_TIMEOUT_MS {
            FailsafeStatus::Expired
        } else {
            FailsafeStatus::Ok
        }
    }

    /// Mark the failsafe stop as performed
    pub fn trip(&mut self) {
        self.tripped = true;
    }

    /// Check if the failsafe has tripped since the last input
    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// Uptime of the last accepted input (ms)
    pub fn last_input_ms(&self) -> u32 {
        self.last_input_ms
    }
}

//! Direction state machine
//!
//! The motor output is a function of the current direction and speed
//! level. Direction changes only through commands or a failsafe trip.

use g500_protocol::{Command, Heading, SpeedLevel};

use crate::config::THROTTLE_DEADBAND;
use crate::safety::FailsafeWatchdog;

/// Motor direction states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Coasting, duty 0
    #[default]
    Stopped,
    /// Driving forward
    Forward,
    /// Driving backward
    Backward,
}

impl Direction {
    /// Check if the motor is being driven
    pub fn is_moving(&self) -> bool {
        !matches!(self, Direction::Stopped)
    }

    /// Process a command and return the next direction
    ///
    /// There is no terminal state: every state accepts every command.
    /// Speed changes are a self-loop.
    pub fn transition(self, command: &Command) -> Self {
        match *command {
            Command::Drive(heading) => heading.into(),
            Command::Stop => Direction::Stopped,
            Command::Throttle(t) if t > THROTTLE_DEADBAND => Direction::Forward,
            Command::Throttle(t) if t < -THROTTLE_DEADBAND => Direction::Backward,
            Command::Throttle(_) => Direction::Stopped,
            Command::SetSpeed(_) => self,
        }
    }
}

impl From<Heading> for Direction {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::Forward => Direction::Forward,
            Heading::Backward => Direction::Backward,
        }
    }
}

/// Complete motion state of the controller
///
/// One instance exists for the lifetime of the firmware, owned by the
/// motion controller.
#[derive(Debug, Clone)]
pub struct MotionState {
    pub(crate) speed_level: SpeedLevel,
    pub(crate) direction: Direction,
    pub(crate) watchdog: FailsafeWatchdog,
}

impl MotionState {
    /// Boot state: default speed level, stopped, input timer started at `now_ms`
    pub fn new(now_ms: u32) -> Self {
        Self {
            speed_level: SpeedLevel::DEFAULT,
            direction: Direction::Stopped,
            watchdog: FailsafeWatchdog::new(now_ms),
        }
    }

    /// Current speed level cap
    pub fn speed_level(&self) -> SpeedLevel {
        self.speed_level
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Timestamp of the last accepted input line
    pub fn last_command_ms(&self) -> u32 {
        self.watchdog.last_input_ms()
    }

    /// Check if the failsafe has stopped the motor since the last input
    pub fn is_failsafe_tripped(&self) -> bool {
        self.watchdog.is_tripped()
    }
}

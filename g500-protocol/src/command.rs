//! Commands parsed from input lines

use crate::throttle::parse_throttle;

/// Discrete speed level (1 = slowest, 9 = full power)
///
/// The only constructor rejects values outside 1..=9, so a `SpeedLevel` is
/// always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    /// Slowest level
    pub const MIN: SpeedLevel = SpeedLevel(1);
    /// Full power
    pub const MAX: SpeedLevel = SpeedLevel(9);
    /// Level selected at boot
    pub const DEFAULT: SpeedLevel = SpeedLevel(5);

    /// Create a speed level, returning `None` outside 1..=9
    pub const fn new(level: u8) -> Option<Self> {
        if level >= Self::MIN.0 && level <= Self::MAX.0 {
            Some(SpeedLevel(level))
        } else {
            None
        }
    }

    /// Parse an ASCII digit `'1'`..=`'9'`
    pub fn from_ascii_digit(byte: u8) -> Option<Self> {
        if byte.is_ascii_digit() {
            Self::new(byte - b'0')
        } else {
            None
        }
    }

    /// Numeric level
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Drive heading requested by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Forward,
    Backward,
}

/// A decoded input line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Change the speed level cap
    SetSpeed(SpeedLevel),
    /// Drive at the current speed level
    Drive(Heading),
    /// Coast to a stop
    Stop,
    /// Signed throttle in -1.0..=1.0, scaled by the speed level
    Throttle(f32),
}

// Wire format characters
const CMD_FORWARD: [u8; 2] = [b'F', b'f'];
const CMD_BACKWARD: [u8; 4] = [b'B', b'b', b'R', b'r'];
const CMD_STOP: [u8; 2] = [b'S', b's'];
const THROTTLE_PREFIX: char = '{';

impl Command {
    /// Classify a trimmed input line
    ///
    /// Every line maps to a command or to `None` ("ignored"); there is no
    /// error case. Only the first character of a plain command is
    /// significant.
    pub fn parse(line: &str) -> Option<Self> {
        if line.starts_with(THROTTLE_PREFIX) {
            return parse_throttle(line).map(Command::Throttle);
        }

        let first = *line.as_bytes().first()?;
        if let Some(level) = SpeedLevel::from_ascii_digit(first) {
            return Some(Command::SetSpeed(level));
        }

        if CMD_FORWARD.contains(&first) {
            Some(Command::Drive(Heading::Forward))
        } else if CMD_BACKWARD.contains(&first) {
            Some(Command::Drive(Heading::Backward))
        } else if CMD_STOP.contains(&first) {
            Some(Command::Stop)
        } else {
            None
        }
    }
}

//! Controller configuration
//!
//! There is no runtime configuration and nothing is persisted: these are
//! calibration constants compiled into the firmware.

use g500_protocol::SpeedLevel;

use crate::traits::Duty;

/// PWM duty for each speed level
///
/// Index 0 is an unused sentinel. The values are measured calibration
/// points for the L298N drive, not a computed ramp.
pub const SPEED_MAP: [Duty; 10] = [
    0,   // unused
    28,  // level 1  ~11%
    56,  // level 2  ~22%
    85,  // level 3  ~33%
    113, // level 4  ~44%
    141, // level 5  ~55%
    170, // level 6  ~67%
    198, // level 7  ~78%
    226, // level 8  ~89%
    255, // level 9  100%
];

/// Time without input after which the motor is forced to stop
pub const FAILSAFE_TIMEOUT_MS: u32 = 500;

/// Throttle magnitudes at or below this coast
pub const THROTTLE_DEADBAND: f32 = 0.01;

/// Duty cap for a speed level
pub fn level_duty(level: SpeedLevel) -> Duty {
    SPEED_MAP[level.get() as usize]
}

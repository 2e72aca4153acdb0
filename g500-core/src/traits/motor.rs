//! Motor driver trait
//!
//! The H-bridge is reduced to three capabilities: coast, drive forward and
//! drive backward at a PWM duty. Implementations own the pins; the core
//! never touches hardware directly.

/// PWM duty value, 0 (off) to [`DUTY_MAX`] (full power)
pub type Duty = u8;

/// Full-power duty
pub const DUTY_MAX: Duty = 255;

/// Errors that can occur with motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// A direction line could not be driven
    Pin,
    /// The PWM output rejected the duty cycle
    Pwm,
}

/// Trait for a single bidirectional DC motor behind an H-bridge
///
/// Each call fully determines the bridge output: a new call replaces the
/// previous one, there is no ramping and no intermediate state.
pub trait MotorDriver {
    /// Coast to a stop
    ///
    /// Sets the enable line to zero and both direction lines inactive. This
    /// is freewheeling, not active braking.
    fn stop(&mut self) -> Result<(), MotorError>;

    /// Drive forward at the given duty
    fn forward(&mut self, duty: Duty) -> Result<(), MotorError>;

    /// Drive backward at the given duty
    fn backward(&mut self, duty: Duty) -> Result<(), MotorError>;
}

impl<T: MotorDriver + ?Sized> MotorDriver for &mut T {
    fn stop(&mut self) -> Result<(), MotorError> {
        (**self).stop()
    }

    fn forward(&mut self, duty: Duty) -> Result<(), MotorError> {
        (**self).forward(duty)
    }

    fn backward(&mut self, duty: Duty) -> Result<(), MotorError> {
        (**self).backward(duty)
    }
}

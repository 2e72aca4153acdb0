//! H-bridge motor driver
//!
//! Drives one brushed DC motor through a dual H-bridge channel:
//! - ENA: PWM enable line, sets the power delivered
//! - IN1/IN2: complementary direction lines
//!
//! | Output   | IN1  | IN2  | ENA   |
//! |----------|------|------|-------|
//! | coast    | low  | low  | 0     |
//! | forward  | high | low  | duty  |
//! | backward | low  | high | duty  |
//!
//! Direction lines are written before the duty when driving, and after the
//! duty is cleared when stopping, so the enable line is never active with
//! a half-updated direction.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use g500_core::traits::{Duty, MotorDriver, MotorError, DUTY_MAX};

/// Direction line configuration currently applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Both lines low, motor freewheels
    #[default]
    Coast,
    /// IN1 high, IN2 low
    Forward,
    /// IN1 low, IN2 high
    Backward,
}

impl Polarity {
    /// Pin levels for (IN1, IN2)
    fn levels(self) -> (PinState, PinState) {
        match self {
            Polarity::Coast => (PinState::Low, PinState::Low),
            Polarity::Forward => (PinState::High, PinState::Low),
            Polarity::Backward => (PinState::Low, PinState::High),
        }
    }
}

/// H-bridge channel with PWM enable and two direction lines
///
/// Duties in `0..=255` are scaled onto the PWM's own resolution, so any
/// `SetDutyCycle` implementation works regardless of its top value.
pub struct HBridge<EN, IN1, IN2> {
    enable: EN,
    in1: IN1,
    in2: IN2,
    polarity: Polarity,
    duty: Duty,
}

impl<EN, IN1, IN2> HBridge<EN, IN1, IN2>
where
    EN: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
{
    /// Create a driver from already configured outputs
    ///
    /// The pins are not touched; the first `stop()` puts the bridge in a
    /// known state.
    pub fn new(enable: EN, in1: IN1, in2: IN2) -> Self {
        Self {
            enable,
            in1,
            in2,
            polarity: Polarity::Coast,
            duty: 0,
        }
    }

    /// Direction lines last written
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Duty last written to the enable line
    pub fn duty(&self) -> Duty {
        self.duty
    }

    /// Give back the outputs
    pub fn release(self) -> (EN, IN1, IN2) {
        (self.enable, self.in1, self.in2)
    }

    fn set_polarity(&mut self, polarity: Polarity) -> Result<(), MotorError> {
        let (in1, in2) = polarity.levels();
        self.in1.set_state(in1).map_err(|_| MotorError::Pin)?;
        self.in2.set_state(in2).map_err(|_| MotorError::Pin)?;
        self.polarity = polarity;
        Ok(())
    }

    fn set_duty(&mut self, duty: Duty) -> Result<(), MotorError> {
        self.enable
            .set_duty_cycle_fraction(duty as u16, DUTY_MAX as u16)
            .map_err(|_| MotorError::Pwm)?;
        self.duty = duty;
        Ok(())
    }

    fn drive(&mut self, polarity: Polarity, duty: Duty) -> Result<(), MotorError> {
        self.set_polarity(polarity)?;
        self.set_duty(duty)
    }
}

impl<EN, IN1, IN2> MotorDriver for HBridge<EN, IN1, IN2>
where
    EN: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
{
    fn stop(&mut self) -> Result<(), MotorError> {
        self.set_duty(0)?;
        self.set_polarity(Polarity::Coast)
    }

    fn forward(&mut self, duty: Duty) -> Result<(), MotorError> {
        self.drive(Polarity::Forward, duty)
    }

    fn backward(&mut self, duty: Duty) -> Result<(), MotorError> {
        self.drive(Polarity::Backward, duty)
    }
}

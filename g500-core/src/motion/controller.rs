//! Motion controller
//!
//! Owns the motion state and the motor driver, applies commands, and runs
//! the failsafe check. Every public operation returns the status event to
//! report; the caller decides how to emit it.
//!
//! State is only updated after the driver accepted the new output, so the
//! recorded direction always matches what the bridge is doing.

use g500_protocol::throttle::clamp_throttle;
use g500_protocol::{Command, Heading, SpeedLevel, StatusEvent};

use crate::config::level_duty;
use crate::safety::FailsafeStatus;
use crate::state::{Direction, MotionState};
use crate::traits::{Duty, MotorDriver, MotorError};

/// Single-motor motion controller
pub struct MotionController<M> {
    motor: M,
    state: MotionState,
}

impl<M: MotorDriver> MotionController<M> {
    /// Create a controller; the input timer starts at `now_ms`
    pub fn new(motor: M, now_ms: u32) -> Self {
        Self {
            motor,
            state: MotionState::new(now_ms),
        }
    }

    /// Put the motor in coast and produce the boot announcement
    pub fn boot(&mut self, now_ms: u32) -> Result<StatusEvent, MotorError> {
        self.halt()?;
        self.state.watchdog.input_received(now_ms);
        Ok(StatusEvent::Ready {
            speed: self.state.speed_level,
        })
    }

    /// Handle one trimmed input line received at `now_ms`
    ///
    /// Empty lines have no effect. Any other line re-arms the failsafe
    /// before it is classified, so unrecognised input still counts as
    /// traffic. Returns `None` for ignored lines.
    pub fn handle_line(
        &mut self,
        line: &str,
        now_ms: u32,
    ) -> Result<Option<StatusEvent>, MotorError> {
        if line.is_empty() {
            return Ok(None);
        }

        self.state.watchdog.input_received(now_ms);

        match Command::parse(line) {
            Some(command) => self.apply(command).map(Some),
            None => Ok(None),
        }
    }

    /// Apply a decoded command
    pub fn apply(&mut self, command: Command) -> Result<StatusEvent, MotorError> {
        match command {
            Command::SetSpeed(level) => self.set_speed_level(level),
            Command::Drive(heading) => self.drive(heading),
            Command::Stop => self.stop(),
            Command::Throttle(t) => self.apply_throttle(t),
        }
    }

    /// Change the speed level
    ///
    /// While moving, the new duty is applied in the current direction with a
    /// single driver call, so motion is never interrupted and no frame at the
    /// old level is sent after the change.
    pub fn set_speed_level(&mut self, level: SpeedLevel) -> Result<StatusEvent, MotorError> {
        let duty = level_duty(level);
        match self.state.direction {
            Direction::Forward => self.motor.forward(duty)?,
            Direction::Backward => self.motor.backward(duty)?,
            Direction::Stopped => {}
        }

        self.state.speed_level = level;
        Ok(StatusEvent::SpeedChanged { level })
    }

    /// Drive at the full duty of the current speed level
    pub fn drive(&mut self, heading: Heading) -> Result<StatusEvent, MotorError> {
        let duty = level_duty(self.state.speed_level);
        self.engage(heading.into(), duty)?;
        Ok(self.motion_event())
    }

    /// Coast to a stop
    pub fn stop(&mut self) -> Result<StatusEvent, MotorError> {
        self.halt()?;
        Ok(self.motion_event())
    }

    /// Apply a signed throttle
    ///
    /// Duty is `|t|` times the speed level cap, truncated, so the cap is
    /// never exceeded. Magnitudes inside the deadband coast.
    pub fn apply_throttle(&mut self, t: f32) -> Result<StatusEvent, MotorError> {
        let t = clamp_throttle(t);
        let direction = self.state.direction.transition(&Command::Throttle(t));

        let duty = if direction.is_moving() {
            throttle_duty(t, level_duty(self.state.speed_level))
        } else {
            0
        };

        self.engage(direction, duty)?;
        Ok(self.motion_event())
    }

    /// Run the failsafe check at `now_ms`
    ///
    /// Returns the failsafe event the first time the input timeout is
    /// exceeded; the motor is stopped at that point. If the stop fails, the
    /// watchdog stays armed and the stop is retried on the next check.
    pub fn check_failsafe(&mut self, now_ms: u32) -> Result<Option<StatusEvent>, MotorError> {
        match self.state.watchdog.check(now_ms) {
            FailsafeStatus::Expired => {
                self.halt()?;
                self.state.watchdog.trip();
                Ok(Some(StatusEvent::Failsafe))
            }
            FailsafeStatus::Ok | FailsafeStatus::Tripped => Ok(None),
        }
    }

    /// Current speed level cap
    pub fn speed_level(&self) -> SpeedLevel {
        self.state.speed_level
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    /// Check if the failsafe has stopped the motor since the last input
    pub fn is_failsafe_tripped(&self) -> bool {
        self.state.is_failsafe_tripped()
    }

    /// Full motion state
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// The motor driver
    pub fn driver(&self) -> &M {
        &self.motor
    }

    /// Release the motor driver
    pub fn into_driver(self) -> M {
        self.motor
    }

    /// Drive the bridge and record the new direction
    fn engage(&mut self, direction: Direction, duty: Duty) -> Result<(), MotorError> {
        match direction {
            Direction::Forward => self.motor.forward(duty)?,
            Direction::Backward => self.motor.backward(duty)?,
            Direction::Stopped => self.motor.stop()?,
        }
        self.state.direction = direction;
        Ok(())
    }

    fn halt(&mut self) -> Result<(), MotorError> {
        self.engage(Direction::Stopped, 0)
    }

    fn motion_event(&self) -> StatusEvent {
        let speed = self.state.speed_level;
        match self.state.direction {
            Direction::Forward => StatusEvent::Forward { speed },
            Direction::Backward => StatusEvent::Backward { speed },
            Direction::Stopped => StatusEvent::Stop { speed },
        }
    }
}

/// Scale a throttle magnitude onto a duty cap (truncating)
fn throttle_duty(t: f32, cap: Duty) -> Duty {
    let duty = libm::fabsf(t) * f32::from(cap);
    // |t| <= 1 keeps this within 0..=cap
    duty as Duty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SPEED_MAP;
    use g500_protocol::LineReader;
    use heapless::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Stop,
        Forward(Duty),
        Backward(Duty),
    }

    /// Motor driver that records every call
    #[derive(Default)]
    struct FakeMotor {
        calls: Vec<Call, 64>,
        fail: bool,
    }

    impl FakeMotor {
        fn record(&mut self, call: Call) -> Result<(), MotorError> {
            if self.fail {
                return Err(MotorError::Pwm);
            }
            self.calls.push(call).unwrap();
            Ok(())
        }

        fn last(&self) -> Option<Call> {
            self.calls.last().copied()
        }
    }

    impl MotorDriver for FakeMotor {
        fn stop(&mut self) -> Result<(), MotorError> {
            self.record(Call::Stop)
        }

        fn forward(&mut self, duty: Duty) -> Result<(), MotorError> {
            self.record(Call::Forward(duty))
        }

        fn backward(&mut self, duty: Duty) -> Result<(), MotorError> {
            self.record(Call::Backward(duty))
        }
    }

    fn level(n: u8) -> SpeedLevel {
        SpeedLevel::new(n).unwrap()
    }

    /// Run raw wire bytes through a line reader into the controller
    fn feed_wire(controller: &mut MotionController<FakeMotor>, wire: &[u8], now_ms: u32) {
        let mut reader = LineReader::new();
        for &byte in wire {
            if let Some(line) = reader.feed(byte) {
                controller.handle_line(&line, now_ms).unwrap();
            }
        }
    }

    fn booted() -> MotionController<FakeMotor> {
        let mut controller = MotionController::new(FakeMotor::default(), 0);
        controller.boot(0).unwrap();
        controller
    }

    #[test]
    fn test_boot_announces_ready() {
        let mut controller = MotionController::new(FakeMotor::default(), 0);
        let event = controller.boot(0).unwrap();

        assert_eq!(event, StatusEvent::Ready { speed: level(5) });
        assert_eq!(controller.driver().calls.as_slice(), &[Call::Stop]);
        assert_eq!(controller.direction(), Direction::Stopped);
    }

    #[test]
    fn test_drive_uses_speed_map() {
        let mut controller = booted();

        let event = controller.handle_line("F", 10).unwrap();
        assert_eq!(event, Some(StatusEvent::Forward { speed: level(5) }));
        assert_eq!(controller.driver().last(), Some(Call::Forward(141)));

        let event = controller.handle_line("b", 20).unwrap();
        assert_eq!(event, Some(StatusEvent::Backward { speed: level(5) }));
        assert_eq!(controller.driver().last(), Some(Call::Backward(141)));
        assert_eq!(controller.direction(), Direction::Backward);
    }

    #[test]
    fn test_reverse_alias_drives_backward() {
        let mut a = booted();
        let mut b = booted();

        assert_eq!(a.handle_line("R", 1).unwrap(), b.handle_line("B", 1).unwrap());
        assert_eq!(a.driver().calls, b.driver().calls);
        assert_eq!(a.direction(), b.direction());
    }

    #[test]
    fn test_speed_change_while_forward() {
        let mut controller = booted();
        controller.handle_line("F", 1).unwrap();

        for l in 1..=9u8 {
            let calls_before = controller.driver().calls.len();
            let event = controller.set_speed_level(level(l)).unwrap();

            assert_eq!(event, StatusEvent::SpeedChanged { level: level(l) });
            assert_eq!(controller.direction(), Direction::Forward);
            // Exactly one driver call, straight to the new duty
            assert_eq!(controller.driver().calls.len(), calls_before + 1);
            assert_eq!(
                controller.driver().last(),
                Some(Call::Forward(SPEED_MAP[l as usize]))
            );
        }
    }

    #[test]
    fn test_lower_speed_while_backward_has_no_overshoot() {
        let mut controller = booted();
        controller.handle_line("9", 1).unwrap();
        controller.handle_line("B", 2).unwrap();
        assert_eq!(controller.driver().last(), Some(Call::Backward(255)));

        let calls_before = controller.driver().calls.len();
        controller.handle_line("2", 3).unwrap();

        assert_eq!(
            &controller.driver().calls[calls_before..],
            &[Call::Backward(56)]
        );
    }

    #[test]
    fn test_speed_change_while_stopped() {
        let mut controller = booted();
        let calls_before = controller.driver().calls.len();

        let event = controller.handle_line("3", 5).unwrap();
        assert_eq!(event, Some(StatusEvent::SpeedChanged { level: level(3) }));
        assert_eq!(controller.driver().calls.len(), calls_before);
        assert_eq!(controller.direction(), Direction::Stopped);

        // Next drive uses the new level
        controller.handle_line("F", 6).unwrap();
        assert_eq!(controller.driver().last(), Some(Call::Forward(85)));
    }

    #[test]
    fn test_stop_from_any_state() {
        for line in ["F", "B", "S"] {
            let mut controller = booted();
            controller.handle_line(line, 1).unwrap();

            let event = controller.handle_line("s", 2).unwrap();
            assert_eq!(event, Some(StatusEvent::Stop { speed: level(5) }));
            assert_eq!(controller.direction(), Direction::Stopped);
            assert_eq!(controller.driver().last(), Some(Call::Stop));
        }
    }

    #[test]
    fn test_throttle_half_at_full_level() {
        let mut controller = booted();
        controller.handle_line("9", 1).unwrap();

        let event = controller.handle_line("{\"t\": 0.5}", 2).unwrap();
        assert_eq!(event, Some(StatusEvent::Forward { speed: level(9) }));
        assert_eq!(controller.driver().last(), Some(Call::Forward(127)));
    }

    #[test]
    fn test_throttle_negative_drives_backward() {
        let mut controller = booted();

        let event = controller.handle_line("{'t': -1.0}", 1).unwrap();
        assert_eq!(event, Some(StatusEvent::Backward { speed: level(5) }));
        assert_eq!(controller.driver().last(), Some(Call::Backward(141)));
    }

    #[test]
    fn test_throttle_capped_by_level() {
        let mut controller = booted();
        controller.handle_line("3", 1).unwrap();

        controller.apply_throttle(1.0).unwrap();
        assert_eq!(controller.driver().last(), Some(Call::Forward(85)));

        // Out-of-range values are clamped, never rejected
        controller.apply_throttle(-4.0).unwrap();
        assert_eq!(controller.driver().last(), Some(Call::Backward(85)));
    }

    #[test]
    fn test_throttle_deadband_stops() {
        let mut controller = booted();
        controller.handle_line("F", 1).unwrap();

        for t in [0.0, 0.01, -0.01, 0.005] {
            let event = controller.apply_throttle(t).unwrap();
            assert_eq!(event, StatusEvent::Stop { speed: level(5) });
            assert_eq!(controller.direction(), Direction::Stopped);
            assert_eq!(controller.driver().last(), Some(Call::Stop));
        }
    }

    #[test]
    fn test_unknown_line_is_ignored() {
        let mut controller = booted();
        controller.handle_line("F", 1).unwrap();
        let calls_before = controller.driver().calls.len();

        assert_eq!(controller.handle_line("Q", 100).unwrap(), None);
        assert_eq!(controller.handle_line("{\"x\": 1}", 110).unwrap(), None);
        assert_eq!(controller.direction(), Direction::Forward);
        assert_eq!(controller.speed_level(), level(5));
        assert_eq!(controller.driver().calls.len(), calls_before);
        // Still counts as traffic
        assert_eq!(controller.state().last_command_ms(), 110);
    }

    #[test]
    fn test_empty_line_is_not_traffic() {
        let mut controller = booted();
        assert_eq!(controller.handle_line("", 400).unwrap(), None);
        assert_eq!(controller.state().last_command_ms(), 0);
        assert_eq!(
            controller.check_failsafe(501).unwrap(),
            Some(StatusEvent::Failsafe)
        );
    }

    #[test]
    fn test_failsafe_trips_once() {
        let mut controller = booted();
        controller.handle_line("F", 0).unwrap();

        assert_eq!(controller.check_failsafe(500).unwrap(), None);
        assert_eq!(
            controller.check_failsafe(501).unwrap(),
            Some(StatusEvent::Failsafe)
        );
        assert_eq!(controller.direction(), Direction::Stopped);
        assert_eq!(controller.driver().last(), Some(Call::Stop));
        assert!(controller.is_failsafe_tripped());

        // Idle continues: no repeats
        let calls_before = controller.driver().calls.len();
        for now in [502, 1000, 10_000, 100_000] {
            assert_eq!(controller.check_failsafe(now).unwrap(), None);
        }
        assert_eq!(controller.driver().calls.len(), calls_before);
    }

    #[test]
    fn test_failsafe_rearms_on_any_line() {
        let mut controller = booted();
        controller.check_failsafe(600).unwrap();
        assert!(controller.is_failsafe_tripped());

        // Unrecognised but non-empty input clears the trip
        assert_eq!(controller.handle_line("Q", 2000).unwrap(), None);
        assert!(!controller.is_failsafe_tripped());
        assert_eq!(controller.check_failsafe(2500).unwrap(), None);

        // Another idle period trips again
        assert_eq!(
            controller.check_failsafe(2501).unwrap(),
            Some(StatusEvent::Failsafe)
        );
    }

    #[test]
    fn test_ignored_line_resets_timer() {
        let mut controller = booted();
        controller.handle_line("Q", 400).unwrap();

        assert_eq!(controller.check_failsafe(800).unwrap(), None);
        assert_eq!(
            controller.check_failsafe(901).unwrap(),
            Some(StatusEvent::Failsafe)
        );
    }

    #[test]
    fn test_failsafe_across_counter_wrap() {
        let start = u32::MAX - 100;
        let mut controller = MotionController::new(FakeMotor::default(), start);
        controller.boot(start).unwrap();

        assert_eq!(controller.check_failsafe(399).unwrap(), None);
        assert_eq!(
            controller.check_failsafe(400).unwrap(),
            Some(StatusEvent::Failsafe)
        );
    }

    #[test]
    fn test_driver_error_leaves_state_unchanged() {
        let mut controller = booted();
        controller.handle_line("F", 1).unwrap();

        controller.motor.fail = true;
        assert_eq!(controller.handle_line("S", 2), Err(MotorError::Pwm));
        assert_eq!(controller.direction(), Direction::Forward);

        assert_eq!(controller.set_speed_level(level(8)), Err(MotorError::Pwm));
        assert_eq!(controller.speed_level(), level(5));
    }

    #[test]
    fn test_failed_failsafe_stop_is_retried() {
        let mut controller = booted();
        controller.handle_line("B", 0).unwrap();

        controller.motor.fail = true;
        assert_eq!(controller.check_failsafe(600), Err(MotorError::Pwm));
        assert!(!controller.is_failsafe_tripped());

        controller.motor.fail = false;
        assert_eq!(
            controller.check_failsafe(610).unwrap(),
            Some(StatusEvent::Failsafe)
        );
        assert_eq!(controller.direction(), Direction::Stopped);
    }

    #[test]
    fn test_garbled_tail_keeps_leading_command() {
        let mut controller = booted();
        feed_wire(&mut controller, b"F\xff\n", 10);

        assert_eq!(controller.direction(), Direction::Forward);
        assert_eq!(controller.driver().last(), Some(Call::Forward(141)));
    }

    #[test]
    fn test_undecodable_line_is_traffic() {
        let mut controller = booted();
        feed_wire(&mut controller, b"\xfe\xff\n", 400);

        assert_eq!(controller.direction(), Direction::Stopped);
        assert_eq!(controller.state().last_command_ms(), 400);
        assert_eq!(controller.check_failsafe(600).unwrap(), None);
    }

    #[test]
    fn test_long_throttle_line_is_traffic() {
        let mut controller = booted();
        feed_wire(
            &mut controller,
            b"{\"t\": 0.5, \"seq\": 1234567, \"stamp\": 1729333333.123456, \"src\": \"ros\"}\n",
            400,
        );

        assert_eq!(controller.direction(), Direction::Forward);
        assert_eq!(controller.driver().last(), Some(Call::Forward(70)));
        assert_eq!(controller.state().last_command_ms(), 400);
        assert_eq!(controller.check_failsafe(600).unwrap(), None);
    }
}

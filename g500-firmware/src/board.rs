//! Board wiring and fixed peripheral settings
//!
//! Raspberry Pi Pico (RP2040) with an L298N-class dual H-bridge, channel A:
//!
//! | Signal  | GPIO | Peripheral        |
//! |---------|------|-------------------|
//! | UART TX | 0    | UART0             |
//! | UART RX | 1    | UART0             |
//! | ENA     | 2    | PWM slice 1, ch A |
//! | IN1     | 3    | SIO output        |
//! | IN2     | 4    | SIO output        |

use embassy_rp::gpio::Output;
use embassy_rp::pwm::PwmOutput;
use g500_drivers::motor::HBridge;

/// Host link baud rate
pub const UART_BAUD: u32 = 115_200;

/// UART ring buffer sizes
pub const UART_TX_BUF: usize = 256;
pub const UART_RX_BUF: usize = 256;

/// PWM counter top: 125 MHz / (6249 + 1) = 20 kHz, above audible range
pub const PWM_TOP: u16 = 6249;

/// Control loop period
pub const CONTROL_TICK_MS: u64 = 1;

/// The motor bridge as wired on this board
pub type Bridge = HBridge<PwmOutput<'static>, Output<'static>, Output<'static>>;

//! G500 - Single Motor Drive Controller Firmware
//!
//! Drives one brushed DC motor through an H-bridge from line-based
//! commands received over UART, and stops it when the host goes quiet.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use g500_drivers::motor::HBridge;

mod board;
mod tasks;

use board::{PWM_TOP, UART_BAUD, UART_RX_BUF, UART_TX_BUF};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; UART_TX_BUF]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_RX_BUF]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("G500 firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Host link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUD;

    let tx_buf = TX_BUF.init([0u8; UART_TX_BUF]);
    let rx_buf = RX_BUF.init([0u8; UART_RX_BUF]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", UART_BAUD);

    // Bridge: PWM on ENA first at 0% duty, direction lines low
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;
    pwm_config.compare_a = 0;

    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, pwm_config);
    let (ena, _) = pwm.split();
    let ena = unwrap!(ena);

    let in1 = Output::new(p.PIN_3, Level::Low);
    let in2 = Output::new(p.PIN_4, Level::Low);

    let bridge = HBridge::new(ena, in1, in2);

    info!("H-bridge initialized");

    spawner.spawn(tasks::control_task(rx, tx, bridge)).unwrap();

    info!("All tasks spawned, firmware running");
}

//! Motor control task
//!
//! Polls the host link for command lines, applies them to the bridge and
//! reports every state change. Also runs the communication-loss failsafe.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{Duration, Instant, Ticker};

use g500_core::MotionController;
use g500_protocol::{LineReader, StatusEvent, StatusReporter};

use crate::board::{Bridge, CONTROL_TICK_MS};

/// Milliseconds since boot, wrapping at `u32::MAX`
fn uptime_ms() -> u32 {
    Instant::now().as_millis() as u32
}

fn send(reporter: &mut StatusReporter<BufferedUartTx>, event: &StatusEvent) {
    if let Err(e) = reporter.report(event) {
        warn!("Status report failed: {:?}", e);
    }
}

/// Control task - owns the bridge, the host link and the motion state
#[embassy_executor::task]
pub async fn control_task(mut rx: BufferedUartRx, tx: BufferedUartTx, bridge: Bridge) {
    info!("Control task started");

    let mut reader = LineReader::new();
    let mut reporter = StatusReporter::new(tx);
    let mut controller = MotionController::new(bridge, uptime_ms());

    match controller.boot(uptime_ms()) {
        Ok(event) => send(&mut reporter, &event),
        Err(e) => error!("Failed to halt motor at boot: {:?}", e),
    }

    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_TICK_MS));

    loop {
        // Drain every complete line the UART already holds
        loop {
            match reader.poll(&mut rx) {
                Ok(Some(line)) => {
                    debug!("RX: {}", line.as_str());
                    match controller.handle_line(&line, uptime_ms()) {
                        Ok(Some(event)) => send(&mut reporter, &event),
                        Ok(None) => {}
                        Err(e) => warn!("Motor error: {:?}", e),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("UART read error: {:?}", e);
                    reader.reset();
                    break;
                }
            }
        }

        let now = uptime_ms();
        match controller.check_failsafe(now) {
            Ok(Some(event)) => {
                let idle_ms = now.wrapping_sub(controller.state().last_command_ms());
                warn!("No input for {} ms, motor stopped", idle_ms);
                send(&mut reporter, &event);
            }
            Ok(None) => {}
            Err(e) => warn!("Failsafe stop failed: {:?}", e),
        }

        ticker.next().await;
    }
}

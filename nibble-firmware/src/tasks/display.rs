//! Display task
//!
//! Owns the HD44780 controller. Row updates become queued operations, and
//! the queue is drained one transfer per tick so other tasks run between
//! bus exchanges.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Ticker, Timer};

use nibble_core::config::MAX_COLUMNS;
use nibble_core::{ControllerState, DisplayController, DisplayError};
use nibble_drivers::Pcf8574;

use crate::channels::{TextUpdate, TEXT_CHANNEL};

/// Controller type driven by this firmware
pub type Lcd = DisplayController<Pcf8574<I2c<'static, I2C0, Blocking>>, Delay>;

/// Time between drain steps
const DRAIN_INTERVAL_MS: u64 = 1;

/// Pause before each reinitialisation attempt
const RECOVERY_DELAY_MS: u64 = 500;

/// Drawn on row 0 at start-up and after recovery
const BANNER: &str = "nibble HD44780";

const BLANKS: [u8; MAX_COLUMNS as usize] = [b' '; MAX_COLUMNS as usize];

/// Display task - applies updates and drains the transfer queue
#[embassy_executor::task]
pub async fn display_task(mut lcd: Lcd) {
    info!("Display task started ({}x{})", lcd.width(), lcd.height());

    let mut ticker = Ticker::every(Duration::from_millis(DRAIN_INTERVAL_MS));

    if let Err(e) = draw_row(&mut lcd, 0, BANNER.as_bytes()) {
        recover(&mut lcd, e).await;
    }

    loop {
        // Take the next row only once the previous one is on the glass
        if lcd.queue_len() == 0 {
            if let Ok(update) = TEXT_CHANNEL.try_receive() {
                if let Err(e) = apply(&mut lcd, &update) {
                    recover(&mut lcd, e).await;
                }
            }
        }

        if let Err(e) = lcd.drain_one() {
            recover(&mut lcd, e).await;
        }

        ticker.next().await;
    }
}

fn apply(lcd: &mut Lcd, update: &TextUpdate) -> Result<(), DisplayError> {
    if update.row >= lcd.height() {
        warn!("Ignoring update for row {}", update.row);
        return Ok(());
    }
    draw_row(lcd, update.row, update.text.as_bytes())
}

/// Queue `text` at the start of `row`, blanking the rest of the row
fn draw_row(lcd: &mut Lcd, row: u8, text: &[u8]) -> Result<(), DisplayError> {
    let width = lcd.width() as usize;
    let text = &text[..text.len().min(width)];

    lcd.set_cursor(0, row)?;
    lcd.write_bytes(text)?;
    lcd.write_bytes(&BLANKS[..width - text.len()])?;

    // A partial write latches QueueFull without failing the call
    match lcd.error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Handle a failed display operation
///
/// Dropped updates are logged and forgotten. A frozen or unreachable
/// controller is reinitialised until it answers again.
async fn recover(lcd: &mut Lcd, error: DisplayError) {
    // The latch may hold an older QueueFull, so the state decides
    if lcd.state() != ControllerState::Errored {
        warn!("Display update dropped: {}", error);
        lcd.clear_queue();
        lcd.clear_error();
        return;
    }

    error!("Display failed: {} (code {})", error, error.code());

    loop {
        Timer::after_millis(RECOVERY_DELAY_MS).await;

        lcd.transport_mut().clear_fault();
        match lcd.reinitialize() {
            Ok(()) => {
                info!("Display recovered");
                break;
            }
            Err(e) => warn!("Display still unresponsive: {}", e),
        }
    }

    if draw_row(lcd, 0, BANNER.as_bytes()).is_err() {
        // Picked up again by the next drain step
        warn!("Banner not redrawn after recovery");
    }
}

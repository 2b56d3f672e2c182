//! Uptime ticker
//!
//! Publishes the time since boot to the second display row once a second.

use core::fmt::Write;

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use heapless::String;

use crate::channels::{TextUpdate, TEXT_CHANNEL};

/// Row the uptime is drawn on
pub const UPTIME_ROW: u8 = 1;

/// Uptime task - sends an "up hh:mm:ss" row every second
#[embassy_executor::task]
pub async fn uptime_task() {
    info!("Uptime task started");

    let mut ticker = Ticker::every(Duration::from_secs(1));

    loop {
        ticker.next().await;

        let secs = Instant::now().as_secs();
        let mut text = String::new();
        if write!(
            text,
            "up {:02}:{:02}:{:02}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60
        )
        .is_err()
        {
            warn!("Uptime text truncated");
        }

        TEXT_CHANNEL
            .send(TextUpdate {
                row: UPTIME_ROW,
                text,
            })
            .await;
    }
}

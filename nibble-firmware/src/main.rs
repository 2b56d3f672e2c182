//! nibble - HD44780 status display firmware
//!
//! Drives a character LCD on a PCF8574 I2C backpack from an RP2040.
//! Display geometry, encoding and bus settings come from display.toml,
//! validated at build time.
//!
//! Wiring: I2C0 with SDA on GP4 and SCL on GP5.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use nibble_core::DisplayController;
use nibble_drivers::Pcf8574;
use nibble_hal::I2cConfig;

mod channels;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("nibble firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let bus = I2cConfig {
        frequency: config::I2C_FREQUENCY,
    };
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = bus.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    info!(
        "I2C0 at {} Hz (~{} us per byte), expander at {=u8:#x}",
        bus.frequency,
        bus.byte_time_us().unwrap_or(0),
        config::I2C_ADDRESS
    );

    let transport = Pcf8574::new(i2c, config::I2C_ADDRESS);
    let lcd: tasks::Lcd = unwrap!(DisplayController::new(
        Some(transport),
        Delay,
        config::DISPLAY_CONFIG
    ));
    info!("Display initialized");

    spawner.spawn(tasks::display_task(lcd)).unwrap();
    spawner.spawn(tasks::uptime_task()).unwrap();

    info!("All tasks spawned");
}

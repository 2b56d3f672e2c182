//! Hardware transports for HD44780 displays
//!
//! This crate provides concrete implementations of the
//! [`nibble_hal::Transport`] trait:
//!
//! - PCF8574 / PCF8574A I2C port expander (the common LCD "backpack")

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod expander;

pub use expander::{Pcf8574, Pcf8574Error};

//! Nibble Hardware Abstraction Layer
//!
//! This crate defines the boundary between the HD44780 protocol core and
//! whatever carries its bytes to the display: a port expander on I2C, a
//! test double on the host, or a smarter bridge that frames enable pulses
//! itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (nibble-firmware, etc.)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nibble-core (HD44780 protocol)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nibble-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nibble-drivers (PCF8574 on I2C, ...)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::Transport`] - Byte transport to the expander
//! - [`i2c::I2cConfig`] - Bus speed presets for expander links

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod transport;

// Re-export key items at crate root for convenience
pub use i2c::I2cConfig;
pub use transport::{pins, Transport};

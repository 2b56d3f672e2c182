//! Board-agnostic HD44780 protocol core
//!
//! This crate contains everything between "clear the screen" and the raw
//! expander bytes that make the controller do it:
//!
//! - Frame encoding for the 4-bit bus (two interchangeable strategies)
//! - Bounded transfer queue with move-only transfers
//! - Busy flag / address counter polling with a fixed retry bound
//! - The display controller: power-on sequence, operation set, error latch
//! - Configuration type definitions
//!
//! # Pipeline
//!
//! ```text
//!  operation ──► encoder ──► Transfer ──► TransferQueue ──► drain_one()
//!                                                             │
//!                                    transport ◄── frames ◄───┤
//!                                    BusyPoller ◄── wait ◄────┘
//! ```
//!
//! Operations only enqueue. The caller's loop calls
//! [`DisplayController::drain_one`] to deliver one transfer at a time, or
//! [`DisplayController::flush`] to deliver everything synchronously.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod pipeline;
pub mod poller;
pub mod protocol;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{DisplayConfig, Font, Geometry, PollConfig};
pub use controller::{ControllerState, DisplayController, DEFAULT_QUEUE_DEPTH};
pub use error::{ConfigError, DisplayError, ErrorState};
pub use pipeline::{Transfer, TransferQueue};
pub use poller::{BusyPoller, DisplayState};
pub use protocol::{ControlRegister, EncodingStrategy, FrameEncoder, Register};

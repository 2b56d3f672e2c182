//! Port expander transports
//!
//! An expander turns each bus write into a new state of its eight output
//! pins. The HD44780 sees those pins as its 4-bit data bus plus control
//! lines.

pub mod pcf8574;

pub use pcf8574::{Pcf8574, Pcf8574Error};

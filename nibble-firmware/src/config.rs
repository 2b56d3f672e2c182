//! Build-time display configuration
//!
//! Generated by build.rs from display.toml, which is validated before any
//! code is emitted.

use nibble_core::config::{DisplayConfig, Font, Geometry, PollConfig};
use nibble_core::{ControlRegister, EncodingStrategy};

include!(concat!(env!("OUT_DIR"), "/display_config.rs"));

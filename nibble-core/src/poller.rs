//! Busy flag and address counter polling
//!
//! The status word is read through the expander like any other register:
//! release the data lines (drive them high so the expander can sense
//! them), select the instruction register for reading, and sample D4..D7
//! while enable is high, once per nibble.
//!
//! ```text
//! send  DATA|RW|BL            hold
//! send  DATA|RW|BL|E          hold
//! read  -> high nibble        hold
//! send  DATA|RW|BL            hold
//! send  DATA|RW|BL|E          hold
//! read  -> low nibble         hold
//! send  DATA|RW|BL            release
//! ```

use embedded_hal::delay::DelayNs;
use nibble_hal::{pins, Transport};

use crate::config::PollConfig;
use crate::error::DisplayError;
use crate::protocol::commands;

/// Controller status snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayState {
    /// Controller still executing the previous instruction
    pub busy: bool,
    /// Address counter (cursor position in DDRAM)
    pub address: u8,
}

impl DisplayState {
    /// Decode a status word
    pub const fn from_status(status: u8) -> Self {
        Self {
            busy: status & commands::STATUS_BUSY != 0,
            address: status & commands::STATUS_ADDRESS,
        }
    }
}

/// Bounded busy-flag poller
#[derive(Debug, Clone, Copy)]
pub struct BusyPoller {
    config: PollConfig,
}

impl BusyPoller {
    /// Create a poller with the given bounds
    pub const fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Polling bounds in use
    pub const fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Read the status word once
    ///
    /// `bus_bits` are the expander bits that must stay asserted on every
    /// byte (the backlight).
    pub fn poll<T: Transport>(
        &self,
        transport: &mut T,
        bus_bits: u8,
    ) -> Result<DisplayState, DisplayError> {
        let idle = pins::DATA | pins::RW | bus_bits;
        let strobe = idle | pins::E;

        transport
            .send(&[idle, strobe], true)
            .map_err(|_| DisplayError::Transport)?;
        let high = transport.read(true).map_err(|_| DisplayError::Transport)?;

        transport
            .send(&[idle, strobe], true)
            .map_err(|_| DisplayError::Transport)?;
        let low = transport.read(true).map_err(|_| DisplayError::Transport)?;

        transport
            .send(&[idle], false)
            .map_err(|_| DisplayError::Transport)?;

        if transport.is_error() {
            return Err(DisplayError::Transport);
        }

        let status = (high & pins::DATA) | ((low & pins::DATA) >> 4);
        Ok(DisplayState::from_status(status))
    }

    /// Poll until the busy flag clears
    ///
    /// Issues at most `max_attempts` polls, `interval_us` apart. Running out
    /// of attempts returns [`DisplayError::Freeze`]: the controller is
    /// presumed unresponsive and retrying is the caller's decision.
    pub fn wait_ready<T: Transport, D: DelayNs>(
        &self,
        transport: &mut T,
        delay: &mut D,
        bus_bits: u8,
    ) -> Result<DisplayState, DisplayError> {
        for attempt in 0..self.config.max_attempts {
            let state = self.poll(transport, bus_bits)?;
            if !state.busy {
                return Ok(state);
            }
            if attempt + 1 < self.config.max_attempts {
                delay.delay_us(self.config.interval_us);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "HD44780 still busy after {} polls",
            self.config.max_attempts
        );

        Err(DisplayError::Freeze)
    }
}

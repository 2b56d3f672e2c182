//! Inter-task communication channels
//!
//! The display task owns the controller; everything else reaches the
//! display through these.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use nibble_core::config::MAX_COLUMNS;

/// Pending row updates
const TEXT_CHANNEL_SIZE: usize = 4;

/// Replace the contents of one display row
#[derive(Debug, Clone, defmt::Format)]
pub struct TextUpdate {
    /// Target row
    pub row: u8,
    /// New text, padded with blanks to the display width when drawn
    pub text: String<{ MAX_COLUMNS as usize }>,
}

/// Row updates for the display task
pub static TEXT_CHANNEL: Channel<CriticalSectionRawMutex, TextUpdate, TEXT_CHANNEL_SIZE> =
    Channel::new();

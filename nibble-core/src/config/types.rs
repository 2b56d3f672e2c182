//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::MAX_TRANSFER_LEN;
use crate::protocol::{commands, ControlRegister, EncodingStrategy, FrameEncoder};

/// Maximum rows supported by the HD44780 address map
pub const MAX_ROWS: usize = 4;

/// Maximum characters per row
pub const MAX_COLUMNS: u8 = 40;

/// Display data RAM size in characters
pub const DDRAM_SIZE: u16 = 80;

/// Highest valid DDRAM address + 1
const DDRAM_ADDR_LIMIT: u16 = 0x80;

/// Character font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Font {
    /// 5x8 dots (all multi-line modules)
    #[default]
    Dots5x8,
    /// 5x10 dots (single-line modules only)
    Dots5x10,
}

/// Display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    /// Characters per row
    pub columns: u8,
    /// Number of rows
    pub rows: u8,
}

impl Geometry {
    /// Create a new geometry
    pub const fn new(columns: u8, rows: u8) -> Self {
        Self { columns, rows }
    }

    /// Row base addresses from the HD44780 datasheet
    ///
    /// Rows 0 and 1 start at 0x00 and 0x40; four-row modules continue
    /// rows 0 and 1 into rows 2 and 3, so those start one row length later.
    pub const fn datasheet_row_offsets(&self) -> [u8; MAX_ROWS] {
        [0x00, 0x40, self.columns, self.columns.saturating_add(0x40)]
    }

    /// Total character cells
    pub const fn cells(&self) -> u16 {
        self.columns as u16 * self.rows as u16
    }
}

/// Busy-flag polling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PollConfig {
    /// Status reads before the controller is declared frozen
    pub max_attempts: u8,
    /// Pause between status reads in microseconds
    pub interval_us: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// 100 attempts, 5 µs apart
    pub const fn new() -> Self {
        Self {
            max_attempts: 100,
            interval_us: 5,
        }
    }
}

/// Complete display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Columns and rows
    pub geometry: Geometry,
    /// Character font
    pub font: Font,
    /// How frames are laid out on the bus
    pub strategy: EncodingStrategy,
    /// DDRAM base address of each row (entry 0 must be 0)
    pub row_offsets: [u8; MAX_ROWS],
    /// Pending transfers accepted before operations are rejected
    pub queue_capacity: u8,
    /// Payload bytes per transfer for text writes
    pub max_chunk: u8,
    /// Display control and backlight state after initialisation
    pub control: ControlRegister,
    /// Busy polling bounds
    pub poll: PollConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::lcd1602()
    }
}

impl DisplayConfig {
    /// Default queue capacity
    pub const DEFAULT_QUEUE_CAPACITY: u8 = 16;

    /// Build a configuration for the given geometry with defaults elsewhere
    pub const fn with_geometry(geometry: Geometry) -> Self {
        Self {
            geometry,
            font: Font::Dots5x8,
            strategy: EncodingStrategy::FullPulse,
            row_offsets: geometry.datasheet_row_offsets(),
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            max_chunk: (MAX_TRANSFER_LEN / 6) as u8,
            control: ControlRegister::new(),
            poll: PollConfig::new(),
        }
    }

    /// 16 columns, 2 rows
    pub const fn lcd1602() -> Self {
        Self::with_geometry(Geometry::new(16, 2))
    }

    /// 16 columns, 4 rows
    pub const fn lcd1604() -> Self {
        Self::with_geometry(Geometry::new(16, 4))
    }

    /// 20 columns, 4 rows
    pub const fn lcd2004() -> Self {
        Self::with_geometry(Geometry::new(20, 4))
    }

    /// Largest chunk that fits a transfer buffer with this strategy
    pub fn max_chunk_limit(&self) -> usize {
        MAX_TRANSFER_LEN / self.strategy.frame_len()
    }

    /// Function set instruction for this geometry and font
    pub const fn function_set(&self) -> u8 {
        let mut cmd = commands::FUNCTION_SET;
        if self.geometry.rows > 1 {
            cmd |= commands::FUNCTION_2LINE;
        }
        if matches!(self.font, Font::Dots5x10) {
            cmd |= commands::FUNCTION_5X10;
        }
        cmd
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Geometry { columns, rows } = self.geometry;
        if rows == 0
            || rows as usize > MAX_ROWS
            || columns == 0
            || columns > MAX_COLUMNS
            || self.geometry.cells() > DDRAM_SIZE
        {
            return Err(ConfigError::Geometry);
        }

        if matches!(self.font, Font::Dots5x10) && rows > 1 {
            return Err(ConfigError::FontUnsupported);
        }

        if self.max_chunk == 0 || self.max_chunk as usize > self.max_chunk_limit() {
            return Err(ConfigError::ChunkSize);
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::QueueCapacity);
        }

        if self.poll.max_attempts == 0 {
            return Err(ConfigError::PollBound);
        }

        if self.row_offsets[0] != 0 {
            return Err(ConfigError::RowOffsets);
        }
        for &offset in &self.row_offsets[..rows as usize] {
            if offset as u16 + columns as u16 > DDRAM_ADDR_LIMIT {
                return Err(ConfigError::RowOffsets);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for config in [
            DisplayConfig::lcd1602(),
            DisplayConfig::lcd1604(),
            DisplayConfig::lcd2004(),
        ] {
            assert_eq!(config.validate(), Ok(()));
        }
    }

    #[test]
    fn test_datasheet_offsets() {
        assert_eq!(
            Geometry::new(20, 4).datasheet_row_offsets(),
            [0x00, 0x40, 0x14, 0x54]
        );
        assert_eq!(
            Geometry::new(16, 4).datasheet_row_offsets(),
            [0x00, 0x40, 0x10, 0x50]
        );
    }

    #[test]
    fn test_function_set() {
        assert_eq!(DisplayConfig::lcd1602().function_set(), 0x28);

        let mut single = DisplayConfig::with_geometry(Geometry::new(16, 1));
        assert_eq!(single.function_set(), 0x20);
        single.font = Font::Dots5x10;
        assert_eq!(single.function_set(), 0x24);
    }

    #[test]
    fn test_geometry_limits() {
        let mut config = DisplayConfig::lcd1602();
        config.geometry = Geometry::new(40, 4);
        assert_eq!(config.validate(), Err(ConfigError::Geometry));

        config.geometry = Geometry::new(16, 0);
        assert_eq!(config.validate(), Err(ConfigError::Geometry));

        config.geometry = Geometry::new(40, 2);
        config.row_offsets = config.geometry.datasheet_row_offsets();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_font_needs_single_line() {
        let mut config = DisplayConfig::lcd1602();
        config.font = Font::Dots5x10;
        assert_eq!(config.validate(), Err(ConfigError::FontUnsupported));
    }

    #[test]
    fn test_chunk_limit_follows_strategy() {
        let mut config = DisplayConfig::lcd1602();
        assert_eq!(config.max_chunk_limit(), 5);

        config.max_chunk = 16;
        assert_eq!(config.validate(), Err(ConfigError::ChunkSize));

        config.strategy = EncodingStrategy::TransportPulsed;
        assert_eq!(config.max_chunk_limit(), 16);
        assert_eq!(config.validate(), Ok(()));

        config.max_chunk = 0;
        assert_eq!(config.validate(), Err(ConfigError::ChunkSize));
    }

    #[test]
    fn test_row_offsets_checked() {
        let mut config = DisplayConfig::lcd1602();
        config.row_offsets[0] = 0x10;
        assert_eq!(config.validate(), Err(ConfigError::RowOffsets));

        let mut config = DisplayConfig::lcd1602();
        config.row_offsets[1] = 0x78;
        assert_eq!(config.validate(), Err(ConfigError::RowOffsets));

        // Unused rows are not checked
        let mut config = DisplayConfig::lcd1602();
        config.row_offsets[3] = 0xFF;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let mut config = DisplayConfig::lcd1602();
        config.queue_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::QueueCapacity));

        let mut config = DisplayConfig::lcd1602();
        config.poll.max_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::PollBound));
    }
}

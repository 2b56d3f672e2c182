//! I2C bus configuration
//!
//! Bus speed settings shared by the expander drivers and the firmware
//! that brings up the I2C peripheral.

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz), the PCF8574 maximum
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Time to clock one byte plus its ACK bit, in microseconds
    ///
    /// Useful for estimating how long a status poll occupies the bus.
    /// `None` for a zero frequency.
    pub const fn byte_time_us(&self) -> Option<u32> {
        // 9 clock cycles per byte (8 data + ACK)
        (9 * 1_000_000u32).checked_div(self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard_mode() {
        assert_eq!(I2cConfig::default(), I2cConfig::STANDARD);
    }

    #[test]
    fn test_byte_time() {
        assert_eq!(I2cConfig::STANDARD.byte_time_us(), Some(90));
        assert_eq!(I2cConfig { frequency: 400_000 }.byte_time_us(), Some(22));
    }

    #[test]
    fn test_byte_time_zero_frequency() {
        assert_eq!(I2cConfig { frequency: 0 }.byte_time_us(), None);
    }
}

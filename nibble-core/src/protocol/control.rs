//! Display control register
//!
//! Shadow copy of the controller's display on/off control flags plus the
//! backlight line, which is not an HD44780 register at all but an expander
//! output that rides along on every bus byte.

use nibble_hal::pins;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::commands;

/// Display control flags and backlight state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlRegister {
    /// Display output enabled
    pub display_on: bool,
    /// Underline cursor visible
    pub cursor_on: bool,
    /// Blinking block cursor
    pub blink_on: bool,
    /// Backlight lit
    pub backlight: bool,
}

impl Default for ControlRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlRegister {
    /// Display on with cursor, no blink, backlight on
    pub const fn new() -> Self {
        Self {
            display_on: true,
            cursor_on: true,
            blink_on: false,
            backlight: true,
        }
    }

    /// Display control instruction for the current flags
    pub const fn command(&self) -> u8 {
        let mut cmd = commands::DISPLAY_CONTROL;
        if self.display_on {
            cmd |= commands::CONTROL_DISPLAY_ON;
        }
        if self.cursor_on {
            cmd |= commands::CONTROL_CURSOR_ON;
        }
        if self.blink_on {
            cmd |= commands::CONTROL_BLINK_ON;
        }
        cmd
    }

    /// Expander bits contributed to every bus byte
    pub const fn bus_bits(&self) -> u8 {
        if self.backlight {
            pins::BACKLIGHT
        } else {
            0
        }
    }

    /// Copy with display power and backlight both set to `on`
    pub const fn with_power(self, on: bool) -> Self {
        Self {
            display_on: on,
            backlight: on,
            ..self
        }
    }

    /// Check if display power and backlight both equal `on`
    pub const fn is_powered(&self, on: bool) -> bool {
        self.display_on == on && self.backlight == on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let ctrl = ControlRegister::new();
        assert_eq!(ctrl.command(), 0x0E);
        assert_eq!(ctrl.bus_bits(), 0x08);
    }

    #[test]
    fn test_all_flags() {
        let ctrl = ControlRegister {
            display_on: true,
            cursor_on: true,
            blink_on: true,
            backlight: false,
        };
        assert_eq!(ctrl.command(), 0x0F);
        assert_eq!(ctrl.bus_bits(), 0);
    }

    #[test]
    fn test_power_toggle() {
        let ctrl = ControlRegister::new().with_power(false);
        assert_eq!(ctrl.command(), 0x0A); // cursor flag survives
        assert!(ctrl.is_powered(false));
        assert!(!ctrl.is_powered(true));

        // Half-on is neither
        let half = ControlRegister {
            backlight: false,
            ..ControlRegister::new()
        };
        assert!(!half.is_powered(true));
        assert!(!half.is_powered(false));
    }
}

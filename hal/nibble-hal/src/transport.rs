//! Expander transport abstraction
//!
//! A transport moves raw expander port bytes to and from the display.
//! Each byte written drives all eight expander outputs at once, so the
//! HD44780 control lines and the backlight share the byte with the data
//! nibble.

/// Expander port bit assignments
///
/// Matches the common PCF8574 backpack wiring: `[D7 D6 D5 D4 BL E RW RS]`.
pub mod pins {
    /// Register select (0 = instruction, 1 = data)
    pub const RS: u8 = 0x01;
    /// Read/write (0 = write, 1 = read)
    pub const RW: u8 = 0x02;
    /// Enable strobe, latches the data nibble on the falling edge
    pub const E: u8 = 0x04;
    /// Backlight transistor
    pub const BACKLIGHT: u8 = 0x08;
    /// Data lines D4..D7
    pub const DATA: u8 = 0xF0;
}

/// Byte transport to the port expander
///
/// `hold_bus` tells the transport that another call belonging to the same
/// exchange follows immediately, so the bus transaction may stay open.
/// Implementations that cannot keep a transaction open may ignore it.
pub trait Transport {
    /// Error type for transport operations
    type Error;

    /// Write raw port bytes, in order, with no added framing
    fn send(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error>;

    /// Sample the expander port once
    fn read(&mut self, hold_bus: bool) -> Result<u8, Self::Error>;

    /// Sticky fault flag for transports that detect errors out of band
    fn is_error(&self) -> bool {
        false
    }

    /// Write port bytes, framing each one as an enable burst
    ///
    /// Every byte `b` goes out as `b`, `b | E`, `b` so the controller
    /// latches it. The transport-pulsed encoding relies on this; transports
    /// that can frame in hardware or in a single bus write should override
    /// the default, which expands the bursts through [`Transport::send`].
    fn send_pulsed(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error> {
        let last = bytes.len().saturating_sub(1);
        for (i, &byte) in bytes.iter().enumerate() {
            let burst = [byte & !pins::E, byte | pins::E, byte & !pins::E];
            self.send(&burst, hold_bus || i < last)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error> {
        T::send(self, bytes, hold_bus)
    }

    fn read(&mut self, hold_bus: bool) -> Result<u8, Self::Error> {
        T::read(self, hold_bus)
    }

    fn is_error(&self) -> bool {
        T::is_error(self)
    }

    fn send_pulsed(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error> {
        T::send_pulsed(self, bytes, hold_bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Records every send call as (bytes, hold_bus)
    struct Recorder {
        calls: [([u8; 3], usize, bool); 8],
        count: usize,
    }

    impl Transport for Recorder {
        type Error = ();

        fn send(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), ()> {
            let mut buf = [0u8; 3];
            buf[..bytes.len()].copy_from_slice(bytes);
            self.calls[self.count] = (buf, bytes.len(), hold_bus);
            self.count += 1;
            Ok(())
        }

        fn read(&mut self, _hold_bus: bool) -> Result<u8, ()> {
            Ok(0)
        }
    }

    #[test]
    fn test_default_send_pulsed_frames_each_byte() {
        let mut rec = Recorder {
            calls: [([0; 3], 0, false); 8],
            count: 0,
        };

        rec.send_pulsed(&[0x29, 0x89], false).unwrap();

        assert_eq!(rec.count, 2);
        assert_eq!(rec.calls[0], ([0x29, 0x2D, 0x29], 3, true));
        // Bus released only after the last burst
        assert_eq!(rec.calls[1], ([0x89, 0x8D, 0x89], 3, false));
    }

    #[test]
    fn test_send_pulsed_honours_hold() {
        let mut rec = Recorder {
            calls: [([0; 3], 0, false); 8],
            count: 0,
        };

        rec.send_pulsed(&[0x08], true).unwrap();
        assert!(rec.calls[0].2);
    }

    #[test]
    fn test_pin_map_is_disjoint() {
        let all = [pins::RS, pins::RW, pins::E, pins::BACKLIGHT, pins::DATA];
        let mut seen = 0u8;
        for bits in all {
            assert_eq!(seen & bits, 0);
            seen |= bits;
        }
        assert_eq!(seen, 0xFF);
    }
}

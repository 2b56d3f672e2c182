//! PCF8574 / PCF8574A I2C port expander
//!
//! The PCF8574 has no registers: writing a byte sets all eight
//! quasi-bidirectional pins, reading a byte samples them. Pins written
//! high are weak pull-ups, which is what lets the HD44780 drive D4..D7
//! during a status read.
//!
//! Bytes sent with `hold_bus` set are buffered and go out together with
//! the next write, or in front of the next read as a single
//! write-then-read transaction, so a whole nibble exchange costs one bus
//! transaction.
//!
//! # Usage
//!
//! ```ignore
//! let transport = Pcf8574::new(i2c, Pcf8574::<I2c>::ADDRESS);
//! let lcd = DisplayController::new(Some(transport), delay, DisplayConfig::lcd1602())?;
//! ```

use embedded_hal::i2c::{I2c, Operation};
use heapless::Vec;
use nibble_hal::{pins, Transport};

/// Bytes buffered before a held exchange is forced onto the bus
const PENDING_LEN: usize = 48;

/// PCF8574 transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pcf8574Error<E> {
    /// The bus reported an error
    I2c(E),
    /// An earlier bus error has not been cleared yet
    Faulted,
}

/// PCF8574 backpack transport
pub struct Pcf8574<I2C> {
    i2c: I2C,
    address: u8,
    /// Bytes held back for the current exchange
    pending: Vec<u8, PENDING_LEN>,
    /// Sticky bus fault
    fault: bool,
}

impl<I2C: I2c> Pcf8574<I2C> {
    /// Default address of PCF8574 backpacks (A0..A2 high)
    pub const ADDRESS: u8 = 0x27;

    /// Default address of PCF8574A backpacks (A0..A2 high)
    pub const ADDRESS_A: u8 = 0x3F;

    /// Create a transport for the expander at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            pending: Vec::new(),
            fault: false,
        }
    }

    /// 7-bit bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Bytes waiting for the end of the current exchange
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Forget a latched bus fault and anything still buffered
    pub fn clear_fault(&mut self) {
        self.fault = false;
        self.pending.clear();
    }

    /// Release the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn check(&self) -> Result<(), Pcf8574Error<I2C::Error>> {
        if self.fault {
            return Err(Pcf8574Error::Faulted);
        }
        Ok(())
    }

    fn latch_fault(&mut self, error: I2C::Error) -> Pcf8574Error<I2C::Error> {
        #[cfg(feature = "defmt")]
        defmt::warn!("PCF8574 at {=u8:#x}: bus error", self.address);

        self.fault = true;
        Pcf8574Error::I2c(error)
    }

    fn push(&mut self, byte: u8) -> Result<(), Pcf8574Error<I2C::Error>> {
        if self.pending.is_full() {
            self.write_pending()?;
        }
        // Room after the flush above
        self.pending.push(byte).ok();
        Ok(())
    }

    fn write_pending(&mut self) -> Result<(), Pcf8574Error<I2C::Error>> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let result = self.i2c.write(self.address, &self.pending);
        self.pending.clear();
        result.map_err(|e| self.latch_fault(e))
    }
}

impl<I2C: I2c> Transport for Pcf8574<I2C> {
    type Error = Pcf8574Error<I2C::Error>;

    fn send(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error> {
        self.check()?;
        for &byte in bytes {
            self.push(byte)?;
        }
        if !hold_bus {
            self.write_pending()?;
        }
        Ok(())
    }

    fn read(&mut self, _hold_bus: bool) -> Result<u8, Self::Error> {
        self.check()?;

        let mut buf = [0u8; 1];
        let result = if self.pending.is_empty() {
            self.i2c.read(self.address, &mut buf)
        } else {
            self.i2c.transaction(
                self.address,
                &mut [
                    Operation::Write(self.pending.as_slice()),
                    Operation::Read(&mut buf),
                ],
            )
        };
        self.pending.clear();
        result.map_err(|e| self.latch_fault(e))?;

        Ok(buf[0])
    }

    fn is_error(&self) -> bool {
        self.fault
    }

    /// Expands each byte into an enable burst and writes the whole run at
    /// once
    fn send_pulsed(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), Self::Error> {
        self.check()?;
        for &byte in bytes {
            for step in [byte & !pins::E, byte | pins::E, byte & !pins::E] {
                self.push(step)?;
            }
        }
        if !hold_bus {
            self.write_pending()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };
    use nibble_core::{DisplayConfig, DisplayController, EncodingStrategy};
    use std::vec;
    use std::vec::Vec as StdVec;

    const ADDR: u8 = 0x27;
    const BL: u8 = pins::BACKLIGHT;
    const E: u8 = pins::E;

    fn expander(expectations: &[I2cTransaction]) -> (Pcf8574<I2cMock>, I2cMock) {
        let i2c = I2cMock::new(expectations);
        (Pcf8574::new(i2c.clone(), ADDR), i2c)
    }

    /// One idle status poll: two buffered strobes, each sampled in the same
    /// transaction, then the release byte
    fn ready_poll() -> StdVec<I2cTransaction> {
        let idle = pins::DATA | pins::RW | BL;
        let strobe = idle | E;
        let mut poll = StdVec::new();
        for _ in 0..2 {
            poll.push(I2cTransaction::transaction_start(ADDR));
            poll.push(I2cTransaction::write(ADDR, vec![idle, strobe]));
            // D4..D7 pulled low by the controller: not busy, address 0
            poll.push(I2cTransaction::read(ADDR, vec![0x0F]));
            poll.push(I2cTransaction::transaction_end(ADDR));
        }
        poll.push(I2cTransaction::write(ADDR, vec![idle]));
        poll
    }

    fn reset_nibble(nibble: u8) -> I2cTransaction {
        let b = nibble | BL;
        I2cTransaction::write(ADDR, vec![b, b | E, b])
    }

    /// One full-pulse frame followed by its readiness check
    fn instruction(value: u8, rs: u8) -> StdVec<I2cTransaction> {
        let high = (value & 0xF0) | BL | rs;
        let low = (value << 4) | BL | rs;
        let mut tx = vec![I2cTransaction::write(
            ADDR,
            vec![high, high | E, high, low, low | E, low],
        )];
        tx.extend(ready_poll());
        tx
    }

    fn power_on() -> StdVec<I2cTransaction> {
        let mut tx = vec![
            reset_nibble(0x30),
            reset_nibble(0x30),
            reset_nibble(0x30),
            reset_nibble(0x20),
        ];
        tx.extend(ready_poll());
        for cmd in [0x28, 0x0E, 0x06, 0x01, 0x02] {
            tx.extend(instruction(cmd, 0));
        }
        tx
    }

    #[test]
    fn test_held_bytes_go_out_in_one_write() {
        let (mut pcf, mut i2c) =
            expander(&[I2cTransaction::write(ADDR, vec![0x18, 0x1C, 0x18, 0x08])]);

        pcf.send(&[0x18, 0x1C, 0x18], true).unwrap();
        assert_eq!(pcf.pending(), 3);
        pcf.send(&[0x08], false).unwrap();
        assert_eq!(pcf.pending(), 0);

        i2c.done();
    }

    #[test]
    fn test_read_joins_pending_write() {
        let (mut pcf, mut i2c) = expander(&[
            I2cTransaction::transaction_start(ADDR),
            I2cTransaction::write(ADDR, vec![0xFA, 0xFE]),
            I2cTransaction::read(ADDR, vec![0x9F]),
            I2cTransaction::transaction_end(ADDR),
            I2cTransaction::read(ADDR, vec![0x3F]),
        ]);

        pcf.send(&[0xFA, 0xFE], true).unwrap();
        assert_eq!(pcf.read(true), Ok(0x9F));

        // Nothing pending: plain read
        assert_eq!(pcf.read(false), Ok(0x3F));

        i2c.done();
    }

    #[test]
    fn test_send_pulsed_single_write() {
        let (mut pcf, mut i2c) = expander(&[I2cTransaction::write(
            ADDR,
            vec![0x49, 0x4D, 0x49, 0x89, 0x8D, 0x89],
        )]);

        pcf.send_pulsed(&[0x49, 0x89], false).unwrap();

        i2c.done();
    }

    #[test]
    fn test_overflow_flushes_early() {
        let first = vec![0xAA; PENDING_LEN];
        let (mut pcf, mut i2c) = expander(&[
            I2cTransaction::write(ADDR, first.clone()),
            I2cTransaction::write(ADDR, vec![0x55]),
        ]);

        pcf.send(&first, true).unwrap();
        pcf.send(&[0x55], false).unwrap();

        i2c.done();
    }

    #[test]
    fn test_bus_error_is_sticky() {
        let (mut pcf, mut i2c) = expander(&[
            I2cTransaction::write(ADDR, vec![0x08]).with_error(ErrorKind::Other),
            I2cTransaction::write(ADDR, vec![0x00]),
        ]);

        assert_eq!(
            pcf.send(&[0x08], false),
            Err(Pcf8574Error::I2c(ErrorKind::Other))
        );
        assert!(pcf.is_error());

        // Rejected without touching the bus
        assert_eq!(pcf.send(&[0x08], false), Err(Pcf8574Error::Faulted));
        assert_eq!(pcf.read(false), Err(Pcf8574Error::Faulted));

        pcf.clear_fault();
        assert!(!pcf.is_error());
        pcf.send(&[0x00], false).unwrap();

        i2c.done();
    }

    #[test]
    fn test_display_power_on_over_i2c() {
        let mut expected = power_on();
        expected.extend(instruction(0x01, 0));
        expected.extend(instruction(b'A', pins::RS));

        let (pcf, mut i2c) = expander(&expected);
        let mut lcd: DisplayController<_, _> =
            DisplayController::new(Some(pcf), NoopDelay::new(), DisplayConfig::lcd1602()).unwrap();

        lcd.clear().unwrap();
        lcd.write_bytes(b"A").unwrap();
        lcd.flush().unwrap();

        i2c.done();
    }

    #[test]
    fn test_transport_pulsed_over_i2c() {
        let mut config = DisplayConfig::lcd1602();
        config.strategy = EncodingStrategy::TransportPulsed;
        config.max_chunk = 16;

        let mut expected = power_on();
        // Each two-byte frame is expanded into one six-byte write
        let high = 0x40 | BL | pins::RS;
        let low = 0x20 | BL | pins::RS;
        expected.push(I2cTransaction::write(
            ADDR,
            vec![high, high | E, high, low, low | E, low],
        ));
        expected.extend(ready_poll());

        let (pcf, mut i2c) = expander(&expected);
        let mut lcd: DisplayController<_, _> =
            DisplayController::new(Some(pcf), NoopDelay::new(), config).unwrap();

        lcd.write_bytes(b"B").unwrap();
        lcd.flush().unwrap();

        i2c.done();
    }

    #[test]
    fn test_bus_failure_surfaces_as_transport_error() {
        let mut expected = power_on();
        expected.push(
            I2cTransaction::write(ADDR, vec![0x08, 0x0C, 0x08, 0x18, 0x1C, 0x18])
                .with_error(ErrorKind::Other),
        );

        let (pcf, mut i2c) = expander(&expected);
        let mut lcd: DisplayController<_, _> =
            DisplayController::new(Some(pcf), NoopDelay::new(), DisplayConfig::lcd1602()).unwrap();

        lcd.clear().unwrap();
        assert_eq!(lcd.flush(), Err(nibble_core::DisplayError::Transport));
        assert_eq!(lcd.error_code(), 99);
        assert!(lcd.transport().is_error());

        i2c.done();
    }
}

//! Frame encoding for the 4-bit bus
//!
//! A frame is the expander byte sequence that delivers one 8-bit value to
//! the controller: the high nibble first, then the low nibble, both on
//! D4..D7, each latched by an enable pulse.
//!
//! Two strategies exist because bridges differ in who generates the enable
//! pulse:
//!
//! | strategy          | bytes | enable pulse made by           |
//! |-------------------|-------|--------------------------------|
//! | [`FullPulse`]       | 6     | the encoder (low, high, low)   |
//! | [`TransportPulsed`] | 2     | the transport (`send_pulsed`)  |

use heapless::Vec;
use nibble_hal::pins;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ControlRegister;

/// Largest frame any strategy produces
pub const MAX_FRAME_LEN: usize = 6;

/// Encoded bytes for one payload value
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Controller register addressed by a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Instruction register (RS low)
    Command,
    /// Data register (RS high)
    Data,
}

impl Register {
    /// Expander bits selecting this register
    pub const fn bits(self) -> u8 {
        match self {
            Register::Command => 0,
            Register::Data => pins::RS,
        }
    }
}

/// Split a payload into its two bus nibbles, both on the high four lines
pub const fn nibbles(payload: u8) -> (u8, u8) {
    (payload & 0xF0, (payload & 0x0F) << 4)
}

/// Common contract of the encoding strategies
///
/// Encoding is pure: the same inputs always give the same bytes.
pub trait FrameEncoder {
    /// Number of bytes in every frame this encoder produces
    fn frame_len(&self) -> usize;

    /// Encode one payload value for the given register
    fn encode(&self, payload: u8, register: Register, control: &ControlRegister) -> Frame;

    /// Recover payload values from a run of whole frames
    fn decode<'a>(&self, bytes: &'a [u8]) -> Decode<'a> {
        decode(bytes, self.frame_len())
    }
}

/// Encoder that frames every nibble with its own enable pulse
///
/// Use with transports that write bytes verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullPulse;

impl FrameEncoder for FullPulse {
    fn frame_len(&self) -> usize {
        6
    }

    fn encode(&self, payload: u8, register: Register, control: &ControlRegister) -> Frame {
        let bits = control.bus_bits() | register.bits();
        let (high, low) = nibbles(payload);

        let bytes = [
            high | bits,
            high | bits | pins::E,
            high | bits,
            low | bits,
            low | bits | pins::E,
            low | bits,
        ];

        let mut frame = Frame::new();
        frame.extend_from_slice(&bytes).ok();
        frame
    }
}

/// Encoder that emits bare nibbles
///
/// Precondition: the transport must frame each byte as an enable burst,
/// which is what [`Transport::send_pulsed`](nibble_hal::Transport::send_pulsed)
/// does. Sending these frames with a plain `send` latches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportPulsed;

impl FrameEncoder for TransportPulsed {
    fn frame_len(&self) -> usize {
        2
    }

    fn encode(&self, payload: u8, register: Register, control: &ControlRegister) -> Frame {
        let bits = control.bus_bits() | register.bits();
        let (high, low) = nibbles(payload);

        let mut frame = Frame::new();
        frame.extend_from_slice(&[high | bits, low | bits]).ok();
        frame
    }
}

/// Runtime-selected encoding strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EncodingStrategy {
    /// Six bytes per value, enable pulses in the data
    #[default]
    FullPulse,
    /// Two bytes per value, enable pulses by the transport
    TransportPulsed,
}

impl EncodingStrategy {
    /// Check if frames must be sent with `send_pulsed`
    pub const fn needs_transport_pulses(&self) -> bool {
        matches!(self, EncodingStrategy::TransportPulsed)
    }
}

impl FrameEncoder for EncodingStrategy {
    fn frame_len(&self) -> usize {
        match self {
            EncodingStrategy::FullPulse => FullPulse.frame_len(),
            EncodingStrategy::TransportPulsed => TransportPulsed.frame_len(),
        }
    }

    fn encode(&self, payload: u8, register: Register, control: &ControlRegister) -> Frame {
        match self {
            EncodingStrategy::FullPulse => FullPulse.encode(payload, register, control),
            EncodingStrategy::TransportPulsed => TransportPulsed.encode(payload, register, control),
        }
    }
}

/// Iterator over payload values recovered from encoded frames
///
/// Trailing bytes that do not form a whole frame are ignored.
pub struct Decode<'a> {
    frames: core::slice::ChunksExact<'a, u8>,
    low_index: usize,
}

impl Iterator for Decode<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.frames
            .next()
            .map(|f| (f[0] & pins::DATA) | ((f[self.low_index] & pins::DATA) >> 4))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

/// Decode frames of `frame_len` bytes back into payload values
///
/// The high nibble sits in the first byte of a frame and the low nibble in
/// the first byte of its second half.
pub fn decode(bytes: &[u8], frame_len: usize) -> Decode<'_> {
    let frame_len = frame_len.max(2);
    Decode {
        frames: bytes.chunks_exact(frame_len),
        low_index: frame_len / 2,
    }
}

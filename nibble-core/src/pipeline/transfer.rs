//! Transfer records

use heapless::Vec;

use crate::protocol::{ControlRegister, FrameEncoder, Register};

/// Byte capacity of one transfer
///
/// Five characters with the six-byte encoding, sixteen with the two-byte
/// one.
pub const MAX_TRANSFER_LEN: usize = 32;

/// Frames did not fit the transfer buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferFull;

/// Encoded bytes bound for one register
///
/// Deliberately not `Clone`: every transfer is delivered or dropped once.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transfer {
    kind: Register,
    bytes: Vec<u8, MAX_TRANSFER_LEN>,
}

impl Transfer {
    /// Create an empty transfer
    pub const fn new(kind: Register) -> Self {
        Self {
            kind,
            bytes: Vec::new(),
        }
    }

    /// Encode a run of payload values into one transfer
    pub fn encode<E: FrameEncoder>(
        encoder: &E,
        kind: Register,
        control: &ControlRegister,
        payload: &[u8],
    ) -> Result<Self, TransferFull> {
        let mut transfer = Self::new(kind);
        for &value in payload {
            transfer.push_frame(&encoder.encode(value, kind, control))?;
        }
        Ok(transfer)
    }

    /// Append one encoded frame
    ///
    /// On failure the transfer is left unchanged.
    pub fn push_frame(&mut self, frame: &[u8]) -> Result<(), TransferFull> {
        if self.bytes.len() + frame.len() > MAX_TRANSFER_LEN {
            return Err(TransferFull);
        }
        self.bytes.extend_from_slice(frame).map_err(|_| TransferFull)
    }

    /// Register this transfer addresses
    pub fn kind(&self) -> Register {
        self.kind
    }

    /// Encoded bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the transfer carries no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Iterate over whole frames of `frame_len` bytes
    pub fn frames(&self, frame_len: usize) -> core::slice::ChunksExact<'_, u8> {
        self.bytes.chunks_exact(frame_len.max(1))
    }
}

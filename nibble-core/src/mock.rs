//! Test doubles for the transport and delay

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use nibble_hal::Transport;

/// One recorded bus write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub bytes: Vec<u8>,
    pub hold_bus: bool,
    pub pulsed: bool,
}

/// Scriptable transport that emulates the controller's status nibbles
///
/// Each status poll consumes one word from `statuses`; once the script is
/// exhausted `idle_status` is reported.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Vec<Sent>,
    pub statuses: VecDeque<u8>,
    pub idle_status: u8,
    pub reads: usize,
    /// Fail every send once this many sends succeeded
    pub fail_after: Option<usize>,
    current_status: u8,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller that never clears its busy flag
    pub fn always_busy() -> Self {
        Self {
            idle_status: 0x80,
            ..Self::default()
        }
    }

    /// Number of complete status polls seen
    pub fn polls(&self) -> usize {
        self.reads / 2
    }

    /// Recorded writes excluding the status-read traffic
    pub fn writes(&self) -> Vec<&Sent> {
        self.sent
            .iter()
            .filter(|s| s.bytes.iter().all(|b| b & nibble_hal::pins::RW == 0))
            .collect()
    }

    fn record(&mut self, bytes: &[u8], hold_bus: bool, pulsed: bool) -> Result<(), ()> {
        if let Some(limit) = self.fail_after {
            if self.sent.len() >= limit {
                return Err(());
            }
        }
        self.sent.push(Sent {
            bytes: bytes.to_vec(),
            hold_bus,
            pulsed,
        });
        Ok(())
    }
}

impl Transport for MockTransport {
    type Error = ();

    fn send(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), ()> {
        self.record(bytes, hold_bus, false)
    }

    fn read(&mut self, _hold_bus: bool) -> Result<u8, ()> {
        let high = self.reads % 2 == 0;
        self.reads += 1;
        if high {
            self.current_status = self.statuses.pop_front().unwrap_or(self.idle_status);
            // Input lines float high except where the controller drives them
            Ok((self.current_status & 0xF0) | 0x0F)
        } else {
            Ok((self.current_status << 4) | 0x0F)
        }
    }

    fn send_pulsed(&mut self, bytes: &[u8], hold_bus: bool) -> Result<(), ()> {
        self.record(bytes, hold_bus, true)
    }
}

/// Delay that only adds up what it was asked to wait
#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

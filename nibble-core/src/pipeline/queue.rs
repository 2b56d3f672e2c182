//! Bounded transfer queue
//!
//! Strict FIFO: display output depends on instruction order, so transfers
//! are never reordered. Storage is fixed at compile time (`N`); the
//! configured capacity may be smaller.

use heapless::Deque;

use crate::error::{ConfigError, DisplayError};

use super::Transfer;

/// Bounded FIFO of pending transfers
pub struct TransferQueue<const N: usize> {
    items: Deque<Transfer, N>,
    capacity: usize,
}

impl<const N: usize> TransferQueue<N> {
    /// Create a queue accepting at most `capacity` transfers
    ///
    /// `capacity` must be between 1 and `N`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 || capacity > N {
            return Err(ConfigError::QueueCapacity);
        }
        Ok(Self {
            items: Deque::new(),
            capacity,
        })
    }

    /// Append a transfer
    ///
    /// A full queue drops the transfer and reports
    /// [`DisplayError::QueueFull`]; the queue itself is unchanged.
    pub fn enqueue(&mut self, transfer: Transfer) -> Result<(), DisplayError> {
        if self.is_full() {
            return Err(DisplayError::QueueFull);
        }
        self.items
            .push_back(transfer)
            .map_err(|_| DisplayError::QueueFull)
    }

    /// Remove the oldest transfer
    pub fn dequeue(&mut self) -> Option<Transfer> {
        self.items.pop_front()
    }

    /// Oldest transfer, left in place
    pub fn peek(&self) -> Option<&Transfer> {
        self.items.front()
    }

    /// Drop every pending transfer without sending it
    ///
    /// Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    /// Pending transfers
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if the next enqueue would be rejected
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorState;
    use crate::protocol::{ControlRegister, FullPulse, Register};
    use proptest::prelude::*;

    fn transfer(value: u8) -> Transfer {
        Transfer::encode(&FullPulse, Register::Data, &ControlRegister::new(), &[value]).unwrap()
    }

    fn first_value(t: &Transfer) -> u8 {
        use crate::protocol::FrameEncoder;
        FullPulse.decode(t.bytes()).next().unwrap()
    }

    #[test]
    fn test_capacity_bounds() {
        assert!(TransferQueue::<4>::new(0).is_err());
        assert!(TransferQueue::<4>::new(5).is_err());
        assert_eq!(TransferQueue::<4>::new(4).unwrap().capacity(), 4);
    }

    #[test]
    fn test_full_queue_rejects_and_latches_once() {
        let mut queue = TransferQueue::<8>::new(3).unwrap();
        let mut errors = ErrorState::new();

        for i in 0..3 {
            assert!(queue.enqueue(transfer(i)).is_ok());
        }
        assert!(queue.is_full());

        for i in 0..4 {
            let err = queue.enqueue(transfer(10 + i)).unwrap_err();
            assert_eq!(err, DisplayError::QueueFull);
            let latched = errors.record(err);
            assert_eq!(latched, i == 0);
            assert_eq!(queue.len(), 3);
        }
        assert_eq!(errors.latched(), Some(DisplayError::QueueFull));

        // Rejected transfers never made it in
        let values: heapless::Vec<u8, 8> = core::iter::from_fn(|| queue.dequeue())
            .map(|t| first_value(&t))
            .collect();
        assert_eq!(values.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut queue = TransferQueue::<4>::new(4).unwrap();
        queue.enqueue(transfer(1)).unwrap();
        queue.enqueue(transfer(2)).unwrap();

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());

        // Usable again after clearing
        queue.enqueue(transfer(3)).unwrap();
        assert_eq!(first_value(queue.peek().unwrap()), 3);
    }

    proptest! {
        #[test]
        fn prop_fifo_order(values in proptest::collection::vec(any::<u8>(), 0..40)) {
            let mut queue = TransferQueue::<8>::new(8).unwrap();
            let mut out = std::vec::Vec::new();

            // Interleave producer and consumer so the ring buffer wraps
            for chunk in values.chunks(3) {
                for &v in chunk {
                    if queue.is_full() {
                        let t = queue.dequeue().unwrap();
                        out.push(first_value(&t));
                    }
                    queue.enqueue(transfer(v)).unwrap();
                }
                if let Some(t) = queue.dequeue() {
                    out.push(first_value(&t));
                }
            }
            while let Some(t) = queue.dequeue() {
                out.push(first_value(&t));
            }

            prop_assert_eq!(out, values);
        }
    }
}

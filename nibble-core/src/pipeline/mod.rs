//! Delivery pipeline: transfers and the bounded queue that holds them
//!
//! A [`Transfer`] is move-only. It is built from encoder output, moved into
//! the [`TransferQueue`], moved out again by the drain step and dropped once
//! its bytes are on the bus. A transfer rejected by a full queue is dropped
//! by the queue itself, so no path can release one twice or leak it.

pub mod queue;
pub mod transfer;

pub use queue::TransferQueue;
pub use transfer::{Transfer, TransferFull, MAX_TRANSFER_LEN};

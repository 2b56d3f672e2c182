//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod display;
pub mod uptime;

pub use display::{display_task, Lcd};
pub use uptime::uptime_task;

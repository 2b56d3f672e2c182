//! HD44780 4-bit bus protocol
//!
//! Instruction set constants, the display control register and the frame
//! encoders that turn one instruction or character into expander bytes.

pub mod commands;
pub mod control;
pub mod encoder;

pub use control::ControlRegister;
pub use encoder::{
    decode, EncodingStrategy, Frame, FrameEncoder, FullPulse, Register, TransportPulsed,
    MAX_FRAME_LEN,
};

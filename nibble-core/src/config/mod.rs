//! Configuration types
//!
//! Everything the controller needs is fixed at construction. Types are
//! `Copy` and `const`-constructible so firmware can bake a configuration
//! into flash; with the `serde` feature they also load from TOML or other
//! serde formats.

pub mod types;

pub use types::*;

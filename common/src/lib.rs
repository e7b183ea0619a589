//! Shared pieces used by the relief workspace: little-endian binary
//! (de)serialization primitives and the per-mode configuration types.

pub mod config;
pub mod serde;

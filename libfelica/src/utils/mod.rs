// libfelica/src/utils/mod.rs

//! Small helpers for traces and timeouts.

pub mod hex;
/// Timeout defaults and helpers.
pub mod timeout;

pub use hex::*;
pub use timeout::*;

// libfelica/src/lib.rs

//! libfelica
//!
//! FeliCa command/response codec and adaptive block reads over any
//! byte-exchange transport.
#![warn(missing_docs)]

/// Polled card handle and scan context.
pub mod card;
pub mod config;
pub mod constants;
/// Crate-wide error type.
pub mod error;
pub mod negotiation;
pub mod node;
/// Common re-exports.
pub mod prelude;
pub mod protocol;
pub mod test_support;
pub mod transport;
/// Fixed-width FeliCa value types.
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;

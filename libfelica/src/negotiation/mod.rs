// libfelica/src/negotiation/mod.rs

//! Adaptive block reads.
//!
//! A read is a series of ReadWithoutEncryption rounds. Each round packs as
//! many blocks as the current ceilings allow; when the card rejects a
//! round, its status flags tell which ceiling to shrink (services per
//! request, blocks per request, or one service's block count) before the
//! next attempt. The pure transitions live in [`state`], the I/O loop in
//! [`reader`].

/// Batch planning.
pub mod batch;
pub mod probe;
/// The blocking read loop.
pub mod reader;
pub mod state;

/// The read loop over an [`AsyncTransport`](crate::transport::AsyncTransport).
#[cfg(feature = "async")]
pub mod async_reader;

#[cfg(feature = "async")]
pub use async_reader::read_blocks_from_services_async;
pub use batch::{plan_batch, Batch, BatchEntry, Limits, ServiceProgress};
pub use probe::{probe_error_location_indication, probe_max_blocks, probe_max_services};
pub use reader::{read_blocks_from_services, BlockReader, ReadOutcome, Termination};
pub use state::{bitmask_block_limit, Action, Dimension, NegotiationState, Phase};

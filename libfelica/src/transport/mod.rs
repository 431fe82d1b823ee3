// libfelica/src/transport/mod.rs

//! The byte-exchange collaborator and helpers that run one command over it.

/// Async transport behind the `async` feature.
#[cfg(feature = "async")]
pub mod async_traits;
/// In-memory transport for tests.
pub mod mock;
/// The blocking transport trait.
pub mod traits;

#[cfg(feature = "async")]
pub use async_traits::{AsyncTransport, BlockingAdapter, exchange_async};
pub use mock::MockTransport;
pub use traits::Transport;

use std::time::Duration;

use crate::protocol::{Command, Response};
use crate::utils::bytes_to_hex;
use crate::Result;

/// Encode `command`, send it, and decode the reply as the command's
/// response type.
pub fn exchange<C, T>(transport: &mut T, command: &C, timeout: Option<Duration>) -> Result<C::Response>
where
    C: Command,
    T: Transport + ?Sized,
{
    let request = command.to_bytes();
    log::trace!("felica -> {}", bytes_to_hex(&request));
    let reply = transport.transceive(&request, timeout)?;
    log::trace!("felica <- {}", bytes_to_hex(&reply));
    C::Response::from_bytes(&reply)
}

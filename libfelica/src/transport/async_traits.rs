// libfelica/src/transport/async_traits.rs

use std::time::Duration;

use async_trait::async_trait;

use crate::protocol::{Command, Response};
use crate::transport::Transport;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// Async counterpart of [`Transport`]: each call is a suspension point
/// while the link performs I/O.
#[async_trait]
pub trait AsyncTransport: Send {
    /// Send a command frame and await the reply frame.
    async fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for &mut T {
    async fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        (**self).transceive(command, timeout).await
    }
}

/// Runs a blocking [`Transport`] inline as an [`AsyncTransport`].
#[derive(Debug)]
pub struct BlockingAdapter<T>(pub T);

impl<T> BlockingAdapter<T> {
    /// Take the wrapped transport back.
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[async_trait]
impl<T: Transport + Send> AsyncTransport for BlockingAdapter<T> {
    async fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        self.0.transceive(command, timeout)
    }
}

/// Async version of [`crate::transport::exchange`]. A `timeout` also bounds
/// the future itself.
pub async fn exchange_async<C, T>(
    transport: &mut T,
    command: &C,
    timeout: Option<Duration>,
) -> Result<C::Response>
where
    C: Command + Sync,
    T: AsyncTransport + ?Sized,
{
    let request = command.to_bytes();
    log::trace!("felica -> {}", bytes_to_hex(&request));
    let reply = match timeout {
        Some(limit) => tokio::time::timeout(limit, transport.transceive(&request, timeout))
            .await
            .map_err(|_| Error::Timeout)??,
        None => transport.transceive(&request, None).await?,
    };
    log::trace!("felica <- {}", bytes_to_hex(&reply));
    C::Response::from_bytes(&reply)
}

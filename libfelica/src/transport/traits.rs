// libfelica/src/transport/traits.rs

use std::time::Duration;

use crate::Result;

/// Transport trait abstracts the card link away from protocol logic.
///
/// One call is one full round trip: the command frame goes out and the
/// card's reply frame comes back. Implementations fail with
/// `Error::Timeout` or `Error::Transport` and never retry on their own.
pub trait Transport {
    /// Send a command frame and wait for the reply frame. `None` uses the
    /// transport's own default timeout.
    fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        (**self).transceive(command, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        (**self).transceive(command, timeout)
    }
}

// libfelica/src/transport/mock.rs

use std::collections::VecDeque;
use std::time::Duration;

use crate::transport::traits::Transport;
use crate::{Error, Result};

/// Mock transport for unit tests. It records sent frames and returns
/// queued replies in order; an empty queue behaves like a silent card.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every frame passed to `transceive`, in order.
    pub sent: Vec<Vec<u8>>,
    /// Replies handed out front to back.
    pub responses: VecDeque<Vec<u8>>,
    /// Testing hook: number of upcoming calls that fail with a transport error
    pub failures: usize,
    /// Timeouts passed by callers, in call order
    pub timeouts: Vec<Option<Duration>>,
}

impl MockTransport {
    /// An empty mock; every call times out until replies are queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock with `responses` queued.
    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Set how many subsequent calls should fail (for tests).
    pub fn set_failures(&mut self, n: usize) {
        self.failures = n;
    }

    /// Queue one more reply.
    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.responses.push_back(resp);
    }

    /// Remove and return the most recent sent frame.
    pub fn pop_sent(&mut self) -> Option<Vec<u8>> {
        self.sent.pop()
    }
}

impl Transport for MockTransport {
    fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        self.sent.push(command.to_vec());
        self.timeouts.push(timeout);
        if self.failures > 0 {
            self.failures -= 1;
            return Err(Error::Transport("injected failure".into()));
        }
        self.responses.pop_front().ok_or(Error::Timeout)
    }
}

// libfelica/src/card/nodes.rs

use std::time::Duration;

use crate::node::Node;
use crate::protocol::SearchServiceCodeCommand;
use crate::transport::{exchange, Transport};
use crate::types::Idm;
use crate::Result;

/// Iterator over the nodes returned by SearchServiceCode, in index order.
/// Stops at the end marker or after the first error.
pub struct NodeIterator<'a, T: Transport + ?Sized> {
    idm: Idm,
    timeout: Duration,
    transport: &'a mut T,
    index: u16,
    finished: bool,
}

impl<'a, T: Transport + ?Sized> NodeIterator<'a, T> {
    /// Start at search index 0.
    pub fn new(idm: Idm, timeout: Duration, transport: &'a mut T) -> Self {
        Self {
            idm,
            timeout,
            transport,
            index: 0,
            finished: false,
        }
    }
}

impl<T: Transport + ?Sized> Iterator for NodeIterator<'_, T> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let command = SearchServiceCodeCommand::new(self.idm, self.index);
        match exchange(&mut *self.transport, &command, Some(self.timeout)) {
            Ok(response) => match response.node() {
                Some(node) => {
                    match self.index.checked_add(1) {
                        Some(next) => self.index = next,
                        None => self.finished = true,
                    }
                    Some(Ok(*node))
                }
                None => {
                    self.finished = true;
                    None
                }
            },
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

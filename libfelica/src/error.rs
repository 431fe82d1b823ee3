// libfelica/src/error.rs

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// A message was shorter than its fixed part.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Bytes needed.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },

    /// The code byte names another message type.
    #[error("unexpected response code: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedResponse {
        /// Code of the type being decoded.
        expected: u8,
        /// Code found in the message.
        actual: u8,
    },

    /// Any other structural violation, on decode or construction.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The card answered with a failure status.
    #[error("felica error: status=({status1:#04x}, {status2:#04x})")]
    FelicaStatus {
        /// Status flag 1, the error location.
        status1: u8,
        /// Status flag 2, the error code.
        status2: u8,
    },

    /// The card's replies contradict the block read in progress.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    /// The link to the card failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// No reply within the timeout.
    #[error("operation timed out")]
    Timeout,

    /// A request or setting outside what the crate supports.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl Error {
    /// Shorthand used by the codec layer.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedMessage(msg.into())
    }

    /// True for every structural codec failure (length, code byte, field
    /// domain). These are never retried.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::InvalidLength { .. }
                | Error::UnexpectedResponse { .. }
                | Error::MalformedMessage(_)
        )
    }

    /// True for failures raised by the transport collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

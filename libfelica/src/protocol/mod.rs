// libfelica/src/protocol/mod.rs

//! FeliCa command/response codec.
//!
//! Every message is `[len][code][body...]` where `len` counts the whole
//! message. Each command has a struct in `commands::<family>` and its
//! response a struct in `responses::<family>`; both sides encode with
//! `to_bytes` and decode with `from_bytes`, which checks, in order, the
//! minimum length, the declared length byte, the code byte, and then the
//! type's own field rules.

/// Block list elements.
pub mod block_list;
/// One struct per command.
pub mod commands;
/// Frame parsing and building helpers.
pub mod parser;
pub mod responses;
/// Status flags.
pub mod status;

pub use block_list::{AccessMode, BlockListElement};
pub use commands::*;
pub use responses::*;
pub use status::{HasStatus, StatusFlags, StatusKind};

use crate::Result;

/// A command sent to the card.
pub trait Command: Sized {
    /// Command code byte.
    const COMMAND_CODE: u8;

    /// The response type the card answers with.
    type Response: Response;

    /// Encode the whole frame, length byte included.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decode a frame.
    fn from_bytes(data: &[u8]) -> Result<Self>;
}

/// A response returned by the card.
pub trait Response: Sized {
    /// Response code byte.
    const RESPONSE_CODE: u8;

    /// Encode the whole frame, length byte included.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decode a frame.
    fn from_bytes(data: &[u8]) -> Result<Self>;
}

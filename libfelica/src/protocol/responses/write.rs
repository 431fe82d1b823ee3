// libfelica/src/protocol/responses/write.rs

use super::{decode_status_only, encode_status_only};
use crate::constants::command_code::{WRITE, WRITE_WITHOUT_ENCRYPTION};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::Idm;
use crate::Result;

/// WriteWithoutEncryption response (0x09)
/// Layout: len + code + idm(8) + status(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteWithoutEncryptionResponse {
    /// Card answering.
    pub idm: Idm,
    /// Status flags.
    pub status: StatusFlags,
}

impl WriteWithoutEncryptionResponse {
    /// A reply with `status`.
    pub fn new(idm: Idm, status: StatusFlags) -> Self {
        Self { idm, status }
    }
}

impl HasStatus for WriteWithoutEncryptionResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for WriteWithoutEncryptionResponse {
    const RESPONSE_CODE: u8 = WRITE_WITHOUT_ENCRYPTION + 1;

    fn to_bytes(&self) -> Vec<u8> {
        encode_status_only(Self::RESPONSE_CODE, &self.idm, self.status)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idm, status) = decode_status_only(data, Self::RESPONSE_CODE)?;
        Ok(Self::new(idm, status))
    }
}

/// Write response (0x17), addressed by IDt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResponse {
    /// Transaction identifier the write was made under.
    pub idt: Idm,
    /// Status flags.
    pub status: StatusFlags,
}

impl WriteResponse {
    /// A reply with `status`.
    pub fn new(idt: Idm, status: StatusFlags) -> Self {
        Self { idt, status }
    }
}

impl HasStatus for WriteResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for WriteResponse {
    const RESPONSE_CODE: u8 = WRITE + 1;

    fn to_bytes(&self) -> Vec<u8> {
        encode_status_only(Self::RESPONSE_CODE, &self.idt, self.status)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idt, status) = decode_status_only(data, Self::RESPONSE_CODE)?;
        Ok(Self::new(idt, status))
    }
}

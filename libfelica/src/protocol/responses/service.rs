// libfelica/src/protocol/responses/service.rs

use super::{expect_error_status, read_status, read_u16_values};
use crate::constants::command_code::{REQUEST_RESPONSE, REQUEST_SERVICE, REQUEST_SERVICE_V2};
use crate::constants::{MAX_NODES_V1, MAX_NODES_V2};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::{EncryptionIdentifier, Idm, KeyVersion};
use crate::{Error, Result};

/// RequestService response (0x03)
/// Layout: len + code + idm(8) + n(1) + key_versions(2*n)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestServiceResponse {
    idm: Idm,
    key_versions: Vec<KeyVersion>,
}

impl RequestServiceResponse {
    const MIN_LEN: usize = 2 + 8 + 1 + 2;

    /// At most 16 key versions.
    pub fn new(idm: Idm, key_versions: Vec<KeyVersion>) -> Result<Self> {
        parser::check_count("key version", key_versions.len(), MAX_NODES_V1)?;
        Ok(Self { idm, key_versions })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// One key version per requested node.
    pub fn key_versions(&self) -> &[KeyVersion] {
        &self.key_versions
    }
}

impl Response for RequestServiceResponse {
    const RESPONSE_CODE: u8 = REQUEST_SERVICE + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .byte(self.key_versions.len() as u8)
            .each(&self.key_versions, |k| k.to_bytes().to_vec())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let n = r.byte()? as usize;
        parser::check_count("key version", n, MAX_NODES_V1)?;
        let key_versions = read_u16_values(&mut r, n, KeyVersion::from_bytes)?;
        r.finish()?;
        Ok(Self { idm, key_versions })
    }
}

/// RequestResponse response (0x05): the card's current mode.
/// Layout: len + code + idm(8) + mode(1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestResponseResponse {
    idm: Idm,
    mode: u8,
}

impl RequestResponseResponse {
    const LEN: usize = 2 + 8 + 1;
    const MAX_MODE: u8 = 3;

    /// A reply reporting `mode`, 0..=3.
    pub fn new(idm: Idm, mode: u8) -> Result<Self> {
        if mode > Self::MAX_MODE {
            return Err(Error::malformed(format!("card mode {} outside 0..=3", mode)));
        }
        Ok(Self { idm, mode })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Current mode.
    pub fn mode(&self) -> u8 {
        self.mode
    }
}

impl Response for RequestResponseResponse {
    const RESPONSE_CODE: u8 = REQUEST_RESPONSE + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .byte(self.mode)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let mode = r.byte()?;
        r.finish()?;
        Self::new(idm, mode)
    }
}

/// RequestServiceV2 response (0x33)
/// Layout: len + code + idm(8) + status(2)
///         [+ encryption_identifier(1) + n(1) + aes_key_versions(2*n)
///          + des_key_versions(2*n, only when the identifier has DES)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestServiceV2Response {
    idm: Idm,
    status: StatusFlags,
    encryption_identifier: Option<EncryptionIdentifier>,
    aes_key_versions: Vec<KeyVersion>,
    des_key_versions: Vec<KeyVersion>,
}

impl RequestServiceV2Response {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// A successful reply. DES key versions must match the AES ones in
    /// number when the identifier includes DES, and be empty otherwise.
    pub fn new_success(
        idm: Idm,
        encryption_identifier: EncryptionIdentifier,
        aes_key_versions: Vec<KeyVersion>,
        des_key_versions: Vec<KeyVersion>,
    ) -> Result<Self> {
        parser::check_count("key version", aes_key_versions.len(), MAX_NODES_V2)?;
        let expected_des = if encryption_identifier.has_des() {
            aes_key_versions.len()
        } else {
            0
        };
        if des_key_versions.len() != expected_des {
            return Err(Error::malformed(format!(
                "{} DES key versions for {} AES key versions with identifier {:#04x}",
                des_key_versions.len(),
                aes_key_versions.len(),
                encryption_identifier.to_byte()
            )));
        }
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            encryption_identifier: Some(encryption_identifier),
            aes_key_versions,
            des_key_versions,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            encryption_identifier: None,
            aes_key_versions: Vec::new(),
            des_key_versions: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Encryption identifier, on success.
    pub fn encryption_identifier(&self) -> Option<EncryptionIdentifier> {
        self.encryption_identifier
    }

    /// AES key version per requested node.
    pub fn aes_key_versions(&self) -> &[KeyVersion] {
        &self.aes_key_versions
    }

    /// DES key version per requested node; empty for AES-only cards.
    pub fn des_key_versions(&self) -> &[KeyVersion] {
        &self.des_key_versions
    }
}

impl HasStatus for RequestServiceV2Response {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for RequestServiceV2Response {
    const RESPONSE_CODE: u8 = REQUEST_SERVICE_V2 + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        match self.encryption_identifier {
            Some(id) => builder
                .byte(id.to_byte())
                .byte(self.aes_key_versions.len() as u8)
                .each(&self.aes_key_versions, |k| k.to_bytes().to_vec())
                .each(&self.des_key_versions, |k| k.to_bytes().to_vec())
                .build(),
            None => builder.build(),
        }
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let status = read_status(&mut r)?;
        if !status.is_success() {
            r.finish()?;
            return Self::new_error(idm, status);
        }
        let identifier = EncryptionIdentifier::from_byte(r.byte()?);
        let n = r.byte()? as usize;
        parser::check_count("key version", n, MAX_NODES_V2)?;
        let aes = read_u16_values(&mut r, n, KeyVersion::from_bytes)?;
        let des = if identifier.has_des() {
            read_u16_values(&mut r, n, KeyVersion::from_bytes)?
        } else {
            Vec::new()
        };
        r.finish()?;
        Self::new_success(idm, identifier, aes, des)
    }
}

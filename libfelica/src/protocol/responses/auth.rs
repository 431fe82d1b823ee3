// libfelica/src/protocol/responses/auth.rs

use super::{read_status, require_payload};
use crate::constants::command_code::{
    AUTHENTICATION1, AUTHENTICATION1_AES, AUTHENTICATION1_DES, AUTHENTICATION2,
    AUTHENTICATION2_AES_DES,
};
use crate::constants::{AES_CHALLENGE_LEN, DES_CHALLENGE_LEN};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::{Idm, Pmm};
use crate::Result;

/// Authentication1 response (0x11)
/// Layout: len + code + idm(8) + challenge_response(8) + card_challenge(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication1Response {
    /// Card answering.
    pub idm: Idm,
    /// The reader's challenge, encrypted by the card.
    pub challenge_response: [u8; DES_CHALLENGE_LEN],
    /// The card's challenge for the reader.
    pub card_challenge: [u8; DES_CHALLENGE_LEN],
}

impl Authentication1Response {
    const LEN: usize = 2 + 8 + 2 * DES_CHALLENGE_LEN;
}

impl Response for Authentication1Response {
    const RESPONSE_CODE: u8 = AUTHENTICATION1 + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.challenge_response)
            .bytes(&self.card_challenge)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let challenge_response = r.array()?;
        let card_challenge = r.array()?;
        r.finish()?;
        Ok(Self {
            idm,
            challenge_response,
            card_challenge,
        })
    }
}

/// Authentication2 response (0x13)
/// Layout: len + code + idt(8) + pmm(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication2Response {
    /// Transaction identifier for the session.
    pub idt: Idm,
    /// Manufacture parameters.
    pub pmm: Pmm,
}

impl Response for Authentication2Response {
    const RESPONSE_CODE: u8 = AUTHENTICATION2 + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idt.as_bytes())
            .bytes(self.pmm.as_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, 2 + 8 + 8, Self::RESPONSE_CODE)?;
        let idt = r.idm()?;
        let pmm = r.pmm()?;
        r.finish()?;
        Ok(Self { idt, pmm })
    }
}

/// Authentication1Aes response (0x41)
/// Layout: len + code + idm(8) + card_challenge(16) + encrypted(16)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication1AesResponse {
    /// Card answering.
    pub idm: Idm,
    /// The card's challenge.
    pub card_challenge: [u8; AES_CHALLENGE_LEN],
    /// Encrypted payload.
    pub encrypted: [u8; AES_CHALLENGE_LEN],
}

impl Response for Authentication1AesResponse {
    const RESPONSE_CODE: u8 = AUTHENTICATION1_AES + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.card_challenge)
            .bytes(&self.encrypted)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, 2 + 8 + 2 * AES_CHALLENGE_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let card_challenge = r.array()?;
        let encrypted = r.array()?;
        r.finish()?;
        Ok(Self {
            idm,
            card_challenge,
            encrypted,
        })
    }
}

/// Authentication1Des response (0x43)
/// Layout: len + code + idm(8) + card_challenge(8) + encrypted(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication1DesResponse {
    /// Card answering.
    pub idm: Idm,
    /// The card's challenge.
    pub card_challenge: [u8; DES_CHALLENGE_LEN],
    /// Encrypted payload.
    pub encrypted: [u8; DES_CHALLENGE_LEN],
}

impl Response for Authentication1DesResponse {
    const RESPONSE_CODE: u8 = AUTHENTICATION1_DES + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.card_challenge)
            .bytes(&self.encrypted)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, 2 + 8 + 2 * DES_CHALLENGE_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let card_challenge = r.array()?;
        let encrypted = r.array()?;
        r.finish()?;
        Ok(Self {
            idm,
            card_challenge,
            encrypted,
        })
    }
}

/// Authentication2AesDes response (0x45)
/// Layout: len + code + idm(8) + status(2) [+ idt(8) + pmm(8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication2AesDesResponse {
    idm: Idm,
    status: StatusFlags,
    session: Option<(Idm, Pmm)>,
}

impl Authentication2AesDesResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// `session` (IDt, PMm) is present exactly when `status` is a success.
    pub fn new(idm: Idm, status: StatusFlags, session: Option<(Idm, Pmm)>) -> Result<Self> {
        let session = require_payload(status, "IDt and PMm", session)?;
        Ok(Self {
            idm,
            status,
            session,
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Transaction identifier, on success.
    pub fn idt(&self) -> Option<&Idm> {
        self.session.as_ref().map(|(idt, _)| idt)
    }

    /// Manufacture parameters, on success.
    pub fn pmm(&self) -> Option<&Pmm> {
        self.session.as_ref().map(|(_, pmm)| pmm)
    }
}

impl HasStatus for Authentication2AesDesResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for Authentication2AesDesResponse {
    const RESPONSE_CODE: u8 = AUTHENTICATION2_AES_DES + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        match &self.session {
            Some((idt, pmm)) => builder.bytes(idt.as_bytes()).bytes(pmm.as_bytes()).build(),
            None => builder.build(),
        }
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let status = read_status(&mut r)?;
        let session = if status.is_success() {
            Some((r.idm()?, r.pmm()?))
        } else {
            None
        };
        r.finish()?;
        Self::new(idm, status, session)
    }
}

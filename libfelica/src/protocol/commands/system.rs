// libfelica/src/protocol/commands/system.rs

use crate::constants::command_code::{
    GET_SYSTEM_STATUS, REQUEST_SPECIFICATION_VERSION, REQUEST_SYSTEM_CODE, RESET_MODE,
    SET_PARAMETER,
};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{
    Command, GetSystemStatusResponse, RequestSpecificationVersionResponse,
    RequestSystemCodeResponse, ResetModeResponse, SetParameterResponse,
};
use crate::types::Idm;
use crate::{Error, Result};

/// RequestSystemCode (0x0C)
/// Layout: len + code + idm(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSystemCodeCommand {
    /// Card addressed.
    pub idm: Idm,
}

impl RequestSystemCodeCommand {
    const LEN: usize = 2 + 8;

    /// Ask `idm` for its systems.
    pub fn new(idm: Idm) -> Self {
        Self { idm }
    }
}

impl Command for RequestSystemCodeCommand {
    const COMMAND_CODE: u8 = REQUEST_SYSTEM_CODE;
    type Response = RequestSystemCodeResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(REQUEST_SYSTEM_CODE)
            .bytes(self.idm.as_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, REQUEST_SYSTEM_CODE)?;
        let idm = r.idm()?;
        r.finish()?;
        Ok(Self { idm })
    }
}

/// Commands made of an IDm followed by two reserved zero bytes.
fn encode_idm_reserved(code: u8, idm: &Idm) -> Vec<u8> {
    FrameBuilder::new(code)
        .bytes(idm.as_bytes())
        .bytes(&[0x00, 0x00])
        .build()
}

fn decode_idm_reserved(data: &[u8], code: u8) -> Result<Idm> {
    let mut r = parser::open_frame(data, 2 + 8 + 2, code)?;
    let idm = r.idm()?;
    parser::expect_reserved_zero("reserved", r.bytes(2)?)?;
    r.finish()?;
    Ok(idm)
}

/// GetSystemStatus (0x38)
/// Layout: len + code + idm(8) + reserved(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetSystemStatusCommand {
    /// Card addressed.
    pub idm: Idm,
}

impl GetSystemStatusCommand {
    /// Ask `idm` for its status.
    pub fn new(idm: Idm) -> Self {
        Self { idm }
    }
}

impl Command for GetSystemStatusCommand {
    const COMMAND_CODE: u8 = GET_SYSTEM_STATUS;
    type Response = GetSystemStatusResponse;

    fn to_bytes(&self) -> Vec<u8> {
        encode_idm_reserved(GET_SYSTEM_STATUS, &self.idm)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        decode_idm_reserved(data, GET_SYSTEM_STATUS).map(Self::new)
    }
}

/// RequestSpecificationVersion (0x3C)
/// Layout: len + code + idm(8) + reserved(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSpecificationVersionCommand {
    /// Card addressed.
    pub idm: Idm,
}

impl RequestSpecificationVersionCommand {
    /// Ask `idm` for its versions.
    pub fn new(idm: Idm) -> Self {
        Self { idm }
    }
}

impl Command for RequestSpecificationVersionCommand {
    const COMMAND_CODE: u8 = REQUEST_SPECIFICATION_VERSION;
    type Response = RequestSpecificationVersionResponse;

    fn to_bytes(&self) -> Vec<u8> {
        encode_idm_reserved(REQUEST_SPECIFICATION_VERSION, &self.idm)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        decode_idm_reserved(data, REQUEST_SPECIFICATION_VERSION).map(Self::new)
    }
}

/// ResetMode (0x3E): return the card to mode 0.
/// Layout: len + code + idm(8) + reserved(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetModeCommand {
    /// Card addressed.
    pub idm: Idm,
}

impl ResetModeCommand {
    /// Reset `idm` to mode 0.
    pub fn new(idm: Idm) -> Self {
        Self { idm }
    }
}

impl Command for ResetModeCommand {
    const COMMAND_CODE: u8 = RESET_MODE;
    type Response = ResetModeResponse;

    fn to_bytes(&self) -> Vec<u8> {
        encode_idm_reserved(RESET_MODE, &self.idm)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        decode_idm_reserved(data, RESET_MODE).map(Self::new)
    }
}

/// Cipher used by later authentication.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionType {
    /// DES.
    Des = 0x00,
    /// AES.
    Aes = 0x01,
}

/// Width of node codes in later packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// 2-byte node codes.
    NodeCodeSize2 = 0x00,
    /// 4-byte node codes.
    NodeCodeSize4 = 0x01,
}

/// SetParameter (0x20)
/// Layout: len + code + idm(8) + encryption_type(1) + packet_type(1) + reserved(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetParameterCommand {
    /// Card addressed.
    pub idm: Idm,
    /// Cipher for later authentication.
    pub encryption_type: EncryptionType,
    /// Node code width for later packets.
    pub packet_type: PacketType,
}

impl SetParameterCommand {
    const LEN: usize = 2 + 8 + 1 + 1 + 2;

    /// Set both parameters.
    pub fn new(idm: Idm, encryption_type: EncryptionType, packet_type: PacketType) -> Self {
        Self {
            idm,
            encryption_type,
            packet_type,
        }
    }
}

impl Command for SetParameterCommand {
    const COMMAND_CODE: u8 = SET_PARAMETER;
    type Response = SetParameterResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(SET_PARAMETER)
            .bytes(self.idm.as_bytes())
            .byte(self.encryption_type as u8)
            .byte(self.packet_type as u8)
            .bytes(&[0x00, 0x00])
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, SET_PARAMETER)?;
        let idm = r.idm()?;
        let encryption_type = match r.byte()? {
            0x00 => EncryptionType::Des,
            0x01 => EncryptionType::Aes,
            other => return Err(Error::malformed(format!("encryption type {:#04x}", other))),
        };
        let packet_type = match r.byte()? {
            0x00 => PacketType::NodeCodeSize2,
            0x01 => PacketType::NodeCodeSize4,
            other => return Err(Error::malformed(format!("packet type {:#04x}", other))),
        };
        parser::expect_reserved_zero("reserved", r.bytes(2)?)?;
        r.finish()?;
        Ok(Self::new(idm, encryption_type, packet_type))
    }
}

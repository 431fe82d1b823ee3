// libfelica/src/protocol/commands/container.rs

use crate::constants::command_code::{
    GET_CONTAINER_ID, GET_CONTAINER_ISSUE_INFORMATION, GET_CONTAINER_PROPERTY,
};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{
    Command, GetContainerIdResponse, GetContainerIssueInformationResponse,
    GetContainerPropertyResponse,
};
use crate::types::Idm;
use crate::Result;

/// GetContainerIssueInformation (0x22)
/// Layout: len + code + idm(8) + reserved(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetContainerIssueInformationCommand {
    /// Card addressed.
    pub idm: Idm,
}

impl GetContainerIssueInformationCommand {
    const LEN: usize = 2 + 8 + 2;

    /// Ask `idm` for its issue information.
    pub fn new(idm: Idm) -> Self {
        Self { idm }
    }
}

impl Command for GetContainerIssueInformationCommand {
    const COMMAND_CODE: u8 = GET_CONTAINER_ISSUE_INFORMATION;
    type Response = GetContainerIssueInformationResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(GET_CONTAINER_ISSUE_INFORMATION)
            .bytes(self.idm.as_bytes())
            .bytes(&[0x00, 0x00])
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, GET_CONTAINER_ISSUE_INFORMATION)?;
        let idm = r.idm()?;
        parser::expect_reserved_zero("reserved", r.bytes(2)?)?;
        r.finish()?;
        Ok(Self::new(idm))
    }
}

/// GetContainerProperty (0x2E). Sent without an IDm.
/// Layout: len + code + index(2, LE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetContainerPropertyCommand {
    /// Property index.
    pub index: u16,
}

impl GetContainerPropertyCommand {
    const LEN: usize = 2 + 2;

    /// Ask for property `index`.
    pub fn new(index: u16) -> Self {
        Self { index }
    }
}

impl Command for GetContainerPropertyCommand {
    const COMMAND_CODE: u8 = GET_CONTAINER_PROPERTY;
    type Response = GetContainerPropertyResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(GET_CONTAINER_PROPERTY)
            .bytes(&self.index.to_le_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, GET_CONTAINER_PROPERTY)?;
        let index = r.le_u16()?;
        r.finish()?;
        Ok(Self::new(index))
    }
}

/// GetContainerId (0x70). Sent without an IDm.
/// Layout: len + code + reserved(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetContainerIdCommand;

impl GetContainerIdCommand {
    const LEN: usize = 2 + 2;

    /// The command; it has no fields.
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetContainerIdCommand {
    const COMMAND_CODE: u8 = GET_CONTAINER_ID;
    type Response = GetContainerIdResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(GET_CONTAINER_ID)
            .bytes(&[0x00, 0x00])
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, GET_CONTAINER_ID)?;
        parser::expect_reserved_zero("reserved", r.bytes(2)?)?;
        r.finish()?;
        Ok(Self)
    }
}

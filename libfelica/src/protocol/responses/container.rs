// libfelica/src/protocol/responses/container.rs

use crate::constants::command_code::{
    GET_CONTAINER_ID, GET_CONTAINER_ISSUE_INFORMATION, GET_CONTAINER_PROPERTY,
};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::Response;
use crate::types::Idm;
use crate::{Error, Result};

/// GetContainerIssueInformation response (0x23)
/// Layout: len + code + idm(8) + format_version_carrier(5) + model(11)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetContainerIssueInformationResponse {
    /// Card answering.
    pub idm: Idm,
    /// Format version and carrier information.
    pub format_version_carrier_information: [u8; 5],
    /// Mobile phone model information.
    pub mobile_phone_model_information: [u8; 11],
}

impl Response for GetContainerIssueInformationResponse {
    const RESPONSE_CODE: u8 = GET_CONTAINER_ISSUE_INFORMATION + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.format_version_carrier_information)
            .bytes(&self.mobile_phone_model_information)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, 2 + 8 + 5 + 11, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let format_version_carrier_information = r.array()?;
        let mobile_phone_model_information = r.array()?;
        r.finish()?;
        Ok(Self {
            idm,
            format_version_carrier_information,
            mobile_phone_model_information,
        })
    }
}

/// GetContainerProperty response (0x2F)
/// Layout: len + code + data(1..)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetContainerPropertyResponse {
    data: Vec<u8>,
}

impl GetContainerPropertyResponse {
    /// Property bytes; at least one.
    pub fn new(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::malformed("container property data is empty"));
        }
        parser::check_frame_len(2 + data.len())?;
        Ok(Self { data })
    }

    /// Property bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Response for GetContainerPropertyResponse {
    const RESPONSE_CODE: u8 = GET_CONTAINER_PROPERTY + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(&self.data)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, 3, Self::RESPONSE_CODE)?;
        Self::new(r.rest().to_vec())
    }
}

/// GetContainerId response (0x71)
/// Layout: len + code + container_idm(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetContainerIdResponse {
    /// IDm of the container.
    pub container_idm: Idm,
}

impl Response for GetContainerIdResponse {
    const RESPONSE_CODE: u8 = GET_CONTAINER_ID + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.container_idm.as_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, 2 + 8, Self::RESPONSE_CODE)?;
        let container_idm = r.idm()?;
        r.finish()?;
        Ok(Self { container_idm })
    }
}

// libfelica/src/protocol/responses/mod.rs

//! Response structs, one file per command family, plus [`AnyResponse`]
//! for decoding a frame whose type is not known in advance.

mod auth;
mod block_info;
mod container;
mod node_property;
mod polling;
mod read;
mod search;
mod service;
mod system;
mod write;

pub use auth::{
    Authentication1AesResponse, Authentication1DesResponse, Authentication1Response,
    Authentication2AesDesResponse, Authentication2Response,
};
pub use block_info::{
    GetAreaInformationResponse, RequestBlockInformationExResponse,
    RequestBlockInformationResponse,
};
pub use container::{
    GetContainerIdResponse, GetContainerIssueInformationResponse, GetContainerPropertyResponse,
};
pub use node_property::{GetNodePropertyResponse, NodeProperty, ValueLimitedPurseProperty};
pub use polling::PollingResponse;
pub use read::{ReadResponse, ReadWithoutEncryptionResponse};
pub use search::{RequestCodeListResponse, SearchServiceCodeResponse};
pub use service::{RequestResponseResponse, RequestServiceResponse, RequestServiceV2Response};
pub use system::{
    GetSystemStatusResponse, RequestSpecificationVersionResponse, RequestSystemCodeResponse,
    ResetModeResponse, SetParameterResponse,
};
pub use write::{WriteResponse, WriteWithoutEncryptionResponse};

use crate::protocol::Response;
use crate::protocol::parser::{self, FieldReader, FrameBuilder};
use crate::protocol::status::StatusFlags;
use crate::types::Idm;
use crate::{Error, Result};

pub(crate) fn read_status(r: &mut FieldReader<'_>) -> Result<StatusFlags> {
    Ok(StatusFlags::new(r.byte()?, r.byte()?))
}

/// Success responses must carry their payload.
pub(crate) fn require_payload<T>(status: StatusFlags, field: &str, value: Option<T>) -> Result<Option<T>> {
    match (status.is_success(), value) {
        (true, None) => Err(Error::malformed(format!(
            "successful response is missing {}",
            field
        ))),
        (false, Some(_)) => Err(Error::malformed(format!(
            "error response {} carries {}",
            status, field
        ))),
        (_, value) => Ok(value),
    }
}

/// `new_error` constructors only accept failure statuses.
pub(crate) fn expect_error_status(status: StatusFlags) -> Result<()> {
    if status.is_success() {
        return Err(Error::malformed("error response built with a success status"));
    }
    Ok(())
}

/// Responses made of an IDm and status flags only.
pub(crate) fn encode_status_only(code: u8, idm: &Idm, status: StatusFlags) -> Vec<u8> {
    FrameBuilder::new(code)
        .bytes(idm.as_bytes())
        .bytes(&status.to_bytes())
        .build()
}

pub(crate) fn decode_status_only(data: &[u8], code: u8) -> Result<(Idm, StatusFlags)> {
    let mut r = parser::open_frame(data, 2 + 8 + 2, code)?;
    let idm = r.idm()?;
    let status = read_status(&mut r)?;
    r.finish()?;
    Ok((idm, status))
}

/// Read `count` little-endian 2-byte values.
pub(crate) fn read_u16_values<T>(
    r: &mut FieldReader<'_>,
    count: usize,
    f: impl Fn(&[u8]) -> Result<T>,
) -> Result<Vec<T>> {
    r.chunks(count, 2)?.into_iter().map(f).collect()
}

/// Any response, decoded by its code byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyResponse {
    /// Polling (0x01).
    Polling(PollingResponse),
    /// RequestService (0x03).
    RequestService(RequestServiceResponse),
    /// RequestResponse (0x05).
    RequestResponse(RequestResponseResponse),
    /// ReadWithoutEncryption (0x07).
    ReadWithoutEncryption(ReadWithoutEncryptionResponse),
    /// WriteWithoutEncryption (0x09).
    WriteWithoutEncryption(WriteWithoutEncryptionResponse),
    /// SearchServiceCode (0x0B).
    SearchServiceCode(SearchServiceCodeResponse),
    /// RequestSystemCode (0x0D).
    RequestSystemCode(RequestSystemCodeResponse),
    /// RequestBlockInformation (0x0F).
    RequestBlockInformation(RequestBlockInformationResponse),
    /// Authentication1 (0x11).
    Authentication1(Authentication1Response),
    /// Authentication2 (0x13).
    Authentication2(Authentication2Response),
    /// Read (0x15).
    Read(ReadResponse),
    /// Write (0x17).
    Write(WriteResponse),
    /// RequestCodeList (0x1B).
    RequestCodeList(RequestCodeListResponse),
    /// RequestBlockInformationEx (0x1F).
    RequestBlockInformationEx(RequestBlockInformationExResponse),
    /// SetParameter (0x21).
    SetParameter(SetParameterResponse),
    /// GetContainerIssueInformation (0x23).
    GetContainerIssueInformation(GetContainerIssueInformationResponse),
    /// GetAreaInformation (0x25).
    GetAreaInformation(GetAreaInformationResponse),
    /// GetNodeProperty (0x29).
    GetNodeProperty(GetNodePropertyResponse),
    /// GetContainerProperty (0x2F).
    GetContainerProperty(GetContainerPropertyResponse),
    /// RequestServiceV2 (0x33).
    RequestServiceV2(RequestServiceV2Response),
    /// GetSystemStatus (0x39).
    GetSystemStatus(GetSystemStatusResponse),
    /// RequestSpecificationVersion (0x3D).
    RequestSpecificationVersion(RequestSpecificationVersionResponse),
    /// ResetMode (0x3F).
    ResetMode(ResetModeResponse),
    /// Authentication1Aes (0x41).
    Authentication1Aes(Authentication1AesResponse),
    /// Authentication1Des (0x43).
    Authentication1Des(Authentication1DesResponse),
    /// Authentication2AesDes (0x45).
    Authentication2AesDes(Authentication2AesDesResponse),
    /// GetContainerId (0x71).
    GetContainerId(GetContainerIdResponse),
}

impl AnyResponse {
    /// Decode a response frame, choosing the type from byte 1.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        parser::ensure_len(data, 2)?;
        let code = data[1];
        let decoded = match code {
            PollingResponse::RESPONSE_CODE => Self::Polling(PollingResponse::from_bytes(data)?),
            RequestServiceResponse::RESPONSE_CODE => {
                Self::RequestService(RequestServiceResponse::from_bytes(data)?)
            }
            RequestResponseResponse::RESPONSE_CODE => {
                Self::RequestResponse(RequestResponseResponse::from_bytes(data)?)
            }
            ReadWithoutEncryptionResponse::RESPONSE_CODE => {
                Self::ReadWithoutEncryption(ReadWithoutEncryptionResponse::from_bytes(data)?)
            }
            WriteWithoutEncryptionResponse::RESPONSE_CODE => {
                Self::WriteWithoutEncryption(WriteWithoutEncryptionResponse::from_bytes(data)?)
            }
            SearchServiceCodeResponse::RESPONSE_CODE => {
                Self::SearchServiceCode(SearchServiceCodeResponse::from_bytes(data)?)
            }
            RequestSystemCodeResponse::RESPONSE_CODE => {
                Self::RequestSystemCode(RequestSystemCodeResponse::from_bytes(data)?)
            }
            RequestBlockInformationResponse::RESPONSE_CODE => {
                Self::RequestBlockInformation(RequestBlockInformationResponse::from_bytes(data)?)
            }
            Authentication1Response::RESPONSE_CODE => {
                Self::Authentication1(Authentication1Response::from_bytes(data)?)
            }
            Authentication2Response::RESPONSE_CODE => {
                Self::Authentication2(Authentication2Response::from_bytes(data)?)
            }
            ReadResponse::RESPONSE_CODE => Self::Read(ReadResponse::from_bytes(data)?),
            WriteResponse::RESPONSE_CODE => Self::Write(WriteResponse::from_bytes(data)?),
            RequestCodeListResponse::RESPONSE_CODE => {
                Self::RequestCodeList(RequestCodeListResponse::from_bytes(data)?)
            }
            RequestBlockInformationExResponse::RESPONSE_CODE => Self::RequestBlockInformationEx(
                RequestBlockInformationExResponse::from_bytes(data)?,
            ),
            SetParameterResponse::RESPONSE_CODE => {
                Self::SetParameter(SetParameterResponse::from_bytes(data)?)
            }
            GetContainerIssueInformationResponse::RESPONSE_CODE => {
                Self::GetContainerIssueInformation(
                    GetContainerIssueInformationResponse::from_bytes(data)?,
                )
            }
            GetAreaInformationResponse::RESPONSE_CODE => {
                Self::GetAreaInformation(GetAreaInformationResponse::from_bytes(data)?)
            }
            GetNodePropertyResponse::RESPONSE_CODE => {
                Self::GetNodeProperty(GetNodePropertyResponse::from_bytes(data)?)
            }
            GetContainerPropertyResponse::RESPONSE_CODE => {
                Self::GetContainerProperty(GetContainerPropertyResponse::from_bytes(data)?)
            }
            RequestServiceV2Response::RESPONSE_CODE => {
                Self::RequestServiceV2(RequestServiceV2Response::from_bytes(data)?)
            }
            GetSystemStatusResponse::RESPONSE_CODE => {
                Self::GetSystemStatus(GetSystemStatusResponse::from_bytes(data)?)
            }
            RequestSpecificationVersionResponse::RESPONSE_CODE => {
                Self::RequestSpecificationVersion(RequestSpecificationVersionResponse::from_bytes(
                    data,
                )?)
            }
            ResetModeResponse::RESPONSE_CODE => Self::ResetMode(ResetModeResponse::from_bytes(data)?),
            Authentication1AesResponse::RESPONSE_CODE => {
                Self::Authentication1Aes(Authentication1AesResponse::from_bytes(data)?)
            }
            Authentication1DesResponse::RESPONSE_CODE => {
                Self::Authentication1Des(Authentication1DesResponse::from_bytes(data)?)
            }
            Authentication2AesDesResponse::RESPONSE_CODE => {
                Self::Authentication2AesDes(Authentication2AesDesResponse::from_bytes(data)?)
            }
            GetContainerIdResponse::RESPONSE_CODE => {
                Self::GetContainerId(GetContainerIdResponse::from_bytes(data)?)
            }
            other => {
                return Err(Error::malformed(format!(
                    "unknown response code {:#04x}",
                    other
                )));
            }
        };
        Ok(decoded)
    }

    /// The response code byte of the wrapped response.
    pub fn response_code(&self) -> u8 {
        match self {
            Self::Polling(_) => PollingResponse::RESPONSE_CODE,
            Self::RequestService(_) => RequestServiceResponse::RESPONSE_CODE,
            Self::RequestResponse(_) => RequestResponseResponse::RESPONSE_CODE,
            Self::ReadWithoutEncryption(_) => ReadWithoutEncryptionResponse::RESPONSE_CODE,
            Self::WriteWithoutEncryption(_) => WriteWithoutEncryptionResponse::RESPONSE_CODE,
            Self::SearchServiceCode(_) => SearchServiceCodeResponse::RESPONSE_CODE,
            Self::RequestSystemCode(_) => RequestSystemCodeResponse::RESPONSE_CODE,
            Self::RequestBlockInformation(_) => RequestBlockInformationResponse::RESPONSE_CODE,
            Self::Authentication1(_) => Authentication1Response::RESPONSE_CODE,
            Self::Authentication2(_) => Authentication2Response::RESPONSE_CODE,
            Self::Read(_) => ReadResponse::RESPONSE_CODE,
            Self::Write(_) => WriteResponse::RESPONSE_CODE,
            Self::RequestCodeList(_) => RequestCodeListResponse::RESPONSE_CODE,
            Self::RequestBlockInformationEx(_) => RequestBlockInformationExResponse::RESPONSE_CODE,
            Self::SetParameter(_) => SetParameterResponse::RESPONSE_CODE,
            Self::GetContainerIssueInformation(_) => {
                GetContainerIssueInformationResponse::RESPONSE_CODE
            }
            Self::GetAreaInformation(_) => GetAreaInformationResponse::RESPONSE_CODE,
            Self::GetNodeProperty(_) => GetNodePropertyResponse::RESPONSE_CODE,
            Self::GetContainerProperty(_) => GetContainerPropertyResponse::RESPONSE_CODE,
            Self::RequestServiceV2(_) => RequestServiceV2Response::RESPONSE_CODE,
            Self::GetSystemStatus(_) => GetSystemStatusResponse::RESPONSE_CODE,
            Self::RequestSpecificationVersion(_) => {
                RequestSpecificationVersionResponse::RESPONSE_CODE
            }
            Self::ResetMode(_) => ResetModeResponse::RESPONSE_CODE,
            Self::Authentication1Aes(_) => Authentication1AesResponse::RESPONSE_CODE,
            Self::Authentication1Des(_) => Authentication1DesResponse::RESPONSE_CODE,
            Self::Authentication2AesDes(_) => Authentication2AesDesResponse::RESPONSE_CODE,
            Self::GetContainerId(_) => GetContainerIdResponse::RESPONSE_CODE,
        }
    }
}

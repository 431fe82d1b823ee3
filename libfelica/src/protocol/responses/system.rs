// libfelica/src/protocol/responses/system.rs

use super::{decode_status_only, encode_status_only, expect_error_status, read_status};
use crate::constants::command_code::{
    GET_SYSTEM_STATUS, REQUEST_SPECIFICATION_VERSION, REQUEST_SYSTEM_CODE, RESET_MODE,
    SET_PARAMETER,
};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::{Idm, OptionVersion, SystemCode};
use crate::{Error, Result};

/// RequestSystemCode response (0x0D)
/// Layout: len + code + idm(8) + n(1) + system_codes(2*n, big-endian)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSystemCodeResponse {
    idm: Idm,
    system_codes: Vec<SystemCode>,
}

impl RequestSystemCodeResponse {
    const MIN_LEN: usize = 2 + 8 + 1 + 2;

    /// At least one system code.
    pub fn new(idm: Idm, system_codes: Vec<SystemCode>) -> Result<Self> {
        parser::check_count("system code", system_codes.len(), u8::MAX as usize)?;
        parser::check_frame_len(2 + 8 + 1 + system_codes.len() * 2)?;
        Ok(Self { idm, system_codes })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Systems present on the card.
    pub fn system_codes(&self) -> &[SystemCode] {
        &self.system_codes
    }
}

impl Response for RequestSystemCodeResponse {
    const RESPONSE_CODE: u8 = REQUEST_SYSTEM_CODE + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .byte(self.system_codes.len() as u8)
            .each(&self.system_codes, |c| c.to_bytes().to_vec())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let n = r.byte()? as usize;
        let system_codes = r
            .chunks(n, 2)?
            .into_iter()
            .map(|c| SystemCode::from_bytes([c[0], c[1]]))
            .collect();
        r.finish()?;
        Self::new(idm, system_codes)
    }
}

/// GetSystemStatus response (0x39)
/// Layout: len + code + idm(8) + status(2) [+ flag(1) + n(1) + data(n)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSystemStatusResponse {
    idm: Idm,
    status: StatusFlags,
    flag: Option<u8>,
    data: Vec<u8>,
}

impl GetSystemStatusResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// A successful reply.
    pub fn new_success(idm: Idm, flag: u8, data: Vec<u8>) -> Result<Self> {
        parser::check_frame_len(Self::MIN_LEN + 2 + data.len())?;
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            flag: Some(flag),
            data,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            flag: None,
            data: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Status flag byte, on success.
    pub fn flag(&self) -> Option<u8> {
        self.flag
    }

    /// Status data; empty on error.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl HasStatus for GetSystemStatusResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for GetSystemStatusResponse {
    const RESPONSE_CODE: u8 = GET_SYSTEM_STATUS + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        match self.flag {
            Some(flag) => builder
                .byte(flag)
                .byte(self.data.len() as u8)
                .bytes(&self.data)
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
        let flag = r.byte()?;
        let n = r.byte()? as usize;
        let body = r.bytes(n)?.to_vec();
        r.finish()?;
        Self::new_success(idm, flag, body)
    }
}

/// RequestSpecificationVersion response (0x3D)
/// Layout: len + code + idm(8) + status(2)
///         [+ format_version(1, 0x00) + basic_version(2) + n(1) + option_versions(2*n)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpecificationVersionResponse {
    idm: Idm,
    status: StatusFlags,
    basic_version: Option<OptionVersion>,
    option_versions: Vec<OptionVersion>,
}

impl RequestSpecificationVersionResponse {
    const MIN_LEN: usize = 2 + 8 + 2;
    const FORMAT_VERSION: u8 = 0x00;

    /// A successful reply.
    pub fn new_success(
        idm: Idm,
        basic_version: OptionVersion,
        option_versions: Vec<OptionVersion>,
    ) -> Result<Self> {
        parser::check_frame_len(Self::MIN_LEN + 4 + option_versions.len() * 2)?;
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            basic_version: Some(basic_version),
            option_versions,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            basic_version: None,
            option_versions: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Basic version, on success.
    pub fn basic_version(&self) -> Option<OptionVersion> {
        self.basic_version
    }

    /// Option versions; empty on error.
    pub fn option_versions(&self) -> &[OptionVersion] {
        &self.option_versions
    }
}

impl HasStatus for RequestSpecificationVersionResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for RequestSpecificationVersionResponse {
    const RESPONSE_CODE: u8 = REQUEST_SPECIFICATION_VERSION + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        match self.basic_version {
            Some(basic) => builder
                .byte(Self::FORMAT_VERSION)
                .bytes(&basic.to_bytes())
                .byte(self.option_versions.len() as u8)
                .each(&self.option_versions, |v| v.to_bytes().to_vec())
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
        let format = r.byte()?;
        if format != Self::FORMAT_VERSION {
            return Err(Error::malformed(format!(
                "format version {:#04x} is not supported",
                format
            )));
        }
        let basic = OptionVersion::from_bytes(r.bytes(2)?)?;
        let n = r.byte()? as usize;
        let options = super::read_u16_values(&mut r, n, OptionVersion::from_bytes)?;
        r.finish()?;
        Self::new_success(idm, basic, options)
    }
}

/// ResetMode response (0x3F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetModeResponse {
    /// Card answering.
    pub idm: Idm,
    /// Status flags.
    pub status: StatusFlags,
}

impl ResetModeResponse {
    /// A reply with `status`.
    pub fn new(idm: Idm, status: StatusFlags) -> Self {
        Self { idm, status }
    }

    /// A successful reply.
    pub fn new_success(idm: Idm) -> Self {
        Self::new(idm, StatusFlags::SUCCESS)
    }
}

impl HasStatus for ResetModeResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for ResetModeResponse {
    const RESPONSE_CODE: u8 = RESET_MODE + 1;

    fn to_bytes(&self) -> Vec<u8> {
        encode_status_only(Self::RESPONSE_CODE, &self.idm, self.status)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idm, status) = decode_status_only(data, Self::RESPONSE_CODE)?;
        Ok(Self::new(idm, status))
    }
}

/// SetParameter response (0x21)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetParameterResponse {
    /// Card answering.
    pub idm: Idm,
    /// Status flags.
    pub status: StatusFlags,
}

impl SetParameterResponse {
    /// A reply with `status`.
    pub fn new(idm: Idm, status: StatusFlags) -> Self {
        Self { idm, status }
    }

    /// A successful reply.
    pub fn new_success(idm: Idm) -> Self {
        Self::new(idm, StatusFlags::SUCCESS)
    }
}

impl HasStatus for SetParameterResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for SetParameterResponse {
    const RESPONSE_CODE: u8 = SET_PARAMETER + 1;

    fn to_bytes(&self) -> Vec<u8> {
        encode_status_only(Self::RESPONSE_CODE, &self.idm, self.status)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idm, status) = decode_status_only(data, Self::RESPONSE_CODE)?;
        Ok(Self::new(idm, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idm() -> Idm {
        Idm::from_bytes([1, 2, 3, 4, 5, 6, 7, 8])
    }

    #[test]
    fn decode_request_system_code_ok() {
        let data = vec![15, 0x0D, 1, 2, 3, 4, 5, 6, 7, 8, 2, 0x00, 0x03, 0xFE, 0x00];
        let resp = RequestSystemCodeResponse::from_bytes(&data).unwrap();
        assert_eq!(resp.system_codes(), &[SystemCode::SUICA, SystemCode::COMMON]);
        assert_eq!(resp.to_bytes(), data);
    }

    #[test]
    fn decode_request_system_code_empty() {
        let data = vec![11, 0x0D, 1, 2, 3, 4, 5, 6, 7, 8, 0];
        assert!(RequestSystemCodeResponse::from_bytes(&data).is_err());
    }

    #[test]
    fn system_status_roundtrip() {
        let resp = GetSystemStatusResponse::new_success(idm(), 0x01, vec![0xAA, 0xBB]).unwrap();
        let bytes = resp.to_bytes();
        assert_eq!(&bytes[12..], &[0x01, 0x02, 0xAA, 0xBB]);
        assert_eq!(GetSystemStatusResponse::from_bytes(&bytes).unwrap(), resp);

        let mut short = bytes.clone();
        short[13] = 0x03;
        assert!(GetSystemStatusResponse::from_bytes(&short).is_err());
    }

    #[test]
    fn specification_version_roundtrip() {
        let resp = RequestSpecificationVersionResponse::new_success(
            idm(),
            OptionVersion::new(1, 10).unwrap(),
            vec![OptionVersion::new(1, 0).unwrap(), OptionVersion::new(2, 1).unwrap()],
        )
        .unwrap();
        let bytes = resp.to_bytes();
        assert_eq!(&bytes[12..16], &[0x00, 0x10, 0x01, 0x02]);
        assert_eq!(
            RequestSpecificationVersionResponse::from_bytes(&bytes).unwrap(),
            resp
        );
    }

    #[test]
    fn specification_version_rejects_format() {
        let resp = RequestSpecificationVersionResponse::new_success(
            idm(),
            OptionVersion::new(1, 0).unwrap(),
            vec![],
        )
        .unwrap();
        let mut bytes = resp.to_bytes();
        bytes[12] = 0x01;
        assert!(RequestSpecificationVersionResponse::from_bytes(&bytes).is_err());
    }

    #[test]
    fn status_only_responses() {
        let err = SetParameterResponse::new(idm(), StatusFlags::new(0xFF, 0xA6));
        let back = SetParameterResponse::from_bytes(&err.to_bytes()).unwrap();
        assert!(!back.is_status_successful());
        assert_eq!(back, err);
        assert_eq!(ResetModeResponse::new_success(idm()).to_bytes()[1], 0x3F);
    }
}

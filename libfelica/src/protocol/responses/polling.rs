// libfelica/src/protocol/responses/polling.rs

use crate::constants::command_code::POLLING;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::Response;
use crate::types::{Idm, Pmm, SystemCode};
use crate::Result;

/// Polling response (0x01)
/// Layout: len + code + idm(8) + pmm(8) [+ request_data(2)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingResponse {
    idm: Idm,
    pmm: Pmm,
    request_data: Option<[u8; 2]>,
}

impl PollingResponse {
    const MIN_LEN: usize = 2 + 8 + 8;

    /// A reply without a status; `request_data` is present when polling asked for it.
    pub fn new(idm: Idm, pmm: Pmm, request_data: Option<[u8; 2]>) -> Self {
        Self {
            idm,
            pmm,
            request_data,
        }
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Manufacture parameters.
    pub fn pmm(&self) -> &Pmm {
        &self.pmm
    }

    /// Extra data requested by the polling request code.
    pub fn request_data(&self) -> Option<[u8; 2]> {
        self.request_data
    }

    /// Request data read as a system code (request code 0x01).
    pub fn system_code(&self) -> Option<SystemCode> {
        self.request_data.map(SystemCode::from_bytes)
    }
}

impl Response for PollingResponse {
    const RESPONSE_CODE: u8 = POLLING + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(self.pmm.as_bytes());
        match &self.request_data {
            Some(d) => builder.bytes(d).build(),
            None => builder.build(),
        }
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let pmm = r.pmm()?;
        let request_data = if r.is_empty() {
            None
        } else {
            Some(r.array::<2>()?)
        };
        r.finish()?;
        Ok(Self::new(idm, pmm, request_data))
    }
}

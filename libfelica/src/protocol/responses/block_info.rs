// libfelica/src/protocol/responses/block_info.rs

use super::{expect_error_status, read_status, read_u16_values, require_payload};
use crate::constants::MAX_NODES_V1;
use crate::constants::command_code::{
    GET_AREA_INFORMATION, REQUEST_BLOCK_INFORMATION, REQUEST_BLOCK_INFORMATION_EX,
};
use crate::protocol::commands::NodeCode;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::{CountInformation, Idm};
use crate::{Error, Result};

/// RequestBlockInformation response (0x0F)
/// Layout: len + code + idm(8) + n(1) + block_counts(2*n)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBlockInformationResponse {
    idm: Idm,
    block_counts: Vec<CountInformation>,
}

impl RequestBlockInformationResponse {
    const MIN_LEN: usize = 2 + 8 + 1 + 2;

    /// At most 16 counts.
    pub fn new(idm: Idm, block_counts: Vec<CountInformation>) -> Result<Self> {
        parser::check_count("block count", block_counts.len(), MAX_NODES_V1)?;
        Ok(Self { idm, block_counts })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// One count per requested node, in request order.
    pub fn block_counts(&self) -> &[CountInformation] {
        &self.block_counts
    }
}

impl Response for RequestBlockInformationResponse {
    const RESPONSE_CODE: u8 = REQUEST_BLOCK_INFORMATION + 1;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .byte(self.block_counts.len() as u8)
            .each(&self.block_counts, |c| c.to_bytes().to_vec())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let n = r.byte()? as usize;
        parser::check_count("block count", n, MAX_NODES_V1)?;
        let block_counts = read_u16_values(&mut r, n, CountInformation::from_bytes)?;
        r.finish()?;
        Ok(Self { idm, block_counts })
    }
}

/// RequestBlockInformationEx response (0x1F)
/// Layout: len + code + idm(8) + status(2)
///         [+ n(1) + assigned(2*n) + free(2*n)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBlockInformationExResponse {
    idm: Idm,
    status: StatusFlags,
    assigned_blocks: Vec<CountInformation>,
    free_blocks: Vec<CountInformation>,
}

impl RequestBlockInformationExResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// A successful reply; both lists must have the same length.
    pub fn new_success(
        idm: Idm,
        assigned_blocks: Vec<CountInformation>,
        free_blocks: Vec<CountInformation>,
    ) -> Result<Self> {
        parser::check_count("block count", assigned_blocks.len(), MAX_NODES_V1)?;
        if assigned_blocks.len() != free_blocks.len() {
            return Err(Error::malformed(format!(
                "{} assigned counts but {} free counts",
                assigned_blocks.len(),
                free_blocks.len()
            )));
        }
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            assigned_blocks,
            free_blocks,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            assigned_blocks: Vec::new(),
            free_blocks: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Assigned blocks per node; empty on error.
    pub fn assigned_blocks(&self) -> &[CountInformation] {
        &self.assigned_blocks
    }

    /// Free blocks per node; empty on error.
    pub fn free_blocks(&self) -> &[CountInformation] {
        &self.free_blocks
    }
}

impl HasStatus for RequestBlockInformationExResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for RequestBlockInformationExResponse {
    const RESPONSE_CODE: u8 = REQUEST_BLOCK_INFORMATION_EX + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        if !self.status.is_success() {
            return builder.build();
        }
        builder
            .byte(self.assigned_blocks.len() as u8)
            .each(&self.assigned_blocks, |c| c.to_bytes().to_vec())
            .each(&self.free_blocks, |c| c.to_bytes().to_vec())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let status = read_status(&mut r)?;
        if !status.is_success() {
            r.finish()?;
            return Self::new_error(idm, status);
        }
        let n = r.byte()? as usize;
        parser::check_count("block count", n, MAX_NODES_V1)?;
        let assigned = read_u16_values(&mut r, n, CountInformation::from_bytes)?;
        let free = read_u16_values(&mut r, n, CountInformation::from_bytes)?;
        r.finish()?;
        Self::new_success(idm, assigned, free)
    }
}

/// GetAreaInformation response (0x25)
/// Layout: len + code + idm(8) + status(2) [+ node_code(2) + free_blocks(2)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAreaInformationResponse {
    idm: Idm,
    status: StatusFlags,
    node_code: Option<NodeCode>,
    free_blocks: Option<CountInformation>,
}

impl GetAreaInformationResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// Both payload fields are present on success and absent on error.
    pub fn new(
        idm: Idm,
        status: StatusFlags,
        node_code: Option<NodeCode>,
        free_blocks: Option<CountInformation>,
    ) -> Result<Self> {
        let node_code = require_payload(status, "node code", node_code)?;
        let free_blocks = require_payload(status, "free block count", free_blocks)?;
        Ok(Self {
            idm,
            status,
            node_code,
            free_blocks,
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Node the free block count refers to, on success.
    pub fn node_code(&self) -> Option<NodeCode> {
        self.node_code
    }

    /// Free blocks, on success.
    pub fn free_blocks(&self) -> Option<CountInformation> {
        self.free_blocks
    }
}

impl HasStatus for GetAreaInformationResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for GetAreaInformationResponse {
    const RESPONSE_CODE: u8 = GET_AREA_INFORMATION + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let mut builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        if let Some(code) = &self.node_code {
            builder = builder.bytes(code);
        }
        if let Some(free) = &self.free_blocks {
            builder = builder.bytes(&free.to_bytes());
        }
        builder.build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let status = read_status(&mut r)?;
        let (node_code, free_blocks) = if status.is_success() {
            let code = r.array::<2>()?;
            let free = CountInformation::from_bytes(r.bytes(2)?)?;
            (Some(code), Some(free))
        } else {
            (None, None)
        };
        r.finish()?;
        Self::new(idm, status, node_code, free_blocks)
    }
}

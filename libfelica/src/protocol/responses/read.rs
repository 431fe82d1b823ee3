// libfelica/src/protocol/responses/read.rs

use super::{expect_error_status, read_status};
use crate::constants::BLOCK_LEN;
use crate::constants::command_code::{READ, READ_WITHOUT_ENCRYPTION};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::{BlockData, Idm};
use crate::{Error, Result};

const MIN_LEN: usize = 2 + 8 + 2;

fn check_blocks(blocks: &[BlockData]) -> Result<()> {
    parser::check_frame_len(MIN_LEN + 1 + blocks.len() * BLOCK_LEN)
}

fn encode(code: u8, id: &Idm, status: StatusFlags, blocks: &[BlockData]) -> Vec<u8> {
    let builder = FrameBuilder::new(code)
        .bytes(id.as_bytes())
        .bytes(&status.to_bytes());
    if status.is_success() {
        builder
            .byte(blocks.len() as u8)
            .each(blocks, |b| b.as_bytes().to_vec())
            .build()
    } else {
        builder.build()
    }
}

/// Shared decoder: block data is present iff status flag 1 is zero.
fn decode(data: &[u8], code: u8) -> Result<(Idm, StatusFlags, Vec<BlockData>)> {
    let mut r = parser::open_frame(data, MIN_LEN, code)?;
    let id = r.idm()?;
    let status = read_status(&mut r)?;
    let blocks = if status.is_success() {
        let n = r.byte()? as usize;
        r.chunks(n, BLOCK_LEN)?
            .into_iter()
            .map(BlockData::try_from)
            .collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };
    if !r.is_empty() && !status.is_success() {
        return Err(Error::malformed(format!(
            "error response {} carries {} payload bytes",
            status,
            r.remaining()
        )));
    }
    r.finish()?;
    Ok((id, status, blocks))
}

/// ReadWithoutEncryption response (0x07)
/// Layout: len + code + idm(8) + status(2) [+ block_count(1) + blocks(16*N)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWithoutEncryptionResponse {
    idm: Idm,
    status: StatusFlags,
    blocks: Vec<BlockData>,
}

impl ReadWithoutEncryptionResponse {
    /// A successful reply; the blocks must fit one frame.
    pub fn new_success(idm: Idm, blocks: Vec<BlockData>) -> Result<Self> {
        check_blocks(&blocks)?;
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            blocks,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            blocks: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Blocks read; empty on error.
    pub fn blocks(&self) -> &[BlockData] {
        &self.blocks
    }

    /// Take the blocks read.
    pub fn into_blocks(self) -> Vec<BlockData> {
        self.blocks
    }
}

impl HasStatus for ReadWithoutEncryptionResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for ReadWithoutEncryptionResponse {
    const RESPONSE_CODE: u8 = READ_WITHOUT_ENCRYPTION + 1;

    fn to_bytes(&self) -> Vec<u8> {
        encode(Self::RESPONSE_CODE, &self.idm, self.status, &self.blocks)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idm, status, blocks) = decode(data, Self::RESPONSE_CODE)?;
        Ok(Self {
            idm,
            status,
            blocks,
        })
    }
}

/// Read response (0x15), addressed by IDt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    idt: Idm,
    status: StatusFlags,
    blocks: Vec<BlockData>,
}

impl ReadResponse {
    /// A successful reply; the blocks must fit one frame.
    pub fn new_success(idt: Idm, blocks: Vec<BlockData>) -> Result<Self> {
        check_blocks(&blocks)?;
        Ok(Self {
            idt,
            status: StatusFlags::SUCCESS,
            blocks,
        })
    }

    /// A failed reply.
    pub fn new_error(idt: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idt,
            status,
            blocks: Vec::new(),
        })
    }

    /// Transaction identifier the read was made under.
    pub fn idt(&self) -> &Idm {
        &self.idt
    }

    /// Blocks read; empty on error.
    pub fn blocks(&self) -> &[BlockData] {
        &self.blocks
    }
}

impl HasStatus for ReadResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for ReadResponse {
    const RESPONSE_CODE: u8 = READ + 1;

    fn to_bytes(&self) -> Vec<u8> {
        encode(Self::RESPONSE_CODE, &self.idt, self.status, &self.blocks)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idt, status, blocks) = decode(data, Self::RESPONSE_CODE)?;
        Ok(Self {
            idt,
            status,
            blocks,
        })
    }
}

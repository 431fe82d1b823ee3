// libfelica/src/protocol/commands/write.rs

use super::NodeCode;
use super::read::check_block_list;
use crate::constants::command_code::{WRITE, WRITE_WITHOUT_ENCRYPTION};
use crate::constants::{BLOCK_LEN, MAX_SERVICE_CODE_LIST_ORDER};
use crate::node::Service;
use crate::protocol::block_list::{block_list_len, read_block_list, BlockListElement};
use crate::protocol::parser::{self, FieldReader, FrameBuilder};
use crate::protocol::{Command, WriteResponse, WriteWithoutEncryptionResponse};
use crate::types::{BlockData, Idm};
use crate::{Error, Result};

const MAX_SERVICES: usize = MAX_SERVICE_CODE_LIST_ORDER as usize + 1;

fn check_data(blocks: &[BlockListElement], data: &[BlockData]) -> Result<()> {
    if blocks.len() != data.len() {
        return Err(Error::malformed(format!(
            "{} block list elements but {} data blocks",
            blocks.len(),
            data.len()
        )));
    }
    Ok(())
}

fn read_block_data(r: &mut FieldReader<'_>, count: usize) -> Result<Vec<BlockData>> {
    if r.remaining() != count * BLOCK_LEN {
        return Err(Error::malformed(format!(
            "expected {} bytes of block data, got {}",
            count * BLOCK_LEN,
            r.remaining()
        )));
    }
    r.chunks(count, BLOCK_LEN)?
        .into_iter()
        .map(BlockData::try_from)
        .collect()
}

/// WriteWithoutEncryption (0x08)
/// Layout: len + code + idm(8) + service_count(1) + service_code_list(2*M)
///         + block_count(1) + block_list + block_data(16*N)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteWithoutEncryptionCommand {
    idm: Idm,
    service_codes: Vec<NodeCode>,
    block_list: Vec<BlockListElement>,
    data: Vec<BlockData>,
}

impl WriteWithoutEncryptionCommand {
    const MIN_LEN: usize = 2 + 8 + 1 + 2 + 1 + 2 + BLOCK_LEN;

    /// 1..=16 service codes; one data block per element, and the frame must fit.
    pub fn new(
        idm: Idm,
        service_codes: Vec<NodeCode>,
        block_list: Vec<BlockListElement>,
        data: Vec<BlockData>,
    ) -> Result<Self> {
        parser::check_count("service", service_codes.len(), MAX_SERVICES)?;
        check_block_list(&block_list, service_codes.len())?;
        check_data(&block_list, &data)?;
        parser::check_frame_len(
            2 + 8
                + 1
                + service_codes.len() * 2
                + 1
                + block_list_len(&block_list)
                + data.len() * BLOCK_LEN,
        )?;
        Ok(Self {
            idm,
            service_codes,
            block_list,
            data,
        })
    }

    /// Single-service convenience: write `data[i]` to `block_numbers[i]`.
    pub fn for_service(
        idm: Idm,
        service: Service,
        block_numbers: &[u16],
        data: Vec<BlockData>,
    ) -> Result<Self> {
        let blocks = block_numbers
            .iter()
            .map(|&n| BlockListElement::for_block(0, n))
            .collect::<Result<Vec<_>>>()?;
        Self::new(idm, vec![service.to_bytes()], blocks, data)
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Services, in block list order.
    pub fn service_codes(&self) -> &[NodeCode] {
        &self.service_codes
    }

    /// Blocks to write.
    pub fn block_list(&self) -> &[BlockListElement] {
        &self.block_list
    }

    /// Data, one block per element.
    pub fn data(&self) -> &[BlockData] {
        &self.data
    }
}

impl Command for WriteWithoutEncryptionCommand {
    const COMMAND_CODE: u8 = WRITE_WITHOUT_ENCRYPTION;
    type Response = WriteWithoutEncryptionResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(WRITE_WITHOUT_ENCRYPTION)
            .bytes(self.idm.as_bytes())
            .bytes(&super::node_list_bytes(&self.service_codes))
            .byte(self.block_list.len() as u8)
            .each(&self.block_list, BlockListElement::to_bytes)
            .each(&self.data, |d| d.as_bytes().to_vec())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, WRITE_WITHOUT_ENCRYPTION)?;
        let idm = r.idm()?;
        let m = r.byte()? as usize;
        parser::check_count("service", m, MAX_SERVICES)?;
        let service_codes = r.chunks(m, 2)?.into_iter().map(|c| [c[0], c[1]]).collect();
        let n = r.byte()? as usize;
        let block_list = read_block_list(&mut r, n)?;
        let blocks = read_block_data(&mut r, n)?;
        Self::new(idm, service_codes, block_list, blocks)
    }
}

/// Write (0x16): authenticated write addressed by IDt.
/// Layout: len + code + idt(8) + block_count(1) + block_list + block_data(16*N)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCommand {
    idt: Idm,
    block_list: Vec<BlockListElement>,
    data: Vec<BlockData>,
}

impl WriteCommand {
    const MIN_LEN: usize = 2 + 8 + 1 + 2 + BLOCK_LEN;

    /// Write `data` to `block_list` under transaction `idt`.
    pub fn new(idt: Idm, block_list: Vec<BlockListElement>, data: Vec<BlockData>) -> Result<Self> {
        check_block_list(&block_list, MAX_SERVICES)?;
        check_data(&block_list, &data)?;
        parser::check_frame_len(2 + 8 + 1 + block_list_len(&block_list) + data.len() * BLOCK_LEN)?;
        Ok(Self {
            idt,
            block_list,
            data,
        })
    }

    /// Transaction identifier.
    pub fn idt(&self) -> &Idm {
        &self.idt
    }

    /// Blocks to write.
    pub fn block_list(&self) -> &[BlockListElement] {
        &self.block_list
    }

    /// Data, one block per element.
    pub fn data(&self) -> &[BlockData] {
        &self.data
    }
}

impl Command for WriteCommand {
    const COMMAND_CODE: u8 = WRITE;
    type Response = WriteResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(WRITE)
            .bytes(self.idt.as_bytes())
            .byte(self.block_list.len() as u8)
            .each(&self.block_list, BlockListElement::to_bytes)
            .each(&self.data, |d| d.as_bytes().to_vec())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, WRITE)?;
        let idt = r.idm()?;
        let n = r.byte()? as usize;
        let block_list = read_block_list(&mut r, n)?;
        let blocks = read_block_data(&mut r, n)?;
        Self::new(idt, block_list, blocks)
    }
}

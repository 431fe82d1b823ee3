// libfelica/src/protocol/commands/read.rs

use super::NodeCode;
use crate::constants::command_code::{READ, READ_WITHOUT_ENCRYPTION};
use crate::constants::MAX_SERVICE_CODE_LIST_ORDER;
use crate::node::Service;
use crate::protocol::block_list::{block_list_len, read_block_list, BlockListElement};
use crate::protocol::parser::{self, FrameBuilder, FieldReader};
use crate::protocol::{Command, ReadResponse, ReadWithoutEncryptionResponse};
use crate::types::Idm;
use crate::{Error, Result};

const MAX_SERVICES: usize = MAX_SERVICE_CODE_LIST_ORDER as usize + 1;

/// Every element must point into the service list.
pub(crate) fn check_block_list(blocks: &[BlockListElement], service_count: usize) -> Result<()> {
    if blocks.is_empty() {
        return Err(Error::malformed("empty block list"));
    }
    if blocks.len() > u8::MAX as usize {
        return Err(Error::malformed(format!("{} block list elements", blocks.len())));
    }
    if let Some(bad) = blocks
        .iter()
        .find(|b| b.service_code_list_order() as usize >= service_count)
    {
        return Err(Error::malformed(format!(
            "block list element refers to service {} of {}",
            bad.service_code_list_order(),
            service_count
        )));
    }
    Ok(())
}

fn read_service_codes(r: &mut FieldReader<'_>) -> Result<Vec<NodeCode>> {
    let m = r.byte()? as usize;
    parser::check_count("service", m, MAX_SERVICES)?;
    Ok(r.chunks(m, 2)?.into_iter().map(|c| [c[0], c[1]]).collect())
}

/// ReadWithoutEncryption (0x06)
/// Layout: len + code + idm(8) + service_count(1) + service_code_list(2*M)
///         + block_count(1) + block_list(2 or 3 each)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWithoutEncryptionCommand {
    idm: Idm,
    service_codes: Vec<NodeCode>,
    block_list: Vec<BlockListElement>,
}

impl ReadWithoutEncryptionCommand {
    const MIN_LEN: usize = 2 + 8 + 1 + 2 + 1 + 2;

    /// 1..=16 service codes; every element must point into the list and the frame must fit.
    pub fn new(
        idm: Idm,
        service_codes: Vec<NodeCode>,
        block_list: Vec<BlockListElement>,
    ) -> Result<Self> {
        parser::check_count("service", service_codes.len(), MAX_SERVICES)?;
        check_block_list(&block_list, service_codes.len())?;
        parser::check_frame_len(
            2 + 8 + 1 + service_codes.len() * 2 + 1 + block_list_len(&block_list),
        )?;
        Ok(Self {
            idm,
            service_codes,
            block_list,
        })
    }

    /// Build the service list from typed services.
    pub fn for_services(
        idm: Idm,
        services: &[Service],
        block_list: Vec<BlockListElement>,
    ) -> Result<Self> {
        Self::new(idm, services.iter().map(Service::to_bytes).collect(), block_list)
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Services, in block list order.
    pub fn service_codes(&self) -> &[NodeCode] {
        &self.service_codes
    }

    /// Blocks to read.
    pub fn block_list(&self) -> &[BlockListElement] {
        &self.block_list
    }
}

impl Command for ReadWithoutEncryptionCommand {
    const COMMAND_CODE: u8 = READ_WITHOUT_ENCRYPTION;
    type Response = ReadWithoutEncryptionResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(READ_WITHOUT_ENCRYPTION)
            .bytes(self.idm.as_bytes())
            .bytes(&super::node_list_bytes(&self.service_codes))
            .byte(self.block_list.len() as u8)
            .each(&self.block_list, BlockListElement::to_bytes)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, READ_WITHOUT_ENCRYPTION)?;
        let idm = r.idm()?;
        let service_codes = read_service_codes(&mut r)?;
        let n = r.byte()? as usize;
        let block_list = read_block_list(&mut r, n)?;
        r.finish()?;
        Self::new(idm, service_codes, block_list)
    }
}

/// Read (0x14): authenticated read addressed by IDt. The services are
/// the ones named during mutual authentication, so no service list.
/// Layout: len + code + idt(8) + block_count(1) + block_list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCommand {
    idt: Idm,
    block_list: Vec<BlockListElement>,
}

impl ReadCommand {
    const MIN_LEN: usize = 2 + 8 + 1 + 2;

    /// Read `block_list` under transaction `idt`.
    pub fn new(idt: Idm, block_list: Vec<BlockListElement>) -> Result<Self> {
        check_block_list(&block_list, MAX_SERVICES)?;
        parser::check_frame_len(2 + 8 + 1 + block_list_len(&block_list))?;
        Ok(Self { idt, block_list })
    }

    /// Transaction identifier.
    pub fn idt(&self) -> &Idm {
        &self.idt
    }

    /// Blocks to read.
    pub fn block_list(&self) -> &[BlockListElement] {
        &self.block_list
    }
}

impl Command for ReadCommand {
    const COMMAND_CODE: u8 = READ;
    type Response = ReadResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(READ)
            .bytes(self.idt.as_bytes())
            .byte(self.block_list.len() as u8)
            .each(&self.block_list, BlockListElement::to_bytes)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, READ)?;
        let idt = r.idm()?;
        let n = r.byte()? as usize;
        let block_list = read_block_list(&mut r, n)?;
        r.finish()?;
        Self::new(idt, block_list)
    }
}

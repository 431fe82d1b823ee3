// libfelica/src/negotiation/batch.rs

use crate::node::Service;
use crate::protocol::{BlockListElement, ReadWithoutEncryptionCommand};
use crate::types::Idm;
use crate::Result;

/// Ceiling used for services whose block count is not known yet. Block
/// numbers are 16 bits wide, so no service can hold more.
pub(crate) const UNBOUNDED_BLOCKS: u32 = 0x1_0000;

/// Read progress of one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceProgress {
    /// Service being read.
    pub service: Service,
    /// Blocks already read; also the next block number to request.
    pub read: u32,
    /// Known block count, `None` while unknown.
    pub ceiling: Option<u32>,
}

impl ServiceProgress {
    /// Nothing read yet, block count unknown.
    pub fn new(service: Service) -> Self {
        Self {
            service,
            read: 0,
            ceiling: None,
        }
    }

    /// Blocks still to read; large while the block count is unknown.
    pub fn remaining(&self) -> u32 {
        self.ceiling
            .unwrap_or(UNBOUNDED_BLOCKS)
            .saturating_sub(self.read)
    }
}

/// Batch size ceilings for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Most blocks in one request.
    pub max_blocks: u8,
    /// Most services in one request.
    pub max_services: u8,
}

/// One service's share of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchEntry {
    /// Index into the progress list the batch was planned from.
    pub slot: usize,
    /// Service the blocks belong to.
    pub service: Service,
    /// First block number requested.
    pub first_block: u16,
    /// Number of consecutive blocks requested.
    pub count: u16,
}

/// The services and block list of one ReadWithoutEncryption round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    entries: Vec<BatchEntry>,
    elements: Vec<BlockListElement>,
}

impl Batch {
    /// Per-service shares, in block list order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// The block list sent to the card.
    pub fn elements(&self) -> &[BlockListElement] {
        &self.elements
    }

    /// Services in access order.
    pub fn services(&self) -> Vec<Service> {
        self.entries.iter().map(|e| e.service).collect()
    }

    /// Number of distinct services.
    pub fn service_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of block list elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the batch requests nothing.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The entry an element at `position` reads from.
    pub fn owner_of(&self, position: usize) -> Option<(&BatchEntry, &BlockListElement)> {
        let element = self.elements.get(position)?;
        let entry = self
            .entries
            .get(element.service_code_list_order() as usize)?;
        Some((entry, element))
    }

    /// The ReadWithoutEncryption command for this batch.
    pub fn to_command(&self, idm: Idm) -> Result<ReadWithoutEncryptionCommand> {
        ReadWithoutEncryptionCommand::for_services(idm, &self.services(), self.elements.clone())
    }
}

/// Assemble the next batch: walk services in order, giving each up to its
/// remaining block count until either ceiling is reached. `None` once no
/// service has anything left to read.
pub fn plan_batch(progress: &[ServiceProgress], limits: Limits) -> Result<Option<Batch>> {
    let max_blocks = limits.max_blocks as usize;
    let max_services = limits.max_services as usize;
    let mut entries = Vec::new();
    let mut elements = Vec::new();

    for (slot, p) in progress.iter().enumerate() {
        if entries.len() >= max_services || elements.len() >= max_blocks {
            break;
        }
        let remaining = p.remaining() as usize;
        if remaining == 0 {
            continue;
        }
        let take = remaining.min(max_blocks - elements.len());
        let order = entries.len() as u8;
        for i in 0..take {
            let block = (p.read as usize + i) as u16;
            elements.push(BlockListElement::for_block(order, block)?);
        }
        entries.push(BatchEntry {
            slot,
            service: p.service,
            first_block: p.read as u16,
            count: take as u16,
        });
    }

    if elements.is_empty() {
        return Ok(None);
    }
    Ok(Some(Batch { entries, elements }))
}

// libfelica/src/protocol/block_list.rs

use crate::constants::MAX_SERVICE_CODE_LIST_ORDER;
use crate::protocol::parser::FieldReader;
use crate::{Error, Result};

/// Block access mode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessMode {
    /// Normal access.
    Normal = 0,
    /// Cashback access to a purse service.
    Cashback = 1,
}

impl AccessMode {
    /// Decode the 3 mode bits.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Cashback),
            other => Err(Error::malformed(format!(
                "block list access mode {} is not defined",
                other
            ))),
        }
    }
}

/// One entry of a block list.
///
/// Normal form (2 bytes): `[1 | mode(3) | order(4)] [block]`.
/// Extended form (3 bytes): `[0 | mode(3) | order(4)] [block lo] [block hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockListElement {
    service_code_list_order: u8,
    block_number: u16,
    access_mode: AccessMode,
    extended: bool,
}

impl BlockListElement {
    const LENGTH_BIT: u8 = 0x80;

    /// An element addressing `block_number` of the service at
    /// `service_code_list_order` in the command's service code list.
    /// The 2-byte form only holds block numbers up to 255.
    pub fn new(
        service_code_list_order: u8,
        block_number: u16,
        access_mode: AccessMode,
        extended: bool,
    ) -> Result<Self> {
        if service_code_list_order > MAX_SERVICE_CODE_LIST_ORDER {
            return Err(Error::malformed(format!(
                "service code list order {} exceeds {}",
                service_code_list_order, MAX_SERVICE_CODE_LIST_ORDER
            )));
        }
        if !extended && block_number > 0xFF {
            return Err(Error::malformed(format!(
                "block number {} needs the extended form",
                block_number
            )));
        }
        Ok(Self {
            service_code_list_order,
            block_number,
            access_mode,
            extended,
        })
    }

    /// Normal access, choosing the narrowest form that fits.
    pub fn for_block(service_code_list_order: u8, block_number: u16) -> Result<Self> {
        Self::new(
            service_code_list_order,
            block_number,
            AccessMode::Normal,
            block_number > 0xFF,
        )
    }

    /// Index into the command's service code list.
    pub fn service_code_list_order(&self) -> u8 {
        self.service_code_list_order
    }

    /// Block number within the service.
    pub fn block_number(&self) -> u16 {
        self.block_number
    }

    /// Access mode.
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Whether the element uses the 3-byte form.
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Bytes on the wire, 2 or 3.
    pub fn encoded_len(&self) -> usize {
        if self.extended { 3 } else { 2 }
    }

    /// Encode the element.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = ((self.access_mode as u8) << 4) | self.service_code_list_order;
        if self.extended {
            let [lo, hi] = self.block_number.to_le_bytes();
            vec![head, lo, hi]
        } else {
            vec![Self::LENGTH_BIT | head, self.block_number as u8]
        }
    }

    /// Decode one element; the length bit picks the form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = FieldReader::new(bytes);
        let element = Self::read(&mut r)?;
        if !r.is_empty() {
            return Err(Error::malformed(format!(
                "block list element of {} bytes",
                bytes.len()
            )));
        }
        Ok(element)
    }

    /// Read one element; its width is given by the length bit.
    pub(crate) fn read(r: &mut FieldReader<'_>) -> Result<Self> {
        let head = r.byte()?;
        let access_mode = AccessMode::from_bits((head >> 4) & 0x07)?;
        let order = head & 0x0F;
        if head & Self::LENGTH_BIT != 0 {
            let block = r.byte()?;
            Self::new(order, block as u16, access_mode, false)
        } else {
            let block = r.le_u16()?;
            Self::new(order, block, access_mode, true)
        }
    }
}

/// Read `count` elements from a message body.
pub(crate) fn read_block_list(
    r: &mut FieldReader<'_>,
    count: usize,
) -> Result<Vec<BlockListElement>> {
    (0..count).map(|_| BlockListElement::read(r)).collect()
}

/// Encoded size of a block list.
pub(crate) fn block_list_len(elements: &[BlockListElement]) -> usize {
    elements.iter().map(BlockListElement::encoded_len).sum()
}

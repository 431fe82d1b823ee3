// libfelica/src/node/service.rs

use crate::constants::MAX_NODE_NUMBER;
use crate::{Error, Result};

/// Service attribute: the low 6 bits of a service code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceAttribute {
    /// Random access, read/write, keyed (0x08).
    RandomRwWithKey,
    /// Random access, read/write, no key (0x09).
    RandomRwWithoutKey,
    /// Random access, read-only, keyed (0x0A).
    RandomRoWithKey,
    /// Random access, read-only, no key (0x0B).
    RandomRoWithoutKey,
    /// Cyclic, read/write, keyed (0x0C).
    CyclicRwWithKey,
    /// Cyclic, read/write, no key (0x0D).
    CyclicRwWithoutKey,
    /// Cyclic, read-only, keyed (0x0E).
    CyclicRoWithKey,
    /// Cyclic, read-only, no key (0x0F).
    CyclicRoWithoutKey,
    /// Purse, direct access, keyed (0x10).
    PurseDirectWithKey,
    /// Purse, direct access, no key (0x11).
    PurseDirectWithoutKey,
    /// Purse, cashback, keyed (0x12).
    PurseCashbackWithKey,
    /// Purse, cashback, no key (0x13).
    PurseCashbackWithoutKey,
    /// Purse, decrement, keyed (0x14).
    PurseDecrementWithKey,
    /// Purse, decrement, no key (0x15).
    PurseDecrementWithoutKey,
    /// Purse, read-only, keyed (0x16).
    PurseRoWithKey,
    /// Purse, read-only, no key (0x17).
    PurseRoWithoutKey,
    /// Any other attribute bits.
    Unknown(u8),
}

impl ServiceAttribute {
    /// Decode the low 6 bits of a service code.
    pub fn from_bits(bits: u8) -> Self {
        use ServiceAttribute::*;
        match bits & 0x3F {
            0x08 => RandomRwWithKey,
            0x09 => RandomRwWithoutKey,
            0x0A => RandomRoWithKey,
            0x0B => RandomRoWithoutKey,
            0x0C => CyclicRwWithKey,
            0x0D => CyclicRwWithoutKey,
            0x0E => CyclicRoWithKey,
            0x0F => CyclicRoWithoutKey,
            0x10 => PurseDirectWithKey,
            0x11 => PurseDirectWithoutKey,
            0x12 => PurseCashbackWithKey,
            0x13 => PurseCashbackWithoutKey,
            0x14 => PurseDecrementWithKey,
            0x15 => PurseDecrementWithoutKey,
            0x16 => PurseRoWithKey,
            0x17 => PurseRoWithoutKey,
            other => Unknown(other),
        }
    }

    /// Low 6 bits of the service code.
    pub fn bits(&self) -> u8 {
        use ServiceAttribute::*;
        match self {
            RandomRwWithKey => 0x08,
            RandomRwWithoutKey => 0x09,
            RandomRoWithKey => 0x0A,
            RandomRoWithoutKey => 0x0B,
            CyclicRwWithKey => 0x0C,
            CyclicRwWithoutKey => 0x0D,
            CyclicRoWithKey => 0x0E,
            CyclicRoWithoutKey => 0x0F,
            PurseDirectWithKey => 0x10,
            PurseDirectWithoutKey => 0x11,
            PurseCashbackWithKey => 0x12,
            PurseCashbackWithoutKey => 0x13,
            PurseDecrementWithKey => 0x14,
            PurseDecrementWithoutKey => 0x15,
            PurseRoWithKey => 0x16,
            PurseRoWithoutKey => 0x17,
            Unknown(b) => b & 0x3F,
        }
    }

    /// Bit 0 clear means the service is protected by a key.
    pub fn requires_key(&self) -> bool {
        self.bits() & 0x01 == 0
    }

    /// Whether this is one of the purse attributes.
    pub fn is_purse(&self) -> bool {
        matches!(self.bits(), 0x10..=0x17)
    }

    /// Whether the bits name a known attribute.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// A service node: a sequence of 16 byte blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Service {
    number: u16,
    attribute: u8,
}

impl Service {
    /// Code length on the wire.
    pub const CODE_LEN: usize = 2;

    /// A service from its number and attribute; `number` must fit 10 bits.
    pub fn new(number: u16, attribute: ServiceAttribute) -> Result<Self> {
        if number > MAX_NODE_NUMBER {
            return Err(Error::malformed(format!(
                "service number {} out of range",
                number
            )));
        }
        Ok(Self {
            number,
            attribute: attribute.bits(),
        })
    }

    /// Build from a packed 16-bit service code.
    pub fn from_code(code: u16) -> Self {
        Self {
            number: code >> 6,
            attribute: (code & 0x3F) as u8,
        }
    }

    /// Node number.
    pub fn number(&self) -> u16 {
        self.number
    }

    /// Attribute bits, decoded.
    pub fn attribute(&self) -> ServiceAttribute {
        ServiceAttribute::from_bits(self.attribute)
    }

    /// Packed 16-bit service code.
    pub fn code(&self) -> u16 {
        (self.number << 6) | self.attribute as u16
    }

    /// Whether blocks can be read with ReadWithoutEncryption.
    pub fn is_readable_without_key(&self) -> bool {
        let attr = self.attribute();
        attr.is_known() && !attr.requires_key()
    }

    /// Decode a little-endian service code. `FFFF` is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::CODE_LEN {
            return Err(Error::InvalidLength {
                expected: Self::CODE_LEN,
                actual: bytes.len(),
            });
        }
        let code = u16::from_le_bytes([bytes[0], bytes[1]]);
        if code == 0xFFFF {
            return Err(Error::malformed("FFFF is the system code, not a service"));
        }
        Ok(Self::from_code(code))
    }

    /// Little-endian wire form.
    pub fn to_bytes(&self) -> [u8; 2] {
        self.code().to_le_bytes()
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.code())
    }
}

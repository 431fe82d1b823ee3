// libfelica/src/node/area.rs

use crate::constants::MAX_NODE_NUMBER;
use crate::{Error, Result};

/// Attribute bits of an area's start code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaAttribute {
    /// Sub-areas may be created inside.
    CanCreateSubArea,
    /// No sub-areas may be created inside.
    CannotCreateSubArea,
    /// Any other attribute bits.
    Unknown(u8),
}

impl AreaAttribute {
    /// Decode the low 6 bits of a start code.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3F {
            0x00 => Self::CanCreateSubArea,
            0x01 => Self::CannotCreateSubArea,
            other => Self::Unknown(other),
        }
    }

    /// Low 6 bits of the start code.
    pub fn bits(&self) -> u8 {
        match self {
            Self::CanCreateSubArea => 0x00,
            Self::CannotCreateSubArea => 0x01,
            Self::Unknown(b) => b & 0x3F,
        }
    }
}

/// Attribute bits of an area's end code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndAreaAttribute {
    /// End of a sub-area.
    EndSubArea,
    /// End of the root area.
    EndRootArea,
    /// Any other attribute bits.
    Unknown(u8),
}

impl EndAreaAttribute {
    /// Decode the low 6 bits of an end code.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3F {
            0x3E => Self::EndSubArea,
            0x3F => Self::EndRootArea,
            other => Self::Unknown(other),
        }
    }

    /// Low 6 bits of the end code.
    pub fn bits(&self) -> u8 {
        match self {
            Self::EndSubArea => 0x3E,
            Self::EndRootArea => 0x3F,
            Self::Unknown(b) => b & 0x3F,
        }
    }
}

/// An area node: a container spanning node numbers `number..=end_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    number: u16,
    attribute: AreaAttribute,
    end_number: u16,
    end_attribute: EndAreaAttribute,
}

impl Area {
    /// Code length on the wire (start code + end code).
    pub const CODE_LEN: usize = 4;

    /// An area spanning `number..=end_number`.
    pub fn new(
        number: u16,
        attribute: AreaAttribute,
        end_number: u16,
        end_attribute: EndAreaAttribute,
    ) -> Result<Self> {
        if number > MAX_NODE_NUMBER || end_number > MAX_NODE_NUMBER {
            return Err(Error::malformed(format!(
                "area number out of range: {}..={}",
                number, end_number
            )));
        }
        if end_number < number {
            return Err(Error::malformed(format!(
                "area end number {} precedes start number {}",
                end_number, number
            )));
        }
        Ok(Self {
            number,
            attribute,
            end_number,
            end_attribute,
        })
    }

    /// The root area (`0000..FFFF`) present in every system.
    pub fn root() -> Self {
        Self {
            number: 0,
            attribute: AreaAttribute::CanCreateSubArea,
            end_number: MAX_NODE_NUMBER,
            end_attribute: EndAreaAttribute::EndRootArea,
        }
    }

    /// First node number.
    pub fn number(&self) -> u16 {
        self.number
    }

    /// Start code attribute.
    pub fn attribute(&self) -> AreaAttribute {
        self.attribute
    }

    /// Last node number.
    pub fn end_number(&self) -> u16 {
        self.end_number
    }

    /// End code attribute.
    pub fn end_attribute(&self) -> EndAreaAttribute {
        self.end_attribute
    }

    /// Decode two little-endian words, `(number << 6) | attribute` each.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::CODE_LEN {
            return Err(Error::InvalidLength {
                expected: Self::CODE_LEN,
                actual: bytes.len(),
            });
        }
        let start = u16::from_le_bytes([bytes[0], bytes[1]]);
        let end = u16::from_le_bytes([bytes[2], bytes[3]]);
        Self::new(
            start >> 6,
            AreaAttribute::from_bits((start & 0x3F) as u8),
            end >> 6,
            EndAreaAttribute::from_bits((end & 0x3F) as u8),
        )
    }

    /// Start code followed by end code, little-endian.
    pub fn to_bytes(&self) -> [u8; 4] {
        let start = (self.number << 6) | self.attribute.bits() as u16;
        let end = (self.end_number << 6) | self.end_attribute.bits() as u16;
        let [s0, s1] = start.to_le_bytes();
        let [e0, e1] = end.to_le_bytes();
        [s0, s1, e0, e1]
    }

    /// Start code only, as used in node-code lists that address areas.
    pub fn start_code(&self) -> [u8; 2] {
        let [s0, s1, _, _] = self.to_bytes();
        [s0, s1]
    }
}

// libfelica/src/protocol/responses/node_property.rs

use super::{expect_error_status, read_status};
use crate::constants::MAX_NODES_V1;
use crate::constants::command_code::GET_NODE_PROPERTY;
use crate::protocol::commands::NodePropertyType;
use crate::protocol::parser::{self, FieldReader, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::Idm;
use crate::{Error, Result};

/// Value-limited purse service settings (10 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueLimitedPurseProperty {
    /// Whether the purse limits are enforced.
    pub enabled: bool,
    /// Highest allowed balance.
    pub upper_limit: i32,
    /// Lowest allowed balance.
    pub lower_limit: i32,
    /// Bumped on every change of the settings.
    pub generation_number: u8,
}

impl ValueLimitedPurseProperty {
    /// Bytes on the wire.
    pub const LEN: usize = 10;

    /// Decode the 10-byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(Error::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut r = FieldReader::new(bytes);
        let enabled = bool_byte(r.byte()?)?;
        let upper_limit = i32::from_le_bytes(r.array()?);
        let lower_limit = i32::from_le_bytes(r.array()?);
        let generation_number = r.byte()?;
        Ok(Self {
            enabled,
            upper_limit,
            lower_limit,
            generation_number,
        })
    }

    /// Encode the 10-byte form.
    pub fn to_bytes(&self) -> [u8; 10] {
        let mut out = [0u8; 10];
        out[0] = self.enabled as u8;
        out[1..5].copy_from_slice(&self.upper_limit.to_le_bytes());
        out[5..9].copy_from_slice(&self.lower_limit.to_le_bytes());
        out[9] = self.generation_number;
        out
    }
}

fn bool_byte(b: u8) -> Result<bool> {
    match b {
        0x00 => Ok(false),
        0x01 => Ok(true),
        other => Err(Error::malformed(format!("boolean byte {:#04x}", other))),
    }
}

/// A node property decoded for a known property type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeProperty {
    /// Value-limited purse settings.
    ValueLimitedPurse(ValueLimitedPurseProperty),
    /// Whether MAC communication is enabled.
    MacCommunication(bool),
    /// Bytes of a property type this crate does not decode.
    Raw(Vec<u8>),
}

impl NodeProperty {
    /// Decode `bytes` as a property of `property_type`.
    pub fn decode(property_type: NodePropertyType, bytes: &[u8]) -> Result<Self> {
        match property_type {
            NodePropertyType::ValueLimitedPurseService => {
                ValueLimitedPurseProperty::from_bytes(bytes).map(Self::ValueLimitedPurse)
            }
            NodePropertyType::MacCommunication => match bytes {
                [b] => bool_byte(*b).map(Self::MacCommunication),
                _ => Err(Error::InvalidLength {
                    expected: 1,
                    actual: bytes.len(),
                }),
            },
            NodePropertyType::Unknown(_) => Ok(Self::Raw(bytes.to_vec())),
        }
    }

    /// Encode back to property bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::ValueLimitedPurse(p) => p.to_bytes().to_vec(),
            Self::MacCommunication(b) => vec![*b as u8],
            Self::Raw(v) => v.clone(),
        }
    }
}

/// GetNodeProperty response (0x29)
/// Layout: len + code + idm(8) + status(2) [+ n(1) + property data]
///
/// The property data is split evenly across the `n` nodes; the response
/// does not say which property type was asked for, so [`typed`] takes it.
///
/// [`typed`]: GetNodePropertyResponse::typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNodePropertyResponse {
    idm: Idm,
    status: StatusFlags,
    properties: Vec<Vec<u8>>,
}

impl GetNodePropertyResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// A successful reply; every node's property must have the same length.
    pub fn new_success(idm: Idm, properties: Vec<Vec<u8>>) -> Result<Self> {
        parser::check_count("node property", properties.len(), MAX_NODES_V1)?;
        let width = properties[0].len();
        if width == 0 || properties.iter().any(|p| p.len() != width) {
            return Err(Error::malformed(
                "node properties must be non-empty and of equal width",
            ));
        }
        parser::check_frame_len(Self::MIN_LEN + 1 + width * properties.len())?;
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            properties,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            properties: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Raw property bytes, one entry per requested node.
    pub fn properties(&self) -> &[Vec<u8>] {
        &self.properties
    }

    /// Properties decoded as `property_type`.
    pub fn typed(&self, property_type: NodePropertyType) -> Result<Vec<NodeProperty>> {
        self.properties
            .iter()
            .map(|p| NodeProperty::decode(property_type, p))
            .collect()
    }
}

impl HasStatus for GetNodePropertyResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for GetNodePropertyResponse {
    const RESPONSE_CODE: u8 = GET_NODE_PROPERTY + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        if !self.status.is_success() {
            return builder.build();
        }
        builder
            .byte(self.properties.len() as u8)
            .each(&self.properties, |p| p.clone())
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
        parser::check_count("node property", n, MAX_NODES_V1)?;
        let rest = r.rest();
        if rest.is_empty() || rest.len() % n != 0 {
            return Err(Error::malformed(format!(
                "{} property bytes cannot be shared by {} nodes",
                rest.len(),
                n
            )));
        }
        let properties = rest.chunks(rest.len() / n).map(<[u8]>::to_vec).collect();
        Self::new_success(idm, properties)
    }
}

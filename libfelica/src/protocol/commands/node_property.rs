// libfelica/src/protocol/commands/node_property.rs

use super::{NodeCode, check_node_codes, node_codes_of, node_list_bytes, read_node_list};
use crate::constants::MAX_NODES_V1;
use crate::constants::command_code::GET_NODE_PROPERTY;
use crate::node::Node;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{Command, GetNodePropertyResponse};
use crate::types::Idm;
use crate::Result;

/// Which property GetNodeProperty asks for. Unknown values are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodePropertyType {
    /// Value-limited purse settings (0x00).
    ValueLimitedPurseService,
    /// MAC communication flag (0x01).
    MacCommunication,
    /// Any other property type.
    Unknown(u8),
}

impl NodePropertyType {
    /// Decode a property type byte.
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::ValueLimitedPurseService,
            0x01 => Self::MacCommunication,
            other => Self::Unknown(other),
        }
    }

    /// Property type byte.
    pub fn to_byte(&self) -> u8 {
        match self {
            Self::ValueLimitedPurseService => 0x00,
            Self::MacCommunication => 0x01,
            Self::Unknown(b) => *b,
        }
    }

    /// Bytes per node in the response, if fixed.
    pub fn property_len(&self) -> Option<usize> {
        match self {
            Self::ValueLimitedPurseService => Some(10),
            Self::MacCommunication => Some(1),
            Self::Unknown(_) => None,
        }
    }
}

/// GetNodeProperty (0x28)
/// Layout: len + code + idm(8) + property_type(1) + n(1) + node_codes(2*n)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNodePropertyCommand {
    idm: Idm,
    property_type: NodePropertyType,
    node_codes: Vec<NodeCode>,
}

impl GetNodePropertyCommand {
    const MIN_LEN: usize = 2 + 8 + 1 + 1 + 2;

    /// 1..=16 node codes.
    pub fn new(idm: Idm, property_type: NodePropertyType, node_codes: Vec<NodeCode>) -> Result<Self> {
        check_node_codes(&node_codes, MAX_NODES_V1)?;
        Ok(Self {
            idm,
            property_type,
            node_codes,
        })
    }

    /// Build the code list from typed nodes.
    pub fn from_nodes(idm: Idm, property_type: NodePropertyType, nodes: &[Node]) -> Result<Self> {
        Self::new(idm, property_type, node_codes_of(nodes))
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Property asked for.
    pub fn property_type(&self) -> NodePropertyType {
        self.property_type
    }

    /// Nodes to query.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.node_codes
    }
}

impl Command for GetNodePropertyCommand {
    const COMMAND_CODE: u8 = GET_NODE_PROPERTY;
    type Response = GetNodePropertyResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(GET_NODE_PROPERTY)
            .bytes(self.idm.as_bytes())
            .byte(self.property_type.to_byte())
            .bytes(&node_list_bytes(&self.node_codes))
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, GET_NODE_PROPERTY)?;
        let idm = r.idm()?;
        let property_type = NodePropertyType::from_byte(r.byte()?);
        let node_codes = read_node_list(&mut r, MAX_NODES_V1)?;
        r.finish()?;
        Self::new(idm, property_type, node_codes)
    }
}

// libfelica/src/protocol/commands/block_info.rs

use super::{NodeCode, check_node_codes, node_codes_of, node_list_bytes, read_node_list};
use crate::constants::MAX_NODES_V1;
use crate::constants::command_code::{
    GET_AREA_INFORMATION, REQUEST_BLOCK_INFORMATION, REQUEST_BLOCK_INFORMATION_EX,
};
use crate::node::Node;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{
    Command, GetAreaInformationResponse, RequestBlockInformationExResponse,
    RequestBlockInformationResponse,
};
use crate::types::Idm;
use crate::Result;

fn encode_node_query(code: u8, idm: &Idm, node_codes: &[NodeCode]) -> Vec<u8> {
    FrameBuilder::new(code)
        .bytes(idm.as_bytes())
        .bytes(&node_list_bytes(node_codes))
        .build()
}

fn decode_node_query(data: &[u8], code: u8) -> Result<(Idm, Vec<NodeCode>)> {
    let mut r = parser::open_frame(data, 2 + 8 + 1 + 2, code)?;
    let idm = r.idm()?;
    let node_codes = read_node_list(&mut r, MAX_NODES_V1)?;
    r.finish()?;
    Ok((idm, node_codes))
}

/// RequestBlockInformation (0x0E): number of blocks assigned to nodes.
/// Layout: len + code + idm(8) + node_count(1) + node_code_list(2*N)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBlockInformationCommand {
    idm: Idm,
    node_codes: Vec<NodeCode>,
}

impl RequestBlockInformationCommand {
    /// 1..=16 node codes.
    pub fn new(idm: Idm, node_codes: Vec<NodeCode>) -> Result<Self> {
        check_node_codes(&node_codes, MAX_NODES_V1)?;
        Ok(Self { idm, node_codes })
    }

    /// Build the code list from typed nodes.
    pub fn from_nodes(idm: Idm, nodes: &[Node]) -> Result<Self> {
        Self::new(idm, node_codes_of(nodes))
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Nodes to count.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.node_codes
    }
}

impl Command for RequestBlockInformationCommand {
    const COMMAND_CODE: u8 = REQUEST_BLOCK_INFORMATION;
    type Response = RequestBlockInformationResponse;

    fn to_bytes(&self) -> Vec<u8> {
        encode_node_query(REQUEST_BLOCK_INFORMATION, &self.idm, &self.node_codes)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idm, node_codes) = decode_node_query(data, REQUEST_BLOCK_INFORMATION)?;
        Ok(Self { idm, node_codes })
    }
}

/// RequestBlockInformationEx (0x1E): assigned and free block counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBlockInformationExCommand {
    idm: Idm,
    node_codes: Vec<NodeCode>,
}

impl RequestBlockInformationExCommand {
    /// 1..=16 node codes.
    pub fn new(idm: Idm, node_codes: Vec<NodeCode>) -> Result<Self> {
        check_node_codes(&node_codes, MAX_NODES_V1)?;
        Ok(Self { idm, node_codes })
    }

    /// Build the code list from typed nodes.
    pub fn from_nodes(idm: Idm, nodes: &[Node]) -> Result<Self> {
        Self::new(idm, node_codes_of(nodes))
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Nodes to count.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.node_codes
    }
}

impl Command for RequestBlockInformationExCommand {
    const COMMAND_CODE: u8 = REQUEST_BLOCK_INFORMATION_EX;
    type Response = RequestBlockInformationExResponse;

    fn to_bytes(&self) -> Vec<u8> {
        encode_node_query(REQUEST_BLOCK_INFORMATION_EX, &self.idm, &self.node_codes)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let (idm, node_codes) = decode_node_query(data, REQUEST_BLOCK_INFORMATION_EX)?;
        Ok(Self { idm, node_codes })
    }
}

/// GetAreaInformation (0x24)
/// Layout: len + code + idm(8) + node_code(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetAreaInformationCommand {
    /// Card addressed.
    pub idm: Idm,
    /// Area to query.
    pub node_code: NodeCode,
}

impl GetAreaInformationCommand {
    const LEN: usize = 2 + 8 + 2;

    /// Query `node_code`.
    pub fn new(idm: Idm, node_code: NodeCode) -> Self {
        Self { idm, node_code }
    }

    /// Query `node` by its short code.
    pub fn for_node(idm: Idm, node: &Node) -> Self {
        Self::new(idm, node.short_code())
    }
}

impl Command for GetAreaInformationCommand {
    const COMMAND_CODE: u8 = GET_AREA_INFORMATION;
    type Response = GetAreaInformationResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(GET_AREA_INFORMATION)
            .bytes(self.idm.as_bytes())
            .bytes(&self.node_code)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, GET_AREA_INFORMATION)?;
        let idm = r.idm()?;
        let node_code = r.array::<2>()?;
        r.finish()?;
        Ok(Self::new(idm, node_code))
    }
}

// libfelica/src/protocol/commands/mod.rs

mod auth;
mod block_info;
mod container;
mod node_property;
mod polling;
mod read;
mod search;
mod service;
mod system;
mod write;

pub use auth::{
    Authentication1AesCommand, Authentication1Command, Authentication1DesCommand,
    Authentication2AesDesCommand, Authentication2Command,
};
pub use block_info::{
    GetAreaInformationCommand, RequestBlockInformationCommand, RequestBlockInformationExCommand,
};
pub use container::{
    GetContainerIdCommand, GetContainerIssueInformationCommand, GetContainerPropertyCommand,
};
pub use node_property::{GetNodePropertyCommand, NodePropertyType};
pub use polling::{PollingCommand, RequestCode, TimeSlot};
pub use read::{ReadCommand, ReadWithoutEncryptionCommand};
pub use search::{RequestCodeListCommand, SearchServiceCodeCommand};
pub use service::{RequestResponseCommand, RequestServiceCommand, RequestServiceV2Command};
pub use system::{
    EncryptionType, GetSystemStatusCommand, PacketType, RequestSpecificationVersionCommand,
    RequestSystemCodeCommand, ResetModeCommand, SetParameterCommand,
};
pub use write::{WriteCommand, WriteWithoutEncryptionCommand};

use crate::node::Node;
use crate::protocol::parser::{self, FieldReader};
use crate::Result;

/// Node codes as they appear in node-code lists.
pub type NodeCode = [u8; 2];

pub(crate) fn node_codes_of(nodes: &[Node]) -> Vec<NodeCode> {
    nodes.iter().map(Node::short_code).collect()
}

/// Validate a node list length.
pub(crate) fn check_node_codes(codes: &[NodeCode], max: usize) -> Result<()> {
    parser::check_count("node code", codes.len(), max)
}

/// Read `[n][code * n]`, validating `1..=max`.
pub(crate) fn read_node_list(r: &mut FieldReader<'_>, max: usize) -> Result<Vec<NodeCode>> {
    let n = r.byte()? as usize;
    parser::check_count("node code", n, max)?;
    let codes = r
        .chunks(n, 2)?
        .into_iter()
        .map(|c| [c[0], c[1]])
        .collect();
    Ok(codes)
}

pub(crate) fn node_list_bytes(codes: &[NodeCode]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + codes.len() * 2);
    out.push(codes.len() as u8);
    for c in codes {
        out.extend_from_slice(c);
    }
    out
}

// libfelica/src/protocol/commands/service.rs

use super::{NodeCode, check_node_codes, node_codes_of, node_list_bytes, read_node_list};
use crate::constants::command_code::{REQUEST_RESPONSE, REQUEST_SERVICE, REQUEST_SERVICE_V2};
use crate::constants::{MAX_NODES_V1, MAX_NODES_V2};
use crate::node::Node;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{Command, RequestResponseResponse, RequestServiceResponse, RequestServiceV2Response};
use crate::types::Idm;
use crate::Result;

/// RequestService (0x02): key versions of up to 16 nodes.
/// Layout: len + code + idm(8) + node_count(1) + node_code_list(2*N)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestServiceCommand {
    idm: Idm,
    node_codes: Vec<NodeCode>,
}

impl RequestServiceCommand {
    const MIN_LEN: usize = 2 + 8 + 1 + 2;

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

    /// Nodes whose key versions are wanted.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.node_codes
    }
}

impl Command for RequestServiceCommand {
    const COMMAND_CODE: u8 = REQUEST_SERVICE;
    type Response = RequestServiceResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(REQUEST_SERVICE)
            .bytes(self.idm.as_bytes())
            .bytes(&node_list_bytes(&self.node_codes))
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, REQUEST_SERVICE)?;
        let idm = r.idm()?;
        let node_codes = read_node_list(&mut r, MAX_NODES_V1)?;
        r.finish()?;
        Ok(Self { idm, node_codes })
    }
}

/// RequestResponse (0x04): current mode of the card.
/// Layout: len + code + idm(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestResponseCommand {
    /// Card addressed.
    pub idm: Idm,
}

impl RequestResponseCommand {
    const LEN: usize = 2 + 8;

    /// Ask `idm` for its mode.
    pub fn new(idm: Idm) -> Self {
        Self { idm }
    }
}

impl Command for RequestResponseCommand {
    const COMMAND_CODE: u8 = REQUEST_RESPONSE;
    type Response = RequestResponseResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(REQUEST_RESPONSE)
            .bytes(self.idm.as_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, REQUEST_RESPONSE)?;
        let idm = r.idm()?;
        r.finish()?;
        Ok(Self { idm })
    }
}

/// RequestServiceV2 (0x32): AES/DES key versions of up to 32 nodes.
/// Layout: len + code + idm(8) + node_count(1) + node_code_list(2*N)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestServiceV2Command {
    idm: Idm,
    node_codes: Vec<NodeCode>,
}

impl RequestServiceV2Command {
    const MIN_LEN: usize = 2 + 8 + 1 + 2;

    /// 1..=32 node codes.
    pub fn new(idm: Idm, node_codes: Vec<NodeCode>) -> Result<Self> {
        check_node_codes(&node_codes, MAX_NODES_V2)?;
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

    /// Nodes whose key versions are wanted.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.node_codes
    }
}

impl Command for RequestServiceV2Command {
    const COMMAND_CODE: u8 = REQUEST_SERVICE_V2;
    type Response = RequestServiceV2Response;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(REQUEST_SERVICE_V2)
            .bytes(self.idm.as_bytes())
            .bytes(&node_list_bytes(&self.node_codes))
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, REQUEST_SERVICE_V2)?;
        let idm = r.idm()?;
        let node_codes = read_node_list(&mut r, MAX_NODES_V2)?;
        r.finish()?;
        Ok(Self { idm, node_codes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Area, Service, ServiceAttribute, System};

    fn idm() -> Idm {
        Idm::from_bytes([1, 2, 3, 4, 5, 6, 7, 8])
    }

    #[test]
    fn encode_request_service_basic() {
        let cmd = RequestServiceCommand::new(idm(), vec![[0x01, 0x10], [0x02, 0x10]]).unwrap();
        let p = cmd.to_bytes();
        let mut expected = vec![15, 0x02];
        expected.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        expected.push(2);
        expected.extend_from_slice(&[0x01, 0x10, 0x02, 0x10]);
        assert_eq!(p, expected);
        assert_eq!(RequestServiceCommand::from_bytes(&p).unwrap(), cmd);
    }

    #[test]
    fn request_service_from_nodes() {
        let svc = Service::new(0x24, ServiceAttribute::CyclicRoWithoutKey).unwrap();
        let nodes = [Node::Area(Area::root()), Node::Service(svc), Node::System(System)];
        let cmd = RequestServiceCommand::from_nodes(idm(), &nodes).unwrap();
        assert_eq!(cmd.node_codes(), &[[0x00, 0x00], [0x0F, 0x09], [0xFF, 0xFF]]);
    }

    #[test]
    fn node_list_bounds() {
        assert!(RequestServiceCommand::new(idm(), vec![]).is_err());
        assert!(RequestServiceCommand::new(idm(), vec![[0, 0]; 17]).is_err());
        RequestServiceCommand::new(idm(), vec![[0, 0]; 16]).unwrap();
        assert!(RequestServiceV2Command::new(idm(), vec![]).is_err());
        assert!(RequestServiceV2Command::new(idm(), vec![[0, 0]; 33]).is_err());
        RequestServiceV2Command::new(idm(), vec![[0, 0]; 32]).unwrap();
    }

    #[test]
    fn decode_rejects_count_mismatch() {
        let mut bytes = RequestServiceCommand::new(idm(), vec![[0x01, 0x10]])
            .unwrap()
            .to_bytes();
        bytes[10] = 2; // claims two codes, carries one
        assert!(RequestServiceCommand::from_bytes(&bytes).is_err());
    }

    #[test]
    fn encode_request_response_basic() {
        let p = RequestResponseCommand::new(Idm::from_bytes([9; 8])).to_bytes();
        let mut expected = vec![10, 0x04];
        expected.extend_from_slice(&[9; 8]);
        assert_eq!(p, expected);
        assert_eq!(
            RequestResponseCommand::from_bytes(&p).unwrap().idm,
            Idm::from_bytes([9; 8])
        );
    }
}

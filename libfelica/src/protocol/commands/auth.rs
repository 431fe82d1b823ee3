// libfelica/src/protocol/commands/auth.rs

//! Mutual authentication setup commands. These are carried as data only;
//! computing challenge responses is up to the caller.

use super::{NodeCode, check_node_codes, node_codes_of, node_list_bytes, read_node_list};
use crate::constants::command_code::{
    AUTHENTICATION1, AUTHENTICATION1_AES, AUTHENTICATION1_DES, AUTHENTICATION2,
    AUTHENTICATION2_AES_DES,
};
use crate::constants::{AES_CHALLENGE_LEN, DES_CHALLENGE_LEN, MAX_NODES_V1};
use crate::node::{Area, Node, Service};
use crate::protocol::parser::{self, FieldReader, FrameBuilder};
use crate::protocol::{
    Authentication1AesResponse, Authentication1DesResponse, Authentication1Response,
    Authentication2AesDesResponse, Authentication2Response, Command,
};
use crate::types::Idm;
use crate::{Error, Result};

fn read_codes(r: &mut FieldReader<'_>, count: usize) -> Result<Vec<NodeCode>> {
    Ok(r.chunks(count, 2)?
        .into_iter()
        .map(|c| [c[0], c[1]])
        .collect())
}

/// Authentication1 (0x10)
/// Layout: len + code + idm(8) + area_count(1) + area_codes(2*M)
///         + service_count(1) + service_codes(2*N) + challenge(8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication1Command {
    idm: Idm,
    area_codes: Vec<NodeCode>,
    service_codes: Vec<NodeCode>,
    challenge: [u8; DES_CHALLENGE_LEN],
}

impl Authentication1Command {
    const MIN_LEN: usize = 2 + 8 + 1 + 1 + 2 + DES_CHALLENGE_LEN;

    /// Areas and services together must number 1..=16.
    pub fn new(
        idm: Idm,
        area_codes: Vec<NodeCode>,
        service_codes: Vec<NodeCode>,
        challenge: [u8; DES_CHALLENGE_LEN],
    ) -> Result<Self> {
        parser::check_count("node code", area_codes.len() + service_codes.len(), MAX_NODES_V1)?;
        Ok(Self {
            idm,
            area_codes,
            service_codes,
            challenge,
        })
    }

    /// Build the code lists from typed nodes.
    pub fn from_nodes(
        idm: Idm,
        areas: &[Area],
        services: &[Service],
        challenge: [u8; DES_CHALLENGE_LEN],
    ) -> Result<Self> {
        Self::new(
            idm,
            areas.iter().map(Area::start_code).collect(),
            services.iter().map(Service::to_bytes).collect(),
            challenge,
        )
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Area start codes.
    pub fn area_codes(&self) -> &[NodeCode] {
        &self.area_codes
    }

    /// Service codes.
    pub fn service_codes(&self) -> &[NodeCode] {
        &self.service_codes
    }

    /// The reader's challenge.
    pub fn challenge(&self) -> &[u8; DES_CHALLENGE_LEN] {
        &self.challenge
    }
}

impl Command for Authentication1Command {
    const COMMAND_CODE: u8 = AUTHENTICATION1;
    type Response = Authentication1Response;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(AUTHENTICATION1)
            .bytes(self.idm.as_bytes())
            .bytes(&node_list_bytes(&self.area_codes))
            .bytes(&node_list_bytes(&self.service_codes))
            .bytes(&self.challenge)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, AUTHENTICATION1)?;
        let idm = r.idm()?;
        let m = r.byte()? as usize;
        let area_codes = read_codes(&mut r, m)?;
        let n = r.byte()? as usize;
        let service_codes = read_codes(&mut r, n)?;
        let challenge = r.array::<DES_CHALLENGE_LEN>()?;
        r.finish()?;
        Self::new(idm, area_codes, service_codes, challenge)
    }
}

/// Authentication2 (0x12)
/// Layout: len + code + idm(8) + challenge_response(8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication2Command {
    /// Card addressed.
    pub idm: Idm,
    /// The card's challenge, encrypted by the reader.
    pub challenge_response: [u8; DES_CHALLENGE_LEN],
}

impl Authentication2Command {
    const LEN: usize = 2 + 8 + DES_CHALLENGE_LEN;

    /// Answer the card's challenge.
    pub fn new(idm: Idm, challenge_response: [u8; DES_CHALLENGE_LEN]) -> Self {
        Self {
            idm,
            challenge_response,
        }
    }
}

impl Command for Authentication2Command {
    const COMMAND_CODE: u8 = AUTHENTICATION2;
    type Response = Authentication2Response;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(AUTHENTICATION2)
            .bytes(self.idm.as_bytes())
            .bytes(&self.challenge_response)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, AUTHENTICATION2)?;
        let idm = r.idm()?;
        let challenge_response = r.array::<DES_CHALLENGE_LEN>()?;
        r.finish()?;
        Ok(Self::new(idm, challenge_response))
    }
}

/// Slice-to-array for challenges with a friendly error.
fn challenge_from_slice<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        Error::malformed(format!(
            "challenge must be {} bytes, got {}",
            N,
            bytes.len()
        ))
    })
}

/// Shared shape of the AES and DES first-pass commands:
/// `idm(8) + reserved(1) + n(1) + node_codes(2*n) + challenge(N)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeChallenge<const N: usize> {
    idm: Idm,
    node_codes: Vec<NodeCode>,
    challenge: [u8; N],
}

impl<const N: usize> NodeChallenge<N> {
    fn new(idm: Idm, node_codes: Vec<NodeCode>, challenge: &[u8]) -> Result<Self> {
        check_node_codes(&node_codes, MAX_NODES_V1)?;
        let challenge = challenge_from_slice::<N>(challenge)?;
        Ok(Self {
            idm,
            node_codes,
            challenge,
        })
    }

    fn encode(&self, code: u8) -> Vec<u8> {
        FrameBuilder::new(code)
            .bytes(self.idm.as_bytes())
            .byte(0x00)
            .bytes(&node_list_bytes(&self.node_codes))
            .bytes(&self.challenge)
            .build()
    }

    fn decode(data: &[u8], code: u8) -> Result<Self> {
        let mut r = parser::open_frame(data, 2 + 8 + 1 + 1 + 2 + N, code)?;
        let idm = r.idm()?;
        parser::expect_reserved_zero("reserved", &[r.byte()?])?;
        let node_codes = read_node_list(&mut r, MAX_NODES_V1)?;
        let challenge = r.array::<N>()?;
        r.finish()?;
        Ok(Self {
            idm,
            node_codes,
            challenge,
        })
    }
}

/// Authentication1 for AES keys (0x40).
/// Layout: len + code + idm(8) + reserved(1) + n(1) + node_codes(2*n) + challenge(16)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication1AesCommand(NodeChallenge<AES_CHALLENGE_LEN>);

impl Authentication1AesCommand {
    /// `challenge` must be 16 bytes; 1..=16 node codes.
    pub fn new(idm: Idm, node_codes: Vec<NodeCode>, challenge: &[u8]) -> Result<Self> {
        NodeChallenge::new(idm, node_codes, challenge).map(Self)
    }

    /// Build the code list from typed nodes.
    pub fn from_nodes(idm: Idm, nodes: &[Node], challenge: &[u8]) -> Result<Self> {
        Self::new(idm, node_codes_of(nodes), challenge)
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.0.idm
    }

    /// Node codes to authenticate.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.0.node_codes
    }

    /// The reader's challenge.
    pub fn challenge(&self) -> &[u8; AES_CHALLENGE_LEN] {
        &self.0.challenge
    }
}

impl Command for Authentication1AesCommand {
    const COMMAND_CODE: u8 = AUTHENTICATION1_AES;
    type Response = Authentication1AesResponse;

    fn to_bytes(&self) -> Vec<u8> {
        self.0.encode(AUTHENTICATION1_AES)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        NodeChallenge::decode(data, AUTHENTICATION1_AES).map(Self)
    }
}

/// Authentication1 for DES keys (0x42).
/// Layout: len + code + idm(8) + reserved(1) + n(1) + node_codes(2*n) + challenge(8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication1DesCommand(NodeChallenge<DES_CHALLENGE_LEN>);

impl Authentication1DesCommand {
    /// `challenge` must be 8 bytes; 1..=16 node codes.
    pub fn new(idm: Idm, node_codes: Vec<NodeCode>, challenge: &[u8]) -> Result<Self> {
        NodeChallenge::new(idm, node_codes, challenge).map(Self)
    }

    /// Build the code list from typed nodes.
    pub fn from_nodes(idm: Idm, nodes: &[Node], challenge: &[u8]) -> Result<Self> {
        Self::new(idm, node_codes_of(nodes), challenge)
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.0.idm
    }

    /// Node codes to authenticate.
    pub fn node_codes(&self) -> &[NodeCode] {
        &self.0.node_codes
    }

    /// The reader's challenge.
    pub fn challenge(&self) -> &[u8; DES_CHALLENGE_LEN] {
        &self.0.challenge
    }
}

impl Command for Authentication1DesCommand {
    const COMMAND_CODE: u8 = AUTHENTICATION1_DES;
    type Response = Authentication1DesResponse;

    fn to_bytes(&self) -> Vec<u8> {
        self.0.encode(AUTHENTICATION1_DES)
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        NodeChallenge::decode(data, AUTHENTICATION1_DES).map(Self)
    }
}

/// Second pass for both AES and DES (0x44).
/// Layout: len + code + idm(8) + reserved(1) + challenge_response(16)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication2AesDesCommand {
    idm: Idm,
    challenge_response: [u8; AES_CHALLENGE_LEN],
}

impl Authentication2AesDesCommand {
    const LEN: usize = 2 + 8 + 1 + AES_CHALLENGE_LEN;

    /// `challenge_response` must be 16 bytes.
    pub fn new(idm: Idm, challenge_response: &[u8]) -> Result<Self> {
        Ok(Self {
            idm,
            challenge_response: challenge_from_slice(challenge_response)?,
        })
    }

    /// Card addressed.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// The card's challenge, encrypted by the reader.
    pub fn challenge_response(&self) -> &[u8; AES_CHALLENGE_LEN] {
        &self.challenge_response
    }
}

impl Command for Authentication2AesDesCommand {
    const COMMAND_CODE: u8 = AUTHENTICATION2_AES_DES;
    type Response = Authentication2AesDesResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(AUTHENTICATION2_AES_DES)
            .bytes(self.idm.as_bytes())
            .byte(0x00)
            .bytes(&self.challenge_response)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, AUTHENTICATION2_AES_DES)?;
        let idm = r.idm()?;
        parser::expect_reserved_zero("reserved", &[r.byte()?])?;
        let challenge_response = r.array::<AES_CHALLENGE_LEN>()?;
        r.finish()?;
        Ok(Self {
            idm,
            challenge_response,
        })
    }
}

// libfelica/src/node/mod.rs

//! Nodes of the FeliCa file system: areas, services and the system itself.

mod area;
mod service;

pub use area::{Area, AreaAttribute, EndAreaAttribute};
pub use service::{Service, ServiceAttribute};

use crate::constants::SYSTEM_NODE_CODE;
use crate::{Error, Result};

/// The system node. It has a fixed code and contains everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct System;

/// Any addressable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// An area.
    Area(Area),
    /// A service.
    Service(Service),
    /// The system node.
    System(System),
}

impl Node {
    /// Packed node code: 4 bytes for areas, 2 bytes otherwise.
    pub fn code(&self) -> Vec<u8> {
        match self {
            Node::Area(a) => a.to_bytes().to_vec(),
            Node::Service(s) => s.to_bytes().to_vec(),
            Node::System(_) => SYSTEM_NODE_CODE.to_vec(),
        }
    }

    /// The 2-byte code used in node-code lists (an area is addressed by
    /// its start code).
    pub fn short_code(&self) -> [u8; 2] {
        match self {
            Node::Area(a) => a.start_code(),
            Node::Service(s) => s.to_bytes(),
            Node::System(_) => SYSTEM_NODE_CODE,
        }
    }

    /// Node number; the system node has none.
    pub fn number(&self) -> Option<u16> {
        match self {
            Node::Area(a) => Some(a.number()),
            Node::Service(s) => Some(s.number()),
            Node::System(_) => None,
        }
    }

    /// Classify a raw node code: 4 bytes is an area, `FFFF` the system,
    /// any other 2 bytes a service.
    pub fn from_code(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            Area::CODE_LEN => Area::from_bytes(bytes).map(Node::Area),
            2 if bytes == SYSTEM_NODE_CODE => Ok(Node::System(System)),
            2 => Service::from_bytes(bytes).map(Node::Service),
            n => Err(Error::malformed(format!("node code of {} bytes", n))),
        }
    }

    /// Whether `self` lies inside `other`. See [`belongs_to`].
    pub fn belongs_to(&self, other: &Node) -> bool {
        belongs_to(self, other)
    }
}

impl From<Area> for Node {
    fn from(a: Area) -> Self {
        Node::Area(a)
    }
}

impl From<Service> for Node {
    fn from(s: Service) -> Self {
        Node::Service(s)
    }
}

impl From<System> for Node {
    fn from(s: System) -> Self {
        Node::System(s)
    }
}

/// Containment rules. Only areas contain anything; a system belongs to
/// nothing and nothing belongs to a service.
pub fn belongs_to(node: &Node, parent: &Node) -> bool {
    let Node::Area(container) = parent else {
        return false;
    };
    let within = |n: u16| container.number() <= n && n <= container.end_number();
    match node {
        Node::System(_) => false,
        Node::Service(s) => within(s.number()),
        Node::Area(a) => a != container && within(a.number()),
    }
}

// libfelica/src/protocol/responses/search.rs

use super::{expect_error_status, read_status};
use crate::constants::SYSTEM_NODE_CODE;
use crate::constants::command_code::{REQUEST_CODE_LIST, SEARCH_SERVICE_CODE};
use crate::node::{Area, Node, Service};
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::status::{HasStatus, StatusFlags};
use crate::protocol::Response;
use crate::types::Idm;
use crate::{Error, Result};

/// SearchServiceCode response (0x0B)
/// Layout: len + code + idm(8) + node_code(4 for an area, 2 otherwise)
///
/// `FFFF` marks the end of the enumeration and decodes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchServiceCodeResponse {
    idm: Idm,
    node: Option<Node>,
}

impl SearchServiceCodeResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// `node` must be an area or a service; `None` is the terminator.
    pub fn new(idm: Idm, node: Option<Node>) -> Result<Self> {
        if let Some(Node::System(_)) = node {
            return Err(Error::malformed(
                "search result cannot be the system node, use None for the end marker",
            ));
        }
        Ok(Self { idm, node })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// The node found, or `None` at the end.
    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    /// Whether this reply ends the enumeration.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }
}

impl Response for SearchServiceCodeResponse {
    const RESPONSE_CODE: u8 = SEARCH_SERVICE_CODE + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let code = match &self.node {
            Some(node) => node.code(),
            None => SYSTEM_NODE_CODE.to_vec(),
        };
        FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&code)
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::MIN_LEN, Self::RESPONSE_CODE)?;
        let idm = r.idm()?;
        let code = r.rest();
        let node = match Node::from_code(code)? {
            Node::System(_) => None,
            other => Some(other),
        };
        Ok(Self { idm, node })
    }
}

/// RequestCodeList response (0x1B)
/// Layout: len + code + idm(8) + status(2)
///         [+ continue(1) + n(1) + area_codes(4*n) + m(1) + service_codes(2*m)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCodeListResponse {
    idm: Idm,
    status: StatusFlags,
    has_more: bool,
    areas: Vec<Area>,
    services: Vec<Service>,
}

impl RequestCodeListResponse {
    const MIN_LEN: usize = 2 + 8 + 2;

    /// A successful page.
    pub fn new_success(
        idm: Idm,
        has_more: bool,
        areas: Vec<Area>,
        services: Vec<Service>,
    ) -> Result<Self> {
        if areas.len() > u8::MAX as usize || services.len() > u8::MAX as usize {
            return Err(Error::malformed("too many codes for one page"));
        }
        parser::check_frame_len(Self::MIN_LEN + 3 + areas.len() * 4 + services.len() * 2)?;
        Ok(Self {
            idm,
            status: StatusFlags::SUCCESS,
            has_more,
            areas,
            services,
        })
    }

    /// A failed reply.
    pub fn new_error(idm: Idm, status: StatusFlags) -> Result<Self> {
        expect_error_status(status)?;
        Ok(Self {
            idm,
            status,
            has_more: false,
            areas: Vec::new(),
            services: Vec::new(),
        })
    }

    /// Card answering.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Whether another page follows at a higher index.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Areas on this page.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Services on this page.
    pub fn services(&self) -> &[Service] {
        &self.services
    }
}

impl HasStatus for RequestCodeListResponse {
    fn status(&self) -> StatusFlags {
        self.status
    }
}

impl Response for RequestCodeListResponse {
    const RESPONSE_CODE: u8 = REQUEST_CODE_LIST + 1;

    fn to_bytes(&self) -> Vec<u8> {
        let builder = FrameBuilder::new(Self::RESPONSE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.status.to_bytes());
        if !self.status.is_success() {
            return builder.build();
        }
        builder
            .byte(self.has_more as u8)
            .byte(self.areas.len() as u8)
            .each(&self.areas, |a| a.to_bytes().to_vec())
            .byte(self.services.len() as u8)
            .each(&self.services, |s| s.to_bytes().to_vec())
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
        let has_more = match r.byte()? {
            0x00 => false,
            0x01 => true,
            other => return Err(Error::malformed(format!("continue flag {:#04x}", other))),
        };
        let n = r.byte()? as usize;
        let areas = r
            .chunks(n, Area::CODE_LEN)?
            .into_iter()
            .map(Area::from_bytes)
            .collect::<Result<Vec<_>>>()?;
        let m = r.byte()? as usize;
        let services = r
            .chunks(m, Service::CODE_LEN)?
            .into_iter()
            .map(Service::from_bytes)
            .collect::<Result<Vec<_>>>()?;
        r.finish()?;
        Self::new_success(idm, has_more, areas, services)
    }
}

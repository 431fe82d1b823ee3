// libfelica/src/protocol/commands/search.rs

use super::NodeCode;
use crate::constants::command_code::{REQUEST_CODE_LIST, SEARCH_SERVICE_CODE};
use crate::node::Area;
use crate::protocol::parser::{self, FrameBuilder};
use crate::protocol::{Command, RequestCodeListResponse, SearchServiceCodeResponse};
use crate::types::Idm;
use crate::Result;

/// SearchServiceCode (0x0A): enumerate nodes by index.
/// Layout: len + code + idm(8) + index(2, LE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchServiceCodeCommand {
    /// Card addressed.
    pub idm: Idm,
    /// Position in the enumeration, from 0.
    pub index: u16,
}

impl SearchServiceCodeCommand {
    const LEN: usize = 2 + 8 + 2;

    /// Ask for the node at `index`.
    pub fn new(idm: Idm, index: u16) -> Self {
        Self { idm, index }
    }
}

impl Command for SearchServiceCodeCommand {
    const COMMAND_CODE: u8 = SEARCH_SERVICE_CODE;
    type Response = SearchServiceCodeResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(SEARCH_SERVICE_CODE)
            .bytes(self.idm.as_bytes())
            .bytes(&self.index.to_le_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, SEARCH_SERVICE_CODE)?;
        let idm = r.idm()?;
        let index = r.le_u16()?;
        r.finish()?;
        Ok(Self { idm, index })
    }
}

/// RequestCodeList (0x1A): page through the children of an area.
/// Layout: len + code + idm(8) + parent_area_code(2) + index(2, LE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCodeListCommand {
    /// Card addressed.
    pub idm: Idm,
    /// Area whose children are listed.
    pub parent_area_code: NodeCode,
    /// First child to list.
    pub index: u16,
}

impl RequestCodeListCommand {
    const LEN: usize = 2 + 8 + 2 + 2;

    /// List children of `parent_area_code` from `index`.
    pub fn new(idm: Idm, parent_area_code: NodeCode, index: u16) -> Self {
        Self {
            idm,
            parent_area_code,
            index,
        }
    }

    /// List children of `parent`.
    pub fn for_area(idm: Idm, parent: &Area, index: u16) -> Self {
        Self::new(idm, parent.start_code(), index)
    }
}

impl Command for RequestCodeListCommand {
    const COMMAND_CODE: u8 = REQUEST_CODE_LIST;
    type Response = RequestCodeListResponse;

    fn to_bytes(&self) -> Vec<u8> {
        FrameBuilder::new(REQUEST_CODE_LIST)
            .bytes(self.idm.as_bytes())
            .bytes(&self.parent_area_code)
            .bytes(&self.index.to_le_bytes())
            .build()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = parser::open_frame(data, Self::LEN, REQUEST_CODE_LIST)?;
        let idm = r.idm()?;
        let parent_area_code = r.array::<2>()?;
        let index = r.le_u16()?;
        r.finish()?;
        Ok(Self::new(idm, parent_area_code, index))
    }
}

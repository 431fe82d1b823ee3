// libfelica/src/constants.rs
//! Common protocol constants used across the crate

/// Length of an IDm / IDt / PMm field.
pub const IDM_LEN: usize = 8;

/// Length of one data block.
pub const BLOCK_LEN: usize = 16;

/// Largest frame the length byte can describe.
pub const MAX_FRAME_LEN: usize = 255;

/// Upper bound of the service-code list order nibble, so at most 16
/// services can be addressed by one block list.
pub const MAX_SERVICE_CODE_LIST_ORDER: u8 = 15;

/// Largest area/service number (10 bits).
pub const MAX_NODE_NUMBER: u16 = 1023;

/// Node code used to address the system itself.
pub const SYSTEM_NODE_CODE: [u8; 2] = [0xFF, 0xFF];

/// Default ceilings used before a card's real limits are known.
pub const DEFAULT_MAX_BLOCKS_PER_REQUEST: u8 = 15;
/// Default services per read request.
pub const DEFAULT_MAX_SERVICES_PER_REQUEST: u8 = 16;

/// A read response frame has room for at most 15 blocks.
pub const MAX_BLOCKS_PER_READ: u8 = 15;

/// Bitmask error location can only name 8 positions.
pub const BITMASK_MAX_BLOCKS_PER_REQUEST: u8 = 8;

/// Consecutive failed rounds before a block read gives up.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 24;

/// Node-list bounds per command generation.
pub const MAX_NODES_V1: usize = 16;
/// Node list limit of RequestServiceV2.
pub const MAX_NODES_V2: usize = 32;

/// Challenge lengths for the authentication setup commands.
pub const DES_CHALLENGE_LEN: usize = 8;
/// Challenge length of the AES authentication commands.
pub const AES_CHALLENGE_LEN: usize = 16;

/// Command codes. The response code is always `command + 1`.
pub mod command_code {
    /// Polling.
    pub const POLLING: u8 = 0x00;
    /// RequestService.
    pub const REQUEST_SERVICE: u8 = 0x02;
    /// RequestResponse.
    pub const REQUEST_RESPONSE: u8 = 0x04;
    /// ReadWithoutEncryption.
    pub const READ_WITHOUT_ENCRYPTION: u8 = 0x06;
    /// WriteWithoutEncryption.
    pub const WRITE_WITHOUT_ENCRYPTION: u8 = 0x08;
    /// SearchServiceCode.
    pub const SEARCH_SERVICE_CODE: u8 = 0x0A;
    /// RequestSystemCode.
    pub const REQUEST_SYSTEM_CODE: u8 = 0x0C;
    /// RequestBlockInformation.
    pub const REQUEST_BLOCK_INFORMATION: u8 = 0x0E;
    /// Authentication1.
    pub const AUTHENTICATION1: u8 = 0x10;
    /// Authentication2.
    pub const AUTHENTICATION2: u8 = 0x12;
    /// Read (authenticated).
    pub const READ: u8 = 0x14;
    /// Write (authenticated).
    pub const WRITE: u8 = 0x16;
    /// RequestCodeList.
    pub const REQUEST_CODE_LIST: u8 = 0x1A;
    /// RequestBlockInformationEx.
    pub const REQUEST_BLOCK_INFORMATION_EX: u8 = 0x1E;
    /// SetParameter.
    pub const SET_PARAMETER: u8 = 0x20;
    /// GetContainerIssueInformation.
    pub const GET_CONTAINER_ISSUE_INFORMATION: u8 = 0x22;
    /// GetAreaInformation.
    pub const GET_AREA_INFORMATION: u8 = 0x24;
    /// GetNodeProperty.
    pub const GET_NODE_PROPERTY: u8 = 0x28;
    /// GetContainerProperty.
    pub const GET_CONTAINER_PROPERTY: u8 = 0x2E;
    /// RequestServiceV2.
    pub const REQUEST_SERVICE_V2: u8 = 0x32;
    /// GetSystemStatus.
    pub const GET_SYSTEM_STATUS: u8 = 0x38;
    /// RequestSpecificationVersion.
    pub const REQUEST_SPECIFICATION_VERSION: u8 = 0x3C;
    /// ResetMode.
    pub const RESET_MODE: u8 = 0x3E;
    /// Authentication1 (AES).
    pub const AUTHENTICATION1_AES: u8 = 0x40;
    /// Authentication1 (DES).
    pub const AUTHENTICATION1_DES: u8 = 0x42;
    /// Authentication2 (AES/DES).
    pub const AUTHENTICATION2_AES_DES: u8 = 0x44;
    /// GetContainerId.
    pub const GET_CONTAINER_ID: u8 = 0x70;
}

/// Status flag 2 error codes the block reader understands.
pub mod status_code {
    /// Too many service codes in one request.
    pub const ILLEGAL_NUMBER_OF_SERVICE: u8 = 0xA1;
    /// Too many block list elements in one request.
    pub const ILLEGAL_NUMBER_OF_BLOCK: u8 = 0xA2;
    /// A block list element names a service order outside the service list.
    pub const ILLEGAL_BLOCK_LIST_SERVICE_ORDER: u8 = 0xA3;
    /// Service type does not allow the access.
    pub const ILLEGAL_SERVICE_TYPE: u8 = 0xA4;
    /// Access denied.
    pub const ACCESS_DENIED: u8 = 0xA5;
    /// Unknown service code.
    pub const ILLEGAL_SERVICE_CODE_LIST: u8 = 0xA6;
    /// Access mode not allowed for the service.
    pub const ILLEGAL_BLOCK_LIST_ACCESS_MODE: u8 = 0xA7;
    /// Block number past the end of the service.
    pub const ILLEGAL_BLOCK_NUMBER: u8 = 0xA8;
}

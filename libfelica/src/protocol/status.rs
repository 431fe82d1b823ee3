// libfelica/src/protocol/status.rs

use crate::constants::status_code;

/// The two status flag bytes carried by most responses. Status flag 1 is
/// `0x00` on success and otherwise locates the error; status flag 2 holds
/// the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusFlags {
    /// Error location, or 0x00 on success.
    pub status1: u8,
    /// Error code.
    pub status2: u8,
}

impl StatusFlags {
    /// Both flags zero.
    pub const SUCCESS: Self = Self {
        status1: 0x00,
        status2: 0x00,
    };

    /// Flags from their two bytes.
    pub const fn new(status1: u8, status2: u8) -> Self {
        Self { status1, status2 }
    }

    /// Whether status flag 1 reports success.
    pub fn is_success(&self) -> bool {
        self.status1 == 0x00
    }

    /// Wire form.
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.status1, self.status2]
    }

    /// Classify the error code for the block reader.
    pub fn kind(&self) -> StatusKind {
        if self.is_success() {
            return StatusKind::Success;
        }
        match self.status2 {
            status_code::ILLEGAL_NUMBER_OF_SERVICE => StatusKind::IllegalNumberOfService,
            status_code::ILLEGAL_NUMBER_OF_BLOCK => StatusKind::IllegalNumberOfBlock,
            status_code::ILLEGAL_BLOCK_LIST_SERVICE_ORDER => {
                StatusKind::IllegalBlockListServiceOrder
            }
            status_code::ILLEGAL_BLOCK_NUMBER => StatusKind::IllegalBlockNumber,
            _ => StatusKind::Other,
        }
    }
}

impl std::fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:#04x}, {:#04x})", self.status1, self.status2)
    }
}

impl From<StatusFlags> for crate::Error {
    fn from(s: StatusFlags) -> Self {
        crate::Error::FelicaStatus {
            status1: s.status1,
            status2: s.status2,
        }
    }
}

/// How the block reader treats a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Status flag 1 is 0x00.
    Success,
    /// 0xA1: too many services.
    IllegalNumberOfService,
    /// 0xA2: too many blocks.
    IllegalNumberOfBlock,
    /// 0xA3: service order out of range.
    IllegalBlockListServiceOrder,
    /// 0xA8: block number past the end of a service.
    IllegalBlockNumber,
    /// Any other error code.
    Other,
}

/// Implemented by every response that carries status flags.
pub trait HasStatus {
    /// Status flags of the response.
    fn status(&self) -> StatusFlags;

    /// Whether the status reports success.
    fn is_status_successful(&self) -> bool {
        self.status().is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(StatusFlags::SUCCESS.kind(), StatusKind::Success);
        // A success status ignores flag 2.
        assert_eq!(StatusFlags::new(0x00, 0xA1).kind(), StatusKind::Success);
        assert_eq!(
            StatusFlags::new(0xFF, 0xA1).kind(),
            StatusKind::IllegalNumberOfService
        );
        assert_eq!(
            StatusFlags::new(0x01, 0xA8).kind(),
            StatusKind::IllegalBlockNumber
        );
        assert_eq!(StatusFlags::new(0xFF, 0xA5).kind(), StatusKind::Other);
    }

    #[test]
    fn into_error() {
        let e: crate::Error = StatusFlags::new(0xFF, 0xA3).into();
        assert!(matches!(
            e,
            crate::Error::FelicaStatus {
                status1: 0xFF,
                status2: 0xA3
            }
        ));
    }
}

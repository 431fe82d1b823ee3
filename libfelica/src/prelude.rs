// libfelica/src/prelude.rs

pub use crate::card::{Card, ScanContext, SystemScanContext};
pub use crate::config::{ReaderConfig, ReaderConfigBuilder};
pub use crate::negotiation::{
    probe_error_location_indication, probe_max_blocks, probe_max_services,
    read_blocks_from_services, BlockReader, ReadOutcome, Termination,
};
pub use crate::node::{Area, Node, Service, System};
pub use crate::protocol::{BlockListElement, Command, HasStatus, Response, StatusFlags};
pub use crate::transport::{exchange, Transport};
#[cfg(feature = "async")]
pub use crate::transport::AsyncTransport;
pub use crate::{
    BlockData, CountInformation, ErrorLocationIndication, Error, Idm, KeyVersion, Pmm, Result,
    SystemCode,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, default_read_timeout, ms};

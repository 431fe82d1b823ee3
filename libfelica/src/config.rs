// libfelica/src/config.rs

//! Reader configuration: the starting ceilings for block reads and the
//! per-exchange timeout.

use std::time::Duration;

use crate::constants::{
    BITMASK_MAX_BLOCKS_PER_REQUEST, DEFAULT_MAX_BLOCKS_PER_REQUEST,
    DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_MAX_SERVICES_PER_REQUEST,
    MAX_BLOCKS_PER_READ, MAX_SERVICE_CODE_LIST_ORDER,
};
use crate::types::ErrorLocationIndication;
use crate::utils::default_read_timeout;
use crate::{Error, Result};

/// Settings shared by the block reader and the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Ceiling on block list elements per read; at most 15.
    pub max_blocks_per_request: u8,
    /// Ceiling on service codes per read; at most 16.
    pub max_services_per_request: u8,
    /// Consecutive adaptive reductions before the read gives up.
    pub max_consecutive_failures: u32,
    /// Timeout passed to every exchange.
    pub timeout: Duration,
    /// How the card reports which element of a read was invalid.
    pub error_location_indication: ErrorLocationIndication,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_blocks_per_request: DEFAULT_MAX_BLOCKS_PER_REQUEST,
            max_services_per_request: DEFAULT_MAX_SERVICES_PER_REQUEST,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            timeout: default_read_timeout(),
            error_location_indication: ErrorLocationIndication::Index,
        }
    }
}

impl ReaderConfig {
    /// A builder starting from the defaults.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::new()
    }

    /// Block ceiling after applying the bitmask limit.
    pub fn effective_max_blocks(&self) -> u8 {
        match self.error_location_indication {
            ErrorLocationIndication::Bitmask => self
                .max_blocks_per_request
                .min(BITMASK_MAX_BLOCKS_PER_REQUEST),
            _ => self.max_blocks_per_request,
        }
    }
}

/// Builder for [`ReaderConfig`]. Unset fields keep their defaults.
#[derive(Debug, Default, Clone)]
pub struct ReaderConfigBuilder {
    max_blocks_per_request: Option<u8>,
    max_services_per_request: Option<u8>,
    max_consecutive_failures: Option<u32>,
    timeout: Option<Duration>,
    error_location_indication: Option<ErrorLocationIndication>,
}

impl ReaderConfigBuilder {
    /// Same as [`ReaderConfig::builder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks per request, `1..=15`.
    pub fn max_blocks_per_request(mut self, n: u8) -> Self {
        self.max_blocks_per_request = Some(n);
        self
    }

    /// Services per request, `1..=16`.
    pub fn max_services_per_request(mut self, n: u8) -> Self {
        self.max_services_per_request = Some(n);
        self
    }

    /// Reductions tolerated in a row, at least 1.
    pub fn max_consecutive_failures(mut self, n: u32) -> Self {
        self.max_consecutive_failures = Some(n);
        self
    }

    /// Per-exchange timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Error location convention of the target card.
    pub fn error_location_indication(mut self, e: ErrorLocationIndication) -> Self {
        self.error_location_indication = Some(e);
        self
    }

    /// Validate and produce the config.
    pub fn build(self) -> Result<ReaderConfig> {
        let defaults = ReaderConfig::default();
        let config = ReaderConfig {
            max_blocks_per_request: self
                .max_blocks_per_request
                .unwrap_or(defaults.max_blocks_per_request),
            max_services_per_request: self
                .max_services_per_request
                .unwrap_or(defaults.max_services_per_request),
            max_consecutive_failures: self
                .max_consecutive_failures
                .unwrap_or(defaults.max_consecutive_failures),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            error_location_indication: self
                .error_location_indication
                .unwrap_or(defaults.error_location_indication),
        };

        if config.max_blocks_per_request == 0 || config.max_blocks_per_request > MAX_BLOCKS_PER_READ
        {
            return Err(Error::UnsupportedOperation(format!(
                "max_blocks_per_request must be within 1..={}",
                MAX_BLOCKS_PER_READ
            )));
        }
        let max_services = MAX_SERVICE_CODE_LIST_ORDER + 1;
        if config.max_services_per_request == 0 || config.max_services_per_request > max_services
        {
            return Err(Error::UnsupportedOperation(format!(
                "max_services_per_request must be within 1..={}",
                max_services
            )));
        }
        if config.max_consecutive_failures == 0 {
            return Err(Error::UnsupportedOperation(
                "max_consecutive_failures must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}

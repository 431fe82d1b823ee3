// libfelica/src/negotiation/state.rs

//! Pure transitions of the block-read negotiation.
//!
//! [`NegotiationState::on_status`] maps (state, status of the last round)
//! to (next state, action) without touching a transport, so every branch
//! can be driven directly from tests.

use crate::config::ReaderConfig;
use crate::negotiation::batch::{plan_batch, Batch, Limits, ServiceProgress, UNBOUNDED_BLOCKS};
use crate::node::Service;
use crate::protocol::{StatusFlags, StatusKind};
use crate::types::ErrorLocationIndication;
use crate::{Error, Result};

/// Which ceiling an adaptive branch shrank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Services per request.
    Services,
    /// Blocks per request.
    Blocks,
    /// A per-service block count.
    ServiceBlocks,
}

/// Where a read is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round has completed yet.
    Probing,
    /// The last round succeeded.
    Reading,
    /// The last round shrank a ceiling.
    Reducing(Dimension),
    /// Stopped early; accumulated data stays valid.
    Aborted,
    /// Every service was read to its end.
    Done,
}

/// What the driver does after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep the returned blocks and plan the next round.
    Accept,
    /// Plan again with the shrunk ceilings.
    Retry,
    /// Stop and hand back what has been read.
    Abort,
}

/// Ceilings and per-service progress of an adaptive read.
/// Every transition returns a new state; the old one stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationState {
    progress: Vec<ServiceProgress>,
    max_blocks: u8,
    max_services: u8,
    convention: ErrorLocationIndication,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
    phase: Phase,
}

impl NegotiationState {
    /// Services are read in the given order; duplicates are dropped.
    pub fn new(services: &[Service], config: &ReaderConfig) -> Self {
        let mut progress: Vec<ServiceProgress> = Vec::with_capacity(services.len());
        for s in services {
            if !progress.iter().any(|p| p.service == *s) {
                progress.push(ServiceProgress::new(*s));
            }
        }
        Self {
            progress,
            max_blocks: config.effective_max_blocks(),
            max_services: config.max_services_per_request,
            convention: config.error_location_indication,
            consecutive_failures: 0,
            max_consecutive_failures: config.max_consecutive_failures,
            phase: Phase::Probing,
        }
    }

    /// Seed a known block count, e.g. from RequestBlockInformation.
    pub fn with_block_count(mut self, service: Service, count: u16) -> Self {
        if let Some(p) = self.progress.iter_mut().find(|p| p.service == service) {
            p.ceiling = Some(count as u32);
        }
        self
    }

    /// Progress of each service, in read order.
    pub fn progress(&self) -> &[ServiceProgress] {
        &self.progress
    }

    /// Current blocks-per-request ceiling.
    pub fn max_blocks(&self) -> u8 {
        self.max_blocks
    }

    /// Current services-per-request ceiling.
    pub fn max_services(&self) -> u8 {
        self.max_services
    }

    /// Error location convention in use.
    pub fn convention(&self) -> ErrorLocationIndication {
        self.convention
    }

    /// Failed rounds since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the read reached `Done` or `Aborted`.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Aborted | Phase::Done)
    }

    /// Known block count of `service`, if any.
    pub fn ceiling(&self, service: &Service) -> Option<u32> {
        self.progress
            .iter()
            .find(|p| p.service == *service)
            .and_then(|p| p.ceiling)
    }

    /// Ceilings for the next batch.
    pub fn limits(&self) -> Limits {
        Limits {
            max_blocks: self.max_blocks,
            max_services: self.max_services,
        }
    }

    /// The next batch, or `None` when nothing is left to read.
    pub fn plan(&self) -> Result<Option<Batch>> {
        plan_batch(&self.progress, self.limits())
    }

    /// Mark the read aborted.
    pub fn finish(&self) -> Self {
        Self {
            phase: Phase::Done,
            ..self.clone()
        }
    }

    /// A transport failure ends the read; it still counts as a failed round.
    pub fn on_transport_error(&self) -> (Self, Action) {
        let next = Self {
            consecutive_failures: self.consecutive_failures + 1,
            phase: Phase::Aborted,
            ..self.clone()
        };
        (next, Action::Abort)
    }

    /// Apply the status of the reply to `batch`.
    /// Returns the next state and what the driver should do.
    pub fn on_status(&self, batch: &Batch, status: StatusFlags) -> Result<(Self, Action)> {
        match status.kind() {
            StatusKind::Success => Ok((self.accept(batch), Action::Accept)),
            StatusKind::IllegalNumberOfService => self.reduce_services(batch),
            StatusKind::IllegalNumberOfBlock => self.reduce_blocks(batch, status.status1),
            StatusKind::IllegalBlockNumber => self.reduce_block_count(batch, status.status1),
            StatusKind::IllegalBlockListServiceOrder => {
                log::warn!("card rejected the block list service order {}", status);
                Err(status.into())
            }
            StatusKind::Other => Err(status.into()),
        }
    }

    fn accept(&self, batch: &Batch) -> Self {
        let mut next = self.clone();
        for entry in batch.entries() {
            next.progress[entry.slot].read += entry.count as u32;
        }
        next.consecutive_failures = 0;
        next.phase = Phase::Reading;
        next
    }

    fn reduce_services(&self, batch: &Batch) -> Result<(Self, Action)> {
        let count = batch.service_count();
        if count <= 1 {
            return Err(Error::Negotiation(
                "card refused a single-service read as too many services".into(),
            ));
        }
        let mut next = self.clone();
        next.max_services = (count - 1) as u8;
        log::debug!("max services per request -> {}", next.max_services);
        Ok(next.after_reduction(Dimension::Services))
    }

    fn reduce_blocks(&self, batch: &Batch, status1: u8) -> Result<(Self, Action)> {
        let len = batch.len();
        let max_blocks = match self.convention {
            ErrorLocationIndication::Flag => {
                if len <= 1 {
                    return Err(Error::Negotiation(
                        "card refused a single-block read as too many blocks".into(),
                    ));
                }
                len - 1
            }
            ErrorLocationIndication::Index => {
                if status1 <= 1 || status1 as usize > len {
                    return Err(Error::Negotiation(format!(
                        "block count error index {} outside a batch of {}",
                        status1, len
                    )));
                }
                status1 as usize - 1
            }
            ErrorLocationIndication::Bitmask => bitmask_block_limit(status1, len)
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    Error::Negotiation(format!(
                        "block count mask {:#010b} does not fit a batch of {}",
                        status1, len
                    ))
                })?,
        };
        let mut next = self.clone();
        next.max_blocks = max_blocks.min(u8::MAX as usize) as u8;
        log::debug!("max blocks per request -> {}", next.max_blocks);
        Ok(next.after_reduction(Dimension::Blocks))
    }

    fn reduce_block_count(&self, batch: &Batch, status1: u8) -> Result<(Self, Action)> {
        let mut next = self.clone();
        match self.convention {
            ErrorLocationIndication::Flag => {
                if status1 != 0xFF {
                    return Err(Error::Negotiation(format!(
                        "flag convention reported location {:#04x}",
                        status1
                    )));
                }
                if batch.len() == 1 {
                    next.pin_ceiling(batch, 0)?;
                } else {
                    next.max_blocks = 1;
                    next.max_services = 1;
                    log::debug!("block number error not located; reading one block at a time");
                    return Ok(next.after_reduction(Dimension::Blocks));
                }
            }
            ErrorLocationIndication::Index => {
                if status1 == 0 || status1 as usize > batch.len() {
                    return Err(Error::Negotiation(format!(
                        "block number error index {} outside a batch of {}",
                        status1,
                        batch.len()
                    )));
                }
                next.pin_ceiling(batch, status1 as usize - 1)?;
            }
            ErrorLocationIndication::Bitmask => {
                if status1 == 0 {
                    return Err(Error::Negotiation("empty block number error mask".into()));
                }
                for position in (0..8).rev().filter(|b| status1 & (1 << b) != 0) {
                    next.pin_ceiling(batch, position)?;
                }
            }
        }
        Ok(next.after_reduction(Dimension::ServiceBlocks))
    }

    /// The element at `position` is out of range, so its block number is
    /// the service's block count. Ceilings only ever shrink.
    fn pin_ceiling(&mut self, batch: &Batch, position: usize) -> Result<()> {
        let (entry, element) = batch.owner_of(position).ok_or_else(|| {
            Error::Negotiation(format!(
                "block number error at position {} outside a batch of {}",
                position,
                batch.len()
            ))
        })?;
        let progress = &mut self.progress[entry.slot];
        let block = element.block_number() as u32;
        let current = progress.ceiling.unwrap_or(UNBOUNDED_BLOCKS);
        if block >= current {
            return Err(Error::Negotiation(format!(
                "block count of {} would grow from {} to {}",
                entry.service, current, block
            )));
        }
        progress.ceiling = Some(block);
        log::debug!("{} holds {} blocks", entry.service, block);
        Ok(())
    }

    fn after_reduction(mut self, dimension: Dimension) -> (Self, Action) {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.max_consecutive_failures {
            log::warn!(
                "giving up after {} consecutive failed rounds",
                self.consecutive_failures
            );
            self.phase = Phase::Aborted;
            return (self, Action::Abort);
        }
        self.phase = Phase::Reducing(dimension);
        (self, Action::Retry)
    }
}

/// Highest batch position congruent (mod 8) to a set bit of `mask` that
/// still lies inside a batch of `batch_len` elements.
pub fn bitmask_block_limit(mask: u8, batch_len: usize) -> Option<usize> {
    (0..8usize)
        .filter(|&bit| mask & (1 << bit) != 0 && bit < batch_len)
        .map(|bit| bit + (batch_len - 1 - bit) / 8 * 8)
        .max()
}

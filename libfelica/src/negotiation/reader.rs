// libfelica/src/negotiation/reader.rs

use derive_more::Display;

use crate::config::ReaderConfig;
use crate::negotiation::batch::Batch;
use crate::negotiation::state::{Action, NegotiationState};
use crate::node::Service;
use crate::protocol::{HasStatus, ReadWithoutEncryptionCommand, ReadWithoutEncryptionResponse};
use crate::transport::{exchange, Transport};
use crate::types::Idm;
use crate::{Error, Result};

/// Why a block read stopped.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Termination {
    /// Every service was read to its end.
    #[display(fmt = "completed")]
    Completed,
    /// Too many consecutive rounds failed.
    #[display(fmt = "too many consecutive failed rounds")]
    CircuitBreakerTripped,
    /// The transport failed or timed out.
    #[display(fmt = "transport failure: {}", _0)]
    TransportFailure(String),
    /// The read has not finished, or stopped on an error.
    #[display(fmt = "incomplete")]
    Incomplete,
}

/// Result of a block read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Raw block bytes per service, in request order. Always a multiple
    /// of 16 bytes.
    pub blocks: Vec<(Service, Vec<u8>)>,
    /// Converged ceilings, worth reusing for later reads of the same card.
    pub max_blocks_per_request: u8,
    /// Converged services-per-request ceiling.
    pub max_services_per_request: u8,
    /// Why the read stopped.
    pub termination: Termination,
}

impl ReadOutcome {
    /// Bytes read from `service`.
    pub fn get(&self, service: &Service) -> Option<&[u8]> {
        self.blocks
            .iter()
            .find(|(s, _)| s == service)
            .map(|(_, data)| data.as_slice())
    }

    /// Whether every service was read to its end.
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Completed
    }

    /// Number of 16-byte blocks read across all services.
    pub fn block_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|(_, d)| d.len() / crate::constants::BLOCK_LEN)
            .sum()
    }
}

/// Negotiation state plus the bytes read so far. Shared by the blocking
/// and async drivers; it never performs I/O itself.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    idm: Idm,
    state: NegotiationState,
    data: Vec<Vec<u8>>,
    rounds: u32,
    termination: Option<Termination>,
}

impl Session {
    pub(crate) fn new(
        idm: Idm,
        services: &[Service],
        config: &ReaderConfig,
        block_counts: &[(Service, u16)],
    ) -> Self {
        let state = block_counts
            .iter()
            .fold(NegotiationState::new(services, config), |s, (service, count)| {
                s.with_block_count(*service, *count)
            });
        let data = vec![Vec::new(); state.progress().len()];
        Self {
            idm,
            state,
            data,
            rounds: 0,
            termination: None,
        }
    }

    pub(crate) fn state(&self) -> &NegotiationState {
        &self.state
    }

    /// The next request to send; `None` once every service is exhausted.
    pub(crate) fn next_request(&mut self) -> Result<Option<(Batch, ReadWithoutEncryptionCommand)>> {
        let batch = match self.state.plan()? {
            Some(batch) => batch,
            None => {
                self.state = self.state.finish();
                self.termination = Some(Termination::Completed);
                return Ok(None);
            }
        };
        self.rounds += 1;
        log::debug!(
            "round {}: {} services, {} blocks",
            self.rounds,
            batch.service_count(),
            batch.len()
        );
        let command = batch.to_command(self.idm)?;
        Ok(Some((batch, command)))
    }

    pub(crate) fn on_transport_error(&mut self, err: &Error) -> Termination {
        log::warn!("block read stopped after {} rounds: {}", self.rounds, err);
        let (next, _) = self.state.on_transport_error();
        self.state = next;
        self.finish(Termination::TransportFailure(err.to_string()))
    }

    /// Fold one reply in. `Some` when the read is over.
    pub(crate) fn on_response(
        &mut self,
        batch: &Batch,
        response: ReadWithoutEncryptionResponse,
    ) -> Result<Option<Termination>> {
        let (next, action) = self.state.on_status(batch, response.status())?;
        match action {
            Action::Accept => {
                let blocks = response.into_blocks();
                if blocks.len() != batch.len() {
                    return Err(Error::Negotiation(format!(
                        "card returned {} blocks for {} requested",
                        blocks.len(),
                        batch.len()
                    )));
                }
                for (element, block) in batch.elements().iter().zip(&blocks) {
                    let slot = batch.entries()[element.service_code_list_order() as usize].slot;
                    self.data[slot].extend_from_slice(block.as_bytes());
                }
                self.state = next;
                Ok(None)
            }
            Action::Retry => {
                self.state = next;
                Ok(None)
            }
            Action::Abort => {
                self.state = next;
                Ok(Some(self.finish(Termination::CircuitBreakerTripped)))
            }
        }
    }

    fn finish(&mut self, termination: Termination) -> Termination {
        self.termination = Some(termination.clone());
        termination
    }

    pub(crate) fn outcome(&self) -> ReadOutcome {
        ReadOutcome {
            blocks: self
                .state
                .progress()
                .iter()
                .zip(&self.data)
                .map(|(p, d)| (p.service, d.clone()))
                .collect(),
            max_blocks_per_request: self.state.max_blocks(),
            max_services_per_request: self.state.max_services(),
            termination: self.termination.clone().unwrap_or(Termination::Incomplete),
        }
    }
}

/// Reads every block of a set of services, learning the card's batch
/// ceilings as it goes.
///
/// ```no_run
/// use libfelica::prelude::*;
///
/// # fn run<T: Transport>(transport: &mut T, idm: Idm) -> libfelica::Result<()> {
/// let config = ReaderConfig::default();
/// let history = Service::from_code(0x090F);
/// let outcome = BlockReader::new(transport, idm, &config).read(&[history])?;
/// println!("{} blocks", outcome.block_count());
/// # Ok(())
/// # }
/// ```
pub struct BlockReader<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    idm: Idm,
    config: ReaderConfig,
    block_counts: Vec<(Service, u16)>,
    session: Option<Session>,
}

impl<'a, T: Transport + ?Sized> BlockReader<'a, T> {
    /// A reader over `transport` for the card `idm`.
    pub fn new(transport: &'a mut T, idm: Idm, config: &ReaderConfig) -> Self {
        Self {
            transport,
            idm,
            config: *config,
            block_counts: Vec::new(),
            session: None,
        }
    }

    /// Start from a known block count instead of discovering it.
    pub fn with_block_count(mut self, service: Service, count: u16) -> Self {
        self.block_counts.push((service, count));
        self
    }

    /// Run rounds until every service is exhausted or the read stops.
    ///
    /// Transport failures and the failure breaker end the read with
    /// `Ok`; the outcome's termination says which. Fatal card statuses and
    /// malformed replies are returned as errors, with the data read so far
    /// still available from [`BlockReader::partial`].
    pub fn read(&mut self, services: &[Service]) -> Result<ReadOutcome> {
        let session = self.session.insert(Session::new(
            self.idm,
            services,
            &self.config,
            &self.block_counts,
        ));
        loop {
            let Some((batch, command)) = session.next_request()? else {
                return Ok(session.outcome());
            };
            match exchange(&mut *self.transport, &command, Some(self.config.timeout)) {
                Ok(response) => {
                    if session.on_response(&batch, response)?.is_some() {
                        return Ok(session.outcome());
                    }
                }
                Err(e) if e.is_transport() => {
                    session.on_transport_error(&e);
                    return Ok(session.outcome());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Data accumulated by the last [`BlockReader::read`], even if it failed.
    pub fn partial(&self) -> Option<ReadOutcome> {
        self.session.as_ref().map(Session::outcome)
    }

    /// Negotiation state of the last read.
    pub fn state(&self) -> Option<&NegotiationState> {
        self.session.as_ref().map(Session::state)
    }
}

/// Read all blocks of `services` with a fresh [`BlockReader`].
/// `block_counts` seeds services whose size is already known, e.g. from
/// RequestBlockInformation.
pub fn read_blocks_from_services<T: Transport + ?Sized>(
    transport: &mut T,
    idm: Idm,
    services: &[Service],
    config: &ReaderConfig,
    block_counts: &[(Service, u16)],
) -> Result<ReadOutcome> {
    block_counts
        .iter()
        .fold(BlockReader::new(transport, idm, config), |reader, (service, count)| {
            reader.with_block_count(*service, *count)
        })
        .read(services)
}

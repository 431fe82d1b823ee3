// libfelica/src/card/context.rs

//! What a scan has learned about a card so far.
//!
//! Both context types are values: every `with_*` method returns an updated
//! copy and leaves `self` untouched, so a scan step is a function from one
//! context to the next.

use std::collections::{BTreeSet, HashMap};

use crate::config::ReaderConfig;
use crate::negotiation::ReadOutcome;
use crate::node::{Node, Service};
use crate::types::{CountInformation, ErrorLocationIndication, Idm, KeyVersion, SystemCode};
use crate::{Error, Result};

/// Results gathered for one system of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemScanContext {
    /// System this context describes.
    pub system_code: SystemCode,
    /// IDm the system answered polling with.
    pub idm: Idm,
    /// Nodes found by SearchServiceCode, in index order.
    pub nodes: Vec<Node>,
    /// RequestService answers per node.
    pub key_versions: HashMap<Node, KeyVersion>,
    /// RequestBlockInformation answers per node.
    pub block_counts: HashMap<Node, CountInformation>,
    /// Bytes read per service.
    pub block_data: HashMap<Service, Vec<u8>>,
    /// Error location convention, once probed.
    pub error_location_indication: Option<ErrorLocationIndication>,
    /// Learned blocks-per-read ceiling.
    pub max_blocks_per_request: Option<u8>,
    /// Learned services-per-read ceiling.
    pub max_services_per_request: Option<u8>,
}

fn zip_exact<V: Copy>(nodes: &[Node], values: &[V], what: &str) -> Result<Vec<(Node, V)>> {
    if nodes.len() != values.len() {
        return Err(Error::malformed(format!(
            "{} {} for {} nodes",
            values.len(),
            what,
            nodes.len()
        )));
    }
    Ok(nodes.iter().copied().zip(values.iter().copied()).collect())
}

impl SystemScanContext {
    /// An empty context for one polled system.
    pub fn new(system_code: SystemCode, idm: Idm) -> Self {
        Self {
            system_code,
            idm,
            nodes: Vec::new(),
            key_versions: HashMap::new(),
            block_counts: HashMap::new(),
            block_data: HashMap::new(),
            error_location_indication: None,
            max_blocks_per_request: None,
            max_services_per_request: None,
        }
    }

    /// Replace the node list.
    pub fn with_nodes(&self, nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..self.clone()
        }
    }

    /// Record a RequestService answer; `versions[i]` belongs to `nodes[i]`.
    pub fn with_key_versions(&self, nodes: &[Node], versions: &[KeyVersion]) -> Result<Self> {
        let mut next = self.clone();
        next.key_versions
            .extend(zip_exact(nodes, versions, "key versions")?);
        Ok(next)
    }

    /// Record a RequestBlockInformation answer.
    pub fn with_block_counts(&self, nodes: &[Node], counts: &[CountInformation]) -> Result<Self> {
        let mut next = self.clone();
        next.block_counts
            .extend(zip_exact(nodes, counts, "block counts")?);
        Ok(next)
    }

    /// Record the probed error convention.
    pub fn with_error_location_indication(&self, convention: ErrorLocationIndication) -> Self {
        Self {
            error_location_indication: Some(convention),
            ..self.clone()
        }
    }

    /// Record the learned services-per-read ceiling.
    pub fn with_max_services(&self, max: u8) -> Self {
        Self {
            max_services_per_request: Some(max),
            ..self.clone()
        }
    }

    /// Record the learned blocks-per-read ceiling.
    pub fn with_max_blocks(&self, max: u8) -> Self {
        Self {
            max_blocks_per_request: Some(max),
            ..self.clone()
        }
    }

    /// Keep the data of every service the read returned bytes for, and the
    /// ceilings it converged to.
    pub fn with_read_outcome(&self, outcome: &ReadOutcome) -> Self {
        let mut next = self.clone();
        for (service, data) in &outcome.blocks {
            if !data.is_empty() {
                next.block_data.insert(*service, data.clone());
            }
        }
        next.max_blocks_per_request = Some(outcome.max_blocks_per_request);
        next.max_services_per_request = Some(outcome.max_services_per_request);
        next
    }

    /// The services among [`SystemScanContext::nodes`].
    pub fn services(&self) -> Vec<Service> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Service(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Services that can be read without authentication and are not
    /// reported missing by their key version.
    pub fn readable_services(&self) -> Vec<Service> {
        self.services()
            .into_iter()
            .filter(|s| s.is_readable_without_key())
            .filter(|s| {
                self.key_versions
                    .get(&Node::Service(*s))
                    .map_or(true, |v| !v.is_missing())
            })
            .collect()
    }

    /// Block count reported for `service`, unless missing or invalid.
    pub fn block_count(&self, service: &Service) -> Option<u16> {
        self.block_counts
            .get(&Node::Service(*service))
            .and_then(CountInformation::valid_count)
    }

    /// `base` with whatever this system has learned applied on top.
    pub fn reader_config(&self, base: &ReaderConfig) -> ReaderConfig {
        ReaderConfig {
            max_blocks_per_request: self
                .max_blocks_per_request
                .unwrap_or(base.max_blocks_per_request),
            max_services_per_request: self
                .max_services_per_request
                .unwrap_or(base.max_services_per_request),
            error_location_indication: self
                .error_location_indication
                .unwrap_or(base.error_location_indication),
            ..*base
        }
    }
}

/// Results for a whole card plus the commands it does not support.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanContext {
    systems: Vec<SystemScanContext>,
    unsupported_commands: BTreeSet<u8>,
}

impl ScanContext {
    /// An empty scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `system`, replacing an earlier entry with the same system code.
    pub fn with_system(&self, system: SystemScanContext) -> Self {
        let mut next = self.clone();
        match next
            .systems
            .iter_mut()
            .find(|s| s.system_code == system.system_code)
        {
            Some(slot) => *slot = system,
            None => next.systems.push(system),
        }
        next
    }

    /// Every system scanned so far.
    pub fn systems(&self) -> &[SystemScanContext] {
        &self.systems
    }

    /// The context of system `code`.
    pub fn system(&self, code: SystemCode) -> Option<&SystemScanContext> {
        self.systems.iter().find(|s| s.system_code == code)
    }

    /// Remember that the card rejected `command_code`.
    pub fn mark_unsupported(&self, command_code: u8) -> Self {
        let mut next = self.clone();
        next.unsupported_commands.insert(command_code);
        next
    }

    /// Whether `command_code` was rejected before.
    pub fn is_unsupported(&self, command_code: u8) -> bool {
        self.unsupported_commands.contains(&command_code)
    }

    /// Rejected command codes in ascending order.
    pub fn unsupported_commands(&self) -> impl Iterator<Item = u8> + '_ {
        self.unsupported_commands.iter().copied()
    }
}

/// How a scan step ended.
#[derive(Debug)]
pub enum StepOutcome {
    /// The step ran and produced the next context.
    Completed(ScanContext),
    /// The command was already known to be unsupported; nothing was sent.
    Skipped(ScanContext),
    /// The card rejected the command; it is now marked unsupported.
    Unsupported {
        /// The input context with the command marked unsupported.
        context: ScanContext,
        /// What the card answered.
        error: Error,
    },
}

impl StepOutcome {
    /// The context to continue with.
    pub fn context(&self) -> &ScanContext {
        match self {
            StepOutcome::Completed(c) | StepOutcome::Skipped(c) => c,
            StepOutcome::Unsupported { context, .. } => context,
        }
    }

    /// Take the context to continue with.
    pub fn into_context(self) -> ScanContext {
        match self {
            StepOutcome::Completed(c) | StepOutcome::Skipped(c) => c,
            StepOutcome::Unsupported { context, .. } => context,
        }
    }
}

/// Run one scan step that issues `command_code`.
///
/// A command the card rejected once (failure status or a reply of the
/// wrong type) is not sent again. Any other error is returned and the
/// caller keeps its previous context.
pub fn run_step<F>(context: &ScanContext, command_code: u8, step: F) -> Result<StepOutcome>
where
    F: FnOnce(&ScanContext) -> Result<ScanContext>,
{
    if context.is_unsupported(command_code) {
        log::debug!("skipping unsupported command {:#04x}", command_code);
        return Ok(StepOutcome::Skipped(context.clone()));
    }
    match step(context) {
        Ok(next) => Ok(StepOutcome::Completed(next)),
        Err(error @ (Error::FelicaStatus { .. } | Error::UnexpectedResponse { .. })) => {
            log::warn!("command {:#04x} failed: {}", command_code, error);
            Ok(StepOutcome::Unsupported {
                context: context.mark_unsupported(command_code),
                error,
            })
        }
        Err(e) => Err(e),
    }
}

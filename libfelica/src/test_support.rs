// libfelica/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! [`SimulatedCard`] answers FeliCa frames like a real card with fixed
//! read limits and a fixed error convention, so the negotiation can be
//! exercised end to end without hardware.

use std::time::Duration;

use crate::constants::command_code::{
    POLLING, READ_WITHOUT_ENCRYPTION, REQUEST_BLOCK_INFORMATION, REQUEST_SERVICE,
    REQUEST_SYSTEM_CODE, SEARCH_SERVICE_CODE,
};
use crate::constants::status_code::{
    ILLEGAL_BLOCK_NUMBER, ILLEGAL_NUMBER_OF_BLOCK, ILLEGAL_NUMBER_OF_SERVICE,
    ILLEGAL_SERVICE_CODE_LIST,
};
use crate::node::{Node, Service};
use crate::protocol::{
    Command, PollingCommand, PollingResponse, ReadWithoutEncryptionCommand,
    ReadWithoutEncryptionResponse, RequestBlockInformationCommand,
    RequestBlockInformationResponse, RequestCode, RequestServiceCommand, RequestServiceResponse,
    RequestSystemCodeCommand, RequestSystemCodeResponse, Response, SearchServiceCodeCommand,
    SearchServiceCodeResponse, StatusFlags,
};
use crate::transport::{MockTransport, Transport};
use crate::types::{
    BlockData, CountInformation, ErrorLocationIndication, Idm, KeyVersion, Pmm, SystemCode,
};
use crate::{Error, Result};

/// Build a MockTransport pre-seeded with the given replies and return it
/// boxed as a Transport trait object.
#[doc(hidden)]
pub fn boxed_mock_with_responses(responses: Vec<Vec<u8>>) -> Box<dyn Transport> {
    Box::new(MockTransport::with_responses(responses))
}

/// Deterministic content for block `index` of `service`.
pub fn pattern_block(service: Service, index: u16) -> BlockData {
    let mut bytes = [0u8; 16];
    bytes[..2].copy_from_slice(&service.to_bytes());
    bytes[2..4].copy_from_slice(&index.to_le_bytes());
    bytes[4..].fill(index as u8);
    BlockData::from_bytes(bytes)
}

/// A card with fixed limits. Replies to Polling, RequestService,
/// ReadWithoutEncryption, SearchServiceCode, RequestSystemCode and
/// RequestBlockInformation; anything else goes unanswered.
///
/// A read is checked in this order: the service count against
/// `max_services` (0xA1), unknown services (0xA6), the block count against
/// `max_blocks` (0xA2), then each block number (0xA8). Status flag 1 of
/// the last two follows `convention`.
#[derive(Debug, Clone)]
pub struct SimulatedCard {
    /// IDm answered to polling.
    pub idm: Idm,
    /// PMm answered to polling.
    pub pmm: Pmm,
    /// System code answered to polling and RequestSystemCode.
    pub system_code: SystemCode,
    /// Most blocks accepted per read.
    pub max_blocks: usize,
    /// Most services accepted per read.
    pub max_services: usize,
    /// How A2 and A8 report the failing element.
    pub convention: ErrorLocationIndication,
    /// Answer every read with this status instead.
    pub fixed_status: Option<StatusFlags>,
    /// Every frame received, in order.
    pub requests: Vec<Vec<u8>>,
    services: Vec<(Service, Vec<BlockData>)>,
}

impl SimulatedCard {
    /// A card with generous limits, the INDEX convention and no services.
    pub fn new(idm: Idm) -> Self {
        Self {
            idm,
            pmm: Pmm::from_bytes([0x10, 0x0B, 0x4B, 0x42, 0x84, 0x85, 0xD0, 0xFF]),
            system_code: SystemCode::SUICA,
            max_blocks: 15,
            max_services: 16,
            convention: ErrorLocationIndication::Index,
            fixed_status: None,
            requests: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Set the per-read ceilings.
    pub fn with_limits(mut self, max_blocks: usize, max_services: usize) -> Self {
        self.max_blocks = max_blocks;
        self.max_services = max_services;
        self
    }

    /// Set the error location convention.
    pub fn with_convention(mut self, convention: ErrorLocationIndication) -> Self {
        self.convention = convention;
        self
    }

    /// Answer every read with `status`.
    pub fn with_fixed_status(mut self, status: StatusFlags) -> Self {
        self.fixed_status = Some(status);
        self
    }

    /// Add `service` holding `blocks`.
    pub fn with_service(mut self, service: Service, blocks: Vec<BlockData>) -> Self {
        self.services.push((service, blocks));
        self
    }

    /// Add `service` holding `count` blocks of [`pattern_block`] data.
    pub fn with_pattern_service(self, service: Service, count: u16) -> Self {
        let blocks = (0..count).map(|i| pattern_block(service, i)).collect();
        self.with_service(service, blocks)
    }

    /// Blocks held by `service`.
    pub fn blocks(&self, service: &Service) -> Option<&[BlockData]> {
        self.services
            .iter()
            .find(|(s, _)| s == service)
            .map(|(_, b)| b.as_slice())
    }

    /// Concatenated bytes of every block of `service`.
    pub fn contents(&self, service: &Service) -> Vec<u8> {
        self.blocks(service)
            .unwrap_or_default()
            .iter()
            .flat_map(|b| b.as_bytes().iter().copied())
            .collect()
    }

    /// Number of ReadWithoutEncryption frames received.
    pub fn read_requests(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.get(1) == Some(&READ_WITHOUT_ENCRYPTION))
            .count()
    }

    fn read(&self, command: &ReadWithoutEncryptionCommand) -> Result<ReadWithoutEncryptionResponse> {
        let idm = *command.idm();
        let reject = |status1: u8, status2: u8| {
            ReadWithoutEncryptionResponse::new_error(idm, StatusFlags::new(status1, status2))
        };
        if let Some(status) = self.fixed_status {
            return ReadWithoutEncryptionResponse::new_error(idm, status);
        }
        if command.service_codes().len() > self.max_services {
            return reject(0xFF, ILLEGAL_NUMBER_OF_SERVICE);
        }
        let mut targets = Vec::with_capacity(command.service_codes().len());
        for code in command.service_codes() {
            match Service::from_bytes(code)
                .ok()
                .and_then(|s| self.blocks(&s))
            {
                Some(blocks) => targets.push(blocks),
                None => return reject(0xFF, ILLEGAL_SERVICE_CODE_LIST),
            }
        }

        let list = command.block_list();
        if list.len() > self.max_blocks {
            let location = match self.convention {
                ErrorLocationIndication::Flag => 0xFF,
                ErrorLocationIndication::Index => (self.max_blocks + 1).min(0xFF) as u8,
                ErrorLocationIndication::Bitmask => 1 << (self.max_blocks % 8),
            };
            return reject(location, ILLEGAL_NUMBER_OF_BLOCK);
        }

        let out_of_range: Vec<usize> = list
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                let blocks = targets[e.service_code_list_order() as usize];
                e.block_number() as usize >= blocks.len()
            })
            .map(|(i, _)| i)
            .collect();
        if let Some(&first) = out_of_range.first() {
            let location = match self.convention {
                ErrorLocationIndication::Flag => 0xFF,
                ErrorLocationIndication::Index => (first + 1).min(0xFF) as u8,
                ErrorLocationIndication::Bitmask => out_of_range
                    .iter()
                    .filter(|&&i| i < 8)
                    .fold(0u8, |mask, &i| mask | (1 << i)),
            };
            return reject(location, ILLEGAL_BLOCK_NUMBER);
        }

        let data = list
            .iter()
            .map(|e| targets[e.service_code_list_order() as usize][e.block_number() as usize])
            .collect();
        ReadWithoutEncryptionResponse::new_success(idm, data)
    }

    fn block_count(&self, code: &[u8; 2]) -> CountInformation {
        Service::from_bytes(code)
            .ok()
            .and_then(|s| self.blocks(&s))
            .map_or(CountInformation::INVALID, |b| {
                CountInformation::new(b.len() as u16)
            })
    }

    fn key_version(&self, code: &[u8; 2]) -> KeyVersion {
        match Service::from_bytes(code).ok().and_then(|s| self.blocks(&s)) {
            Some(_) => KeyVersion::INITIAL,
            None => KeyVersion::MISSING,
        }
    }

    fn respond(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let code = frame.get(1).copied().ok_or(Error::Timeout)?;
        let reply = match code {
            POLLING => {
                let command = PollingCommand::from_bytes(frame)?;
                let wanted = command.system_code;
                if wanted != SystemCode::ANY && wanted != self.system_code {
                    return Err(Error::Timeout);
                }
                let request_data = match command.request_code {
                    RequestCode::SystemCode => Some(self.system_code.to_bytes()),
                    RequestCode::CommunicationPerformance => Some([0x00, 0x83]),
                    RequestCode::None => None,
                };
                PollingResponse::new(self.idm, self.pmm, request_data).to_bytes()
            }
            REQUEST_SERVICE => {
                let command = RequestServiceCommand::from_bytes(frame)?;
                let versions = command
                    .node_codes()
                    .iter()
                    .map(|c| self.key_version(c))
                    .collect();
                RequestServiceResponse::new(self.idm, versions)?.to_bytes()
            }
            READ_WITHOUT_ENCRYPTION => {
                let command = ReadWithoutEncryptionCommand::from_bytes(frame)?;
                self.read(&command)?.to_bytes()
            }
            SEARCH_SERVICE_CODE => {
                let command = SearchServiceCodeCommand::from_bytes(frame)?;
                let node = self
                    .services
                    .get(command.index as usize)
                    .map(|(s, _)| Node::Service(*s));
                SearchServiceCodeResponse::new(self.idm, node)?.to_bytes()
            }
            REQUEST_SYSTEM_CODE => {
                RequestSystemCodeCommand::from_bytes(frame)?;
                RequestSystemCodeResponse::new(self.idm, vec![self.system_code])?.to_bytes()
            }
            REQUEST_BLOCK_INFORMATION => {
                let command = RequestBlockInformationCommand::from_bytes(frame)?;
                let counts = command
                    .node_codes()
                    .iter()
                    .map(|c| self.block_count(c))
                    .collect();
                RequestBlockInformationResponse::new(self.idm, counts)?.to_bytes()
            }
            _ => return Err(Error::Timeout),
        };
        Ok(reply)
    }
}

impl Transport for SimulatedCard {
    fn transceive(&mut self, command: &[u8], _timeout: Option<Duration>) -> Result<Vec<u8>> {
        self.requests.push(command.to_vec());
        self.respond(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BlockListElement, HasStatus};
    use crate::transport::exchange;

    fn card() -> SimulatedCard {
        SimulatedCard::new(Idm::from_bytes([1; 8]))
            .with_limits(4, 2)
            .with_pattern_service(Service::from_code(0x090F), 3)
    }

    fn read(card: &mut SimulatedCard, services: &[Service], blocks: &[(u8, u16)]) -> StatusFlags {
        let list = blocks
            .iter()
            .map(|&(o, b)| BlockListElement::for_block(o, b).unwrap())
            .collect();
        let cmd = ReadWithoutEncryptionCommand::for_services(card.idm, services, list).unwrap();
        exchange(card, &cmd, None).unwrap().status()
    }

    #[test]
    fn reports_limits_per_convention() {
        let s = Service::from_code(0x090F);
        let mut c = card();
        assert_eq!(read(&mut c, &[s, s, s], &[(0, 0)]), StatusFlags::new(0xFF, 0xA1));
        assert_eq!(
            read(&mut c, &[Service::from_code(0x1234)], &[(0, 0)]),
            StatusFlags::new(0xFF, 0xA6)
        );
        let five = [(0, 0), (0, 0), (0, 0), (0, 0), (0, 0)];
        assert_eq!(read(&mut c, &[s], &five), StatusFlags::new(0x05, 0xA2));
        assert_eq!(read(&mut c, &[s], &[(0, 0), (0, 3)]), StatusFlags::new(0x02, 0xA8));
        assert!(read(&mut c, &[s], &[(0, 2)]).is_success());
        assert_eq!(c.read_requests(), 5);

        let mut c = card().with_convention(ErrorLocationIndication::Bitmask);
        assert_eq!(read(&mut c, &[s], &five), StatusFlags::new(0b0001_0000, 0xA2));
        assert_eq!(
            read(&mut c, &[s], &[(0, 3), (0, 0), (0, 4)]),
            StatusFlags::new(0b0000_0101, 0xA8)
        );
    }

    #[test]
    fn unanswered_commands_time_out() {
        let mut c = card();
        assert!(matches!(c.transceive(&[0x0A, 0x3E, 0, 0, 0, 0, 0, 0, 0, 0], None), Err(Error::Timeout)));
    }

    #[test]
    fn pattern_blocks_differ() {
        let s = Service::from_code(0x090F);
        assert_ne!(pattern_block(s, 0), pattern_block(s, 1));
        assert_eq!(card().contents(&s).len(), 48);
    }
}

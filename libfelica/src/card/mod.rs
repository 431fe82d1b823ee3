// libfelica/src/card/mod.rs

use std::time::Duration;

use crate::config::ReaderConfig;
use crate::negotiation::BlockReader;
use crate::node::{Node, Service};
use crate::protocol::{
    BlockListElement, HasStatus, PollingCommand, PollingResponse, ReadWithoutEncryptionCommand,
    RequestBlockInformationCommand, RequestCode, RequestServiceCommand, RequestSystemCodeCommand,
    TimeSlot, WriteWithoutEncryptionCommand,
};
use crate::transport::{exchange, Transport};
use crate::types::{BlockData, CountInformation, Idm, KeyVersion, Pmm, SystemCode};
use crate::utils::default_read_timeout;
use crate::{Error, Result};

pub mod context;
mod nodes;

pub use context::{run_step, ScanContext, StepOutcome, SystemScanContext};
pub use nodes::NodeIterator;

/// A polled FeliCa target. Every helper borrows the transport for the
/// duration of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    idm: Idm,
    pmm: Pmm,
    system_code: Option<SystemCode>,
    timeout: Duration,
}

impl Card {
    /// A card known by its identity; no system code, default timeout.
    pub fn new(idm: Idm, pmm: Pmm) -> Self {
        Self {
            idm,
            pmm,
            system_code: None,
            timeout: default_read_timeout(),
        }
    }

    /// Identity and system code from a polling reply.
    pub fn from_polling(response: &PollingResponse) -> Self {
        Self {
            system_code: response.system_code(),
            ..Self::new(*response.idm(), *response.pmm())
        }
    }

    /// Poll for a card holding `system_code` and ask for its system code.
    pub fn poll<T: Transport + ?Sized>(
        transport: &mut T,
        system_code: SystemCode,
        timeout: Duration,
    ) -> Result<Self> {
        let command = PollingCommand::new(system_code, RequestCode::SystemCode, TimeSlot::Slot1);
        let response = exchange(transport, &command, Some(timeout))?;
        log::debug!("polled card {}", response.idm().to_hex());
        Ok(Self::from_polling(&response).with_timeout(timeout))
    }

    /// Timeout for every exchange this card issues.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Card identifier.
    pub fn idm(&self) -> &Idm {
        &self.idm
    }

    /// Manufacture parameters.
    pub fn pmm(&self) -> &Pmm {
        &self.pmm
    }

    /// System code reported at polling, if requested.
    pub fn system_code(&self) -> Option<SystemCode> {
        self.system_code
    }

    /// Per-exchange timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Key versions of `nodes`; missing nodes report [`KeyVersion::MISSING`].
    pub fn request_service<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        nodes: &[Node],
    ) -> Result<Vec<KeyVersion>> {
        let command = RequestServiceCommand::from_nodes(self.idm, nodes)?;
        let response = exchange(transport, &command, Some(self.timeout))?;
        Ok(response.key_versions().to_vec())
    }

    /// Block counts of `nodes`.
    pub fn request_block_information<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        nodes: &[Node],
    ) -> Result<Vec<CountInformation>> {
        let command = RequestBlockInformationCommand::from_nodes(self.idm, nodes)?;
        let response = exchange(transport, &command, Some(self.timeout))?;
        Ok(response.block_counts().to_vec())
    }

    /// System codes present on the card.
    pub fn request_system_code<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
    ) -> Result<Vec<SystemCode>> {
        let command = RequestSystemCodeCommand::new(self.idm);
        let response = exchange(transport, &command, Some(self.timeout))?;
        Ok(response.system_codes().to_vec())
    }

    /// One ReadWithoutEncryption exchange. A failure status is an error.
    pub fn read_blocks<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        services: &[Service],
        blocks: Vec<BlockListElement>,
    ) -> Result<Vec<BlockData>> {
        let command = ReadWithoutEncryptionCommand::for_services(self.idm, services, blocks)?;
        let response = exchange(transport, &command, Some(self.timeout))?;
        if !response.is_status_successful() {
            return Err(response.status().into());
        }
        Ok(response.into_blocks())
    }

    /// Read one block of `service`.
    pub fn read_single<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        service: Service,
        block: u16,
    ) -> Result<BlockData> {
        let blocks = self.read_blocks(
            transport,
            &[service],
            vec![BlockListElement::for_block(0, block)?],
        )?;
        blocks.into_iter().next().ok_or_else(|| {
            Error::malformed(format!("no data for block {} of {}", block, service))
        })
    }

    /// Write one block of `service`.
    pub fn write_single<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        service: Service,
        block: u16,
        data: BlockData,
    ) -> Result<()> {
        self.write_blocks(transport, service, &[(block, data)])
    }

    /// Write several blocks of one service in a single exchange.
    pub fn write_blocks<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        service: Service,
        blocks: &[(u16, BlockData)],
    ) -> Result<()> {
        if blocks.is_empty() {
            return Ok(());
        }
        let numbers: Vec<u16> = blocks.iter().map(|(n, _)| *n).collect();
        let data: Vec<BlockData> = blocks.iter().map(|(_, d)| *d).collect();
        let command = WriteWithoutEncryptionCommand::for_service(self.idm, service, &numbers, data)?;
        let response = exchange(transport, &command, Some(self.timeout))?;
        if !response.is_status_successful() {
            return Err(response.status().into());
        }
        Ok(())
    }

    /// Enumerate the card's areas and services with SearchServiceCode.
    pub fn nodes<'a, T: Transport + ?Sized>(&self, transport: &'a mut T) -> NodeIterator<'a, T> {
        NodeIterator::new(self.idm, self.timeout, transport)
    }

    /// A [`BlockReader`] for this card using the card's timeout.
    pub fn block_reader<'a, T: Transport + ?Sized>(
        &self,
        transport: &'a mut T,
        config: &ReaderConfig,
    ) -> BlockReader<'a, T> {
        let config = ReaderConfig {
            timeout: self.timeout,
            ..*config
        };
        BlockReader::new(transport, self.idm, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        ReadWithoutEncryptionResponse, Response, StatusFlags, WriteWithoutEncryptionResponse,
    };
    use crate::transport::MockTransport;

    fn card() -> Card {
        Card::new(
            Idm::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
            Pmm::from_bytes([9; 8]),
        )
    }

    #[test]
    fn poll_records_system_code() {
        let reply = PollingResponse::new(
            Idm::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
            Pmm::from_bytes([9; 8]),
            Some([0x00, 0x03]),
        );
        let mut m = MockTransport::with_responses(vec![reply.to_bytes()]);
        let card = Card::poll(&mut m, SystemCode::ANY, Duration::from_millis(100)).unwrap();
        assert_eq!(card.system_code(), Some(SystemCode::SUICA));
        assert_eq!(card.timeout(), Duration::from_millis(100));
        assert_eq!(m.sent[0], vec![0x06, 0x00, 0xFF, 0xFF, 0x01, 0x00]);
    }

    #[test]
    fn read_single_returns_block() {
        let idm = *card().idm();
        let reply = ReadWithoutEncryptionResponse::new_success(idm, vec![BlockData::from_bytes([0x99; 16])])
            .unwrap()
            .to_bytes();
        let mut m = MockTransport::with_responses(vec![reply]);
        let block = card()
            .read_single(&mut m, Service::from_code(0x090F), 1)
            .unwrap();
        assert_eq!(block.as_bytes(), &[0x99; 16]);
        // service list 0F 09, block list 80 01
        assert_eq!(&m.sent[0][10..], &[0x01, 0x0F, 0x09, 0x01, 0x80, 0x01]);
    }

    #[test]
    fn read_reports_status() {
        let idm = *card().idm();
        let reply = ReadWithoutEncryptionResponse::new_error(idm, StatusFlags::new(0x01, 0xA6))
            .unwrap()
            .to_bytes();
        let mut m = MockTransport::with_responses(vec![reply]);
        match card().read_single(&mut m, Service::from_code(0x090F), 0) {
            Err(Error::FelicaStatus {
                status1: 0x01,
                status2: 0xA6,
            }) => {}
            other => panic!("expected FelicaStatus, got {:?}", other),
        }
    }

    #[test]
    fn write_single_checks_status() {
        let idm = *card().idm();
        let mut m = MockTransport::with_responses(vec![
            WriteWithoutEncryptionResponse::new(idm, StatusFlags::SUCCESS).to_bytes(),
            WriteWithoutEncryptionResponse::new(idm, StatusFlags::new(0x01, 0xA5)).to_bytes(),
        ]);
        let data = BlockData::from_bytes([0x5A; 16]);
        card()
            .write_single(&mut m, Service::from_code(0x0009), 0x12, data)
            .unwrap();
        assert!(card()
            .write_single(&mut m, Service::from_code(0x0009), 0x12, data)
            .is_err());
        card().write_blocks(&mut m, Service::from_code(0x0009), &[]).unwrap();
        assert_eq!(m.sent.len(), 2);
    }
}

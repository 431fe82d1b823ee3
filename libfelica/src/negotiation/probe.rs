// libfelica/src/negotiation/probe.rs

//! One-shot probes for a card's read limits and error convention.

use crate::config::ReaderConfig;
use crate::node::Service;
use crate::protocol::{
    BlockListElement, HasStatus, ReadWithoutEncryptionCommand, StatusFlags, StatusKind,
};
use crate::transport::{exchange, Transport};
use crate::types::{ErrorLocationIndication, Idm};
use crate::{Error, Result};

fn read_status<T: Transport + ?Sized>(
    transport: &mut T,
    idm: Idm,
    services: &[Service],
    blocks: Vec<BlockListElement>,
    config: &ReaderConfig,
) -> Result<StatusFlags> {
    let command = ReadWithoutEncryptionCommand::for_services(idm, services, blocks)?;
    let response = exchange(transport, &command, Some(config.timeout))?;
    Ok(response.status())
}

/// Largest number of service codes the card accepts in one read. Sends
/// `n` copies of `service` with a single block, lowering `n` while the
/// card answers ILLEGAL_NUMBER_OF_SERVICE.
pub fn probe_max_services<T: Transport + ?Sized>(
    transport: &mut T,
    idm: Idm,
    service: Service,
    config: &ReaderConfig,
) -> Result<u8> {
    let mut n = config.max_services_per_request;
    loop {
        let services = vec![service; n as usize];
        let blocks = vec![BlockListElement::for_block(0, 0)?];
        let status = read_status(transport, idm, &services, blocks, config)?;
        match status.kind() {
            StatusKind::Success => {
                log::debug!("card accepts {} services per read", n);
                return Ok(n);
            }
            StatusKind::IllegalNumberOfService if n > 1 => n -= 1,
            _ => return Err(status.into()),
        }
    }
}

/// Largest number of block list elements the card accepts in one read of
/// `service`. The service must hold at least that many blocks, otherwise
/// the result is its block count.
pub fn probe_max_blocks<T: Transport + ?Sized>(
    transport: &mut T,
    idm: Idm,
    service: Service,
    config: &ReaderConfig,
) -> Result<u8> {
    let mut n = config.effective_max_blocks();
    loop {
        let blocks = (0..n as u16)
            .map(|b| BlockListElement::for_block(0, b))
            .collect::<Result<Vec<_>>>()?;
        let status = read_status(transport, idm, &[service], blocks, config)?;
        match status.kind() {
            StatusKind::Success => {
                log::debug!("card accepts {} blocks per read", n);
                return Ok(n);
            }
            StatusKind::IllegalNumberOfBlock | StatusKind::IllegalBlockNumber if n > 1 => n -= 1,
            _ => return Err(status.into()),
        }
    }
}

/// Find out how the card locates errors: read blocks 0, 0 and
/// `block_count` (one past the end) of `service` and look at status
/// flag 1 of the rejection.
pub fn probe_error_location_indication<T: Transport + ?Sized>(
    transport: &mut T,
    idm: Idm,
    service: Service,
    block_count: u16,
    config: &ReaderConfig,
) -> Result<ErrorLocationIndication> {
    let blocks = vec![
        BlockListElement::for_block(0, 0)?,
        BlockListElement::for_block(0, 0)?,
        BlockListElement::for_block(0, block_count)?,
    ];
    let status = read_status(transport, idm, &[service], blocks, config)?;
    if status.is_success() {
        return Err(Error::Negotiation(format!(
            "card read block {} of {} without complaint",
            block_count, service
        )));
    }
    let convention = match status.status1 {
        0xFF => ErrorLocationIndication::Flag,
        0x04 => ErrorLocationIndication::Bitmask,
        0x03 => ErrorLocationIndication::Index,
        _ => return Err(status.into()),
    };
    log::debug!("card reports error locations by {}", convention);
    Ok(convention)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ReadWithoutEncryptionResponse, Response};
    use crate::transport::MockTransport;
    use crate::types::BlockData;

    fn idm() -> Idm {
        Idm::from_bytes([9; 8])
    }

    fn error(sf1: u8, sf2: u8) -> Vec<u8> {
        ReadWithoutEncryptionResponse::new_error(idm(), StatusFlags::new(sf1, sf2))
            .unwrap()
            .to_bytes()
    }

    fn ok(blocks: usize) -> Vec<u8> {
        ReadWithoutEncryptionResponse::new_success(idm(), vec![BlockData::from_bytes([0; 16]); blocks])
            .unwrap()
            .to_bytes()
    }

    #[test]
    fn max_services_steps_down() {
        let mut m = MockTransport::with_responses(vec![error(0xFF, 0xA1), error(0xFF, 0xA1), ok(1)]);
        let n = probe_max_services(&mut m, idm(), Service::from_code(0x000B), &ReaderConfig::default())
            .unwrap();
        assert_eq!(n, 14);
        // 16 copies of the service code in the first request
        assert_eq!(m.sent[0][10], 16);
        assert_eq!(m.sent[2][10], 14);
    }

    #[test]
    fn max_blocks_stops_on_other_status() {
        let mut m = MockTransport::with_responses(vec![error(0x10, 0xA2), error(0xFF, 0xA6)]);
        match probe_max_blocks(&mut m, idm(), Service::from_code(0x000B), &ReaderConfig::default()) {
            Err(Error::FelicaStatus { status2: 0xA6, .. }) => {}
            other => panic!("expected FelicaStatus, got {:?}", other),
        }
    }

    #[test]
    fn convention_signatures() {
        let cases = [
            (0xFF, ErrorLocationIndication::Flag),
            (0x04, ErrorLocationIndication::Bitmask),
            (0x03, ErrorLocationIndication::Index),
        ];
        for (sf1, expected) in cases {
            let mut m = MockTransport::with_responses(vec![error(sf1, 0xA8)]);
            let got = probe_error_location_indication(
                &mut m,
                idm(),
                Service::from_code(0x000B),
                4,
                &ReaderConfig::default(),
            )
            .unwrap();
            assert_eq!(got, expected);
        }

        let mut m = MockTransport::with_responses(vec![error(0x02, 0xA8)]);
        assert!(matches!(
            probe_error_location_indication(&mut m, idm(), Service::from_code(0x000B), 4, &ReaderConfig::default()),
            Err(Error::FelicaStatus { status1: 0x02, .. })
        ));

        let mut m = MockTransport::with_responses(vec![ok(3)]);
        assert!(matches!(
            probe_error_location_indication(&mut m, idm(), Service::from_code(0x000B), 4, &ReaderConfig::default()),
            Err(Error::Negotiation(_))
        ));
    }
}

#[path = "../common/mod.rs"]
mod common;

use libfelica::protocol::{HasStatus, PollingCommand, RequestCode, RequestServiceCommand, TimeSlot};
use libfelica::node::{Node, Service};
use libfelica::test_support::boxed_mock_with_responses;
use libfelica::transport::{exchange, MockTransport, Transport};
use libfelica::types::{KeyVersion, SystemCode};
use libfelica::utils::ms;

#[test]
fn mock_transport_records_and_replies() {
    let mut m = MockTransport::new();
    m.push_response(vec![0x01]);
    let r = m.transceive(&[0xAA], Some(ms(20))).unwrap();
    assert_eq!(r, vec![0x01]);
    assert_eq!(m.sent, vec![vec![0xAA]]);
    assert_eq!(m.timeouts, vec![Some(ms(20))]);
    assert_eq!(m.pop_sent(), Some(vec![0xAA]));
}

#[test]
fn exchange_polls_through_mock() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm_bytes();
    let pmm = common::fixtures::sample_pmm_bytes();
    let mut reply = vec![20, 0x01];
    reply.extend_from_slice(&idm);
    reply.extend_from_slice(&pmm);
    reply.extend_from_slice(&[0x00, 0x03]);

    let mut m = MockTransport::with_responses(vec![reply]);
    let cmd = PollingCommand::new(SystemCode::ANY, RequestCode::SystemCode, TimeSlot::Slot1);
    let resp = exchange(&mut m, &cmd, None)?;
    assert_eq!(resp.idm(), &common::fixtures::sample_idm());
    assert_eq!(resp.system_code(), Some(SystemCode::SUICA));
    assert_eq!(m.sent[0], hex::decode("0600ffff0100")?);
    Ok(())
}

#[test]
fn boxed_mock_serves_queued_replies() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let mut reply = vec![13, 0x03];
    reply.extend_from_slice(idm.as_bytes());
    reply.extend_from_slice(&[0x01, 0x00, 0x00]);

    let mut t = boxed_mock_with_responses(vec![reply]);
    let nodes = [Node::Service(Service::from_code(0x090F))];
    let cmd = RequestServiceCommand::from_nodes(idm, &nodes)?;
    let resp = exchange(&mut t, &cmd, None)?;
    assert_eq!(resp.key_versions(), &[KeyVersion::INITIAL]);
    assert!(t.transceive(&[0x00], None).is_err());
    Ok(())
}

#[test]
fn read_failure_status_is_decoded_not_raised() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let mut reply = vec![12, 0x07];
    reply.extend_from_slice(idm.as_bytes());
    reply.extend_from_slice(&[0x01, 0xA8]);
    let mut m = MockTransport::with_responses(vec![reply]);

    let cmd = libfelica::protocol::ReadWithoutEncryptionCommand::for_services(
        idm,
        &[common::fixtures::history_service()],
        vec![libfelica::protocol::BlockListElement::for_block(0, 9)?],
    )?;
    let resp = exchange(&mut m, &cmd, None)?;
    assert!(!resp.is_status_successful());
    assert_eq!(resp.status().status2, 0xA8);
    Ok(())
}

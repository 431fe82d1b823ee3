#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use libfelica::config::ReaderConfig;
use libfelica::negotiation::{read_blocks_from_services, BlockReader, Termination};
use libfelica::node::Service;
use libfelica::protocol::StatusFlags;
use libfelica::test_support::SimulatedCard;
use libfelica::transport::Transport;
use libfelica::types::ErrorLocationIndication;
use libfelica::Error;

#[test]
fn known_counts_read_in_one_round() -> anyhow::Result<()> {
    common::init_logger();
    let history = common::fixtures::history_service();
    let attribute = common::fixtures::attribute_service();
    let mut card = common::fixtures::two_service_card();
    let expected_history = card.contents(&history);
    let expected_attribute = card.contents(&attribute);

    let outcome = read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &[history, attribute],
        &ReaderConfig::default(),
        &[(history, 3), (attribute, 1)],
    )?;

    assert_eq!(outcome.termination, Termination::Completed);
    assert_eq!(outcome.get(&history).unwrap().len(), 48);
    assert_eq!(outcome.get(&attribute).unwrap().len(), 16);
    assert_eq!(outcome.get(&history).unwrap(), &expected_history[..]);
    assert_eq!(outcome.get(&attribute).unwrap(), &expected_attribute[..]);
    assert_eq!(card.read_requests(), 1);
    Ok(())
}

#[test]
fn unknown_counts_are_discovered() -> anyhow::Result<()> {
    let history = common::fixtures::history_service();
    let attribute = common::fixtures::attribute_service();
    let mut card = common::fixtures::two_service_card();
    let outcome = read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &[history, attribute],
        &ReaderConfig::default(),
        &[],
    )?;
    assert!(outcome.is_complete());
    assert_eq!(outcome.get(&history).unwrap(), &card.contents(&history)[..]);
    assert_eq!(outcome.get(&attribute).unwrap(), &card.contents(&attribute)[..]);
    // two rounds locate the ends of both services, the third reads
    assert_eq!(card.read_requests(), 3);
    Ok(())
}

fn limited_card(convention: ErrorLocationIndication, services: &[Service]) -> SimulatedCard {
    common::fixtures::sample_card()
        .with_limits(4, 2)
        .with_convention(convention)
        .with_pattern_service(services[0], 5)
        .with_pattern_service(services[1], 2)
        .with_pattern_service(services[2], 3)
}

#[test]
fn limits_converge_under_every_convention() -> anyhow::Result<()> {
    common::init_logger();
    let services = common::fixtures::services(3);
    for convention in [
        ErrorLocationIndication::Index,
        ErrorLocationIndication::Bitmask,
        ErrorLocationIndication::Flag,
    ] {
        let mut card = limited_card(convention, &services);
        let config = ReaderConfig::builder()
            .error_location_indication(convention)
            .build()?;
        let outcome =
            read_blocks_from_services(
                &mut card,
                common::fixtures::sample_idm(),
                &services,
                &config,
                &[],
            )?;

        assert!(outcome.is_complete(), "{}: {:?}", convention, outcome.termination);
        for s in &services {
            assert_eq!(outcome.get(s).unwrap(), &card.contents(s)[..], "{} {}", convention, s);
        }
        assert!(outcome.max_blocks_per_request <= 4);
        assert!(outcome.max_services_per_request <= 2);
        assert_eq!(outcome.block_count(), 10);
    }
    Ok(())
}

#[test]
fn index_convention_converges_to_card_limits() -> anyhow::Result<()> {
    let services = common::fixtures::services(3);
    let mut card = limited_card(ErrorLocationIndication::Index, &services);
    let outcome = read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &services,
        &ReaderConfig::default(),
        &[],
    )?;
    assert_eq!(outcome.max_blocks_per_request, 4);
    assert_eq!(outcome.max_services_per_request, 2);
    Ok(())
}

#[test]
fn service_order_error_is_fatal_on_first_round() {
    let mut card = common::fixtures::two_service_card()
        .with_fixed_status(StatusFlags::new(0xFF, 0xA3));
    let result = read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &[common::fixtures::history_service()],
        &ReaderConfig::default(),
        &[],
    );
    match result {
        Err(Error::FelicaStatus {
            status1: 0xFF,
            status2: 0xA3,
        }) => {}
        other => panic!("expected FelicaStatus, got {:?}", other),
    }
    assert_eq!(card.read_requests(), 1);
}

/// Services the card knows but which hold no blocks: every round ends in
/// an ILLEGAL_BLOCK_NUMBER for the next one, so no round ever succeeds.
fn empty_services_card(services: &[Service]) -> SimulatedCard {
    services
        .iter()
        .fold(common::fixtures::sample_card(), |card, s| card.with_pattern_service(*s, 0))
}

#[test]
fn breaker_returns_after_consecutive_failures() -> anyhow::Result<()> {
    let services = common::fixtures::services(30);

    let mut card = empty_services_card(&services);
    let outcome = read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &services,
        &ReaderConfig::default(),
        &[],
    )?;
    assert_eq!(outcome.termination, Termination::CircuitBreakerTripped);
    assert_eq!(card.read_requests(), 24);
    assert_eq!(outcome.block_count(), 0);

    let mut card = empty_services_card(&services);
    let config = ReaderConfig::builder().max_consecutive_failures(5).build()?;
    let outcome = read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &services,
        &config,
        &[],
    )?;
    assert_eq!(outcome.termination, Termination::CircuitBreakerTripped);
    assert_eq!(card.read_requests(), 5);
    Ok(())
}

#[test]
fn block_count_error_past_batch_is_a_protocol_violation() {
    let history = common::fixtures::history_service();
    let mut card = common::fixtures::sample_card()
        .with_pattern_service(history, 40)
        .with_fixed_status(StatusFlags::new(0x40, 0xA2));
    match read_blocks_from_services(
        &mut card,
        common::fixtures::sample_idm(),
        &[history],
        &ReaderConfig::default(),
        &[],
    ) {
        Err(Error::Negotiation(_)) => {}
        other => panic!("expected Negotiation, got {:?}", other),
    }
    assert_eq!(card.read_requests(), 1);
}

/// Passes `budget` exchanges through, then fails like a card leaving the field.
struct LeavingCard {
    card: SimulatedCard,
    budget: usize,
}

impl Transport for LeavingCard {
    fn transceive(&mut self, command: &[u8], timeout: Option<Duration>) -> libfelica::Result<Vec<u8>> {
        if self.budget == 0 {
            return Err(Error::Transport("card removed".into()));
        }
        self.budget -= 1;
        self.card.transceive(command, timeout)
    }
}

#[test]
fn transport_failure_keeps_completed_rounds() -> anyhow::Result<()> {
    let history = common::fixtures::history_service();
    let card = common::fixtures::sample_card().with_pattern_service(history, 40);
    let expected = card.contents(&history);
    let mut leaving = LeavingCard { card, budget: 2 };

    let outcome = read_blocks_from_services(
        &mut leaving,
        common::fixtures::sample_idm(),
        &[history],
        &ReaderConfig::default(),
        &[],
    )?;
    match &outcome.termination {
        Termination::TransportFailure(msg) => assert!(msg.contains("card removed")),
        other => panic!("expected TransportFailure, got {:?}", other),
    }
    assert_eq!(outcome.get(&history).unwrap(), &expected[..30 * 16]);
    Ok(())
}

#[test]
fn unknown_service_is_fatal_but_partial_survives() {
    let history = common::fixtures::history_service();
    let missing = Service::from_code(0x1A8B);
    let mut card = common::fixtures::sample_card()
        .with_limits(15, 1)
        .with_pattern_service(history, 3);
    let expected = card.contents(&history);

    let config = ReaderConfig::default();
    let mut reader = BlockReader::new(&mut card, common::fixtures::sample_idm(), &config);
    match reader.read(&[history, missing]) {
        Err(Error::FelicaStatus { status2: 0xA6, .. }) => {}
        other => panic!("expected FelicaStatus, got {:?}", other),
    }
    let partial = reader.partial().unwrap();
    assert_eq!(partial.termination, Termination::Incomplete);
    assert_eq!(partial.get(&history).unwrap(), &expected[..]);
    assert_eq!(partial.get(&missing).unwrap(), &[] as &[u8]);
    assert_eq!(partial.max_services_per_request, 1);
}

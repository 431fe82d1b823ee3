#[path = "../common/mod.rs"]
mod common;

use libfelica::card::{run_step, Card, ScanContext, StepOutcome, SystemScanContext};
use libfelica::config::ReaderConfig;
use libfelica::constants::command_code::{
    READ_WITHOUT_ENCRYPTION, REQUEST_BLOCK_INFORMATION, REQUEST_SERVICE,
};
use libfelica::node::{Node, Service};
use libfelica::protocol::{BlockListElement, StatusFlags};
use libfelica::test_support::SimulatedCard;
use libfelica::transport::MockTransport;
use libfelica::types::{KeyVersion, SystemCode};
use libfelica::utils::ms;
use libfelica::Error;

#[test]
fn poll_reports_identity_and_system() -> anyhow::Result<()> {
    let mut sim = common::fixtures::two_service_card();
    let card = Card::poll(&mut sim, SystemCode::ANY, ms(50))?;
    assert_eq!(card.idm(), &common::fixtures::sample_idm());
    assert_eq!(card.pmm(), &common::fixtures::sample_pmm());
    assert_eq!(card.system_code(), Some(common::fixtures::sample_system_code()));
    assert_eq!(card.timeout(), ms(50));
    Ok(())
}

#[test]
fn poll_for_other_system_times_out() {
    let mut sim = common::fixtures::two_service_card();
    match Card::poll(&mut sim, SystemCode::COMMON, ms(50)) {
        Err(Error::Timeout) => {}
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[test]
fn nodes_enumerate_services_in_order() -> anyhow::Result<()> {
    let mut sim = common::fixtures::two_service_card();
    let card = Card::poll(&mut sim, SystemCode::ANY, ms(50))?;
    let nodes = card.nodes(&mut sim).collect::<libfelica::Result<Vec<Node>>>()?;
    assert_eq!(
        nodes,
        vec![
            Node::Service(common::fixtures::history_service()),
            Node::Service(common::fixtures::attribute_service()),
        ]
    );
    Ok(())
}

#[test]
fn single_block_helpers() -> anyhow::Result<()> {
    let history = common::fixtures::history_service();
    let mut sim = common::fixtures::two_service_card();
    let card = Card::new(common::fixtures::sample_idm(), common::fixtures::sample_pmm());
    let block = card.read_single(&mut sim, history, 2)?;
    assert_eq!(&block.as_bytes()[..], &sim.contents(&history)[32..48]);

    match card.read_single(&mut sim, history, 3) {
        Err(Error::FelicaStatus { status2: 0xA8, .. }) => {}
        other => panic!("expected FelicaStatus, got {:?}", other),
    }
    Ok(())
}

#[test]
fn full_scan_reads_every_service_in_one_round() -> anyhow::Result<()> {
    common::init_logger();
    let mut sim = common::fixtures::two_service_card();
    let card = Card::poll(&mut sim, SystemCode::ANY, ms(50))?;
    let system_code = card.system_code().unwrap();
    let nodes = card.nodes(&mut sim).collect::<libfelica::Result<Vec<Node>>>()?;

    let scan = ScanContext::new()
        .with_system(SystemScanContext::new(system_code, *card.idm()).with_nodes(nodes.clone()));

    let scan = run_step(&scan, REQUEST_SERVICE, |ctx| {
        let versions = card.request_service(&mut sim, &nodes)?;
        let system = ctx.system(system_code).unwrap().with_key_versions(&nodes, &versions)?;
        Ok(ctx.with_system(system))
    })?
    .into_context();

    let scan = run_step(&scan, REQUEST_BLOCK_INFORMATION, |ctx| {
        let counts = card.request_block_information(&mut sim, &nodes)?;
        let system = ctx.system(system_code).unwrap().with_block_counts(&nodes, &counts)?;
        Ok(ctx.with_system(system))
    })?
    .into_context();

    let system = scan.system(system_code).unwrap().clone();
    let services = system.readable_services();
    assert_eq!(services.len(), 2);
    assert_eq!(system.block_count(&common::fixtures::history_service()), Some(3));
    assert_eq!(
        system.key_versions.get(&nodes[0]),
        Some(&KeyVersion::INITIAL)
    );

    let config = system.reader_config(&ReaderConfig::default());
    let mut reader = card.block_reader(&mut sim, &config);
    for s in &services {
        if let Some(n) = system.block_count(s) {
            reader = reader.with_block_count(*s, n);
        }
    }
    let outcome = reader.read(&services)?;
    assert!(outcome.is_complete());
    assert_eq!(sim.read_requests(), 1);

    let system = system.with_read_outcome(&outcome);
    for s in &services {
        assert_eq!(system.block_data.get(s), Some(&sim.contents(s)));
    }
    assert_eq!(system.max_blocks_per_request, Some(15));

    let next = system.reader_config(&ReaderConfig::default());
    assert_eq!(next.max_blocks_per_request, 15);
    assert_eq!(next.max_services_per_request, 16);
    Ok(())
}

#[test]
fn rejected_command_is_not_sent_again() -> anyhow::Result<()> {
    let history = common::fixtures::history_service();
    let mut sim = common::fixtures::two_service_card()
        .with_fixed_status(StatusFlags::new(0xFF, 0xA5));
    let card = Card::new(common::fixtures::sample_idm(), common::fixtures::sample_pmm());
    let scan = ScanContext::new();

    let read = |ctx: &ScanContext, sim: &mut SimulatedCard| -> libfelica::Result<ScanContext> {
        card.read_blocks(sim, &[history], vec![BlockListElement::for_block(0, 0)?])?;
        Ok(ctx.clone())
    };

    let outcome = run_step(&scan, READ_WITHOUT_ENCRYPTION, |ctx| read(ctx, &mut sim))?;
    let scan = match outcome {
        StepOutcome::Unsupported { context, error } => {
            assert!(matches!(error, Error::FelicaStatus { status2: 0xA5, .. }));
            context
        }
        other => panic!("expected Unsupported, got {:?}", other),
    };
    assert!(scan.is_unsupported(READ_WITHOUT_ENCRYPTION));

    let outcome = run_step(&scan, READ_WITHOUT_ENCRYPTION, |ctx| read(ctx, &mut sim))?;
    assert!(matches!(outcome, StepOutcome::Skipped(_)));
    assert_eq!(sim.read_requests(), 1);
    Ok(())
}

#[test]
fn silent_card_error_propagates() {
    let mut silent = MockTransport::new();
    let card = Card::new(common::fixtures::sample_idm(), common::fixtures::sample_pmm());
    let nodes = [Node::Service(Service::from_code(0x090F))];
    let result = run_step(&ScanContext::new(), REQUEST_SERVICE, |ctx| {
        card.request_service(&mut silent, &nodes)?;
        Ok(ctx.clone())
    });
    match result {
        Err(Error::Timeout) => {}
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[path = "../common/mod.rs"]
mod common;

use libfelica::config::ReaderConfig;
use libfelica::negotiation::{probe_error_location_indication, probe_max_blocks, probe_max_services};
use libfelica::types::ErrorLocationIndication;

#[test]
fn max_services_converges_to_card_limit() -> anyhow::Result<()> {
    common::init_logger();
    let mut card = common::fixtures::sample_card()
        .with_limits(15, 3)
        .with_pattern_service(common::fixtures::history_service(), 1);
    let n = probe_max_services(
        &mut card,
        common::fixtures::sample_idm(),
        common::fixtures::history_service(),
        &ReaderConfig::default(),
    )?;
    assert_eq!(n, 3);
    // 16, 15, ..., 3
    assert_eq!(card.read_requests(), 14);
    Ok(())
}

#[test]
fn max_blocks_converges_to_card_limit() -> anyhow::Result<()> {
    for convention in [
        ErrorLocationIndication::Flag,
        ErrorLocationIndication::Index,
        ErrorLocationIndication::Bitmask,
    ] {
        let mut card = common::fixtures::sample_card()
            .with_limits(5, 16)
            .with_convention(convention)
            .with_pattern_service(common::fixtures::history_service(), 20);
        let config = ReaderConfig::builder()
            .error_location_indication(convention)
            .build()?;
        let n = probe_max_blocks(
            &mut card,
            common::fixtures::sample_idm(),
            common::fixtures::history_service(),
            &config,
        )?;
        assert_eq!(n, 5, "convention {}", convention);
    }
    Ok(())
}

#[test]
fn convention_probe_identifies_each_card() -> anyhow::Result<()> {
    for convention in [
        ErrorLocationIndication::Flag,
        ErrorLocationIndication::Index,
        ErrorLocationIndication::Bitmask,
    ] {
        let mut card = common::fixtures::sample_card()
            .with_convention(convention)
            .with_pattern_service(common::fixtures::history_service(), 6);
        let found = probe_error_location_indication(
            &mut card,
            common::fixtures::sample_idm(),
            common::fixtures::history_service(),
            6,
            &ReaderConfig::default(),
        )?;
        assert_eq!(found, convention);
    }
    Ok(())
}

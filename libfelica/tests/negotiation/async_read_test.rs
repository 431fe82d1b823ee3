#[path = "../common/mod.rs"]
mod common;

use libfelica::config::ReaderConfig;
use libfelica::negotiation::{read_blocks_from_services_async, Termination};
use libfelica::transport::BlockingAdapter;

#[tokio::test]
async fn async_driver_matches_blocking_reader() -> anyhow::Result<()> {
    let history = common::fixtures::history_service();
    let attribute = common::fixtures::attribute_service();
    let mut card = BlockingAdapter(common::fixtures::two_service_card());

    let outcome = read_blocks_from_services_async(
        &mut card,
        common::fixtures::sample_idm(),
        &[history, attribute],
        &ReaderConfig::default(),
        &[(history, 3), (attribute, 1)],
    )
    .await?;

    assert_eq!(outcome.termination, Termination::Completed);
    let card = card.into_inner();
    assert_eq!(outcome.get(&history).unwrap(), &card.contents(&history)[..]);
    assert_eq!(outcome.get(&attribute).unwrap().len(), 16);
    assert_eq!(card.read_requests(), 1);
    Ok(())
}

#[path = "../common/mod.rs"]
mod common;

use libfelica::node::{Area, AreaAttribute, EndAreaAttribute, Node, Service};
use libfelica::protocol::{
    BlockListElement, Command, GetContainerIdCommand, GetContainerPropertyCommand, PollingCommand,
    ReadWithoutEncryptionCommand, RequestCode, RequestCodeListCommand, RequestServiceCommand,
    SearchServiceCodeCommand, TimeSlot, WriteWithoutEncryptionCommand,
};
use libfelica::types::SystemCode;

#[test]
fn polling_encodes_system_code_big_endian() -> anyhow::Result<()> {
    let cmd = PollingCommand::new(SystemCode::COMMON, RequestCode::SystemCode, TimeSlot::Slot4);
    assert_eq!(cmd.to_bytes(), hex::decode("0600fe000103")?);
    Ok(())
}

#[test]
fn read_without_encryption_layout() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let cmd = ReadWithoutEncryptionCommand::for_services(
        idm,
        &[Service::from_code(0x090F), Service::from_code(0x008B)],
        vec![
            BlockListElement::for_block(0, 0)?,
            BlockListElement::for_block(0, 300)?,
            BlockListElement::for_block(1, 0)?,
        ],
    )?;
    let bytes = cmd.to_bytes();
    let mut expected = vec![0x17, 0x06];
    expected.extend_from_slice(idm.as_bytes());
    expected.extend_from_slice(&hex::decode("020f098b0003800000 2c01 8100".replace(' ', ""))?);
    assert_eq!(bytes, expected);
    assert_eq!(bytes[0] as usize, bytes.len());
    Ok(())
}

#[test]
fn write_without_encryption_carries_data() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let data = common::fixtures::sample_blockdata(0x5A);
    let cmd = WriteWithoutEncryptionCommand::for_service(idm, Service::from_code(0x0009), &[2], vec![data])?;
    let bytes = cmd.to_bytes();
    assert_eq!(bytes.len(), 2 + 8 + 1 + 2 + 1 + 2 + 16);
    assert_eq!(&bytes[10..16], &[0x01, 0x09, 0x00, 0x01, 0x80, 0x02]);
    assert_eq!(&bytes[16..], &[0x5A; 16]);
    Ok(())
}

#[test]
fn node_lists_use_short_codes() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let area = Area::new(0x10, AreaAttribute::CanCreateSubArea, 0x20, EndAreaAttribute::EndSubArea)?;
    let cmd = RequestServiceCommand::from_nodes(
        idm,
        &[Node::Area(area), Node::Service(Service::from_code(0x090F))],
    )?;
    let bytes = cmd.to_bytes();
    assert_eq!(bytes[0], 15);
    // area 0x10 with attribute 0 -> code 0x0400, little-endian
    assert_eq!(&bytes[10..], &[0x02, 0x00, 0x04, 0x0F, 0x09]);
    Ok(())
}

#[test]
fn index_fields_are_little_endian() {
    let idm = common::fixtures::sample_idm();
    let search = SearchServiceCodeCommand::new(idm, 0x0102).to_bytes();
    assert_eq!(&search[10..], &[0x02, 0x01]);

    let list = RequestCodeListCommand::new(idm, [0x00, 0x00], 3).to_bytes();
    assert_eq!(&list[10..], &[0x00, 0x00, 0x03, 0x00]);

    assert_eq!(GetContainerPropertyCommand::new(0x0100).to_bytes(), vec![0x04, 0x2E, 0x00, 0x01]);
    assert_eq!(GetContainerIdCommand::new().to_bytes(), vec![0x04, 0x70, 0x00, 0x00]);
}

#[test]
fn construction_rejects_out_of_range_lists() {
    let idm = common::fixtures::sample_idm();
    let seventeen: Vec<Node> = common::fixtures::services(17).into_iter().map(Node::Service).collect();
    assert!(RequestServiceCommand::from_nodes(idm, &seventeen).is_err());
    assert!(RequestServiceCommand::from_nodes(idm, &[]).is_err());

    // block list element pointing past the service list
    let bad = ReadWithoutEncryptionCommand::for_services(
        idm,
        &[Service::from_code(0x090F)],
        vec![BlockListElement::for_block(1, 0).unwrap()],
    );
    assert!(bad.unwrap_err().is_malformed());
}

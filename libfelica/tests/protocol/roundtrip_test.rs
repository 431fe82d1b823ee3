#[path = "../common/mod.rs"]
mod common;

use libfelica::node::{Area, AreaAttribute, EndAreaAttribute, Node, Service};
use libfelica::protocol::*;
use libfelica::types::{
    BlockData, CountInformation, EncryptionIdentifier, KeyVersion, OptionVersion, SystemCode,
};
use proptest::prelude::*;

fn check_command<C: Command + PartialEq + std::fmt::Debug>(cmd: &C) {
    let bytes = cmd.to_bytes();
    assert_eq!(bytes[0] as usize, bytes.len(), "length byte of {:?}", cmd);
    assert_eq!(bytes[1], C::COMMAND_CODE);
    assert_eq!(&C::from_bytes(&bytes).unwrap(), cmd);
}

fn check_response<R: Response + PartialEq + std::fmt::Debug>(resp: &R) {
    let bytes = resp.to_bytes();
    assert_eq!(bytes[0] as usize, bytes.len(), "length byte of {:?}", resp);
    assert_eq!(bytes[1], R::RESPONSE_CODE);
    assert_eq!(&R::from_bytes(&bytes).unwrap(), resp);
    assert_eq!(AnyResponse::from_bytes(&bytes).unwrap().response_code(), R::RESPONSE_CODE);
}

#[test]
fn every_command_family() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let service = Node::Service(Service::from_code(0x090F));
    let sub_area = Area::new(1, AreaAttribute::CannotCreateSubArea, 9, EndAreaAttribute::EndSubArea)?;
    let area = Node::Area(sub_area);
    let block = BlockData::from_bytes([0x42; 16]);

    check_command(&PollingCommand::new(SystemCode::ANY, RequestCode::None, TimeSlot::Slot16));
    check_command(&RequestServiceCommand::from_nodes(idm, &[service, area])?);
    check_command(&RequestResponseCommand::new(idm));
    check_command(&ReadWithoutEncryptionCommand::for_services(
        idm,
        &[Service::from_code(0x090F)],
        vec![BlockListElement::for_block(0, 1)?, BlockListElement::for_block(0, 0x1FF)?],
    )?);
    check_command(&WriteWithoutEncryptionCommand::for_service(idm, Service::from_code(0x0009), &[0], vec![block])?);
    check_command(&SearchServiceCodeCommand::new(idm, 7));
    check_command(&RequestSystemCodeCommand::new(idm));
    check_command(&RequestBlockInformationCommand::from_nodes(idm, &[service])?);
    check_command(&Authentication1Command::from_nodes(idm, &[sub_area], &[Service::from_code(0x090F)], [1; 8])?);
    check_command(&Authentication2Command::new(idm, [2; 8]));
    check_command(&ReadCommand::new(idm, vec![BlockListElement::for_block(0, 3)?])?);
    check_command(&WriteCommand::new(idm, vec![BlockListElement::for_block(0, 3)?], vec![block])?);
    check_command(&RequestCodeListCommand::new(idm, [0x00, 0x00], 1));
    check_command(&RequestBlockInformationExCommand::from_nodes(idm, &[service])?);
    check_command(&SetParameterCommand::new(idm, EncryptionType::Aes, PacketType::NodeCodeSize4));
    check_command(&GetContainerIssueInformationCommand::new(idm));
    check_command(&GetAreaInformationCommand::new(idm, [0x00, 0x00]));
    check_command(&GetNodePropertyCommand::from_nodes(idm, NodePropertyType::MacCommunication, &[service])?);
    check_command(&GetContainerPropertyCommand::new(0));
    check_command(&RequestServiceV2Command::from_nodes(idm, &[service, area])?);
    check_command(&GetSystemStatusCommand::new(idm));
    check_command(&RequestSpecificationVersionCommand::new(idm));
    check_command(&ResetModeCommand::new(idm));
    check_command(&Authentication1AesCommand::from_nodes(idm, &[service], &[3; 16])?);
    check_command(&Authentication1DesCommand::from_nodes(idm, &[service], &[4; 8])?);
    check_command(&Authentication2AesDesCommand::new(idm, &[5; 16])?);
    check_command(&GetContainerIdCommand::new());
    Ok(())
}

#[test]
fn every_response_family() -> anyhow::Result<()> {
    let idm = common::fixtures::sample_idm();
    let pmm = common::fixtures::sample_pmm();
    let block = BlockData::from_bytes([0x42; 16]);
    let failed = StatusFlags::new(0x01, 0xA6);

    check_response(&PollingResponse::new(idm, pmm, Some([0x00, 0x03])));
    check_response(&RequestServiceResponse::new(idm, vec![KeyVersion::from_int(2), KeyVersion::MISSING])?);
    check_response(&RequestResponseResponse::new(idm, 3)?);
    check_response(&ReadWithoutEncryptionResponse::new_success(idm, vec![block; 2])?);
    check_response(&ReadWithoutEncryptionResponse::new_error(idm, failed)?);
    check_response(&WriteWithoutEncryptionResponse::new(idm, StatusFlags::SUCCESS));
    check_response(&SearchServiceCodeResponse::new(idm, Some(Node::Service(Service::from_code(0x090F))))?);
    check_response(&SearchServiceCodeResponse::new(idm, Some(Node::Area(Area::root())))?);
    check_response(&RequestSystemCodeResponse::new(idm, vec![SystemCode::SUICA, SystemCode::COMMON])?);
    check_response(&RequestBlockInformationResponse::new(idm, vec![CountInformation::new(5), CountInformation::INVALID])?);
    check_response(&Authentication1Response {
        idm,
        challenge_response: [1; 8],
        card_challenge: [2; 8],
    });
    check_response(&Authentication2Response { idt: idm, pmm });
    check_response(&ReadResponse::new_success(idm, vec![block])?);
    check_response(&WriteResponse::new(idm, failed));
    check_response(&RequestCodeListResponse::new_success(idm, true, vec![Area::root()], vec![Service::from_code(0x090F)])?);
    check_response(&RequestBlockInformationExResponse::new_success(
        idm,
        vec![CountInformation::new(10)],
        vec![CountInformation::new(2)],
    )?);
    check_response(&SetParameterResponse::new_success(idm));
    check_response(&GetContainerIssueInformationResponse {
        idm,
        format_version_carrier_information: [1; 5],
        mobile_phone_model_information: [2; 11],
    });
    check_response(&GetAreaInformationResponse::new(idm, StatusFlags::SUCCESS, Some([0x00, 0x00]), Some(CountInformation::new(3)))?);
    check_response(&GetAreaInformationResponse::new(idm, failed, None, None)?);
    check_response(&GetNodePropertyResponse::new_success(idm, vec![vec![0x01], vec![0x00]])?);
    check_response(&GetContainerPropertyResponse::new(vec![0xAB, 0xCD])?);
    check_response(&RequestServiceV2Response::new_success(
        idm,
        EncryptionIdentifier::Aes128Des112,
        vec![KeyVersion::from_int(1)],
        vec![KeyVersion::from_int(2)],
    )?);
    check_response(&RequestServiceV2Response::new_error(idm, failed)?);
    check_response(&GetSystemStatusResponse::new_success(idm, 0x01, vec![0xAA, 0xBB])?);
    check_response(&RequestSpecificationVersionResponse::new_success(
        idm,
        OptionVersion::new(1, 10)?,
        vec![OptionVersion::new(2, 0)?],
    )?);
    check_response(&ResetModeResponse::new_success(idm));
    check_response(&Authentication1AesResponse {
        idm,
        card_challenge: [3; 16],
        encrypted: [4; 16],
    });
    check_response(&Authentication1DesResponse {
        idm,
        card_challenge: [5; 8],
        encrypted: [6; 8],
    });
    check_response(&Authentication2AesDesResponse::new(idm, StatusFlags::SUCCESS, Some((idm, pmm)))?);
    check_response(&GetContainerIdResponse { container_idm: idm });
    Ok(())
}

proptest! {
    #[test]
    fn read_command_roundtrips(
        blocks in proptest::collection::vec((0u8..4, any::<u16>()), 1..20),
    ) {
        let services: Vec<Service> = common::fixtures::services(4);
        let list: Vec<BlockListElement> = blocks
            .iter()
            .map(|&(o, b)| BlockListElement::for_block(o, b).unwrap())
            .collect();
        let cmd = ReadWithoutEncryptionCommand::for_services(
            common::fixtures::sample_idm(),
            &services,
            list,
        ).unwrap();
        let bytes = cmd.to_bytes();
        prop_assert_eq!(bytes[0] as usize, bytes.len());
        prop_assert_eq!(ReadWithoutEncryptionCommand::from_bytes(&bytes).unwrap(), cmd);
    }

    #[test]
    fn block_responses_roundtrip(fills in proptest::collection::vec(any::<u8>(), 0..=15)) {
        let idm = common::fixtures::sample_idm();
        let blocks: Vec<BlockData> = fills.iter().map(|f| BlockData::from_bytes([*f; 16])).collect();
        let resp = ReadWithoutEncryptionResponse::new_success(idm, blocks).unwrap();
        let bytes = resp.to_bytes();
        prop_assert_eq!(bytes[0] as usize, bytes.len());
        prop_assert_eq!(ReadWithoutEncryptionResponse::from_bytes(&bytes).unwrap(), resp);
    }
}

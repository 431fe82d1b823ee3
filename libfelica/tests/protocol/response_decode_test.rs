#[path = "../common/mod.rs"]
mod common;

use libfelica::protocol::{
    AnyResponse, HasStatus, PollingResponse, ReadWithoutEncryptionResponse, Response,
    SearchServiceCodeResponse, StatusFlags,
};
use libfelica::Error;

fn frame(code: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![(body.len() + 2) as u8, code];
    out.extend_from_slice(body);
    out
}

#[test]
fn polling_response_with_request_data() {
    let mut body = common::fixtures::sample_idm_bytes().to_vec();
    body.extend_from_slice(&common::fixtures::sample_pmm_bytes());
    body.extend_from_slice(&[0x00, 0x03]);
    let resp = PollingResponse::from_bytes(&frame(0x01, &body)).unwrap();
    assert_eq!(resp.idm(), &common::fixtures::sample_idm());
    assert_eq!(resp.pmm(), &common::fixtures::sample_pmm());
    assert_eq!(resp.system_code(), Some(common::fixtures::sample_system_code()));

    // without request data
    let resp = PollingResponse::from_bytes(&frame(0x01, &body[..16])).unwrap();
    assert_eq!(resp.request_data(), None);
}

#[test]
fn read_response_decodes_blocks() {
    let mut body = common::fixtures::sample_idm_bytes().to_vec();
    body.extend_from_slice(&[0x00, 0x00, 0x01]);
    body.extend_from_slice(&[0xAA; 16]);
    let resp = ReadWithoutEncryptionResponse::from_bytes(&frame(0x07, &body)).unwrap();
    assert!(resp.is_status_successful());
    assert_eq!(resp.blocks(), &[common::fixtures::sample_blockdata(0xAA)]);
}

#[test]
fn read_error_response_has_no_blocks() {
    let mut body = common::fixtures::sample_idm_bytes().to_vec();
    body.extend_from_slice(&[0x01, 0xA8]);
    let resp = ReadWithoutEncryptionResponse::from_bytes(&frame(0x07, &body)).unwrap();
    assert_eq!(resp.status(), StatusFlags::new(0x01, 0xA8));
    assert!(resp.blocks().is_empty());

    // payload after an error status is rejected
    body.push(0x00);
    assert!(ReadWithoutEncryptionResponse::from_bytes(&frame(0x07, &body)).is_err());
}

#[test]
fn checks_run_in_order() {
    let body = common::fixtures::sample_idm_bytes();
    // too short for anything
    match ReadWithoutEncryptionResponse::from_bytes(&[0x02]) {
        Err(Error::InvalidLength { .. }) => {}
        other => panic!("expected InvalidLength, got {:?}", other),
    }
    // declared length disagrees with the buffer
    let mut bad_len = frame(0x07, &body);
    bad_len.extend_from_slice(&[0x00, 0x00]);
    match ReadWithoutEncryptionResponse::from_bytes(&bad_len) {
        Err(Error::InvalidLength { .. }) => {}
        other => panic!("expected InvalidLength, got {:?}", other),
    }
    // right length, wrong code
    let mut with_status = body.to_vec();
    with_status.extend_from_slice(&[0x00, 0x00, 0x00]);
    match ReadWithoutEncryptionResponse::from_bytes(&frame(0x09, &with_status)) {
        Err(Error::UnexpectedResponse {
            expected: 0x07,
            actual: 0x09,
        }) => {}
        other => panic!("expected UnexpectedResponse, got {:?}", other),
    }
}

#[test]
fn search_end_marker_decodes_to_none() {
    let mut body = common::fixtures::sample_idm_bytes().to_vec();
    body.extend_from_slice(&[0xFF, 0xFF]);
    let resp = SearchServiceCodeResponse::from_bytes(&frame(0x0B, &body)).unwrap();
    assert!(resp.is_end());
    assert_eq!(resp.to_bytes(), frame(0x0B, &body));
}

#[test]
fn any_response_dispatches_on_code() {
    let mut body = common::fixtures::sample_idm_bytes().to_vec();
    body.extend_from_slice(&[0x00, 0x00]);
    match AnyResponse::from_bytes(&frame(0x09, &body)).unwrap() {
        AnyResponse::WriteWithoutEncryption(w) => assert!(w.is_status_successful()),
        other => panic!("expected write response, got {:?}", other),
    }
    assert!(AnyResponse::from_bytes(&frame(0x50, &body)).unwrap_err().is_malformed());
}

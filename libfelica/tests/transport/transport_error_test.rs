#[path = "../common/mod.rs"]
mod common;

use libfelica::protocol::{RequestResponseCommand, RequestSystemCodeCommand};
use libfelica::transport::{exchange, MockTransport, Transport};
use libfelica::Error;

#[test]
fn injected_failure_and_recovery() {
    let mut m = MockTransport::with_responses(vec![vec![0xAA]]);
    m.set_failures(1);

    // First call fails like a dropped link
    match m.transceive(&[0x00], None) {
        Err(e) => assert!(e.is_transport()),
        Ok(r) => panic!("expected failure, got {:?}", r),
    }

    // Second call gets the queued reply
    assert_eq!(m.transceive(&[0x00], None).unwrap(), vec![0xAA]);
    assert_eq!(m.sent.len(), 2);
}

#[test]
fn empty_queue_times_out() {
    let mut m = MockTransport::new();
    let cmd = RequestSystemCodeCommand::new(common::fixtures::sample_idm());
    match exchange(&mut m, &cmd, None) {
        Err(Error::Timeout) => {}
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[test]
fn truncated_reply_is_malformed() {
    let mut m = MockTransport::with_responses(vec![vec![0x0B, 0x05, 0x01]]);
    let cmd = RequestResponseCommand::new(common::fixtures::sample_idm());
    match exchange(&mut m, &cmd, None) {
        Err(e) if e.is_malformed() => {}
        other => panic!("expected malformed reply, got {:?}", other),
    }
}

// fixtures.rs: commonly used identities, services and simulated cards

use libfelica::node::Service;
use libfelica::test_support::SimulatedCard;
use libfelica::types::{BlockData, Idm, Pmm, SystemCode};

pub fn sample_idm_bytes() -> [u8; 8] {
    [0x01, 0x2E, 0x4C, 0xD5, 0x8A, 0x12, 0x34, 0x56]
}

pub fn sample_pmm_bytes() -> [u8; 8] {
    [0x10, 0x0B, 0x4B, 0x42, 0x84, 0x85, 0xD0, 0xFF]
}

pub fn sample_idm() -> Idm {
    Idm::from_bytes(sample_idm_bytes())
}

pub fn sample_pmm() -> Pmm {
    Pmm::from_bytes(sample_pmm_bytes())
}

pub fn sample_system_code() -> SystemCode {
    SystemCode::SUICA
}

pub fn sample_blockdata(fill: u8) -> BlockData {
    BlockData::from_bytes([fill; 16])
}

/// Read-only history service (0x090F).
pub fn history_service() -> Service {
    Service::from_code(0x090F)
}

/// Read-only attribute service (0x008B).
pub fn attribute_service() -> Service {
    Service::from_code(0x008B)
}

/// `n` distinct read-only services.
pub fn services(n: u16) -> Vec<Service> {
    (0..n).map(|i| Service::from_code(((i + 1) << 6) | 0x0B)).collect()
}

/// A card with the sample identity and default limits (15 blocks,
/// 16 services, index convention) and no services.
pub fn sample_card() -> SimulatedCard {
    SimulatedCard::new(sample_idm()).with_limits(15, 16)
}

/// Two services: history with 3 blocks, attribute with 1.
pub fn two_service_card() -> SimulatedCard {
    sample_card()
        .with_pattern_service(history_service(), 3)
        .with_pattern_service(attribute_service(), 1)
}

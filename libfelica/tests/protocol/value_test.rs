use libfelica::node::{Area, AreaAttribute, EndAreaAttribute, Node, Service, ServiceAttribute, System};
use libfelica::protocol::{AccessMode, BlockListElement};
use libfelica::types::{CountInformation, KeyVersion, OptionVersion};
use proptest::prelude::*;

fn area(number: u16, end: u16) -> Area {
    Area::new(number, AreaAttribute::CanCreateSubArea, end, EndAreaAttribute::EndSubArea).unwrap()
}

#[test]
fn root_area_contains_every_service() {
    let root = Node::Area(
        Area::new(0, AreaAttribute::CanCreateSubArea, 1023, EndAreaAttribute::EndRootArea).unwrap(),
    );
    for n in [0u16, 1, 512, 1023] {
        let s = Node::Service(Service::new(n, ServiceAttribute::RandomRoWithoutKey).unwrap());
        assert!(s.belongs_to(&root), "service {} outside the root area", n);
    }
}

#[test]
fn sub_area_containment_is_one_way() {
    let outer = Node::Area(area(50, 200));
    let inner = Node::Area(area(100, 150));
    assert!(inner.belongs_to(&outer));
    assert!(!outer.belongs_to(&inner));
    assert!(!outer.belongs_to(&outer));
    assert!(!Node::System(System).belongs_to(&outer));
    assert!(!inner.belongs_to(&Node::Service(Service::from_code(0x1900))));
}

#[test]
fn key_version_missing_sentinel() {
    assert!(KeyVersion::from_int(0xFFFF).is_missing());
    assert!(!KeyVersion::from_int(0x0000).is_missing());
    assert!(CountInformation::new(0xFFFF).is_invalid());
    assert_eq!(CountInformation::new(12).valid_count(), Some(12));
}

#[test]
fn block_list_element_packing() {
    let normal = BlockListElement::new(0, 5, AccessMode::Normal, false).unwrap();
    assert_eq!(normal.to_bytes(), vec![0x80, 0x05]);
    let extended = BlockListElement::new(1, 0x1234, AccessMode::Cashback, true).unwrap();
    assert_eq!(extended.to_bytes(), vec![0x11, 0x34, 0x12]);
}

#[test]
fn option_version_is_bcd() {
    let v = OptionVersion::from_bytes(&[0x10, 0x01]).unwrap();
    assert_eq!((v.major(), v.minor()), (1, 10));
    assert_eq!(v.to_bytes(), [0x10, 0x01]);
    assert!(OptionVersion::from_bytes(&[0x1A, 0x01]).is_err());
}

proptest! {
    #[test]
    fn key_version_int_roundtrip(v in any::<u16>()) {
        prop_assert_eq!(KeyVersion::from_int(v).to_int(), v);
        let k = KeyVersion::from_int(v);
        prop_assert_eq!(KeyVersion::from_bytes(&k.to_bytes()).unwrap(), k);
    }

    #[test]
    fn any_service_number_is_in_root(n in 0u16..=1023, attr in 0u8..64) {
        let s = Node::Service(Service::from_code((n << 6) | attr as u16));
        prop_assert!(s.belongs_to(&Node::Area(Area::root())));
    }

    #[test]
    fn service_code_roundtrip(code in 0u16..0xFFFF) {
        let s = Service::from_code(code);
        prop_assert_eq!(s.code(), code);
        prop_assert_eq!(Service::from_bytes(&s.to_bytes()).unwrap(), s);
    }
}

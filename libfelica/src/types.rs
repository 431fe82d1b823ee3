// libfelica/src/types.rs

use crate::{Error, Result};
use derive_more::{Display, From};
use std::convert::TryFrom;

fn exact<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    if bytes.len() != N {
        return Err(Error::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(bytes);
    Ok(arr)
}

/// IDm - Newtype Pattern (8 バイト)
///
/// Also used for IDt, the transaction identifier returned by mutual
/// authentication; both share the same 8 byte layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Idm([u8; 8]);

impl Idm {
    /// Wrap raw identifier bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Lower-case hex, no separators.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Idm {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        exact::<8>(bytes).map(Self)
    }
}

/// PMm - Newtype Pattern (8 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pmm([u8; 8]);

impl Pmm {
    /// Wrap raw parameter bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw parameter bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Pmm {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        exact::<8>(bytes).map(Self)
    }
}

/// SystemCode (u16). Carried big-endian on the wire, unlike the
/// little-endian node codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{:04X}", _0)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemCode(u16);

impl SystemCode {
    /// Wildcard accepted by polling.
    pub const ANY: Self = Self(0xffff);
    /// Common area system.
    pub const COMMON: Self = Self(0xfe00);
    /// Transit IC system.
    pub const SUICA: Self = Self(0x0003);

    /// Wrap a system code.
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The code as a number.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Big-endian wire form.
    pub fn to_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Decode the big-endian wire form.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

/// BlockData (16 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockData([u8; 16]);

impl BlockData {
    /// Wrap raw block bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw block bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lower-case hex, no separators.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex_spaced(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for BlockData {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        exact::<16>(bytes).map(Self)
    }
}

/// Key version of a node. `0xFFFF` is reported for nodes that do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Display)]
#[display(fmt = "{:#06x}", _0)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyVersion(u16);

impl KeyVersion {
    /// Version of a node whose key was never changed.
    pub const INITIAL: Self = Self(0x0000);
    /// Version reported for nodes that do not exist.
    pub const MISSING: Self = Self(0xFFFF);

    /// Wrap a key version.
    pub const fn from_int(value: u16) -> Self {
        Self(value)
    }

    /// The version as a number.
    pub fn to_int(&self) -> u16 {
        self.0
    }

    /// Whether the node does not exist.
    pub fn is_missing(&self) -> bool {
        *self == Self::MISSING
    }

    /// Decode a little-endian version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        exact::<2>(bytes).map(|b| Self(u16::from_le_bytes(b)))
    }

    /// Little-endian wire form.
    pub fn to_bytes(&self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

/// Block count reported for a node. `0xFFFF` means the card could not
/// report a count (unknown node or unsupported query).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Display)]
#[display(fmt = "{}", _0)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountInformation(u16);

impl CountInformation {
    /// Sentinel for an unavailable count.
    pub const INVALID: Self = Self(0xFFFF);

    /// Wrap a block count.
    pub const fn new(count: u16) -> Self {
        Self(count)
    }

    /// Raw count, including the sentinel.
    pub fn count(&self) -> u16 {
        self.0
    }

    /// Whether this is the sentinel.
    pub fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }

    /// The count, or `None` for the invalid sentinel.
    pub fn valid_count(&self) -> Option<u16> {
        (!self.is_invalid()).then_some(self.0)
    }

    /// Decode a little-endian count.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        exact::<2>(bytes).map(|b| Self(u16::from_le_bytes(b)))
    }

    /// Little-endian wire form.
    pub fn to_bytes(&self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

/// Specification/option version as returned by
/// RequestSpecificationVersion: one BCD digit of major version and two
/// BCD digits of minor version, packed into a little-endian u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}.{:02}", major, minor)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionVersion {
    major: u8,
    minor: u8,
}

impl OptionVersion {
    /// A version from its digits; `major` must be 0..=9 and `minor` 0..=99.
    pub fn new(major: u8, minor: u8) -> Result<Self> {
        if major > 9 || minor > 99 {
            return Err(Error::malformed(format!(
                "option version {}.{} out of BCD range",
                major, minor
            )));
        }
        Ok(Self { major, minor })
    }

    /// Major digit.
    pub fn major(&self) -> u8 {
        self.major
    }

    /// Minor digits.
    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Decode the packed BCD form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let [lo, hi] = exact::<2>(bytes)?;
        if hi & 0xF0 != 0 {
            return Err(Error::malformed(format!(
                "option version high byte {:#04x} has reserved bits set",
                hi
            )));
        }
        let major = bcd_digit(hi & 0x0F)?;
        let minor = bcd_digit(lo >> 4)? * 10 + bcd_digit(lo & 0x0F)?;
        Ok(Self { major, minor })
    }

    /// Packed BCD form.
    pub fn to_bytes(&self) -> [u8; 2] {
        let lo = ((self.minor / 10) << 4) | (self.minor % 10);
        [lo, self.major]
    }
}

fn bcd_digit(nibble: u8) -> Result<u8> {
    if nibble > 9 {
        return Err(Error::malformed(format!("non-BCD nibble {:#x}", nibble)));
    }
    Ok(nibble)
}

/// Encryption identifier carried by RequestServiceV2 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncryptionIdentifier {
    /// AES 128 only.
    Aes128,
    /// AES 128 and DES 112.
    Aes128Des112,
    /// Any other identifier byte.
    Unknown(u8),
}

impl EncryptionIdentifier {
    /// Decode an identifier byte.
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x4F => Self::Aes128,
            0x41 => Self::Aes128Des112,
            other => Self::Unknown(other),
        }
    }

    /// Identifier byte.
    pub fn to_byte(&self) -> u8 {
        match self {
            Self::Aes128 => 0x4F,
            Self::Aes128Des112 => 0x41,
            Self::Unknown(b) => *b,
        }
    }

    /// Whether a DES key version list follows the AES one.
    pub fn has_des(&self) -> bool {
        matches!(self, Self::Aes128Des112)
    }
}

/// How a card reports which element of a batch request was invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorLocationIndication {
    /// Status flag 1 is always `0xFF`; the position is not reported.
    #[display(fmt = "flag")]
    Flag,
    /// Status flag 1 is the 1-based index of the offending element.
    #[display(fmt = "index")]
    Index,
    /// Status flag 1 is a bitmask of offending element positions.
    #[display(fmt = "bitmask")]
    Bitmask,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn idm_try_from_ok() {
        let b: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let idm = Idm::try_from(&b[..]).unwrap();
        assert_eq!(idm.as_bytes(), &b);
    }

    #[test]
    fn idm_try_from_err() {
        let b: [u8; 4] = [0, 1, 2, 3];
        assert!(Idm::try_from(&b[..]).is_err());
    }

    #[test]
    fn idm_to_hex() {
        let b: [u8; 8] = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33];
        let idm = Idm::from_bytes(b);
        assert_eq!(idm.to_hex(), "deadbeef00112233");
    }

    #[test]
    fn system_code_is_big_endian() {
        assert_eq!(SystemCode::COMMON.to_bytes(), [0xFE, 0x00]);
        assert_eq!(SystemCode::from_bytes([0x00, 0x03]), SystemCode::SUICA);
        assert_eq!(SystemCode::COMMON.to_string(), "FE00");
    }

    #[test]
    fn key_version_sentinels() {
        assert!(KeyVersion::from_int(0xFFFF).is_missing());
        assert!(!KeyVersion::from_int(0x0000).is_missing());
        assert_eq!(KeyVersion::INITIAL.to_int(), 0);
        assert_eq!(KeyVersion::from(0x0102u16).to_bytes(), [0x02, 0x01]);
    }

    #[test]
    fn key_version_wrong_width() {
        assert!(matches!(
            KeyVersion::from_bytes(&[0x01]),
            Err(Error::InvalidLength {
                expected: 2,
                actual: 1
            })
        ));
        assert!(KeyVersion::from_bytes(&[0, 0, 0]).is_err());
    }

    #[test]
    fn count_information_sentinel() {
        let c = CountInformation::from_bytes(&[0x0A, 0x00]).unwrap();
        assert_eq!(c.valid_count(), Some(10));
        assert!(CountInformation::from_bytes(&[0xFF, 0xFF]).unwrap().is_invalid());
        assert_eq!(CountInformation::INVALID.valid_count(), None);
    }

    #[test]
    fn option_version_bcd() {
        let v = OptionVersion::from_bytes(&[0x10, 0x01]).unwrap();
        assert_eq!((v.major(), v.minor()), (1, 10));
        assert_eq!(v.to_string(), "1.10");
        assert_eq!(v.to_bytes(), [0x10, 0x01]);

        assert!(OptionVersion::from_bytes(&[0x1A, 0x01]).is_err());
        assert!(OptionVersion::from_bytes(&[0x10, 0x11]).is_err());
        assert!(OptionVersion::new(10, 0).is_err());
    }

    #[test]
    fn encryption_identifier_unknown_roundtrip() {
        assert_eq!(EncryptionIdentifier::from_byte(0x4F), EncryptionIdentifier::Aes128);
        assert!(EncryptionIdentifier::from_byte(0x41).has_des());
        let unknown = EncryptionIdentifier::from_byte(0x12);
        assert_eq!(unknown, EncryptionIdentifier::Unknown(0x12));
        assert_eq!(unknown.to_byte(), 0x12);
    }

    proptest! {
        #[test]
        fn key_version_int_roundtrip(v in any::<u16>()) {
            prop_assert_eq!(KeyVersion::from_int(v).to_int(), v);
            let kv = KeyVersion::from_int(v);
            prop_assert_eq!(KeyVersion::from_bytes(&kv.to_bytes()).unwrap(), kv);
        }

        #[test]
        fn option_version_roundtrip(major in 0u8..10, minor in 0u8..100) {
            let v = OptionVersion::new(major, minor).unwrap();
            prop_assert_eq!(OptionVersion::from_bytes(&v.to_bytes()).unwrap(), v);
        }
    }
}

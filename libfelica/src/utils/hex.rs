// libfelica/src/utils/hex.rs

//! Hex rendering for frame traces and fixtures.

use std::fmt::Write;

/// Lowercase hex without separators: `[0x10, 0x06]` -> `"1006"`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        // writing to a String cannot fail
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Lowercase hex with one space between bytes, the form used when a
/// frame is split into fields by eye.
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

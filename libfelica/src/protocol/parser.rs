// libfelica/src/protocol/parser.rs

use crate::constants::MAX_FRAME_LEN;
use crate::types::{Idm, Pmm};
use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    ensure_len(data, idx + 1)?;
    Ok(data[idx])
}

/// Ensure the code byte (index 1, after the length byte) equals `expected`.
pub fn expect_code(data: &[u8], expected: u8) -> Result<()> {
    let actual = byte_at(data, 1)?;
    if actual != expected {
        return Err(Error::UnexpectedResponse { expected, actual });
    }
    Ok(())
}

/// Run the checks shared by every message, in order: minimum length,
/// declared length byte, code byte. Returns a reader positioned after
/// the code byte.
pub fn open_frame(data: &[u8], min_len: usize, code: u8) -> Result<FieldReader<'_>> {
    ensure_len(data, min_len.max(2))?;
    let declared = data[0] as usize;
    if declared != data.len() {
        return Err(Error::malformed(format!(
            "declared length {} does not match actual length {}",
            declared,
            data.len()
        )));
    }
    expect_code(data, code)?;
    Ok(FieldReader { data, pos: 2 })
}

/// Reject reserved fields that are not zero.
pub fn expect_reserved_zero(field: &str, bytes: &[u8]) -> Result<()> {
    if bytes.iter().any(|&b| b != 0) {
        return Err(Error::malformed(format!(
            "reserved field {} is not zero: {}",
            field,
            crate::utils::bytes_to_hex(bytes)
        )));
    }
    Ok(())
}

/// Reject lists outside `1..=max`.
pub fn check_count(what: &str, count: usize, max: usize) -> Result<()> {
    if count == 0 || count > max {
        return Err(Error::malformed(format!(
            "{} count {} outside 1..={}",
            what, count, max
        )));
    }
    Ok(())
}

/// Sequential, bounds-checked reader over a message body.
#[derive(Debug)]
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// A reader positioned at the first byte of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte was consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Next byte.
    pub fn byte(&mut self) -> Result<u8> {
        let b = byte_at(self.data, self.pos)?;
        self.pos += 1;
        Ok(b)
    }

    /// Next `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        ensure_len(self.data, self.pos + len)?;
        let s = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }

    /// Next `N` bytes as an array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.bytes(N)?);
        Ok(arr)
    }

    /// Next little-endian u16.
    pub fn le_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array::<2>()?))
    }

    /// Next 8 bytes as an IDm.
    pub fn idm(&mut self) -> Result<Idm> {
        Ok(Idm::from_bytes(self.array::<8>()?))
    }

    /// Next 8 bytes as a PMm.
    pub fn pmm(&mut self) -> Result<Pmm> {
        Ok(Pmm::from_bytes(self.array::<8>()?))
    }

    /// `count` fixed-width items.
    pub fn chunks(&mut self, count: usize, width: usize) -> Result<Vec<&'a [u8]>> {
        let total = count.checked_mul(width).ok_or(Error::InvalidLength {
            expected: usize::MAX,
            actual: self.remaining(),
        })?;
        let raw = self.bytes(total)?;
        Ok(raw.chunks(width).collect())
    }

    /// Everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let s = &self.data[self.pos..];
        self.pos = self.data.len();
        s
    }

    /// Fail if bytes remain unread.
    pub fn finish(self) -> Result<()> {
        if !self.is_empty() {
            return Err(Error::malformed(format!(
                "{} trailing bytes after message body",
                self.remaining()
            )));
        }
        Ok(())
    }
}

/// Builds `[len][code][body...]`, filling the length byte last.
#[derive(Debug)]
pub struct FrameBuilder {
    buf: Vec<u8>,
}

impl FrameBuilder {
    /// A frame with code byte `code`.
    pub fn new(code: u8) -> Self {
        let mut buf = Vec::with_capacity(32);
        buf.push(0);
        buf.push(code);
        Self { buf }
    }

    /// Append one byte.
    pub fn byte(mut self, b: u8) -> Self {
        self.buf.push(b);
        self
    }

    /// Append raw bytes.
    pub fn bytes(mut self, b: &[u8]) -> Self {
        self.buf.extend_from_slice(b);
        self
    }

    /// Append the encoding of each item.
    pub fn each<T>(mut self, items: &[T], f: impl Fn(&T) -> Vec<u8>) -> Self {
        for item in items {
            self.buf.extend_from_slice(&f(item));
        }
        self
    }

    /// Finish the frame, filling in the length byte.
    pub fn build(mut self) -> Vec<u8> {
        // Constructors cap every message at MAX_FRAME_LEN.
        debug_assert!(self.buf.len() <= MAX_FRAME_LEN);
        self.buf[0] = self.buf.len() as u8;
        self.buf
    }
}

/// Reject messages whose total size would overflow the length byte.
pub fn check_frame_len(total: usize) -> Result<()> {
    if total > MAX_FRAME_LEN {
        return Err(Error::malformed(format!(
            "message of {} bytes exceeds {} byte frame",
            total, MAX_FRAME_LEN
        )));
    }
    Ok(())
}

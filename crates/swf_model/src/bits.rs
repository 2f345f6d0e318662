//! Bit-level readers and writers
//!
//! Geometry in a tag payload is packed as MSB-first bit fields of variable
//! width, while scalar fields are little-endian and byte aligned. Every
//! byte-level read or write first discards (or pads) a partially used byte.

use crate::{Result, SwfError};

/// Number of bits needed to store `value` as a signed bit field.
pub fn signed_bits(value: i32) -> u32 {
    let magnitude = if value < 0 { !value } else { value };
    32 - magnitude.leading_zeros() + 1
}

/// Number of bits needed to store `value` as an unsigned bit field.
pub fn unsigned_bits(value: u32) -> u32 {
    32 - value.leading_zeros()
}

// =============================================================================
// Reader
// =============================================================================

/// Cursor over a borrowed payload
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Bits already consumed from `data[pos]`
    bit: u8,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, bit: 0 }
    }

    /// Create a reader positioned at byte `pos`
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos, bit: 0 }
    }

    /// Current byte offset (the partially consumed byte counts as unread)
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the cursor sits on a byte boundary
    pub fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    /// Whether every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Bytes from the current (aligned) position to the end of the payload
    pub fn remaining(&self) -> &'a [u8] {
        let start = if self.bit == 0 { self.pos } else { self.pos + 1 };
        self.data.get(start..).unwrap_or(&[])
    }

    /// Skip the rest of a partially consumed byte
    pub fn align(&mut self) {
        if self.bit != 0 {
            self.pos += 1;
            self.bit = 0;
        }
    }

    fn eof(&self) -> SwfError {
        SwfError::UnexpectedEof { offset: self.pos }
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.eof())?;
        let value = (byte >> (7 - self.bit)) & 1;
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.pos += 1;
        }
        Ok(value == 1)
    }

    /// Read an unsigned bit field of up to 32 bits
    pub fn read_ubits(&mut self, count: u32) -> Result<u32> {
        if count > 32 {
            return Err(SwfError::ValueOutOfRange(format!(
                "bit field of {} bits",
                count
            )));
        }
        let mut value: u64 = 0;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value as u32)
    }

    /// Read a sign-extended bit field of up to 32 bits
    pub fn read_sbits(&mut self, count: u32) -> Result<i32> {
        if count == 0 {
            return Ok(0);
        }
        let raw = i64::from(self.read_ubits(count)?);
        let sign = 1i64 << (count - 1);
        let value = if raw & sign != 0 {
            raw - (1i64 << count)
        } else {
            raw
        };
        Ok(value as i32)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.align();
        let byte = *self.data.get(self.pos).ok_or_else(|| self.eof())?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.align();
        let end = self.pos.checked_add(len).ok_or_else(|| self.eof())?;
        let bytes = self.data.get(self.pos..end).ok_or_else(|| self.eof())?;
        self.pos = end;
        Ok(bytes)
    }

    /// Read a NUL-terminated string (invalid UTF-8 is replaced)
    pub fn read_cstring(&mut self) -> Result<String> {
        self.align();
        let rest = self.data.get(self.pos..).ok_or_else(|| self.eof())?;
        let len = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            SwfError::UnexpectedEof {
                offset: self.data.len(),
            }
        })?;
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Growable output buffer with bit-field support
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    buf: Vec<u8>,
    /// Bits already used in the last byte of `buf`
    bit: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue writing after existing bytes
    pub fn with_bytes(buf: Vec<u8>) -> Self {
        Self { buf, bit: 0 }
    }

    /// Number of bytes written so far (including a partial byte)
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Pad the current byte with zero bits
    pub fn align(&mut self) {
        self.bit = 0;
    }

    pub fn write_bit(&mut self, value: bool) {
        if self.bit == 0 {
            self.buf.push(0);
        }
        if value {
            if let Some(last) = self.buf.last_mut() {
                *last |= 0x80 >> self.bit;
            }
        }
        self.bit = (self.bit + 1) % 8;
    }

    pub fn write_ubits(&mut self, value: u32, count: u32) {
        let value = u64::from(value);
        for shift in (0..count.min(32)).rev() {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }

    pub fn write_sbits(&mut self, value: i32, count: u32) {
        self.write_ubits(value as u32, count);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.align();
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align();
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_cstring(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
        self.buf.push(0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_signed_bit_counts() {
        assert_eq!(signed_bits(0), 1);
        assert_eq!(signed_bits(-1), 1);
        assert_eq!(signed_bits(1), 2);
        assert_eq!(signed_bits(100), 8);
        assert_eq!(signed_bits(-128), 8);
        assert_eq!(signed_bits(i32::MIN), 32);
        assert_eq!(unsigned_bits(0), 0);
        assert_eq!(unsigned_bits(255), 8);
    }

    #[test]
    fn test_reader_bit_fields() {
        // 101 11110 | 0000 0001
        let data = [0b1011_1110, 0b0000_0001];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_ubits(3).unwrap(), 0b101);
        assert_eq!(reader.read_sbits(5).unwrap(), -2);
        assert!(reader.is_aligned());
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_eof_reports_offset() {
        let data = [0xff];
        let mut reader = BitReader::new(&data);
        reader.read_u8().unwrap();
        match reader.read_u16() {
            Err(SwfError::UnexpectedEof { offset }) => assert_eq!(offset, 1),
            other => panic!("Expected EOF, got {:?}", other),
        }
    }

    #[test]
    fn test_byte_reads_align() {
        let data = [0x80, 0x34, 0x12];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_cstring() {
        let data = b"clip\0rest";
        let mut reader = BitReader::new(data);
        assert_eq!(reader.read_cstring().unwrap(), "clip");
        assert_eq!(reader.remaining(), b"rest");
    }

    #[test]
    fn test_writer_mixed_fields() {
        let mut writer = BitWriter::new();
        writer.write_ubits(0b101, 3);
        writer.write_sbits(-2, 5);
        writer.write_bit(true);
        writer.write_u16(0x1234);
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0b1011_1110, 0x80, 0x34, 0x12]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_ubits(3).unwrap(), 5);
        assert_eq!(reader.read_sbits(5).unwrap(), -2);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
    }

    proptest! {
        #[test]
        fn signed_field_round_trips(value in any::<i32>(), lead in 0u32..8) {
            let bits = signed_bits(value);
            let mut writer = BitWriter::new();
            writer.write_ubits(0, lead);
            writer.write_sbits(value, bits);
            let bytes = writer.into_bytes();

            let mut reader = BitReader::new(&bytes);
            reader.read_ubits(lead).unwrap();
            prop_assert_eq!(reader.read_sbits(bits).unwrap(), value);
        }

        #[test]
        fn unsigned_width_is_minimal(value in 1u32..) {
            let bits = unsigned_bits(value);
            prop_assert!(value >> (bits - 1) == 1);
        }
    }
}

//! Streaming decoder for framed messages.

use bytestream::{crc32, zigzag_decode};
use wire::{
    decode_header, MessageHeader, TypeTag, WireError, WireResult, CRC_SIZE, HEADER_SIZE,
    MAX_DEPTH,
};

/// Streaming decoder over a borrowed message buffer.
///
/// [`validate`](Self::validate) seats the header, verifies the CRC32 trailer
/// when present, and positions the read cursor at the first payload byte.
/// Typed reads then consume tag-prefixed values in order; string, bytes, and
/// raw reads return slices aliasing the input buffer (zero-copy), valid for
/// as long as the buffer itself.
///
/// The decoder is single-pass forward. Any error other than
/// [`WireError::NotFound`] leaves it in a defined but unusable state.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    payload_end: usize,
    header: Option<MessageHeader>,
    crc_verified: bool,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over a received message buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Truncated`] if `buf` cannot hold a header.
    pub fn new(buf: &'a [u8]) -> WireResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::Truncated {
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }
        Ok(Self {
            buf,
            pos: 0,
            payload_end: 0,
            header: None,
            crc_verified: false,
            depth: 0,
        })
    }

    /// Parses and validates the header, verifies the CRC, and establishes
    /// the payload window.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidMagic`], [`WireError::VersionMismatch`],
    /// [`WireError::Truncated`], or [`WireError::CrcMismatch`].
    pub fn validate(&mut self) -> WireResult<()> {
        let header = decode_header(self.buf)?;

        let payload_len = header.payload_len as usize;
        let mut expected = HEADER_SIZE + payload_len;
        if !header.flags.no_crc() {
            expected += CRC_SIZE;
        }
        if self.buf.len() < expected {
            return Err(WireError::Truncated {
                needed: expected,
                available: self.buf.len(),
            });
        }

        if !header.flags.no_crc() {
            let crc_offset = HEADER_SIZE + payload_len;
            let stored =
                u32::from_be_bytes(self.buf[crc_offset..crc_offset + 4].try_into().unwrap());
            let computed = crc32(&self.buf[..crc_offset]);
            if stored != computed {
                return Err(WireError::CrcMismatch { stored, computed });
            }
            self.crc_verified = true;
        }

        self.payload_end = HEADER_SIZE + payload_len;
        self.pos = HEADER_SIZE;
        self.header = Some(header);
        Ok(())
    }

    /// Returns the parsed header, if [`validate`](Self::validate) succeeded.
    #[must_use]
    pub fn header(&self) -> Option<&MessageHeader> {
        self.header.as_ref()
    }

    /// Returns the message type from the header, or 0 before validation.
    #[must_use]
    pub fn msg_type(&self) -> u16 {
        self.header.map_or(0, |h| h.msg_type)
    }

    /// Returns `true` if a CRC trailer was present and matched.
    #[must_use]
    pub fn crc_verified(&self) -> bool {
        self.crc_verified
    }

    /// Returns the number of unread payload bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.payload_end.saturating_sub(self.pos)
    }

    /// Returns `true` once the cursor has consumed the whole payload.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.header.is_none() || self.pos >= self.payload_end
    }

    /// Peeks at the next type tag without consuming it.
    ///
    /// Returns [`TypeTag::Invalid`] at the end of the payload or when the
    /// next byte is not a known tag.
    #[must_use]
    pub fn peek_type(&self) -> TypeTag {
        if self.pos >= self.payload_end {
            return TypeTag::Invalid;
        }
        TypeTag::parse(self.buf[self.pos]).unwrap_or(TypeTag::Invalid)
    }

    fn ensure(&self, needed: usize) -> WireResult<()> {
        if self.pos + needed > self.payload_end {
            return Err(WireError::Truncated {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn advance(&mut self, n: usize) -> WireResult<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    fn get_u8(&mut self) -> WireResult<u8> {
        self.ensure(1)?;
        let val = self.buf[self.pos];
        self.pos += 1;
        Ok(val)
    }

    fn get_u16(&mut self) -> WireResult<u16> {
        self.ensure(2)?;
        let val = u16::from_be_bytes(self.buf[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        Ok(val)
    }

    fn get_u32(&mut self) -> WireResult<u32> {
        self.ensure(4)?;
        let val = u32::from_be_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(val)
    }

    fn get_u64(&mut self) -> WireResult<u64> {
        self.ensure(8)?;
        let val = u64::from_be_bytes(self.buf[self.pos..self.pos + 8].try_into().unwrap());
        self.pos += 8;
        Ok(val)
    }

    fn expect_tag(&mut self, expected: TypeTag) -> WireResult<()> {
        let found = self.get_u8()?;
        if found != expected.raw() {
            return Err(WireError::TypeMismatch {
                expected: u16::from(expected.raw()),
                found: u16::from(found),
            });
        }
        Ok(())
    }

    /// Reads a null value.
    pub fn read_null(&mut self) -> WireResult<()> {
        self.expect_tag(TypeTag::Null)
    }

    /// Reads a boolean.
    pub fn read_bool(&mut self) -> WireResult<bool> {
        self.expect_tag(TypeTag::Bool)?;
        Ok(self.get_u8()? != 0)
    }

    /// Reads an unsigned 8-bit integer.
    pub fn read_u8(&mut self) -> WireResult<u8> {
        self.expect_tag(TypeTag::U8)?;
        self.get_u8()
    }

    /// Reads a signed 8-bit integer.
    pub fn read_i8(&mut self) -> WireResult<i8> {
        self.expect_tag(TypeTag::I8)?;
        Ok(self.get_u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer.
    pub fn read_u16(&mut self) -> WireResult<u16> {
        self.expect_tag(TypeTag::U16)?;
        self.get_u16()
    }

    /// Reads a signed 16-bit integer.
    pub fn read_i16(&mut self) -> WireResult<i16> {
        self.expect_tag(TypeTag::I16)?;
        Ok(self.get_u16()? as i16)
    }

    /// Reads an unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> WireResult<u32> {
        self.expect_tag(TypeTag::U32)?;
        self.get_u32()
    }

    /// Reads a signed 32-bit integer.
    pub fn read_i32(&mut self) -> WireResult<i32> {
        self.expect_tag(TypeTag::I32)?;
        Ok(self.get_u32()? as i32)
    }

    /// Reads an unsigned 64-bit integer.
    pub fn read_u64(&mut self) -> WireResult<u64> {
        self.expect_tag(TypeTag::U64)?;
        self.get_u64()
    }

    /// Reads a signed 64-bit integer.
    pub fn read_i64(&mut self) -> WireResult<i64> {
        self.expect_tag(TypeTag::I64)?;
        Ok(self.get_u64()? as i64)
    }

    /// Reads a 32-bit float from its raw IEEE 754 bit pattern.
    pub fn read_f32(&mut self) -> WireResult<f32> {
        self.expect_tag(TypeTag::F32)?;
        Ok(f32::from_bits(self.get_u32()?))
    }

    /// Reads a 64-bit float from its raw IEEE 754 bit pattern.
    pub fn read_f64(&mut self) -> WireResult<f64> {
        self.expect_tag(TypeTag::F64)?;
        Ok(f64::from_bits(self.get_u64()?))
    }

    fn get_varint(&mut self) -> WireResult<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return Err(WireError::Overflow {
                    required: bytestream::MAX_VARINT_LEN + 1,
                    available: bytestream::MAX_VARINT_LEN,
                });
            }
            let byte = self.get_u8()?;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Reads an unsigned LEB128 varint.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Overflow`] if the encoding continues past 10
    /// bytes.
    pub fn read_varint(&mut self) -> WireResult<u64> {
        self.expect_tag(TypeTag::Varint)?;
        self.get_varint()
    }

    /// Reads a ZigZag-remapped signed varint.
    pub fn read_varsint(&mut self) -> WireResult<i64> {
        Ok(zigzag_decode(self.read_varint()?))
    }

    /// Reads a string without copying; the result aliases the input buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Malformed`] if the payload is not valid UTF-8.
    pub fn read_str(&mut self) -> WireResult<&'a str> {
        self.expect_tag(TypeTag::String)?;
        let len = self.get_u32()? as usize;
        self.ensure(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        std::str::from_utf8(bytes).map_err(|_| WireError::Malformed)
    }

    /// Reads a string into a caller-provided buffer, returning its length.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Overflow`] if `out` is too small for the string,
    /// reporting the required length.
    pub fn read_str_into(&mut self, out: &mut [u8]) -> WireResult<usize> {
        let val = self.read_str()?;
        if val.len() > out.len() {
            return Err(WireError::Overflow {
                required: val.len(),
                available: out.len(),
            });
        }
        out[..val.len()].copy_from_slice(val.as_bytes());
        Ok(val.len())
    }

    /// Reads a byte array without copying; the result aliases the input
    /// buffer.
    pub fn read_bytes(&mut self) -> WireResult<&'a [u8]> {
        self.expect_tag(TypeTag::Bytes)?;
        let len = self.get_u32()? as usize;
        self.ensure(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a byte array into a caller-provided buffer, returning its
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Overflow`] if `out` is too small, reporting the
    /// required length.
    pub fn read_bytes_into(&mut self, out: &mut [u8]) -> WireResult<usize> {
        let val = self.read_bytes()?;
        if val.len() > out.len() {
            return Err(WireError::Overflow {
                required: val.len(),
                available: out.len(),
            });
        }
        out[..val.len()].copy_from_slice(val);
        Ok(val.len())
    }

    /// Reads a 16-byte UUID verbatim.
    pub fn read_uuid(&mut self) -> WireResult<[u8; 16]> {
        self.expect_tag(TypeTag::Uuid)?;
        self.ensure(16)?;
        let uuid = self.buf[self.pos..self.pos + 16].try_into().unwrap();
        self.pos += 16;
        Ok(uuid)
    }

    /// Reads a timestamp in microseconds since the Unix epoch.
    pub fn read_timestamp(&mut self) -> WireResult<u64> {
        self.expect_tag(TypeTag::Timestamp)?;
        self.get_u64()
    }

    /// Reads a duration in nanoseconds.
    pub fn read_duration(&mut self) -> WireResult<u64> {
        self.expect_tag(TypeTag::Duration)?;
        self.get_u64()
    }

    /// Reads `len` raw bytes without copying (no tag or length prefix).
    pub fn read_raw(&mut self, len: usize) -> WireResult<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads raw bytes into `out` (no tag or length prefix).
    pub fn read_raw_into(&mut self, out: &mut [u8]) -> WireResult<()> {
        let bytes = self.read_raw(out.len())?;
        out.copy_from_slice(bytes);
        Ok(())
    }

    fn enter_container(&mut self) -> WireResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave_container(&mut self) -> WireResult<()> {
        if self.depth == 0 {
            return Err(WireError::Malformed);
        }
        self.depth -= 1;
        Ok(())
    }

    /// Reads an array header, returning the element tag and count.
    ///
    /// The count is trusted as declared by the producer; elements are read
    /// with the normal typed operations.
    pub fn read_array_begin(&mut self) -> WireResult<(TypeTag, usize)> {
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.expect_tag(TypeTag::Array)?;
        let elem = TypeTag::parse(self.get_u8()?)?;
        let count = self.get_u32()? as usize;
        self.depth += 1;
        Ok((elem, count))
    }

    /// Closes the innermost array.
    pub fn read_array_end(&mut self) -> WireResult<()> {
        self.leave_container()
    }

    /// Reads a map header, returning key tag, value tag, and entry count.
    pub fn read_map_begin(&mut self) -> WireResult<(TypeTag, TypeTag, usize)> {
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.expect_tag(TypeTag::Map)?;
        let key = TypeTag::parse(self.get_u8()?)?;
        let val = TypeTag::parse(self.get_u8()?)?;
        let count = self.get_u32()? as usize;
        self.depth += 1;
        Ok((key, val, count))
    }

    /// Closes the innermost map.
    pub fn read_map_end(&mut self) -> WireResult<()> {
        self.leave_container()
    }

    /// Reads a struct header, returning its type id.
    pub fn read_struct_begin(&mut self) -> WireResult<u16> {
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.expect_tag(TypeTag::Struct)?;
        let type_id = self.get_u16()?;
        self.depth += 1;
        Ok(type_id)
    }

    /// Reads the next struct field header.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::NotFound`] at the `(0, null)` sentinel. This is
    /// the expected end-of-struct signal, not a failure.
    pub fn read_field(&mut self) -> WireResult<(u16, TypeTag)> {
        let field_id = self.get_u16()?;
        let tag_byte = self.get_u8()?;
        if field_id == 0 && tag_byte == TypeTag::Null.raw() {
            return Err(WireError::NotFound);
        }
        Ok((field_id, TypeTag::parse(tag_byte)?))
    }

    /// Closes the innermost struct.
    pub fn read_struct_end(&mut self) -> WireResult<()> {
        self.leave_container()
    }

    /// Skips exactly one well-formed value of any type, recursing into
    /// containers.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidType`] on unknown or reserved tags and
    /// [`WireError::DepthExceeded`] if nested containers exceed
    /// [`MAX_DEPTH`].
    pub fn skip(&mut self) -> WireResult<()> {
        let tag = TypeTag::parse(self.get_u8()?)?;
        match tag {
            TypeTag::Null => Ok(()),
            TypeTag::Bool
            | TypeTag::U8
            | TypeTag::I8
            | TypeTag::U16
            | TypeTag::I16
            | TypeTag::U32
            | TypeTag::I32
            | TypeTag::U64
            | TypeTag::I64
            | TypeTag::F32
            | TypeTag::F64
            | TypeTag::Uuid
            | TypeTag::Timestamp
            | TypeTag::Duration => self.advance(tag.fixed_size()),
            TypeTag::Varint => {
                while self.get_u8()? & 0x80 != 0 {}
                Ok(())
            }
            TypeTag::String | TypeTag::Bytes => {
                let len = self.get_u32()? as usize;
                self.advance(len)
            }
            TypeTag::Array => {
                let _elem = self.get_u8()?;
                let count = self.get_u32()?;
                self.enter_container()?;
                for _ in 0..count {
                    self.skip()?;
                }
                self.leave_container()
            }
            TypeTag::Map => {
                self.advance(2)?; // key and value tags
                let count = self.get_u32()?;
                self.enter_container()?;
                for _ in 0..count.saturating_mul(2) {
                    self.skip()?;
                }
                self.leave_container()
            }
            TypeTag::Struct => {
                self.advance(2)?; // type id
                self.enter_container()?;
                loop {
                    match self.read_field() {
                        Ok(_) => self.skip()?,
                        Err(WireError::NotFound) => break,
                        Err(err) => return Err(err),
                    }
                }
                self.leave_container()
            }
            TypeTag::Tuple
            | TypeTag::Optional
            | TypeTag::Enum
            | TypeTag::Extension
            | TypeTag::Invalid => Err(WireError::InvalidType { tag: tag.raw() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Encoder;
    use wire::MessageFlags;

    fn encode_with(f: impl FnOnce(&mut Encoder<'static>)) -> Vec<u8> {
        let mut enc = Encoder::new(1, MessageFlags::none());
        f(&mut enc);
        enc.finish().unwrap().to_vec()
    }

    fn validated(buf: &[u8]) -> Decoder<'_> {
        let mut dec = Decoder::new(buf).unwrap();
        dec.validate().unwrap();
        dec
    }

    #[test]
    fn new_rejects_short_buffer() {
        let err = Decoder::new(&[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                needed: HEADER_SIZE,
                available: 16
            }
        );
    }

    #[test]
    fn reads_fail_before_validate() {
        let message = encode_with(|enc| enc.write_u8(1).unwrap());
        let mut dec = Decoder::new(&message).unwrap();
        assert!(matches!(dec.read_u8(), Err(WireError::Truncated { .. })));
        assert_eq!(dec.msg_type(), 0);
        assert!(dec.header().is_none());
        assert!(dec.at_end());
    }

    #[test]
    fn validate_seats_payload_window() {
        let message = encode_with(|enc| enc.write_u32(42).unwrap());
        let dec = validated(&message);
        assert_eq!(dec.msg_type(), 1);
        assert_eq!(dec.remaining(), 5);
        assert!(!dec.at_end());
        assert!(dec.crc_verified());
    }

    #[test]
    fn validate_without_crc() {
        let mut enc = Encoder::new(1, MessageFlags::from_raw(MessageFlags::NO_CRC));
        enc.write_u8(9).unwrap();
        let message = enc.finish().unwrap().to_vec();

        let mut dec = Decoder::new(&message).unwrap();
        dec.validate().unwrap();
        assert!(!dec.crc_verified());
        assert_eq!(dec.read_u8().unwrap(), 9);
    }

    #[test]
    fn validate_rejects_corrupt_crc() {
        let mut message = encode_with(|enc| enc.write_u32(42).unwrap());
        let last = message.len() - 1;
        message[last] ^= 0xFF;
        let mut dec = Decoder::new(&message).unwrap();
        assert!(matches!(dec.validate(), Err(WireError::CrcMismatch { .. })));
    }

    #[test]
    fn validate_rejects_truncated_frame() {
        let message = encode_with(|enc| enc.write_u32(42).unwrap());
        let mut dec = Decoder::new(&message[..message.len() - 1]).unwrap();
        assert!(matches!(dec.validate(), Err(WireError::Truncated { .. })));
    }

    #[test]
    fn typed_read_enforces_tag() {
        let message = encode_with(|enc| enc.write_u16(7).unwrap());
        let mut dec = validated(&message);
        let err = dec.read_u32().unwrap_err();
        assert_eq!(
            err,
            WireError::TypeMismatch {
                expected: 0x06,
                found: 0x04
            }
        );
    }

    #[test]
    fn sequence_roundtrips_through_header() {
        let mut enc = Encoder::new(3, MessageFlags::none());
        enc.set_sequence(0xCAFE);
        enc.write_null().unwrap();
        let message = enc.finish().unwrap().to_vec();

        let dec = validated(&message);
        assert_eq!(dec.header().unwrap().sequence, 0xCAFE);
        assert_eq!(dec.header().unwrap().msg_type, 3);
    }

    #[test]
    fn zero_copy_string_aliases_input() {
        let message = encode_with(|enc| enc.write_str("hello").unwrap());
        let mut dec = validated(&message);
        let val = dec.read_str().unwrap();
        assert_eq!(val, "hello");
        let range = message.as_ptr_range();
        assert!(range.contains(&val.as_ptr()));
        assert!(dec.at_end());
    }

    #[test]
    fn empty_string_reads_back_empty() {
        let message = encode_with(|enc| enc.write_str("").unwrap());
        let mut dec = validated(&message);
        assert_eq!(dec.read_str().unwrap(), "");
        assert!(dec.at_end());
    }

    #[test]
    fn invalid_utf8_string_is_malformed() {
        let message = encode_with(|enc| {
            enc.write_raw(&[0x11, 0, 0, 0, 2, 0xFF, 0xFE]).unwrap();
        });
        let mut dec = validated(&message);
        assert_eq!(dec.read_str().unwrap_err(), WireError::Malformed);
    }

    #[test]
    fn string_length_cannot_escape_payload() {
        // Length prefix claims more bytes than the payload holds.
        let message = encode_with(|enc| {
            enc.write_raw(&[0x11, 0, 0, 0, 50, b'x']).unwrap();
        });
        let mut dec = validated(&message);
        assert!(matches!(dec.read_str(), Err(WireError::Truncated { .. })));
    }

    #[test]
    fn copy_variants_report_required_length() {
        let message = encode_with(|enc| enc.write_str("copy me out").unwrap());
        let mut dec = validated(&message);
        let mut small = [0u8; 4];
        let err = dec.read_str_into(&mut small).unwrap_err();
        assert_eq!(
            err,
            WireError::Overflow {
                required: 11,
                available: 4
            }
        );
    }

    #[test]
    fn copy_variant_happy_path() {
        let message = encode_with(|enc| enc.write_bytes(&[1, 2, 3]).unwrap());
        let mut dec = validated(&message);
        let mut out = [0u8; 8];
        let len = dec.read_bytes_into(&mut out).unwrap();
        assert_eq!(&out[..len], &[1, 2, 3]);
    }

    #[test]
    fn varint_roundtrip_values() {
        let message = encode_with(|enc| {
            enc.write_varint(127).unwrap();
            enc.write_varint(300).unwrap();
            enc.write_varint(0xFFFF_FFFF).unwrap();
            enc.write_varsint(-1234).unwrap();
        });
        let mut dec = validated(&message);
        assert_eq!(dec.read_varint().unwrap(), 127);
        assert_eq!(dec.read_varint().unwrap(), 300);
        assert_eq!(dec.read_varint().unwrap(), 0xFFFF_FFFF);
        assert_eq!(dec.read_varsint().unwrap(), -1234);
        assert!(dec.at_end());
    }

    #[test]
    fn varint_overflow_detected() {
        let message = encode_with(|enc| {
            enc.write_raw(&[0x10]).unwrap();
            enc.write_raw(&[0xFF; 11]).unwrap();
        });
        let mut dec = validated(&message);
        assert!(matches!(dec.read_varint(), Err(WireError::Overflow { .. })));
    }

    #[test]
    fn peek_type_reports_next_tag() {
        let message = encode_with(|enc| {
            enc.write_bool(true).unwrap();
            enc.write_str("s").unwrap();
        });
        let mut dec = validated(&message);
        assert_eq!(dec.peek_type(), TypeTag::Bool);
        dec.read_bool().unwrap();
        assert_eq!(dec.peek_type(), TypeTag::String);
        dec.read_str().unwrap();
        assert_eq!(dec.peek_type(), TypeTag::Invalid);
    }

    #[test]
    fn raw_reads() {
        let message = encode_with(|enc| enc.write_raw(&[9, 8, 7, 6]).unwrap());
        let mut dec = validated(&message);
        assert_eq!(dec.read_raw(2).unwrap(), &[9, 8]);
        let mut out = [0u8; 2];
        dec.read_raw_into(&mut out).unwrap();
        assert_eq!(out, [7, 6]);
        assert!(dec.at_end());
    }

    #[test]
    fn array_roundtrip() {
        let message = encode_with(|enc| {
            enc.array_begin(TypeTag::U32, 3).unwrap();
            for val in [100u32, 200, 300] {
                enc.write_u32(val).unwrap();
            }
            enc.array_end().unwrap();
        });
        let mut dec = validated(&message);
        let (elem, count) = dec.read_array_begin().unwrap();
        assert_eq!(elem, TypeTag::U32);
        assert_eq!(count, 3);
        assert_eq!(dec.read_u32().unwrap(), 100);
        assert_eq!(dec.read_u32().unwrap(), 200);
        assert_eq!(dec.read_u32().unwrap(), 300);
        dec.read_array_end().unwrap();
        assert!(dec.at_end());
    }

    #[test]
    fn container_end_without_begin_is_malformed() {
        let message = encode_with(|enc| enc.write_null().unwrap());
        let mut dec = validated(&message);
        assert_eq!(dec.read_array_end().unwrap_err(), WireError::Malformed);
    }

    #[test]
    fn struct_field_iteration_ends_with_not_found() {
        let message = encode_with(|enc| {
            enc.struct_begin(0x0100).unwrap();
            enc.write_field(1, TypeTag::U8).unwrap();
            enc.write_u8(42).unwrap();
            enc.struct_end().unwrap();
        });
        let mut dec = validated(&message);
        assert_eq!(dec.read_struct_begin().unwrap(), 0x0100);
        assert_eq!(dec.read_field().unwrap(), (1, TypeTag::U8));
        assert_eq!(dec.read_u8().unwrap(), 42);
        assert_eq!(dec.read_field().unwrap_err(), WireError::NotFound);
        dec.read_struct_end().unwrap();
        assert!(dec.at_end());
    }

    #[test]
    fn skip_crosses_every_value_shape() {
        let message = encode_with(|enc| {
            enc.write_null().unwrap();
            enc.write_bool(true).unwrap();
            enc.write_i64(-5).unwrap();
            enc.write_varint(1 << 40).unwrap();
            enc.write_str("skipped").unwrap();
            enc.write_bytes(&[1, 2, 3]).unwrap();
            enc.write_uuid(&[0xAA; 16]).unwrap();
            enc.write_timestamp(123).unwrap();
            enc.write_duration(456).unwrap();
            enc.array_begin(TypeTag::U8, 2).unwrap();
            enc.write_u8(1).unwrap();
            enc.write_u8(2).unwrap();
            enc.array_end().unwrap();
            enc.map_begin(TypeTag::String, TypeTag::I32, 1).unwrap();
            enc.write_str("k").unwrap();
            enc.write_i32(-1).unwrap();
            enc.map_end().unwrap();
            enc.struct_begin(9).unwrap();
            enc.write_field(1, TypeTag::Bool).unwrap();
            enc.write_bool(false).unwrap();
            enc.struct_end().unwrap();
            enc.write_u8(0xEE).unwrap();
        });
        let mut dec = validated(&message);
        for _ in 0..12 {
            dec.skip().unwrap();
        }
        // Everything before the final marker was skipped as one value each.
        assert_eq!(dec.read_u8().unwrap(), 0xEE);
        assert!(dec.at_end());
    }

    #[test]
    fn skip_rejects_reserved_tags() {
        for reserved in [0x23u8, 0x32, 0x33, 0xFE] {
            let message = encode_with(|enc| enc.write_raw(&[reserved]).unwrap());
            let mut dec = validated(&message);
            assert_eq!(
                dec.skip().unwrap_err(),
                WireError::InvalidType { tag: reserved }
            );
        }
    }

    #[test]
    fn skip_rejects_unknown_tag() {
        let message = encode_with(|enc| enc.write_raw(&[0x7F]).unwrap());
        let mut dec = validated(&message);
        assert_eq!(dec.skip().unwrap_err(), WireError::InvalidType { tag: 0x7F });
    }

    #[test]
    fn skip_bounds_nested_depth() {
        // 33 nested single-element arrays: one deeper than allowed.
        let message = encode_with(|enc| {
            for _ in 0..MAX_DEPTH + 1 {
                enc.write_raw(&[0x20, 0x20, 0, 0, 0, 1]).unwrap();
            }
            enc.write_raw(&[0x20, 0x02, 0, 0, 0, 0]).unwrap();
        });
        let mut dec = validated(&message);
        assert_eq!(
            dec.skip().unwrap_err(),
            WireError::DepthExceeded { max: MAX_DEPTH }
        );
    }

    #[test]
    fn depth_limit_on_reads() {
        let message = encode_with(|enc| {
            for _ in 0..MAX_DEPTH {
                enc.array_begin(TypeTag::Array, 1).unwrap();
            }
            enc.write_raw(&[0x20, 0x02, 0, 0, 0, 0]).unwrap();
            for _ in 0..MAX_DEPTH {
                enc.array_end().unwrap();
            }
        });
        let mut dec = validated(&message);
        for _ in 0..MAX_DEPTH {
            dec.read_array_begin().unwrap();
        }
        let err = dec.read_array_begin().unwrap_err();
        assert_eq!(err, WireError::DepthExceeded { max: MAX_DEPTH });
    }

    #[test]
    fn uuid_roundtrip() {
        let uuid: [u8; 16] = [
            0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            0xAA, 0xAA,
        ];
        let message = encode_with(|enc| enc.write_uuid(&uuid).unwrap());
        let mut dec = validated(&message);
        assert_eq!(dec.read_uuid().unwrap(), uuid);
    }
}

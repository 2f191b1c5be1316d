//! Streaming encoder for framed messages.

use bytestream::{crc32, encode_varint, zigzag_encode, MAX_VARINT_LEN};
use wire::{
    encode_header, MessageFlags, MessageHeader, TypeTag, WireError, WireResult, CRC_SIZE,
    HEADER_SIZE, INITIAL_CAPACITY, MAX_ARRAY, MAX_DEPTH, MAX_MESSAGE, MAX_STRING,
};

/// Output storage: either an owned growable buffer or a caller-provided
/// fixed one.
#[derive(Debug)]
enum EncodeBuf<'a> {
    Owned(Vec<u8>),
    Borrowed { buf: &'a mut [u8], len: usize },
}

/// Streaming encoder producing one framed message.
///
/// The first [`HEADER_SIZE`] bytes are reserved at construction and filled in
/// by [`finish`](Self::finish), which also appends the CRC32 trailer unless
/// the `NO_CRC` flag is set. Typed writes emit a tag byte followed by the
/// big-endian payload; container writes track nesting depth.
///
/// An encoder is single-message: after `finish` every operation fails until
/// [`reset`](Self::reset).
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: EncodeBuf<'a>,
    msg_type: u16,
    flags: MessageFlags,
    sequence: u32,
    depth: usize,
    finished: bool,
}

impl Encoder<'static> {
    /// Creates an encoder with an owned buffer.
    ///
    /// The buffer starts at [`INITIAL_CAPACITY`] bytes and doubles as needed
    /// up to [`MAX_MESSAGE`].
    #[must_use]
    pub fn new(msg_type: u16, flags: MessageFlags) -> Self {
        let mut vec = Vec::with_capacity(INITIAL_CAPACITY);
        vec.resize(HEADER_SIZE, 0);
        Self {
            buf: EncodeBuf::Owned(vec),
            msg_type,
            flags,
            sequence: 0,
            depth: 0,
            finished: false,
        }
    }
}

impl<'a> Encoder<'a> {
    /// Creates an encoder over a caller-provided buffer.
    ///
    /// The buffer never grows; running out of space fails with
    /// [`WireError::BufferFull`].
    ///
    /// # Errors
    ///
    /// Returns [`WireError::BufferFull`] if the buffer cannot hold even a
    /// header and CRC trailer.
    pub fn with_buffer(
        buf: &'a mut [u8],
        msg_type: u16,
        flags: MessageFlags,
    ) -> WireResult<Self> {
        if buf.len() < HEADER_SIZE + CRC_SIZE {
            return Err(WireError::BufferFull {
                needed: HEADER_SIZE + CRC_SIZE,
                available: buf.len(),
            });
        }
        Ok(Self {
            buf: EncodeBuf::Borrowed {
                buf,
                len: HEADER_SIZE,
            },
            msg_type,
            flags,
            sequence: 0,
            depth: 0,
            finished: false,
        })
    }

    /// Rewinds the encoder for a new message, keeping the buffer.
    pub fn reset(&mut self, msg_type: u16, flags: MessageFlags) {
        match &mut self.buf {
            EncodeBuf::Owned(vec) => vec.truncate(HEADER_SIZE),
            EncodeBuf::Borrowed { len, .. } => *len = HEADER_SIZE,
        }
        self.msg_type = msg_type;
        self.flags = flags;
        self.sequence = 0;
        self.depth = 0;
        self.finished = false;
    }

    /// Sets the header sequence number.
    pub fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    /// Returns the number of payload bytes written so far.
    #[must_use]
    pub fn payload_size(&self) -> usize {
        self.position() - HEADER_SIZE
    }

    fn position(&self) -> usize {
        match &self.buf {
            EncodeBuf::Owned(vec) => vec.len(),
            EncodeBuf::Borrowed { len, .. } => *len,
        }
    }

    fn filled(&self) -> &[u8] {
        match &self.buf {
            EncodeBuf::Owned(vec) => vec,
            EncodeBuf::Borrowed { buf, len } => &buf[..*len],
        }
    }

    /// Makes room for `needed` more bytes.
    ///
    /// Owned buffers double their capacity until the write fits; borrowed
    /// buffers never grow.
    fn ensure_space(&mut self, needed: usize) -> WireResult<()> {
        match &mut self.buf {
            EncodeBuf::Owned(vec) => {
                let required = vec.len() + needed;
                if required <= vec.capacity() {
                    return Ok(());
                }
                let mut new_cap = vec.capacity() * 2;
                while new_cap < required {
                    new_cap *= 2;
                }
                if new_cap > MAX_MESSAGE {
                    return Err(WireError::TooLarge {
                        size: required,
                        max: MAX_MESSAGE,
                    });
                }
                vec.try_reserve_exact(new_cap - vec.len())
                    .map_err(|_| WireError::AllocFail)
            }
            EncodeBuf::Borrowed { buf, len } => {
                if *len + needed > buf.len() {
                    return Err(WireError::BufferFull {
                        needed,
                        available: buf.len() - *len,
                    });
                }
                Ok(())
            }
        }
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> WireResult<()> {
        if self.finished {
            return Err(WireError::InvalidArg);
        }
        self.ensure_space(bytes.len())?;
        match &mut self.buf {
            EncodeBuf::Owned(vec) => vec.extend_from_slice(bytes),
            EncodeBuf::Borrowed { buf, len } => {
                buf[*len..*len + bytes.len()].copy_from_slice(bytes);
                *len += bytes.len();
            }
        }
        Ok(())
    }

    fn put_u8(&mut self, val: u8) -> WireResult<()> {
        self.put_bytes(&[val])
    }

    fn put_u16(&mut self, val: u16) -> WireResult<()> {
        self.put_bytes(&val.to_be_bytes())
    }

    fn put_u32(&mut self, val: u32) -> WireResult<()> {
        self.put_bytes(&val.to_be_bytes())
    }

    fn put_u64(&mut self, val: u64) -> WireResult<()> {
        self.put_bytes(&val.to_be_bytes())
    }

    fn put_tag(&mut self, tag: TypeTag) -> WireResult<()> {
        self.put_u8(tag.raw())
    }

    /// Writes a null value.
    pub fn write_null(&mut self) -> WireResult<()> {
        self.put_tag(TypeTag::Null)
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, val: bool) -> WireResult<()> {
        self.put_tag(TypeTag::Bool)?;
        self.put_u8(u8::from(val))
    }

    /// Writes an unsigned 8-bit integer.
    pub fn write_u8(&mut self, val: u8) -> WireResult<()> {
        self.put_tag(TypeTag::U8)?;
        self.put_u8(val)
    }

    /// Writes a signed 8-bit integer.
    pub fn write_i8(&mut self, val: i8) -> WireResult<()> {
        self.put_tag(TypeTag::I8)?;
        self.put_u8(val as u8)
    }

    /// Writes an unsigned 16-bit integer.
    pub fn write_u16(&mut self, val: u16) -> WireResult<()> {
        self.put_tag(TypeTag::U16)?;
        self.put_u16(val)
    }

    /// Writes a signed 16-bit integer.
    pub fn write_i16(&mut self, val: i16) -> WireResult<()> {
        self.put_tag(TypeTag::I16)?;
        self.put_u16(val as u16)
    }

    /// Writes an unsigned 32-bit integer.
    pub fn write_u32(&mut self, val: u32) -> WireResult<()> {
        self.put_tag(TypeTag::U32)?;
        self.put_u32(val)
    }

    /// Writes a signed 32-bit integer.
    pub fn write_i32(&mut self, val: i32) -> WireResult<()> {
        self.put_tag(TypeTag::I32)?;
        self.put_u32(val as u32)
    }

    /// Writes an unsigned 64-bit integer.
    pub fn write_u64(&mut self, val: u64) -> WireResult<()> {
        self.put_tag(TypeTag::U64)?;
        self.put_u64(val)
    }

    /// Writes a signed 64-bit integer.
    pub fn write_i64(&mut self, val: i64) -> WireResult<()> {
        self.put_tag(TypeTag::I64)?;
        self.put_u64(val as u64)
    }

    /// Writes a 32-bit float as its raw IEEE 754 bit pattern.
    pub fn write_f32(&mut self, val: f32) -> WireResult<()> {
        self.put_tag(TypeTag::F32)?;
        self.put_u32(val.to_bits())
    }

    /// Writes a 64-bit float as its raw IEEE 754 bit pattern.
    pub fn write_f64(&mut self, val: f64) -> WireResult<()> {
        self.put_tag(TypeTag::F64)?;
        self.put_u64(val.to_bits())
    }

    /// Writes an unsigned LEB128 varint.
    pub fn write_varint(&mut self, val: u64) -> WireResult<()> {
        self.put_tag(TypeTag::Varint)?;
        let mut tmp = [0u8; MAX_VARINT_LEN];
        let len = encode_varint(val, &mut tmp);
        self.put_bytes(&tmp[..len])
    }

    /// Writes a signed integer as a ZigZag-remapped varint.
    pub fn write_varsint(&mut self, val: i64) -> WireResult<()> {
        self.write_varint(zigzag_encode(val))
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TooLarge`] past [`MAX_STRING`] bytes.
    pub fn write_str(&mut self, val: &str) -> WireResult<()> {
        if val.len() > MAX_STRING {
            return Err(WireError::TooLarge {
                size: val.len(),
                max: MAX_STRING,
            });
        }
        self.put_tag(TypeTag::String)?;
        self.put_u32(val.len() as u32)?;
        self.put_bytes(val.as_bytes())
    }

    /// Writes a length-prefixed byte array.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TooLarge`] past [`MAX_MESSAGE`] bytes.
    pub fn write_bytes(&mut self, val: &[u8]) -> WireResult<()> {
        if val.len() > MAX_MESSAGE {
            return Err(WireError::TooLarge {
                size: val.len(),
                max: MAX_MESSAGE,
            });
        }
        self.put_tag(TypeTag::Bytes)?;
        self.put_u32(val.len() as u32)?;
        self.put_bytes(val)
    }

    /// Writes a 16-byte UUID verbatim (no byte reordering).
    pub fn write_uuid(&mut self, uuid: &[u8; 16]) -> WireResult<()> {
        self.put_tag(TypeTag::Uuid)?;
        self.put_bytes(uuid)
    }

    /// Writes a timestamp in microseconds since the Unix epoch.
    pub fn write_timestamp(&mut self, micros: u64) -> WireResult<()> {
        self.put_tag(TypeTag::Timestamp)?;
        self.put_u64(micros)
    }

    /// Writes a duration in nanoseconds.
    pub fn write_duration(&mut self, nanos: u64) -> WireResult<()> {
        self.put_tag(TypeTag::Duration)?;
        self.put_u64(nanos)
    }

    fn leave_container(&mut self) -> WireResult<()> {
        if self.depth == 0 {
            return Err(WireError::Malformed);
        }
        self.depth -= 1;
        Ok(())
    }

    /// Begins a homogeneous array of `count` elements.
    ///
    /// The count is declarative: the encoder does not verify that exactly
    /// `count` elements follow.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TooLarge`] past [`MAX_ARRAY`] elements and
    /// [`WireError::DepthExceeded`] past [`MAX_DEPTH`] nesting.
    pub fn array_begin(&mut self, elem: TypeTag, count: usize) -> WireResult<()> {
        if count > MAX_ARRAY {
            return Err(WireError::TooLarge {
                size: count,
                max: MAX_ARRAY,
            });
        }
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.put_tag(TypeTag::Array)?;
        self.put_u8(elem.raw())?;
        self.put_u32(count as u32)?;
        self.depth += 1;
        Ok(())
    }

    /// Closes the innermost array.
    pub fn array_end(&mut self) -> WireResult<()> {
        self.leave_container()
    }

    /// Begins a map of `count` key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TooLarge`] past [`MAX_ARRAY`] entries and
    /// [`WireError::DepthExceeded`] past [`MAX_DEPTH`] nesting.
    pub fn map_begin(&mut self, key: TypeTag, val: TypeTag, count: usize) -> WireResult<()> {
        if count > MAX_ARRAY {
            return Err(WireError::TooLarge {
                size: count,
                max: MAX_ARRAY,
            });
        }
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.put_tag(TypeTag::Map)?;
        self.put_u8(key.raw())?;
        self.put_u8(val.raw())?;
        self.put_u32(count as u32)?;
        self.depth += 1;
        Ok(())
    }

    /// Closes the innermost map.
    pub fn map_end(&mut self) -> WireResult<()> {
        self.leave_container()
    }

    /// Begins a struct with the given type id.
    pub fn struct_begin(&mut self, type_id: u16) -> WireResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(WireError::DepthExceeded { max: MAX_DEPTH });
        }
        self.put_tag(TypeTag::Struct)?;
        self.put_u16(type_id)?;
        self.depth += 1;
        Ok(())
    }

    /// Writes a struct field header; the field's value follows as a normal
    /// tagged write.
    pub fn write_field(&mut self, field_id: u16, tag: TypeTag) -> WireResult<()> {
        self.put_u16(field_id)?;
        self.put_u8(tag.raw())
    }

    /// Closes the innermost struct with the `(0, null)` sentinel field.
    pub fn struct_end(&mut self) -> WireResult<()> {
        if self.depth == 0 {
            return Err(WireError::Malformed);
        }
        self.put_u16(0)?;
        self.put_u8(TypeTag::Null.raw())?;
        self.depth -= 1;
        Ok(())
    }

    /// Appends bytes with no tag or length prefix.
    pub fn write_raw(&mut self, data: &[u8]) -> WireResult<()> {
        self.put_bytes(data)
    }

    /// Reserves `len` bytes and returns them for direct population.
    ///
    /// The returned slice is zero-filled. Used for composing hand-coded
    /// sub-grammars.
    pub fn reserve(&mut self, len: usize) -> WireResult<&mut [u8]> {
        if self.finished {
            return Err(WireError::InvalidArg);
        }
        self.ensure_space(len)?;
        match &mut self.buf {
            EncodeBuf::Owned(vec) => {
                let start = vec.len();
                vec.resize(start + len, 0);
                Ok(&mut vec[start..])
            }
            EncodeBuf::Borrowed { buf, len: pos } => {
                let start = *pos;
                *pos += len;
                let slice = &mut buf[start..start + len];
                slice.fill(0);
                Ok(slice)
            }
        }
    }

    /// Finalizes the message: emplaces the header, appends the CRC32 trailer
    /// unless `NO_CRC` is set, and returns the complete framed bytes.
    ///
    /// May be called at most once per message; call
    /// [`reset`](Self::reset) to start another.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidArg`] on a second call, and buffer errors
    /// if the CRC trailer does not fit.
    pub fn finish(&mut self) -> WireResult<&[u8]> {
        if self.finished {
            return Err(WireError::InvalidArg);
        }

        let payload_len = u32::try_from(self.payload_size()).map_err(|_| WireError::TooLarge {
            size: self.payload_size(),
            max: MAX_MESSAGE,
        })?;
        let header = MessageHeader::new(self.msg_type, self.flags, payload_len, self.sequence);
        match &mut self.buf {
            EncodeBuf::Owned(vec) => encode_header(&header, vec)?,
            EncodeBuf::Borrowed { buf, .. } => encode_header(&header, buf)?,
        };

        if !self.flags.no_crc() {
            let crc = crc32(self.filled());
            self.put_bytes(&crc.to_be_bytes())?;
        }

        self.finished = true;
        Ok(self.filled())
    }
}

//! Message header layout and constants.

use crate::error::{WireError, WireResult};

/// Magic number identifying DCFS messages ("DCFS" in ASCII).
///
/// This value is fixed and must never change across versions.
pub const MAGIC: u32 = 0x4443_4653;

/// Current wire format version: major in the high byte, minor in the low.
pub const VERSION: u16 = 0x0520;

/// Header size in bytes: magic(4) + version(2) + msg_type(2) + flags(1) +
/// payload_len(4) + sequence(4).
pub const HEADER_SIZE: usize = 17;

/// Size of the trailing CRC32 in bytes.
pub const CRC_SIZE: usize = 4;

/// Returns `true` if a wire version is compatible with this implementation.
///
/// Only the major (high) byte participates: `0x0520` and `0x0599` are
/// compatible, `0x0520` and `0x0620` are not.
#[must_use]
pub const fn version_compatible(version: u16) -> bool {
    version >> 8 == VERSION >> 8
}

/// Message flags carried in the header's flags byte.
///
/// The codec itself only interprets [`NO_CRC`](Self::NO_CRC); the remaining
/// bits are preserved byte-for-byte for the embedding framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageFlags(u8);

impl MessageFlags {
    /// Payload is compressed.
    pub const COMPRESSED: u8 = 0x01;

    /// Payload is encrypted.
    pub const ENCRYPTED: u8 = 0x02;

    /// Part of a streaming message.
    pub const STREAMING: u8 = 0x04;

    /// Final chunk of a streaming message.
    pub const FINAL: u8 = 0x08;

    /// High-priority message.
    pub const PRIORITY: u8 = 0x10;

    /// No CRC32 trailer follows the payload.
    pub const NO_CRC: u8 = 0x20;

    /// Extended header follows (reserved).
    pub const EXTENDED: u8 = 0x80;

    /// Creates an empty flag set.
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Creates flags from a raw byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw flag byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit in `bits` is set.
    #[must_use]
    pub const fn contains(self, bits: u8) -> bool {
        self.0 & bits == bits
    }

    /// Returns a copy with the given bits set.
    #[must_use]
    pub const fn with(self, bits: u8) -> Self {
        Self(self.0 | bits)
    }

    /// Returns `true` if the CRC32 trailer is suppressed.
    #[must_use]
    pub const fn no_crc(self) -> bool {
        self.contains(Self::NO_CRC)
    }
}

/// Parsed message header.
///
/// The magic number is validated separately during decoding and is not
/// stored here. All fields are in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Wire format version.
    pub version: u16,
    /// Application message type.
    pub msg_type: u16,
    /// Message flags.
    pub flags: MessageFlags,
    /// Payload length in bytes (excluding header and CRC).
    pub payload_len: u32,
    /// Message sequence number.
    pub sequence: u32,
}

impl MessageHeader {
    /// Creates a header at the current wire version.
    #[must_use]
    pub const fn new(msg_type: u16, flags: MessageFlags, payload_len: u32, sequence: u32) -> Self {
        Self {
            version: VERSION,
            msg_type,
            flags,
            payload_len,
            sequence,
        }
    }
}

/// Encodes a header into the first [`HEADER_SIZE`] bytes of `out`.
///
/// # Errors
///
/// Returns [`WireError::BufferFull`] if `out` is shorter than the header.
pub fn encode_header(header: &MessageHeader, out: &mut [u8]) -> WireResult<usize> {
    if out.len() < HEADER_SIZE {
        return Err(WireError::BufferFull {
            needed: HEADER_SIZE,
            available: out.len(),
        });
    }

    out[0..4].copy_from_slice(&MAGIC.to_be_bytes());
    out[4..6].copy_from_slice(&header.version.to_be_bytes());
    out[6..8].copy_from_slice(&header.msg_type.to_be_bytes());
    out[8] = header.flags.raw();
    out[9..13].copy_from_slice(&header.payload_len.to_be_bytes());
    out[13..17].copy_from_slice(&header.sequence.to_be_bytes());

    Ok(HEADER_SIZE)
}

/// Decodes and validates a header from the front of `buf`.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] below [`HEADER_SIZE`] bytes,
/// [`WireError::InvalidMagic`] on a foreign magic number, and
/// [`WireError::VersionMismatch`] on an incompatible major version.
pub fn decode_header(buf: &[u8]) -> WireResult<MessageHeader> {
    if buf.len() < HEADER_SIZE {
        return Err(WireError::Truncated {
            needed: HEADER_SIZE,
            available: buf.len(),
        });
    }

    let magic = u32::from_be_bytes(buf[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(WireError::InvalidMagic { found: magic });
    }

    let version = u16::from_be_bytes(buf[4..6].try_into().unwrap());
    if !version_compatible(version) {
        return Err(WireError::VersionMismatch {
            found: version,
            expected: VERSION,
        });
    }

    Ok(MessageHeader {
        version,
        msg_type: u16::from_be_bytes(buf[6..8].try_into().unwrap()),
        flags: MessageFlags::from_raw(buf[8]),
        payload_len: u32::from_be_bytes(buf[9..13].try_into().unwrap()),
        sequence: u32::from_be_bytes(buf[13..17].try_into().unwrap()),
    })
}

/// Computes the full framed length of a message from its header bytes.
///
/// Transports use this to frame a stream: read [`HEADER_SIZE`] bytes, call
/// this, then read the remainder. The magic number is deliberately not
/// checked here; [`decode_header`] and validation do that.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] if `buf` holds fewer than
/// [`HEADER_SIZE`] bytes.
pub fn message_length(buf: &[u8]) -> WireResult<usize> {
    if buf.len() < HEADER_SIZE {
        return Err(WireError::Truncated {
            needed: HEADER_SIZE,
            available: buf.len(),
        });
    }

    let flags = MessageFlags::from_raw(buf[8]);
    let payload_len = u32::from_be_bytes(buf[9..13].try_into().unwrap());

    let mut total = HEADER_SIZE + payload_len as usize;
    if !flags.no_crc() {
        total += CRC_SIZE;
    }
    Ok(total)
}

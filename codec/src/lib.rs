//! Streaming encoder/decoder for framed DCFS messages.
//!
//! This crate ties the wire layout and byte primitives together into the two
//! codec state machines: [`Encoder`] produces a framed message (header,
//! tag-prefixed typed payload, optional CRC32 trailer) and [`Decoder`]
//! consumes one with integrity checks and zero-copy access to
//! variable-length payload data.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded decoding** - Every read is checked against the payload window
//!   before it happens; malformed input returns errors, never panics.
//! - **Zero-copy reads** - String, bytes, and raw reads alias the caller's
//!   input buffer instead of copying.
//! - **Single-threaded instances** - Encoders and decoders are cheap,
//!   independent values; use one per message stream.
//!
//! # Example
//!
//! ```
//! use codec::{Decoder, Encoder};
//! use wire::MessageFlags;
//!
//! let mut encoder = Encoder::new(1, MessageFlags::none());
//! encoder.write_u32(0xDEAD_BEEF).unwrap();
//! encoder.write_str("hello").unwrap();
//! let message = encoder.finish().unwrap();
//!
//! let mut decoder = Decoder::new(message).unwrap();
//! decoder.validate().unwrap();
//! assert_eq!(decoder.read_u32().unwrap(), 0xDEAD_BEEF);
//! assert_eq!(decoder.read_str().unwrap(), "hello");
//! assert!(decoder.at_end());
//! ```

mod reader;
mod writer;

pub use reader::Decoder;
pub use writer::Encoder;

pub use wire::{
    MessageFlags, MessageHeader, TypeTag, WireError, WireResult, HEADER_SIZE, MAX_DEPTH,
    MAX_MESSAGE, MAX_STRING,
};

/// Validates a complete message buffer: header, length, and CRC.
///
/// Equivalent to constructing a [`Decoder`] and calling
/// [`validate`](Decoder::validate), without keeping the decoder.
///
/// # Errors
///
/// Propagates the first header or integrity error encountered.
pub fn validate_message(buf: &[u8]) -> WireResult<()> {
    let mut decoder = Decoder::new(buf)?;
    decoder.validate()
}

//! Wire format definitions for the DCFS codec.
//!
//! This crate owns everything both ends of the wire must agree on: the
//! 17-byte big-endian message header, the flag bits, the self-describing
//! type tag set, the fixed size limits, and the closed error taxonomy every
//! fallible codec operation returns.
//!
//! # Design Principles
//!
//! - **Stable wire format** - The layout is versioned; compatibility is
//!   decided by the major version byte alone.
//! - **No domain knowledge** - This crate describes bytes, not messages.
//! - **Closed error set** - All failures across the workspace are one of
//!   [`WireError`]'s variants, returned by value.
//!
//! See `WIRE_FORMAT.md` for the complete byte-level specification.

mod error;
mod header;
mod limits;
mod tags;

pub use error::{WireError, WireResult};
pub use header::{
    decode_header, encode_header, message_length, version_compatible, MessageFlags, MessageHeader,
    CRC_SIZE, HEADER_SIZE, MAGIC, VERSION,
};
pub use limits::{INITIAL_CAPACITY, MAX_ARRAY, MAX_DEPTH, MAX_MESSAGE, MAX_STRING};
pub use tags::TypeTag;

//! Low-level byte primitives for the DCFS codec.
//!
//! This crate provides the register-level building blocks the framed codec is
//! assembled from: host/network byte-order conversions, unsigned LEB128
//! varints with ZigZag signed remapping, and table-driven CRC32 with
//! incremental update.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **No domain knowledge** - This crate knows nothing about message
//!   framing, type tags, or schemas.
//! - **Pure functions** - Nothing here touches buffers it does not own or
//!   holds state between calls.
//!
//! # Example
//!
//! ```
//! use bytestream::{crc32, decode_varint, encode_varint, MAX_VARINT_LEN};
//!
//! let mut buf = [0u8; MAX_VARINT_LEN];
//! let len = encode_varint(300, &mut buf);
//! assert_eq!(decode_varint(&buf[..len]), Some((300, len)));
//!
//! assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
//! ```

mod crc;
mod order;
mod varint;

pub use crc::{crc32, crc32_update};
pub use order::{
    bswap16, bswap32, bswap64, hton16, hton32, hton64, is_little_endian, ntoh16, ntoh32, ntoh64,
};
pub use varint::{
    decode_varint, encode_varint, varint_len, zigzag_decode, zigzag_encode, MAX_VARINT_LEN,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctest_example() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_varint(300, &mut buf);
        assert_eq!(decode_varint(&buf[..len]), Some((300, len)));
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn signed_values_ride_on_unsigned_varints() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_varint(zigzag_encode(-1234), &mut buf);
        let (raw, consumed) = decode_varint(&buf[..len]).unwrap();
        assert_eq!(consumed, len);
        assert_eq!(zigzag_decode(raw), -1234);
    }

    #[test]
    fn network_order_roundtrip_through_bytes() {
        let bytes = hton32(0x1122_3344).to_ne_bytes();
        assert_eq!(bytes, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(ntoh32(u32::from_ne_bytes(bytes)), 0x1122_3344);
    }
}

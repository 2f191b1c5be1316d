#![no_main]

use bytestream::{decode_varint, encode_varint, MAX_VARINT_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some((value, consumed)) = decode_varint(data) {
        assert!(consumed <= data.len());
        assert!(consumed <= MAX_VARINT_LEN);

        // The canonical re-encoding must decode back to the same value.
        let mut buf = [0u8; MAX_VARINT_LEN];
        let len = encode_varint(value, &mut buf);
        assert!(len <= consumed);
        assert_eq!(decode_varint(&buf[..len]), Some((value, len)));
    }
});

#![no_main]

use codec::Decoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut decoder) = Decoder::new(data) else {
        return;
    };
    if decoder.validate().is_err() {
        return;
    }

    // Use input bytes to drive a bounded sequence of read operations; the
    // decoder must never panic or read outside the payload window.
    let mut idx = 0usize;
    while !decoder.at_end() && idx < 1024 {
        let op = data[idx % data.len()] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = decoder.skip();
            }
            1 => {
                let _ = decoder.read_u32();
            }
            2 => {
                let _ = decoder.read_str();
            }
            3 => {
                let _ = decoder.read_varint();
            }
            4 => {
                let _ = decoder.read_array_begin();
            }
            5 => {
                let _ = decoder.read_field();
            }
            6 => {
                let _ = decoder.read_bytes();
            }
            _ => {
                let _ = decoder.read_bool();
            }
        }
    }
});

//! Fixed wire limits enforced during encoding and decoding.

/// Maximum total framed message size in bytes (16 MiB).
pub const MAX_MESSAGE: usize = 16 * 1024 * 1024;

/// Maximum string payload length in bytes (64 KiB).
pub const MAX_STRING: usize = 64 * 1024;

/// Maximum number of array or map elements.
pub const MAX_ARRAY: usize = 1024 * 1024;

/// Maximum container nesting depth, summed across open arrays, maps, and
/// structs.
pub const MAX_DEPTH: usize = 32;

/// Initial capacity of an owning encoder's buffer.
pub const INITIAL_CAPACITY: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_ordered() {
        assert!(MAX_STRING < MAX_MESSAGE);
        assert!(INITIAL_CAPACITY < MAX_MESSAGE);
    }

    #[test]
    fn expected_values() {
        assert_eq!(MAX_MESSAGE, 16_777_216);
        assert_eq!(MAX_STRING, 65_536);
        assert_eq!(MAX_ARRAY, 1_048_576);
        assert_eq!(MAX_DEPTH, 32);
        assert_eq!(INITIAL_CAPACITY, 256);
    }
}

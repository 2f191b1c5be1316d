//! Error taxonomy shared by every fallible codec operation.

use std::fmt;

/// Result type for wire and codec operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised by the framed codec.
///
/// The set is closed: every fallible operation in the workspace returns one
/// of these by value. [`WireError::NotFound`] is the sole in-band signal (end
/// of struct during field iteration); everything else leaves the encoder or
/// decoder in a defined but unusable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Borrowed encoder buffer exhausted.
    BufferFull { needed: usize, available: usize },

    /// Owning encoder could not grow its buffer.
    AllocFail,

    /// Value exceeds a wire limit (message, string, or array bound).
    TooLarge { size: usize, max: usize },

    /// Container nesting would exceed the depth limit.
    DepthExceeded { max: usize },

    /// Header magic does not identify a DCFS message.
    InvalidMagic { found: u32 },

    /// Incompatible protocol major version.
    VersionMismatch { found: u16, expected: u16 },

    /// Fewer bytes available than the operation requires.
    Truncated { needed: usize, available: usize },

    /// Stored CRC32 does not match the computed checksum.
    CrcMismatch { stored: u32, computed: u32 },

    /// Unknown or reserved type tag in the value stream.
    InvalidType { tag: u8 },

    /// Varint shifted past 63 bits, or a copy destination was too small.
    Overflow { required: usize, available: usize },

    /// Container end without matching begin, or a broken sentinel.
    Malformed,

    /// Caller violated an API contract.
    InvalidArg,

    /// Unreachable state reached.
    Internal,

    /// End-of-struct sentinel observed during field iteration.
    NotFound,

    /// Typed read saw a different tag (or struct type id) than expected.
    TypeMismatch { expected: u16, found: u16 },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferFull { needed, available } => {
                write!(f, "buffer full: need {needed} bytes, have {available}")
            }
            Self::AllocFail => write!(f, "allocation failed"),
            Self::TooLarge { size, max } => {
                write!(f, "data too large: {size} bytes, limit {max}")
            }
            Self::DepthExceeded { max } => {
                write!(f, "max nesting depth {max} exceeded")
            }
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic number: 0x{found:08X}")
            }
            Self::VersionMismatch { found, expected } => {
                write!(
                    f,
                    "protocol version mismatch: 0x{found:04X}, expected major of 0x{expected:04X}"
                )
            }
            Self::Truncated { needed, available } => {
                write!(f, "truncated message: need {needed} bytes, have {available}")
            }
            Self::CrcMismatch { stored, computed } => {
                write!(
                    f,
                    "CRC mismatch: stored 0x{stored:08X}, computed 0x{computed:08X}"
                )
            }
            Self::InvalidType { tag } => {
                write!(f, "invalid type tag: 0x{tag:02X}")
            }
            Self::Overflow { required, available } => {
                write!(
                    f,
                    "value overflow: required {required}, available {available}"
                )
            }
            Self::Malformed => write!(f, "malformed data"),
            Self::InvalidArg => write!(f, "invalid argument"),
            Self::Internal => write!(f, "internal error"),
            Self::NotFound => write!(f, "not found"),
            Self::TypeMismatch { expected, found } => {
                write!(
                    f,
                    "type mismatch: expected 0x{expected:02X}, found 0x{found:02X}"
                )
            }
        }
    }
}

impl std::error::Error for WireError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_magic() {
        let err = WireError::InvalidMagic { found: 0xDEAD_BEEF };
        assert!(err.to_string().contains("DEADBEEF"));
    }

    #[test]
    fn display_truncated() {
        let err = WireError::Truncated {
            needed: 21,
            available: 17,
        };
        let msg = err.to_string();
        assert!(msg.contains("21"), "should mention needed bytes");
        assert!(msg.contains("17"), "should mention available bytes");
    }

    #[test]
    fn display_crc_mismatch() {
        let err = WireError::CrcMismatch {
            stored: 0x1234_5678,
            computed: 0x8765_4321,
        };
        let msg = err.to_string();
        assert!(msg.contains("12345678"));
        assert!(msg.contains("87654321"));
    }

    #[test]
    fn display_too_large() {
        let err = WireError::TooLarge {
            size: 70_000,
            max: 65_536,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65536"));
    }

    #[test]
    fn display_type_mismatch() {
        let err = WireError::TypeMismatch {
            expected: 0x04,
            found: 0x11,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x04"));
        assert!(msg.contains("0x11"));
    }

    #[test]
    fn display_version_mismatch() {
        let err = WireError::VersionMismatch {
            found: 0x0620,
            expected: 0x0520,
        };
        let msg = err.to_string();
        assert!(msg.contains("0620"));
        assert!(msg.contains("0520"));
    }

    #[test]
    fn error_equality() {
        let a = WireError::Overflow {
            required: 8,
            available: 4,
        };
        let b = WireError::Overflow {
            required: 8,
            available: 4,
        };
        assert_eq!(a, b);
        assert_ne!(a, WireError::Malformed);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<WireError>();
    }
}

//! Self-describing type tags.

use std::fmt;

use crate::error::{WireError, WireResult};

/// One-byte discriminator preceding every typed value on the wire.
///
/// `Tuple`, `Optional`, `Enum`, and `Extension` are reserved: their payload
/// grammar is not yet fixed, so encoders emit nothing for them and decoders
/// reject them. `Invalid` never appears on the wire; it is the sentinel
/// returned when peeking past the end of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Null = 0x00,
    Bool = 0x01,
    U8 = 0x02,
    I8 = 0x03,
    U16 = 0x04,
    I16 = 0x05,
    U32 = 0x06,
    I32 = 0x07,
    U64 = 0x08,
    I64 = 0x09,
    F32 = 0x0A,
    F64 = 0x0B,
    Varint = 0x10,
    String = 0x11,
    Bytes = 0x12,
    Uuid = 0x13,
    Array = 0x20,
    Map = 0x21,
    Struct = 0x22,
    Tuple = 0x23,
    Timestamp = 0x30,
    Duration = 0x31,
    Optional = 0x32,
    Enum = 0x33,
    Extension = 0xFE,
    Invalid = 0xFF,
}

impl TypeTag {
    /// Parses a tag from its wire byte.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidType`] for bytes outside the tag set
    /// (including `0xFF`, which is never a valid wire tag).
    pub fn parse(raw: u8) -> WireResult<Self> {
        Ok(match raw {
            0x00 => Self::Null,
            0x01 => Self::Bool,
            0x02 => Self::U8,
            0x03 => Self::I8,
            0x04 => Self::U16,
            0x05 => Self::I16,
            0x06 => Self::U32,
            0x07 => Self::I32,
            0x08 => Self::U64,
            0x09 => Self::I64,
            0x0A => Self::F32,
            0x0B => Self::F64,
            0x10 => Self::Varint,
            0x11 => Self::String,
            0x12 => Self::Bytes,
            0x13 => Self::Uuid,
            0x20 => Self::Array,
            0x21 => Self::Map,
            0x22 => Self::Struct,
            0x23 => Self::Tuple,
            0x30 => Self::Timestamp,
            0x31 => Self::Duration,
            0x32 => Self::Optional,
            0x33 => Self::Enum,
            0xFE => Self::Extension,
            tag => return Err(WireError::InvalidType { tag }),
        })
    }

    /// Returns the raw wire byte for this tag.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns the fixed payload size in bytes, or 0 for variable-length and
    /// payload-less tags.
    #[must_use]
    pub const fn fixed_size(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 | Self::Timestamp | Self::Duration => 8,
            Self::Uuid => 16,
            _ => 0,
        }
    }

    /// Returns `true` for tags whose grammar is reserved for a future
    /// revision.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::Tuple | Self::Optional | Self::Enum | Self::Extension)
    }

    /// Returns the lowercase tag name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Varint => "varint",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Array => "array",
            Self::Map => "map",
            Self::Struct => "struct",
            Self::Tuple => "tuple",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
            Self::Optional => "optional",
            Self::Enum => "enum",
            Self::Extension => "extension",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_WIRE_TAGS: [TypeTag; 25] = [
        TypeTag::Null,
        TypeTag::Bool,
        TypeTag::U8,
        TypeTag::I8,
        TypeTag::U16,
        TypeTag::I16,
        TypeTag::U32,
        TypeTag::I32,
        TypeTag::U64,
        TypeTag::I64,
        TypeTag::F32,
        TypeTag::F64,
        TypeTag::Varint,
        TypeTag::String,
        TypeTag::Bytes,
        TypeTag::Uuid,
        TypeTag::Array,
        TypeTag::Map,
        TypeTag::Struct,
        TypeTag::Tuple,
        TypeTag::Timestamp,
        TypeTag::Duration,
        TypeTag::Optional,
        TypeTag::Enum,
        TypeTag::Extension,
    ];

    #[test]
    fn parse_roundtrips_every_wire_tag() {
        for tag in ALL_WIRE_TAGS {
            assert_eq!(TypeTag::parse(tag.raw()).unwrap(), tag);
        }
    }

    #[test]
    fn parse_rejects_unknown_bytes() {
        for raw in [0x0Cu8, 0x0F, 0x14, 0x24, 0x34, 0x80, 0xFD, 0xFF] {
            assert_eq!(
                TypeTag::parse(raw),
                Err(WireError::InvalidType { tag: raw })
            );
        }
    }

    #[test]
    fn expected_discriminants() {
        assert_eq!(TypeTag::Null.raw(), 0x00);
        assert_eq!(TypeTag::F64.raw(), 0x0B);
        assert_eq!(TypeTag::Varint.raw(), 0x10);
        assert_eq!(TypeTag::Uuid.raw(), 0x13);
        assert_eq!(TypeTag::Array.raw(), 0x20);
        assert_eq!(TypeTag::Tuple.raw(), 0x23);
        assert_eq!(TypeTag::Timestamp.raw(), 0x30);
        assert_eq!(TypeTag::Enum.raw(), 0x33);
        assert_eq!(TypeTag::Extension.raw(), 0xFE);
        assert_eq!(TypeTag::Invalid.raw(), 0xFF);
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(TypeTag::Null.fixed_size(), 0);
        assert_eq!(TypeTag::Bool.fixed_size(), 1);
        assert_eq!(TypeTag::I16.fixed_size(), 2);
        assert_eq!(TypeTag::F32.fixed_size(), 4);
        assert_eq!(TypeTag::Timestamp.fixed_size(), 8);
        assert_eq!(TypeTag::Duration.fixed_size(), 8);
        assert_eq!(TypeTag::Uuid.fixed_size(), 16);
        // Variable-length tags report zero.
        assert_eq!(TypeTag::Varint.fixed_size(), 0);
        assert_eq!(TypeTag::String.fixed_size(), 0);
        assert_eq!(TypeTag::Array.fixed_size(), 0);
        assert_eq!(TypeTag::Struct.fixed_size(), 0);
    }

    #[test]
    fn reserved_tags() {
        assert!(TypeTag::Tuple.is_reserved());
        assert!(TypeTag::Optional.is_reserved());
        assert!(TypeTag::Enum.is_reserved());
        assert!(TypeTag::Extension.is_reserved());
        assert!(!TypeTag::Array.is_reserved());
        assert!(!TypeTag::Null.is_reserved());
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(TypeTag::U32.to_string(), "u32");
        assert_eq!(TypeTag::Extension.to_string(), "extension");
        assert_eq!(TypeTag::Invalid.to_string(), "invalid");
    }
}

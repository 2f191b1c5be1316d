//! Schema definitions and construction-time validation.

use std::collections::HashSet;

use wire::{TypeTag, WireError, WireResult};

use crate::field::FieldDef;

/// A validated record schema.
///
/// Construction rejects anything the record bridge cannot carry, so encode
/// and decode never have to re-check field shapes. Variable-length field
/// types (strings, bytes, containers) are not supported by the bridge in
/// this release; such values are written and read manually around the
/// schema-driven fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    type_id: u16,
    fields: Vec<FieldDef>,
    struct_size: usize,
}

/// Returns `true` for tags the record bridge can move between a record byte
/// image and the wire.
#[must_use]
pub const fn bridge_supported(tag: TypeTag) -> bool {
    matches!(
        tag,
        TypeTag::Bool
            | TypeTag::U8
            | TypeTag::I8
            | TypeTag::U16
            | TypeTag::I16
            | TypeTag::U32
            | TypeTag::I32
            | TypeTag::U64
            | TypeTag::I64
            | TypeTag::F32
            | TypeTag::F64
            | TypeTag::Timestamp
            | TypeTag::Duration
    )
}

impl Schema {
    /// Creates a schema after validating every field.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidType`] for field tags the bridge does not
    /// support, and [`WireError::InvalidArg`] for a zero or duplicate field
    /// id, a size that does not match the tag's wire size, or a field
    /// extending past `struct_size`.
    pub fn new(
        name: &str,
        type_id: u16,
        fields: Vec<FieldDef>,
        struct_size: usize,
    ) -> WireResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !bridge_supported(field.tag) {
                return Err(WireError::InvalidType {
                    tag: field.tag.raw(),
                });
            }
            // Field id 0 is the wire sentinel.
            if field.field_id == 0 || !seen.insert(field.field_id) {
                return Err(WireError::InvalidArg);
            }
            if field.size != field.tag.fixed_size() {
                return Err(WireError::InvalidArg);
            }
            if field.offset + field.size > struct_size {
                return Err(WireError::InvalidArg);
            }
        }
        Ok(Self {
            name: name.to_owned(),
            type_id,
            fields,
            struct_size,
        })
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wire type id.
    #[must_use]
    pub const fn type_id(&self) -> u16 {
        self.type_id
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Returns the record byte-image size.
    #[must_use]
    pub const fn struct_size(&self) -> usize {
        self.struct_size
    }

    /// Looks up a field by its wire id.
    #[must_use]
    pub fn field_by_id(&self, field_id: u16) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.field_id == field_id)
    }
}

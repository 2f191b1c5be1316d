//! Schema-driven record encode/decode.
//!
//! A record is a caller-supplied byte image of `struct_size` bytes; field
//! values sit at their declared offsets in native byte order and cross the
//! wire through the ordinary typed codec operations, so a schema-encoded
//! struct is indistinguishable from a manually written one.

use codec::{Decoder, Encoder};
use wire::{TypeTag, WireError, WireResult};

use crate::field::FieldDef;
use crate::schema::Schema;

fn field_slice<'r>(record: &'r [u8], field: &FieldDef) -> &'r [u8] {
    &record[field.offset..field.offset + field.size]
}

fn write_field_value(enc: &mut Encoder<'_>, field: &FieldDef, record: &[u8]) -> WireResult<()> {
    let raw = field_slice(record, field);
    match field.tag {
        TypeTag::Bool => enc.write_bool(raw[0] != 0),
        TypeTag::U8 => enc.write_u8(raw[0]),
        TypeTag::I8 => enc.write_i8(raw[0] as i8),
        TypeTag::U16 => enc.write_u16(u16::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::I16 => enc.write_i16(i16::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::U32 => enc.write_u32(u32::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::I32 => enc.write_i32(i32::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::U64 => enc.write_u64(u64::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::I64 => enc.write_i64(i64::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::F32 => enc.write_f32(f32::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::F64 => enc.write_f64(f64::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::Timestamp => enc.write_timestamp(u64::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::Duration => enc.write_duration(u64::from_ne_bytes(raw.try_into().unwrap())),
        // Schema construction rejects everything else.
        _ => Err(WireError::Internal),
    }
}

fn read_field_value(dec: &mut Decoder<'_>, field: &FieldDef, record: &mut [u8]) -> WireResult<()> {
    let out = &mut record[field.offset..field.offset + field.size];
    match field.tag {
        TypeTag::Bool => out[0] = u8::from(dec.read_bool()?),
        TypeTag::U8 => out[0] = dec.read_u8()?,
        TypeTag::I8 => out[0] = dec.read_i8()? as u8,
        TypeTag::U16 => out.copy_from_slice(&dec.read_u16()?.to_ne_bytes()),
        TypeTag::I16 => out.copy_from_slice(&dec.read_i16()?.to_ne_bytes()),
        TypeTag::U32 => out.copy_from_slice(&dec.read_u32()?.to_ne_bytes()),
        TypeTag::I32 => out.copy_from_slice(&dec.read_i32()?.to_ne_bytes()),
        TypeTag::U64 => out.copy_from_slice(&dec.read_u64()?.to_ne_bytes()),
        TypeTag::I64 => out.copy_from_slice(&dec.read_i64()?.to_ne_bytes()),
        TypeTag::F32 => out.copy_from_slice(&dec.read_f32()?.to_ne_bytes()),
        TypeTag::F64 => out.copy_from_slice(&dec.read_f64()?.to_ne_bytes()),
        TypeTag::Timestamp => out.copy_from_slice(&dec.read_timestamp()?.to_ne_bytes()),
        TypeTag::Duration => out.copy_from_slice(&dec.read_duration()?.to_ne_bytes()),
        _ => return Err(WireError::Internal),
    }
    Ok(())
}

/// Encodes a record as a struct value driven by its schema.
///
/// Emits `struct_begin(type_id)`, then for every schema field a
/// `(field_id, tag)` header followed by the typed value read from the record
/// image, and closes with the sentinel.
///
/// # Errors
///
/// Returns [`WireError::InvalidArg`] if `record` is not exactly
/// `struct_size` bytes, plus any encoder error.
pub fn encode_record(enc: &mut Encoder<'_>, record: &[u8], schema: &Schema) -> WireResult<()> {
    if record.len() != schema.struct_size() {
        return Err(WireError::InvalidArg);
    }

    enc.struct_begin(schema.type_id())?;
    for field in schema.fields() {
        enc.write_field(field.field_id, field.tag)?;
        write_field_value(enc, field, record)?;
    }
    enc.struct_end()
}

/// Decodes a struct value into a record image driven by its schema.
///
/// The record is zeroed first; unknown wire fields are skipped, so a record
/// encoded by a peer with extra fields still decodes. Fields absent from the
/// wire stay zero.
///
/// # Errors
///
/// Returns [`WireError::InvalidArg`] if `record` is not exactly
/// `struct_size` bytes, [`WireError::TypeMismatch`] if the wire type id does
/// not match the schema, plus any decoder error.
pub fn decode_record(dec: &mut Decoder<'_>, record: &mut [u8], schema: &Schema) -> WireResult<()> {
    if record.len() != schema.struct_size() {
        return Err(WireError::InvalidArg);
    }

    let type_id = dec.read_struct_begin()?;
    if type_id != schema.type_id() {
        return Err(WireError::TypeMismatch {
            expected: schema.type_id(),
            found: type_id,
        });
    }

    record.fill(0);

    loop {
        match dec.read_field() {
            Ok((field_id, _wire_tag)) => match schema.field_by_id(field_id) {
                Some(field) => read_field_value(dec, field, record)?,
                None => dec.skip()?,
            },
            Err(WireError::NotFound) => break,
            Err(err) => return Err(err),
        }
    }

    dec.read_struct_end()
}

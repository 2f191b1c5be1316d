//! Library backing the `dcfs-tools` binary: message inspection, schema
//! loading from JSON, schema-driven decoding to JSON, and the end-to-end
//! self-check.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use codec::{Decoder, Encoder};
use schema::{decode_record, encode_record, FieldDef, Schema};
use wire::{message_length, MessageFlags, MessageHeader, TypeTag};

/// One payload value observed while walking a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEntry {
    /// Tag name of the value.
    pub tag: &'static str,
    /// Encoded size in bytes, including the tag byte.
    pub size: usize,
}

/// Structural summary of a framed message.
#[derive(Debug, Clone)]
pub struct InspectReport {
    /// Parsed header.
    pub header: MessageHeader,
    /// Total framed length in bytes.
    pub total_len: usize,
    /// Whether a CRC trailer was present and matched.
    pub crc_verified: bool,
    /// Top-level payload values in stream order.
    pub values: Vec<ValueEntry>,
}

/// Validates a message and walks its payload without decoding values.
pub fn inspect_message(bytes: &[u8]) -> Result<InspectReport> {
    let mut decoder = Decoder::new(bytes).context("message shorter than a header")?;
    decoder.validate().context("message failed validation")?;

    let header = *decoder.header().context("header missing after validation")?;
    let crc_verified = decoder.crc_verified();

    let mut values = Vec::new();
    while !decoder.at_end() {
        let tag = decoder.peek_type();
        let before = decoder.remaining();
        decoder
            .skip()
            .with_context(|| format!("walking a {tag} value"))?;
        values.push(ValueEntry {
            tag: tag.name(),
            size: before - decoder.remaining(),
        });
    }

    Ok(InspectReport {
        header,
        total_len: bytes.len(),
        crc_verified,
        values,
    })
}

/// Renders an inspect report for terminal output.
#[must_use]
pub fn format_report(report: &InspectReport) -> String {
    let mut out = String::new();
    let header = &report.header;
    out.push_str(&format!(
        "version 0x{:04X}  msg_type {}  flags 0x{:02X}  sequence {}\n",
        header.version,
        header.msg_type,
        header.flags.raw(),
        header.sequence,
    ));
    out.push_str(&format!(
        "payload {} bytes, framed {} bytes, crc {}\n",
        header.payload_len,
        report.total_len,
        if report.crc_verified {
            "verified"
        } else {
            "absent"
        },
    ));
    for (index, value) in report.values.iter().enumerate() {
        out.push_str(&format!("  [{index}] {} ({} bytes)\n", value.tag, value.size));
    }
    out
}

/// JSON description of a schema, as accepted by `dcfs-tools decode`.
#[derive(Debug, Deserialize)]
pub struct SchemaSpec {
    pub name: String,
    pub type_id: u16,
    pub struct_size: usize,
    pub fields: Vec<FieldSpec>,
}

/// JSON description of one schema field.
#[derive(Debug, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_id: u16,
    #[serde(rename = "type")]
    pub type_name: String,
    pub offset: usize,
    pub size: usize,
}

fn tag_by_name(name: &str) -> Result<TypeTag> {
    for raw in 0u8..=0xFE {
        if let Ok(tag) = TypeTag::parse(raw) {
            if tag.name() == name {
                return Ok(tag);
            }
        }
    }
    bail!("unknown type name {name:?}");
}

/// Builds a validated [`Schema`] from its JSON description.
pub fn load_schema(json: &str) -> Result<Schema> {
    let spec: SchemaSpec = serde_json::from_str(json).context("parse schema JSON")?;
    let mut fields = Vec::with_capacity(spec.fields.len());
    for field in &spec.fields {
        let tag = tag_by_name(&field.type_name)
            .with_context(|| format!("field {:?}", field.name))?;
        fields.push(FieldDef::new(
            &field.name,
            field.field_id,
            tag,
            field.offset,
            field.size,
        ));
    }
    Schema::new(&spec.name, spec.type_id, fields, spec.struct_size)
        .with_context(|| format!("schema {:?} failed validation", spec.name))
}

fn field_to_json(field: &FieldDef, record: &[u8]) -> Value {
    let raw = &record[field.offset..field.offset + field.size];
    match field.tag {
        TypeTag::Bool => json!(raw[0] != 0),
        TypeTag::U8 => json!(raw[0]),
        TypeTag::I8 => json!(raw[0] as i8),
        TypeTag::U16 => json!(u16::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::I16 => json!(i16::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::U32 => json!(u32::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::I32 => json!(i32::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::U64 | TypeTag::Timestamp | TypeTag::Duration => {
            json!(u64::from_ne_bytes(raw.try_into().unwrap()))
        }
        TypeTag::I64 => json!(i64::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::F32 => json!(f32::from_ne_bytes(raw.try_into().unwrap())),
        TypeTag::F64 => json!(f64::from_ne_bytes(raw.try_into().unwrap())),
        _ => Value::Null,
    }
}

/// Decodes the first schema-described struct in a message into JSON.
pub fn decode_message_json(bytes: &[u8], schema: &Schema) -> Result<Value> {
    let mut decoder = Decoder::new(bytes).context("message shorter than a header")?;
    decoder.validate().context("message failed validation")?;

    let mut record = vec![0u8; schema.struct_size()];
    decode_record(&mut decoder, &mut record, schema)
        .with_context(|| format!("decode record against schema {:?}", schema.name()))?;

    let mut object = serde_json::Map::new();
    for field in schema.fields() {
        object.insert(field.name.clone(), field_to_json(field, &record));
    }
    Ok(Value::Object(object))
}

/// Runs the built-in end-to-end exercise and returns a line-per-check
/// report. Fails fast on the first broken invariant.
pub fn selfcheck() -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "host endianness: {}\n",
        if bytestream::is_little_endian() {
            "little"
        } else {
            "big"
        }
    ));

    let crc = bytestream::crc32(b"123456789");
    if crc != 0xCBF4_3926 {
        bail!("CRC32 check value failed: got 0x{crc:08X}");
    }
    out.push_str("crc32 check value: ok\n");

    // Primitive and variable-length round-trip through an owned encoder.
    let mut enc = Encoder::new(1, MessageFlags::none());
    enc.write_bool(true)?;
    enc.write_i32(-123_456_789)?;
    enc.write_f64(2.718_281_828_459_045)?;
    enc.write_str("Hello, DCF!")?;
    enc.write_varint(0xFFFF_FFFF)?;
    let message = enc.finish()?.to_vec();
    if message_length(&message)? != message.len() {
        bail!("framed length does not match header");
    }

    let mut dec = Decoder::new(&message)?;
    dec.validate()?;
    if !(dec.read_bool()?
        && dec.read_i32()? == -123_456_789
        && dec.read_f64()?.to_bits() == 2.718_281_828_459_045f64.to_bits()
        && dec.read_str()? == "Hello, DCF!"
        && dec.read_varint()? == 0xFFFF_FFFF
        && dec.at_end())
    {
        bail!("owned-buffer roundtrip mismatch");
    }
    out.push_str("owned-buffer roundtrip: ok\n");

    // Borrowed-buffer round-trip.
    let mut buf = [0u8; 1024];
    let mut enc = Encoder::with_buffer(&mut buf, 2, MessageFlags::none())?;
    enc.write_str("Using external buffer!")?;
    enc.write_u64(0xCAFE_BABE_DEAD_BEEF)?;
    let message = enc.finish()?.to_vec();
    let mut dec = Decoder::new(&message)?;
    dec.validate()?;
    if !(dec.crc_verified()
        && dec.read_str()? == "Using external buffer!"
        && dec.read_u64()? == 0xCAFE_BABE_DEAD_BEEF)
    {
        bail!("borrowed-buffer roundtrip mismatch");
    }
    out.push_str("borrowed-buffer roundtrip: ok\n");

    // Schema bridge round-trip.
    let schema = Schema::new(
        "selfcheck",
        0x0200,
        vec![
            FieldDef::new("id", 1, TypeTag::U32, 0, 4),
            FieldDef::new("active", 2, TypeTag::Bool, 4, 1),
            FieldDef::new("score", 3, TypeTag::F64, 8, 8),
        ],
        16,
    )?;
    let mut record = [0u8; 16];
    record[0..4].copy_from_slice(&12345u32.to_ne_bytes());
    record[4] = 1;
    record[8..16].copy_from_slice(&98.5f64.to_ne_bytes());

    let mut enc = Encoder::new(3, MessageFlags::none());
    encode_record(&mut enc, &record, &schema)?;
    let message = enc.finish()?.to_vec();
    let mut dec = Decoder::new(&message)?;
    dec.validate()?;
    let mut decoded = [0u8; 16];
    decode_record(&mut dec, &mut decoded, &schema)?;
    if decoded != record {
        bail!("schema roundtrip mismatch");
    }
    out.push_str("schema roundtrip: ok\n");

    Ok(out)
}

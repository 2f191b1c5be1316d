//! Schema-driven record serialization for the DCFS codec.
//!
//! A [`Schema`] is a declarative field table: each [`FieldDef`] names a wire
//! field id, a type tag, and the offset/size of the value inside a record
//! byte image. [`encode_record`] and [`decode_record`] drive the codec from
//! the table, with unknown-field tolerance on decode.
//!
//! Variable-length field types (strings, bytes, containers) are rejected at
//! schema construction; those values are written and read manually with the
//! codec's own operations.

mod field;
mod record;
mod schema;

pub use field::{FieldDef, FieldFlags};
pub use record::{decode_record, encode_record};
pub use schema::{bridge_supported, Schema};

//! # Canonical Codec
//!
//! Deterministic binary encoding for every record the protocol signs or
//! hashes. The wire format is a strict subset of MessagePack:
//!
//! - maps are written with keys sorted bytewise;
//! - zero-valued fields (0, false, empty bytes/strings/lists, all-zero fixed
//!   arrays, empty nested records) are omitted entirely;
//! - every integer and length header uses the smallest form available.
//!
//! Decoding is the mirror image and refuses anything the encoder could not
//! have produced: trailing bytes, duplicate or out-of-order keys, explicit
//! zero values, oversized headers, unknown fields. Another implementation
//! will hash the bytes we accept, so "close enough" is a bug.
//!
//! ```text
//! value.rs  — Value tree, rmp-based writer, strict reader
//! fields.rs — FieldWriter / FieldReader used by per-record field tables
//! ```

pub mod fields;
pub mod value;

use thiserror::Error;

pub use fields::{FieldReader, FieldWriter};
pub use value::{decode_value, encode_value, Value};

/// Malformed or non-canonical input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("{count} trailing bytes after the encoded value")]
    TrailingBytes { count: usize },

    #[error("unsupported msgpack type (marker 0x{marker:02x})")]
    UnsupportedType { marker: u8 },

    #[error("non-minimal {form} header")]
    NonMinimal { form: &'static str },

    #[error("text string is not valid UTF-8")]
    InvalidUtf8,

    #[error("map key must be a string, found {found}")]
    NonStringKey { found: &'static str },

    #[error("duplicate map key {0:?}")]
    DuplicateKey(String),

    #[error("map key {0:?} out of canonical order")]
    UnsortedKeys(String),

    #[error("field {0:?} holds a zero value and should have been omitted")]
    ZeroValue(String),

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("field {field:?}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field {field:?}: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: String,
        expected: usize,
        got: usize,
    },

    #[error("field {field:?}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("nesting exceeds the maximum decode depth")]
    TooDeep,
}

/// A record with a static field table.
pub trait Encode {
    fn encode_fields(&self, w: &mut FieldWriter);

    fn to_value(&self) -> Value {
        let mut w = FieldWriter::new();
        self.encode_fields(&mut w);
        w.finish()
    }
}

/// The decoding half of a record's field table.
pub trait Decode: Sized {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError>;

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let mut r = FieldReader::from_value(value)?;
        let out = Self::decode_fields(&mut r)?;
        r.finish()?;
        Ok(out)
    }
}

/// Canonical bytes of a record.
pub fn to_vec<T: Encode + ?Sized>(record: &T) -> Vec<u8> {
    encode_value(&record.to_value())
}

/// Strictly decode a record from exactly `bytes`.
pub fn from_slice<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    T::from_value(decode_value(bytes)?)
}

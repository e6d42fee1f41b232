//! Per-record field tables.
//!
//! A record's `Encode` impl lists its fields on a [`FieldWriter`], one call
//! per field with its short wire name. The writer drops zero values and the
//! underlying map sorts the keys. `Decode` impls pull the same names off a
//! [`FieldReader`]; absent keys read as the zero value, and any key left over
//! at the end is an unknown field.

use std::collections::BTreeMap;

use super::value::Value;
use super::{Decode, DecodeError, Encode};
use crate::crypto::{PublicKey, Signature};
use crate::identity::Address;

/// Collects the non-zero fields of one record.
#[derive(Debug, Default)]
pub struct FieldWriter {
    entries: BTreeMap<String, Value>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, key: &str, value: Value) {
        if !value.is_zero() {
            self.entries.insert(key.to_owned(), value);
        }
    }

    pub fn uint(&mut self, key: &str, value: u64) {
        self.put(key, Value::Uint(value));
    }

    pub fn boolean(&mut self, key: &str, value: bool) {
        self.put(key, Value::Bool(value));
    }

    pub fn bytes(&mut self, key: &str, value: &[u8]) {
        self.put(key, Value::Bytes(value.to_vec()));
    }

    pub fn string(&mut self, key: &str, value: &str) {
        self.put(key, Value::Str(value.to_owned()));
    }

    /// Fixed-width bytes. All-zero is the zero value and is omitted.
    pub fn fixed<const N: usize>(&mut self, key: &str, value: &[u8; N]) {
        if value.iter().any(|b| *b != 0) {
            self.put(key, Value::Bytes(value.to_vec()));
        }
    }

    pub fn opt_fixed<const N: usize>(&mut self, key: &str, value: Option<&[u8; N]>) {
        if let Some(value) = value {
            self.fixed(key, value);
        }
    }

    pub fn address(&mut self, key: &str, value: &Address) {
        self.fixed(key, value.as_bytes());
    }

    pub fn opt_address(&mut self, key: &str, value: Option<&Address>) {
        if let Some(value) = value {
            self.address(key, value);
        }
    }

    pub fn public_key(&mut self, key: &str, value: &PublicKey) {
        self.fixed(key, value.as_bytes());
    }

    pub fn signature(&mut self, key: &str, value: Option<&Signature>) {
        if let Some(sig) = value {
            self.fixed(key, sig.as_bytes());
        }
    }

    /// A nested record. Omitted when every one of its fields is zero.
    pub fn record<T: Encode + ?Sized>(&mut self, key: &str, value: &T) {
        self.put(key, value.to_value());
    }

    pub fn opt_record<T: Encode>(&mut self, key: &str, value: Option<&T>) {
        if let Some(value) = value {
            self.record(key, value);
        }
    }

    pub fn uint_list(&mut self, key: &str, values: &[u64]) {
        self.put(
            key,
            Value::Array(values.iter().map(|v| Value::Uint(*v)).collect()),
        );
    }

    pub fn bytes_list(&mut self, key: &str, values: &[Vec<u8>]) {
        self.put(
            key,
            Value::Array(values.iter().map(|v| Value::Bytes(v.clone())).collect()),
        );
    }

    pub fn fixed_list<const N: usize>(&mut self, key: &str, values: &[[u8; N]]) {
        self.put(
            key,
            Value::Array(values.iter().map(|v| Value::Bytes(v.to_vec())).collect()),
        );
    }

    pub fn address_list(&mut self, key: &str, values: &[Address]) {
        self.put(
            key,
            Value::Array(
                values
                    .iter()
                    .map(|a| Value::Bytes(a.as_bytes().to_vec()))
                    .collect(),
            ),
        );
    }

    pub fn record_list<T: Encode>(&mut self, key: &str, values: &[T]) {
        self.put(
            key,
            Value::Array(values.iter().map(Encode::to_value).collect()),
        );
    }

    pub fn finish(self) -> Value {
        Value::Map(self.entries)
    }
}

/// Hands out the fields of one decoded record by name.
#[derive(Debug)]
pub struct FieldReader {
    entries: BTreeMap<String, Value>,
}

impl FieldReader {
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Map(entries) => Ok(Self { entries }),
            other => Err(DecodeError::TypeMismatch {
                field: String::new(),
                expected: "map",
                found: other.kind(),
            }),
        }
    }

    /// True if the record carries `key` (and so a non-zero value for it).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn uint(&mut self, key: &str) -> Result<u64, DecodeError> {
        self.take(key).map_or(Ok(0), |v| as_uint(key, v))
    }

    pub fn boolean(&mut self, key: &str) -> Result<bool, DecodeError> {
        match self.take(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(mismatch(key, "bool", &other)),
        }
    }

    pub fn bytes(&mut self, key: &str) -> Result<Vec<u8>, DecodeError> {
        self.take(key).map_or(Ok(Vec::new()), |v| as_bytes(key, v))
    }

    pub fn string(&mut self, key: &str) -> Result<String, DecodeError> {
        match self.take(key) {
            None => Ok(String::new()),
            Some(Value::Str(s)) => Ok(s),
            Some(other) => Err(mismatch(key, "str", &other)),
        }
    }

    /// Fixed-width bytes. A present all-zero value is non-canonical: the
    /// writer would have omitted it.
    pub fn fixed<const N: usize>(&mut self, key: &str) -> Result<Option<[u8; N]>, DecodeError> {
        let Some(value) = self.take(key) else {
            return Ok(None);
        };
        let arr = as_fixed::<N>(key, value)?;
        if arr.iter().all(|b| *b == 0) {
            return Err(DecodeError::ZeroValue(key.to_owned()));
        }
        Ok(Some(arr))
    }

    pub fn fixed_or_zero<const N: usize>(&mut self, key: &str) -> Result<[u8; N], DecodeError> {
        Ok(self.fixed::<N>(key)?.unwrap_or([0u8; N]))
    }

    pub fn address(&mut self, key: &str) -> Result<Option<Address>, DecodeError> {
        Ok(self.fixed::<32>(key)?.map(Address::new))
    }

    pub fn address_or_zero(&mut self, key: &str) -> Result<Address, DecodeError> {
        Ok(self.address(key)?.unwrap_or(Address::ZERO))
    }

    pub fn public_key(&mut self, key: &str) -> Result<PublicKey, DecodeError> {
        Ok(PublicKey::from_bytes(self.fixed_or_zero::<32>(key)?))
    }

    pub fn signature(&mut self, key: &str) -> Result<Option<Signature>, DecodeError> {
        Ok(self.fixed::<64>(key)?.map(Signature::from_bytes))
    }

    pub fn record<T: Decode>(&mut self, key: &str) -> Result<Option<T>, DecodeError> {
        self.take(key).map(|v| T::from_value(v)).transpose()
    }

    fn list(&mut self, key: &str) -> Result<Vec<Value>, DecodeError> {
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(mismatch(key, "array", &other)),
        }
    }

    pub fn uint_list(&mut self, key: &str) -> Result<Vec<u64>, DecodeError> {
        self.list(key)?.into_iter().map(|v| as_uint(key, v)).collect()
    }

    pub fn bytes_list(&mut self, key: &str) -> Result<Vec<Vec<u8>>, DecodeError> {
        self.list(key)?.into_iter().map(|v| as_bytes(key, v)).collect()
    }

    pub fn fixed_list<const N: usize>(&mut self, key: &str) -> Result<Vec<[u8; N]>, DecodeError> {
        self.list(key)?
            .into_iter()
            .map(|v| as_fixed::<N>(key, v))
            .collect()
    }

    pub fn address_list(&mut self, key: &str) -> Result<Vec<Address>, DecodeError> {
        Ok(self
            .fixed_list::<32>(key)?
            .into_iter()
            .map(Address::new)
            .collect())
    }

    pub fn record_list<T: Decode>(&mut self, key: &str) -> Result<Vec<T>, DecodeError> {
        self.list(key)?.into_iter().map(T::from_value).collect()
    }

    /// Fails if any field was not consumed by the record's table.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.entries.into_keys().next() {
            None => Ok(()),
            Some(key) => Err(DecodeError::UnknownField(key)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        field: key.to_owned(),
        expected,
        found: found.kind(),
    }
}

fn as_uint(key: &str, value: Value) -> Result<u64, DecodeError> {
    match value {
        Value::Uint(n) => Ok(n),
        other => Err(mismatch(key, "uint", &other)),
    }
}

fn as_bytes(key: &str, value: Value) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::Bytes(b) => Ok(b),
        other => Err(mismatch(key, "bin", &other)),
    }
}

fn as_fixed<const N: usize>(key: &str, value: Value) -> Result<[u8; N], DecodeError> {
    let bytes = as_bytes(key, value)?;
    let got = bytes.len();
    bytes.try_into().map_err(|_| DecodeError::InvalidLength {
        field: key.to_owned(),
        expected: N,
        got,
    })
}

//! The value tree and its wire form.
//!
//! Only the MessagePack types the protocol uses are representable: unsigned
//! integers, booleans, byte strings, text strings, arrays and string-keyed
//! maps. The writer always picks the smallest header `rmp` offers; the reader
//! refuses anything the writer would not have produced.

use std::collections::BTreeMap;

use rmp::Marker;

use super::DecodeError;
use crate::config::MAX_DECODE_DEPTH;

const VEC_WRITE: &str = "writing to a Vec<u8> cannot fail";

/// A decoded (or to-be-encoded) canonical value.
///
/// Maps are `BTreeMap<String, _>`: `str` ordering is byte ordering, so
/// iteration order is the canonical key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint(u64),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// True for the zero value of each type. Zero values are never written
    /// as map entries.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Uint(n) => *n == 0,
            Value::Bool(b) => !*b,
            Value::Bytes(b) => b.is_empty(),
            Value::Str(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Uint(_) => "uint",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bin",
            Value::Str(_) => "str",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

fn wire_len(len: usize) -> u32 {
    u32::try_from(len).expect("canonical values are far smaller than 4 GiB")
}

/// Append the canonical encoding of `value` to `buf`.
pub(crate) fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Uint(n) => {
            rmp::encode::write_uint(buf, *n).expect(VEC_WRITE);
        }
        Value::Bool(b) => rmp::encode::write_bool(buf, *b).expect(VEC_WRITE),
        Value::Bytes(bytes) => {
            rmp::encode::write_bin_len(buf, wire_len(bytes.len())).expect(VEC_WRITE);
            buf.extend_from_slice(bytes);
        }
        Value::Str(s) => {
            rmp::encode::write_str_len(buf, wire_len(s.len())).expect(VEC_WRITE);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(items) => {
            rmp::encode::write_array_len(buf, wire_len(items.len())).expect(VEC_WRITE);
            for item in items {
                write_value(buf, item);
            }
        }
        Value::Map(entries) => {
            rmp::encode::write_map_len(buf, wire_len(entries.len())).expect(VEC_WRITE);
            for (key, item) in entries {
                rmp::encode::write_str_len(buf, wire_len(key.len())).expect(VEC_WRITE);
                buf.extend_from_slice(key.as_bytes());
                write_value(buf, item);
            }
        }
    }
}

/// Strict cursor over canonical bytes.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEof);
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    /// Read one value. `depth` counts enclosing containers.
    pub(crate) fn read_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_DECODE_DEPTH {
            return Err(DecodeError::TooDeep);
        }
        let byte = self.read_u8()?;
        match Marker::from_u8(byte) {
            Marker::FixPos(v) => Ok(Value::Uint(u64::from(v))),
            Marker::U8 => {
                let v = u64::from(self.read_u8()?);
                minimal(v, 0x80, "uint8")?;
                Ok(Value::Uint(v))
            }
            Marker::U16 => {
                let v = u64::from(self.read_u16()?);
                minimal(v, 0x100, "uint16")?;
                Ok(Value::Uint(v))
            }
            Marker::U32 => {
                let v = u64::from(self.read_u32()?);
                minimal(v, 0x1_0000, "uint32")?;
                Ok(Value::Uint(v))
            }
            Marker::U64 => {
                let v = self.read_u64()?;
                minimal(v, 0x1_0000_0000, "uint64")?;
                Ok(Value::Uint(v))
            }
            Marker::True => Ok(Value::Bool(true)),
            Marker::False => Ok(Value::Bool(false)),
            Marker::FixStr(n) => self.read_str(usize::from(n)),
            Marker::Str8 => {
                let n = u64::from(self.read_u8()?);
                minimal(n, 32, "str8")?;
                self.read_str(n as usize)
            }
            Marker::Str16 => {
                let n = u64::from(self.read_u16()?);
                minimal(n, 0x100, "str16")?;
                self.read_str(n as usize)
            }
            Marker::Str32 => {
                let n = u64::from(self.read_u32()?);
                minimal(n, 0x1_0000, "str32")?;
                self.read_str(n as usize)
            }
            Marker::Bin8 => {
                let n = usize::from(self.read_u8()?);
                Ok(Value::Bytes(self.take(n)?.to_vec()))
            }
            Marker::Bin16 => {
                let n = u64::from(self.read_u16()?);
                minimal(n, 0x100, "bin16")?;
                Ok(Value::Bytes(self.take(n as usize)?.to_vec()))
            }
            Marker::Bin32 => {
                let n = u64::from(self.read_u32()?);
                minimal(n, 0x1_0000, "bin32")?;
                Ok(Value::Bytes(self.take(n as usize)?.to_vec()))
            }
            Marker::FixArray(n) => self.read_array(usize::from(n), depth),
            Marker::Array16 => {
                let n = u64::from(self.read_u16()?);
                minimal(n, 16, "array16")?;
                self.read_array(n as usize, depth)
            }
            Marker::Array32 => {
                let n = u64::from(self.read_u32()?);
                minimal(n, 0x1_0000, "array32")?;
                self.read_array(n as usize, depth)
            }
            Marker::FixMap(n) => self.read_map(usize::from(n), depth),
            Marker::Map16 => {
                let n = u64::from(self.read_u16()?);
                minimal(n, 16, "map16")?;
                self.read_map(n as usize, depth)
            }
            Marker::Map32 => {
                let n = u64::from(self.read_u32()?);
                minimal(n, 0x1_0000, "map32")?;
                self.read_map(n as usize, depth)
            }
            _ => Err(DecodeError::UnsupportedType { marker: byte }),
        }
    }

    fn read_str(&mut self, len: usize) -> Result<Value, DecodeError> {
        let raw = self.take(len)?;
        let s = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
        Ok(Value::Str(s.to_owned()))
    }

    /// Every element takes at least one byte, so a declared length larger
    /// than the remaining input is rejected before allocating anything.
    fn check_items(&self, count: usize, bytes_per_item: usize) -> Result<(), DecodeError> {
        if count.saturating_mul(bytes_per_item) > self.remaining() {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(())
    }

    fn read_array(&mut self, len: usize, depth: usize) -> Result<Value, DecodeError> {
        self.check_items(len, 1)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.read_value(depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, len: usize, depth: usize) -> Result<Value, DecodeError> {
        self.check_items(len, 2)?;
        let mut entries: BTreeMap<String, Value> = BTreeMap::new();
        for _ in 0..len {
            let key = match self.read_value(depth + 1)? {
                Value::Str(s) => s,
                other => {
                    return Err(DecodeError::NonStringKey {
                        found: other.kind(),
                    })
                }
            };
            if let Some(last) = entries.keys().next_back() {
                if *last == key {
                    return Err(DecodeError::DuplicateKey(key));
                }
                if last.as_str() > key.as_str() {
                    return Err(DecodeError::UnsortedKeys(key));
                }
            }
            let value = self.read_value(depth + 1)?;
            if value.is_zero() {
                return Err(DecodeError::ZeroValue(key));
            }
            entries.insert(key, value);
        }
        Ok(Value::Map(entries))
    }
}

fn minimal(value: u64, floor: u64, form: &'static str) -> Result<(), DecodeError> {
    if value < floor {
        return Err(DecodeError::NonMinimal { form });
    }
    Ok(())
}

/// Decode exactly one value spanning all of `bytes`.
pub fn decode_value(bytes: &[u8]) -> Result<Value, DecodeError> {
    let mut reader = Reader::new(bytes);
    let value = reader.read_value(0)?;
    match reader.remaining() {
        0 => Ok(value),
        count => Err(DecodeError::TrailingBytes { count }),
    }
}

/// Encode a single value.
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    buf
}

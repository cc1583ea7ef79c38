//! Value codecs for declared types SQLite has no native representation for.
//!
//! A [`Codec`] pairs an encode hook (caller [`Value`] to storage value)
//! with a decode hook (stored bytes back to [`Value`]). Codecs are pure
//! functions with no shared state; encode/decode round-trips exactly for
//! all booleans and all finite integer sequences.
//!
//! Dispatch is keyed by the column's *declared* type, independent of the
//! runtime value's concrete representation, through a [`CodecRegistry`]
//! owned by each [`Database`](crate::Database) instance. Registrations on
//! one database never affect another.

use std::collections::HashMap;

use rusqlite::types::Value as StoredValue;
use sqlite_tables_core::ColumnType;

use crate::error::{DatabaseError, Result};

/// A value crossing the driver boundary.
///
/// Covers SQLite's native storage classes plus the two kinds this crate
/// adapts: booleans and ordered integer sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Native integer.
    Integer(i64),
    /// Native float.
    Real(f64),
    /// Native text.
    Text(String),
    /// Native byte string.
    Blob(Vec<u8>),
    /// Boolean, stored as `b"1"`/`b"0"` in `BOOL` columns.
    Bool(bool),
    /// Integer sequence, stored comma-joined in `INTLIST` columns.
    IntList(Vec<i64>),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::IntList(value)
    }
}

/// Encodes a boolean as its single-byte textual literal.
pub fn encode_bool(value: bool) -> Vec<u8> {
    if value { b"1".to_vec() } else { b"0".to_vec() }
}

/// Decodes an integer literal into a boolean: nonzero is true, zero false.
pub fn decode_bool(raw: &[u8]) -> Result<bool> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| DatabaseError::Codec(format!("invalid boolean literal: {raw:?}")))?;
    let parsed: i64 = text
        .parse()
        .map_err(|_| DatabaseError::Codec(format!("invalid boolean literal: '{text}'")))?;
    Ok(parsed != 0)
}

/// Encodes an integer sequence as comma-joined decimals; the empty sequence
/// encodes to the empty byte string.
pub fn encode_int_list(values: &[i64]) -> Vec<u8> {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
        .into_bytes()
}

/// Decodes a comma-joined integer literal, preserving order; the empty byte
/// string decodes to the empty sequence.
pub fn decode_int_list(raw: &[u8]) -> Result<Vec<i64>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let text = std::str::from_utf8(raw)
        .map_err(|_| DatabaseError::Codec(format!("invalid integer list literal: {raw:?}")))?;
    text.split(',')
        .map(|segment| {
            segment.parse().map_err(|_| {
                DatabaseError::Codec(format!("invalid integer list segment: '{segment}'"))
            })
        })
        .collect()
}

/// An encode/decode pair for one declared column type.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    /// Transforms a caller value into the engine's storage value.
    pub encode: fn(&Value) -> Result<StoredValue>,
    /// Transforms stored bytes back into a caller value.
    pub decode: fn(&[u8]) -> Result<Value>,
}

fn encode_bool_value(value: &Value) -> Result<StoredValue> {
    match value {
        Value::Null => Ok(StoredValue::Null),
        Value::Bool(flag) => Ok(StoredValue::Blob(encode_bool(*flag))),
        Value::Integer(int) => Ok(StoredValue::Blob(encode_bool(*int != 0))),
        other => Err(DatabaseError::Codec(format!(
            "cannot encode {other:?} as BOOL"
        ))),
    }
}

fn decode_bool_value(raw: &[u8]) -> Result<Value> {
    Ok(Value::Bool(decode_bool(raw)?))
}

fn encode_int_list_value(value: &Value) -> Result<StoredValue> {
    match value {
        Value::Null => Ok(StoredValue::Null),
        Value::IntList(values) => Ok(StoredValue::Blob(encode_int_list(values))),
        other => Err(DatabaseError::Codec(format!(
            "cannot encode {other:?} as INTLIST"
        ))),
    }
}

fn decode_int_list_value(raw: &[u8]) -> Result<Value> {
    Ok(Value::IntList(decode_int_list(raw)?))
}

/// Instance-scoped codec dispatch, keyed by declared column type.
///
/// Each [`Database`](crate::Database) owns its own registry, so independent
/// databases cannot clobber each other's registrations. Columns whose
/// declared type has no codec bind natively.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<ColumnType, Codec>,
}

impl CodecRegistry {
    /// A registry with no codecs; every declared type binds natively.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// A registry with the boolean and integer-list codecs installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(
            ColumnType::Bool,
            Codec {
                encode: encode_bool_value,
                decode: decode_bool_value,
            },
        );
        registry.register(
            ColumnType::IntList,
            Codec {
                encode: encode_int_list_value,
                decode: decode_int_list_value,
            },
        );
        registry
    }

    /// Adds or replaces the codec for a declared type.
    pub fn register(&mut self, column_type: ColumnType, codec: Codec) {
        self.codecs.insert(column_type, codec);
    }

    /// The codec registered for a declared type, if any.
    pub fn get(&self, column_type: ColumnType) -> Option<&Codec> {
        self.codecs.get(&column_type)
    }

    /// Encodes a value for storage in a column of the given declared type.
    pub(crate) fn encode(&self, column_type: ColumnType, value: &Value) -> Result<StoredValue> {
        match self.codecs.get(&column_type) {
            Some(codec) => (codec.encode)(value),
            None => Ok(to_native(value)),
        }
    }

    /// Decodes a stored value read from a column of the given declared type.
    pub(crate) fn decode(&self, column_type: ColumnType, stored: StoredValue) -> Result<Value> {
        let Some(codec) = self.codecs.get(&column_type) else {
            return Ok(from_native(stored));
        };
        match stored {
            StoredValue::Null => Ok(Value::Null),
            StoredValue::Blob(raw) => (codec.decode)(&raw),
            StoredValue::Text(text) => (codec.decode)(text.as_bytes()),
            StoredValue::Integer(int) => (codec.decode)(int.to_string().as_bytes()),
            StoredValue::Real(_) => Err(DatabaseError::Codec(format!(
                "cannot decode REAL storage as {}",
                column_type.sql_keyword()
            ))),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Storage value for a column with no registered codec.
fn to_native(value: &Value) -> StoredValue {
    match value {
        Value::Null => StoredValue::Null,
        Value::Integer(int) => StoredValue::Integer(*int),
        Value::Real(float) => StoredValue::Real(*float),
        Value::Text(text) => StoredValue::Text(text.clone()),
        Value::Blob(bytes) => StoredValue::Blob(bytes.clone()),
        Value::Bool(flag) => StoredValue::Integer(i64::from(*flag)),
        Value::IntList(values) => StoredValue::Blob(encode_int_list(values)),
    }
}

fn from_native(stored: StoredValue) -> Value {
    match stored {
        StoredValue::Null => Value::Null,
        StoredValue::Integer(int) => Value::Integer(int),
        StoredValue::Real(float) => Value::Real(float),
        StoredValue::Text(text) => Value::Text(text),
        StoredValue::Blob(bytes) => Value::Blob(bytes),
    }
}

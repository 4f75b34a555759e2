//! Dynamic values flowing through the parse engine
//!
//! [`Value`] is the untyped input every schema accepts and the canonical
//! representation every validator produces. Typed outputs are recovered from
//! it through [`FromValue`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use zodiac_schema::Value;
//! use serde_json::json;
//!
//! let value = Value::from(json!({"name": "alice", "tags": ["a", "b"]}));
//! assert!(value.as_object().is_some());
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

/// Insertion-ordered string-keyed map produced by object and record schemas.
pub type ObjectMap = IndexMap<String, Value>;

// ============================================================================
// VALUE
// ============================================================================

/// Untyped value accepted and produced by schemas.
///
/// `Null` is the nil sentinel: the nil phase of the engine (defaults,
/// prefaults, optional handling) triggers on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Nil / absent value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// String-keyed map.
    Object(ObjectMap),
    /// Map with arbitrary keys, kept as ordered pairs.
    Map(Vec<(Value, Value)>),
    /// Point in time.
    DateTime(DateTime<Utc>),
    /// Opaque file handle.
    File(FileHandle),
}

/// Lightweight classification of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `Value::Null`
    Null,
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Float`
    Float,
    /// `Value::String`
    String,
    /// `Value::Array`
    Array,
    /// `Value::Object`
    Object,
    /// `Value::Map`
    Map,
    /// `Value::DateTime`
    DateTime,
    /// `Value::File`
    File,
}

impl ValueKind {
    /// Name used in issue messages (`received string`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int | Self::Float => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Map => "map",
            Self::DateTime => "date",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Builds a map value from key/value pairs.
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds an object value from string keys.
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the kind of this value.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
            Self::Map(_) => ValueKind::Map,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::File(_) => ValueKind::File,
        }
    }

    /// Returns `true` for the nil sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for integers and floats.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and floats.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Looks up an object key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// String form used when a value appears as a map key or path segment.
    #[must_use]
    pub fn key_string(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Converts into a `serde_json::Value`.
    ///
    /// Dates become RFC 3339 strings, files become objects and maps with
    /// non-string keys use the display form of their keys.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Map(pairs) => Json::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.key_string().into_owned(), v.to_json()))
                    .collect(),
            ),
            Self::DateTime(dt) => Json::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::File(file) => serde_json::json!({
                "name": file.name,
                "size": file.size,
                "mime": file.mime,
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::File(file) => write!(f, "<file {}>", file.name),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

// ============================================================================
// FILE HANDLE
// ============================================================================

/// Opaque representation of an uploaded or opened file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FileHandle {
    /// File name as supplied by the caller.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, e.g. `image/png`.
    pub mime: String,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }
}

// ============================================================================
// CONVERSIONS INTO VALUE
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Self::String(s.into_owned())
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Int(i64::from(n))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Int)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Float(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<FileHandle> for Value {
    fn from(file: FileHandle) -> Self {
        Self::File(file)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl<K, V, S> From<IndexMap<K, V, S>> for Value
where
    K: Into<Value>,
    V: Into<Value>,
{
    /// String keys produce an `Object`; any other key produces a `Map`.
    fn from(map: IndexMap<K, V, S>) -> Self {
        let pairs: Vec<(Value, Value)> = map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if pairs.iter().all(|(k, _)| matches!(k, Value::String(_))) {
            Self::Object(
                pairs
                    .into_iter()
                    .filter_map(|(k, v)| match k {
                        Value::String(s) => Some((s, v)),
                        _ => None,
                    })
                    .collect(),
            )
        } else {
            Self::Map(pairs)
        }
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Failure to decode a [`Value`] into a typed output.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    /// Name of the expected type.
    pub expected: &'static str,
    /// The value that did not fit.
    pub received: Value,
}

impl DecodeError {
    pub fn new(expected: &'static str, received: Value) -> Self {
        Self { expected, received }
    }
}

/// Recovers a typed output from a validated [`Value`].
pub trait FromValue: Sized {
    /// Name of the type used in decode errors.
    fn expected() -> &'static str;

    /// Decodes the value.
    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

impl FromValue for Value {
    fn expected() -> &'static str {
        "any"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl FromValue for serde_json::Value {
    fn expected() -> &'static str {
        "json"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        Ok(value.to_json())
    }
}

impl FromValue for String {
    fn expected() -> &'static str {
        "string"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

impl FromValue for bool {
    fn expected() -> &'static str {
        "boolean"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

macro_rules! int_from_value {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn expected() -> &'static str {
                    $name
                }

                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    match value {
                        Value::Int(i) => {
                            <$t>::try_from(i).map_err(|_| DecodeError::new($name, Value::Int(i)))
                        }
                        Value::Float(f)
                            if f.is_finite()
                                && f.fract() == 0.0
                                && f >= <$t>::MIN as f64
                                && f <= <$t>::MAX as f64 =>
                        {
                            Ok(f as $t)
                        }
                        other => Err(DecodeError::new($name, other)),
                    }
                }
            }
        )*
    };
}

int_from_value!(
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    usize => "uint",
);

impl FromValue for f64 {
    fn expected() -> &'static str {
        "float64"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Int(i) => Ok(i as f64),
            Value::Float(f) => Ok(f),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

impl FromValue for f32 {
    fn expected() -> &'static str {
        "float32"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Int(i) => Ok(i as f32),
            Value::Float(f) if !f.is_finite() || f.abs() <= f64::from(f32::MAX) => Ok(f as f32),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn expected() -> &'static str {
        "date"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

impl FromValue for FileHandle {
    fn expected() -> &'static str {
        "file"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::File(file) => Ok(file),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn expected() -> &'static str {
        T::expected()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn expected() -> &'static str {
        "array"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

impl<K, V> FromValue for IndexMap<K, V>
where
    K: FromValue + Hash + Eq,
    V: FromValue,
{
    fn expected() -> &'static str {
        "map"
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(Value::String(k))?, V::from_value(v)?)))
                .collect(),
            Value::Map(pairs) => pairs
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(DecodeError::new(Self::expected(), other)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Structured fields attached to loggers and log calls
//!
//! This module provides:
//! - `FieldValue`: typed value of a single field, including errors
//! - `Field`: a key paired with its value
//! - `FieldSnapshot`: immutable, ordered accumulation of fields

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// An error carried as a field value
///
/// The type name is captured when the field is built, because it cannot be
/// recovered from a `dyn Error` afterwards.
#[derive(Clone)]
pub struct ErrorValue {
    type_name: &'static str,
    error: Arc<dyn StdError + Send + Sync>,
}

impl ErrorValue {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<E>(),
            error: Arc::new(error),
        }
    }

    /// Stable identifier of the error's kind
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Textual description of the error
    pub fn description(&self) -> String {
        self.error.to_string()
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorValue")
            .field("type_name", &self.type_name)
            .field("error", &self.error)
            .finish()
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Value type for structured logging fields
#[derive(Debug, Clone)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Error-typed field; `None` is a declared error with no value
    Error(Option<ErrorValue>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null | FieldValue::Error(None) => write!(f, "null"),
            FieldValue::Error(Some(e)) => write!(f, "{}", e),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null | FieldValue::Error(None) => serde_json::Value::Null,
            FieldValue::Error(Some(e)) => serde_json::Value::String(e.description()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FieldValue::Error(_))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A single key/value pair
#[derive(Debug, Clone)]
pub struct Field {
    key: String,
    value: FieldValue,
}

impl Field {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an error-typed field
    pub fn error<K, E>(key: K, error: E) -> Self
    where
        K: Into<String>,
        E: StdError + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            value: FieldValue::Error(Some(ErrorValue::new(error))),
        }
    }

    /// Build an error-typed field that may hold no error
    pub fn error_opt<K, E>(key: K, error: Option<E>) -> Self
    where
        K: Into<String>,
        E: StdError + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            value: FieldValue::Error(error.map(ErrorValue::new)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// The carried error, if this is an error-typed field holding one
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match &self.value {
            FieldValue::Error(Some(e)) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Shorthand for [`Field::new`]
pub fn field<K, V>(key: K, value: V) -> Field
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    Field::new(key, value)
}

/// Immutable ordered accumulation of fields
///
/// `with` always copies into fresh storage, so a derived snapshot never
/// shares a writable buffer with its parent or its siblings. Cloning a
/// snapshot is cheap and shares the frozen storage.
#[derive(Debug, Clone, Default)]
pub struct FieldSnapshot {
    fields: Arc<[Field]>,
}

impl FieldSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Snapshot holding this one's fields followed by `extra`, in order
    #[must_use]
    pub fn with<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let extra = extra.into_iter();
        let mut fields = Vec::with_capacity(self.fields.len() + extra.size_hint().0);
        fields.extend(self.fields.iter().cloned());
        fields.extend(extra);
        Self {
            fields: fields.into(),
        }
    }

    /// Stored fields followed by call-site fields
    pub fn merged<'a>(&'a self, extra: &'a [Field]) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().chain(extra.iter())
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys in order, mostly useful for assertions
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(Field::key).collect()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        format_fields(self.fields.iter())
    }
}

impl<'a> IntoIterator for &'a FieldSnapshot {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Format fields as space separated key=value pairs
pub fn format_fields<'a>(fields: impl Iterator<Item = &'a Field>) -> String {
    fields
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

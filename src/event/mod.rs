//! The event representation consumed and produced by the enrichment core.
//!
//! Hosts deliver events in whatever shape their pipeline uses; this crate
//! only needs an object-rooted log event whose fields can be addressed by
//! dotted paths, plus a small value type covering the kinds a reference
//! table can contribute.

use std::borrow::Cow;
use std::collections::BTreeMap;

use bytes::Bytes;
use ordered_float::NotNan;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// The object type backing events and nested values.
pub type ObjectMap = BTreeMap<String, Value>;

/// A dynamically typed event field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Raw text. Table cells that do not sample as a narrower kind stay text.
    Bytes(Bytes),
    /// A signed integer.
    Integer(i64),
    /// A finite floating point number. `NotNan` keeps equality total.
    Float(NotNan<f64>),
    /// A boolean.
    Boolean(bool),
    /// A nested object.
    Object(ObjectMap),
    /// An array of values.
    Array(Vec<Value>),
    /// An empty value.
    Null,
}

impl Value {
    /// A float value, substituting zero for NaN input.
    pub fn from_f64_or_zero(value: f64) -> Self {
        match NotNan::new(value) {
            Ok(value) => Value::Float(value),
            Err(_) => Value::Float(NotNan::new(0.0).expect("zero is not NaN")),
        }
    }

    /// Renders the value as text, the form used when comparing a join value
    /// against raw table cells.
    ///
    /// Scalars render as their literal text, `Null` as the empty string, and
    /// collections as their JSON encoding.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            Value::Bytes(bytes) => String::from_utf8_lossy(bytes),
            Value::Integer(value) => Cow::Owned(value.to_string()),
            Value::Float(value) => Cow::Owned(value.to_string()),
            Value::Boolean(value) => Cow::Owned(value.to_string()),
            Value::Object(_) | Value::Array(_) => {
                Cow::Owned(serde_json::to_string(self).unwrap_or_default())
            }
            Value::Null => Cow::Borrowed(""),
        }
    }

    /// Returns the nested object map, if this value is an object.
    pub const fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(value.into_inner()),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Object(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
            Value::Array(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    state.serialize_element(item)?;
                }
                state.end()
            }
            Value::Null => serializer.serialize_unit(),
        }
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Bytes(Bytes::from(text))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<NotNan<f64>> for Value {
    fn from(value: NotNan<f64>) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::from_f64_or_zero(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Boolean(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Value::Integer(value),
                None => Value::from_f64_or_zero(number.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(text) => Value::from(text),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// An object-rooted log event.
///
/// Field paths are dot-separated: `"user.id"` resolves through nested
/// objects. Inserting through a non-object intermediate replaces it with an
/// object, mirroring how the rest of the pipeline treats paths.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogEvent {
    fields: ObjectMap,
}

impl LogEvent {
    /// Returns a reference to the value at the given path, if any.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut fields = &self.fields;
        let mut segments = path.split('.').peekable();
        loop {
            let segment = segments.next()?;
            let value = fields.get(segment)?;
            if segments.peek().is_none() {
                return Some(value);
            }
            fields = value.as_object()?;
        }
    }

    /// Returns true when a value exists at the given path.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Inserts a value at the given path, creating intermediate objects as
    /// needed, and returns the value previously stored at the leaf.
    pub fn insert(&mut self, path: &str, value: impl Into<Value>) -> Option<Value> {
        let mut fields = &mut self.fields;
        let mut segments = path.split('.').peekable();
        loop {
            let segment = segments.next()?;
            if segments.peek().is_none() {
                return fields.insert(segment.to_string(), value.into());
            }
            fields = match fields
                .entry(segment.to_string())
                .and_modify(|entry| {
                    if !matches!(entry, Value::Object(_)) {
                        *entry = Value::Object(ObjectMap::new());
                    }
                })
                .or_insert_with(|| Value::Object(ObjectMap::new()))
            {
                Value::Object(map) => map,
                // The entry was forced to an object just above.
                _ => return None,
            };
        }
    }

    /// A view over the event's top-level fields.
    pub const fn as_map(&self) -> &ObjectMap {
        &self.fields
    }

    /// Consumes the event, returning its fields.
    pub fn into_map(self) -> ObjectMap {
        self.fields
    }
}

impl From<ObjectMap> for LogEvent {
    fn from(fields: ObjectMap) -> Self {
        Self { fields }
    }
}

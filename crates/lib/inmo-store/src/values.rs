//! Tagged values accepted at the tool boundary.
//!
//! Callers send loosely typed JSON; these types decide the value kind once so
//! that filter construction and property payloads never sniff types again.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::models::text_fragment;

/// Filter kind chosen for a unique-match lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Number,
    Email,
    Text,
}

impl FilterKind {
    /// Store-side filter condition key.
    #[must_use]
    pub const fn condition_key(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Email => "email",
            Self::Text => "rich_text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueShapeError {
    pub shape: &'static str,
}

impl fmt::Display for ValueShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported value shape: {}", self.shape)
    }
}

impl Error for ValueShapeError {}

/// Candidate value for a unique-match lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum UniqueValue {
    Number(Number),
    Email(String),
    Text(String),
}

impl UniqueValue {
    /// Infers the value kind from its JSON shape.
    ///
    /// Numbers map to numeric equality, `\S+@\S+` strings to email equality and
    /// every other string to text equality. Booleans are matched by their text.
    ///
    /// # Errors
    /// Returns `ValueShapeError` for null, arrays and objects.
    pub fn infer(value: &Value) -> Result<Self, ValueShapeError> {
        match value {
            Value::Number(number) => Ok(Self::Number(number.clone())),
            Value::String(text) => Ok(Self::from_text(text)),
            Value::Bool(flag) => Ok(Self::Text(flag.to_string())),
            Value::Null => Err(ValueShapeError { shape: "null" }),
            Value::Array(_) => Err(ValueShapeError { shape: "array" }),
            Value::Object(_) => Err(ValueShapeError { shape: "object" }),
        }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if looks_like_email(text) {
            Self::Email(text.to_string())
        } else {
            Self::Text(text.to_string())
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::Number(_) => FilterKind::Number,
            Self::Email(_) => FilterKind::Email,
            Self::Text(_) => FilterKind::Text,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(number) => Value::Number(number.clone()),
            Self::Email(text) | Self::Text(text) => Value::String(text.clone()),
        }
    }
}

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+").expect("email pattern is valid"));

/// Loose email shape: some non-space text, `@`, some non-space text.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

/// A field value to write on a record.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(Number),
    Text(String),
    Checkbox(bool),
    /// Store-native payload passed through as given (e.g. a `title` array).
    Native(Map<String, Value>),
}

impl PropertyValue {
    /// Tags a caller-supplied JSON value.
    ///
    /// Strings are always written as rich text; email fields take a native
    /// `{ "email": ... }` object.
    ///
    /// # Errors
    /// Returns `ValueShapeError` for null and arrays.
    pub fn from_json(value: Value) -> Result<Self, ValueShapeError> {
        match value {
            Value::Number(number) => Ok(Self::Number(number)),
            Value::String(text) => Ok(Self::Text(text)),
            Value::Bool(flag) => Ok(Self::Checkbox(flag)),
            Value::Object(native) => Ok(Self::Native(native)),
            Value::Null => Err(ValueShapeError { shape: "null" }),
            Value::Array(_) => Err(ValueShapeError { shape: "array" }),
        }
    }

    #[must_use]
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Number(number) => serde_json::json!({ "number": number }),
            Self::Text(text) => serde_json::json!({ "rich_text": [text_fragment(text)] }),
            Self::Checkbox(flag) => serde_json::json!({ "checkbox": flag }),
            Self::Native(native) => Value::Object(native.clone()),
        }
    }
}

/// Field updates keyed by field name, in a stable order.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShapeError {
    pub field: String,
    pub source: ValueShapeError,
}

impl fmt::Display for PropertyShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property {}: {}", self.field, self.source)
    }
}

impl Error for PropertyShapeError {}

/// Tags every entry of a caller-supplied property object.
///
/// # Errors
/// Returns `PropertyShapeError` naming the first field with an unsupported shape.
pub fn property_map_from_json<I>(entries: I) -> Result<PropertyMap, PropertyShapeError>
where
    I: IntoIterator<Item = (String, Value)>,
{
    entries
        .into_iter()
        .map(|(field, value)| match PropertyValue::from_json(value) {
            Ok(tagged) => Ok((field, tagged)),
            Err(source) => Err(PropertyShapeError { field, source }),
        })
        .collect()
}

/// Store payload for a set of field updates.
#[must_use]
pub fn properties_payload(properties: &PropertyMap) -> Map<String, Value> {
    properties
        .iter()
        .map(|(field, value)| (field.clone(), value.to_payload()))
        .collect()
}

//! Host-side property values.
//!
//! The oracle hands back raw property payloads; adapters convert them into
//! [`PropertyValue`] and callers convert further into plain Rust types with
//! `TryFrom`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::UiaError;

/// Screen rectangle of an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no area
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A property value as seen by the host
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// No value (the provider's "not supported"/null payload)
    #[default]
    Empty,
    /// Boolean
    Bool(bool),
    /// Integer, including enumeration values
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Text(String),
    /// Rectangle
    Rect(Rect),
    /// Array payload (e.g. runtime ids)
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Name of the variant, used in conversion errors
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Rect(_) => "rect",
            Self::List(_) => "list",
        }
    }

    /// Whether this is the empty payload
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Borrow as bool
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as string slice
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value for reporting
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Empty => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Rect(r) => serde_json::json!({
                "x": r.x,
                "y": r.y,
                "width": r.width,
                "height": r.height,
            }),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    fn mismatch(&self, expected: &'static str) -> UiaError {
        UiaError::ValueConversion {
            expected,
            found: self.kind().to_string(),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Rect(r) => write!(f, "[{}, {}, {}x{}]", r.x, r.y, r.width, r.height),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Rect> for PropertyValue {
    fn from(value: Rect) -> Self {
        Self::Rect(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        Self::List(value)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null | serde_json::Value::Object(_) => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_default(),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
        }
    }
}

impl TryFrom<PropertyValue> for bool {
    type Error = UiaError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        value.as_bool().ok_or_else(|| value.mismatch("bool"))
    }
}

impl TryFrom<PropertyValue> for i64 {
    type Error = UiaError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        match value {
            PropertyValue::Int(i) => Ok(i),
            other => Err(other.mismatch("i64")),
        }
    }
}

impl TryFrom<PropertyValue> for i32 {
    type Error = UiaError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        match value {
            PropertyValue::Int(i) => Self::try_from(i).map_err(|_| UiaError::ValueConversion {
                expected: "i32",
                found: format!("int {i}"),
            }),
            other => Err(other.mismatch("i32")),
        }
    }
}

impl TryFrom<PropertyValue> for f64 {
    type Error = UiaError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        match value {
            PropertyValue::Float(x) => Ok(x),
            PropertyValue::Int(i) => Ok(i as Self),
            other => Err(other.mismatch("f64")),
        }
    }
}

impl TryFrom<PropertyValue> for String {
    type Error = UiaError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        match value {
            PropertyValue::Text(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }
}

impl TryFrom<PropertyValue> for Rect {
    type Error = UiaError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        match value {
            PropertyValue::Rect(r) => Ok(r),
            other => Err(other.mismatch("rect")),
        }
    }
}

//! Decoded cell values and rows.

use std::fmt;

use crate::schema::AttributeType;

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Value of an `Int` column.
    Int(u32),
    /// Value of a `Float` column.
    Float(f32),
    /// Value of a `Char` column, trailing NULs stripped.
    Text(String),
}

impl Value {
    /// Check if this value can be stored in a column of type `attr`.
    ///
    /// Text length is not checked here; see `RowCodec::encode_row`.
    pub fn matches(&self, attr: &AttributeType) -> bool {
        matches!(
            (self, attr),
            (Value::Int(_), AttributeType::Int)
                | (Value::Float(_), AttributeType::Float)
                | (Value::Text(_), AttributeType::Char { .. })
        )
    }

    /// Get the integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<u32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the text, if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One row, values in schema column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row from values in column order.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Values in column order.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get the value of column `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the row and return its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

//! Attribute types and the per-frame schema.
//!
//! A [`Schema`] is the ordered attribute list sent at the start of every
//! success frame. Column byte offsets are prefix sums of the attribute
//! widths; they are computed once in [`Schema::new`] and reused for every
//! row of the frame.
//!
//! # Example
//!
//! ```
//! use blastoise_client::schema::{AttributeType, Schema};
//!
//! let schema = Schema::new(vec![AttributeType::Int, AttributeType::Char { len: 4 }]);
//! assert_eq!(schema.row_width(), 8);
//! assert_eq!(schema.layout()[1].offset, 4);
//! ```

use serde::Serialize;

/// Width in bytes of `Int` and `Float` attributes.
pub const NUMERIC_WIDTH: usize = 4;

/// Wire type of a single column.
///
/// Serializes to the schema JSON shape: `{"type":"Int"}`,
/// `{"type":"Char","len":4}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type")]
pub enum AttributeType {
    /// Little-endian unsigned 32-bit integer.
    Int,
    /// Little-endian IEEE-754 32-bit float.
    Float,
    /// NUL right-padded byte string of exactly `len` bytes.
    Char { len: u32 },
}

impl AttributeType {
    /// Byte width of this attribute inside a row.
    #[inline]
    pub fn width(&self) -> usize {
        match self {
            AttributeType::Int | AttributeType::Float => NUMERIC_WIDTH,
            AttributeType::Char { len } => *len as usize,
        }
    }

    /// Type name as it appears in the schema `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            AttributeType::Int => "Int",
            AttributeType::Float => "Float",
            AttributeType::Char { .. } => "Char",
        }
    }
}

/// Position of one column inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column width in bytes.
    pub width: usize,
    /// Offset from the start of the row.
    pub offset: usize,
}

/// Ordered attribute list with its precomputed row layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    attributes: Vec<AttributeType>,
    layout: Vec<ColumnLayout>,
    row_width: usize,
}

impl Schema {
    /// Build a schema and compute its column layout.
    pub fn new(attributes: Vec<AttributeType>) -> Self {
        let mut layout = Vec::with_capacity(attributes.len());
        let mut offset = 0usize;
        for attr in &attributes {
            let width = attr.width();
            layout.push(ColumnLayout { width, offset });
            offset += width;
        }

        Self {
            attributes,
            layout,
            row_width: offset,
        }
    }

    /// Attributes in column order.
    #[inline]
    pub fn attributes(&self) -> &[AttributeType] {
        &self.attributes
    }

    /// `(width, offset)` of each column, indexed like `attributes()`.
    #[inline]
    pub fn layout(&self) -> &[ColumnLayout] {
        &self.layout
    }

    /// Sum of all attribute widths.
    #[inline]
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the schema has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate attributes together with their layout.
    pub fn columns(&self) -> impl Iterator<Item = (&AttributeType, &ColumnLayout)> {
        self.attributes.iter().zip(self.layout.iter())
    }
}

impl FromIterator<AttributeType> for Schema {
    fn from_iter<I: IntoIterator<Item = AttributeType>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

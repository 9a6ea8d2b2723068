//! Schema codec - length-prefixed JSON attribute list.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────┐
//! │ json_len     │ schema text                                  │
//! │ 4 bytes u32LE│ json_len bytes: [{"type":"Int"}, ...]        │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! A `json_len` of zero is not a schema: it marks an error frame, reported
//! as [`DecodedSchema::Empty`] without touching the JSON parser.
//!
//! # Example
//!
//! ```
//! use blastoise_client::codec::{DecodedSchema, SchemaCodec};
//! use blastoise_client::schema::{AttributeType, Schema};
//!
//! let schema = Schema::new(vec![AttributeType::Int, AttributeType::Char { len: 8 }]);
//! let bytes = SchemaCodec::encode(&schema).unwrap();
//!
//! match SchemaCodec::decode(&bytes).unwrap() {
//!     DecodedSchema::Schema { schema: decoded, consumed } => {
//!         assert_eq!(decoded, schema);
//!         assert_eq!(consumed, bytes.len());
//!     }
//!     DecodedSchema::Empty => unreachable!(),
//! }
//! ```

use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::protocol::{read_length_prefix, LENGTH_PREFIX_SIZE};
use crate::schema::{AttributeType, Schema};

/// Result of decoding the schema section of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedSchema {
    /// `json_len == 0`: the rest of the frame is an error message.
    Empty,
    /// A parsed schema and the number of bytes it occupied (prefix included).
    Schema { schema: Schema, consumed: usize },
}

/// Attribute as it appears in the schema text, before validation.
///
/// The server writes `len` as a string (`"len":"4"`), other producers as a
/// number, so it is kept untyped until [`parse_char_len`].
#[derive(Debug, Deserialize)]
struct RawAttribute {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    len: Option<serde_json::Value>,
}

/// Codec for the schema section of a success frame.
pub struct SchemaCodec;

impl SchemaCodec {
    /// Decode the length prefix and schema text at the start of `buf`.
    ///
    /// Bytes after the schema are ignored.
    ///
    /// # Errors
    ///
    /// - `FrameTooShort` if the prefix or the schema text is incomplete
    /// - `UnknownAttributeType` for a `type` other than `Int`, `Float`, `Char`
    /// - `MalformedAttribute` for anything else the parser rejects
    pub fn decode(buf: &[u8]) -> Result<DecodedSchema> {
        let json_len = read_length_prefix(buf).ok_or(ClientError::FrameTooShort {
            needed: LENGTH_PREFIX_SIZE,
            actual: buf.len(),
        })? as usize;

        if json_len == 0 {
            return Ok(DecodedSchema::Empty);
        }

        let consumed = LENGTH_PREFIX_SIZE + json_len;
        if buf.len() < consumed {
            return Err(ClientError::FrameTooShort {
                needed: consumed,
                actual: buf.len(),
            });
        }

        let schema = Self::parse_text(&buf[LENGTH_PREFIX_SIZE..consumed])?;
        Ok(DecodedSchema::Schema { schema, consumed })
    }

    /// Parse schema text (without the length prefix).
    pub fn parse_text(text: &[u8]) -> Result<Schema> {
        let raw: Vec<RawAttribute> = serde_json::from_slice(text)
            .map_err(|e| ClientError::MalformedAttribute(format!("invalid schema text: {}", e)))?;

        raw.into_iter()
            .enumerate()
            .map(|(index, attr)| to_attribute(index, attr))
            .collect::<Result<Vec<_>>>()
            .map(Schema::new)
    }

    /// Encode a schema as length prefix + JSON text.
    pub fn encode(schema: &Schema) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        Self::encode_into(schema, &mut buf)?;
        Ok(buf)
    }

    /// Append the encoded schema to `buf`.
    pub fn encode_into(schema: &Schema, buf: &mut Vec<u8>) -> Result<()> {
        let text = serde_json::to_vec(schema.attributes())?;
        let json_len = u32::try_from(text.len()).map_err(|_| ClientError::FrameTooLarge {
            size: text.len(),
            max: u32::MAX as usize,
        })?;

        buf.reserve(LENGTH_PREFIX_SIZE + text.len());
        buf.extend_from_slice(&json_len.to_le_bytes());
        buf.extend_from_slice(&text);
        Ok(())
    }
}

fn to_attribute(index: usize, raw: RawAttribute) -> Result<AttributeType> {
    match raw.kind.as_str() {
        "Int" => Ok(AttributeType::Int),
        "Float" => Ok(AttributeType::Float),
        "Char" => Ok(AttributeType::Char {
            len: parse_char_len(index, raw.len.as_ref())?,
        }),
        _ => Err(ClientError::UnknownAttributeType(raw.kind)),
    }
}

fn parse_char_len(index: usize, len: Option<&serde_json::Value>) -> Result<u32> {
    let parsed = match len {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed.and_then(|l| u32::try_from(l).ok()) {
        Some(l) if l > 0 => Ok(l),
        _ => Err(ClientError::MalformedAttribute(format!(
            "attribute {}: Char requires a positive integer len, got {}",
            index,
            len.map_or_else(|| "nothing".to_string(), |v| v.to_string())
        ))),
    }
}

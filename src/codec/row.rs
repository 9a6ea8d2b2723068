//! Row codec - fixed-width binary rows.
//!
//! A row is the concatenation of its columns at the offsets from
//! [`Schema::layout`]:
//!
//! - `Int`: 4 bytes, u32 little-endian
//! - `Float`: 4 bytes, f32 little-endian
//! - `Char { len }`: `len` bytes, right-padded with `0x00`
//!
//! # Example
//!
//! ```
//! use blastoise_client::codec::RowCodec;
//! use blastoise_client::row::{Row, Value};
//! use blastoise_client::schema::{AttributeType, Schema};
//!
//! let schema = Schema::new(vec![AttributeType::Int, AttributeType::Char { len: 4 }]);
//! let row = Row::new(vec![Value::Int(1), Value::from("ab")]);
//!
//! let bytes = RowCodec::encode_row(&schema, &row).unwrap();
//! assert_eq!(bytes, [1, 0, 0, 0, b'a', b'b', 0, 0]);
//! assert_eq!(RowCodec::decode_row(&schema, &bytes, 0).unwrap(), row);
//! ```

use crate::error::{ClientError, Result};
use crate::row::{Row, Value};
use crate::schema::{AttributeType, Schema};

/// Codec for individual rows of a success frame.
pub struct RowCodec;

impl RowCodec {
    /// Byte width of one row of `schema`.
    #[inline]
    pub fn row_width(schema: &Schema) -> usize {
        schema.row_width()
    }

    /// Decode the row starting at `offset` in `buf`.
    ///
    /// # Errors
    ///
    /// - `TruncatedRow` if a column extends past the end of `buf`
    /// - `InvalidText` if a `Char` column is not UTF-8
    pub fn decode_row(schema: &Schema, buf: &[u8], offset: usize) -> Result<Row> {
        let mut values = Vec::with_capacity(schema.len());

        for (column, (attr, layout)) in schema.columns().enumerate() {
            let start = offset
                .checked_add(layout.offset)
                .ok_or(ClientError::TruncatedRow {
                    offset,
                    needed: layout.width,
                    available: 0,
                })?;
            let bytes = column_bytes(buf, start, layout.width)?;

            let value = match attr {
                AttributeType::Int => Value::Int(u32::from_le_bytes(to_word(bytes))),
                AttributeType::Float => Value::Float(f32::from_le_bytes(to_word(bytes))),
                AttributeType::Char { .. } => Value::Text(decode_text(column, bytes)?),
            };
            values.push(value);
        }

        Ok(Row::new(values))
    }

    /// Encode `row` as exactly `row_width(schema)` bytes.
    pub fn encode_row(schema: &Schema, row: &Row) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(schema.row_width());
        Self::encode_row_into(schema, row, &mut buf)?;
        Ok(buf)
    }

    /// Append the encoded row to `buf`.
    ///
    /// On error `buf` is left at its original length.
    ///
    /// # Errors
    ///
    /// - `ArityMismatch` if the row and schema have different lengths
    /// - `TypeMismatch` if a value does not fit its attribute type
    /// - `ValueTooLong` if text exceeds its column width
    pub fn encode_row_into(schema: &Schema, row: &Row, buf: &mut Vec<u8>) -> Result<()> {
        if row.len() != schema.len() {
            return Err(ClientError::ArityMismatch {
                expected: schema.len(),
                actual: row.len(),
            });
        }

        let start = buf.len();
        let result = encode_values(schema, row, buf);
        if result.is_err() {
            buf.truncate(start);
        }
        result
    }
}

fn encode_values(schema: &Schema, row: &Row, buf: &mut Vec<u8>) -> Result<()> {
    buf.reserve(schema.row_width());

    for (column, (attr, value)) in schema.attributes().iter().zip(row.values()).enumerate() {
        match (attr, value) {
            (AttributeType::Int, Value::Int(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (AttributeType::Float, Value::Float(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (AttributeType::Char { len }, Value::Text(text)) => {
                let max = *len as usize;
                let bytes = text.as_bytes();
                if bytes.len() > max {
                    return Err(ClientError::ValueTooLong {
                        column,
                        len: bytes.len(),
                        max,
                    });
                }
                buf.extend_from_slice(bytes);
                buf.resize(buf.len() + (max - bytes.len()), 0);
            }
            _ => {
                return Err(ClientError::TypeMismatch {
                    column,
                    expected: attr.name(),
                })
            }
        }
    }

    Ok(())
}

#[inline]
fn column_bytes(buf: &[u8], start: usize, width: usize) -> Result<&[u8]> {
    let available = buf.len().saturating_sub(start);
    if available < width {
        return Err(ClientError::TruncatedRow {
            offset: start,
            needed: width,
            available,
        });
    }
    Ok(&buf[start..start + width])
}

#[inline]
fn to_word(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

/// Strip right-side NUL padding only; embedded NULs are part of the value.
fn decode_text(column: usize, bytes: &[u8]) -> Result<String> {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8(bytes[..end].to_vec()).map_err(|_| ClientError::InvalidText { column })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_char_schema() -> Schema {
        Schema::new(vec![AttributeType::Int, AttributeType::Char { len: 4 }])
    }

    #[test]
    fn test_decode_int_char_row() {
        let schema = int_char_schema();
        assert_eq!(RowCodec::row_width(&schema), 8);

        let bytes = [0x01, 0x00, 0x00, 0x00, b'a', b'b', 0x00, 0x00];
        let row = RowCodec::decode_row(&schema, &bytes, 0).unwrap();

        assert_eq!(row.values(), &[Value::Int(1), Value::from("ab")]);
    }

    #[test]
    fn test_decode_at_offset() {
        let schema = int_char_schema();
        let mut buf = vec![0xEE; 3];
        buf.extend_from_slice(&[0x2A, 0x00, 0x00, 0x00, b'w', b'x', b'y', b'z']);

        let row = RowCodec::decode_row(&schema, &buf, 3).unwrap();
        assert_eq!(row.values(), &[Value::Int(42), Value::from("wxyz")]);
    }

    #[test]
    fn test_decode_little_endian() {
        let schema = Schema::new(vec![AttributeType::Int, AttributeType::Float]);
        let mut buf = 0x0403_0201u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&1.5f32.to_le_bytes());

        assert_eq!(&buf[..4], &[0x01, 0x02, 0x03, 0x04]);
        let row = RowCodec::decode_row(&schema, &buf, 0).unwrap();
        assert_eq!(row.values(), &[Value::Int(0x0403_0201), Value::Float(1.5)]);
    }

    #[test]
    fn test_decode_keeps_embedded_nul() {
        let schema = Schema::new(vec![AttributeType::Char { len: 6 }]);
        let bytes = [b'a', 0x00, b'b', 0x00, 0x00, 0x00];

        let row = RowCodec::decode_row(&schema, &bytes, 0).unwrap();
        assert_eq!(row.get(0).and_then(Value::as_text), Some("a\0b"));
    }

    #[test]
    fn test_decode_all_nul_is_empty_text() {
        let schema = Schema::new(vec![AttributeType::Char { len: 3 }]);
        let row = RowCodec::decode_row(&schema, &[0, 0, 0], 0).unwrap();
        assert_eq!(row.get(0), Some(&Value::from("")));
    }

    #[test]
    fn test_decode_truncated_numeric() {
        let schema = Schema::new(vec![AttributeType::Char { len: 2 }, AttributeType::Int]);
        let err = RowCodec::decode_row(&schema, &[b'o', b'k', 1, 0], 0).unwrap_err();

        assert!(matches!(
            err,
            ClientError::TruncatedRow {
                offset: 2,
                needed: 4,
                available: 2
            }
        ));
    }

    #[test]
    fn test_decode_offset_past_end() {
        let schema = Schema::new(vec![AttributeType::Float]);
        let err = RowCodec::decode_row(&schema, &[0; 4], 10).unwrap_err();
        assert!(matches!(err, ClientError::TruncatedRow { available: 0, .. }));
    }

    #[test]
    fn test_decode_offset_overflow() {
        let schema = Schema::new(vec![AttributeType::Int, AttributeType::Float]);
        let err = RowCodec::decode_row(&schema, &[0; 8], usize::MAX - 1).unwrap_err();
        assert!(matches!(
            err,
            ClientError::TruncatedRow {
                offset,
                needed: 4,
                available: 0
            } if offset == usize::MAX - 1
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let schema = Schema::new(vec![AttributeType::Int, AttributeType::Char { len: 2 }]);
        let err = RowCodec::decode_row(&schema, &[0, 0, 0, 0, 0xFF, 0xFE], 0).unwrap_err();
        assert!(matches!(err, ClientError::InvalidText { column: 1 }));
    }

    #[test]
    fn test_encode_pads_text() {
        let schema = Schema::new(vec![AttributeType::Char { len: 5 }, AttributeType::Float]);
        let row = Row::new(vec![Value::from("hi"), Value::Float(-2.0)]);

        let bytes = RowCodec::encode_row(&schema, &row).unwrap();
        let mut expected = vec![b'h', b'i', 0, 0, 0];
        expected.extend_from_slice(&(-2.0f32).to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_exact_fit() {
        let schema = Schema::new(vec![AttributeType::Char { len: 3 }]);
        let row = Row::new(vec![Value::from("abc")]);
        assert_eq!(RowCodec::encode_row(&schema, &row).unwrap(), b"abc");
    }

    #[test]
    fn test_encode_value_too_long() {
        let schema = int_char_schema();
        let row = Row::new(vec![Value::Int(1), Value::from("abcde")]);

        let err = RowCodec::encode_row(&schema, &row).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ValueTooLong {
                column: 1,
                len: 5,
                max: 4
            }
        ));
    }

    #[test]
    fn test_encode_into_rolls_back_on_error() {
        let schema = int_char_schema();
        let mut buf = vec![9, 9];
        let row = Row::new(vec![Value::Int(1), Value::from("too long")]);

        assert!(RowCodec::encode_row_into(&schema, &row, &mut buf).is_err());
        assert_eq!(buf, vec![9, 9]);
    }

    #[test]
    fn test_encode_arity_mismatch() {
        let schema = int_char_schema();
        let row = Row::new(vec![Value::Int(1)]);
        let err = RowCodec::encode_row(&schema, &row).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ArityMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_encode_type_mismatch() {
        let schema = int_char_schema();
        let row = Row::new(vec![Value::Float(1.0), Value::from("x")]);
        let err = RowCodec::encode_row(&schema, &row).unwrap_err();
        assert!(matches!(
            err,
            ClientError::TypeMismatch {
                column: 0,
                expected: "Int"
            }
        ));
    }

    #[test]
    fn test_encode_decode_mixed_row() {
        let schema = Schema::new(vec![
            AttributeType::Char { len: 10 },
            AttributeType::Int,
            AttributeType::Float,
            AttributeType::Char { len: 1 },
        ]);
        let row = Row::new(vec![
            Value::from("Dune"),
            Value::Int(u32::MAX),
            Value::Float(3.25),
            Value::from("y"),
        ]);

        let bytes = RowCodec::encode_row(&schema, &row).unwrap();
        assert_eq!(bytes.len(), RowCodec::row_width(&schema));
        assert_eq!(RowCodec::decode_row(&schema, &bytes, 0).unwrap(), row);
    }
}

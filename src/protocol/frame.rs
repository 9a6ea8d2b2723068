//! Response frame decoding and building.
//!
//! [`decode_frame`] classifies one raw frame (terminator included) as
//! [`Frame::Success`] or [`Frame::Error`]. The builders produce byte-exact
//! frames in the server's format.
//!
//! # Example
//!
//! ```
//! use blastoise_client::protocol::{build_success_frame, decode_frame, Frame};
//! use blastoise_client::row::{Row, Value};
//! use blastoise_client::schema::{AttributeType, Schema};
//!
//! let schema = Schema::new(vec![AttributeType::Int]);
//! let rows = vec![Row::new(vec![Value::Int(7)])];
//! let bytes = build_success_frame(&schema, &rows).unwrap();
//!
//! match decode_frame(&bytes).unwrap() {
//!     Frame::Success { rows: decoded, .. } => assert_eq!(decoded, rows),
//!     Frame::Error { message } => panic!("server error: {}", message),
//! }
//! ```

use crate::codec::{DecodedSchema, RowCodec, SchemaCodec};
use crate::error::{ClientError, Result};
use crate::row::Row;
use crate::schema::Schema;

use super::wire_format::{ends_with_terminator, LENGTH_PREFIX_SIZE, TERMINATOR, TERMINATOR_SIZE};

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Query succeeded; rows are in server emission order.
    Success { schema: Schema, rows: Vec<Row> },
    /// Server rejected the query.
    Error { message: String },
}

impl Frame {
    /// Check if this is a success frame.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Frame::Success { .. })
    }

    /// Check if this is an error frame.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Error { .. })
    }

    /// Convert into a query result, turning an error frame into
    /// [`ClientError::ServerReportedError`].
    pub fn into_result(self) -> Result<QueryResult> {
        match self {
            Frame::Success { schema, rows } => Ok(QueryResult { schema, rows }),
            Frame::Error { message } => Err(ClientError::ServerReportedError { message }),
        }
    }
}

/// Schema and rows of a successful query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column types of every row.
    pub schema: Schema,
    /// Rows in server emission order.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode one complete raw frame.
///
/// # Errors
///
/// - `FrameTooShort` if the length prefix or schema text is incomplete
/// - `UnknownAttributeType` / `MalformedAttribute` from the schema codec
/// - `ZeroWidthSchema` if the schema has no columns
/// - `MissingTerminator` if the frame does not end with `\r\n`
/// - `MisalignedPayload` if the payload is not a whole number of rows
/// - `TruncatedRow` / `InvalidText` from the row codec
///
/// An error frame never fails to decode.
pub fn decode_frame(raw: &[u8]) -> Result<Frame> {
    match SchemaCodec::decode(raw)? {
        DecodedSchema::Empty => Ok(Frame::Error {
            message: text_body(&raw[LENGTH_PREFIX_SIZE..]),
        }),
        DecodedSchema::Schema { schema, consumed } => {
            let rows = decode_rows(&schema, &raw[consumed..])?;
            Ok(Frame::Success { schema, rows })
        }
    }
}

/// Decode the row payload that follows the schema. `body` still carries the terminator.
fn decode_rows(schema: &Schema, body: &[u8]) -> Result<Vec<Row>> {
    let row_width = RowCodec::row_width(schema);
    if row_width == 0 {
        return Err(ClientError::ZeroWidthSchema);
    }

    // Checked before alignment, otherwise a missing terminator is reported
    // as a misaligned payload.
    if !ends_with_terminator(body) {
        return Err(ClientError::MissingTerminator);
    }

    let payload = &body[..body.len() - TERMINATOR_SIZE];
    if payload.len() % row_width != 0 {
        return Err(ClientError::MisalignedPayload {
            payload_len: payload.len(),
            row_width,
        });
    }

    let row_count = payload.len() / row_width;
    let mut rows = Vec::with_capacity(row_count);
    for i in 0..row_count {
        rows.push(RowCodec::decode_row(schema, payload, i * row_width)?);
    }
    Ok(rows)
}

/// Text of an error frame or of a plain-text reply.
///
/// The server writes these as C strings, so trailing NULs are dropped
/// along with the terminator.
pub(crate) fn text_body(body: &[u8]) -> String {
    let body = body.strip_suffix(TERMINATOR).unwrap_or(body);
    let end = body.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&body[..end]).into_owned()
}

/// Build a success frame for `schema` and `rows`.
pub fn build_success_frame(schema: &Schema, rows: &[Row]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    SchemaCodec::encode_into(schema, &mut buf)?;
    buf.reserve(rows.len() * schema.row_width() + TERMINATOR_SIZE);
    for row in rows {
        RowCodec::encode_row_into(schema, row, &mut buf)?;
    }
    buf.extend_from_slice(TERMINATOR);
    Ok(buf)
}

/// Build an error frame carrying `message`.
///
/// # Example
///
/// ```
/// use blastoise_client::protocol::build_error_frame;
///
/// assert_eq!(build_error_frame("bad"), b"\x00\x00\x00\x00bad\r\n");
/// ```
pub fn build_error_frame(message: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + message.len() + TERMINATOR_SIZE);
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(message.as_bytes());
    buf.extend_from_slice(TERMINATOR);
    buf
}

//! Error types for blastoise-client.

use thiserror::Error;

/// Main error type for all client operations.
///
/// Structural variants (`FrameTooShort` through `InvalidText`) are fatal for
/// the frame being decoded but leave the connection usable.
/// [`ClientError::ServerReportedError`] is the normal outcome of a rejected
/// query and is not a protocol fault.
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (schema encoding, config parsing).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame is shorter than its length prefix requires.
    #[error("frame too short: need {needed} bytes, got {actual}")]
    FrameTooShort { needed: usize, actual: usize },

    /// Not enough bytes left for an attribute of a row.
    #[error("truncated row at offset {offset}: need {needed} bytes, only {available} remaining")]
    TruncatedRow {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Row payload length is not a multiple of the row width.
    #[error("misaligned payload: {payload_len} bytes is not a multiple of row width {row_width}")]
    MisalignedPayload { payload_len: usize, row_width: usize },

    /// Frame does not end with the `\r\n` terminator.
    #[error("missing frame terminator")]
    MissingTerminator,

    /// Schema has no attributes, so row count is undefined.
    #[error("schema has zero row width")]
    ZeroWidthSchema,

    /// Accumulated bytes exceeded the frame size limit without a terminator.
    #[error("frame size {size} exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// `Char` column bytes are not valid UTF-8.
    #[error("invalid UTF-8 text in column {column}")]
    InvalidText { column: usize },

    /// Schema names an attribute type this client does not know.
    #[error("unknown attribute type {0:?}")]
    UnknownAttributeType(String),

    /// Schema text or one of its attributes could not be understood.
    #[error("malformed attribute: {0}")]
    MalformedAttribute(String),

    /// Error frame sent by the server (e.g. invalid SQL).
    #[error("server error: {message}")]
    ServerReportedError { message: String },

    /// Text value does not fit its fixed-width column.
    #[error("value too long for column {column}: {len} bytes exceeds {max}")]
    ValueTooLong {
        column: usize,
        len: usize,
        max: usize,
    },

    /// Row has a different number of values than the schema has attributes.
    #[error("row has {actual} values, schema has {expected} attributes")]
    ArityMismatch { expected: usize, actual: usize },

    /// Value kind does not match the attribute type of its column.
    #[error("value for column {column} does not match attribute type {expected}")]
    TypeMismatch { column: usize, expected: &'static str },

    /// Query text cannot be sent as a single request line.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No complete frame arrived within the read timeout.
    #[error("timed out waiting for response frame")]
    Timeout,

    /// Connection closed before a complete frame was received.
    #[error("connection closed")]
    ConnectionClosed,

    /// A previous read timed out; the stream may still carry its late frame.
    #[error("connection poisoned by an earlier timeout")]
    ConnectionPoisoned,
}

impl ClientError {
    /// Check if this is the server's explicit error frame.
    #[inline]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ClientError::ServerReportedError { .. })
    }

    /// Check if this error means the received frame was corrupted or not understood.
    pub fn is_frame_corruption(&self) -> bool {
        matches!(
            self,
            ClientError::FrameTooShort { .. }
                | ClientError::TruncatedRow { .. }
                | ClientError::MisalignedPayload { .. }
                | ClientError::MissingTerminator
                | ClientError::ZeroWidthSchema
                | ClientError::FrameTooLarge { .. }
                | ClientError::InvalidText { .. }
                | ClientError::UnknownAttributeType(_)
                | ClientError::MalformedAttribute(_)
        )
    }
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

//! Wire format constants and primitives.
//!
//! Response frames:
//! ```text
//! ┌──────────────┬──────────────┬───────────────────┬────────────┐
//! │ json_len     │ schema text  │ rows              │ terminator │
//! │ 4 bytes u32LE│ json_len     │ N × row_width     │ "\r\n"     │
//! └──────────────┴──────────────┴───────────────────┴────────────┘
//!
//! ┌──────────────┬───────────────────────────────────┬────────────┐
//! │ 0u32 LE      │ error message                     │ "\r\n"     │
//! └──────────────┴───────────────────────────────────┴────────────┘
//! ```
//!
//! Requests are plain query text followed by `\n`.
//!
//! All multi-byte integers are Little Endian.

use crate::error::{ClientError, Result};

/// Size of the `json_len` prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Sequence that ends every response frame.
pub const TERMINATOR: &[u8; 2] = b"\r\n";

/// Length of [`TERMINATOR`].
pub const TERMINATOR_SIZE: usize = TERMINATOR.len();

/// Byte that ends a request.
pub const REQUEST_DELIMITER: u8 = b'\n';

/// Default maximum accumulated frame size (64 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Read the little-endian `json_len` prefix.
///
/// Returns `None` if buffer is too short.
///
/// # Example
///
/// ```
/// use blastoise_client::protocol::read_length_prefix;
///
/// assert_eq!(read_length_prefix(&[0x10, 0x00, 0x00, 0x00, b'[']), Some(16));
/// assert_eq!(read_length_prefix(&[0x10, 0x00]), None);
/// ```
#[inline]
pub fn read_length_prefix(buf: &[u8]) -> Option<u32> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return None;
    }
    Some(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Check if `buf` ends with the frame terminator.
#[inline]
pub fn ends_with_terminator(buf: &[u8]) -> bool {
    buf.ends_with(TERMINATOR)
}

/// Encode a query as a request line.
///
/// The server reads up to the first `\r` or `\n`, so a query containing
/// either cannot be sent intact.
///
/// # Example
///
/// ```
/// use blastoise_client::protocol::encode_request;
///
/// assert_eq!(encode_request("select * from book").unwrap(), b"select * from book\n");
/// assert!(encode_request("select *\nfrom book").is_err());
/// ```
pub fn encode_request(query: &str) -> Result<Vec<u8>> {
    if query.trim().is_empty() {
        return Err(ClientError::InvalidQuery("query is empty".to_string()));
    }
    if query.bytes().any(|b| b == b'\r' || b == REQUEST_DELIMITER) {
        return Err(ClientError::InvalidQuery(
            "query must not contain line breaks".to_string(),
        ));
    }

    let mut buf = Vec::with_capacity(query.len() + 1);
    buf.extend_from_slice(query.as_bytes());
    buf.push(REQUEST_DELIMITER);
    Ok(buf)
}

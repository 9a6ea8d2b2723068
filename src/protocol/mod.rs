//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the response side of the protocol:
//! - length prefix and terminator constants, request encoding
//! - frame reader for accumulating partial reads up to `\r\n`
//! - frame decoder and builders

mod frame;
mod frame_reader;
mod wire_format;

pub use frame::{build_error_frame, build_success_frame, decode_frame, Frame, QueryResult};
pub(crate) use frame::text_body;
pub use frame_reader::{FrameReader, DEFAULT_BUFFER_CAPACITY};
pub use wire_format::{
    encode_request, ends_with_terminator, read_length_prefix, DEFAULT_MAX_FRAME_SIZE,
    LENGTH_PREFIX_SIZE, REQUEST_DELIMITER, TERMINATOR, TERMINATOR_SIZE,
};

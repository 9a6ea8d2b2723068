//! Transport module - TCP connection and frame read loop.
//!
//! The read loop is generic over `AsyncRead`, so it runs the same over a
//! `TcpStream` or an in-memory `tokio::io::duplex` pipe.

mod tcp;

pub use tcp::{connect, read_frame};

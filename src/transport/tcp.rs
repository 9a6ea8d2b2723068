//! TCP transport and the frame read loop.
//!
//! # Example
//!
//! ```ignore
//! use blastoise_client::protocol::FrameReader;
//! use blastoise_client::transport::{connect, read_frame};
//!
//! let mut stream = connect("127.0.0.1:8080", None).await?;
//! let mut frames = FrameReader::new();
//! let raw = read_frame(&mut stream, &mut frames, 64 * 1024, None).await?;
//! ```

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;

use crate::error::{ClientError, Result};
use crate::protocol::FrameReader;

/// Open a TCP connection to `addr`, optionally bounded by `timeout`.
///
/// `TCP_NODELAY` is set since every request is a single short line.
pub async fn connect(addr: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let stream = match timeout {
        Some(limit) => tokio::time::timeout(limit, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout)??,
        None => TcpStream::connect(addr).await?,
    };

    stream.set_nodelay(true)?;
    tracing::debug!("Connected to {}", addr);
    Ok(stream)
}

/// Read exactly one raw frame from `reader`.
///
/// Bytes already buffered in `frames` are checked first. The `timeout`
/// covers the whole frame, not each chunk.
///
/// # Errors
///
/// - `Timeout` if the frame is not complete in time
/// - `ConnectionClosed` on EOF before a terminator
/// - `FrameTooLarge` from the frame reader
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    frames: &mut FrameReader,
    chunk_size: usize,
    timeout: Option<Duration>,
) -> Result<Bytes> {
    if let Some(frame) = frames.try_extract()? {
        return Ok(frame);
    }

    match timeout {
        Some(limit) => tokio::time::timeout(limit, read_loop(reader, frames, chunk_size))
            .await
            .map_err(|_| ClientError::Timeout)?,
        None => read_loop(reader, frames, chunk_size).await,
    }
}

async fn read_loop<R: AsyncRead + Unpin>(
    reader: &mut R,
    frames: &mut FrameReader,
    chunk_size: usize,
) -> Result<Bytes> {
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("Connection closed with {} bytes buffered", frames.len());
                return Err(ClientError::ConnectionClosed);
            }
            Ok(n) => n,
            Err(e) => return Err(ClientError::Io(e)),
        };

        tracing::trace!("Read {} bytes", n);
        if let Some(frame) = frames.push(&buf[..n])? {
            return Ok(frame);
        }
    }
}

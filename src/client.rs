//! Client builder, configuration and connection handle.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring and opening a
//! [`Connection`]. A connection runs one request at a time:
//! 1. Encode the query as a `\n`-terminated line and write it
//! 2. Read until the `\r\n` terminator
//! 3. Decode the frame into a schema and rows, or a server error
//!
//! # Example
//!
//! ```ignore
//! use blastoise_client::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = Client::builder()
//!         .host("127.0.0.1")
//!         .port(8080)
//!         .read_timeout(Duration::from_secs(5))
//!         .connect()
//!         .await?;
//!
//!     let result = conn.query("select * from book").await?;
//!     for row in &result.rows {
//!         println!("{:?}", row.values());
//!     }
//!
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{ClientError, Result};
use crate::protocol::{
    decode_frame, encode_request, text_body, Frame, FrameReader, QueryResult,
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FRAME_SIZE,
};
use crate::transport::{connect, read_frame};

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default size of a single socket read (64 KB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Table listing command. Its reply is plain text, not a schema frame.
const SHOW_TABLES: &str = "show tables";

/// Connection settings.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use blastoise_client::ClientConfig;
///
/// let config = ClientConfig::from_json_str(r#"{"port": 9000, "read_timeout_ms": 2500}"#).unwrap();
/// assert_eq!(config.address(), "127.0.0.1:9000");
/// assert_eq!(config.read_timeout().unwrap().as_millis(), 2500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host name or IP.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connect timeout in milliseconds (`None` = wait indefinitely).
    pub connect_timeout_ms: Option<u64>,
    /// Per-frame read timeout in milliseconds (`None` = wait indefinitely).
    pub read_timeout_ms: Option<u64>,
    /// Size of a single socket read.
    pub read_chunk_size: usize,
    /// Maximum accumulated frame size.
    pub max_frame_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ClientConfig {
    /// Parse a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `host:port` string used to connect.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

/// Builder for configuring and opening a connection.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Set the server host.
    ///
    /// Default: 127.0.0.1
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port.
    ///
    /// Default: 8080
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = Some(duration_ms(timeout));
        self
    }

    /// Set the read timeout for each response frame.
    ///
    /// Without one, a stalled server blocks `query()` indefinitely.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout_ms = Some(duration_ms(timeout));
        self
    }

    /// Set the socket read size.
    ///
    /// Default: 64KB
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Set the maximum response frame size.
    ///
    /// Default: 64MB
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Get the config built so far.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a TCP connection with this configuration.
    pub async fn connect(self) -> Result<Connection> {
        Connection::connect(self.config).await
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Entry point for building connections.
#[derive(Debug)]
pub struct Client;

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Connect with the given config.
    pub async fn connect(config: ClientConfig) -> Result<Connection> {
        Connection::connect(config).await
    }
}

/// An open connection to the server.
///
/// `query` takes `&mut self`, so at most one request is in flight per
/// connection. Dropping the connection closes the socket; [`Connection::close`]
/// also shuts down the write half first so the server sees a clean disconnect.
pub struct Connection<S = TcpStream> {
    stream: S,
    frames: FrameReader,
    config: ClientConfig,
    /// Set after a read timeout: the late frame may still arrive.
    poisoned: bool,
}

impl Connection<TcpStream> {
    /// Open a TCP connection described by `config`.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let stream = connect(&config.address(), config.connect_timeout()).await?;
        Ok(Self::from_stream(stream, config))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S, config: ClientConfig) -> Self {
        let frames = FrameReader::with_capacity_and_max_frame(
            DEFAULT_BUFFER_CAPACITY,
            config.max_frame_size,
        );
        Self {
            stream,
            frames,
            config,
            poisoned: false,
        }
    }

    /// Send `query` and return its result set.
    ///
    /// # Errors
    ///
    /// - `ServerReportedError` if the server rejected the query
    /// - any structural decode error for a corrupted frame
    /// - `Timeout`, `ConnectionClosed`, `Io` from the transport
    pub async fn query(&mut self, query: &str) -> Result<QueryResult> {
        self.execute(query).await?.into_result()
    }

    /// Send `query` and return the decoded frame without converting error frames.
    pub async fn execute(&mut self, query: &str) -> Result<Frame> {
        self.send_query(query).await?;
        self.read_response().await
    }

    /// Write one request line.
    ///
    /// Bytes still buffered from the previous response are discarded first.
    /// Bytes of that response still in flight are not: after a frame split
    /// early by an unescaped terminator (usually `MisalignedPayload`), the
    /// rest of it arrives as the next response. Reconnect in that case.
    pub async fn send_query(&mut self, query: &str) -> Result<()> {
        if self.poisoned {
            return Err(ClientError::ConnectionPoisoned);
        }

        let request = encode_request(query)?;

        if !self.frames.is_empty() {
            tracing::warn!(
                "Discarding {} stale bytes left from the previous response",
                self.frames.len()
            );
            self.frames.clear();
        }

        tracing::debug!("Sending query {:?}", query);
        self.stream.write_all(&request).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read and decode exactly one response frame.
    pub async fn read_response(&mut self) -> Result<Frame> {
        let raw = self.read_raw().await?;

        tracing::debug!("Received frame of {} bytes", raw.len());
        let frame = decode_frame(&raw);
        match &frame {
            Ok(Frame::Success { rows, .. }) => tracing::debug!("Decoded {} rows", rows.len()),
            Ok(Frame::Error { message }) => tracing::debug!("Server error: {}", message),
            Err(e) => tracing::debug!("Frame decode failed: {}", e),
        }
        frame
    }

    /// List the server's tables.
    ///
    /// The reply is returned as text with the terminator and trailing NULs
    /// removed. It is never decoded as a frame.
    pub async fn show_tables(&mut self) -> Result<String> {
        self.send_query(SHOW_TABLES).await?;
        let raw = self.read_raw().await?;
        Ok(text_body(&raw))
    }

    /// Read one raw frame.
    ///
    /// A timeout or an oversized frame leaves the rest of the response on
    /// the socket, so both poison the connection.
    async fn read_raw(&mut self) -> Result<Bytes> {
        if self.poisoned {
            return Err(ClientError::ConnectionPoisoned);
        }

        let result = read_frame(
            &mut self.stream,
            &mut self.frames,
            self.config.read_chunk_size,
            self.config.read_timeout(),
        )
        .await;

        if let Err(e @ (ClientError::Timeout | ClientError::FrameTooLarge { .. })) = &result {
            tracing::warn!("Connection poisoned: {}", e);
            self.poisoned = true;
            self.frames.clear();
        }
        result
    }
    /// Check if a previous timeout made this connection unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Configuration this connection was opened with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shut down the write half and close the connection.
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        tracing::debug!("Connection closed");
        Ok(())
    }

    /// Take back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

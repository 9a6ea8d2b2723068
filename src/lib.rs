//! # blastoise-client
//!
//! Rust client for the Blastoise tabular data server.
//!
//! The server answers each `\n`-terminated query with one response frame:
//! a length-prefixed JSON schema, fixed-width binary rows, and a `\r\n`
//! terminator. A zero length prefix turns the frame into an error message.
//!
//! ## Layers
//!
//! - [`schema`] / [`row`]: attribute types, schema layout, decoded values
//! - [`codec`]: schema and row codecs
//! - [`protocol`]: frame reader, frame decoder, frame builders
//! - [`transport`]: TCP connect and the frame read loop
//! - [`Connection`]: one-request-at-a-time connection handle
//!
//! ## Example
//!
//! ```ignore
//! use blastoise_client::{Client, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), blastoise_client::ClientError> {
//!     let mut conn = Client::builder().port(8080).connect().await?;
//!
//!     match conn.query("select * from book").await {
//!         Ok(result) => {
//!             for row in &result.rows {
//!                 println!("{:?}", row.values());
//!             }
//!         }
//!         Err(e) if e.is_server_error() => eprintln!("{}", e),
//!         Err(e) => return Err(e),
//!     }
//!
//!     conn.close().await
//! }
//! ```

pub mod codec;
pub mod error;
pub mod protocol;
pub mod row;
pub mod schema;
pub mod transport;

mod client;

pub use client::{
    Client, ClientBuilder, ClientConfig, Connection, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_READ_CHUNK_SIZE,
};
pub use error::{ClientError, Result};
pub use protocol::{Frame, QueryResult};
pub use row::{Row, Value};
pub use schema::{AttributeType, Schema};

//! Codec module - schema and row encoding/decoding.
//!
//! - [`SchemaCodec`] - length-prefixed JSON attribute list
//! - [`RowCodec`] - fixed-width binary rows laid out by a [`Schema`](crate::schema::Schema)
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects,
//! so the frame decoder calls them directly and the attribute dispatch stays
//! an exhaustive `match` over [`AttributeType`](crate::schema::AttributeType).

mod row;
mod schema;

pub use row::RowCodec;
pub use schema::{DecodedSchema, SchemaCodec};

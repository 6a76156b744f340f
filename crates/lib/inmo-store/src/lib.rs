//! Record and block models for inmo-mcp.
//!
//! This crate defines the shapes exchanged with the document store: records,
//! child blocks, tagged field values and collection query filters.

pub mod models;
pub mod query;
pub mod schema;
pub mod values;

pub use models::*;
pub use query::*;
pub use values::*;

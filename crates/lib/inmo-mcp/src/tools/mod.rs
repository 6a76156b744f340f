//! MCP tool modules.
//!
//! Tools are grouped by what they touch: collection records and the hub page.

pub mod hub;
pub mod records;

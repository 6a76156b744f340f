//! Core services for inmo-mcp.
//!
//! This crate owns the collection registry, the record store contract with its
//! hosted and in-memory implementations, and the hub control plane exposing the
//! upsert and summary-rebuild operations.

pub mod control;
pub mod locks;
pub mod registry;
pub mod store;

//! Record store contract and its implementations.
//!
//! The store layer issues single remote calls and surfaces failures unchanged:
//! no caching, no retries. `NotionStore` talks to the hosted API, `MemoryStore`
//! keeps everything in-process for development and tests.

use std::error::Error;
use std::fmt;
use std::future::Future;

use inmo_store::{Block, NewBlock, PropertyMap, Record, RecordQuery};

pub mod memory;
pub mod notion;

pub use memory::{MemoryStore, StoreCall};
pub use notion::{NotionConfig, NotionStore};

#[derive(Debug)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, TLS).
    Http(Box<reqwest::Error>),
    /// The store answered with a non-success status.
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// The store answered with a body that does not have the expected shape.
    Decode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "store request failed: {err}"),
            Self::Api {
                status,
                code,
                message,
            } => write!(f, "store error {status} ({code}): {message}"),
            Self::Decode(message) => write!(f, "unexpected store response: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Remote operations the hub needs from the document store.
///
/// Every method maps to exactly one remote call.
pub trait RecordStore: Clone + Send + Sync + 'static {
    /// Runs a single-page query against a collection.
    fn query(
        &self,
        collection_id: &str,
        query: &RecordQuery,
    ) -> impl Future<Output = StoreResult<Vec<Record>>> + Send;

    /// Creates a record in a collection.
    fn create(
        &self,
        collection_id: &str,
        properties: &PropertyMap,
    ) -> impl Future<Output = StoreResult<Record>> + Send;

    /// Writes the given fields onto an existing record.
    fn update(
        &self,
        record_id: &str,
        properties: &PropertyMap,
    ) -> impl Future<Output = StoreResult<Record>> + Send;

    /// Lists the first page of a node's live children.
    fn list_children(
        &self,
        node_id: &str,
        page_size: usize,
    ) -> impl Future<Output = StoreResult<Vec<Block>>> + Send;

    /// Appends nodes under a parent and returns the created nodes.
    fn append_children(
        &self,
        node_id: &str,
        children: &[NewBlock],
    ) -> impl Future<Output = StoreResult<Vec<Block>>> + Send;

    /// Soft-deletes a node.
    fn archive(&self, node_id: &str) -> impl Future<Output = StoreResult<()>> + Send;
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use inmo_store::{
    Block,
    NewBlock,
    PropertyMap,
    Record,
    RecordQuery,
    RecordSort,
    SortDirection,
    properties_payload,
    schema::CHILD_PAGE_SIZE,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult};

/// A remote-shaped call observed by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Query { collection_id: String },
    Create { collection_id: String },
    Update { record_id: String },
    ListChildren { node_id: String },
    AppendChildren { node_id: String, count: usize },
    Archive { node_id: String },
}

impl StoreCall {
    /// True for calls that mutate store state.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Update { .. } | Self::AppendChildren { .. } | Self::Archive { .. }
        )
    }
}

/// In-process store honoring the same contract as the hosted API.
///
/// Collections and parent nodes exist implicitly. Every trait call is appended
/// to a call log; the seeding and inspection helpers are not logged.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    records: HashMap<String, Vec<Record>>,
    blocks: HashMap<String, Block>,
    children: HashMap<String, Vec<String>>,
    calls: Vec<StoreCall>,
}

impl MemoryState {
    fn record_mut(&mut self, record_id: &str) -> Option<&mut Record> {
        self.records
            .values_mut()
            .flat_map(|records| records.iter_mut())
            .find(|record| record.id == record_id)
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::Api {
        status: 404,
        code: "object_not_found".to_string(),
        message: format!("Could not find object with ID: {id}"),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record without logging a call.
    pub async fn insert_record(&self, collection_id: &str, record: Record) {
        let mut state = self.inner.lock().await;
        state
            .records
            .entry(collection_id.to_string())
            .or_default()
            .push(record);
    }

    /// Snapshot of a collection, including archived records.
    pub async fn records(&self, collection_id: &str) -> Vec<Record> {
        let state = self.inner.lock().await;
        state.records.get(collection_id).cloned().unwrap_or_default()
    }

    /// Snapshot of every child of a node, including archived ones.
    pub async fn all_children(&self, node_id: &str) -> Vec<Block> {
        let state = self.inner.lock().await;
        state
            .children
            .get(node_id)
            .map(|ids| ids.iter().filter_map(|id| state.blocks.get(id).cloned()).collect())
            .unwrap_or_default()
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }
}

impl RecordStore for MemoryStore {
    async fn query(&self, collection_id: &str, query: &RecordQuery) -> StoreResult<Vec<Record>> {
        let mut state = self.inner.lock().await;
        state.calls.push(StoreCall::Query {
            collection_id: collection_id.to_string(),
        });

        let mut matched: Vec<Record> = state
            .records
            .get(collection_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.is_live())
                    .filter(|record| query.filter.as_ref().is_none_or(|filter| filter.matches(record)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for sort in query.sorts.iter().rev() {
            match sort {
                RecordSort::LastEdited(SortDirection::Ascending) => {
                    matched.sort_by(|a, b| a.last_edited_time.cmp(&b.last_edited_time));
                }
                RecordSort::LastEdited(SortDirection::Descending) => {
                    matched.sort_by(|a, b| b.last_edited_time.cmp(&a.last_edited_time));
                }
            }
        }

        matched.truncate(query.page_size.unwrap_or(CHILD_PAGE_SIZE).min(CHILD_PAGE_SIZE));
        Ok(matched)
    }

    async fn create(&self, collection_id: &str, properties: &PropertyMap) -> StoreResult<Record> {
        let mut state = self.inner.lock().await;
        state.calls.push(StoreCall::Create {
            collection_id: collection_id.to_string(),
        });

        let record = Record {
            id: new_id(),
            archived: false,
            in_trash: false,
            last_edited_time: Some(Utc::now()),
            properties: properties_payload(properties),
        };
        state
            .records
            .entry(collection_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, record_id: &str, properties: &PropertyMap) -> StoreResult<Record> {
        let mut state = self.inner.lock().await;
        state.calls.push(StoreCall::Update {
            record_id: record_id.to_string(),
        });

        let record = state.record_mut(record_id).ok_or_else(|| not_found(record_id))?;
        if !record.is_live() {
            return Err(StoreError::Api {
                status: 400,
                code: "validation_error".to_string(),
                message: "Can't edit block that is archived.".to_string(),
            });
        }
        record.properties.extend(properties_payload(properties));
        record.last_edited_time = Some(Utc::now());
        Ok(record.clone())
    }

    async fn list_children(&self, node_id: &str, page_size: usize) -> StoreResult<Vec<Block>> {
        let mut state = self.inner.lock().await;
        state.calls.push(StoreCall::ListChildren {
            node_id: node_id.to_string(),
        });

        let blocks = state
            .children
            .get(node_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.blocks.get(id))
                    .filter(|block| !block.archived && !block.in_trash)
                    .take(page_size.min(CHILD_PAGE_SIZE))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(blocks)
    }

    async fn append_children(&self, node_id: &str, children: &[NewBlock]) -> StoreResult<Vec<Block>> {
        let mut state = self.inner.lock().await;
        state.calls.push(StoreCall::AppendChildren {
            node_id: node_id.to_string(),
            count: children.len(),
        });

        if let Some(parent) = state.blocks.get(node_id)
            && parent.archived
        {
            return Err(StoreError::Api {
                status: 400,
                code: "validation_error".to_string(),
                message: "Can't edit block that is archived.".to_string(),
            });
        }

        let created: Vec<Block> = children
            .iter()
            .map(|child| Block::from_new(new_id(), child))
            .collect();
        for block in &created {
            state.blocks.insert(block.id.clone(), block.clone());
        }
        state
            .children
            .entry(node_id.to_string())
            .or_default()
            .extend(created.iter().map(|block| block.id.clone()));
        if let Some(parent) = state.blocks.get_mut(node_id) {
            parent.has_children = true;
        }
        Ok(created)
    }

    async fn archive(&self, node_id: &str) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state.calls.push(StoreCall::Archive {
            node_id: node_id.to_string(),
        });

        let block = state.blocks.get_mut(node_id).ok_or_else(|| not_found(node_id))?;
        block.archived = true;
        Ok(())
    }
}

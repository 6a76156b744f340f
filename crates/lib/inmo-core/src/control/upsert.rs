use std::fmt;

use inmo_store::{PropertyMap, RecordFilter, RecordQuery, UniqueValue};
use tracing::info;

use crate::store::RecordStore;

use super::{ControlError, HubControlPlane};

/// Input for a find-unique-or-create call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertRequest {
    pub db: String,
    pub unique_prop: String,
    pub unique_value: UniqueValue,
    pub properties: PropertyMap,
}

/// Which write the upsert performed, with the affected record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated(String),
    Created(String),
}

impl UpsertOutcome {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Updated(id) | Self::Created(id) => id,
        }
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated(id) => write!(f, "updated:{id}"),
            Self::Created(id) => write!(f, "created:{id}"),
        }
    }
}

impl<S: RecordStore> HubControlPlane<S> {
    /// Updates the first live record whose unique field equals the given value,
    /// or creates a new record when none matches.
    ///
    /// Only the first query result is consulted. Without single-writer mode two
    /// concurrent calls for the same value may both create a record.
    ///
    /// # Errors
    /// Returns `ControlError::UnknownCollection` before any store call when `db`
    /// is not configured, and `ControlError::Store` for any store failure.
    pub async fn upsert(&self, request: UpsertRequest) -> Result<UpsertOutcome, ControlError> {
        let UpsertRequest {
            db,
            unique_prop,
            unique_value,
            properties,
        } = request;

        let collection_id = self.resolve(&db)?;
        if unique_prop.trim().is_empty() {
            return Err(ControlError::InvalidInput("uniqueProp is required".to_string()));
        }

        let _guard = self.serialize(&collection_id).await;

        let query = RecordQuery::new().with_filter(RecordFilter::unique(unique_prop, unique_value));
        let matches = self.store.query(&collection_id, &query).await?;

        let outcome = match matches.first().filter(|record| record.is_live()) {
            Some(existing) => {
                self.store.update(&existing.id, &properties).await?;
                UpsertOutcome::Updated(existing.id.clone())
            }
            None => {
                let created = self.store.create(&collection_id, &properties).await?;
                UpsertOutcome::Created(created.id)
            }
        };

        info!(db = %db, result = %outcome, "upsert applied");
        Ok(outcome)
    }
}

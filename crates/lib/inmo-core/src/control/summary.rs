use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use inmo_store::schema::{
    CHILD_PAGE_SIZE,
    MILLIS_PER_DAY,
    SINCE_DAYS_DEFAULT,
    SINCE_DAYS_MAX,
    SINCE_DAYS_MIN,
    SUMMARY_BULLET_LIMIT,
    UNTITLED_PLACEHOLDER,
    summary_title,
};
use inmo_store::{NewBlock, Record, RecordFilter, RecordQuery, RecordSort, SortDirection};
use tracing::{debug, info};

use crate::store::{RecordStore, StoreError};

use super::{ControlError, HubControlPlane};

/// Input for a summary rebuild. Unset fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRequest {
    pub db: Option<String>,
    pub since_days: Option<u32>,
}

impl SummaryRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_db(mut self, db: impl Into<String>) -> Self {
        self.db = Some(db.into());
        self
    }

    #[must_use]
    pub const fn with_since_days(mut self, since_days: u32) -> Self {
        self.since_days = Some(since_days);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub bullet_count: usize,
    pub archived_count: usize,
    pub callout_id: String,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hub-updated:{}", self.bullet_count)
    }
}

impl<S: RecordStore> HubControlPlane<S> {
    /// Republishes the auto-summary callout under the hub.
    ///
    /// # Errors
    /// See [`Self::rebuild_hub_summary_at`].
    pub async fn rebuild_hub_summary(
        &self,
        request: SummaryRequest,
    ) -> Result<SummaryReport, ControlError> {
        self.rebuild_hub_summary_at(request, Utc::now()).await
    }

    /// Republishes the auto-summary callout using `now` as the window end.
    ///
    /// Steps run strictly in order: query recent records, list hub children,
    /// archive previous summaries, append the new callout, append its bullets.
    /// A failure leaves earlier steps applied.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` for a window outside 1..=90 days,
    /// `ControlError::UnknownCollection` before any store call when the
    /// collection is not configured, and `ControlError::Store` for store failures.
    pub async fn rebuild_hub_summary_at(
        &self,
        request: SummaryRequest,
        now: DateTime<Utc>,
    ) -> Result<SummaryReport, ControlError> {
        let since_days = request.since_days.unwrap_or(SINCE_DAYS_DEFAULT);
        if !(SINCE_DAYS_MIN..=SINCE_DAYS_MAX).contains(&since_days) {
            return Err(ControlError::InvalidInput(format!(
                "sinceDays must be between {SINCE_DAYS_MIN} and {SINCE_DAYS_MAX}, got {since_days}"
            )));
        }
        let db = request
            .db
            .unwrap_or_else(|| self.settings.default_collection.clone());
        let collection_id = self.resolve(&db)?;
        let hub_id = self.settings.hub_id.as_str();

        let _guard = self.serialize(hub_id).await;

        let cutoff = now - TimeDelta::milliseconds(i64::from(since_days) * MILLIS_PER_DAY);
        let query = RecordQuery::new()
            .with_filter(RecordFilter::EditedOnOrAfter(cutoff))
            .with_sort(RecordSort::LastEdited(SortDirection::Descending))
            .with_page_size(SUMMARY_BULLET_LIMIT);
        let recent = self.store.query(&collection_id, &query).await?;

        let children = self.store.list_children(hub_id, CHILD_PAGE_SIZE).await?;
        let mut archived_count = 0;
        for block in children.iter().filter(|block| block.is_auto_summary()) {
            self.store.archive(&block.id).await?;
            debug!(block_id = %block.id, "archived previous summary");
            archived_count += 1;
        }

        let created = self
            .store
            .append_children(hub_id, &[NewBlock::callout(summary_title(since_days))])
            .await?;
        let callout_id = created
            .last()
            .map(|block| block.id.clone())
            .ok_or_else(|| StoreError::Decode("append returned no blocks".to_string()))?;

        let bullets: Vec<NewBlock> = recent
            .iter()
            .take(SUMMARY_BULLET_LIMIT)
            .map(|record| NewBlock::bullet(display_name(record)))
            .collect();
        if !bullets.is_empty() {
            self.store.append_children(&callout_id, &bullets).await?;
        }

        let report = SummaryReport {
            bullet_count: bullets.len(),
            archived_count,
            callout_id,
        };
        info!(
            db = %db,
            since_days,
            bullets = report.bullet_count,
            archived = report.archived_count,
            callout_id = %report.callout_id,
            "hub summary rebuilt"
        );
        Ok(report)
    }
}

/// Bullet text for a record, falling back to the placeholder.
pub fn display_name(record: &Record) -> String {
    record.title_text().unwrap_or_else(|| {
        debug!(record_id = %record.id, "no usable title; using placeholder");
        UNTITLED_PLACEHOLDER.to_string()
    })
}

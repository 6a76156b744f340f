use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::models::{Record, property_plain_text};
use crate::schema::TIMESTAMP_LAST_EDITED;
use crate::values::UniqueValue;

/// Filter applied to a collection query.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    /// Equality on one field, with the condition kind taken from the value.
    PropertyEquals {
        property: String,
        value: UniqueValue,
    },
    /// Records last edited at or after the given instant.
    EditedOnOrAfter(DateTime<Utc>),
}

impl RecordFilter {
    #[must_use]
    pub fn unique(property: impl Into<String>, value: UniqueValue) -> Self {
        Self::PropertyEquals {
            property: property.into(),
            value,
        }
    }

    #[must_use]
    pub fn to_payload(&self) -> Value {
        match self {
            Self::PropertyEquals { property, value } => {
                let mut condition = Map::new();
                condition.insert(
                    value.kind().condition_key().to_string(),
                    serde_json::json!({ "equals": value.to_json() }),
                );
                condition.insert("property".to_string(), Value::from(property.as_str()));
                Value::Object(condition)
            }
            Self::EditedOnOrAfter(cutoff) => serde_json::json!({
                "timestamp": TIMESTAMP_LAST_EDITED,
                TIMESTAMP_LAST_EDITED: {
                    "on_or_after": cutoff.to_rfc3339_opts(SecondsFormat::Millis, true)
                }
            }),
        }
    }

    /// Evaluates the filter locally against a record.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::PropertyEquals { property, value } => record
                .properties
                .get(property)
                .is_some_and(|field| field_equals(field, value)),
            Self::EditedOnOrAfter(cutoff) => record
                .last_edited_time
                .is_some_and(|edited| edited >= *cutoff),
        }
    }
}

fn field_equals(field: &Value, value: &UniqueValue) -> bool {
    match value {
        UniqueValue::Number(expected) => field
            .get("number")
            .and_then(Value::as_f64)
            .zip(expected.as_f64())
            .is_some_and(|(actual, expected)| (actual - expected).abs() < f64::EPSILON),
        UniqueValue::Email(expected) => {
            field.get("email").and_then(Value::as_str) == Some(expected.as_str())
                || property_plain_text(field).as_deref() == Some(expected.as_str())
        }
        UniqueValue::Text(expected) => {
            property_plain_text(field).as_deref() == Some(expected.as_str())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// Sort order for a collection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSort {
    LastEdited(SortDirection),
}

impl RecordSort {
    #[must_use]
    pub fn to_payload(self) -> Value {
        match self {
            Self::LastEdited(direction) => serde_json::json!({
                "timestamp": TIMESTAMP_LAST_EDITED,
                "direction": direction.as_str()
            }),
        }
    }
}

/// A single-page collection query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub filter: Option<RecordFilter>,
    pub sorts: Vec<RecordSort>,
    pub page_size: Option<usize>,
}

impl RecordQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: RecordSort) -> Self {
        self.sorts.push(sort);
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        if let Some(filter) = self.filter.as_ref() {
            body.insert("filter".to_string(), filter.to_payload());
        }
        if !self.sorts.is_empty() {
            let sorts = self.sorts.iter().map(|sort| sort.to_payload()).collect();
            body.insert("sorts".to_string(), Value::Array(sorts));
        }
        if let Some(page_size) = self.page_size {
            body.insert("page_size".to_string(), Value::from(page_size));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(properties: Value) -> Record {
        serde_json::from_value(json!({ "id": "r", "properties": properties }))
            .expect("record should deserialize")
    }

    #[test]
    fn unique_filter_payload_follows_value_kind() {
        let number = RecordFilter::unique("Ref", UniqueValue::infer(&json!(17)).expect("scalar"));
        assert_eq!(
            number.to_payload(),
            json!({ "property": "Ref", "number": { "equals": 17 } })
        );

        let email = RecordFilter::unique("Email", UniqueValue::from_text("ana@inmo.es"));
        assert_eq!(
            email.to_payload(),
            json!({ "property": "Email", "email": { "equals": "ana@inmo.es" } })
        );

        let text = RecordFilter::unique("Name", UniqueValue::from_text("Piso Centro"));
        assert_eq!(
            text.to_payload(),
            json!({ "property": "Name", "rich_text": { "equals": "Piso Centro" } })
        );
    }

    #[test]
    fn edited_filter_and_sort_payloads() {
        let cutoff = Utc.with_ymd_and_hms(2026, 10, 2, 8, 30, 0).single().expect("valid date");
        let query = RecordQuery::new()
            .with_filter(RecordFilter::EditedOnOrAfter(cutoff))
            .with_sort(RecordSort::LastEdited(SortDirection::Descending))
            .with_page_size(25);

        assert_eq!(
            query.to_payload(),
            json!({
                "filter": {
                    "timestamp": "last_edited_time",
                    "last_edited_time": { "on_or_after": "2026-10-02T08:30:00.000Z" }
                },
                "sorts": [{ "timestamp": "last_edited_time", "direction": "descending" }],
                "page_size": 25
            })
        );
    }

    #[test]
    fn local_matching_reads_native_payloads() {
        let row = record(json!({
            "Ref": { "type": "number", "number": 17 },
            "Email": { "type": "email", "email": "ana@inmo.es" },
            "Name": { "type": "title", "title": [{ "plain_text": "Piso Centro" }] }
        }));

        assert!(RecordFilter::unique("Ref", UniqueValue::infer(&json!(17)).expect("scalar")).matches(&row));
        assert!(!RecordFilter::unique("Ref", UniqueValue::infer(&json!(18)).expect("scalar")).matches(&row));
        assert!(RecordFilter::unique("Email", UniqueValue::from_text("ana@inmo.es")).matches(&row));
        assert!(RecordFilter::unique("Name", UniqueValue::from_text("Piso Centro")).matches(&row));
        assert!(!RecordFilter::unique("Missing", UniqueValue::from_text("Piso Centro")).matches(&row));
    }
}

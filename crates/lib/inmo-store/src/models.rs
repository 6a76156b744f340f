use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{
    AUTO_SUMMARY_MARKER,
    BLOCK_BULLETED_LIST_ITEM,
    BLOCK_CALLOUT,
    DISPLAY_NAME_FIELDS,
};

/// A single record (page) inside a collection.
///
/// `properties` keeps the store's native property payloads untouched so that
/// richer field kinds survive a read without being modeled here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Record {
    /// Returns true unless the record was archived or moved to trash.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !self.archived && !self.in_trash
    }

    /// First non-empty text of the `Name` or `Título` field.
    ///
    /// Returns `None` when neither field is present, both are blank, or the
    /// payloads do not have a recognizable text shape.
    #[must_use]
    pub fn title_text(&self) -> Option<String> {
        DISPLAY_NAME_FIELDS.iter().find_map(|field| {
            self.properties
                .get(*field)
                .and_then(property_plain_text)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        })
    }
}

/// A child node as listed under a parent block or page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub in_trash: bool,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Block {
    /// Builds the stored form of a freshly appended node.
    #[must_use]
    pub fn from_new(id: impl Into<String>, block: &NewBlock) -> Self {
        let mut content = Map::new();
        content.insert(block.kind().to_string(), block.body());
        Self {
            id: id.into(),
            kind: block.kind().to_string(),
            archived: false,
            in_trash: false,
            has_children: false,
            content,
        }
    }

    /// Concatenated text of the block's own rich text, if it has any.
    #[must_use]
    pub fn leading_text(&self) -> Option<String> {
        self.content
            .get(&self.kind)
            .and_then(|body| body.get("rich_text"))
            .and_then(rich_text_plain)
    }

    /// True for callouts whose text starts with the auto-summary marker.
    #[must_use]
    pub fn is_auto_summary(&self) -> bool {
        self.kind == BLOCK_CALLOUT
            && self
                .leading_text()
                .is_some_and(|text| text.starts_with(AUTO_SUMMARY_MARKER))
    }
}

/// A node to append under a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewBlock {
    Callout { text: String },
    Bullet { text: String },
}

impl NewBlock {
    #[must_use]
    pub fn callout(text: impl Into<String>) -> Self {
        Self::Callout { text: text.into() }
    }

    #[must_use]
    pub fn bullet(text: impl Into<String>) -> Self {
        Self::Bullet { text: text.into() }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Callout { .. } => BLOCK_CALLOUT,
            Self::Bullet { .. } => BLOCK_BULLETED_LIST_ITEM,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Callout { text } | Self::Bullet { text } => text,
        }
    }

    fn body(&self) -> Value {
        serde_json::json!({ "rich_text": [text_fragment(self.text())] })
    }

    /// Request payload for an append-children call.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("object".to_string(), Value::from("block"));
        payload.insert("type".to_string(), Value::from(self.kind()));
        payload.insert(self.kind().to_string(), self.body());
        Value::Object(payload)
    }
}

/// Plain rich-text fragment for request payloads.
#[must_use]
pub fn text_fragment(content: &str) -> Value {
    serde_json::json!({
        "type": "text",
        "text": { "content": content }
    })
}

/// Joins the text of a rich-text array.
///
/// Accepts both response fragments (`plain_text`) and request fragments
/// (`text.content`); any other fragment shape yields `None`.
#[must_use]
pub fn rich_text_plain(fragments: &Value) -> Option<String> {
    let fragments = fragments.as_array()?;
    let mut text = String::new();
    for fragment in fragments {
        let piece = fragment
            .get("plain_text")
            .and_then(Value::as_str)
            .or_else(|| {
                fragment
                    .get("text")
                    .and_then(|inner| inner.get("content"))
                    .and_then(Value::as_str)
            })?;
        text.push_str(piece);
    }
    Some(text)
}

/// Text carried by a native property payload.
#[must_use]
pub fn property_plain_text(property: &Value) -> Option<String> {
    let object = property.as_object()?;
    if let Some(fragments) = object.get("title").or_else(|| object.get("rich_text")) {
        return rich_text_plain(fragments);
    }
    if let Some(name) = object
        .get("select")
        .and_then(|select| select.get("name"))
        .and_then(Value::as_str)
    {
        return Some(name.to_string());
    }
    ["email", "url", "phone_number"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

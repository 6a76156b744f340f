pub const FIELD_NAME: &str = "Name";
pub const FIELD_TITULO: &str = "Título";
pub const DISPLAY_NAME_FIELDS: [&str; 2] = [FIELD_NAME, FIELD_TITULO];
pub const UNTITLED_PLACEHOLDER: &str = "Sin título";

pub const AUTO_SUMMARY_MARKER: &str = "AUTO · Resumen";
pub const DEFAULT_SUMMARY_COLLECTION: &str = "seguimientos";

pub const SUMMARY_BULLET_LIMIT: usize = 25;
pub const CHILD_PAGE_SIZE: usize = 100;

pub const SINCE_DAYS_MIN: u32 = 1;
pub const SINCE_DAYS_MAX: u32 = 90;
pub const SINCE_DAYS_DEFAULT: u32 = 14;
pub const MILLIS_PER_DAY: i64 = 86_400_000;

pub const BLOCK_CALLOUT: &str = "callout";
pub const BLOCK_BULLETED_LIST_ITEM: &str = "bulleted_list_item";

pub const TIMESTAMP_LAST_EDITED: &str = "last_edited_time";

#[must_use]
pub fn summary_title(since_days: u32) -> String {
    format!("{AUTO_SUMMARY_MARKER} (últimos {since_days} días)")
}

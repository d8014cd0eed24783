use serde::Serialize;

/// One rendered row of the activity timeline.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimelineItem {
    pub id: String,
    pub icon: &'static str,
    pub label: String,
    pub color: &'static str,
    pub summary: Option<String>,
    pub actor: String,
    /// Display timestamp, e.g. `14 Mar 2026, 09:30`.
    pub timestamp: String,
    /// RFC 3339 timestamp for the `<time>` element.
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelinePageData {
    pub entity_kind: &'static str,
    pub entity_id: String,
    pub items: Vec<TimelineItem>,
}

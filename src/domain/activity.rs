//! Activity log entries and their human-readable rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::humanize::{format_inr, humanize_key};

/// Placeholder for a detail the collaborator did not send.
pub const MISSING_DETAIL: &str = "—";

/// Activity record as served by the collaborator.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ActivityRecord {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: String,
    #[serde(deserialize_with = "utc_or_naive_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "user_name")]
    pub actor_name: Option<String>,
    #[serde(default, deserialize_with = "action_tag")]
    pub action: String,
    #[serde(default)]
    pub details: Value,
}

fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Tag given to records that arrive without one.
pub const UNTAGGED_ACTION: &str = "unknown";

/// Timestamps without an offset are taken as UTC.
fn utc_or_naive_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stamp.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp `{raw}`")))
}

fn action_tag<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty());
    Ok(tag.unwrap_or_else(|| UNTAGGED_ACTION.to_string()))
}

/// Parses an activity log record by record. Records that cannot be read
/// are dropped with a warning so the rest of the timeline still renders.
pub fn parse_activity_log(raw: Vec<Value>) -> Vec<ActivityEntry> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<ActivityRecord>(value) {
            Ok(record) => Some(ActivityEntry::from(record)),
            Err(err) => {
                log::warn!("Skipping unreadable activity record #{index}: {err}");
                None
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub actor_name: Option<String>,
    pub action: ActivityAction,
}

impl From<ActivityRecord> for ActivityEntry {
    fn from(record: ActivityRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            actor_name: record
                .actor_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            action: ActivityAction::from_tagged(&record.action, record.details),
        }
    }
}

/// What an activity entry records. Known tags get a typed payload; anything
/// else is carried verbatim in `Unknown`.
#[derive(Clone, Debug, PartialEq)]
pub enum ActivityAction {
    StatusChanged {
        from: Option<String>,
        to: Option<String>,
    },
    RevenueUpdated {
        from: Option<f64>,
        to: Option<f64>,
    },
    Activated,
    FieldsUpdated {
        fields: Vec<String>,
    },
    ReminderCreated {
        title: Option<String>,
        due_date: Option<String>,
    },
    ReminderUpdated {
        title: Option<String>,
    },
    PipelineStageChanged {
        from: Option<String>,
        to: Option<String>,
    },
    Unknown {
        tag: String,
        details: Value,
    },
}

/// Fixed presentation of an action kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub icon: &'static str,
    pub label: String,
    pub color: &'static str,
}

impl ActionDescriptor {
    fn new(icon: &'static str, label: &str, color: &'static str) -> Self {
        Self {
            icon,
            label: label.to_string(),
            color,
        }
    }
}

fn text_detail(details: &Value, key: &str) -> Option<String> {
    match details.get(key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn amount_detail(details: &Value, key: &str) -> Option<f64> {
    match details.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .trim_start_matches('₹')
            .replace(',', "")
            .parse()
            .ok(),
        _ => None,
    }
}

fn list_detail(details: &Value, key: &str) -> Vec<String> {
    match details.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(Value::Object(fields)) => fields.keys().cloned().collect(),
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn humanized_or_missing(value: Option<&String>) -> String {
    value
        .map(|value| humanize_key(value))
        .unwrap_or_else(|| MISSING_DETAIL.to_string())
}

fn amount_or_missing(value: Option<f64>) -> String {
    value
        .map(format_inr)
        .unwrap_or_else(|| MISSING_DETAIL.to_string())
}

impl ActivityAction {
    pub fn from_tagged(tag: &str, details: Value) -> Self {
        match tag {
            "status_changed" => ActivityAction::StatusChanged {
                from: text_detail(&details, "old_status"),
                to: text_detail(&details, "new_status"),
            },
            "revenue_updated" => ActivityAction::RevenueUpdated {
                from: amount_detail(&details, "old_revenue"),
                to: amount_detail(&details, "new_revenue"),
            },
            "activated" => ActivityAction::Activated,
            "fields_updated" => ActivityAction::FieldsUpdated {
                fields: list_detail(&details, "fields"),
            },
            "reminder_created" => ActivityAction::ReminderCreated {
                title: text_detail(&details, "title"),
                due_date: text_detail(&details, "due_date"),
            },
            "reminder_updated" => ActivityAction::ReminderUpdated {
                title: text_detail(&details, "title"),
            },
            "pipeline_stage_changed" => ActivityAction::PipelineStageChanged {
                from: text_detail(&details, "old_stage"),
                to: text_detail(&details, "new_stage"),
            },
            _ => ActivityAction::Unknown {
                tag: tag.to_string(),
                details,
            },
        }
    }

    pub fn descriptor(&self) -> ActionDescriptor {
        match self {
            ActivityAction::StatusChanged { .. } => {
                ActionDescriptor::new("arrow-left-right", "Status changed", "primary")
            }
            ActivityAction::RevenueUpdated { .. } => {
                ActionDescriptor::new("currency-rupee", "Revenue updated", "success")
            }
            ActivityAction::Activated => {
                ActionDescriptor::new("check-circle", "Activated", "success")
            }
            ActivityAction::FieldsUpdated { .. } => {
                ActionDescriptor::new("pencil-square", "Fields updated", "info")
            }
            ActivityAction::ReminderCreated { .. } => {
                ActionDescriptor::new("bell", "Reminder created", "warning")
            }
            ActivityAction::ReminderUpdated { .. } => {
                ActionDescriptor::new("bell-fill", "Reminder updated", "warning")
            }
            ActivityAction::PipelineStageChanged { .. } => {
                ActionDescriptor::new("kanban", "Pipeline stage changed", "primary")
            }
            ActivityAction::Unknown { tag, .. } => ActionDescriptor {
                icon: "activity",
                label: humanize_key(tag),
                color: "secondary",
            },
        }
    }

    /// One-line description of what changed. `None` when the label alone
    /// says everything.
    pub fn summary(&self) -> Option<String> {
        match self {
            ActivityAction::StatusChanged { from, to }
            | ActivityAction::PipelineStageChanged { from, to } => Some(format!(
                "{} → {}",
                humanized_or_missing(from.as_ref()),
                humanized_or_missing(to.as_ref())
            )),
            ActivityAction::RevenueUpdated { from, to } => Some(format!(
                "{} → {}",
                amount_or_missing(*from),
                amount_or_missing(*to)
            )),
            ActivityAction::Activated => None,
            ActivityAction::FieldsUpdated { fields } if fields.is_empty() => {
                Some(MISSING_DETAIL.to_string())
            }
            ActivityAction::FieldsUpdated { fields } => Some(
                fields
                    .iter()
                    .map(|field| humanize_key(field))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            ActivityAction::ReminderCreated { title, due_date } => {
                let title = title.as_deref().unwrap_or(MISSING_DETAIL);
                Some(match due_date {
                    Some(due) => format!("{title} (due {})", format_due_date(due)),
                    None => title.to_string(),
                })
            }
            ActivityAction::ReminderUpdated { title } => {
                Some(title.as_deref().unwrap_or(MISSING_DETAIL).to_string())
            }
            ActivityAction::Unknown { details, .. } => Some(match details {
                Value::Null => MISSING_DETAIL.to_string(),
                other => other.to_string(),
            }),
        }
    }
}

fn format_due_date(raw: &str) -> String {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(|date| date.format("%d %b %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(action: &str, details: Value) -> ActivityEntry {
        serde_json::from_value::<ActivityRecord>(json!({
            "id": 7,
            "created_at": "2026-03-14T09:30:00Z",
            "user_name": "Asha",
            "action": action,
            "details": details
        }))
        .unwrap()
        .into()
    }

    #[test]
    fn malformed_records_do_not_sink_the_log() {
        let entries = parse_activity_log(vec![
            json!({
                "id": "a1",
                "created_at": "2026-03-14T09:31:00",
                "actor_name": "Asha",
                "action": "activated"
            }),
            json!({"id": 2, "created_at": "2026-03-14T09:32:00Z", "action": null}),
            json!({"id": 3, "created_at": "yesterday", "action": "activated"}),
            json!("not a record"),
        ]);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, ActivityAction::Activated);
        assert_eq!(
            entries[0].created_at.to_rfc3339(),
            "2026-03-14T09:31:00+00:00"
        );
        assert_eq!(entries[1].id, "2");
        assert_eq!(entries[1].action.descriptor().label, "Unknown");
    }

    #[test]
    fn status_change_renders_humanized_arrow() {
        let entry = record(
            "status_changed",
            json!({"old_status": "fit_out", "new_status": "operational"}),
        );
        assert_eq!(entry.id, "7");
        assert_eq!(entry.actor_name.as_deref(), Some("Asha"));
        assert_eq!(entry.action.descriptor().label, "Status changed");
        assert_eq!(
            entry.action.summary().as_deref(),
            Some("Fit Out → Operational")
        );
    }

    #[test]
    fn unknown_tag_falls_back_to_humanized_label_and_raw_details() {
        let entry = record("custom_tag_x", json!({"note": "manual"}));
        let descriptor = entry.action.descriptor();
        assert_eq!(descriptor.label, "Custom Tag X");
        assert_eq!(descriptor.icon, "activity");
        assert_eq!(
            entry.action.summary().as_deref(),
            Some(r#"{"note":"manual"}"#)
        );
    }

    #[test]
    fn revenue_update_is_currency_formatted() {
        let entry = record(
            "revenue_updated",
            json!({"old_revenue": 50000, "new_revenue": "120000"}),
        );
        assert_eq!(
            entry.action.summary().as_deref(),
            Some("₹50,000 → ₹1,20,000")
        );
    }

    #[test]
    fn missing_details_render_placeholder() {
        assert_eq!(
            record("status_changed", Value::Null).action.summary().as_deref(),
            Some("— → —")
        );
        assert_eq!(
            record("revenue_updated", json!({"new_revenue": 1000}))
                .action
                .summary()
                .as_deref(),
            Some("— → ₹1,000")
        );
        assert_eq!(
            record("fields_updated", json!({})).action.summary().as_deref(),
            Some("—")
        );
        assert_eq!(
            record("reminder_updated", json!({})).action.summary().as_deref(),
            Some("—")
        );
        assert_eq!(
            record("mystery", Value::Null).action.summary().as_deref(),
            Some("—")
        );
    }

    #[test]
    fn field_list_is_comma_joined() {
        let entry = record(
            "fields_updated",
            json!({"fields": ["base_rent", "carpet_area_sqft", "cam_charges"]}),
        );
        assert_eq!(
            entry.action.summary().as_deref(),
            Some("Base Rent, Carpet Area (sq ft), CAM Charges")
        );
    }

    #[test]
    fn reminder_shows_due_date_when_present() {
        let entry = record(
            "reminder_created",
            json!({"title": "Renewal notice", "due_date": "2026-11-01"}),
        );
        assert_eq!(
            entry.action.summary().as_deref(),
            Some("Renewal notice (due 01 Nov 2026)")
        );
    }

    #[test]
    fn activation_has_no_summary_and_blank_actor_is_dropped() {
        let entry: ActivityEntry = serde_json::from_value::<ActivityRecord>(json!({
            "id": "a1",
            "created_at": "2026-03-14T09:30:00Z",
            "actor_name": "  ",
            "action": "activated"
        }))
        .unwrap()
        .into();
        assert_eq!(entry.action, ActivityAction::Activated);
        assert_eq!(entry.action.summary(), None);
        assert_eq!(entry.actor_name, None);
    }
}

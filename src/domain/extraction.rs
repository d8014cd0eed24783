//! Extraction response returned by the document-intelligence collaborator.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::{AgreementId, FieldPath};

/// Keys ending with this marker carry legacy per-field confidence metadata
/// and are never rendered as data.
pub const CONFIDENCE_SUFFIX: &str = "_confidence";

/// Sentinel some producers emit instead of `null`.
pub const NOT_FOUND_SENTINEL: &str = "not_found";

/// Four-valued extraction quality signal attached to a field.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    NotFound,
}

impl ConfidenceLevel {
    /// Lenient parse: case and surrounding whitespace are ignored, anything
    /// unrecognised is `NotFound`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => ConfidenceLevel::High,
            "medium" => ConfidenceLevel::Medium,
            "low" => ConfidenceLevel::Low,
            _ => ConfidenceLevel::NotFound,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::NotFound => "Not found",
        }
    }
}

impl Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::NotFound => write!(f, "not_found"),
        }
    }
}

/// One contractual concern detected by the collaborator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskFlag {
    #[serde(default, deserialize_with = "loose_flag_id")]
    pub flag_id: Option<u8>,
    #[serde(default, deserialize_with = "loose_text")]
    pub severity: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub explanation: String,
    #[serde(default, deserialize_with = "loose_optional_text")]
    pub clause_text: Option<String>,
}

// Flags are model-generated, so ids may arrive as strings and text fields
// as anything. A bad value degrades to empty instead of failing the result.

fn loose_flag_id<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|id| u8::try_from(id).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn loose_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_optional_text(deserializer)?.unwrap_or_default())
}

/// Catalogue of risk conditions the collaborator checks, keyed by `flag_id`.
pub const RISK_FLAG_CATALOGUE: &[(u8, &str)] = &[
    (1, "No lessor lock-in"),
    (2, "High escalation"),
    (3, "No rent-free fit-out"),
    (4, "Excessive security deposit"),
    (5, "Predatory late interest"),
    (6, "Unilateral relocation"),
    (7, "No renewal option"),
    (8, "Uncapped revenue share"),
];

impl RiskFlag {
    /// Only `high` is singled out; every other severity shares one style.
    pub fn is_high(&self) -> bool {
        self.severity.trim().eq_ignore_ascii_case("high")
    }

    pub fn title(&self) -> &'static str {
        self.flag_id
            .and_then(|id| {
                RISK_FLAG_CATALOGUE
                    .iter()
                    .find(|(candidate, _)| *candidate == id)
                    .map(|(_, name)| *name)
            })
            .unwrap_or("Risk flag")
    }

    /// Supporting clause excerpt, if the collaborator supplied a non-blank one.
    pub fn excerpt(&self) -> Option<&str> {
        self.clause_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Result of one document extraction. Replaced wholesale on restart.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub extraction: Map<String, Value>,
    #[serde(default)]
    pub confidence: Map<String, Value>,
    #[serde(default, alias = "flags")]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub text_length: Option<usize>,
    #[serde(default)]
    pub agreement_id: Option<AgreementId>,
}

impl ExtractionResult {
    /// Confidence for a field key. Keys are flat, not namespaced by section;
    /// missing or unrecognised entries read as [`ConfidenceLevel::NotFound`].
    pub fn confidence_for(&self, field_key: &str) -> ConfidenceLevel {
        self.confidence
            .get(field_key)
            .and_then(Value::as_str)
            .map(ConfidenceLevel::parse)
            .unwrap_or_default()
    }

    /// Object-valued sections in the order the collaborator sent them.
    pub fn sections(&self) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
        self.extraction
            .iter()
            .filter_map(|(key, value)| value.as_object().map(|fields| (key, fields)))
    }

    /// Top-level entries that are not sections (flat certificate shapes).
    pub fn flat_entries(&self) -> impl Iterator<Item = &String> {
        self.extraction
            .iter()
            .filter(|(_, value)| !value.is_object())
            .map(|(key, _)| key)
    }

    /// Renderable fields of a section: everything except confidence metadata.
    pub fn renderable_fields<'a>(
        fields: &'a Map<String, Value>,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> {
        fields
            .iter()
            .filter(|(key, _)| !key.ends_with(CONFIDENCE_SUFFIX))
    }

    /// Paths of every renderable field, section by section.
    pub fn field_paths(&self) -> Vec<(FieldPath, &Value)> {
        let mut paths = Vec::new();
        for (section, fields) in self.sections() {
            for (field, value) in Self::renderable_fields(fields) {
                match FieldPath::new(section.as_str(), field.as_str()) {
                    Ok(path) => paths.push((path, value)),
                    Err(err) => log::warn!("Skipping unaddressable field: {err}"),
                }
            }
        }
        paths
    }

    pub fn value_at(&self, path: &FieldPath) -> Option<&Value> {
        self.extraction
            .get(path.section())
            .and_then(Value::as_object)
            .and_then(|fields| fields.get(path.field()))
    }
}

/// Display-ready form of one extracted value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum FieldValue {
    /// No value: `null`.
    Missing,
    /// String, number or boolean, shown as its text.
    Scalar(String),
    /// Nested structure, shown as a formatted block.
    Block(String),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::String(text) => FieldValue::Scalar(text.clone()),
            Value::Number(number) => FieldValue::Scalar(number.to_string()),
            Value::Bool(flag) => FieldValue::Scalar(flag.to_string()),
            Value::Array(_) | Value::Object(_) => FieldValue::Block(
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            ),
        }
    }

    /// Text an editor is seeded with.
    pub fn text(&self) -> &str {
        match self {
            FieldValue::Missing => "",
            FieldValue::Scalar(text) | FieldValue::Block(text) => text,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, FieldValue::Block(_))
    }
}

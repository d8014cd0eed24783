//! DTOs shaped for the review screen and the inline field editor.

use serde::Serialize;

use crate::domain::cell::CellDisplay;
use crate::domain::extraction::{ConfidenceLevel, RiskFlag};
use crate::domain::review::SyncState;

/// Styled confidence indicator. Exactly one of four styles.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfidenceBadge {
    pub level: ConfidenceLevel,
    pub label: &'static str,
    pub style: &'static str,
}

impl From<ConfidenceLevel> for ConfidenceBadge {
    fn from(level: ConfidenceLevel) -> Self {
        let style = match level {
            ConfidenceLevel::High => "success",
            ConfidenceLevel::Medium => "warning",
            ConfidenceLevel::Low => "danger",
            ConfidenceLevel::NotFound => "secondary",
        };
        Self {
            level,
            label: level.label(),
            style,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldView {
    /// `section.field`, posted back by the inline editor.
    pub path: String,
    pub label: String,
    /// Text the editor is seeded with.
    pub value: String,
    pub display: CellDisplay,
    pub is_block: bool,
    pub confidence: ConfidenceBadge,
    pub sync: SyncState,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionView {
    pub key: String,
    pub title: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskStyle {
    High,
    Standard,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RiskFlagCard {
    pub title: &'static str,
    pub severity: String,
    pub style: RiskStyle,
    pub explanation: String,
    pub excerpt: Option<String>,
}

impl From<&RiskFlag> for RiskFlagCard {
    fn from(flag: &RiskFlag) -> Self {
        Self {
            title: flag.title(),
            severity: flag.severity.clone(),
            style: if flag.is_high() {
                RiskStyle::High
            } else {
                RiskStyle::Standard
            },
            explanation: flag.explanation.clone(),
            excerpt: flag.excerpt().map(str::to_string),
        }
    }
}

/// Risk section of the review screen.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "flags", rename_all = "snake_case")]
pub enum RiskPanel {
    /// Rendered as a single "No risk flags detected" card.
    Clear,
    /// Cards in detection order.
    Flags(Vec<RiskFlagCard>),
}

impl RiskPanel {
    pub fn from_flags(flags: &[RiskFlag]) -> Self {
        if flags.is_empty() {
            RiskPanel::Clear
        } else {
            RiskPanel::Flags(flags.iter().map(RiskFlagCard::from).collect())
        }
    }
}

/// Everything the review template needs.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewScreen {
    pub wizard_id: String,
    pub agreement_id: String,
    pub document_type: String,
    pub document_label: String,
    pub filename: String,
    pub text_length: Option<usize>,
    pub sections: Vec<SectionView>,
    pub risk_panel: RiskPanel,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldEditStatus {
    /// Confirmed value equals the current one; nothing was sent.
    Unchanged,
    Saved,
    Failed,
    Reverted,
}

/// JSON answer to an inline edit, retry or revert.
#[derive(Debug, Clone, Serialize)]
pub struct FieldEditOutcome {
    pub status: FieldEditStatus,
    pub field: FieldView,
}

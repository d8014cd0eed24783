//! Per-field review state: an editable cell plus its reconciliation status.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::cell::EditableCell;
use crate::domain::extraction::FieldValue;
use crate::domain::field_update::FieldUpdate;
use crate::domain::types::{FieldPath, TypeConstraintError};

/// What a cell shows after the collaborator rejects an edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedEditPolicy {
    /// Keep the rejected edit on screen, flagged, with retry and revert.
    #[default]
    KeepEdit,
    /// Restore the last confirmed value and flag the failure.
    Revert,
}

/// Reconciliation status of one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    Synced,
    Pending,
    Failed { message: String },
}

#[derive(Clone, Debug)]
pub struct ReviewCell {
    cell: EditableCell,
    confirmed: Value,
    sync: SyncState,
    /// Update the collaborator last refused; resent as-is on retry.
    rejected: Option<FieldUpdate>,
}

impl ReviewCell {
    pub fn new(confirmed: Value) -> Self {
        let cell = EditableCell::new(FieldValue::from_json(&confirmed).text());
        Self {
            cell,
            confirmed,
            sync: SyncState::Synced,
            rejected: None,
        }
    }

    pub fn cell(&self) -> &EditableCell {
        &self.cell
    }

    /// Last value the collaborator acknowledged.
    pub fn confirmed(&self) -> &Value {
        &self.confirmed
    }

    pub fn sync(&self) -> &SyncState {
        &self.sync
    }

    pub fn is_block(&self) -> bool {
        self.confirmed.is_object() || self.confirmed.is_array()
    }

    /// Runs one edit round: activate, draft, confirm. Returns the update to
    /// send when the value changed.
    pub fn edit(
        &mut self,
        path: &FieldPath,
        draft: String,
    ) -> Result<Option<FieldUpdate>, TypeConstraintError> {
        self.cell.activate();
        self.cell.set_draft(draft);
        self.rejected = None;
        let Some(text) = self.cell.confirm() else {
            return Ok(None);
        };
        self.to_update(path, text).map(Some)
    }

    /// Update to resend for a failed edit. A refused update is resent
    /// unchanged even when the cell already shows the confirmed value.
    pub fn retry(
        &mut self,
        path: &FieldPath,
    ) -> Option<Result<FieldUpdate, TypeConstraintError>> {
        if !matches!(self.sync, SyncState::Failed { .. }) {
            return None;
        }
        if let Some(update) = self.rejected.take() {
            self.sync = SyncState::Pending;
            return Some(Ok(update));
        }
        let text = self.cell.value().to_string();
        Some(self.to_update(path, text))
    }

    fn to_update(
        &mut self,
        path: &FieldPath,
        text: String,
    ) -> Result<FieldUpdate, TypeConstraintError> {
        match FieldUpdate::for_edit(path.clone(), &self.confirmed, text) {
            Ok(update) => {
                self.sync = SyncState::Pending;
                Ok(update)
            }
            Err(err) => {
                self.sync = SyncState::Failed {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Records the collaborator's answer to `update`.
    pub fn settle(
        &mut self,
        update: &FieldUpdate,
        outcome: Result<(), String>,
        policy: FailedEditPolicy,
    ) {
        match outcome {
            Ok(()) => {
                self.confirmed = update.value.clone();
                self.cell
                    .reset(FieldValue::from_json(&self.confirmed).text().to_string());
                self.sync = SyncState::Synced;
                self.rejected = None;
            }
            Err(message) => {
                if policy == FailedEditPolicy::Revert {
                    self.cell
                        .reset(FieldValue::from_json(&self.confirmed).text().to_string());
                }
                self.sync = SyncState::Failed { message };
                self.rejected = Some(update.clone());
            }
        }
    }

    /// Drops a rejected edit and shows the confirmed value again.
    pub fn revert(&mut self) {
        self.cell
            .reset(FieldValue::from_json(&self.confirmed).text().to_string());
        self.sync = SyncState::Synced;
        self.rejected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_rent() -> FieldPath {
        "rent.base_rent".parse().unwrap()
    }

    #[test]
    fn unchanged_edit_produces_no_update() {
        let mut cell = ReviewCell::new(json!(50000));
        assert_eq!(cell.edit(&base_rent(), " 50000 ".into()).unwrap(), None);
        assert_eq!(cell.sync(), &SyncState::Synced);
    }

    #[test]
    fn accepted_edit_becomes_confirmed() {
        let mut cell = ReviewCell::new(json!(50000));
        let update = cell.edit(&base_rent(), "52000".into()).unwrap().unwrap();
        assert_eq!(cell.sync(), &SyncState::Pending);

        cell.settle(&update, Ok(()), FailedEditPolicy::KeepEdit);
        assert_eq!(cell.confirmed(), &json!("52000"));
        assert_eq!(cell.cell().value(), "52000");
        assert_eq!(cell.sync(), &SyncState::Synced);
    }

    #[test]
    fn rejected_edit_is_kept_under_keep_edit_policy() {
        let mut cell = ReviewCell::new(json!(50000));
        let update = cell.edit(&base_rent(), "52000".into()).unwrap().unwrap();
        cell.settle(&update, Err("locked".into()), FailedEditPolicy::KeepEdit);

        assert_eq!(cell.cell().value(), "52000");
        assert_eq!(cell.confirmed(), &json!(50000));
        assert_eq!(
            cell.sync(),
            &SyncState::Failed {
                message: "locked".into()
            }
        );

        let retry = cell.retry(&base_rent()).unwrap().unwrap();
        assert_eq!(retry, update);
        assert_eq!(cell.sync(), &SyncState::Pending);
    }

    #[test]
    fn rejected_edit_is_dropped_under_revert_policy() {
        let mut cell = ReviewCell::new(json!(50000));
        let update = cell.edit(&base_rent(), "52000".into()).unwrap().unwrap();
        cell.settle(&update, Err("locked".into()), FailedEditPolicy::Revert);

        assert_eq!(cell.cell().value(), "50000");
        assert!(matches!(cell.sync(), SyncState::Failed { .. }));
    }

    #[test]
    fn retry_under_revert_policy_resends_the_rejected_edit() {
        let mut cell = ReviewCell::new(json!(50000));
        let update = cell.edit(&base_rent(), "52000".into()).unwrap().unwrap();
        cell.settle(&update, Err("locked".into()), FailedEditPolicy::Revert);

        let retry = cell.retry(&base_rent()).unwrap().unwrap();
        assert_eq!(retry.value, json!("52000"));
        assert_eq!(cell.sync(), &SyncState::Pending);

        cell.settle(&retry, Ok(()), FailedEditPolicy::Revert);
        assert_eq!(cell.confirmed(), &json!("52000"));
        assert_eq!(cell.cell().value(), "52000");
    }

    #[test]
    fn revert_restores_confirmed_value() {
        let mut cell = ReviewCell::new(json!("Pune"));
        let path: FieldPath = "premises.city".parse().unwrap();
        let update = cell.edit(&path, "Mumbai".into()).unwrap().unwrap();
        cell.settle(&update, Err("conflict".into()), FailedEditPolicy::KeepEdit);

        cell.revert();
        assert_eq!(cell.cell().value(), "Pune");
        assert_eq!(cell.sync(), &SyncState::Synced);
        assert!(cell.retry(&path).is_none());
    }

    #[test]
    fn invalid_structural_edit_is_flagged_on_the_cell() {
        let mut cell = ReviewCell::new(json!([{"year": 1}]));
        let path: FieldPath = "rent.rent_schedule".parse().unwrap();
        assert!(cell.is_block());
        assert!(cell.edit(&path, "not json".into()).is_err());
        assert_eq!(cell.cell().value(), "not json");
        assert!(matches!(cell.sync(), SyncState::Failed { .. }));
    }
}

//! Upload wizard: Capture → Extracting → Review.
//!
//! The wizard owns the selected file, the extraction result and the per-field
//! review state. It performs no I/O; the service layer issues the single
//! outbound extraction request between [`UploadWizard::begin_extraction`] and
//! [`UploadWizard::finish_extraction`].

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use crate::domain::extraction::{ExtractionResult, RiskFlag};
use crate::domain::field_update::FieldUpdate;
use crate::domain::review::{FailedEditPolicy, ReviewCell};
use crate::domain::types::{AgreementId, FieldPath, TypeConstraintError};

/// Message shown when a failed extraction carries no message of its own.
pub const GENERIC_EXTRACTION_ERROR: &str = "Extraction failed. Please try again.";

pub const PDF_MIME: &str = "application/pdf";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Capture,
    Extracting,
    Review,
}

impl Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardPhase::Capture => write!(f, "capturing"),
            WizardPhase::Extracting => write!(f, "extracting"),
            WizardPhase::Review => write!(f, "reviewing"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("Only PDF files are supported")]
    UnsupportedFileType,
    #[error("Select a PDF file first")]
    NoFileSelected,
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: WizardPhase,
    },
    #[error("no reviewable field at {0}")]
    UnknownField(FieldPath),
    #[error("no failed edit to retry at {0}")]
    NothingToRetry(FieldPath),
    #[error(transparent)]
    InvalidValue(#[from] TypeConstraintError),
}

/// A file chosen for extraction, with the type its source declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new<S: Into<String>>(
        filename: S,
        declared_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            declared_type,
            bytes,
        }
    }

    /// True when the declared media type is `application/pdf`, ignoring
    /// parameters and case.
    pub fn is_pdf(&self) -> bool {
        self.declared_type
            .as_deref()
            .and_then(|mime| mime.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Why an extraction attempt produced no result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionFailure {
    message: Option<String>,
}

impl ExtractionFailure {
    pub fn new<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        let message = Some(message.trim().to_string()).filter(|m| !m.is_empty());
        Self { message }
    }

    pub fn without_message() -> Self {
        Self::default()
    }

    pub fn user_message(&self) -> &str {
        self.message.as_deref().unwrap_or(GENERIC_EXTRACTION_ERROR)
    }
}

#[derive(Clone, Debug)]
pub struct UploadWizard {
    agreement_id: AgreementId,
    policy: FailedEditPolicy,
    phase: WizardPhase,
    selected_file: Option<SelectedFile>,
    result: Option<ExtractionResult>,
    cells: BTreeMap<FieldPath, ReviewCell>,
    error: Option<String>,
}

impl UploadWizard {
    pub fn new(agreement_id: AgreementId, policy: FailedEditPolicy) -> Self {
        Self {
            agreement_id,
            policy,
            phase: WizardPhase::Capture,
            selected_file: None,
            result: None,
            cells: BTreeMap::new(),
            error: None,
        }
    }

    pub fn agreement_id(&self) -> AgreementId {
        self.agreement_id
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cell(&self, path: &FieldPath) -> Option<&ReviewCell> {
        self.cells.get(path)
    }

    fn require(&self, phase: WizardPhase, action: &'static str) -> Result<(), WizardError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    /// File-picker selection. Replaces any earlier file and clears the error.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), WizardError> {
        self.require(WizardPhase::Capture, "select a file")?;
        self.selected_file = Some(file);
        self.error = None;
        Ok(())
    }

    /// Drag-and-drop. Only items declared as PDF are accepted; anything else
    /// leaves the selection alone and sets the error.
    pub fn drop_item(&mut self, item: SelectedFile) -> Result<(), WizardError> {
        self.require(WizardPhase::Capture, "drop a file")?;
        if !item.is_pdf() {
            let err = WizardError::UnsupportedFileType;
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.select_file(item)
    }

    pub fn can_extract(&self) -> bool {
        self.phase == WizardPhase::Capture && self.selected_file.is_some()
    }

    /// Moves to `Extracting` and hands out the file to send.
    pub fn begin_extraction(&mut self) -> Result<SelectedFile, WizardError> {
        self.require(WizardPhase::Capture, "start extraction")?;
        let file = self
            .selected_file
            .clone()
            .ok_or(WizardError::NoFileSelected)?;
        self.phase = WizardPhase::Extracting;
        self.error = None;
        Ok(file)
    }

    /// Settles the outstanding extraction request.
    ///
    /// Success enters `Review` and discards the file. Failure returns to
    /// `Capture` with the file kept so the reviewer can retry.
    pub fn finish_extraction(
        &mut self,
        outcome: Result<ExtractionResult, ExtractionFailure>,
    ) -> Result<(), WizardError> {
        self.require(WizardPhase::Extracting, "finish extraction")?;
        match outcome {
            Ok(result) => {
                for key in result.flat_entries() {
                    log::warn!("Extraction entry `{key}` is not a section and will not be shown");
                }
                self.cells = result
                    .field_paths()
                    .into_iter()
                    .map(|(path, value)| (path, ReviewCell::new(value.clone())))
                    .collect();
                self.result = Some(result);
                self.selected_file = None;
                self.phase = WizardPhase::Review;
            }
            Err(failure) => {
                self.error = Some(failure.user_message().to_string());
                self.phase = WizardPhase::Capture;
            }
        }
        Ok(())
    }

    /// Back to an empty `Capture`. Not available mid-flight.
    pub fn restart(&mut self) -> Result<(), WizardError> {
        if self.phase == WizardPhase::Extracting {
            return Err(WizardError::InvalidTransition {
                action: "restart",
                phase: self.phase,
            });
        }
        self.phase = WizardPhase::Capture;
        self.selected_file = None;
        self.result = None;
        self.cells.clear();
        self.error = None;
        Ok(())
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn review_cell_mut(&mut self, path: &FieldPath) -> Result<&mut ReviewCell, WizardError> {
        self.cells
            .get_mut(path)
            .ok_or_else(|| WizardError::UnknownField(path.clone()))
    }

    /// Confirms `draft` for one field. Returns the sparse update to send, or
    /// `None` when the value did not change.
    pub fn edit_field(
        &mut self,
        path: &FieldPath,
        draft: String,
    ) -> Result<Option<FieldUpdate>, WizardError> {
        self.require(WizardPhase::Review, "edit a field")?;
        Ok(self.review_cell_mut(path)?.edit(path, draft)?)
    }

    /// Update for resending a previously rejected edit.
    pub fn retry_field(&mut self, path: &FieldPath) -> Result<FieldUpdate, WizardError> {
        self.require(WizardPhase::Review, "retry a field")?;
        match self.review_cell_mut(path)?.retry(path) {
            Some(update) => Ok(update?),
            None => Err(WizardError::NothingToRetry(path.clone())),
        }
    }

    /// Records the collaborator's answer to a field update. Accepted updates
    /// are merged into the local extraction so it mirrors the stored one.
    pub fn settle_field(
        &mut self,
        update: &FieldUpdate,
        outcome: Result<(), String>,
    ) -> Result<(), WizardError> {
        self.require(WizardPhase::Review, "settle a field")?;
        let accepted = outcome.is_ok();
        let policy = self.policy;
        self.review_cell_mut(&update.path)?
            .settle(update, outcome, policy);
        if accepted {
            if let Some(result) = self.result.as_mut() {
                if let Err(err) = update.merge_into(&mut result.extraction) {
                    log::warn!("Saved {} but could not mirror it locally: {err}", update.path);
                }
            }
        }
        Ok(())
    }

    pub fn revert_field(&mut self, path: &FieldPath) -> Result<(), WizardError> {
        self.require(WizardPhase::Review, "revert a field")?;
        self.review_cell_mut(path)?.revert();
        Ok(())
    }

    pub fn replace_risk_flags(&mut self, flags: Vec<RiskFlag>) -> Result<(), WizardError> {
        self.require(WizardPhase::Review, "refresh risk flags")?;
        if let Some(result) = self.result.as_mut() {
            result.risk_flags = flags;
        }
        Ok(())
    }
}

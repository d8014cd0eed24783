//! DTOs for the capture and extracting screens.

use serde::Serialize;

use crate::domain::wizard::{SelectedFile, WizardPhase};
use crate::dto::review::ReviewScreen;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectedFileView {
    pub filename: String,
    pub size_kb: usize,
}

impl From<&SelectedFile> for SelectedFileView {
    fn from(file: &SelectedFile) -> Self {
        Self {
            filename: file.filename.clone(),
            size_kb: file.size().div_ceil(1024),
        }
    }
}

/// Data for the capture and extracting screens.
#[derive(Debug, Clone, Serialize)]
pub struct CapturePageData {
    pub wizard_id: String,
    pub agreement_id: String,
    pub phase: WizardPhase,
    pub selected_file: Option<SelectedFileView>,
    pub error: Option<String>,
    pub can_extract: bool,
}

/// What `GET /upload/{id}` renders for the wizard's current phase.
#[derive(Debug, Clone)]
pub enum WizardPage {
    Capture(CapturePageData),
    Extracting(CapturePageData),
    Review(Box<ReviewScreen>),
}

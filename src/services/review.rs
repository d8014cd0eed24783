//! Review screen assembly and the per-field reconciliation round trip.

use crate::domain::extraction::{ConfidenceLevel, ExtractionResult};
use crate::domain::field_update::FieldUpdate;
use crate::domain::review::ReviewCell;
use crate::domain::types::{AgreementId, FieldPath, WizardId};
use crate::domain::wizard::{UploadWizard, WizardError, WizardPhase};
use crate::dto::review::{
    ConfidenceBadge, FieldEditOutcome, FieldEditStatus, FieldView, ReviewScreen, RiskPanel,
    SectionView,
};
use crate::gateway::{FieldReconciler, RiskAnalyzer};
use crate::humanize::{document_type_label, humanize_key, section_title};
use crate::repository::WizardRegistry;
use crate::services::{ServiceResult, with_session};

/// Shown on a cell whose update the collaborator rejected without a reason.
pub const FIELD_UPDATE_FAILED: &str = "Could not save this field. Retry or revert it.";

fn field_view(path: &FieldPath, cell: &ReviewCell, confidence: ConfidenceLevel) -> FieldView {
    FieldView {
        path: path.to_string(),
        label: humanize_key(path.field()),
        value: cell.cell().value().to_string(),
        display: cell.cell().display(),
        is_block: cell.is_block(),
        confidence: ConfidenceBadge::from(confidence),
        sync: cell.sync().clone(),
    }
}

fn require_result<'a>(
    wizard: &'a UploadWizard,
    action: &'static str,
) -> Result<&'a ExtractionResult, WizardError> {
    match wizard.result() {
        Some(result) if wizard.phase() == WizardPhase::Review => Ok(result),
        _ => Err(WizardError::InvalidTransition {
            action,
            phase: wizard.phase(),
        }),
    }
}

fn current_field_view(wizard: &UploadWizard, path: &FieldPath) -> Result<FieldView, WizardError> {
    let result = require_result(wizard, "show a field")?;
    let cell = wizard
        .cell(path)
        .ok_or_else(|| WizardError::UnknownField(path.clone()))?;
    Ok(field_view(path, cell, result.confidence_for(path.field())))
}

/// Builds the review screen: sections in received order, confidence
/// metadata hidden, empty sections omitted.
pub fn build_review_screen(
    wizard_id: &WizardId,
    wizard: &UploadWizard,
) -> Result<ReviewScreen, WizardError> {
    let result = require_result(wizard, "render the review")?;

    let sections = result
        .sections()
        .filter_map(|(key, fields)| {
            let fields: Vec<FieldView> = ExtractionResult::renderable_fields(fields)
                .filter_map(|(field, _)| {
                    let path = FieldPath::new(key.as_str(), field.as_str()).ok()?;
                    let cell = wizard.cell(&path)?;
                    Some(field_view(&path, cell, result.confidence_for(field)))
                })
                .collect();
            (!fields.is_empty()).then(|| SectionView {
                key: key.clone(),
                title: section_title(key),
                fields,
            })
        })
        .collect();

    Ok(ReviewScreen {
        wizard_id: wizard_id.to_string(),
        agreement_id: wizard.agreement_id().to_string(),
        document_type: result.document_type.clone(),
        document_label: document_type_label(&result.document_type),
        filename: result.filename.clone(),
        text_length: result.text_length,
        sections,
        risk_panel: RiskPanel::from_flags(&result.risk_flags),
    })
}

enum EditStep {
    Send(AgreementId, FieldUpdate),
    Settled(FieldEditStatus, FieldView),
}

async fn reconcile<C>(
    collaborator: &C,
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    agreement_id: AgreementId,
    update: FieldUpdate,
) -> ServiceResult<FieldEditOutcome>
where
    C: FieldReconciler + ?Sized,
{
    let outcome = collaborator
        .apply_field_update(agreement_id, &update)
        .await
        .map_err(|err| {
            log::error!("Failed to update {} on agreement {agreement_id}: {err}", update.path);
            err.user_message().unwrap_or(FIELD_UPDATE_FAILED).to_string()
        });
    let status = if outcome.is_ok() {
        FieldEditStatus::Saved
    } else {
        FieldEditStatus::Failed
    };

    let field = with_session(registry, wizard_id, |wizard| {
        wizard.settle_field(&update, outcome)?;
        current_field_view(wizard, &update.path)
    })?;
    Ok(FieldEditOutcome { status, field })
}

async fn drive_edit<C>(
    collaborator: &C,
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    step: EditStep,
) -> ServiceResult<FieldEditOutcome>
where
    C: FieldReconciler + ?Sized,
{
    match step {
        EditStep::Send(agreement_id, update) => {
            reconcile(collaborator, registry, wizard_id, agreement_id, update).await
        }
        EditStep::Settled(status, field) => Ok(FieldEditOutcome { status, field }),
    }
}

/// Confirms an inline edit and, if the value changed, sends exactly one
/// sparse update for it.
pub async fn submit_field_edit<C>(
    collaborator: &C,
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    path: &FieldPath,
    draft: String,
) -> ServiceResult<FieldEditOutcome>
where
    C: FieldReconciler + ?Sized,
{
    let step = with_session(registry, wizard_id, |wizard| {
        match wizard.edit_field(path, draft) {
            Ok(Some(update)) => Ok(EditStep::Send(wizard.agreement_id(), update)),
            Ok(None) => Ok(EditStep::Settled(
                FieldEditStatus::Unchanged,
                current_field_view(wizard, path)?,
            )),
            Err(WizardError::InvalidValue(err)) => {
                log::warn!("Rejected edit of {path}: {err}");
                Ok(EditStep::Settled(
                    FieldEditStatus::Failed,
                    current_field_view(wizard, path)?,
                ))
            }
            Err(err) => Err(err),
        }
    })?;
    drive_edit(collaborator, registry, wizard_id, step).await
}

/// Resends a previously rejected edit.
pub async fn retry_field_edit<C>(
    collaborator: &C,
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    path: &FieldPath,
) -> ServiceResult<FieldEditOutcome>
where
    C: FieldReconciler + ?Sized,
{
    let step = with_session(registry, wizard_id, |wizard| {
        match wizard.retry_field(path) {
            Ok(update) => Ok(EditStep::Send(wizard.agreement_id(), update)),
            Err(WizardError::InvalidValue(_)) => Ok(EditStep::Settled(
                FieldEditStatus::Failed,
                current_field_view(wizard, path)?,
            )),
            Err(err) => Err(err),
        }
    })?;
    drive_edit(collaborator, registry, wizard_id, step).await
}

/// Drops a rejected edit and shows the last confirmed value.
pub fn revert_field_edit(
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    path: &FieldPath,
) -> ServiceResult<FieldEditOutcome> {
    let field = with_session(registry, wizard_id, |wizard| {
        wizard.revert_field(path)?;
        current_field_view(wizard, path)
    })?;
    Ok(FieldEditOutcome {
        status: FieldEditStatus::Reverted,
        field,
    })
}

/// Re-runs risk analysis against the corrected extraction and replaces the
/// current flags. Returns the number of flags now shown.
pub async fn refresh_risk_flags<C>(
    collaborator: &C,
    registry: &WizardRegistry,
    wizard_id: &WizardId,
) -> ServiceResult<usize>
where
    C: RiskAnalyzer + ?Sized,
{
    let (agreement_id, extraction) = with_session(registry, wizard_id, |wizard| {
        let result = require_result(wizard, "refresh risk flags")?;
        Ok((wizard.agreement_id(), result.extraction.clone()))
    })?;

    let flags = collaborator
        .reanalyze_risks(agreement_id, &extraction)
        .await
        .map_err(|err| {
            log::error!("Risk analysis for agreement {agreement_id} failed: {err}");
            err
        })?;
    let count = flags.len();

    with_session(registry, wizard_id, |wizard| wizard.replace_risk_flags(flags))?;
    Ok(count)
}

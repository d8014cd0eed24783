//! Services driving the upload wizard through its phases.

use crate::domain::review::FailedEditPolicy;
use crate::domain::types::{AgreementId, WizardId};
use crate::domain::wizard::{
    ExtractionFailure, SelectedFile, UploadWizard, WizardError, WizardPhase,
};
use crate::dto::upload::{CapturePageData, SelectedFileView, WizardPage};
use crate::gateway::DocumentExtractor;
use crate::repository::WizardRegistry;
use crate::services::review::build_review_screen;
use crate::services::{ServiceError, ServiceResult, with_session};

/// Opens a fresh wizard session for the agreement.
pub fn start_wizard(
    registry: &WizardRegistry,
    agreement_id: AgreementId,
    policy: FailedEditPolicy,
) -> WizardId {
    let wizard_id = registry.open(UploadWizard::new(agreement_id, policy));
    log::info!("Opened upload session {wizard_id} for agreement {agreement_id}");
    wizard_id
}

fn capture_page(wizard_id: &WizardId, wizard: &UploadWizard) -> CapturePageData {
    CapturePageData {
        wizard_id: wizard_id.to_string(),
        agreement_id: wizard.agreement_id().to_string(),
        phase: wizard.phase(),
        selected_file: wizard.selected_file().map(SelectedFileView::from),
        error: wizard.error().map(str::to_string),
        can_extract: wizard.can_extract(),
    }
}

/// Loads what the wizard's current phase renders. The page is built under
/// the registry lock so the retained file is never copied.
pub fn load_wizard_page(
    registry: &WizardRegistry,
    wizard_id: &WizardId,
) -> ServiceResult<WizardPage> {
    let page = registry
        .with_wizard(wizard_id, |wizard| -> Result<WizardPage, WizardError> {
            Ok(match wizard.phase() {
                WizardPhase::Capture => WizardPage::Capture(capture_page(wizard_id, wizard)),
                WizardPhase::Extracting => {
                    WizardPage::Extracting(capture_page(wizard_id, wizard))
                }
                WizardPhase::Review => {
                    WizardPage::Review(Box::new(build_review_screen(wizard_id, wizard)?))
                }
            })
        })
        .ok_or(ServiceError::NotFound)??;
    Ok(page)
}

/// Takes an uploaded file with drop semantics: only PDFs are accepted.
pub fn accept_upload(
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    file: SelectedFile,
) -> ServiceResult<()> {
    let filename = file.filename.clone();
    with_session(registry, wizard_id, |wizard| wizard.drop_item(file)).map_err(|err| {
        log::warn!("Rejected upload {filename} for session {wizard_id}: {err}");
        err
    })
}

/// Sends the selected file to the collaborator and settles the wizard.
///
/// The registry lock is released while the request is in flight; a second
/// call for the same session in the meantime fails as an invalid transition.
pub async fn run_extraction<C>(
    collaborator: &C,
    registry: &WizardRegistry,
    wizard_id: &WizardId,
) -> ServiceResult<WizardPhase>
where
    C: DocumentExtractor + ?Sized,
{
    let (agreement_id, file) = with_session(registry, wizard_id, |wizard| {
        let file = wizard.begin_extraction()?;
        Ok((wizard.agreement_id(), file))
    })?;

    let outcome = collaborator
        .submit_document(agreement_id, &file)
        .await
        .map_err(|err| {
            log::error!("Extraction of {} failed: {err}", file.filename);
            ExtractionFailure::from(&err)
        });

    let phase = with_session(registry, wizard_id, |wizard| {
        wizard.finish_extraction(outcome)?;
        Ok(wizard.phase())
    })?;
    log::info!("Upload session {wizard_id} is now {phase}");
    Ok(phase)
}

pub fn restart_wizard(registry: &WizardRegistry, wizard_id: &WizardId) -> ServiceResult<()> {
    with_session(registry, wizard_id, UploadWizard::restart)
}

pub fn dismiss_error(registry: &WizardRegistry, wizard_id: &WizardId) -> ServiceResult<()> {
    with_session(registry, wizard_id, |wizard| {
        wizard.dismiss_error();
        Ok(())
    })
}

/// Confirms the review and discards the session.
pub fn finish_wizard(
    registry: &WizardRegistry,
    wizard_id: &WizardId,
) -> ServiceResult<AgreementId> {
    let agreement_id = with_session(registry, wizard_id, |wizard| match wizard.phase() {
        WizardPhase::Review => Ok(wizard.agreement_id()),
        phase => Err(WizardError::InvalidTransition {
            action: "finish the review",
            phase,
        }),
    })?;
    registry.close(wizard_id);
    log::info!("Closed upload session {wizard_id} for agreement {agreement_id}");
    Ok(agreement_id)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::extraction::ExtractionResult;
    use crate::gateway::GatewayError;
    use crate::gateway::mock::MockCollaborator;
    use serde_json::json;
    use uuid::Uuid;

    fn agreement() -> AgreementId {
        AgreementId::from_uuid(Uuid::from_u128(123))
    }

    fn pdf() -> SelectedFile {
        SelectedFile::new("lease_123.pdf", Some("application/pdf".into()), b"%PDF".to_vec())
    }

    fn lease_result() -> ExtractionResult {
        serde_json::from_value(json!({
            "status": "success",
            "document_type": "lease_loi",
            "extraction": {"rent": {"base_rent": 50000}},
            "confidence": {"base_rent": "medium"},
            "risk_flags": [],
            "filename": "lease_123.pdf"
        }))
        .expect("valid extraction")
    }

    fn ready_session(registry: &WizardRegistry) -> WizardId {
        let id = start_wizard(registry, agreement(), FailedEditPolicy::KeepEdit);
        accept_upload(registry, &id, pdf()).expect("pdf accepted");
        id
    }

    #[actix_web::test]
    async fn successful_extraction_enters_review() {
        let registry = WizardRegistry::new();
        let id = ready_session(&registry);

        let mut collaborator = MockCollaborator::new();
        collaborator
            .expect_submit_document()
            .withf(|agreement_id, file| {
                *agreement_id == agreement() && file.filename == "lease_123.pdf"
            })
            .times(1)
            .returning(|_, _| Ok(lease_result()));

        let phase = run_extraction(&collaborator, &registry, &id).await.unwrap();
        assert_eq!(phase, WizardPhase::Review);

        let WizardPage::Review(screen) = load_wizard_page(&registry, &id).unwrap() else {
            panic!("expected review page");
        };
        assert_eq!(screen.filename, "lease_123.pdf");
        assert_eq!(screen.sections.len(), 1);
    }

    #[actix_web::test]
    async fn rejected_extraction_returns_to_capture_with_message() {
        let registry = WizardRegistry::new();
        let id = ready_session(&registry);

        let mut collaborator = MockCollaborator::new();
        collaborator
            .expect_submit_document()
            .times(1)
            .returning(|_, _| Err(GatewayError::Rejected("Scanned PDF detected.".into())));

        let phase = run_extraction(&collaborator, &registry, &id).await.unwrap();
        assert_eq!(phase, WizardPhase::Capture);

        let WizardPage::Capture(page) = load_wizard_page(&registry, &id).unwrap() else {
            panic!("expected capture page");
        };
        assert_eq!(page.error.as_deref(), Some("Scanned PDF detected."));
        assert_eq!(page.selected_file.unwrap().filename, "lease_123.pdf");
        assert!(page.can_extract);
    }

    #[actix_web::test]
    async fn server_error_without_detail_uses_generic_message() {
        let registry = WizardRegistry::new();
        let id = ready_session(&registry);

        let mut collaborator = MockCollaborator::new();
        collaborator
            .expect_submit_document()
            .returning(|_, _| Err(GatewayError::from_response(500, "oops".into())));

        run_extraction(&collaborator, &registry, &id).await.unwrap();
        let wizard = registry.snapshot(&id).unwrap();
        assert_eq!(
            wizard.error(),
            Some("Extraction failed. Please try again.")
        );
    }

    #[actix_web::test]
    async fn extraction_without_file_never_calls_collaborator() {
        let registry = WizardRegistry::new();
        let id = start_wizard(&registry, agreement(), FailedEditPolicy::KeepEdit);

        let mut collaborator = MockCollaborator::new();
        collaborator.expect_submit_document().times(0);

        let result = run_extraction(&collaborator, &registry, &id).await;
        assert!(matches!(
            result,
            Err(ServiceError::Wizard(WizardError::NoFileSelected))
        ));
    }

    #[actix_web::test]
    async fn unknown_session_is_not_found() {
        let registry = WizardRegistry::new();
        let collaborator = MockCollaborator::new();
        let result = run_extraction(&collaborator, &registry, &WizardId::generate()).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn extracting_page_reports_the_retained_file() {
        let registry = WizardRegistry::new();
        let id = ready_session(&registry);
        with_session(&registry, &id, |wizard| wizard.begin_extraction().map(|_| ())).unwrap();

        let WizardPage::Extracting(page) = load_wizard_page(&registry, &id).unwrap() else {
            panic!("expected extracting page");
        };
        assert_eq!(page.phase, WizardPhase::Extracting);
        assert_eq!(page.selected_file.unwrap().filename, "lease_123.pdf");
        assert!(!page.can_extract);
    }

    #[test]
    fn non_pdf_upload_is_rejected_and_recorded() {
        let registry = WizardRegistry::new();
        let id = start_wizard(&registry, agreement(), FailedEditPolicy::KeepEdit);
        let png = SelectedFile::new("scan.png", Some("image/png".into()), vec![0]);

        let result = accept_upload(&registry, &id, png);
        assert!(matches!(
            result,
            Err(ServiceError::Wizard(WizardError::UnsupportedFileType))
        ));
        let wizard = registry.snapshot(&id).unwrap();
        assert_eq!(wizard.error(), Some("Only PDF files are supported"));

        dismiss_error(&registry, &id).unwrap();
        assert_eq!(registry.snapshot(&id).unwrap().error(), None);
    }

    #[actix_web::test]
    async fn finishing_closes_the_session_only_from_review() {
        let registry = WizardRegistry::new();
        let id = ready_session(&registry);
        assert!(finish_wizard(&registry, &id).is_err());

        let mut collaborator = MockCollaborator::new();
        collaborator
            .expect_submit_document()
            .returning(|_, _| Ok(lease_result()));
        run_extraction(&collaborator, &registry, &id).await.unwrap();

        assert_eq!(finish_wizard(&registry, &id).unwrap(), agreement());
        assert!(registry.snapshot(&id).is_none());
    }

    #[actix_web::test]
    async fn restart_from_review_returns_to_empty_capture() {
        let registry = WizardRegistry::new();
        let id = ready_session(&registry);
        let mut collaborator = MockCollaborator::new();
        collaborator
            .expect_submit_document()
            .returning(|_, _| Ok(lease_result()));
        run_extraction(&collaborator, &registry, &id).await.unwrap();

        restart_wizard(&registry, &id).unwrap();
        let WizardPage::Capture(page) = load_wizard_page(&registry, &id).unwrap() else {
            panic!("expected capture page");
        };
        assert!(page.selected_file.is_none());
        assert!(!page.can_extract);
    }
}

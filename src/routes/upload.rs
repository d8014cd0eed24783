use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{AgreementId, WizardId};
use crate::domain::wizard::{SelectedFile, WizardError};
use crate::dto::upload::WizardPage;
use crate::forms::FormError;
use crate::forms::upload::UploadDocumentForm;
use crate::gateway::Collaborator;
use crate::models::config::ServerConfig;
use crate::repository::WizardRegistry;
use crate::routes::{base_context, redirect, render_template, session_expired};
use crate::services::ServiceError;
use crate::services::upload::{
    accept_upload, dismiss_error, finish_wizard, load_wizard_page, restart_wizard,
    run_extraction, start_wizard,
};

fn wizard_url(wizard_id: &WizardId) -> String {
    format!("/upload/{wizard_id}")
}

/// Redirects back to the wizard, or reports what went wrong.
fn back_to_wizard(
    wizard_id: &WizardId,
    result: Result<(), ServiceError>,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
) -> HttpResponse {
    match result {
        Ok(()) => redirect(&wizard_url(wizard_id)),
        Err(ServiceError::NotFound) => session_expired(tera, flash_messages),
        Err(ServiceError::Wizard(WizardError::UnsupportedFileType)) => {
            redirect(&wizard_url(wizard_id))
        }
        Err(err) => {
            log::warn!("Upload session {wizard_id}: {err}");
            FlashMessage::error(err.to_string()).send();
            redirect(&wizard_url(wizard_id))
        }
    }
}

#[get("/agreements/{agreement_id}/upload")]
pub async fn open_upload(
    agreement_id: web::Path<String>,
    registry: web::Data<WizardRegistry>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let agreement_id: AgreementId = match agreement_id.parse() {
        Ok(id) => id,
        Err(err) => {
            log::warn!("Rejected upload for agreement '{agreement_id}': {err}");
            return HttpResponse::NotFound().finish();
        }
    };
    let wizard_id = start_wizard(&registry, agreement_id, server_config.failed_edit_policy);
    redirect(&wizard_url(&wizard_id))
}

#[get("/upload/{wizard_id}")]
pub async fn show_wizard(
    wizard_id: web::Path<WizardId>,
    registry: web::Data<WizardRegistry>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let page = match load_wizard_page(&registry, &wizard_id) {
        Ok(page) => page,
        Err(ServiceError::NotFound) => return session_expired(&tera, &flash_messages),
        Err(err) => {
            log::error!("Failed to load upload session {wizard_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(&flash_messages, "upload");
    context.insert("max_upload_mb", &server_config.max_upload_mb);
    match page {
        WizardPage::Capture(data) => {
            context.insert("page", &data);
            render_template(&tera, "upload/capture.html", &context)
        }
        WizardPage::Extracting(data) => {
            context.insert("page", &data);
            render_template(&tera, "upload/extracting.html", &context)
        }
        WizardPage::Review(screen) => {
            context.insert("screen", &screen);
            render_template(&tera, "upload/review.html", &context)
        }
    }
}

/// Takes the chosen file and extracts it straight away.
#[post("/upload/{wizard_id}/file")]
pub async fn upload_file(
    wizard_id: web::Path<WizardId>,
    MultipartForm(form): MultipartForm<UploadDocumentForm>,
    registry: web::Data<WizardRegistry>,
    collaborator: web::Data<dyn Collaborator>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let file = match SelectedFile::try_from(form) {
        Ok(file) => file,
        Err(FormError::MissingFile) => {
            FlashMessage::error(WizardError::NoFileSelected.to_string()).send();
            return redirect(&wizard_url(&wizard_id));
        }
        Err(err) => {
            log::error!("Failed to read upload for session {wizard_id}: {err}");
            FlashMessage::error("Could not read the uploaded file.").send();
            return redirect(&wizard_url(&wizard_id));
        }
    };

    if let Err(err) = accept_upload(&registry, &wizard_id, file) {
        return back_to_wizard(&wizard_id, Err(err), &tera, &flash_messages);
    }

    let result = run_extraction(collaborator.get_ref(), &registry, &wizard_id)
        .await
        .map(|_| ());
    back_to_wizard(&wizard_id, result, &tera, &flash_messages)
}

/// Retries extraction with the file kept from a failed attempt.
#[post("/upload/{wizard_id}/extract")]
pub async fn extract(
    wizard_id: web::Path<WizardId>,
    registry: web::Data<WizardRegistry>,
    collaborator: web::Data<dyn Collaborator>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let result = run_extraction(collaborator.get_ref(), &registry, &wizard_id)
        .await
        .map(|_| ());
    back_to_wizard(&wizard_id, result, &tera, &flash_messages)
}

#[post("/upload/{wizard_id}/restart")]
pub async fn restart(
    wizard_id: web::Path<WizardId>,
    registry: web::Data<WizardRegistry>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let result = restart_wizard(&registry, &wizard_id);
    back_to_wizard(&wizard_id, result, &tera, &flash_messages)
}

#[post("/upload/{wizard_id}/dismiss")]
pub async fn dismiss(
    wizard_id: web::Path<WizardId>,
    registry: web::Data<WizardRegistry>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let result = dismiss_error(&registry, &wizard_id);
    back_to_wizard(&wizard_id, result, &tera, &flash_messages)
}

#[post("/upload/{wizard_id}/done")]
pub async fn done(
    wizard_id: web::Path<WizardId>,
    registry: web::Data<WizardRegistry>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match finish_wizard(&registry, &wizard_id) {
        Ok(agreement_id) => {
            FlashMessage::success("Review complete.").send();
            redirect(&format!("/agreements/{agreement_id}/activity"))
        }
        Err(err) => back_to_wizard(&wizard_id, Err(err), &tera, &flash_messages),
    }
}

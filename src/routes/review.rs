//! Endpoints behind the inline field editor and the risk panel.

use actix_web::{HttpResponse, Responder, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::types::{FieldPath, WizardId};
use crate::forms::review::{EditFieldForm, FieldPathForm};
use crate::gateway::Collaborator;
use crate::repository::WizardRegistry;
use crate::routes::{json_error, redirect, session_expired};
use crate::services::ServiceError;
use crate::services::review::{
    refresh_risk_flags, retry_field_edit, revert_field_edit, submit_field_edit,
};

fn respond<T: serde::Serialize>(result: Result<T, ServiceError>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(err) => {
            log::warn!("Field request failed: {err}");
            json_error(&err)
        }
    }
}

#[post("/upload/{wizard_id}/fields")]
pub async fn edit_field(
    wizard_id: web::Path<WizardId>,
    web::Form(form): web::Form<EditFieldForm>,
    registry: web::Data<WizardRegistry>,
    collaborator: web::Data<dyn Collaborator>,
) -> impl Responder {
    let (path, draft) = match form.into_parts() {
        Ok(parts) => parts,
        Err(err) => return json_error(&ServiceError::Form(err)),
    };
    respond(
        submit_field_edit(collaborator.get_ref(), &registry, &wizard_id, &path, draft).await,
    )
}

#[post("/upload/{wizard_id}/fields/retry")]
pub async fn retry_field(
    wizard_id: web::Path<WizardId>,
    web::Form(form): web::Form<FieldPathForm>,
    registry: web::Data<WizardRegistry>,
    collaborator: web::Data<dyn Collaborator>,
) -> impl Responder {
    let path = match FieldPath::try_from(form) {
        Ok(path) => path,
        Err(err) => return json_error(&ServiceError::Form(err)),
    };
    respond(retry_field_edit(collaborator.get_ref(), &registry, &wizard_id, &path).await)
}

#[post("/upload/{wizard_id}/fields/revert")]
pub async fn revert_field(
    wizard_id: web::Path<WizardId>,
    web::Form(form): web::Form<FieldPathForm>,
    registry: web::Data<WizardRegistry>,
) -> impl Responder {
    let path = match FieldPath::try_from(form) {
        Ok(path) => path,
        Err(err) => return json_error(&ServiceError::Form(err)),
    };
    respond(revert_field_edit(&registry, &wizard_id, &path))
}

#[post("/upload/{wizard_id}/risks")]
pub async fn refresh_risks(
    wizard_id: web::Path<WizardId>,
    registry: web::Data<WizardRegistry>,
    collaborator: web::Data<dyn Collaborator>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match refresh_risk_flags(collaborator.get_ref(), &registry, &wizard_id).await {
        Ok(0) => FlashMessage::success("Risk analysis complete. No risk flags detected.").send(),
        Ok(count) => {
            FlashMessage::info(format!("Risk analysis complete. {count} risk flags detected."))
                .send()
        }
        Err(ServiceError::NotFound) => return session_expired(&tera, &flash_messages),
        Err(err) => {
            FlashMessage::error(
                err_message(&err).unwrap_or("Risk analysis failed. Please try again."),
            )
            .send();
        }
    }
    redirect(&format!("/upload/{wizard_id}"))
}

fn err_message(err: &ServiceError) -> Option<&str> {
    match err {
        ServiceError::Gateway(gateway) => gateway.user_message(),
        _ => None,
    }
}

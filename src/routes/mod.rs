//! HTTP handlers and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::{StatusCode, header};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde_json::json;
use tera::{Context, Tera};

use crate::domain::wizard::WizardError;
use crate::services::ServiceError;

pub mod activity;
pub mod main;
pub mod review;
pub mod upload;

/// Maps flash message levels to Bootstrap alert classes.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context every page starts from: pending flash alerts and the page name.
pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();
    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    render_with_status(tera, template, context, StatusCode::OK)
}

pub fn render_with_status(
    tera: &Tera,
    template: &str,
    context: &Context,
    status: StatusCode,
) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Page shown for a missing or already finished upload session.
pub fn session_expired(tera: &Tera, flash_messages: &IncomingFlashMessages) -> HttpResponse {
    let context = base_context(flash_messages, "upload");
    render_with_status(tera, "upload/expired.html", &context, StatusCode::NOT_FOUND)
}

/// JSON error body for the inline editor endpoints.
pub fn json_error(err: &ServiceError) -> HttpResponse {
    let status = match err {
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Form(_) => StatusCode::BAD_REQUEST,
        ServiceError::Wizard(WizardError::UnknownField(_)) => StatusCode::NOT_FOUND,
        ServiceError::Wizard(_) => StatusCode::CONFLICT,
        ServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,
    };
    HttpResponse::build(status).json(json!({ "detail": err.to_string() }))
}

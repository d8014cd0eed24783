#[cfg(feature = "server")]
use std::sync::Arc;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_multipart::form::MultipartFormConfig;
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::gateway::Collaborator;
#[cfg(feature = "server")]
use crate::gateway::http::HttpCollaborator;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::WizardRegistry;

pub mod domain;
pub mod dto;
pub mod humanize;

#[cfg(feature = "server")]
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod gateway;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

/// Registers every route of the service.
#[cfg(feature = "server")]
pub fn configure(cfg: &mut web::ServiceConfig) {
    use crate::routes::activity::{agreement_activity, outlet_activity};
    use crate::routes::main::health;
    use crate::routes::review::{edit_field, refresh_risks, retry_field, revert_field};
    use crate::routes::upload::{
        dismiss, done, extract, open_upload, restart, show_wizard, upload_file,
    };

    cfg.service(health)
        .service(open_upload)
        .service(show_wizard)
        .service(upload_file)
        .service(extract)
        .service(restart)
        .service(dismiss)
        .service(done)
        .service(edit_field)
        .service(retry_field)
        .service(revert_field)
        .service(refresh_risks)
        .service(agreement_activity)
        .service(outlet_activity);
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let collaborator: Arc<dyn Collaborator> =
        Arc::new(HttpCollaborator::new(&server_config.collaborator_url));
    let collaborator = web::Data::from(collaborator);

    // Shared by all workers.
    let registry = web::Data::new(WizardRegistry::new());

    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid secret key: {e}")))?;
    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting lease review on {}:{} against {}",
        bind_address.0,
        bind_address.1,
        server_config.collaborator_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .configure(configure)
            .app_data(
                MultipartFormConfig::default().total_limit(server_config.max_upload_bytes()),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(registry.clone())
            .app_data(collaborator.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}

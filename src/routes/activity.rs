use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::types::{AgreementId, EntityRef, OutletId};
use crate::gateway::Collaborator;
use crate::routes::{base_context, render_template};
use crate::services::activity::load_timeline;

async fn render_activity(
    entity: EntityRef,
    collaborator: &dyn Collaborator,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    let mut context = base_context(flash_messages, "activity");
    context.insert("entity_collection", entity.collection());
    context.insert("entity_id", &entity.id().to_string());
    match load_timeline(collaborator, entity).await {
        Ok(page) => context.insert("timeline", &page),
        Err(err) => {
            log::error!("Failed to render activity timeline: {err}");
            context.insert("load_error", "Activity could not be loaded. Please try again.");
        }
    }
    render_template(tera, "activity/index.html", &context)
}

#[get("/agreements/{agreement_id}/activity")]
pub async fn agreement_activity(
    agreement_id: web::Path<AgreementId>,
    collaborator: web::Data<dyn Collaborator>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let entity = EntityRef::Agreement(agreement_id.into_inner());
    render_activity(entity, collaborator.get_ref(), &flash_messages, &tera).await
}

#[get("/outlets/{outlet_id}/activity")]
pub async fn outlet_activity(
    outlet_id: web::Path<OutletId>,
    collaborator: web::Data<dyn Collaborator>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let entity = EntityRef::Outlet(outlet_id.into_inner());
    render_activity(entity, collaborator.get_ref(), &flash_messages, &tera).await
}

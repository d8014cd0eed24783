use actix_web::{HttpResponse, Responder, get};
use chrono::Utc;
use serde_json::json;

pub const SERVICE_NAME: &str = "lease-review";

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

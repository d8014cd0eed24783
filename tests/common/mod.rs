//! Shared fixtures: an in-process fake collaborator and an app builder.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lease_review::domain::activity::{ActivityAction, ActivityEntry};
use lease_review::domain::extraction::{ExtractionResult, RiskFlag};
use lease_review::domain::field_update::FieldUpdate;
use lease_review::domain::review::FailedEditPolicy;
use lease_review::domain::types::{AgreementId, EntityRef};
use lease_review::domain::wizard::SelectedFile;
use lease_review::gateway::{
    ActivityReader, DocumentExtractor, FieldReconciler, GatewayError,
    GatewayResult, RiskAnalyzer,
};
use lease_review::models::config::ServerConfig;
use serde_json::{Map, Value, json};

pub const AGREEMENT_ID: &str = "3f2c1a9e-8d4b-4c1e-9a7f-0b6d5e4c3a21";

/// Canned answers plus a record of every field update received.
#[derive(Default)]
pub struct FakeCollaborator {
    pub reject_extraction: Option<String>,
    pub reject_updates: bool,
    pub submitted: Mutex<Vec<String>>,
    pub updates: Mutex<Vec<FieldUpdate>>,
}

pub fn lease_extraction() -> ExtractionResult {
    serde_json::from_value(json!({
        "status": "success",
        "document_type": "lease_loi",
        "extraction": {
            "parties": {"lessor_name": "Acme Realty", "lessee_name": "Brew Co"},
            "rent": {"base_rent": 50000, "base_rent_confidence": "medium"},
            "premises": {"carpet_area_sqft": null, "city": "Pune"}
        },
        "confidence": {"base_rent": "medium", "lessor_name": "high"},
        "risk_flags": [{
            "flag_id": 2,
            "severity": "high",
            "explanation": "Escalation above 15%",
            "clause_text": "Rent shall escalate by 20% every year."
        }],
        "filename": "lease_123.pdf"
    }))
    .expect("valid extraction fixture")
}

#[async_trait]
impl DocumentExtractor for FakeCollaborator {
    async fn submit_document(
        &self,
        _agreement_id: AgreementId,
        file: &SelectedFile,
    ) -> GatewayResult<ExtractionResult> {
        self.submitted.lock().unwrap().push(file.filename.clone());
        match &self.reject_extraction {
            Some(message) => Err(GatewayError::Rejected(message.clone())),
            None => Ok(lease_extraction()),
        }
    }
}

#[async_trait]
impl FieldReconciler for FakeCollaborator {
    async fn apply_field_update(
        &self,
        _agreement_id: AgreementId,
        update: &FieldUpdate,
    ) -> GatewayResult<()> {
        self.updates.lock().unwrap().push(update.clone());
        if self.reject_updates {
            return Err(GatewayError::from_response(
                409,
                r#"{"detail": "Agreement is locked"}"#.into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityReader for FakeCollaborator {
    async fn fetch_activity(&self, _entity: &EntityRef) -> GatewayResult<Vec<ActivityEntry>> {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        Ok(vec![
            ActivityEntry {
                id: "2".into(),
                created_at: at,
                actor_name: Some("Asha".into()),
                action: ActivityAction::from_tagged(
                    "status_changed",
                    json!({"old_status": "fit_out", "new_status": "operational"}),
                ),
            },
            ActivityEntry {
                id: "1".into(),
                created_at: at,
                actor_name: None,
                action: ActivityAction::from_tagged("custom_tag_x", json!({"note": "x"})),
            },
        ])
    }
}

#[async_trait]
impl RiskAnalyzer for FakeCollaborator {
    async fn reanalyze_risks(
        &self,
        _agreement_id: AgreementId,
        _extraction: &Map<String, Value>,
    ) -> GatewayResult<Vec<RiskFlag>> {
        Ok(Vec::new())
    }
}

pub fn server_config() -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".into(),
        port: 0,
        templates_dir: "templates/**/*".into(),
        secret: String::new(),
        collaborator_url: "http://collaborator.test".into(),
        failed_edit_policy: FailedEditPolicy::KeepEdit,
        max_upload_mb: 5,
    }
}

/// Builds the test service around the given fake collaborator.
macro_rules! init_app {
    ($fake:expr) => {{
        let tera = tera::Tera::new("templates/**/*").expect("templates parse");
        let collaborator: std::sync::Arc<dyn lease_review::gateway::Collaborator> = $fake;
        let message_store = actix_web_flash_messages::storage::CookieMessageStore::builder(
            actix_web::cookie::Key::generate(),
        )
        .build();
        let message_framework =
            actix_web_flash_messages::FlashMessagesFramework::builder(message_store).build();

        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(message_framework)
                .configure(lease_review::configure)
                .app_data(actix_web::web::Data::new(tera))
                .app_data(actix_web::web::Data::new(
                    lease_review::repository::WizardRegistry::new(),
                ))
                .app_data(actix_web::web::Data::from(collaborator))
                .app_data(actix_web::web::Data::new($crate::common::server_config())),
        )
        .await
    }};
}

/// Hand-built multipart body with a single `file` part.
pub fn multipart_file(filename: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "lease-review-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

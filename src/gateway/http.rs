//! reqwest-backed client for the collaborator's REST API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::activity::{ActivityEntry, parse_activity_log};
use crate::domain::extraction::{ExtractionResult, RiskFlag};
use crate::domain::field_update::FieldUpdate;
use crate::domain::types::{AgreementId, EntityRef};
use crate::domain::wizard::SelectedFile;
use crate::gateway::{
    ActivityReader, DocumentExtractor, FieldReconciler, GatewayError, GatewayResult, RiskAnalyzer,
};

/// HTTP client for the collaborator. No request timeout is applied.
#[derive(Clone, Debug)]
pub struct HttpCollaborator {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct RiskFlagsRequest<'a> {
    agreement_id: AgreementId,
    extracted_data: &'a Map<String, Value>,
}

#[derive(Deserialize)]
struct RiskFlagsResponse {
    #[serde(default, alias = "flags")]
    risk_flags: Vec<RiskFlag>,
}

impl HttpCollaborator {
    /// `base_url` like `http://localhost:8000`; a trailing slash is dropped.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn ensure_success(resp: reqwest::Response) -> GatewayResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(GatewayError::from_response(status.as_u16(), body))
    }
}

/// Interprets a 200 extraction body. `{"status": "failed"}` is a rejection,
/// not a result.
fn parse_extraction(body: Value) -> GatewayResult<ExtractionResult> {
    if body.get("status").and_then(Value::as_str) == Some("failed") {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(GatewayError::Rejected(message));
    }
    Ok(serde_json::from_value(body)?)
}

#[async_trait]
impl DocumentExtractor for HttpCollaborator {
    async fn submit_document(
        &self,
        agreement_id: AgreementId,
        file: &SelectedFile,
    ) -> GatewayResult<ExtractionResult> {
        let url = self.url("/api/upload-and-extract");
        log::info!(
            "Submitting {} ({} bytes) for agreement {agreement_id}",
            file.filename,
            file.size()
        );

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
        if let Some(mime) = file.declared_type.as_deref() {
            part = part.mime_str(mime)?;
        }
        let form = Form::new()
            .part("file", part)
            .text("agreement_id", agreement_id.to_string());

        let resp = self.client.post(&url).multipart(form).send().await?;
        let resp = Self::ensure_success(resp).await?;
        let body: Value = resp.json().await?;
        parse_extraction(body)
    }
}

#[async_trait]
impl FieldReconciler for HttpCollaborator {
    async fn apply_field_update(
        &self,
        agreement_id: AgreementId,
        update: &FieldUpdate,
    ) -> GatewayResult<()> {
        let url = self.url(&format!("/api/agreements/{agreement_id}/extraction"));
        log::info!("Updating {} on agreement {agreement_id}", update.path);
        let resp = self.client.patch(&url).json(update).send().await?;
        Self::ensure_success(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityReader for HttpCollaborator {
    async fn fetch_activity(&self, entity: &EntityRef) -> GatewayResult<Vec<ActivityEntry>> {
        let url = self.url(&format!(
            "/api/{}/{}/activity",
            entity.collection(),
            entity.id()
        ));
        let resp = self.client.get(&url).send().await?;
        let resp = Self::ensure_success(resp).await?;
        let records: Vec<Value> = resp.json().await?;
        Ok(parse_activity_log(records))
    }
}

#[async_trait]
impl RiskAnalyzer for HttpCollaborator {
    async fn reanalyze_risks(
        &self,
        agreement_id: AgreementId,
        extraction: &Map<String, Value>,
    ) -> GatewayResult<Vec<RiskFlag>> {
        let url = self.url("/api/risk-flags");
        let request = RiskFlagsRequest {
            agreement_id,
            extracted_data: extraction,
        };
        let resp = self.client.post(&url).json(&request).send().await?;
        let resp = Self::ensure_success(resp).await?;
        let parsed: RiskFlagsResponse = resp.json().await?;
        log::info!(
            "Risk analysis for agreement {agreement_id} returned {} flags",
            parsed.risk_flags.len()
        );
        Ok(parsed.risk_flags)
    }
}

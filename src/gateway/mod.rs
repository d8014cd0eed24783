//! Contracts with the document-intelligence collaborator.
//!
//! Each trait covers one remote capability. Services are generic over the
//! narrowest trait they need; routes hold the whole [`Collaborator`] behind
//! `web::Data<dyn Collaborator>`.

use async_trait::async_trait;

use crate::domain::activity::ActivityEntry;
use crate::domain::extraction::{ExtractionResult, RiskFlag};
use crate::domain::field_update::FieldUpdate;
use crate::domain::types::{AgreementId, EntityRef};
use crate::domain::wizard::SelectedFile;

pub mod errors;
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;

pub use errors::{GatewayError, GatewayResult};

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Sends the file for extraction and waits for the full result.
    async fn submit_document(
        &self,
        agreement_id: AgreementId,
        file: &SelectedFile,
    ) -> GatewayResult<ExtractionResult>;
}

#[async_trait]
pub trait FieldReconciler: Send + Sync {
    /// Applies one sparse field update to the stored extraction.
    async fn apply_field_update(
        &self,
        agreement_id: AgreementId,
        update: &FieldUpdate,
    ) -> GatewayResult<()>;
}

#[async_trait]
pub trait ActivityReader: Send + Sync {
    async fn fetch_activity(&self, entity: &EntityRef) -> GatewayResult<Vec<ActivityEntry>>;
}

#[async_trait]
pub trait RiskAnalyzer: Send + Sync {
    /// Re-runs risk analysis against the given extraction.
    async fn reanalyze_risks(
        &self,
        agreement_id: AgreementId,
        extraction: &serde_json::Map<String, serde_json::Value>,
    ) -> GatewayResult<Vec<RiskFlag>>;
}

/// Everything the HTTP layer needs from the collaborator.
pub trait Collaborator: DocumentExtractor + FieldReconciler + ActivityReader + RiskAnalyzer {}

impl<T> Collaborator for T where
    T: DocumentExtractor + FieldReconciler + ActivityReader + RiskAnalyzer
{}

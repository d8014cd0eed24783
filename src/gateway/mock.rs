//! Mock collaborator for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Map, Value};

use crate::domain::activity::ActivityEntry;
use crate::domain::extraction::{ExtractionResult, RiskFlag};
use crate::domain::field_update::FieldUpdate;
use crate::domain::types::{AgreementId, EntityRef};
use crate::domain::wizard::SelectedFile;
use crate::gateway::{
    ActivityReader, DocumentExtractor, FieldReconciler, GatewayResult, RiskAnalyzer,
};

mock! {
    pub Collaborator {}

    #[async_trait]
    impl DocumentExtractor for Collaborator {
        async fn submit_document(
            &self,
            agreement_id: AgreementId,
            file: &SelectedFile,
        ) -> GatewayResult<ExtractionResult>;
    }

    #[async_trait]
    impl FieldReconciler for Collaborator {
        async fn apply_field_update(
            &self,
            agreement_id: AgreementId,
            update: &FieldUpdate,
        ) -> GatewayResult<()>;
    }

    #[async_trait]
    impl ActivityReader for Collaborator {
        async fn fetch_activity(&self, entity: &EntityRef) -> GatewayResult<Vec<ActivityEntry>>;
    }

    #[async_trait]
    impl RiskAnalyzer for Collaborator {
        async fn reanalyze_risks(
            &self,
            agreement_id: AgreementId,
            extraction: &Map<String, Value>,
        ) -> GatewayResult<Vec<RiskFlag>>;
    }
}

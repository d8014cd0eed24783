//! Service layer orchestrating wizard sessions and collaborator calls.

use thiserror::Error;

use crate::domain::types::WizardId;
use crate::domain::wizard::{UploadWizard, WizardError};
use crate::forms::FormError;
use crate::gateway::GatewayError;
use crate::repository::WizardRegistry;

pub mod activity;
pub mod review;
pub mod upload;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("upload session not found")]
    NotFound,

    #[error("invalid form: {0}")]
    Form(#[from] FormError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("collaborator error: {0}")]
    Gateway(#[from] GatewayError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Runs `f` against one session's wizard under the registry lock.
pub(crate) fn with_session<T>(
    registry: &WizardRegistry,
    wizard_id: &WizardId,
    f: impl FnOnce(&mut UploadWizard) -> Result<T, WizardError>,
) -> ServiceResult<T> {
    registry
        .with_wizard(wizard_id, f)
        .ok_or(ServiceError::NotFound)?
        .map_err(ServiceError::from)
}

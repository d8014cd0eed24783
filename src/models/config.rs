//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::domain::review::FailedEditPolicy;

fn default_max_upload_mb() -> usize {
    25
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    /// Flash-message cookie key material, at least 64 bytes.
    pub secret: String,
    /// Base URL of the document-intelligence collaborator.
    pub collaborator_url: String,
    #[serde(default)]
    pub failed_edit_policy: FailedEditPolicy,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

//! Error conversion glue between layers.
//!
//! The domain layer must not depend on gateway error types.

use crate::domain::wizard::ExtractionFailure;
use crate::gateway::GatewayError;

impl From<&GatewayError> for ExtractionFailure {
    fn from(err: &GatewayError) -> Self {
        match err.user_message() {
            Some(message) => ExtractionFailure::new(message),
            None => ExtractionFailure::without_message(),
        }
    }
}

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collaborator returned {status}: {body}")]
    Server {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    #[error("extraction rejected: {0}")]
    Rejected(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl GatewayError {
    /// Wraps a non-success response, lifting `{"detail": "..."}` out of the body.
    pub fn from_response(status: u16, body: String) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|parsed| parsed.detail.trim().to_string())
            .filter(|detail| !detail.is_empty());
        GatewayError::Server {
            status,
            body,
            detail,
        }
    }

    /// Human-readable message supplied by the collaborator, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            GatewayError::Server { detail, .. } => detail.as_deref(),
            GatewayError::Rejected(message) => {
                Some(message.trim()).filter(|message| !message.is_empty())
            }
            GatewayError::Http(_) | GatewayError::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_lifted_from_error_body() {
        let err = GatewayError::from_response(
            400,
            r#"{"detail": "Only PDF files are supported"}"#.into(),
        );
        assert_eq!(err.user_message(), Some("Only PDF files are supported"));
    }

    #[test]
    fn structured_or_missing_detail_is_not_shown() {
        let validation = GatewayError::from_response(
            422,
            r#"{"detail": [{"loc": ["body", "file"], "msg": "field required"}]}"#.into(),
        );
        assert_eq!(validation.user_message(), None);

        let html = GatewayError::from_response(502, "<html>Bad Gateway</html>".into());
        assert_eq!(html.user_message(), None);
        assert_eq!(
            html.to_string(),
            "collaborator returned 502: <html>Bad Gateway</html>"
        );
    }

    #[test]
    fn blank_rejection_has_no_message() {
        assert_eq!(GatewayError::Rejected("  ".into()).user_message(), None);
        assert_eq!(
            GatewayError::Rejected("Scanned PDF".into()).user_message(),
            Some("Scanned PDF")
        );
    }
}

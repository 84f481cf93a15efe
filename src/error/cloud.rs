use reqwest::StatusCode;
use thiserror::Error as ThisError;

use super::IsThrottled;

/// Failure of a single control-plane call.
#[derive(Debug, ThisError)]
pub enum CloudError {
    /// Non-2xx answer from the provider.
    #[error("{status} - {code} - {message}")]
    Service {
        status: StatusCode,
        code: String,
        message: String,
        opc_request_id: Option<String>,
    },

    /// Transport-level failure (DNS, connect, timeouts, etc).
    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request signing error: {0}")]
    Signing(String),

    /// Well-formed answer that lacks what the caller needs (e.g. no VNIC attached yet).
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl CloudError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CloudError::Service { status, .. } => Some(*status),
            CloudError::Reqwest(e) => e.status(),
            _ => None,
        }
    }
}

impl IsThrottled for CloudError {
    fn is_throttled(&self) -> bool {
        matches!(self.status(), Some(StatusCode::TOO_MANY_REQUESTS))
    }
}

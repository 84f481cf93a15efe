use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Failure of a single chat delivery call.
#[derive(Debug, ThisError)]
pub enum ChatError {
    #[error("Bot API error: status={status}, code={error_code:?}, description={description}")]
    Api {
        status: StatusCode,
        error_code: Option<i64>,
        description: String,
    },

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Bot API answered ok without a result")]
    MissingResult,
}

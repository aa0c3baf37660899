use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

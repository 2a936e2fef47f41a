use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to the brokerage API.
///
/// None of these are fatal to the tracker; the poll loop turns them into
/// "no data this cycle".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {preview}")]
    Status { status: StatusCode, preview: String },

    #[error("Non-JSON response: {0}")]
    NonJson(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API returned status '{0}'")]
    Api(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Request(e) if e.is_timeout())
    }
}

use thiserror::Error;

/// Errors raised by the remote listing primitives.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the server rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

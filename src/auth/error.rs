use thiserror::Error;

/// Failures while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "No credentials configured: set --access-token, or all of --client-id, \
         --client-secret and --refresh-token"
    )]
    MissingCredentials,

    #[error("Token endpoint rejected the refresh (HTTP {status}): {message}")]
    TokenRejected { status: u16, message: String },

    #[error("Invalid token response: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

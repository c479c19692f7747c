//! Access-token resolution.
//!
//! A configured access token is used as-is. Otherwise a refresh token is
//! exchanged at the OAuth token endpoint. The token is resolved once before
//! the run starts and is not refreshed mid-run.

pub mod error;
pub mod responses;

use reqwest::Client;

use self::error::AuthError;
use self::responses::{TokenErrorResponse, TokenResponse};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Credential material as configured; any field may be absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Produce a bearer token for the library API.
pub async fn resolve_access_token(
    client: &Client,
    credentials: &Credentials,
    token_url: &str,
) -> Result<String, AuthError> {
    if let Some(token) = non_empty(&credentials.access_token) {
        tracing::debug!("Using configured access token");
        return Ok(token.to_string());
    }

    let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
        non_empty(&credentials.client_id),
        non_empty(&credentials.client_secret),
        non_empty(&credentials.refresh_token),
    ) else {
        return Err(AuthError::MissingCredentials);
    };

    tracing::debug!("Exchanging refresh token at {}", token_url);
    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<TokenErrorResponse>(&body)
            .map(|e| e.message())
            .unwrap_or(body);
        return Err(AuthError::TokenRejected {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = serde_json::from_str(&body)?;
    if token.access_token.trim().is_empty() {
        return Err(AuthError::InvalidToken("empty access_token".into()));
    }
    tracing::debug!(
        token_type = token.token_type.as_deref().unwrap_or("unknown"),
        expires_in_secs = ?token.expires_in,
        "Obtained access token"
    );
    Ok(token.access_token)
}

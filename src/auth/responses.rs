use serde::Deserialize;

/// Successful response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body returned by the token endpoint on a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    pub fn message(&self) -> String {
        match &self.error_description {
            Some(desc) => format!("{}: {}", self.error, desc),
            None => self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parses() {
        let json = r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer","scope":"x"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "ya29.abc");
        assert_eq!(resp.expires_in, Some(3599));
        assert_eq!(resp.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn test_token_response_requires_access_token() {
        assert!(serde_json::from_str::<TokenResponse>(r#"{"expires_in":10}"#).is_err());
    }

    #[test]
    fn test_error_message() {
        let with_desc: TokenErrorResponse = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
        )
        .unwrap();
        assert_eq!(
            with_desc.message(),
            "invalid_grant: Token has been expired or revoked."
        );

        let bare: TokenErrorResponse = serde_json::from_str(r#"{"error":"invalid_client"}"#).unwrap();
        assert_eq!(bare.message(), "invalid_client");
    }
}

//! OAuth2 bearer token acquisition
//!
//! Application-only authentication: the API key pair is exchanged for a
//! bearer token with the `client_credentials` grant, see
//! https://developer.twitter.com/en/docs/authentication/api-reference/token

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use tweetscout_core::{BearerCredential, Error, PostRequest, Result, Transport};

/// Token endpoint path, relative to the API base URL
pub const TOKEN_PATH: &str = "/oauth2/token";

/// The only grant type the token endpoint accepts
pub const GRANT_TYPE: &str = "client_credentials";

/// Response from the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(default)]
    pub access_token: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    /// Validate the payload and turn it into a credential
    pub fn into_credential(self) -> Result<BearerCredential> {
        if self.access_token.is_empty() {
            return Err(Error::auth(
                None,
                "token endpoint returned no access_token",
            ));
        }
        if !self.token_type.eq_ignore_ascii_case("bearer") {
            warn!(
                "Token endpoint returned unexpected token_type '{}'",
                self.token_type
            );
        }
        Ok(BearerCredential::new(self.access_token, self.token_type))
    }
}

/// Parse a token endpoint body
pub fn parse_token_response(body: Value) -> Result<BearerCredential> {
    let response: TokenResponse = serde_json::from_value(body)
        .map_err(|e| Error::auth(None, format!("malformed token response: {}", e)))?;
    response.into_credential()
}

/// Request a new bearer token from `{base_url}/oauth2/token`
///
/// Sends `POST ?grant_type=client_credentials` with HTTP Basic credentials
/// `(api_key, api_secret_key)`. Every failure, including network errors, is
/// reported as `Error::Auth`. Nothing is retried here.
#[instrument(skip(transport, api_key, api_secret_key))]
pub async fn request_bearer_token(
    transport: &dyn Transport,
    base_url: &str,
    api_key: &str,
    api_secret_key: &str,
) -> Result<BearerCredential> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH);
    debug!("Requesting bearer token from {}", url);

    let request = PostRequest::new(url)
        .param("grant_type", GRANT_TYPE)
        .basic_auth(api_key, api_secret_key);

    let response = transport.post(request).await.map_err(|e| match e {
        Error::Auth { .. } => e,
        Error::Transport(message) => Error::auth(None, message),
        other => Error::auth(None, other.to_string()),
    })?;

    if !response.is_success() {
        warn!("Token endpoint rejected credentials with status {}", response.status);
        return Err(Error::auth(Some(response.status), response.body_text()));
    }

    let credential = parse_token_response(response.body)?;
    info!(
        "Obtained bearer token ({} chars)",
        credential.value.len()
    );
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_token_response_success() {
        let credential =
            parse_token_response(json!({"token_type": "bearer", "access_token": "T1"})).unwrap();
        assert_eq!(credential, BearerCredential::bearer("T1"));
    }

    #[test]
    fn test_parse_token_response_defaults_token_type() {
        let credential = parse_token_response(json!({"access_token": "T2"})).unwrap();
        assert_eq!(credential.token_type, "bearer");
        assert_eq!(credential.value, "T2");
    }

    #[test]
    fn test_parse_token_response_missing_token() {
        let result = parse_token_response(json!({"token_type": "bearer"}));
        assert!(matches!(result, Err(Error::Auth { .. })));

        let result = parse_token_response(json!({"access_token": ""}));
        assert!(matches!(result, Err(Error::Auth { .. })));
    }

    #[test]
    fn test_parse_token_response_malformed() {
        assert!(matches!(
            parse_token_response(json!("Service Unavailable")),
            Err(Error::Auth { status_code: None, .. })
        ));
        assert!(matches!(
            parse_token_response(json!({"access_token": 42})),
            Err(Error::Auth { .. })
        ));
    }

    #[test]
    fn test_unexpected_token_type_is_kept() {
        let credential =
            parse_token_response(json!({"token_type": "mac", "access_token": "T3"})).unwrap();
        assert_eq!(credential.token_type, "mac");
    }
}

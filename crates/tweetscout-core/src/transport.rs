//! Transport trait definitions
//!
//! The search client never talks to an HTTP library directly. It hands
//! fully described requests to a `Transport` and inspects the status and
//! JSON body that come back.

use crate::Result;
use serde_json::Value;

/// A GET request: URL, query parameters and extra headers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl GetRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A bodiless POST authenticated with HTTP Basic credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
    /// `(username, password)` for the `Authorization: Basic` header
    pub basic_auth: Option<(String, String)>,
}

impl PostRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }
}

/// Status and decoded body of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Short human-readable description of the body for error messages
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// HTTP verb sender consumed by the search client
///
/// Implementations return `Ok` for every response the server produced,
/// whatever its status, and `Err(Error::Transport)` only when no response
/// was obtained (connection failure, timeout).
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a GET request
    async fn get(&self, request: GetRequest) -> Result<TransportResponse>;

    /// Send a POST request
    async fn post(&self, request: PostRequest) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request_builder() {
        let request = GetRequest::new("http://localhost/search")
            .param("q", "cats")
            .param("count", "30")
            .header("Authorization", "Bearer T1");

        assert_eq!(request.params.len(), 2);
        assert_eq!(request.header_value("authorization"), Some("Bearer T1"));
        assert_eq!(request.header_value("x-missing"), None);
    }

    #[test]
    fn test_post_request_builder() {
        let request = PostRequest::new("http://localhost/oauth2/token")
            .param("grant_type", "client_credentials")
            .basic_auth("key", "secret");

        assert_eq!(
            request.basic_auth,
            Some(("key".to_string(), "secret".to_string()))
        );
        assert_eq!(
            request.params,
            vec![("grant_type".to_string(), "client_credentials".to_string())]
        );
    }

    #[test]
    fn test_response_status_classification() {
        assert!(TransportResponse::new(200, json!({})).is_success());
        assert!(TransportResponse::new(204, Value::Null).is_success());
        assert!(!TransportResponse::new(401, Value::Null).is_success());
        assert!(TransportResponse::new(401, Value::Null).is_unauthorized());
        assert!(!TransportResponse::new(403, Value::Null).is_unauthorized());
    }

    #[test]
    fn test_response_body_text() {
        assert_eq!(TransportResponse::new(500, Value::Null).body_text(), "");
        assert_eq!(
            TransportResponse::new(502, json!("Bad Gateway")).body_text(),
            "Bad Gateway"
        );
        assert_eq!(
            TransportResponse::new(400, json!({"errors": [1]})).body_text(),
            r#"{"errors":[1]}"#
        );
    }
}

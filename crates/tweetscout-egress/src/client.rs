//! Shared HTTP client utilities and the reqwest-backed transport

use crate::{EgressError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use tweetscout_core::{GetRequest, PostRequest, Transport, TransportResponse};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds, covering connect, send and body read
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 8,
            user_agent: format!("TweetScout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        // Drop idle connections before the remote end closes them
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// `Transport` implementation on top of a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            timeout_secs: config.timeout_secs,
        })
    }

    fn classify(&self, err: reqwest::Error) -> EgressError {
        if err.is_timeout() {
            EgressError::Timeout(self.timeout_secs)
        } else {
            EgressError::HttpError(err)
        }
    }

    async fn decode(&self, response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(status, body_len = bytes.len(), "Received response");
        Ok(TransportResponse::new(status, decode_body(&bytes)))
    }
}

/// Append URL-encoded query parameters to `url`
pub fn build_url(url: &str, params: &[(String, String)]) -> Result<Url> {
    let mut url = Url::parse(url)
        .map_err(|e| EgressError::ConfigError(format!("Invalid URL '{}': {}", url, e)))?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

/// JSON body, `null` when empty, or the raw text as a JSON string otherwise
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: GetRequest) -> tweetscout_core::Result<TransportResponse> {
        let url = build_url(&request.url, &request.params)?;
        debug!(url = %url.path(), "GET");

        let mut builder = self.client.get(url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        Ok(self.decode(response).await?)
    }

    async fn post(&self, request: PostRequest) -> tweetscout_core::Result<TransportResponse> {
        let url = build_url(&request.url, &request.params)?;
        debug!(url = %url.path(), "POST");

        let mut builder = self.client.post(url);
        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        Ok(self.decode(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.pool_max_idle_per_host, 8);
        assert!(config.user_agent.starts_with("TweetScout/"));
    }

    #[test]
    fn test_create_client() {
        let config = HttpClientConfig::default();
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = HttpClientConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
            pool_max_idle_per_host: 1,
            user_agent: "Test/1.0".to_string(),
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_build_url_encodes_params() {
        let params = vec![
            ("q".to_string(), "from:rust lang #async".to_string()),
            ("count".to_string(), "30".to_string()),
        ];
        let url = build_url("https://api.twitter.com/1.1/search/tweets.json", &params).unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, params);
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_build_url_without_params() {
        let url = build_url("https://api.twitter.com/oauth2/token", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.twitter.com/oauth2/token");
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        assert!(matches!(
            build_url("not a url", &[]),
            Err(EgressError::ConfigError(_))
        ));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"statuses": []}"#), json!({"statuses": []}));
        assert_eq!(decode_body(b"Unauthorized"), json!("Unauthorized"));
    }

    #[test]
    fn test_error_display_formatting() {
        let err = EgressError::ConfigError("bad config".to_string());
        assert!(err.to_string().contains("Invalid configuration"));

        let err = EgressError::Timeout(30);
        assert_eq!(err.to_string(), "Request timeout after 30s");
    }

    #[test]
    fn test_egress_error_into_core_error() {
        let core: tweetscout_core::Error = EgressError::Timeout(5).into();
        assert!(matches!(core, tweetscout_core::Error::Transport(ref m) if m.contains("5s")));

        let core: tweetscout_core::Error = EgressError::ConfigError("bad".to_string()).into();
        assert!(matches!(core, tweetscout_core::Error::Config(_)));
    }
}

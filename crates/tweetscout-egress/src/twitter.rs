//! Authenticated search client
//!
//! Owns the bearer token lifecycle for the standard search endpoint:
//! - resolve a token from the credential store, or fetch and cache one
//! - send the search with `Authorization: Bearer <token>`
//! - on 401, drop the cached token, fetch a fresh one and replay once
//! - a second 401 is final and surfaces as `Error::Auth`
//!
//! Token acquisition is single-flight: concurrent callers that miss the
//! cache wait on one token request instead of issuing their own.

use crate::client::{HttpClientConfig, ReqwestTransport};
use crate::oauth::request_bearer_token;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use tweetscout_core::{
    ACCESS_TOKEN_KEY, BearerCredential, CredentialStore, Error, GetRequest, Result, SearchQuery,
    SearchResult, Transport, TransportResponse,
};

/// Public API host
pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Standard search endpoint path, relative to the API base URL
pub const SEARCH_PATH: &str = "/1.1/search/tweets.json";

/// Search client configuration
#[derive(Clone)]
pub struct TwitterConfig {
    /// Consumer API key
    pub api_key: String,

    /// Consumer API secret key
    pub api_secret_key: String,

    /// Base URL for the API (default: https://api.twitter.com)
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl TwitterConfig {
    pub fn new(api_key: impl Into<String>, api_secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret_key: api_secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_config: HttpClientConfig::default(),
        }
    }

    /// Set the base URL (for proxies and test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }
}

impl fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("api_key", &self.api_key)
            .field("api_secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("client_config", &self.client_config)
            .finish()
    }
}

/// Outcome of one search request
enum SearchAttempt {
    Completed(SearchResult),
    Unauthorized,
}

/// Search client with cached bearer credentials
pub struct AuthenticatedSearchClient {
    config: TwitterConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    token_key: String,
    token_lock: Mutex<()>,
}

impl AuthenticatedSearchClient {
    /// Create a client that sends requests over reqwest
    pub fn new(config: TwitterConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.client_config)?;
        Ok(Self::with_transport(config, Arc::new(transport), credentials))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(
        config: TwitterConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
            token_key: ACCESS_TOKEN_KEY.to_string(),
            token_lock: Mutex::new(()),
        }
    }

    /// Cache the token under a different store key
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn config(&self) -> &TwitterConfig {
        &self.config
    }

    /// Cached credential, or a freshly fetched one that is then cached
    ///
    /// Token endpoint failures are returned as `Error::Auth` and not retried.
    pub async fn get_token(&self) -> Result<BearerCredential> {
        if let Some(credential) = self.cached_token().await {
            debug!("Using cached bearer token");
            return Ok(credential);
        }

        let _guard = self.token_lock.lock().await;

        // Another caller may have filled the cache while we waited
        if let Some(credential) = self.cached_token().await {
            debug!("Bearer token fetched by concurrent caller");
            return Ok(credential);
        }

        debug!("No cached bearer token, requesting one");
        self.fetch_and_cache().await
    }

    /// Credential currently held by the store
    ///
    /// A store read failure counts as a cache miss.
    pub async fn cached_token(&self) -> Option<BearerCredential> {
        match self.credentials.get(&self.token_key).await {
            Ok(Some(value)) if !value.is_empty() => Some(BearerCredential::bearer(value)),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read cached bearer token: {}", e);
                None
            }
        }
    }

    /// Drop the cached credential
    pub async fn invalidate_token(&self) -> Result<()> {
        let _guard = self.token_lock.lock().await;
        self.credentials.remove(&self.token_key).await
    }

    /// Search with the default query validation
    ///
    /// Blank `query` text or a zero `limit` fail with `Error::InvalidRequest`
    /// before anything is sent.
    #[instrument(skip(self), fields(query_len = query.len()))]
    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResult> {
        let query = SearchQuery::new(query, limit)?;
        self.search_query(&query).await
    }

    /// Run a validated search, renewing the token at most once
    pub async fn search_query(&self, query: &SearchQuery) -> Result<SearchResult> {
        let credential = self.get_token().await?;

        match self.send_search(query, &credential).await? {
            SearchAttempt::Completed(result) => Ok(result),
            SearchAttempt::Unauthorized => {
                warn!("Search rejected with 401, renewing bearer token");
                let renewed = self.renew_token(&credential).await?;

                match self.send_search(query, &renewed).await? {
                    SearchAttempt::Completed(result) => Ok(result),
                    SearchAttempt::Unauthorized => {
                        warn!("Search still unauthorized after renewal, giving up");
                        if let Err(e) = self.credentials.remove(&self.token_key).await {
                            warn!("Failed to drop rejected bearer token: {}", e);
                        }
                        Err(Error::auth(
                            Some(401),
                            "search endpoint rejected a freshly issued token",
                        ))
                    }
                }
            }
        }
    }

    /// Replace a credential the search endpoint refused
    async fn renew_token(&self, rejected: &BearerCredential) -> Result<BearerCredential> {
        let _guard = self.token_lock.lock().await;

        if let Some(current) = self.cached_token().await
            && current.value != rejected.value
        {
            debug!("Bearer token already renewed by concurrent caller");
            return Ok(current);
        }

        if let Err(e) = self.credentials.remove(&self.token_key).await {
            warn!("Failed to drop rejected bearer token: {}", e);
        }
        self.fetch_and_cache().await
    }

    // Caller must hold `token_lock`
    async fn fetch_and_cache(&self) -> Result<BearerCredential> {
        let credential = request_bearer_token(
            self.transport.as_ref(),
            &self.config.base_url,
            &self.config.api_key,
            &self.config.api_secret_key,
        )
        .await?;

        if let Err(e) = self.credentials.set(&self.token_key, &credential.value).await {
            warn!("Failed to cache bearer token: {}", e);
        }
        Ok(credential)
    }

    async fn send_search(
        &self,
        query: &SearchQuery,
        credential: &BearerCredential,
    ) -> Result<SearchAttempt> {
        let request = GetRequest::new(self.config.search_url())
            .param("q", query.text.as_str())
            .param("count", query.limit.to_string())
            .header("Authorization", credential.authorization_header());

        let response = self.transport.get(request).await.map_err(|e| match e {
            Error::Search { .. } => e,
            Error::Transport(message) => Error::search(None, message),
            other => Error::search(None, other.to_string()),
        })?;

        classify_search_response(response)
    }
}

fn classify_search_response(response: TransportResponse) -> Result<SearchAttempt> {
    if response.is_unauthorized() {
        return Ok(SearchAttempt::Unauthorized);
    }

    if !response.is_success() {
        return Err(Error::search(Some(response.status), response.body_text()));
    }

    let status = response.status;
    let result: SearchResult = serde_json::from_value(response.body)
        .map_err(|e| Error::search(Some(status), format!("malformed search response: {}", e)))?;

    debug!("Search returned {} statuses", result.len());
    Ok(SearchAttempt::Completed(result))
}

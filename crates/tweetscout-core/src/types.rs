//! Search domain types shared by the egress client, the stores and the CLI

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Number of tweets requested per search unless the caller asks otherwise
pub const DEFAULT_SEARCH_LIMIT: u32 = 30;

/// OAuth2 bearer credential issued by the token endpoint
///
/// Never mutated after it is obtained: a refresh produces a new value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerCredential {
    pub value: String,
    pub token_type: String,
}

impl BearerCredential {
    pub fn new(value: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            token_type: token_type.into(),
        }
    }

    /// Credential of the default `bearer` type
    pub fn bearer(value: impl Into<String>) -> Self {
        Self::new(value, "bearer")
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

// Keep token values out of logs and panic messages
impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerCredential")
            .field("value", &format_args!("<{} chars>", self.value.len()))
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub limit: u32,
}

impl SearchQuery {
    /// Build a query, rejecting blank text and a zero limit
    pub fn new(text: impl Into<String>, limit: u32) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "search text must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(Error::InvalidRequest(
                "search limit must be greater than zero".to_string(),
            ));
        }
        Ok(Self { text, limit })
    }
}

/// Rewrite the first `@` so that `@user` searches tweets sent by that user
pub fn sanitize_query(text: &str) -> String {
    text.replacen('@', "from:", 1)
}

/// Search endpoint payload, passed through without interpreting the records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub statuses: Vec<Value>,

    #[serde(default)]
    pub search_metadata: Value,

    /// Any other top-level fields the endpoint returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Continuation cursor for the next page, if the server sent one
    pub fn next_results(&self) -> Option<&str> {
        self.search_metadata
            .get("next_results")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// One remembered search, persisted as `{ "search": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearchEntry {
    pub search: String,
}

impl RecentSearchEntry {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_query_validation() {
        let query = SearchQuery::new("cats", 30).unwrap();
        assert_eq!(query.text, "cats");
        assert_eq!(query.limit, 30);

        assert!(matches!(
            SearchQuery::new("", 30),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            SearchQuery::new("   \t\n", 30),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            SearchQuery::new("cats", 0),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_search_query_keeps_surrounding_whitespace() {
        let query = SearchQuery::new("  rust lang ", 5).unwrap();
        assert_eq!(query.text, "  rust lang ");
    }

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query("@rustlang"), "from:rustlang");
        assert_eq!(sanitize_query("news @a @b"), "news from:a @b");
        assert_eq!(sanitize_query("no mentions"), "no mentions");
    }

    #[test]
    fn test_bearer_credential_header() {
        let credential = BearerCredential::bearer("T1");
        assert_eq!(credential.token_type, "bearer");
        assert_eq!(credential.authorization_header(), "Bearer T1");
    }

    #[test]
    fn test_bearer_credential_debug_hides_value() {
        let credential = BearerCredential::bearer("super-secret-token");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("18 chars"));
    }

    #[test]
    fn test_search_result_passthrough() {
        let body = json!({
            "statuses": [{"id": 1, "text": "hello"}, {"id": 2, "text": "world"}],
            "search_metadata": {"count": 2, "next_results": "?max_id=1&q=cats"},
            "unexpected": true
        });

        let result: SearchResult = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.next_results(), Some("?max_id=1&q=cats"));
        assert_eq!(result.extra.get("unexpected"), Some(&json!(true)));

        // Serializes back to the same document
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[test]
    fn test_search_result_requires_statuses() {
        let result = serde_json::from_value::<SearchResult>(json!({"errors": []}));
        assert!(result.is_err());

        let result: SearchResult = serde_json::from_value(json!({"statuses": []})).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.next_results(), None);
    }

    #[test]
    fn test_recent_search_entry_wire_format() {
        let entry = RecentSearchEntry::new("cats");
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"search": "cats"}));
    }
}

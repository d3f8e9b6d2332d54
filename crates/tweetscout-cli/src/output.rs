//! Terminal rendering of search results and history

use serde_json::Value;
use tweetscout_core::{RecentSearchEntry, SearchResult};

/// One status as `@screen_name: text`, newlines folded into spaces
pub fn format_status(status: &Value) -> String {
    let screen_name = status
        .pointer("/user/screen_name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let text = status
        .get("full_text")
        .or_else(|| status.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("@{}: {}", screen_name, text)
}

pub fn format_result(result: &SearchResult) -> Vec<String> {
    if result.is_empty() {
        return vec!["No tweets found".to_string()];
    }
    result.statuses.iter().map(format_status).collect()
}

/// Numbered history lines, 1 being the most recent
pub fn format_recent(entries: &[RecentSearchEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No recent searches".to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>2}. {}", i + 1, entry.search))
        .collect()
}

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tweetscout_core::DEFAULT_SEARCH_LIMIT;
use tweetscout_egress::{HttpClientConfig, TwitterConfig, twitter::DEFAULT_BASE_URL};
use tweetscout_storage::DEFAULT_RECENT_CAPACITY;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub twitter: TwitterSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterSettings {
    #[serde(default = "default_api_key")]
    pub api_key: String,

    #[serde(default = "default_api_secret_key", skip_serializing)]
    pub api_secret_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Store file; defaults to `<config dir>/tweetscout/storage.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_false")]
    pub json: bool,
}

impl Default for TwitterSettings {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_secret_key: default_api_secret_key(),
            base_url: default_base_url(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: None,
            recent_capacity: default_recent_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // API credentials (no TWEETSCOUT_ prefix for these)
        if let Ok(val) = std::env::var("TWITTER_API_KEY") {
            self.twitter.api_key = val;
        }

        if let Ok(val) = std::env::var("TWITTER_API_SECRET_KEY") {
            self.twitter.api_secret_key = val;
        }

        if let Ok(val) = std::env::var("TWEETSCOUT_BASE_URL") {
            self.twitter.base_url = val;
        }

        if let Ok(val) = std::env::var("TWEETSCOUT_SEARCH_LIMIT") {
            match val.parse::<u32>() {
                Ok(limit) if limit > 0 => self.twitter.search_limit = limit,
                _ => eprintln!("Warning: Invalid TWEETSCOUT_SEARCH_LIMIT '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("TWEETSCOUT_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => self.http.timeout_secs = secs,
                _ => eprintln!("Warning: Invalid TWEETSCOUT_TIMEOUT_SECS '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("TWEETSCOUT_STORAGE_PATH") {
            self.storage.path = Some(val);
        }

        if let Ok(val) = std::env::var("TWEETSCOUT_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    pub fn twitter_config(&self) -> TwitterConfig {
        TwitterConfig::new(&self.twitter.api_key, &self.twitter.api_secret_key)
            .with_base_url(&self.twitter.base_url)
            .with_client_config(self.http.to_http_client_config())
    }
}

impl HttpSettings {
    pub fn to_http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_secs: self.timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            ..Default::default()
        }
    }
}

impl StorageSettings {
    /// Store file with `~` expanded
    pub fn resolved_path(&self) -> anyhow::Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => {
                let base = dirs::config_dir()
                    .context("Could not determine the user configuration directory")?;
                Ok(base.join("tweetscout").join("storage.json"))
            }
        }
    }
}

// Placeholders matching an unconfigured developer account; the token endpoint rejects them
fn default_api_key() -> String {
    "NOAPIKEY".to_string()
}

fn default_api_secret_key() -> String {
    "NOAPISECRETKEY".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_recent_capacity() -> usize {
    DEFAULT_RECENT_CAPACITY
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_false() -> bool {
    false
}

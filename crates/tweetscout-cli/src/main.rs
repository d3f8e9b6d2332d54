//! TweetScout CLI
//!
//! Search recent tweets from the terminal. The bearer token and the search
//! history are kept in a small JSON store between runs.

mod config;
mod output;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use config::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;
use tweetscout_core::{CredentialStore, PersistenceBackend, SearchQuery, sanitize_query};
use tweetscout_egress::AuthenticatedSearchClient;
use tweetscout_storage::{JsonFileStore, MemoryStore, RecentSearches};

#[derive(Parser)]
#[command(name = "tweetscout")]
#[command(about = "TweetScout - Search recent tweets from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", env = "TWEETSCOUT_CONFIG", global = true)]
    config: Option<String>,

    /// Keep the token and history in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search recent tweets; a leading @user searches tweets from that user
    Search {
        /// Search text, words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of tweets to return
        #[arg(short, long)]
        limit: Option<u32>,

        /// Print the raw search payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recent searches, most recent first
    Recent,
    /// Run a recent search again by its number in `recent`
    Replay {
        index: usize,

        #[arg(short, long)]
        limit: Option<u32>,

        #[arg(long)]
        json: bool,
    },
    /// Remove the cached bearer token
    ForgetToken,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        let config_path = shellexpand::tilde(config_path).into_owned();
        AppConfig::from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    // Environment overrides the config file
    config.merge_env();

    init_tracing(&config.logging)?;
    if let Some(config_path) = &cli.config {
        info!("Loaded configuration from {}", config_path);
    }

    let (credentials, backend) = open_stores(&config, cli.ephemeral).await?;
    let mut recent = RecentSearches::new(backend, config.storage.recent_capacity);

    match cli.command {
        Commands::Search { query, limit, json } => {
            let text = query.join(" ");
            let limit = limit.unwrap_or(config.twitter.search_limit);
            let client = AuthenticatedSearchClient::new(config.twitter_config(), credentials)?;
            run_search(&client, &mut recent, &text, limit, json, true).await?;
        }
        Commands::Recent => {
            recent.load().await;
            for line in output::format_recent(recent.entries()) {
                println!("{}", line);
            }
        }
        Commands::Replay { index, limit, json } => {
            recent.load().await;
            let text = index
                .checked_sub(1)
                .and_then(|i| recent.select(i))
                .map(|entry| entry.search.clone())
                .with_context(|| {
                    format!(
                        "No recent search #{} ({} stored)",
                        index,
                        recent.entries().len()
                    )
                })?;
            let limit = limit.unwrap_or(config.twitter.search_limit);
            let client = AuthenticatedSearchClient::new(config.twitter_config(), credentials)?;
            run_search(&client, &mut recent, &text, limit, json, false).await?;
        }
        Commands::ForgetToken => {
            credentials.remove(tweetscout_core::ACCESS_TOKEN_KEY).await?;
            println!("Cached token removed");
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    // Logs go to stderr so stdout stays clean for results
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

async fn open_stores(
    config: &AppConfig,
    ephemeral: bool,
) -> anyhow::Result<(Arc<dyn CredentialStore>, Arc<dyn PersistenceBackend>)> {
    if ephemeral {
        debug!("Using in-memory store");
        let store = Arc::new(MemoryStore::new());
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let backend: Arc<dyn PersistenceBackend> = store;
        return Ok((credentials, backend));
    }

    let path = config.storage.resolved_path()?;
    debug!("Using store file {}", path.display());
    let store = Arc::new(
        JsonFileStore::open(&path)
            .await
            .with_context(|| format!("Failed to open store {}", path.display()))?,
    );
    let credentials: Arc<dyn CredentialStore> = store.clone();
    let backend: Arc<dyn PersistenceBackend> = store;
    Ok((credentials, backend))
}

/// Validate, optionally remember, then run one search and print it
///
/// The raw text is what gets remembered; the `@` rewrite only applies to the
/// request sent.
async fn run_search(
    client: &AuthenticatedSearchClient,
    recent: &mut RecentSearches,
    text: &str,
    limit: u32,
    json: bool,
    remember: bool,
) -> anyhow::Result<()> {
    let raw = SearchQuery::new(text, limit)?;

    if remember && let Some(warning) = recent.record(raw.text.as_str()).await {
        eprintln!("Warning: {}", warning);
    }

    let query = SearchQuery::new(sanitize_query(&raw.text), raw.limit)?;
    if query.text != raw.text {
        debug!("Rewrote query '{}' as '{}'", raw.text, query.text);
    }

    let result = match client.search_query(&query).await {
        Ok(result) => result,
        Err(e) if e.is_auth() => {
            bail!("{}. Check TWITTER_API_KEY and TWITTER_API_SECRET_KEY", e)
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in output::format_result(&result) {
            println!("{}", line);
        }
    }

    Ok(())
}

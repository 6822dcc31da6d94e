use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// All clients receive their settings at construction; nothing reads the
/// environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// Overall budget for waiting on an assistant run.
    pub run_timeout: Duration,
    /// Delay between run status polls.
    pub poll_interval: Duration,
    /// Upper bound on uploaded job-description documents.
    pub max_document_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            run_timeout: Duration::from_secs(parse_env("RUN_TIMEOUT_SECS", 60)?),
            poll_interval: Duration::from_millis(parse_env("POLL_INTERVAL_MS", 1_000)?),
            max_document_bytes: parse_env("MAX_DOCUMENT_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}

use std::fmt;

use anyhow::{Context, Result};

const DEFAULT_COMPLETION_API_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Application configuration loaded from environment variables.
/// Fails at startup if the API key is missing.
#[derive(Clone)]
pub struct Config {
    pub perplexity_api_key: String,
    pub completion_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_mb: usize,
    pub session_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            perplexity_api_key: require_env("PERPLEXITY_API_KEY")?,
            completion_api_url: std::env::var("COMPLETION_API_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_API_URL.to_string()),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 10)
                .context("MAX_UPLOAD_MB must be a positive integer")?,
            session_ttl_minutes: parse_env("SESSION_TTL_MINUTES", 60)
                .context("SESSION_TTL_MINUTES must be an integer")?,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

// The API key must never reach the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("perplexity_api_key", &"<redacted>")
            .field("completion_api_url", &self.completion_api_url)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("max_upload_mb", &self.max_upload_mb)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .finish()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for '{key}': {raw}")),
        Err(_) => Ok(default),
    }
}

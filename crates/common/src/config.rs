use std::fmt;
use std::time::Duration;

use crate::error::RelayError;

/// Default GitHub REST API base.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default value of the ntfy `Title` header.
pub const DEFAULT_NTFY_TITLE: &str = "GitHub Notification";

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct AppConfig {
    /// Bearer token for the GitHub notifications API
    pub github_token: String,

    /// ntfy topic URL that notifications are POSTed to
    pub ntfy_url: String,

    /// GitHub REST API base URL (default: https://api.github.com)
    pub github_api_url: String,

    /// Title header sent with every push (default: "GitHub Notification")
    pub ntfy_title: String,

    /// Per-request timeout in seconds (default: 8, shorter than the retry delay)
    pub request_timeout_secs: u64,

    /// Delay before retrying a failed poll in seconds (default: 10)
    pub retry_delay_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, RelayError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded environment file");
        }

        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_vars<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config = Self {
            github_token: get("GITHUB_TOKEN").ok_or_else(|| required("GITHUB_TOKEN"))?,
            ntfy_url: get("NTFY_URL").ok_or_else(|| required("NTFY_URL"))?,
            github_api_url: get("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            ntfy_title: get("NTFY_TITLE").unwrap_or_else(|| DEFAULT_NTFY_TITLE.to_string()),
            request_timeout_secs: parse_secs(get("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 8)?,
            retry_delay_secs: parse_secs(get("RETRY_DELAY_SECS"), "RETRY_DELAY_SECS", 10)?,
        };

        if config.request_timeout_secs == 0 {
            return Err(RelayError::Config(
                "REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("github_token", &"<redacted>")
            .field("ntfy_url", &self.ntfy_url)
            .field("github_api_url", &self.github_api_url)
            .field("ntfy_title", &self.ntfy_title)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .finish()
    }
}

fn required(name: &str) -> RelayError {
    RelayError::Config(format!("Required environment variable {name} not set"))
}

fn parse_secs(value: Option<String>, name: &str, default: u64) -> Result<u64, RelayError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RelayError::Config(format!("{name} must be a valid u64"))),
    }
}

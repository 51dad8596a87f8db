use std::time::Duration;

use anyhow::{Context, Result};

/// Page size requested from `GET /api/tracked-jobs`. The dashboard filters and
/// paginates client-side, so this is "everything" for a realistic user.
pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

/// Client configuration. Built once at the edge and passed in explicitly;
/// nothing below `main` reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub page_limit: u32,
    /// `None` leaves request duration to the transport's defaults.
    pub request_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: trim_base_url(api_base_url.into()),
            api_token: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout: None,
            rust_log: "info".to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let request_timeout = match optional_env("TT_REQUEST_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(
                secs.parse::<u64>()
                    .context("TT_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            )),
            None => None,
        };

        Ok(Config {
            api_base_url: trim_base_url(require_env("TT_API_BASE_URL")?),
            api_token: optional_env("TT_API_TOKEN"),
            page_limit: optional_env("TT_PAGE_LIMIT")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("TT_PAGE_LIMIT must be a positive integer")?
                .unwrap_or(DEFAULT_PAGE_LIMIT),
            request_timeout,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = Config::new("https://api.example.com/ ");
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_builders() {
        let config = Config::new("http://localhost:5000")
            .with_token("t")
            .with_page_limit(50)
            .with_request_timeout(Duration::from_secs(30));
        assert_eq!(config.api_token.as_deref(), Some("t"));
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }
}

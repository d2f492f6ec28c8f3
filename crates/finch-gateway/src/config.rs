//! Gateway configuration.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the assistant backend.
///
/// The per-request timeout is the gateway's only time policy; there are no
/// retries.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Builds a config from the environment, falling back to defaults.
    ///
    /// Honors `FINCH_API_URL`.
    pub fn from_env() -> Self {
        let base_url = env::var("FINCH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_localhost() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let config = GatewayConfig::default().with_base_url("https://api.example.com/");
        assert_eq!(config.normalized_base_url(), "https://api.example.com");
    }
}

//! Client configuration
//!
//! Settings are read from an optional YAML file. Every field has a default,
//! so an empty file (or no file at all) yields a working configuration:
//!
//! ```yaml
//! base_url: "https://api.fivetran.com/v1"
//! http:
//!   timeout_seconds: 40
//!   max_retries: 3
//!   retry_backoff:
//!     type: exponential
//!     initial_ms: 100
//!     max_ms: 60000
//!   rate_limit:
//!     requests_per_second: 10
//!     burst_size: 10
//! cache:
//!   ttl_seconds: 300
//! ```
//!
//! Credentials are deliberately not part of this file; they come from the
//! command line or the environment.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.fivetran.com/v1";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root that endpoints are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Listing cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to null rather than an empty mapping.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::config("http.timeout_seconds must be greater than 0"));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(Error::config("cache.ttl_seconds must be greater than 0"));
        }
        Ok(())
    }

    /// Transport configuration derived from these settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let backoff = &self.http.retry_backoff;
        let builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                backoff.backoff_type,
                Duration::from_millis(backoff.initial_ms),
                Duration::from_millis(backoff.max_ms),
            );

        match self.http.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit).build(),
            None => builder.no_rate_limit().build(),
        }
    }

    /// How long cached listings stay fresh
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting configuration, `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    40
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

// ============================================================================
// Cache Config
// ============================================================================

/// Listing cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached listing stays fresh
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ClientConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http.timeout_seconds, 40);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
base_url: "https://eu.fivetran.example/v1"
http:
  timeout_seconds: 10
  max_retries: 5
  retry_backoff:
    type: linear
    initial_ms: 250
    max_ms: 5000
  rate_limit:
    requests_per_second: 2
    burst_size: 4
cache:
  ttl_seconds: 30
"#;

        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.base_url, "https://eu.fivetran.example/v1");
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.retry_backoff.backoff_type, BackoffType::Linear);
        assert_eq!(
            config.http.rate_limit,
            Some(RateLimiterConfig::new(2, 4))
        );
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));

        let http = config.http_client_config();
        assert_eq!(http.base_url.as_deref(), Some("https://eu.fivetran.example/v1"));
        assert_eq!(http.timeout, Duration::from_secs(10));
        assert_eq!(http.max_retries, 5);
        assert_eq!(http.initial_backoff, Duration::from_millis(250));
        assert_eq!(http.max_backoff, Duration::from_secs(5));
        assert_eq!(http.rate_limit, Some(RateLimiterConfig::new(2, 4)));
    }

    #[test]
    fn test_rate_limit_can_be_disabled() {
        let config = ClientConfig::from_yaml_str("http:\n  rate_limit: null\n").unwrap();
        assert!(config.http.rate_limit.is_none());
        assert!(config.http_client_config().rate_limit.is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::from_yaml_str("base_url: not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = ClientConfig::from_yaml_str("base_url: ftp://example.com").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = ClientConfig::from_yaml_str("cache:\n  ttl_seconds: 0\n").unwrap_err();
        assert!(err.to_string().contains("ttl_seconds"));
    }

    #[test]
    fn test_unknown_backoff_type_rejected() {
        let yaml = "http:\n  retry_backoff:\n    type: random\n";
        assert!(matches!(
            ClientConfig::from_yaml_str(yaml),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache:\n  ttl_seconds: 42").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache.ttl_seconds, 42);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/fivetran.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

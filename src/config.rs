//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Every setting has a
//! default except where noted, so the service starts with no environment.

use crate::models::query::MAX_PER_PAGE;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Base URL of the Strava REST API.
pub const DEFAULT_API_URL: &str = "https://www.strava.com/api/v3";
/// Base URL of the Strava OAuth endpoints.
pub const DEFAULT_OAUTH_URL: &str = "https://www.strava.com/oauth";
/// Cookie carrying the Strava access token.
pub const TOKEN_COOKIE: &str = "strava_token";

/// What a handler does with a page where only some activities failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialPolicy {
    /// Any error fails the whole request.
    #[default]
    Discard,
    /// Log the errors and return whatever succeeded.
    Allow,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub http_address: String,
    /// Server port
    pub port: u16,
    /// Strava REST API base URL (overridable for tests)
    pub strava_api_url: String,
    /// Strava OAuth base URL, used for deauthorization
    pub strava_oauth_url: String,
    /// Maximum number of detail requests in flight per page
    pub enrich_concurrency: usize,
    /// Deadline for a single detail request
    pub enrich_timeout: Duration,
    /// Activities per page when browsing
    pub page_size: u32,
    /// Activities fetched for a spreadsheet export
    pub export_page_size: u32,
    /// Partial-failure handling for pages and exports
    pub partial_policy: PartialPolicy,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            http_address: "127.0.0.1".to_string(),
            port: 8080,
            strava_api_url: DEFAULT_API_URL.to_string(),
            strava_oauth_url: DEFAULT_OAUTH_URL.to_string(),
            enrich_concurrency: 10,
            enrich_timeout: Duration::from_secs(10),
            page_size: 30,
            export_page_size: 60,
            partial_policy: PartialPolicy::Discard,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let allow_partial: bool = parse_var(&lookup, "ALLOW_PARTIAL_RESULTS", false)?;

        let enrich_concurrency: usize = parse_var(&lookup, "ENRICH_CONCURRENCY", 10)?;
        if enrich_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "ENRICH_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        let page_size = parse_page_size(&lookup, "PAGE_SIZE", 30)?;
        let export_page_size = parse_page_size(&lookup, "EXPORT_PAGE_SIZE", 60)?;

        Ok(Self {
            http_address: lookup("HTTP_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "HTTP_PORT", 8080)?,
            strava_api_url: lookup("STRAVA_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            strava_oauth_url: lookup("STRAVA_OAUTH_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OAUTH_URL.to_string()),
            enrich_concurrency,
            enrich_timeout: Duration::from_secs(parse_var(&lookup, "ENRICH_TIMEOUT_SECS", 10)?),
            page_size,
            export_page_size,
            partial_policy: if allow_partial {
                PartialPolicy::Allow
            } else {
                PartialPolicy::Discard
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_page_size<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let size = parse_var(lookup, key, default)?;
    if size == 0 || size > MAX_PER_PAGE {
        return Err(ConfigError::Invalid {
            key,
            value: size.to_string(),
        });
    }
    Ok(size)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("Config should load");

        assert_eq!(config.http_address, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.strava_api_url, DEFAULT_API_URL);
        assert_eq!(config.enrich_concurrency, 10);
        assert_eq!(config.enrich_timeout, Duration::from_secs(10));
        assert_eq!(config.page_size, 30);
        assert_eq!(config.export_page_size, 60);
        assert_eq!(config.partial_policy, PartialPolicy::Discard);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HTTP_PORT", "9000"),
            ("STRAVA_API_URL", "http://localhost:1234/"),
            ("ENRICH_CONCURRENCY", "4"),
            ("ENRICH_TIMEOUT_SECS", "3"),
            ("ALLOW_PARTIAL_RESULTS", "true"),
        ]))
        .expect("Config should load");

        assert_eq!(config.port, 9000);
        assert_eq!(config.strava_api_url, "http://localhost:1234");
        assert_eq!(config.enrich_concurrency, 4);
        assert_eq!(config.enrich_timeout, Duration::from_secs(3));
        assert_eq!(config.partial_policy, PartialPolicy::Allow);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[("HTTP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HTTP_PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[("ENRICH_CONCURRENCY", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "ENRICH_CONCURRENCY",
                ..
            }
        ));

        let err = Config::from_lookup(lookup_from(&[("PAGE_SIZE", "1000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PAGE_SIZE", .. }));
    }
}

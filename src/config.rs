// ⚙️ Configuration - read once from the process environment

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::locator::DEFAULT_SEARCH_BASE_URL;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// PORT
    pub port: u16,

    /// SERP_API_KEY - required for any bank lookup
    pub serp_api_key: Option<String>,

    /// SERP_API_BASE_URL
    pub search_base_url: String,

    /// FRONTEND_ORIGIN - the only origin allowed by CORS
    pub frontend_origin: String,

    /// UPSTREAM_TIMEOUT_SECS - boundary timeout for the place search call
    pub upstream_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            serp_api_key: None,
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => defaults.port,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| {
                        format!("UPSTREAM_TIMEOUT_SECS must be whole seconds, got {:?}", raw)
                    })?;
                Duration::from_secs(secs)
            }
            None => defaults.upstream_timeout,
        };

        Ok(Config {
            port,
            serp_api_key: get("SERP_API_KEY"),
            search_base_url: get("SERP_API_BASE_URL").unwrap_or(defaults.search_base_url),
            frontend_origin: get("FRONTEND_ORIGIN").unwrap_or(defaults.frontend_origin),
            upstream_timeout,
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.serp_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("SERP_API_KEY is not set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("SERP_API_KEY", "secret"),
            ("SERP_API_BASE_URL", "http://127.0.0.1:9000"),
            ("FRONTEND_ORIGIN", "https://finstart.example"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.require_api_key().unwrap(), "secret");
        assert_eq!(config.search_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.frontend_origin, "https://finstart.example");
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = from_pairs(&[("SERP_API_KEY", "  ")]).unwrap();
        assert_eq!(config.serp_api_key, None);
    }

    #[test]
    fn test_malformed_values() {
        let err = from_pairs(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(from_pairs(&[("UPSTREAM_TIMEOUT_SECS", "-1")]).is_err());
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::Level;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Roadmap service root, e.g. `http://localhost:5000`.
    pub backend_url: String,
    pub timeout: Duration,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let backend_url = get("ROADMAP_BACKEND_URL").unwrap_or(defaults.backend_url);

        let timeout = match get("ROADMAP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("ROADMAP_TIMEOUT_SECS must be seconds, got '{}'", raw))?,
            ),
            None => defaults.timeout,
        };

        let log_level = match get("ROADMAP_LOG") {
            Some(raw) => raw
                .parse::<Level>()
                .map_err(|_| anyhow::anyhow!("ROADMAP_LOG must be a log level, got '{}'", raw))?,
            None => defaults.log_level,
        };

        Ok(Self {
            backend_url,
            timeout,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ROADMAP_BACKEND_URL", "https://roadmap.example"),
            ("ROADMAP_TIMEOUT_SECS", "30"),
            ("ROADMAP_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.backend_url, "https://roadmap.example");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = Config::from_lookup(lookup(&[("ROADMAP_BACKEND_URL", "  ")])).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("ROADMAP_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("ROADMAP_LOG", "loud")])).is_err());
    }
}

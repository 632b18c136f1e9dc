//! Configuration management for the storefront client.
//!
//! Loads configuration from environment variables (and a `.env` file, if
//! present) with sensible defaults.

use crate::environment::StorefrontSettings;
use crate::location::PageLocation;
use reqwest::Url;
use rifa_core::ticket::RaffleId;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `RIFA_BASE_URL` is not an absolute URL
    #[error("Invalid RIFA_BASE_URL {value:?}: {reason}")]
    InvalidBaseUrl {
        /// Configured value
        value: String,
        /// Parser message
        reason: String,
    },

    /// `RIFA_PAGE_PATH` cannot be resolved against the base URL
    #[error("Invalid RIFA_PAGE_PATH {value:?}: {reason}")]
    InvalidPagePath {
        /// Configured value
        value: String,
        /// Parser message
        reason: String,
    },

    /// `METRICS_ADDR` is not a socket address
    #[error("Invalid METRICS_ADDR {value:?}: {reason}")]
    InvalidMetricsAddr {
        /// Configured value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server origin
    pub base_url: Url,
    /// Raffle id of the page
    pub raffle_id: Option<RaffleId>,
    /// Page address, relative to the origin
    pub page_path: String,
    /// Tickets in the raffle
    pub ticket_count: u32,
    /// Persisted client storage file
    pub storage_path: PathBuf,
    /// Reconciliation period
    pub poll_interval: Duration,
    /// Upper bound on any one HTTP request
    pub http_timeout: Duration,
    /// Search debounce period
    pub search_debounce: Duration,
    /// Minimum search length
    pub min_query_len: usize,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Prometheus listener, when enabled
    pub metrics_addr: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL, page path or metrics address
    /// is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// Malformed numbers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL, page path or metrics address
    /// is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let defaults = StorefrontSettings::default();

        let raw_base = lookup("RIFA_BASE_URL").unwrap_or_else(|| "http://localhost:8000".to_string());
        let base_url = Url::parse(&raw_base).map_err(|e| ConfigError::InvalidBaseUrl {
            value: raw_base.clone(),
            reason: e.to_string(),
        })?;

        let page_path = lookup("RIFA_PAGE_PATH").unwrap_or_else(|| "/rifa/".to_string());
        if let Err(reason) = PageLocation::resolve(&base_url, &page_path) {
            return Err(ConfigError::InvalidPagePath {
                value: page_path,
                reason,
            });
        }

        let metrics_addr = lookup("METRICS_ADDR")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                raw.trim().parse().map_err(|e: std::net::AddrParseError| {
                    ConfigError::InvalidMetricsAddr {
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })
            })
            .transpose()?;

        Ok(Self {
            base_url,
            raffle_id: lookup("RIFA_ID").as_deref().and_then(RaffleId::parse),
            page_path,
            ticket_count: number("RIFA_TICKET_COUNT")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.ticket_count),
            storage_path: lookup("RIFA_STORAGE_PATH")
                .map_or_else(|| PathBuf::from(".rifa-storage.json"), PathBuf::from),
            poll_interval: Duration::from_secs(number("RIFA_POLL_INTERVAL_SECS").unwrap_or(10)),
            http_timeout: Duration::from_secs(
                number("RIFA_HTTP_TIMEOUT_SECS")
                    .filter(|secs| *secs > 0)
                    .unwrap_or(10),
            ),
            search_debounce: number("RIFA_SEARCH_DEBOUNCE_MS")
                .map_or(defaults.search_debounce, Duration::from_millis),
            min_query_len: number("RIFA_MIN_QUERY_LEN")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.min_query_len),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            metrics_addr,
        })
    }

    /// The page address the client starts on
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPagePath`] if the path cannot be resolved.
    pub fn page_location(&self) -> Result<PageLocation, ConfigError> {
        PageLocation::resolve(&self.base_url, &self.page_path).map_err(|reason| {
            ConfigError::InvalidPagePath {
                value: self.page_path.clone(),
                reason,
            }
        })
    }

    /// Reducer tunables
    #[must_use]
    pub const fn settings(&self) -> StorefrontSettings {
        StorefrontSettings {
            search_debounce: self.search_debounce,
            min_query_len: self.min_query_len,
            ticket_count: self.ticket_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.raffle_id, None);
        assert_eq!(config.ticket_count, 1000);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.min_query_len, 2);
        assert_eq!(config.metrics_addr, None);
        assert_eq!(config.page_location().unwrap().address(), "/rifa/");
    }

    #[test]
    fn overrides_and_fallbacks() {
        let config = config(&[
            ("RIFA_ID", "12"),
            ("RIFA_PAGE_PATH", "/rifa/?rango=100-199"),
            ("RIFA_TICKET_COUNT", "100"),
            ("RIFA_POLL_INTERVAL_SECS", "abc"),
            ("RIFA_HTTP_TIMEOUT_SECS", "3"),
            ("METRICS_ADDR", "127.0.0.1:9100"),
        ])
        .unwrap();
        assert_eq!(config.raffle_id.as_ref().map(RaffleId::as_str), Some("12"));
        assert_eq!(config.settings().ticket_count, 100);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
        assert_eq!(
            config.page_location().unwrap().range_param().as_deref(),
            Some("100-199")
        );
    }

    #[test]
    fn malformed_addresses_are_errors() {
        assert!(matches!(
            config(&[("RIFA_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            config(&[("METRICS_ADDR", "localhost")]),
            Err(ConfigError::InvalidMetricsAddr { .. })
        ));
    }
}

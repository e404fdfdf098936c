//! Configuration types.
//!
//! This module defines the library configuration struct. It carries no CLI
//! dependencies; the binary maps parsed arguments and environment variables
//! onto it.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_BUFFER_METERS, DEFAULT_CACHE_TTL_HOURS, DEFAULT_ENRICH_CONCURRENCY,
    DEFAULT_LISTING_STATUS, DEFAULT_PROPERTY_TYPE, PROVIDER_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Per-provider endpoint and credentials.
///
/// A provider with no configured endpoint reports itself unavailable, which
/// lets the fallback chain skip past it without special-casing.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Base URL of the provider API.
    pub endpoint: Option<String>,
    /// API key, typically read from the environment.
    pub api_key: Option<String>,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use route_scout::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./scout.db"),
///     buffer_meters: 150.0,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Search buffer around the route path in meters
    pub buffer_meters: f64,

    /// Property cache TTL in hours
    pub cache_ttl_hours: i64,

    /// Per-request provider timeout in seconds
    pub provider_timeout_seconds: u64,

    /// Property-type filter forwarded to providers
    pub property_type: String,

    /// Listing-status filter forwarded to providers
    pub listing_status: String,

    /// Primary provider (ATTOM-style API)
    pub primary: ProviderSettings,

    /// Fallback provider (Estated-style API)
    pub fallback: ProviderSettings,

    /// Maximum routes enriched concurrently when sweeping all routes
    pub max_concurrency: usize,
}

impl Config {
    /// Cache TTL expressed in epoch milliseconds.
    pub fn cache_ttl_millis(&self) -> i64 {
        self.cache_ttl_hours * 60 * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            buffer_meters: DEFAULT_BUFFER_METERS,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            provider_timeout_seconds: PROVIDER_TIMEOUT_SECS,
            property_type: DEFAULT_PROPERTY_TYPE.to_string(),
            listing_status: DEFAULT_LISTING_STATUS.to_string(),
            primary: ProviderSettings::default(),
            fallback: ProviderSettings::default(),
            max_concurrency: DEFAULT_ENRICH_CONCURRENCY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.buffer_meters, 100.0);
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.provider_timeout_seconds, 10);
        assert_eq!(config.db_path, PathBuf::from("./route_scout.db"));
        assert!(config.primary.endpoint.is_none());
        assert!(config.fallback.endpoint.is_none());
    }

    #[test]
    fn test_cache_ttl_millis() {
        let config = Config {
            cache_ttl_hours: 24,
            ..Default::default()
        };
        assert_eq!(config.cache_ttl_millis(), 86_400_000);
    }
}

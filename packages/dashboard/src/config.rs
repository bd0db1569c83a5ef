//! Dashboard configuration.
//!
//! Every setting has a built-in default. A TOML file named by
//! `CRIME_EXPLORER_CONFIG` may override any of them, and `BIND_ADDR` /
//! `PORT` override the listener.
//!
//! ```toml
//! limit = 50000
//! cache_ttl_secs = 600
//! start_date = "2024-01-01T00:00:00"
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crime_explorer_source::socrata::{CHICAGO_API_URL, SocrataQuery};
use serde::{Deserialize, Serialize};

use crate::DashboardError;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "CRIME_EXPLORER_CONFIG";

/// Runtime settings for the fetch, cache, and presentation limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Socrata resource URL.
    pub api_url: String,
    /// Column the server-side `$where` filter applies to.
    pub date_column: String,
    /// Only incidents after this timestamp are requested.
    pub start_date: NaiveDateTime,
    /// `$limit` sent with the query.
    pub limit: u64,
    /// How long a fetched table is served from cache.
    pub cache_ttl_secs: u64,
    /// Per-request HTTP timeout.
    pub fetch_timeout_secs: u64,
    /// Maximum number of points handed to the map.
    pub map_point_cap: usize,
    /// Length of the default date window, ending at the latest incident.
    pub default_lookback_days: u64,
    /// Number of categories (alphabetically first) selected by default.
    pub default_category_count: usize,
    pub bind_addr: String,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: CHICAGO_API_URL.to_string(),
            date_column: "date".to_string(),
            start_date: default_start_date(),
            limit: 100_000,
            cache_ttl_secs: 3600,
            fetch_timeout_secs: 60,
            map_point_cap: 500,
            default_lookback_days: 90,
            default_category_count: 5,
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

fn default_start_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
}

impl DashboardConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if the document is not valid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, DashboardError> {
        toml::de::from_str(toml_str).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Reads and parses the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::ConfigIo`] if the file cannot be read or
    /// [`DashboardError::Config`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DashboardError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the config file named by
    /// [`CONFIG_PATH_ENV`] cannot be loaded or `PORT` is not a port number.
    pub fn from_env() -> Result<Self, DashboardError> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                log::info!("Loading config from {path}");
                Self::load(Path::new(&path))?
            }
            Err(_) => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `BIND_ADDR` and `PORT` from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if `PORT` is not a port number.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DashboardError> {
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| DashboardError::Config(format!("invalid PORT {port:?}")))?;
        }
        Ok(self)
    }

    /// Socrata query described by this configuration.
    #[must_use]
    pub fn query(&self) -> SocrataQuery<'_> {
        SocrataQuery {
            endpoint: &self.api_url,
            date_column: &self.date_column,
            limit: self.limit,
            since: self.start_date,
        }
    }

    /// Request URL, which is also the cache key.
    #[must_use]
    pub fn request_url(&self) -> String {
        self.query().url()
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chicago_query() {
        let config = DashboardConfig::default();
        assert_eq!(
            config.request_url(),
            "https://data.cityofchicago.org/resource/t7ek-mgzi.json\
             ?$limit=100000&$where=date > '2023-01-01T00:00:00.000'"
        );
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(60));
        assert_eq!(config.map_point_cap, 500);
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = DashboardConfig::from_toml_str(
            "limit = 500\ncache_ttl_secs = 60\nstart_date = \"2024-06-01T00:00:00\"\n",
        )
        .unwrap();
        assert_eq!(config.limit, 500);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.start_date.to_string(), "2024-06-01 00:00:00");
        assert_eq!(config.map_point_cap, 500);
        assert_eq!(config.api_url, CHICAGO_API_URL);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = DashboardConfig::from_toml_str("limit = \"lots\"").unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DashboardConfig::load(Path::new("/nonexistent/crime_explorer.toml")).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigIo { .. }));
        assert!(
            err.to_string()
                .starts_with("Failed to read config file /nonexistent/crime_explorer.toml: ")
        );
    }

    #[test]
    fn env_overrides_listener() {
        let config = DashboardConfig::default()
            .with_overrides(|key| match key {
                "BIND_ADDR" => Some("0.0.0.0".to_string()),
                "PORT" => Some("9000".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);

        let err = DashboardConfig::default()
            .with_overrides(|key| (key == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}

//! `.searchbar.toml` loading.
//!
//! Every key is optional; missing keys fall back to [`SearchConfig::default`].
//! Unknown keys are reported with a typo suggestion but do not fail the load.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".searchbar.toml";

/// Known keys in `.searchbar.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "transport",
    "debounce_ms",
    "popular_refresh_secs",
    "request_timeout_ms",
    "search_path",
    "popular_path",
    "graphql_path",
    "cache",
];

/// Wire protocol used to reach the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// `GET <search_path>?q=...` returning JSON arrays.
    Rest,
    /// `POST <graphql_path>` with `searchArticles` / `getPopularSearches`.
    Graphql,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(Transport::Rest),
            "graphql" => Ok(Transport::Graphql),
            other => Err(format!("unknown transport '{other}' (expected 'rest' or 'graphql')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the backend, without a trailing path.
    pub endpoint: String,
    pub transport: Transport,
    pub debounce_ms: u64,
    /// Re-fetch popular searches this often. Unset = fetch once.
    pub popular_refresh_secs: Option<u64>,
    pub request_timeout_ms: u64,
    pub search_path: String,
    pub popular_path: String,
    pub graphql_path: String,
    /// Keep successful responses in memory, keyed by query.
    pub cache: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000".to_string(),
            transport: Transport::Graphql,
            debounce_ms: 300,
            popular_refresh_secs: None,
            request_timeout_ms: 10_000,
            search_path: "/article/search".to_string(),
            popular_path: "/article/popular".to_string(),
            graphql_path: "/graphql".to_string(),
            cache: true,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn popular_refresh(&self) -> Option<Duration> {
        self.popular_refresh_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Join `path` onto the endpoint without doubling the slash.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Reject values that would make the controller misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "endpoint",
                reason: format!("'{}' is not an http(s) URL", self.endpoint),
            });
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid { key: "debounce_ms", reason: "must be > 0".into() });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_ms",
                reason: "must be > 0".into(),
            });
        }
        if self.popular_refresh_secs == Some(0) {
            return Err(ConfigError::Invalid {
                key: "popular_refresh_secs",
                reason: "must be > 0 (omit the key to fetch once)".into(),
            });
        }
        for (key, path) in [
            ("search_path", &self.search_path),
            ("popular_path", &self.popular_path),
            ("graphql_path", &self.graphql_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("'{path}' must start with '/'"),
                });
            }
        }
        Ok(())
    }
}

/// Simple Levenshtein edit distance for typo suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest known key, if it is near enough to be a plausible typo.
fn suggest_key(key: &str) -> Option<&'static str> {
    KNOWN_CONFIG_KEYS
        .iter()
        .copied()
        .min_by_key(|k| edit_distance(key, k))
        .filter(|k| edit_distance(key, k) <= 3)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<SearchConfig, ConfigError> {
    let table = content.parse::<toml::Table>()?;

    // Validate keys, warn on unknown
    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        match suggest_key(key) {
            Some(suggestion) => warn!(
                key = key.as_str(),
                suggestion,
                "Unknown key in {CONFIG_FILE_NAME}, did you mean '{suggestion}'?"
            ),
            None => warn!(
                key = key.as_str(),
                "Unknown key in {CONFIG_FILE_NAME} (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            ),
        }
    }

    let config: SearchConfig = toml::Value::Table(table).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<SearchConfig, ConfigError> {
    debug!(path = %path.display(), "Loading config");
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    parse_config(&content)
}

/// Load `.searchbar.toml` from `dir`, or defaults when the file does not exist.
pub fn load_config(dir: &Path) -> Result<SearchConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {CONFIG_FILE_NAME}, using defaults");
        return Ok(SearchConfig::default());
    }
    load_config_file(&path)
}

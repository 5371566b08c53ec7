//! Error types for providers, the controller handle, and configuration.

use thiserror::Error;

/// Failure of a search or popular-searches request.
///
/// Everything except [`SearchError::Closed`] is a provider failure whose
/// `Display` output is shown to the user in place of the suggestion list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("search request failed with status {status}")]
    Status { status: u16 },

    #[error("{0}")]
    Provider(String),

    #[error("malformed response: {0}")]
    Decode(String),

    /// The controller task has shut down; the command was not delivered.
    #[error("search controller is closed")]
    Closed,
}

/// Failure to load `.searchbar.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

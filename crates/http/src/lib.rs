//! searchbar-http: HTTP transports for the search controller.
//!
//! Two interchangeable [`SearchProvider`](searchbar_core::SearchProvider)
//! implementations over `reqwest`:
//!
//! - [`RestClient`]: `GET /article/search?q=...` and `GET /article/popular`
//! - [`GraphqlClient`]: `searchArticles` / `getPopularSearches` over `POST /graphql`
//!
//! [`HttpProvider`] picks one of them from a [`SearchConfig`](searchbar_core::SearchConfig).

pub mod graphql;
pub mod provider;
pub mod rest;

pub use graphql::GraphqlClient;
pub use provider::HttpProvider;
pub use rest::RestClient;

use searchbar_core::{SearchConfig, SearchError};

/// Build the shared `reqwest` client with the configured timeout.
pub fn build_http_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("searchbar/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SearchError::Network(e.to_string()))
}

/// Transport failures (connect, timeout) vs. undecodable bodies.
pub(crate) fn request_error(e: reqwest::Error) -> SearchError {
    if e.is_decode() {
        SearchError::Decode(e.to_string())
    } else {
        SearchError::Network(e.to_string())
    }
}

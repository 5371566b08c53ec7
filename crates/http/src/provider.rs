//! Transport selection from configuration.

use searchbar_core::{Article, PopularSearch, SearchConfig, SearchError, SearchProvider, Transport};
use tracing::info;

use crate::{GraphqlClient, RestClient};

/// Either HTTP transport, chosen once at start-up and injected into the
/// controller.
#[derive(Debug, Clone)]
pub enum HttpProvider {
    Rest(RestClient),
    Graphql(GraphqlClient),
}

impl HttpProvider {
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        info!(endpoint = config.endpoint.as_str(), transport = ?config.transport, "Search backend");
        Ok(match config.transport {
            Transport::Rest => HttpProvider::Rest(RestClient::from_config(config)?),
            Transport::Graphql => HttpProvider::Graphql(GraphqlClient::from_config(config)?),
        })
    }
}

impl SearchProvider for HttpProvider {
    async fn search(&self, query: &str) -> Result<Vec<Article>, SearchError> {
        match self {
            HttpProvider::Rest(c) => c.search(query).await,
            HttpProvider::Graphql(c) => c.search(query).await,
        }
    }

    async fn popular(&self) -> Result<Vec<PopularSearch>, SearchError> {
        match self {
            HttpProvider::Rest(c) => c.popular().await,
            HttpProvider::Graphql(c) => c.popular().await,
        }
    }
}

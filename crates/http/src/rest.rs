//! Plain request/response transport.

use reqwest::{Client, RequestBuilder};
use searchbar_core::{Article, PopularSearch, SearchConfig, SearchError, SearchProvider};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{build_http_client, request_error};

#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    search_url: String,
    popular_url: String,
}

impl RestClient {
    pub fn new(
        http: Client,
        search_url: impl Into<String>,
        popular_url: impl Into<String>,
    ) -> Self {
        Self { http, search_url: search_url.into(), popular_url: popular_url.into() }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::new(
            build_http_client(config)?,
            config.url(&config.search_path),
            config.url(&config.popular_path),
        ))
    }
}

async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SearchError> {
    let response = request.send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        warn!(url = %response.url(), status = status.as_u16(), "REST request failed");
        return Err(SearchError::Status { status: status.as_u16() });
    }
    response.json::<T>().await.map_err(|e| SearchError::Decode(e.to_string()))
}

impl SearchProvider for RestClient {
    async fn search(&self, query: &str) -> Result<Vec<Article>, SearchError> {
        debug!(url = self.search_url.as_str(), query, "REST search");
        get_json(self.http.get(&self.search_url).query(&[("q", query)])).await
    }

    async fn popular(&self) -> Result<Vec<PopularSearch>, SearchError> {
        debug!(url = self.popular_url.as_str(), "REST popular searches");
        get_json(self.http.get(&self.popular_url)).await
    }
}

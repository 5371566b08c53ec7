//! Query-language transport: GraphQL over HTTP POST.

use reqwest::Client;
use searchbar_core::{Article, PopularSearch, SearchConfig, SearchError, SearchProvider};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{build_http_client, request_error};

pub const SEARCH_ARTICLES: &str = "query SearchArticles($query: String!) {
  searchArticles(query: $query) {
    title
    content
  }
}";

pub const POPULAR_SEARCHES: &str = "query PopularSearches {
  getPopularSearches {
    query
    count
  }
}";

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'static str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArticlesData {
    search_articles: Vec<Article>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopularSearchesData {
    get_popular_searches: Vec<PopularSearch>,
}

/// Joined messages of a non-empty `errors` array.
fn error_messages(errors: Option<Vec<GraphqlError>>) -> Option<String> {
    let errors = errors.filter(|e| !e.is_empty())?;
    Some(errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; "))
}

#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: Client,
    url: String,
}

impl GraphqlClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self::new(build_http_client(config)?, config.url(&config.graphql_path)))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation_name: &str,
        query: &'static str,
        variables: Value,
    ) -> Result<T, SearchError> {
        debug!(url = self.url.as_str(), operation = operation_name, "GraphQL request");
        let body = GraphqlRequest { query, operation_name, variables };
        let response = self.http.post(&self.url).json(&body).send().await.map_err(request_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(request_error)?;

        let parsed = serde_json::from_slice::<GraphqlResponse<T>>(&bytes);
        if !status.is_success() {
            warn!(operation = operation_name, status = status.as_u16(), "GraphQL request failed");
            // Servers often explain a 4xx in the errors array; prefer that message.
            return Err(match parsed.ok().and_then(|r| error_messages(r.errors)) {
                Some(message) => SearchError::Provider(message),
                None => SearchError::Status { status: status.as_u16() },
            });
        }

        let parsed = parsed.map_err(|e| SearchError::Decode(e.to_string()))?;
        if let Some(message) = error_messages(parsed.errors) {
            warn!(operation = operation_name, message = message.as_str(), "GraphQL errors");
            return Err(SearchError::Provider(message));
        }
        parsed.data.ok_or_else(|| SearchError::Decode("response carried no data".to_string()))
    }
}

impl SearchProvider for GraphqlClient {
    async fn search(&self, query: &str) -> Result<Vec<Article>, SearchError> {
        let data: SearchArticlesData =
            self.execute("SearchArticles", SEARCH_ARTICLES, json!({ "query": query })).await?;
        Ok(data.search_articles)
    }

    async fn popular(&self) -> Result<Vec<PopularSearch>, SearchError> {
        let data: PopularSearchesData =
            self.execute("PopularSearches", POPULAR_SEARCHES, json!({})).await?;
        Ok(data.get_popular_searches)
    }
}

//! In-process fixture backend for HTTP provider tests.
//!
//! Serves the REST and GraphQL routes the providers talk to on an ephemeral
//! localhost port. The query `boom` makes every route fail.

use axum::{
    extract::{Json, Query},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use searchbar_core::{Article, PopularSearch, SearchConfig, Transport};
use serde::Deserialize;
use serde_json::{json, Value};

pub const FAILING_QUERY: &str = "boom";

pub fn catalog() -> Vec<Article> {
    vec![
        Article::new("Rust Ownership", "Moves, borrows and lifetimes"),
        Article::new("Async Rust in Practice", "Futures and executors"),
        Article::new("Python Typing", "Gradual typing with mypy"),
    ]
}

pub fn popular() -> Vec<PopularSearch> {
    vec![PopularSearch::new("rust async", 5), PopularSearch::new("python typing", 2)]
}

fn matching(query: &str) -> Vec<Article> {
    let needle = query.to_lowercase();
    catalog().into_iter().filter(|a| a.title.to_lowercase().contains(&needle)).collect()
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

async fn rest_search(Query(params): Query<SearchParams>) -> Result<Json<Vec<Article>>, StatusCode> {
    if params.q == FAILING_QUERY {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(matching(&params.q)))
}

async fn rest_popular() -> Json<Vec<PopularSearch>> {
    Json(popular())
}

/// Echoes the decoded `q` parameter back as an article title.
async fn echo_search(Query(params): Query<SearchParams>) -> Json<Vec<Article>> {
    Json(vec![Article::new(params.q, "echo")])
}

async fn not_json() -> &'static str {
    "<html>maintenance</html>"
}

async fn graphql(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let document = body["query"].as_str().unwrap_or_default();
    if document.contains("getPopularSearches") {
        return (StatusCode::OK, Json(json!({ "data": { "getPopularSearches": popular() } })));
    }
    if !document.contains("searchArticles") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [{ "message": "unknown operation" }] })),
        );
    }
    let query = body["variables"]["query"].as_str().unwrap_or_default();
    if query == FAILING_QUERY {
        return (
            StatusCode::OK,
            Json(json!({ "data": null, "errors": [{ "message": "search index unavailable" }] })),
        );
    }
    (StatusCode::OK, Json(json!({ "data": { "searchArticles": matching(query) } })))
}

fn router() -> Router {
    Router::new()
        .route("/article/search", get(rest_search))
        .route("/article/popular", get(rest_popular))
        .route("/echo/search", get(echo_search))
        .route("/broken/search", get(not_json))
        .route("/graphql", post(graphql))
}

/// Start the backend and return its base URL (`http://127.0.0.1:<port>`).
pub async fn spawn_backend() -> String {
    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fixture backend");
    let addr = listener.local_addr().expect("fixture backend address");
    tokio::spawn(async move {
        axum::serve(listener, router()).await.expect("fixture backend crashed");
    });
    format!("http://{addr}")
}

pub fn config(endpoint: &str, transport: Transport) -> SearchConfig {
    SearchConfig {
        endpoint: endpoint.to_string(),
        transport,
        debounce_ms: 20,
        request_timeout_ms: 5_000,
        ..SearchConfig::default()
    }
}

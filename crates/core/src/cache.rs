//! In-memory response cache.
//!
//! Wraps any [`SearchProvider`] and remembers successful search responses per
//! exact query string, so retyping a query does not hit the backend again.
//! Popular searches always pass through.
//!
//! The cache holds at most `capacity` queries. Inserting past that evicts an
//! arbitrary entry, which is enough for a typing session's working set.

use dashmap::DashMap;
use tracing::debug;

use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::types::{Article, PopularSearch};

/// Queries kept by [`CachedProvider::new`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

pub struct CachedProvider<P> {
    inner: P,
    entries: DashMap<String, Vec<Article>>,
    capacity: usize,
}

impl<P: SearchProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Cache at most `capacity` queries. Zero disables caching.
    pub fn with_capacity(inner: P, capacity: usize) -> Self {
        Self { inner, entries: DashMap::new(), capacity }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.entries.clear();
    }

    fn store(&self, query: &str, articles: Vec<Article>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity && !self.entries.contains_key(query) {
            let victim = self.entries.iter().next().map(|e| e.key().clone());
            let Some(victim) = victim else { break };
            debug!(query = victim.as_str(), "Evicting cached search");
            self.entries.remove(&victim);
        }
        self.entries.insert(query.to_string(), articles);
    }
}

impl<P: SearchProvider> SearchProvider for CachedProvider<P> {
    async fn search(&self, query: &str) -> Result<Vec<Article>, SearchError> {
        if let Some(hit) = self.entries.get(query).map(|e| e.value().clone()) {
            debug!(query, "Search cache hit");
            return Ok(hit);
        }
        let articles = self.inner.search(query).await?;
        self.store(query, articles.clone());
        Ok(articles)
    }

    async fn popular(&self) -> Result<Vec<PopularSearch>, SearchError> {
        self.inner.popular().await
    }
}

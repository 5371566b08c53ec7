//! Test providers for controller integration tests.
//!
//! `ScriptedProvider` answers from canned responses, or, when gated, parks each
//! search until the test releases it. That lets a test resolve requests in any
//! order it likes.

use searchbar_core::{Article, PopularSearch, SearchError, SearchProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

type SearchResult = Result<Vec<Article>, SearchError>;
type PopularResult = Result<Vec<PopularSearch>, SearchError>;

#[derive(Default)]
pub struct ScriptedProvider {
    popular: Vec<PopularSearch>,
    canned: HashMap<String, SearchResult>,
    gated: bool,
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, oneshot::Sender<SearchResult>>>,
    popular_calls: AtomicUsize,
    popular_gated: bool,
    popular_gates: Mutex<Vec<Option<oneshot::Sender<PopularResult>>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches wait for [`ScriptedProvider::release`] instead of answering.
    pub fn gated() -> Self {
        Self { gated: true, ..Self::default() }
    }

    /// Popular fetches wait for [`ScriptedProvider::release_popular`].
    pub fn with_gated_popular(mut self) -> Self {
        self.popular_gated = true;
        self
    }

    pub fn with_popular(mut self, popular: Vec<PopularSearch>) -> Self {
        self.popular = popular;
        self
    }

    pub fn with_response(mut self, query: &str, response: SearchResult) -> Self {
        self.canned.insert(query.to_string(), response);
        self
    }

    pub fn with_articles(self, query: &str, titles: &[&str]) -> Self {
        self.with_response(query, Ok(articles(titles)))
    }

    /// Queries the controller searched for, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn popular_calls(&self) -> usize {
        self.popular_calls.load(Ordering::SeqCst)
    }

    /// Answer a parked search. Returns false if nobody is waiting any more.
    pub fn release(&self, query: &str, response: SearchResult) -> bool {
        let gate = self.gates.lock().unwrap().remove(query);
        match gate {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    /// Answer the `nth` popular fetch (0-based, in call order).
    pub fn release_popular(&self, nth: usize, response: PopularResult) -> bool {
        let gate = self.popular_gates.lock().unwrap().get_mut(nth).and_then(Option::take);
        match gate {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }
}

impl SearchProvider for ScriptedProvider {
    async fn search(&self, query: &str) -> SearchResult {
        self.calls.lock().unwrap().push(query.to_string());
        if self.gated {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(query.to_string(), tx);
            return rx.await.unwrap_or_else(|_| Err(SearchError::Network("gate dropped".into())));
        }
        self.canned.get(query).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn popular(&self) -> PopularResult {
        self.popular_calls.fetch_add(1, Ordering::SeqCst);
        if self.popular_gated {
            let (tx, rx) = oneshot::channel();
            self.popular_gates.lock().unwrap().push(Some(tx));
            return rx.await.unwrap_or_else(|_| Err(SearchError::Network("gate dropped".into())));
        }
        Ok(self.popular.clone())
    }
}

pub fn articles(titles: &[&str]) -> Vec<Article> {
    titles.iter().map(|t| Article::new(*t, format!("about {t}"))).collect()
}

/// Let the controller task drain everything that is ready.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Sleep past the default 300ms debounce.
pub async fn past_debounce() {
    tokio::time::sleep(Duration::from_millis(400)).await;
}

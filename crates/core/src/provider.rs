//! The provider seam between the controller and whatever transport serves
//! article search and popular searches.

use std::future::Future;
use std::sync::Arc;

use crate::error::SearchError;
use crate::types::{Article, PopularSearch};

/// Source of search results and popular searches.
///
/// The controller only ever talks to this trait, so a REST client, a GraphQL
/// client, or an in-memory stub are interchangeable. Implementations are
/// constructed explicitly and handed to
/// [`SearchController::spawn`](crate::controller::SearchController::spawn).
pub trait SearchProvider: Send + Sync + 'static {
    /// Articles matching `query`, in the order they should be listed.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Article>, SearchError>> + Send;

    /// The popular-searches listing. Not filtered by query.
    fn popular(&self) -> impl Future<Output = Result<Vec<PopularSearch>, SearchError>> + Send;
}

impl<P: SearchProvider> SearchProvider for Arc<P> {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Article>, SearchError>> + Send {
        (**self).search(query)
    }

    fn popular(&self) -> impl Future<Output = Result<Vec<PopularSearch>, SearchError>> + Send {
        (**self).popular()
    }
}

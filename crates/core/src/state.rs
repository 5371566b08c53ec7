//! Synchronous search state machine.
//!
//! [`SearchState`] holds everything the search input shows and decides what
//! should happen next, but never sleeps or performs I/O. The
//! [`controller`](crate::controller) owns the timer and the fetch tasks and
//! feeds their outcomes back through [`SearchState::debounce_expired`] and
//! [`SearchState::apply_response`].

use tracing::{debug, warn};

use crate::error::SearchError;
use crate::suggest::{build_suggestions, step_cursor};
use crate::types::*;

/// Generation of a query change. Only the newest ticket may settle the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// A search request the controller must issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: String,
}

/// Outcome of a debounce expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// A newer query change exists; this expiry is void.
    Superseded,
    /// The settled query is blank: results were cleared, nothing to fetch.
    Skip,
    /// Call the provider with this ticket.
    Issue(FetchTicket),
}

#[derive(Debug, Default)]
pub struct SearchState {
    query: String,
    debounced: String,
    results: Vec<Article>,
    popular: Vec<PopularSearch>,
    suggestions: Vec<Suggestion>,
    active: Option<usize>,
    visible: bool,
    loading: bool,
    popular_loading: bool,
    error: Option<String>,
    debounce_gen: u64,
    request_seq: u64,
    in_flight: Option<u64>,
    popular_seq: u64,
    popular_in_flight: Option<u64>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn debounced_query(&self) -> &str {
        &self.debounced
    }

    pub fn results(&self) -> &[Article] {
        &self.results
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when an empty-result message may be shown. Suppressed while a
    /// fetch is outstanding so a stale "no results" never flashes.
    pub fn show_no_results(&self) -> bool {
        self.visible
            && !self.loading
            && self.error.is_none()
            && !self.debounced.trim().is_empty()
            && self.suggestions.is_empty()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.clone(),
            debounced_query: self.debounced.clone(),
            suggestions: self.suggestions.iter().map(SuggestionView::from).collect(),
            active_index: self.active,
            visible: self.visible,
            loading: self.loading,
            popular_loading: self.popular_loading,
            error: self.error.clone(),
            show_no_results: self.show_no_results(),
        }
    }

    // -----------------------------------------------------------------------
    // Query input and debounce
    // -----------------------------------------------------------------------

    /// Record new raw input and open the suggestion list.
    pub fn set_query(&mut self, text: impl Into<String>) -> DebounceTicket {
        self.query = text.into();
        self.visible = true;
        self.next_ticket()
    }

    /// Settle the query if `ticket` is still the newest change.
    pub fn debounce_expired(&mut self, ticket: DebounceTicket) -> FetchPlan {
        if ticket.0 != self.debounce_gen {
            debug!(ticket = ticket.0, latest = self.debounce_gen, "Debounce superseded");
            return FetchPlan::Superseded;
        }
        if self.debounced != self.query {
            // A different settled query owns the list now, even if its entries match.
            self.active = None;
            self.debounced = self.query.clone();
        }
        self.rebuild();
        self.plan_fetch()
    }

    /// Decide whether the settled query needs a provider call.
    pub fn plan_fetch(&mut self) -> FetchPlan {
        let query = self.debounced.trim().to_string();
        if query.is_empty() {
            self.request_seq += 1;
            self.in_flight = None;
            self.loading = false;
            self.error = None;
            self.results.clear();
            self.rebuild();
            return FetchPlan::Skip;
        }
        self.request_seq += 1;
        self.in_flight = Some(self.request_seq);
        self.loading = true;
        self.error = None;
        self.rebuild();
        FetchPlan::Issue(FetchTicket { seq: self.request_seq, query })
    }

    /// Apply a provider response. Returns false when the response belongs to a
    /// superseded request and was dropped.
    ///
    /// On failure the previous results are cleared rather than kept, so an
    /// error is never shown next to results for an older query.
    pub fn apply_response(
        &mut self,
        seq: u64,
        response: Result<Vec<Article>, SearchError>,
    ) -> bool {
        if self.in_flight != Some(seq) {
            debug!(seq, latest = self.request_seq, "Discarding stale search response");
            return false;
        }
        self.in_flight = None;
        self.loading = false;
        match response {
            Ok(articles) => {
                debug!(seq, count = articles.len(), "Applying search response");
                self.results = articles;
                self.error = None;
            }
            Err(e) => {
                warn!(seq, error = %e, "Search request failed");
                self.results.clear();
                self.error = Some(e.to_string());
            }
        }
        self.rebuild();
        true
    }

    // -----------------------------------------------------------------------
    // Popular searches
    // -----------------------------------------------------------------------

    /// Start a popular-searches fetch. Any fetch already running is superseded.
    pub fn begin_popular(&mut self) -> u64 {
        self.popular_seq += 1;
        self.popular_in_flight = Some(self.popular_seq);
        self.popular_loading = true;
        self.popular_seq
    }

    /// Replace the popular list. Failures keep the previous list. Returns false
    /// when `seq` is not the latest popular fetch; `popular_loading` then stays set.
    pub fn apply_popular(
        &mut self,
        seq: u64,
        response: Result<Vec<PopularSearch>, SearchError>,
    ) -> bool {
        if self.popular_in_flight != Some(seq) {
            debug!(seq, latest = self.popular_seq, "Discarding stale popular searches");
            return false;
        }
        self.popular_in_flight = None;
        self.popular_loading = false;
        match response {
            Ok(popular) => {
                debug!(count = popular.len(), "Popular searches loaded");
                self.popular = popular;
                self.rebuild();
            }
            Err(e) => warn!(error = %e, "Failed to load popular searches"),
        }
        true
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn move_selection(&mut self, direction: Direction) {
        self.active = step_cursor(self.active, self.suggestions.len(), direction);
    }

    /// Accept the entry under the cursor. Returns the ticket for re-running the
    /// search with the accepted text, or `None` when nothing is selected.
    pub fn confirm_selection(&mut self) -> Option<DebounceTicket> {
        let title = self.suggestions.get(self.active?)?.title().to_string();
        Some(self.accept(title))
    }

    /// Accept an entry picked directly. Works whether or not the list is shown.
    pub fn select_by_pointer(&mut self, title: impl Into<String>) -> DebounceTicket {
        self.accept(title.into())
    }

    /// Hide the list and drop the cursor; the query is kept.
    pub fn dismiss(&mut self) {
        self.visible = false;
        self.active = None;
    }

    pub fn focus(&mut self) {
        self.visible = true;
    }

    /// Empty the query and everything derived from it. Any pending debounce
    /// and in-flight request are invalidated.
    pub fn clear(&mut self) {
        self.query.clear();
        self.debounced.clear();
        self.results.clear();
        self.error = None;
        self.loading = false;
        self.in_flight = None;
        self.request_seq += 1;
        self.debounce_gen += 1;
        self.rebuild();
    }

    fn accept(&mut self, title: String) -> DebounceTicket {
        self.query = title;
        self.visible = false;
        self.active = None;
        self.next_ticket()
    }

    fn next_ticket(&mut self) -> DebounceTicket {
        self.debounce_gen += 1;
        DebounceTicket(self.debounce_gen)
    }

    /// Recompute the suggestion list; the cursor resets when its content changes.
    /// An error message replaces the whole list, popular matches included.
    fn rebuild(&mut self) {
        let next = if self.error.is_some() {
            Vec::new()
        } else {
            build_suggestions(&self.popular, &self.results, &self.debounced)
        };
        if next != self.suggestions {
            self.suggestions = next;
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(state: &mut SearchState, text: &str) -> FetchPlan {
        let ticket = state.set_query(text);
        state.debounce_expired(ticket)
    }

    fn issued(plan: FetchPlan) -> FetchTicket {
        match plan {
            FetchPlan::Issue(t) => t,
            other => panic!("expected a fetch, got {other:?}"),
        }
    }

    #[test]
    fn only_latest_ticket_settles() {
        let mut s = SearchState::new();
        let first = s.set_query("r");
        let second = s.set_query("ru");
        assert_eq!(s.debounce_expired(first), FetchPlan::Superseded);
        assert_eq!(s.debounced_query(), "");
        let ticket = issued(s.debounce_expired(second));
        assert_eq!(ticket.query, "ru");
        assert!(s.is_loading());
    }

    #[test]
    fn blank_query_skips_fetch_and_clears_results() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "rust"));
        s.apply_response(t.seq, Ok(vec![Article::new("Rust", "")]));
        assert_eq!(s.results().len(), 1);

        assert_eq!(settle(&mut s, "   "), FetchPlan::Skip);
        assert!(s.results().is_empty());
        assert!(s.suggestions().is_empty());
        assert!(!s.is_loading());
    }

    #[test]
    fn fetch_sends_trimmed_query() {
        let mut s = SearchState::new();
        assert_eq!(issued(settle(&mut s, "  rust ")).query, "rust");
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut s = SearchState::new();
        let a = issued(settle(&mut s, "a"));
        let b = issued(settle(&mut s, "b"));

        assert!(s.apply_response(b.seq, Ok(vec![Article::new("B", "")])));
        assert!(!s.apply_response(a.seq, Ok(vec![Article::new("A", "")])));
        assert_eq!(s.results(), &[Article::new("B", "")]);
    }

    #[test]
    fn response_after_blank_query_is_discarded() {
        let mut s = SearchState::new();
        let a = issued(settle(&mut s, "a"));
        assert_eq!(settle(&mut s, ""), FetchPlan::Skip);
        assert!(!s.apply_response(a.seq, Ok(vec![Article::new("A", "")])));
        assert!(s.results().is_empty());
    }

    #[test]
    fn error_clears_results_and_success_clears_error() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "a"));
        s.apply_response(t.seq, Ok(vec![Article::new("A", "")]));

        let t = issued(settle(&mut s, "ab"));
        s.apply_response(t.seq, Err(SearchError::Status { status: 500 }));
        assert!(s.results().is_empty());
        assert_eq!(s.error(), Some("search request failed with status 500"));
        assert!(!s.show_no_results());

        let t = issued(settle(&mut s, "abc"));
        assert_eq!(s.error(), None);
        s.apply_response(t.seq, Ok(vec![Article::new("ABC", "")]));
        assert_eq!(s.error(), None);
        assert_eq!(s.results().len(), 1);
    }

    #[test]
    fn no_results_message_waits_for_loading() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "zzz"));
        assert!(!s.show_no_results());
        s.apply_response(t.seq, Ok(vec![]));
        assert!(s.show_no_results());
    }

    #[test]
    fn confirm_without_selection_is_noop() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "a"));
        s.apply_response(t.seq, Ok(vec![Article::new("Alpha", "")]));
        assert_eq!(s.confirm_selection(), None);
        assert_eq!(s.query(), "a");
        assert!(s.is_visible());
    }

    #[test]
    fn confirm_copies_title_and_hides_list() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "a"));
        s.apply_response(t.seq, Ok(vec![Article::new("Alpha", ""), Article::new("Alps", "")]));
        s.move_selection(Direction::Down);
        s.move_selection(Direction::Down);
        assert_eq!(s.active_index(), Some(1));

        assert!(s.confirm_selection().is_some());
        assert_eq!(s.query(), "Alps");
        assert!(!s.is_visible());
        assert_eq!(s.active_index(), None);
    }

    #[test]
    fn new_results_reset_cursor() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "a"));
        s.apply_response(t.seq, Ok(vec![Article::new("Alpha", "")]));
        s.move_selection(Direction::Down);
        assert_eq!(s.active_index(), Some(0));

        let t = issued(settle(&mut s, "al"));
        s.apply_response(t.seq, Ok(vec![Article::new("Alps", "")]));
        assert_eq!(s.active_index(), None);
    }

    #[test]
    fn dismiss_keeps_query() {
        let mut s = SearchState::new();
        s.set_query("keep me");
        s.dismiss();
        assert_eq!(s.query(), "keep me");
        assert!(!s.is_visible());
        s.focus();
        assert!(s.is_visible());
    }

    #[test]
    fn pointer_pick_works_when_hidden() {
        let mut s = SearchState::new();
        s.set_query("a");
        s.dismiss();
        s.select_by_pointer("Alpha");
        assert_eq!(s.query(), "Alpha");
        assert!(!s.is_visible());
    }

    #[test]
    fn clear_invalidates_pending_work() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "a"));
        let pending = s.set_query("ab");
        s.clear();
        assert_eq!(s.query(), "");
        assert_eq!(s.debounce_expired(pending), FetchPlan::Superseded);
        assert!(!s.apply_response(t.seq, Ok(vec![Article::new("A", "")])));
        assert!(!s.is_loading());
    }

    #[test]
    fn popular_failure_keeps_previous_list() {
        let mut s = SearchState::new();
        let seq = s.begin_popular();
        assert!(s.apply_popular(seq, Ok(vec![PopularSearch::new("rust async", 5)])));
        let seq = s.begin_popular();
        assert!(s.apply_popular(seq, Err(SearchError::Network("down".into()))));
        let expected = FetchTicket { seq: 1, query: "rust".into() };
        assert_eq!(settle(&mut s, "rust"), FetchPlan::Issue(expected));
        assert_eq!(s.suggestions().len(), 1);
        assert!(!s.snapshot().popular_loading);
    }

    #[test]
    fn older_popular_response_never_lands() {
        let mut s = SearchState::new();
        settle(&mut s, "rust");
        let old = s.begin_popular();
        let new = s.begin_popular();

        // Older fetch finishing first neither applies nor ends loading.
        assert!(!s.apply_popular(old, Ok(vec![PopularSearch::new("rust old", 1)])));
        assert!(s.snapshot().popular_loading);
        assert!(s.suggestions().is_empty());

        assert!(s.apply_popular(new, Ok(vec![PopularSearch::new("rust new", 9)])));
        assert!(!s.snapshot().popular_loading);
        assert_eq!(s.snapshot().labels(), vec!["rust new (9 searches)"]);
    }

    #[test]
    fn new_query_with_identical_results_resets_cursor() {
        let mut s = SearchState::new();
        let t = issued(settle(&mut s, "rust"));
        s.apply_response(t.seq, Ok(vec![Article::new("Rust Ownership", "")]));
        s.move_selection(Direction::Down);
        assert_eq!(s.active_index(), Some(0));

        let t = issued(settle(&mut s, "ownership"));
        assert_eq!(s.active_index(), None);
        s.apply_response(t.seq, Ok(vec![Article::new("Rust Ownership", "")]));
        assert_eq!(s.active_index(), None);
        assert_eq!(s.confirm_selection(), None);
    }

    #[test]
    fn error_hides_popular_matches_from_selection() {
        let mut s = SearchState::new();
        let seq = s.begin_popular();
        s.apply_popular(seq, Ok(vec![PopularSearch::new("rust async", 5)]));
        let t = issued(settle(&mut s, "rust"));
        assert_eq!(s.suggestions().len(), 1);

        s.apply_response(t.seq, Err(SearchError::Status { status: 500 }));
        assert!(s.suggestions().is_empty());
        s.move_selection(Direction::Down);
        assert_eq!(s.active_index(), None);
        assert_eq!(s.confirm_selection(), None);
        assert_eq!(s.query(), "rust");

        let t = issued(settle(&mut s, "rust "));
        s.apply_response(t.seq, Ok(vec![]));
        assert_eq!(s.snapshot().labels(), vec!["rust async (5 searches)"]);
    }
}

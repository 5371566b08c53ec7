//! Core types shared across the controller: provider records, suggestions,
//! the cursor direction, and the snapshot handed to renderers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One article returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }
}

/// A query other users ran often, with how many times it was run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularSearch {
    pub query: String,
    pub count: u64,
}

impl PopularSearch {
    pub fn new(query: impl Into<String>, count: u64) -> Self {
        Self { query: query.into(), count }
    }
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// One entry of the suggestion list. Popular matches always precede articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    Popular(PopularSearch),
    Article(Article),
}

impl Suggestion {
    /// Text copied into the query when this entry is selected.
    pub fn title(&self) -> &str {
        match self {
            Suggestion::Popular(p) => &p.query,
            Suggestion::Article(a) => &a.title,
        }
    }

    pub fn kind(&self) -> SuggestionKind {
        match self {
            Suggestion::Popular(_) => SuggestionKind::Popular,
            Suggestion::Article(_) => SuggestionKind::Article,
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Popular(p) => write!(f, "{} ({} searches)", p.query, p.count),
            Suggestion::Article(a) => f.write_str(&a.title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Popular,
    Article,
}

/// Keyboard cursor movement over the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Render-ready form of a [`Suggestion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionView {
    pub kind: SuggestionKind,
    pub label: String,
    pub title: String,
    /// Article body; empty for popular searches.
    pub content: String,
}

impl From<&Suggestion> for SuggestionView {
    fn from(s: &Suggestion) -> Self {
        let content = match s {
            Suggestion::Article(a) => a.content.clone(),
            Suggestion::Popular(_) => String::new(),
        };
        Self { kind: s.kind(), label: s.to_string(), title: s.title().to_string(), content }
    }
}

/// Everything a renderer needs to draw the input and its dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchSnapshot {
    pub query: String,
    pub debounced_query: String,
    pub suggestions: Vec<SuggestionView>,
    pub active_index: Option<usize>,
    pub visible: bool,
    pub loading: bool,
    pub popular_loading: bool,
    pub error: Option<String>,
    pub show_no_results: bool,
}

impl SearchSnapshot {
    pub fn titles(&self) -> Vec<&str> {
        self.suggestions.iter().map(|s| s.title.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.suggestions.iter().map(|s| s.label.as_str()).collect()
    }
}

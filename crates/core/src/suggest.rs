//! Suggestion list assembly and cursor movement.
//!
//! Popular searches are matched case-insensitively as substrings of the settled
//! query, then followed by the provider's articles in the order they arrived.

use crate::types::{Article, Direction, PopularSearch, Suggestion};

/// Popular searches whose query contains `debounced` (case-insensitive).
/// A blank query matches nothing.
pub fn filter_popular<'a>(popular: &'a [PopularSearch], debounced: &str) -> Vec<&'a PopularSearch> {
    let needle = debounced.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    popular.iter().filter(|p| p.query.to_lowercase().contains(&needle)).collect()
}

/// Filtered popular entries followed by articles.
pub fn build_suggestions(
    popular: &[PopularSearch],
    articles: &[Article],
    debounced: &str,
) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = filter_popular(popular, debounced)
        .into_iter()
        .cloned()
        .map(Suggestion::Popular)
        .collect();
    out.extend(articles.iter().cloned().map(Suggestion::Article));
    out
}

/// Next cursor position over a list of `len` entries. Never wraps; a cursor
/// with nothing selected moves onto the first entry.
pub fn step_cursor(active: Option<usize>, len: usize, direction: Direction) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (active, direction) {
        (None, _) => Some(0),
        (Some(i), Direction::Down) => Some((i + 1).min(len - 1)),
        (Some(i), Direction::Up) => Some(i.saturating_sub(1).min(len - 1)),
    }
}

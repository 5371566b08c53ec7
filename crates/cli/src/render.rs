//! Plain-text and JSON rendering of snapshots.

use searchbar_core::{SearchSnapshot, SuggestionKind};

pub fn render(snapshot: &SearchSnapshot, json: bool) -> String {
    if json {
        return serde_json::to_string(snapshot).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"));
    }

    let mut out = format!("search: {}", snapshot.query);
    if snapshot.loading {
        out.push_str("\n  Loading...");
    }
    if let Some(error) = &snapshot.error {
        out.push_str(&format!("\n  Error: {error}"));
        return out;
    }
    if !snapshot.visible {
        return out;
    }
    for (i, suggestion) in snapshot.suggestions.iter().enumerate() {
        let marker = if snapshot.active_index == Some(i) { '>' } else { ' ' };
        let tag = match suggestion.kind {
            SuggestionKind::Popular => "popular",
            SuggestionKind::Article => "article",
        };
        out.push_str(&format!("\n{marker} [{tag}] {}", suggestion.label));
    }
    if snapshot.show_no_results {
        out.push_str("\n  No results found");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchbar_core::{Article, PopularSearch, Suggestion, SuggestionView};

    fn snapshot() -> SearchSnapshot {
        SearchSnapshot {
            query: "rust".into(),
            debounced_query: "rust".into(),
            suggestions: vec![
                SuggestionView::from(&Suggestion::Popular(PopularSearch::new("rust async", 5))),
                SuggestionView::from(&Suggestion::Article(Article::new("Rust Ownership", "..."))),
            ],
            active_index: Some(0),
            visible: true,
            ..Default::default()
        }
    }

    #[test]
    fn text_marks_active_entry() {
        let text = render(&snapshot(), false);
        assert_eq!(
            text,
            "search: rust\n> [popular] rust async (5 searches)\n  [article] Rust Ownership"
        );
    }

    #[test]
    fn error_replaces_list() {
        let snap = SearchSnapshot { error: Some("search index unavailable".into()), ..snapshot() };
        assert_eq!(render(&snap, false), "search: rust\n  Error: search index unavailable");
    }

    #[test]
    fn hidden_list_prints_only_query() {
        let snap = SearchSnapshot { visible: false, ..snapshot() };
        assert_eq!(render(&snap, false), "search: rust");
    }

    #[test]
    fn json_is_one_line() {
        let line = render(&snapshot(), true);
        assert!(!line.contains('\n'));
        assert!(line.contains("\"label\":\"rust async (5 searches)\""));
    }
}

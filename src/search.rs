//! Search mode state machine.
//!
//! ```text
//!   Off ──activate──▶ Composing ──confirm──▶ Applied
//!    ▲                  │   ▲                  │
//!    └──────cancel──────┘   └───activate───────┤
//!    ▲                                         │
//!    └──────────────────cancel─────────────────┘
//! ```
//!
//! While composing every edit re-runs the filter so the list previews the
//! result. Once applied the query is frozen; the result is only recomputed
//! when the tree underneath changes.

use crate::filter::{filter_tree, FilterResult};
use crate::query::SearchQuery;
use crate::tree::{NodeKind, Tree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    #[default]
    Off,
    Composing,
    Applied,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    mode: SearchMode,
    input: String,
    query: SearchQuery,
    results: FilterResult,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Raw text typed into the prompt
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn results(&self) -> &FilterResult {
        &self.results
    }

    pub fn is_composing(&self) -> bool {
        self.mode == SearchMode::Composing
    }

    /// Whether the active list is the filter result rather than the tree.
    /// An empty prompt shows the plain tree.
    pub fn is_filtering(&self) -> bool {
        self.mode != SearchMode::Off && !self.input.is_empty()
    }

    /// Start a fresh query. From Applied this drops the frozen result.
    pub fn activate(&mut self) -> bool {
        if self.mode == SearchMode::Composing {
            return false;
        }
        log::debug!("search: {:?} -> Composing", self.mode);
        self.mode = SearchMode::Composing;
        self.input.clear();
        self.query = SearchQuery::default();
        self.results.clear();
        true
    }

    pub fn push_char<K: NodeKind>(&mut self, c: char, tree: &Tree<K>) -> bool {
        if self.mode != SearchMode::Composing {
            return false;
        }
        self.input.push(c);
        self.rerun(tree);
        true
    }

    pub fn backspace<K: NodeKind>(&mut self, tree: &Tree<K>) -> bool {
        if self.mode != SearchMode::Composing || self.input.pop().is_none() {
            return false;
        }
        self.rerun(tree);
        true
    }

    /// Replace the whole prompt at once
    pub fn set_input<K: NodeKind>(&mut self, text: &str, tree: &Tree<K>) -> bool {
        if self.mode != SearchMode::Composing {
            return false;
        }
        self.input = text.to_string();
        self.rerun(tree);
        true
    }

    /// Freeze the current result. An empty prompt has nothing to freeze and
    /// goes straight back to Off.
    pub fn confirm(&mut self) -> bool {
        if self.mode != SearchMode::Composing {
            return false;
        }
        if self.input.is_empty() {
            return self.cancel();
        }
        log::debug!(
            "search: Composing -> Applied with {:?} ({} results)",
            self.input,
            self.results.len()
        );
        self.mode = SearchMode::Applied;
        true
    }

    pub fn cancel(&mut self) -> bool {
        if self.mode == SearchMode::Off {
            return false;
        }
        log::debug!("search: {:?} -> Off", self.mode);
        self.mode = SearchMode::Off;
        self.input.clear();
        self.query = SearchQuery::default();
        self.results.clear();
        true
    }

    /// Re-run the current query after the tree changed underneath, so the
    /// result never refers to discarded nodes.
    pub fn refresh<K: NodeKind>(&mut self, tree: &Tree<K>) {
        if self.is_filtering() {
            self.results = filter_tree(tree, &self.query);
        }
    }

    /// Status line text: `/input (pos/total)` while composing,
    /// `input (pos/total)` once applied, empty when off.
    pub fn status(&self, cursor: usize, total: usize) -> String {
        let position = if total == 0 { 0 } else { cursor + 1 };
        match self.mode {
            SearchMode::Off => String::new(),
            SearchMode::Composing => format!("/{} ({}/{})", self.input, position, total),
            SearchMode::Applied => format!("{} ({}/{})", self.input, position, total),
        }
    }

    fn rerun<K: NodeKind>(&mut self, tree: &Tree<K>) {
        self.query = SearchQuery::parse(&self.input);
        if self.input.is_empty() {
            self.results.clear();
        } else {
            self.results = filter_tree(tree, &self.query);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TypeFilter;
    use crate::tree::test_support::*;

    fn type_str<K: NodeKind>(state: &mut SearchState, text: &str, tree: &Tree<K>) {
        for c in text.chars() {
            state.push_char(c, tree);
        }
    }

    #[test]
    fn test_starts_off() {
        let state = SearchState::new();
        assert_eq!(state.mode(), SearchMode::Off);
        assert!(!state.is_filtering());
        assert_eq!(state.status(0, 0), "");
    }

    #[test]
    fn test_typing_previews_results() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        assert!(state.activate());
        assert!(!state.is_filtering());

        // p-u-b-l is a subsequence match too
        type_str(&mut state, "pl", &tree);
        assert!(state.is_filtering());
        assert_eq!(
            labels(&tree, &state.results().matches),
            vec!["public", "plan", "plan_check_run"]
        );

        type_str(&mut state, "an_", &tree);
        assert_eq!(labels(&tree, &state.results().matches), vec!["plan_check_run"]);

        state.backspace(&tree);
        assert_eq!(state.input(), "plan");
        assert_eq!(state.results().len(), 2);
    }

    #[test]
    fn test_edits_ignored_outside_composing() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        assert!(!state.push_char('x', &tree));
        assert!(!state.backspace(&tree));
        assert!(!state.confirm());
        assert!(!state.cancel());
    }

    #[test]
    fn test_confirm_freezes_and_cancel_restores() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        state.activate();
        type_str(&mut state, "t:plan", &tree);
        assert_eq!(state.query().type_filter, Some(TypeFilter::Table));

        assert!(state.confirm());
        assert_eq!(state.mode(), SearchMode::Applied);
        assert!(!state.push_char('x', &tree));
        assert_eq!(state.results().len(), 2);
        assert_eq!(state.status(1, 2), "t:plan (2/2)");

        assert!(state.cancel());
        assert_eq!(state.mode(), SearchMode::Off);
        assert!(state.results().is_empty());
        assert_eq!(state.input(), "");
    }

    #[test]
    fn test_cancel_while_composing_clears() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        state.activate();
        type_str(&mut state, "us", &tree);
        assert!(state.cancel());
        assert!(!state.is_filtering());
        assert!(state.results().is_empty());
    }

    #[test]
    fn test_reactivation_from_applied_starts_fresh() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        state.activate();
        type_str(&mut state, "users", &tree);
        state.confirm();

        assert!(state.activate());
        assert_eq!(state.mode(), SearchMode::Composing);
        assert_eq!(state.input(), "");
        assert!(state.results().is_empty());
        assert!(!state.activate());
    }

    #[test]
    fn test_confirm_empty_prompt_turns_search_off() {
        let mut state = SearchState::new();
        state.activate();
        assert!(state.confirm());
        assert_eq!(state.mode(), SearchMode::Off);
    }

    #[test]
    fn test_status_strings() {
        let tree = sample_tree();
        let mut state = SearchState::new();
        state.activate();
        type_str(&mut state, "zzz", &tree);
        assert_eq!(state.status(0, 0), "/zzz (0/0)");
    }

    #[test]
    fn test_refresh_reruns_query() {
        let mut tree = sample_tree();
        let mut state = SearchState::new();
        state.activate();
        type_str(&mut state, "plan", &tree);
        state.confirm();

        let tables = tree.find_by_id("public.tables").unwrap();
        tree.refresh_children(tables, vec![spec("public.plan", TestKind::Table)]);
        state.refresh(&tree);

        assert_eq!(state.results().len(), 1);
        assert_eq!(state.mode(), SearchMode::Applied);
    }
}

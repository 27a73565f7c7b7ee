use crate::fuzzy::GreedyMatcher;
use crate::query::SearchQuery;
use crate::tree::{NodeIdx, NodeKind, Tree};
use fuzzy_matcher::FuzzyMatcher;
use std::collections::HashMap;
use std::time::Instant;

/// Ordered filter hits plus the label offsets each positive hit consumed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    pub matches: Vec<NodeIdx>,
    positions: HashMap<NodeIdx, Vec<usize>>,
}

impl FilterResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Highlight offsets for a node, if the match consumed any
    pub fn positions(&self, idx: NodeIdx) -> Option<&[usize]> {
        self.positions.get(&idx).map(|p| p.as_slice())
    }

    pub fn index_of(&self, idx: NodeIdx) -> Option<usize> {
        self.matches.iter().position(|m| *m == idx)
    }

    pub fn clear(&mut self) {
        self.matches.clear();
        self.positions.clear();
    }
}

/// Per-node policy.
///
/// Non-negated: include when the type satisfies the filter and the pattern
/// matches. Negated queries use the following rule, which is deliberately
/// not `!(type && pattern)`:
/// - a type filter is present and the type does not satisfy it: include;
/// - the type satisfies the filter but the pattern does not match: include;
/// - no type filter: include iff the pattern does not match.
///
/// Returns `None` when the node is excluded, otherwise the highlight
/// offsets (empty for negated hits).
pub fn evaluate<K: NodeKind, M: FuzzyMatcher>(
    kind: K,
    label: &str,
    query: &SearchQuery,
    matcher: &M,
) -> Option<Vec<usize>> {
    let type_ok = query.type_filter.map_or(true, |f| kind.satisfies(f));
    let pattern_hit = if query.pattern.is_empty() {
        Some(Vec::new())
    } else {
        matcher
            .fuzzy_indices(label, &query.pattern)
            .map(|(_, positions)| positions)
    };

    if !query.negate {
        return if type_ok { pattern_hit } else { None };
    }

    let include = match query.type_filter {
        Some(_) if !type_ok => true,
        Some(_) => pattern_hit.is_none(),
        None => pattern_hit.is_none(),
    };
    include.then(Vec::new)
}

/// Walk the whole tree, collapsed parts included, and collect the
/// searchable nodes the query selects, in pre-order.
pub fn filter_tree<K: NodeKind>(tree: &Tree<K>, query: &SearchQuery) -> FilterResult {
    filter_tree_with(tree, query, &GreedyMatcher)
}

pub fn filter_tree_with<K: NodeKind, M: FuzzyMatcher>(
    tree: &Tree<K>,
    query: &SearchQuery,
    matcher: &M,
) -> FilterResult {
    let start = Instant::now();
    let mut result = FilterResult::default();

    for idx in tree.walk() {
        let Some(node) = tree.get(idx) else {
            continue;
        };
        if !node.kind.is_searchable() {
            continue;
        }
        if let Some(positions) = evaluate(node.kind, &node.label, query, matcher) {
            result.matches.push(idx);
            if !positions.is_empty() {
                result.positions.insert(idx, positions);
            }
        }
    }

    log::debug!(
        "filter: {:?} matched {} of {} nodes in {:?}",
        query,
        result.len(),
        tree.len(),
        start.elapsed()
    );
    result
}

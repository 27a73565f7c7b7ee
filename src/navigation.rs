//! Structural jumps over the flattened view.
//!
//! Every function takes the current flat list and cursor and returns the new
//! cursor index, or `None` when there is nowhere to go. None of them mutate
//! the tree; mark jumps that need to reveal collapsed ancestors are driven by
//! the navigator.

use crate::query::TypeFilter;
use crate::tree::{NodeIdx, NodeKind, Tree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Indices to visit after `cursor`, in scan order, without wrapping
    fn scan(self, cursor: usize, len: usize) -> Box<dyn Iterator<Item = usize>> {
        match self {
            Direction::Forward => Box::new((cursor + 1)..len),
            Direction::Backward => Box::new((0..cursor.min(len)).rev()),
        }
    }
}

/// Row of the current node's parent. `None` for top-level nodes, whose
/// parent is the hidden root.
pub fn parent_index<K: NodeKind>(tree: &Tree<K>, flat: &[NodeIdx], cursor: usize) -> Option<usize> {
    let current = *flat.get(cursor)?;
    let parent = tree.parent(current)?;
    if parent == tree.root() {
        return None;
    }
    // The parent always precedes its children in pre-order
    flat[..cursor].iter().rposition(|idx| *idx == parent)
}

/// Next or previous node sharing the current node's parent. The scan stops
/// at the first shallower row, which marks the end of the parent's subtree.
pub fn sibling_index<K: NodeKind>(
    tree: &Tree<K>,
    flat: &[NodeIdx],
    cursor: usize,
    direction: Direction,
) -> Option<usize> {
    let current = *flat.get(cursor)?;
    let parent = tree.parent(current);
    let depth = tree.depth(current);

    for i in direction.scan(cursor, flat.len()) {
        let candidate = flat[i];
        let candidate_depth = tree.depth(candidate);
        if candidate_depth < depth {
            return None;
        }
        if candidate_depth == depth && tree.parent(candidate) == parent {
            return Some(i);
        }
    }
    None
}

/// Next or previous node of a type class. Stops at the list boundary.
pub fn type_jump_index<K: NodeKind>(
    tree: &Tree<K>,
    flat: &[NodeIdx],
    cursor: usize,
    filter: TypeFilter,
    direction: Direction,
) -> Option<usize> {
    direction.scan(cursor, flat.len()).find(|i| {
        tree.get(flat[*i])
            .map_or(false, |node| node.kind.satisfies(filter))
    })
}

/// Next or previous row whose label starts with `key` (case-insensitive).
/// Wraps around the list; the current row is only considered last.
pub fn quick_jump_index<K: NodeKind>(
    tree: &Tree<K>,
    list: &[NodeIdx],
    cursor: usize,
    key: char,
    direction: Direction,
) -> Option<usize> {
    let len = list.len();
    if len == 0 {
        return None;
    }
    let cursor = cursor.min(len - 1);
    let wanted: Vec<char> = key.to_lowercase().collect();

    (1..=len)
        .map(|step| match direction {
            Direction::Forward => (cursor + step) % len,
            Direction::Backward => (cursor + len - step) % len,
        })
        .find(|i| starts_with_key(tree, list[*i], &wanted))
}

fn starts_with_key<K: NodeKind>(tree: &Tree<K>, idx: NodeIdx, wanted: &[char]) -> bool {
    tree.get(idx).map_or(false, |node| {
        node.label
            .chars()
            .flat_map(char::to_lowercase)
            .take(wanted.len())
            .eq(wanted.iter().copied())
    })
}

/// Single-key bookmarks. Targets are node ids so they survive refreshes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    marks: HashMap<char, String>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite a mark
    pub fn set(&mut self, key: char, id: impl Into<String>) {
        let id = id.into();
        log::debug!("mark '{}' -> {}", key, id);
        self.marks.insert(key, id);
    }

    pub fn get(&self, key: char) -> Option<&str> {
        self.marks.get(&key).map(String::as_str)
    }

    pub fn remove(&mut self, key: char) -> Option<String> {
        self.marks.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Marks sorted by key
    pub fn entries(&self) -> Vec<(char, &str)> {
        let mut entries: Vec<(char, &str)> =
            self.marks.iter().map(|(k, v)| (*k, v.as_str())).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

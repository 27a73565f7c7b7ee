use crate::query::TypeFilter;
use std::fmt::Debug;

/// Capability set a node type tag must provide so the generic engine
/// (flatten, filter, navigation) can work over it.
pub trait NodeKind: Copy + Eq + Debug + Send + 'static {
    /// Opaque payload carried on every node, only read by [`NodeKind::decorate`].
    type Meta: Debug + Clone + Default + Send;

    /// The tag used for the (never rendered) root node.
    fn root() -> Self;

    /// The tag used for synthetic error nodes installed after a failed load.
    fn error() -> Self;

    /// Whether nodes of this type may appear as filter results.
    fn is_searchable(&self) -> bool;

    /// Whether this type belongs to the given query type class.
    fn satisfies(&self, filter: TypeFilter) -> bool;

    /// Whether nodes of this type can never have children.
    fn is_leaf(&self) -> bool;

    /// Render-time label decoration. The result must start with the raw
    /// label so that match offsets stay valid for highlighting.
    fn decorate(node: &TreeNode<Self>) -> String
    where
        Self: Sized,
    {
        node.label.clone()
    }
}

/// Handle to a node slot inside a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Descriptor for a child handed over by a loader
#[derive(Debug, Clone)]
pub struct ChildSpec<K: NodeKind> {
    pub id: String,
    pub kind: K,
    pub label: String,
    pub meta: K::Meta,
    pub leaf: bool,
    pub selectable: bool,
}

impl<K: NodeKind> ChildSpec<K> {
    pub fn new(id: impl Into<String>, kind: K, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            meta: K::Meta::default(),
            leaf: kind.is_leaf(),
            selectable: true,
        }
    }

    pub fn with_meta(mut self, meta: K::Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Mark the child as a leaf regardless of its type tag
    pub fn leaf(mut self) -> Self {
        self.leaf = true;
        self
    }

    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }
}

/// Represents a single node in the tree
#[derive(Debug, Clone)]
pub struct TreeNode<K: NodeKind> {
    pub id: String,
    pub kind: K,
    pub label: String,
    pub meta: K::Meta,
    pub expanded: bool,
    pub loaded: bool,
    pub leaf: bool,
    pub selectable: bool,
    children: Vec<NodeIdx>,
    parent: Option<NodeIdx>,
}

impl<K: NodeKind> TreeNode<K> {
    fn from_spec(spec: ChildSpec<K>, parent: NodeIdx) -> Self {
        Self {
            id: spec.id,
            kind: spec.kind,
            label: spec.label,
            meta: spec.meta,
            expanded: false,
            // Leaves are complete as soon as they exist
            loaded: spec.leaf,
            leaf: spec.leaf,
            selectable: spec.selectable,
            children: Vec::new(),
            parent: Some(parent),
        }
    }

    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    /// Check if this node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Decorated label for display
    pub fn display_label(&self) -> String {
        K::decorate(self)
    }
}

/// Statistics about the tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub expanded_nodes: usize,
    pub loaded_nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
}

/// Arena of nodes. Every node owns its children list; the parent link is a
/// plain index used only for walking upwards.
#[derive(Debug, Clone)]
pub struct Tree<K: NodeKind> {
    nodes: Vec<Option<TreeNode<K>>>,
    free: Vec<usize>,
    root: NodeIdx,
}

impl<K: NodeKind> Tree<K> {
    /// Create a tree holding only an (expanded, not yet loaded) root
    pub fn new(root_id: impl Into<String>, root_label: impl Into<String>) -> Self {
        let root = TreeNode {
            id: root_id.into(),
            kind: K::root(),
            label: root_label.into(),
            meta: K::Meta::default(),
            expanded: true,
            loaded: false,
            leaf: false,
            selectable: false,
            children: Vec::new(),
            parent: None,
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeIdx(0),
        }
    }

    pub fn root(&self) -> NodeIdx {
        self.root
    }

    pub fn get(&self, idx: NodeIdx) -> Option<&TreeNode<K>> {
        self.nodes.get(idx.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, idx: NodeIdx) -> Option<&mut TreeNode<K>> {
        self.nodes.get_mut(idx.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, idx: NodeIdx) -> bool {
        self.get(idx).is_some()
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.get(self.root).map_or(true, |root| root.children.is_empty())
    }

    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        self.get(idx).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.get(idx).and_then(|n| n.parent)
    }

    /// Append a child and wire its back-reference. Returns `None` when the
    /// parent handle is stale.
    pub fn add_child(&mut self, parent: NodeIdx, spec: ChildSpec<K>) -> Option<NodeIdx> {
        if !self.contains(parent) {
            return None;
        }
        let idx = self.alloc(TreeNode::from_spec(spec, parent));
        let parent_node = self.get_mut(parent)?;
        parent_node.children.push(idx);
        parent_node.loaded = true;
        Some(idx)
    }

    /// Flip the expand state. Leaves never expand. Returns the new state.
    pub fn toggle(&mut self, idx: NodeIdx) -> bool {
        match self.get_mut(idx) {
            Some(node) if !node.leaf => {
                node.expanded = !node.expanded;
                node.expanded
            }
            _ => false,
        }
    }

    pub fn expand(&mut self, idx: NodeIdx) -> bool {
        match self.get_mut(idx) {
            Some(node) if !node.leaf && !node.expanded => {
                node.expanded = true;
                true
            }
            _ => false,
        }
    }

    pub fn collapse(&mut self, idx: NodeIdx) -> bool {
        if idx == self.root {
            return false;
        }
        match self.get_mut(idx) {
            Some(node) if node.expanded => {
                node.expanded = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_expanded(&self, idx: NodeIdx) -> bool {
        self.get(idx).map_or(false, |n| n.expanded)
    }

    /// Depth-first search for a node by id
    pub fn find_by_id(&self, id: &str) -> Option<NodeIdx> {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = self.get(idx)?;
            if node.id == id {
                return Some(idx);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Replace the whole child sequence. The previous children and their
    /// subtrees are discarded.
    pub fn refresh_children(&mut self, idx: NodeIdx, new_children: Vec<ChildSpec<K>>) -> bool {
        let old = match self.get_mut(idx) {
            Some(node) => std::mem::take(&mut node.children),
            None => return false,
        };
        for child in old {
            self.remove_subtree(child);
        }

        let mut fresh = Vec::with_capacity(new_children.len());
        for spec in new_children {
            fresh.push(self.alloc(TreeNode::from_spec(spec, idx)));
        }

        if let Some(node) = self.get_mut(idx) {
            node.children = fresh;
            node.loaded = true;
        }
        true
    }

    /// Depth below the root: the root's children sit at depth 0.
    pub fn depth(&self, idx: NodeIdx) -> usize {
        let mut depth = 0;
        let mut current = self.parent(idx);
        while let Some(parent) = current {
            if parent == self.root {
                break;
            }
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Ancestors from the direct parent upwards, root excluded
    pub fn ancestors(&self, idx: NodeIdx) -> Vec<NodeIdx> {
        let mut out = Vec::new();
        let mut current = self.parent(idx);
        while let Some(parent) = current {
            if parent == self.root {
                break;
            }
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Expand every ancestor of `idx` so it shows up in the flattened view.
    /// Returns the ancestors that actually changed state, outermost first.
    pub fn reveal(&mut self, idx: NodeIdx) -> Vec<NodeIdx> {
        let mut opened = Vec::new();
        for ancestor in self.ancestors(idx).into_iter().rev() {
            if self.expand(ancestor) {
                opened.push(ancestor);
            }
        }
        opened
    }

    /// Pre-order walk over every node below the root, ignoring expand state
    pub fn walk(&self) -> Walk<'_, K> {
        let mut stack: Vec<NodeIdx> = self.children(self.root).to_vec();
        stack.reverse();
        Walk { tree: self, stack }
    }

    /// Get tree statistics
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for idx in self.walk() {
            if let Some(node) = self.get(idx) {
                stats.total_nodes += 1;
                if node.expanded {
                    stats.expanded_nodes += 1;
                }
                if node.loaded {
                    stats.loaded_nodes += 1;
                }
                if node.leaf {
                    stats.leaves += 1;
                }
                stats.max_depth = stats.max_depth.max(self.depth(idx));
            }
        }
        stats
    }

    fn alloc(&mut self, node: TreeNode<K>) -> NodeIdx {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeIdx(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeIdx(self.nodes.len() - 1)
            }
        }
    }

    fn remove_subtree(&mut self, idx: NodeIdx) {
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(|slot| slot.take()) {
                stack.extend(node.children);
                self.free.push(current.0);
            }
        }
    }
}

/// Iterator returned by [`Tree::walk`]
pub struct Walk<'a, K: NodeKind> {
    tree: &'a Tree<K>,
    stack: Vec<NodeIdx>,
}

impl<'a, K: NodeKind> Iterator for Walk<'a, K> {
    type Item = NodeIdx;

    fn next(&mut self) -> Option<NodeIdx> {
        let idx = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(idx).iter().rev().copied());
        Some(idx)
    }
}

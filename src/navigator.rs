//! Navigator facade
//!
//! Ties one tree to its flattened projection, a viewport, the search state
//! machine and the mark table. Both the database browser and the JSON
//! inspector are a `Navigator` over their own node vocabulary.

use crate::error::LoaderError;
use crate::flatten::flatten;
use crate::navigation::{self, Direction, Marks};
use crate::query::TypeFilter;
use crate::search::{SearchMode, SearchState};
use crate::tree::{ChildSpec, NodeIdx, NodeKind, Tree, TreeNode, TreeStats};
use crate::viewport::Viewport;

/// Key-level actions the navigator understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorEvent {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
    Expand,
    Collapse,
    Toggle,
    Select,
    Parent,
    Sibling(Direction),
    TypeJump(TypeFilter, Direction),
    QuickJump(char, Direction),
    SetMark(char),
    JumpToMark(char),
    StartSearch,
    SearchInput(char),
    SearchBackspace,
    SetSearchQuery(String),
    ConfirmSearch,
    CancelSearch,
}

/// Side effects for the caller: open a detail pane, issue a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorOutput {
    Selected { node: NodeIdx, id: String },
    Toggled { node: NodeIdx, id: String, expanded: bool },
    LoadRequested(String),
}

/// One on-screen row, ready for styling
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow<K: NodeKind> {
    pub idx: NodeIdx,
    pub kind: K,
    pub depth: usize,
    /// Decorated label; always starts with the raw label
    pub label: String,
    pub is_selected: bool,
    pub positions: Option<Vec<usize>>,
    pub expanded: bool,
    pub leaf: bool,
    pub loaded: bool,
    /// Ancestor path, only set while a filter is shown
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    viewport: Viewport,
    mode: SearchMode,
    input: String,
    revision: u64,
    marks: Marks,
}

#[derive(Debug)]
pub struct Navigator<K: NodeKind> {
    tree: Tree<K>,
    flat: Vec<NodeIdx>,
    viewport: Viewport,
    search: SearchState,
    marks: Marks,
    /// Node under the cursor when search started, restored on cancel
    browse_anchor: Option<String>,
    revision: u64,
    events: Vec<NavigatorOutput>,
}

impl<K: NodeKind> Navigator<K> {
    pub fn new(tree: Tree<K>) -> Self {
        let flat = flatten(&tree);
        Self {
            tree,
            flat,
            viewport: Viewport::default(),
            search: SearchState::new(),
            marks: Marks::new(),
            browse_anchor: None,
            revision: 0,
            events: Vec::new(),
        }
    }

    pub fn tree(&self) -> &Tree<K> {
        &self.tree
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn cursor(&self) -> usize {
        self.viewport.cursor()
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    /// Whether key presses currently go to the search prompt
    pub fn is_composing(&self) -> bool {
        self.search.is_composing()
    }

    /// The list the cursor walks: filter results or the flattened tree
    pub fn active_list(&self) -> &[NodeIdx] {
        if self.search.is_filtering() {
            &self.search.results().matches
        } else {
            &self.flat
        }
    }

    pub fn current_idx(&self) -> Option<NodeIdx> {
        self.active_list().get(self.viewport.cursor()).copied()
    }

    pub fn current_node(&self) -> Option<&TreeNode<K>> {
        self.current_idx().and_then(|idx| self.tree.get(idx))
    }

    pub fn search_status(&self) -> String {
        self.search
            .status(self.viewport.cursor(), self.active_list().len())
    }

    /// Drain pending side effects
    pub fn take_events(&mut self) -> Vec<NavigatorOutput> {
        std::mem::take(&mut self.events)
    }

    /// Handle an event and return whether the state changed
    pub fn handle_event(&mut self, event: NavigatorEvent) -> bool {
        let before = self.snapshot();
        let len = self.active_len();
        log::trace!("navigator event: {:?}", event);

        match event {
            NavigatorEvent::MoveUp => self.viewport.move_cursor(-1, len),
            NavigatorEvent::MoveDown => self.viewport.move_cursor(1, len),
            NavigatorEvent::PageUp => self.viewport.page_up(len),
            NavigatorEvent::PageDown => self.viewport.page_down(len),
            NavigatorEvent::HalfPageUp => self.viewport.half_page_up(len),
            NavigatorEvent::HalfPageDown => self.viewport.half_page_down(len),
            NavigatorEvent::Top => self.viewport.jump_top(len),
            NavigatorEvent::Bottom => self.viewport.jump_bottom(len),
            NavigatorEvent::Expand => {
                if let Some(idx) = self.current_idx() {
                    self.set_expanded(idx, true);
                }
            }
            NavigatorEvent::Collapse => self.collapse_or_parent(),
            NavigatorEvent::Toggle => {
                if let Some(idx) = self.current_idx() {
                    let expanded = self.tree.is_expanded(idx);
                    self.set_expanded(idx, !expanded);
                }
            }
            NavigatorEvent::Select => self.select_current(),
            NavigatorEvent::Parent => {
                let target = self.structural(|tree, flat, cursor| {
                    navigation::parent_index(tree, flat, cursor)
                });
                self.move_to(target);
            }
            NavigatorEvent::Sibling(direction) => {
                let target = self.structural(|tree, flat, cursor| {
                    navigation::sibling_index(tree, flat, cursor, direction)
                });
                self.move_to(target);
            }
            NavigatorEvent::TypeJump(filter, direction) => {
                let target = self.structural(|tree, flat, cursor| {
                    navigation::type_jump_index(tree, flat, cursor, filter, direction)
                });
                self.move_to(target);
            }
            NavigatorEvent::QuickJump(key, direction) => {
                let target = navigation::quick_jump_index(
                    &self.tree,
                    self.active_list(),
                    self.viewport.cursor(),
                    key,
                    direction,
                );
                self.move_to(target);
            }
            NavigatorEvent::SetMark(key) => {
                if let Some(id) = self.current_node().map(|n| n.id.clone()) {
                    self.marks.set(key, id);
                }
            }
            NavigatorEvent::JumpToMark(key) => self.jump_to_mark(key),
            NavigatorEvent::StartSearch => self.start_search(),
            NavigatorEvent::SearchInput(c) => {
                if self.search.push_char(c, &self.tree) {
                    self.after_query_edit();
                }
            }
            NavigatorEvent::SearchBackspace => {
                if self.search.backspace(&self.tree) {
                    self.after_query_edit();
                }
            }
            NavigatorEvent::SetSearchQuery(text) => {
                if self.search.set_input(&text, &self.tree) {
                    self.after_query_edit();
                }
            }
            NavigatorEvent::ConfirmSearch => {
                if self.search.confirm() && self.search.mode() == SearchMode::Off {
                    // Nothing was typed: back to where browsing left off
                    self.restore_anchor(None);
                }
            }
            NavigatorEvent::CancelSearch => self.cancel_search(),
        }

        before != self.snapshot()
    }

    /// Install the outcome of a children load for `id`. A failure becomes a
    /// single unselectable error child carrying the loader message.
    pub fn install_children(
        &mut self,
        id: &str,
        result: Result<Vec<ChildSpec<K>>, LoaderError>,
    ) -> bool {
        let Some(idx) = self.tree.find_by_id(id) else {
            log::warn!("install_children: {} is no longer in the tree", id);
            return false;
        };

        let children = match result {
            Ok(children) => {
                log::info!("installing {} children under {:?}", children.len(), id);
                children
            }
            Err(err) => {
                log::warn!("children load for {:?} failed: {}", id, err);
                vec![ChildSpec::new(format!("{}#error", id), K::error(), err.to_string())
                    .leaf()
                    .unselectable()]
            }
        };

        let keep = self.current_node().map(|n| n.id.clone());
        self.tree.refresh_children(idx, children);
        self.tree_changed(keep.as_deref());
        true
    }

    /// Reveal and focus a node by id, cancelling any filter first
    pub fn focus_id(&mut self, id: &str) -> bool {
        let Some(idx) = self.tree.find_by_id(id) else {
            return false;
        };
        if idx == self.tree.root() {
            return false;
        }
        if self.search.mode() != SearchMode::Off {
            self.search.cancel();
            self.browse_anchor = None;
        }
        for opened in self.tree.reveal(idx) {
            self.emit_toggled(opened, true);
        }
        self.rebuild_flat();
        if let Some(pos) = self.flat.iter().position(|i| *i == idx) {
            self.viewport.set_cursor(pos, self.flat.len());
        }
        true
    }

    /// Rows in the visible window. `visible_height` also becomes the new
    /// page size.
    pub fn render(&mut self, visible_height: usize) -> Vec<RenderRow<K>> {
        let len = self.active_len();
        self.viewport.set_visible_height(visible_height, len);
        self.viewport.clamp(len);

        let filtering = self.search.is_filtering();
        let cursor = self.viewport.cursor();
        let range = self.viewport.visible_range(len);
        let list = self.active_list();

        range
            .filter_map(|row| {
                let idx = list[row];
                let node = self.tree.get(idx)?;
                let positions = if filtering {
                    self.search.results().positions(idx).map(<[usize]>::to_vec)
                } else {
                    None
                };
                Some(RenderRow {
                    idx,
                    kind: node.kind,
                    depth: if filtering { 0 } else { self.tree.depth(idx) },
                    label: node.display_label(),
                    is_selected: row == cursor,
                    positions,
                    expanded: node.expanded,
                    leaf: node.leaf,
                    loaded: node.loaded,
                    context: filtering.then(|| self.context_path(idx)),
                })
            })
            .collect()
    }

    /// Labels of the ancestors, outermost first, joined with '/'
    pub fn context_path(&self, idx: NodeIdx) -> String {
        let mut parts: Vec<&str> = self
            .tree
            .ancestors(idx)
            .into_iter()
            .filter_map(|a| self.tree.get(a).map(|n| n.label.as_str()))
            .collect();
        parts.reverse();
        parts.join("/")
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            viewport: self.viewport,
            mode: self.search.mode(),
            input: self.search.input().to_string(),
            revision: self.revision,
            marks: self.marks.clone(),
        }
    }

    fn active_len(&self) -> usize {
        self.active_list().len()
    }

    fn rebuild_flat(&mut self) {
        self.flat = flatten(&self.tree);
        self.revision += 1;
    }

    /// Recompute everything derived from the tree, keeping the cursor on
    /// `keep` when that node is still listed.
    fn tree_changed(&mut self, keep: Option<&str>) {
        self.rebuild_flat();
        self.search.refresh(&self.tree);
        let len = self.active_len();
        let target = keep.and_then(|id| {
            self.active_list()
                .iter()
                .position(|idx| self.tree.get(*idx).map_or(false, |n| n.id == id))
        });
        match target {
            Some(pos) => self.viewport.set_cursor(pos, len),
            None => self.viewport.clamp(len),
        }
    }

    fn set_expanded(&mut self, idx: NodeIdx, expanded: bool) {
        let Some(node) = self.tree.get(idx) else {
            return;
        };
        if node.leaf || node.expanded == expanded {
            return;
        }
        let needs_load = expanded && !node.loaded;
        let id = node.id.clone();

        if expanded {
            self.tree.expand(idx);
        } else {
            self.tree.collapse(idx);
        }
        self.emit_toggled(idx, expanded);
        if needs_load {
            log::debug!("requesting children for {:?}", id);
            self.events.push(NavigatorOutput::LoadRequested(id.clone()));
        }
        self.tree_changed(Some(&id));
    }

    fn collapse_or_parent(&mut self) {
        let Some(idx) = self.current_idx() else {
            return;
        };
        if self.tree.is_expanded(idx) {
            self.set_expanded(idx, false);
        } else {
            let target = self.structural(|tree, flat, cursor| {
                navigation::parent_index(tree, flat, cursor)
            });
            self.move_to(target);
        }
    }

    fn select_current(&mut self) {
        let Some(idx) = self.current_idx() else {
            return;
        };
        let Some(node) = self.tree.get(idx) else {
            return;
        };
        let (selectable, leaf, expanded, id) =
            (node.selectable, node.leaf, node.expanded, node.id.clone());

        if selectable {
            self.events.push(NavigatorOutput::Selected { node: idx, id });
        }
        if !leaf && !self.search.is_filtering() {
            self.set_expanded(idx, !expanded);
        }
    }

    fn emit_toggled(&mut self, idx: NodeIdx, expanded: bool) {
        if let Some(node) = self.tree.get(idx) {
            self.events.push(NavigatorOutput::Toggled {
                node: idx,
                id: node.id.clone(),
                expanded,
            });
        }
    }

    /// Run a structural jump; only meaningful over the flattened tree
    fn structural<F>(&self, jump: F) -> Option<usize>
    where
        F: FnOnce(&Tree<K>, &[NodeIdx], usize) -> Option<usize>,
    {
        if self.search.is_filtering() {
            return None;
        }
        jump(&self.tree, &self.flat, self.viewport.cursor())
    }

    fn move_to(&mut self, target: Option<usize>) {
        if let Some(row) = target {
            let len = self.active_len();
            self.viewport.set_cursor(row, len);
        }
    }

    fn jump_to_mark(&mut self, key: char) {
        let Some(id) = self.marks.get(key).map(str::to_string) else {
            log::debug!("mark '{}' is not set", key);
            return;
        };
        if !self.focus_id(&id) {
            log::debug!("mark '{}' points at missing node {:?}", key, id);
        }
    }

    fn start_search(&mut self) {
        if self.search.mode() == SearchMode::Off {
            self.browse_anchor = self.current_node().map(|n| n.id.clone());
        }
        if self.search.activate() {
            self.restore_anchor(None);
        }
    }

    fn after_query_edit(&mut self) {
        if self.search.is_filtering() {
            let len = self.active_len();
            self.viewport.reset();
            self.viewport.clamp(len);
        } else {
            self.restore_anchor(None);
        }
    }

    fn cancel_search(&mut self) {
        let filtered = if self.search.is_filtering() {
            self.current_node().map(|n| n.id.clone())
        } else {
            None
        };
        if self.search.cancel() {
            self.restore_anchor(filtered);
        }
    }

    /// Put the cursor back on the flattened tree: on `preferred` if it is
    /// visible there, else on the node browsing started from.
    fn restore_anchor(&mut self, preferred: Option<String>) {
        let len = self.flat.len();
        let tree = &self.tree;
        let row_of = |id: &str| {
            self.flat
                .iter()
                .position(|idx| tree.get(*idx).map_or(false, |n| n.id == id))
        };
        let target = preferred
            .as_deref()
            .and_then(row_of)
            .or_else(|| self.browse_anchor.as_deref().and_then(row_of));

        match target {
            Some(row) => self.viewport.set_cursor(row, len),
            None => self.viewport.clamp(len),
        }
        if self.search.mode() == SearchMode::Off {
            self.browse_anchor = None;
        }
    }
}

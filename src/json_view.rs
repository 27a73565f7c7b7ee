//! JSON/JSONB value inspector vocabulary.
//!
//! The whole document is turned into a tree up front. Node ids are JSON
//! pointers (RFC 6901), so the document node itself has id `""`.

use crate::navigator::Navigator;
use crate::query::TypeFilter;
use crate::tree::{ChildSpec, NodeIdx, NodeKind, Tree, TreeNode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const PREVIEW_CHARS: usize = 40;
const ROOT_ID: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonKind {
    Root,
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
    Error,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
            Value::String(_) => JsonKind::String,
            Value::Number(_) => JsonKind::Number,
            Value::Bool(_) => JsonKind::Bool,
            Value::Null => JsonKind::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonMeta {
    /// Rendered scalar, truncated
    pub preview: Option<String>,
    /// Member or element count for containers
    pub len: Option<usize>,
}

impl NodeKind for JsonKind {
    type Meta = JsonMeta;

    fn root() -> Self {
        JsonKind::Root
    }

    fn error() -> Self {
        JsonKind::Error
    }

    fn is_searchable(&self) -> bool {
        !matches!(self, JsonKind::Root | JsonKind::Error)
    }

    // No query type class describes JSON values
    fn satisfies(&self, _filter: TypeFilter) -> bool {
        false
    }

    fn is_leaf(&self) -> bool {
        !matches!(self, JsonKind::Root | JsonKind::Object | JsonKind::Array)
    }

    fn decorate(node: &TreeNode<Self>) -> String {
        match (node.kind, &node.meta) {
            (JsonKind::Object, JsonMeta { len: Some(n), .. }) => format!("{} {{{}}}", node.label, n),
            (JsonKind::Array, JsonMeta { len: Some(n), .. }) => format!("{} [{}]", node.label, n),
            (_, JsonMeta { preview: Some(preview), .. }) => format!("{}: {}", node.label, preview),
            _ => node.label.clone(),
        }
    }
}

pub type JsonNavigator = Navigator<JsonKind>;

/// Escape one reference token of a JSON pointer
fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn preview(value: &Value) -> Option<String> {
    let text = match value {
        Value::Object(_) | Value::Array(_) => return None,
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    };
    if text.chars().count() <= PREVIEW_CHARS {
        return Some(text);
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    cut.push('…');
    Some(cut)
}

fn spec_for(id: String, label: String, value: &Value) -> ChildSpec<JsonKind> {
    let len = match value {
        Value::Object(map) => Some(map.len()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    };
    ChildSpec::new(id, JsonKind::of(value), label).with_meta(JsonMeta {
        preview: preview(value),
        len,
    })
}

/// Build the inspector tree for a decoded document. The document node is
/// expanded so its members are visible straight away.
pub fn build_tree(value: &Value, label: &str) -> Tree<JsonKind> {
    let mut tree = Tree::new(ROOT_ID, label);
    let root = tree.root();
    let Some(document) = tree.add_child(root, spec_for(String::new(), label.to_string(), value))
    else {
        return tree;
    };

    let mut stack: Vec<(NodeIdx, &Value)> = vec![(document, value)];
    while let Some((idx, current)) = stack.pop() {
        let Some(parent_id) = tree.get(idx).map(|n| n.id.clone()) else {
            continue;
        };
        let members: Vec<(String, &Value)> = match current {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("[{}]", i), v))
                .collect(),
            _ => continue,
        };

        let mut specs = Vec::with_capacity(members.len());
        for (i, (label, child)) in members.iter().enumerate() {
            let token = match current {
                Value::Array(_) => i.to_string(),
                _ => escape_token(label),
            };
            specs.push(spec_for(format!("{}/{}", parent_id, token), label.clone(), child));
        }
        tree.refresh_children(idx, specs);

        let children = tree.children(idx).to_vec();
        for (child_idx, (_, child)) in children.into_iter().zip(members) {
            if matches!(child, Value::Object(_) | Value::Array(_)) {
                stack.push((child_idx, child));
            }
        }
    }

    tree.expand(document);
    tree
}

pub fn json_navigator(value: &Value, label: &str) -> JsonNavigator {
    Navigator::new(build_tree(value, label))
}

//! Projection of a tree into the rows currently visible.

use crate::tree::{NodeIdx, NodeKind, Tree};

/// Depth-first pre-order list of visible nodes, root excluded. A node's
/// children are only visited when the node is expanded; stored child order
/// is kept as is.
pub fn flatten<K: NodeKind>(tree: &Tree<K>) -> Vec<NodeIdx> {
    flatten_with_depth(tree)
        .into_iter()
        .map(|(idx, _)| idx)
        .collect()
}

/// Same as [`flatten`], paired with each node's display depth
pub fn flatten_with_depth<K: NodeKind>(tree: &Tree<K>) -> Vec<(NodeIdx, usize)> {
    let mut visible = Vec::new();
    let mut stack: Vec<(NodeIdx, usize)> = tree
        .children(tree.root())
        .iter()
        .rev()
        .map(|idx| (*idx, 0))
        .collect();

    while let Some((idx, depth)) = stack.pop() {
        let Some(node) = tree.get(idx) else {
            continue;
        };
        visible.push((idx, depth));
        if node.expanded {
            stack.extend(node.children().iter().rev().map(|child| (*child, depth + 1)));
        }
    }

    log::trace!("flatten: {} visible of {} nodes", visible.len(), tree.len());
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::test_support::*;

    #[test]
    fn test_collapsed_tree_shows_top_level_only() {
        let tree = sample_tree();
        let flat = flatten(&tree);
        assert_eq!(labels(&tree, &flat), vec!["public", "audit"]);
    }

    #[test]
    fn test_expanded_nodes_show_children_in_stored_order() {
        let mut tree = sample_tree();
        for id in ["public", "public.tables", "public.plan"] {
            let idx = tree.find_by_id(id).unwrap();
            tree.expand(idx);
        }
        let flat = flatten(&tree);
        assert_eq!(
            labels(&tree, &flat),
            vec![
                "public",
                "tables",
                "plan",
                "id",
                "name",
                "plan_check_run",
                "users",
                "get_user",
                "audit",
            ]
        );
    }

    #[test]
    fn test_expanded_node_under_collapsed_parent_is_hidden() {
        let mut tree = sample_tree();
        let plan = tree.find_by_id("public.plan").unwrap();
        tree.expand(plan);
        let flat = flatten(&tree);
        assert!(!flat.contains(&plan));
    }

    #[test]
    fn test_depths() {
        let mut tree = sample_tree();
        for id in ["public", "public.tables"] {
            let idx = tree.find_by_id(id).unwrap();
            tree.expand(idx);
        }
        let depths: Vec<usize> = flatten_with_depth(&tree).iter().map(|(_, d)| *d).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 2, 1, 0]);
    }

    #[test]
    fn test_deterministic() {
        let mut tree = sample_tree();
        let public = tree.find_by_id("public").unwrap();
        tree.expand(public);
        assert_eq!(flatten(&tree), flatten(&tree));
    }

    #[test]
    fn test_collapse_removes_exactly_the_subtree() {
        let mut tree = sample_tree();
        for id in ["public", "public.tables", "public.plan", "audit"] {
            let idx = tree.find_by_id(id).unwrap();
            tree.expand(idx);
        }
        let before = flatten(&tree);
        let tables = tree.find_by_id("public.tables").unwrap();
        tree.collapse(tables);
        let after = flatten(&tree);

        let hidden: Vec<String> = before
            .iter()
            .filter(|idx| !after.contains(idx))
            .map(|idx| tree.get(*idx).unwrap().id.clone())
            .collect();
        assert_eq!(
            hidden,
            vec![
                "public.plan",
                "public.plan.id",
                "public.plan.name",
                "public.plan_check_run",
                "public.users",
            ]
        );
        // Everything that stayed keeps its relative order
        let kept: Vec<NodeIdx> = before.into_iter().filter(|idx| after.contains(idx)).collect();
        assert_eq!(kept, after);
    }

    #[test]
    fn test_empty_tree() {
        let tree: Tree<TestKind> = Tree::new("", "db");
        assert!(flatten(&tree).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const CONTAINERS: [&str; 4] = ["public", "public.tables", "public.plan", "audit"];

        proptest! {
            #[test]
            fn test_visible_rows_follow_expanded_parents(expanded in prop::collection::vec(any::<bool>(), 4)) {
                let mut tree = sample_tree();
                for (id, open) in CONTAINERS.iter().zip(&expanded) {
                    if *open {
                        let idx = tree.find_by_id(id).unwrap();
                        tree.expand(idx);
                    }
                }

                let rows = flatten_with_depth(&tree);
                prop_assert_eq!(&rows, &flatten_with_depth(&tree));
                for (pos, (idx, depth)) in rows.iter().enumerate() {
                    prop_assert_eq!(*depth, tree.depth(*idx));
                    let parent = tree.parent(*idx).unwrap();
                    if parent != tree.root() {
                        prop_assert!(tree.get(parent).unwrap().expanded);
                        let parent_pos = rows.iter().position(|(p, _)| *p == parent);
                        prop_assert!(matches!(parent_pos, Some(p) if p < pos));
                    }
                }
            }
        }
    }
}

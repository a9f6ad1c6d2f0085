//! Generic parent-pointer tree builder
//!
//! Nodes carry `(id, parent_id, order)`. Siblings are sorted by
//! `(order, id)`, nodes whose parent is missing from the input hang off the
//! anchor, and parent cycles never loop: every node is projected at most
//! once.

use std::collections::{HashMap, HashSet};

use shared::models::{Menu, ROOT_MENU_ID};

/// A node that can be arranged into a tree
pub trait TreeItem {
    fn id(&self) -> i64;
    fn parent_id(&self) -> i64;
    fn order(&self) -> i64;

    fn sort_key(&self) -> (i64, i64) {
        (self.order(), self.id())
    }
}

impl TreeItem for Menu {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.parent_id
    }

    fn order(&self) -> i64 {
        self.order
    }
}

/// Arrange `nodes` below `anchor` and project each node
///
/// `project` receives a node and its already projected, sorted children.
/// When building from the root sentinel, nodes that are unreachable because
/// they sit on a parent cycle are promoted to roots so that every input
/// node is emitted exactly once. Ids are expected to be unique; on
/// duplicates the first occurrence wins.
pub fn build_tree<N, T, F>(nodes: &[N], anchor: i64, mut project: F) -> Vec<T>
where
    N: TreeItem,
    F: FnMut(&N, Vec<T>) -> T,
{
    let mut index: HashMap<i64, &N> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.entry(node.id()).or_insert(node);
    }

    let mut children_map: HashMap<i64, Vec<&N>> = HashMap::new();
    for node in index.values() {
        let parent_id = node.parent_id();
        let effective = if parent_id == anchor
            || parent_id == ROOT_MENU_ID
            || index.contains_key(&parent_id)
        {
            parent_id
        } else {
            tracing::warn!(
                node_id = node.id(),
                parent_id,
                "Tree integrity: parent missing, treating node as root"
            );
            anchor
        };
        children_map.entry(effective).or_default().push(*node);
    }
    for siblings in children_map.values_mut() {
        siblings.sort_by_key(|n| n.sort_key());
    }

    let mut visited: HashSet<i64> = HashSet::with_capacity(index.len());
    let mut roots: Vec<((i64, i64), T)> = Vec::new();

    if let Some(top) = children_map.get(&anchor) {
        for node in top {
            if let Some(t) = project_subtree(*node, &children_map, &mut visited, &mut project) {
                roots.push((node.sort_key(), t));
            }
        }
    }

    if anchor == ROOT_MENU_ID && visited.len() < index.len() {
        for head in cycle_heads(&index, &visited) {
            if visited.contains(&head.id()) {
                continue;
            }
            tracing::warn!(
                node_id = head.id(),
                parent_id = head.parent_id(),
                "Tree integrity: parent cycle detected, promoting node to root"
            );
            if let Some(t) = project_subtree(head, &children_map, &mut visited, &mut project) {
                roots.push((head.sort_key(), t));
            }
        }
        roots.sort_by_key(|(key, _)| *key);
    }

    roots.into_iter().map(|(_, t)| t).collect()
}

fn project_subtree<N, T, F>(
    node: &N,
    children_map: &HashMap<i64, Vec<&N>>,
    visited: &mut HashSet<i64>,
    project: &mut F,
) -> Option<T>
where
    N: TreeItem,
    F: FnMut(&N, Vec<T>) -> T,
{
    if !visited.insert(node.id()) {
        return None;
    }
    let children = children_map
        .get(&node.id())
        .map(|kids| {
            kids.iter()
                .filter_map(|child| project_subtree(*child, children_map, visited, project))
                .collect()
        })
        .unwrap_or_default();
    Some(project(node, children))
}

/// For every cycle among the unvisited nodes, its smallest `(order, id)` member
fn cycle_heads<'a, N: TreeItem>(
    index: &HashMap<i64, &'a N>,
    visited: &HashSet<i64>,
) -> Vec<&'a N> {
    let mut pending: Vec<&N> = index
        .values()
        .filter(|n| !visited.contains(&n.id()))
        .copied()
        .collect();
    pending.sort_by_key(|n| n.sort_key());

    let mut seen_cycles: HashSet<i64> = HashSet::new();
    let mut heads = Vec::new();
    for start in pending {
        // Unvisited nodes only point at unvisited nodes, so the walk ends in a cycle
        let mut trail = HashSet::new();
        let mut cursor = start;
        while trail.insert(cursor.id()) {
            match index.get(&cursor.parent_id()) {
                Some(parent) => cursor = *parent,
                None => break,
            }
        }

        let mut members = vec![cursor];
        let mut walker = cursor;
        while let Some(parent) = index.get(&walker.parent_id()) {
            if parent.id() == cursor.id() {
                break;
            }
            members.push(*parent);
            walker = *parent;
        }

        if let Some(head) = members.into_iter().min_by_key(|n| n.sort_key()) {
            if seen_cycles.insert(head.id()) {
                heads.push(head);
            }
        }
    }
    heads.sort_by_key(|n| n.sort_key());
    heads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Node(i64, i64, i64);

    impl TreeItem for Node {
        fn id(&self) -> i64 {
            self.0
        }
        fn parent_id(&self) -> i64 {
            self.1
        }
        fn order(&self) -> i64 {
            self.2
        }
    }

    #[derive(Debug, PartialEq)]
    struct Out {
        id: i64,
        children: Vec<Out>,
    }

    fn build(nodes: &[Node], anchor: i64) -> Vec<Out> {
        build_tree(nodes, anchor, |n, children| Out { id: n.0, children })
    }

    fn ids(tree: &[Out]) -> Vec<i64> {
        fn walk(out: &[Out], acc: &mut Vec<i64>) {
            for o in out {
                acc.push(o.id);
                walk(&o.children, acc);
            }
        }
        let mut acc = Vec::new();
        walk(tree, &mut acc);
        acc
    }

    #[test]
    fn test_sibling_order_then_id() {
        let nodes = [Node(3, 0, 1), Node(1, 0, 2), Node(2, 0, 1)];
        let tree = build(&nodes, 0);
        assert_eq!(tree.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn test_nested() {
        let nodes = [Node(1, 0, 1), Node(2, 1, 1), Node(3, 2, 1)];
        let tree = build(&nodes, 0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].children[0].id, 3);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let nodes = [Node(1, 0, 5), Node(2, 999, 1)];
        let tree = build(&nodes, 0);
        assert_eq!(tree.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_anchor_without_children_is_empty() {
        let nodes = [Node(1, 0, 1)];
        assert!(build(&nodes, 42).is_empty());
        assert!(build(&[], 0).is_empty());
    }

    #[test]
    fn test_subtree_anchor() {
        let nodes = [Node(1, 0, 1), Node(2, 1, 2), Node(3, 1, 1), Node(4, 0, 1)];
        let tree = build(&nodes, 1);
        assert_eq!(ids(&tree), vec![3, 2]);
    }

    #[test]
    fn test_cycle_is_promoted_once() {
        // 2 <-> 3 cycle, 4 hangs below 3
        let nodes = [Node(1, 0, 1), Node(2, 3, 7), Node(3, 2, 5), Node(4, 3, 1)];
        let tree = build(&nodes, 0);

        let mut all = ids(&tree);
        assert_eq!(all.len(), 4);
        all.sort();
        assert_eq!(all, vec![1, 2, 3, 4]);

        // Broken at the smallest-order member
        assert_eq!(tree[1].id, 3);
    }

    #[test]
    fn test_self_parent_terminates() {
        let nodes = [Node(5, 5, 1)];
        let tree = build(&nodes, 0);
        assert_eq!(ids(&tree), vec![5]);
    }

    #[test]
    fn test_input_order_independent() {
        let a = [Node(1, 0, 2), Node(2, 1, 1), Node(3, 1, 1), Node(4, 0, 1), Node(5, 9, 0)];
        let mut b = a.to_vec();
        b.reverse();
        assert_eq!(build(&a, 0), build(&b, 0));
    }

    #[test]
    fn test_idempotent() {
        let nodes = [Node(1, 0, 2), Node(2, 1, 1), Node(3, 0, 1)];
        assert_eq!(build(&nodes, 0), build(&nodes, 0));
    }
}

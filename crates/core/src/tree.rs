//! The partial in-memory tree and the path-keyed merge.
//!
//! Only a fraction of the remote store is ever held locally: nodes appear in
//! the tree once a shallow or deep fetch has returned them, and children that
//! are known to exist but have not been fetched are held as [`Node::Lazy`]
//! placeholders. A placeholder is an explicit variant, not a sentinel value,
//! so it can never collide with real user data.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::path::TreePath;

/// One node of the partial tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A fetched value with no addressable children (scalars and arrays).
    Leaf(Value),
    /// An object with per-key children, each independently mergeable.
    Branch(BTreeMap<String, Node>),
    /// Known to exist from a shallow fetch, not fetched yet.
    Lazy,
}

/// A merge was requested at a path the current view cannot address.
#[derive(Debug, Error, PartialEq)]
pub enum MergeError {
    #[error("fetched path {target} is outside the displayed root {root}")]
    OutsideRoot { root: TreePath, target: TreePath },
}

impl Node {
    /// Empty branch, the initial state of a freshly opened view.
    pub fn empty() -> Self {
        Node::Branch(BTreeMap::new())
    }

    /// Build a node from a full (deep) fetch result.
    ///
    /// Objects become branches, recursively; everything else is a leaf.
    pub fn from_deep(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Branch(
                map.into_iter()
                    .map(|(key, child)| (key, Node::from_deep(child)))
                    .collect(),
            ),
            other => Node::Leaf(other),
        }
    }

    /// Build a node from a shallow fetch result.
    ///
    /// The store reports one level: object-valued children as the literal
    /// `true`, leaf children as their value. A `true` child therefore becomes
    /// a [`Node::Lazy`] placeholder awaiting an explicit deep fetch; a
    /// non-object result means the fetched path itself is a leaf.
    pub fn from_shallow(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Branch(
                map.into_iter()
                    .map(|(key, child)| {
                        let node = match child {
                            Value::Bool(true) => Node::Lazy,
                            other => Node::Leaf(other),
                        };
                        (key, node)
                    })
                    .collect(),
            ),
            other => Node::Leaf(other),
        }
    }

    /// Child map, if this node is a branch.
    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Branch(map) => Some(map),
            _ => None,
        }
    }

    /// Node at a relative segment chain below `self`.
    pub fn at(&self, segments: &[String]) -> Option<&Node> {
        let mut current = self;
        for segment in segments {
            current = current.children()?.get(segment)?;
        }
        Some(current)
    }

    /// Splice `fetched` into the tree at `target`, relative to the displayed
    /// `root`.
    ///
    /// A fetch at the root replaces the whole tree. A fetch below the root
    /// walks the relative segments, creating empty branches for segments not
    /// seen yet, and assigns at the final one; siblings of the walked chain
    /// are never touched, so a late lazy-expand result cannot clobber data a
    /// newer poll already refreshed elsewhere. Stale non-branch nodes along
    /// the chain are replaced, the fetched result being the fresher fact.
    pub fn merge(&mut self, root: &TreePath, target: &TreePath, fetched: Node) -> Result<(), MergeError> {
        let Some(relative) = target.relative_to(root) else {
            return Err(MergeError::OutsideRoot {
                root: root.clone(),
                target: target.clone(),
            });
        };
        let Some((last, intermediate)) = relative.split_last() else {
            *self = fetched;
            return Ok(());
        };

        let mut current = self;
        for segment in intermediate {
            current = current
                .make_branch()
                .entry(segment.clone())
                .or_insert_with(Node::empty);
        }
        current.make_branch().insert(last.clone(), fetched);
        Ok(())
    }

    fn make_branch(&mut self) -> &mut BTreeMap<String, Node> {
        if !matches!(self, Node::Branch(_)) {
            *self = Node::empty();
        }
        match self {
            Node::Branch(map) => map,
            _ => unreachable!("just replaced with a branch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(raw: &str) -> TreePath {
        TreePath::parse(raw)
    }

    #[test]
    fn from_shallow_demotes_unexpanded_children() {
        let node = Node::from_shallow(json!({"a": true, "b": 5}));
        assert_eq!(
            node,
            Node::Branch(BTreeMap::from([
                ("a".to_string(), Node::Lazy),
                ("b".to_string(), Node::Leaf(json!(5))),
            ]))
        );
    }

    #[test]
    fn from_shallow_keeps_leaf_results() {
        assert_eq!(Node::from_shallow(json!("hello")), Node::Leaf(json!("hello")));
        assert_eq!(Node::from_shallow(json!(false)), Node::Leaf(json!(false)));
    }

    #[test]
    fn from_deep_recurses_into_objects() {
        let node = Node::from_deep(json!({"users": {"alice": {"age": 30}}, "count": 2}));
        let alice = node.at(&["users".into(), "alice".into()]).unwrap();
        assert_eq!(
            alice.at(&["age".into()]),
            Some(&Node::Leaf(json!(30)))
        );
        assert_eq!(node.at(&["count".into()]), Some(&Node::Leaf(json!(2))));
    }

    #[test]
    fn merge_at_root_replaces_tree() {
        let mut tree = Node::from_deep(json!({"old": 1}));
        let root = path("/users");
        tree.merge(&root, &root, Node::from_deep(json!({"new": 2}))).unwrap();
        assert_eq!(tree, Node::from_deep(json!({"new": 2})));
    }

    #[test]
    fn merge_below_root_leaves_siblings_untouched() {
        let mut tree = Node::from_shallow(json!({"a": true, "b": 5, "c": "x"}));
        let root = TreePath::root();
        tree.merge(&root, &path("/a"), Node::from_deep(json!({"inner": 1})))
            .unwrap();
        assert_eq!(tree.at(&["b".into()]), Some(&Node::Leaf(json!(5))));
        assert_eq!(tree.at(&["c".into()]), Some(&Node::Leaf(json!("x"))));
        assert_eq!(
            tree.at(&["a".into(), "inner".into()]),
            Some(&Node::Leaf(json!(1)))
        );
    }

    #[test]
    fn merge_creates_missing_intermediates() {
        let mut tree = Node::empty();
        tree.merge(&TreePath::root(), &path("/a/b/c"), Node::Leaf(json!(7)))
            .unwrap();
        assert_eq!(
            tree.at(&["a".into(), "b".into(), "c".into()]),
            Some(&Node::Leaf(json!(7)))
        );
        assert_eq!(tree.at(&["a".into()]).and_then(Node::children).map(BTreeMap::len), Some(1));
    }

    #[test]
    fn merge_replaces_stale_leaf_on_the_chain() {
        let mut tree = Node::from_shallow(json!({"a": 1}));
        tree.merge(&TreePath::root(), &path("/a/b"), Node::Leaf(json!(2)))
            .unwrap();
        assert_eq!(tree.at(&["a".into(), "b".into()]), Some(&Node::Leaf(json!(2))));
    }

    #[test]
    fn merge_is_relative_to_the_displayed_root() {
        let mut tree = Node::empty();
        let root = path("/users/alice");
        tree.merge(&root, &path("/users/alice/age"), Node::Leaf(json!(30)))
            .unwrap();
        // keyed by the relative chain, not the absolute one
        assert_eq!(tree.at(&["age".into()]), Some(&Node::Leaf(json!(30))));
    }

    #[test]
    fn merge_outside_root_is_rejected() {
        let mut tree = Node::from_deep(json!({"kept": true}));
        let err = tree
            .merge(&path("/users/alice"), &path("/users"), Node::empty())
            .unwrap_err();
        assert!(matches!(err, MergeError::OutsideRoot { .. }));
        // the tree is untouched on rejection
        assert_eq!(tree, Node::from_deep(json!({"kept": true})));
    }
}

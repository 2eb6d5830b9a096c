//! Typed paths into the remote JSON tree.
//!
//! A [`TreePath`] is an ordered sequence of non-empty segments. All tree
//! addressing goes through this type instead of raw strings, so trailing
//! slashes, duplicate slashes and the root case are handled in exactly one
//! place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Absolute path to a node in the remote store.
///
/// The root path has no segments and renders as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// The store root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a URL-style path.
    ///
    /// Empty segments (leading/trailing/duplicate slashes) are dropped, and a
    /// `.json` data suffix on the final segment is stripped, so `/a//b.json/`
    /// parses to the same path as `/a/b`.
    pub fn parse(raw: &str) -> Self {
        let mut segments: Vec<String> = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(last) = segments.last_mut() {
            if let Some(stripped) = last.strip_suffix(".json") {
                if stripped.is_empty() {
                    segments.pop();
                } else {
                    *last = stripped.to_string();
                }
            }
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Child path one segment below `self`.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Parent path. The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Segments leading from `ancestor` down to `self`.
    ///
    /// Returns `None` when `self` is not `ancestor` or a descendant of it;
    /// an empty slice means the paths are equal.
    pub fn relative_to<'a>(&'a self, ancestor: &TreePath) -> Option<&'a [String]> {
        self.segments.strip_prefix(ancestor.segments.as_slice())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_slashes_and_suffix() {
        assert_eq!(TreePath::parse("/"), TreePath::root());
        assert_eq!(TreePath::parse(""), TreePath::root());
        assert_eq!(TreePath::parse("/.json"), TreePath::root());
        assert_eq!(TreePath::parse("/a/b"), TreePath::parse("a//b/"));
        assert_eq!(TreePath::parse("/a/b.json"), TreePath::parse("/a/b"));
        assert_eq!(TreePath::parse("/users/alice").to_string(), "/users/alice");
        assert_eq!(TreePath::root().to_string(), "/");
    }

    #[test]
    fn join_and_parent() {
        let path = TreePath::parse("/a/b");
        assert_eq!(path.join("c"), TreePath::parse("/a/b/c"));
        assert_eq!(path.parent(), TreePath::parse("/a"));
        assert_eq!(TreePath::root().parent(), TreePath::root());
    }

    #[test]
    fn relative_to_descendants_only() {
        let root = TreePath::parse("/a");
        let deep = TreePath::parse("/a/b/c");
        assert_eq!(
            deep.relative_to(&root),
            Some(&["b".to_string(), "c".to_string()][..])
        );
        assert_eq!(root.relative_to(&root), Some(&[][..]));
        assert_eq!(deep.relative_to(&TreePath::root()).unwrap().len(), 3);
        // /a/bc is not under /a/b even though the string is a prefix
        assert_eq!(
            TreePath::parse("/a/bc").relative_to(&TreePath::parse("/a/b")),
            None
        );
        assert_eq!(root.relative_to(&deep), None);
    }
}

//! Directory tree of discovered packages
//!
//! Nodes carry directory paths only. Each node owns its children and the
//! tree is always walked root-to-leaf, so no parent links are kept.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirNode {
    pub path: PathBuf,
    pub children: Vec<DirNode>,
}

impl DirNode {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            children: Vec::new(),
        }
    }

    /// Strict ancestry: a node is not its own ancestor.
    fn is_ancestor_of(&self, path: &Path) -> bool {
        path != self.path && path.starts_with(&self.path)
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Path>) {
        out.push(&self.path);
        for child in &self.children {
            child.collect(out);
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        writeln!(f, "{}{}", "-".repeat(level * 2), self.path.display())?;
        for child in &self.children {
            child.fmt_indented(f, level + 1)?;
        }
        Ok(())
    }
}

/// Tree of package directories rooted at the scan's starting directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirTree {
    root: DirNode,
}

impl DirTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: DirNode::new(root.into()),
        }
    }

    pub fn root(&self) -> &DirNode {
        &self.root
    }

    /// Insert `path` under its deepest existing strict ancestor.
    ///
    /// Existing children of that ancestor which lie below `path` are moved
    /// under the new node, so the result does not depend on insertion order.
    /// Inserting a path that is already present is a no-op. Returns the
    /// node's depth in edges from the root.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> usize {
        let path = path.into();
        if path == self.root.path {
            return 0;
        }

        let mut node = &mut self.root;
        let mut depth = 0;
        loop {
            if node.children.iter().any(|c| c.path == path) {
                return depth + 1;
            }
            match node.children.iter().position(|c| c.is_ancestor_of(&path)) {
                Some(i) => {
                    node = &mut node.children[i];
                    depth += 1;
                }
                None => break,
            }
        }

        let mut new_node = DirNode::new(path);
        let (adopted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut node.children)
            .into_iter()
            .partition(|c| new_node.is_ancestor_of(&c.path));
        new_node.children = adopted;
        node.children = kept;
        node.children.push(new_node);
        depth + 1
    }

    /// Depth of the deepest node that is a strict ancestor of `path`.
    ///
    /// The root counts as the fallback ancestor, so this is 0 when nothing
    /// deeper encloses `path`.
    pub fn ancestor_depth(&self, path: &Path) -> usize {
        let mut node = &self.root;
        let mut depth = 0;
        while let Some(child) = node.children.iter().find(|c| c.is_ancestor_of(path)) {
            node = child;
            depth += 1;
        }
        depth
    }

    /// Distance in edges from the root to the node for `path`.
    pub fn depth(&self, path: &Path) -> Option<usize> {
        if path == self.root.path {
            return Some(0);
        }
        let mut node = &self.root;
        let mut depth = 0;
        loop {
            depth += 1;
            if node.children.iter().any(|c| c.path == path) {
                return Some(depth);
            }
            node = node.children.iter().find(|c| c.is_ancestor_of(path))?;
        }
    }

    /// All node paths in pre-order, root first.
    pub fn paths(&self) -> Vec<&Path> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.paths().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

impl fmt::Display for DirTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt_indented(f, 1)
    }
}

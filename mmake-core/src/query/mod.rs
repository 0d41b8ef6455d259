//! Package index over a workspace, rebuilt on every `update`

mod completion;
mod scan;

pub use completion::ResolvedPrefix;

use crate::build_file::BuildFile;
use crate::label::ROOT_LABEL;
use crate::tree::DirTree;
use crate::workspace::Workspace;
use crate::MmakeError;

/// Discovered build files plus the directory tree built over them.
///
/// Scoped to an optional starting prefix: `update` scans from the prefix's
/// parent directory instead of the whole workspace, which keeps completion
/// fast on large trees.
pub struct Query<'w> {
    ws: &'w Workspace,
    update_prefix: String,
    files: Vec<BuildFile>,
    tree: DirTree,
}

impl<'w> Query<'w> {
    pub fn new(ws: &'w Workspace, update_prefix: impl Into<String>) -> Self {
        Self {
            ws,
            update_prefix: update_prefix.into(),
            files: Vec::new(),
            tree: DirTree::new(ws.root()),
        }
    }

    /// Build an index from already parsed files, without touching the disk.
    pub fn from_files(ws: &'w Workspace, files: Vec<BuildFile>) -> Self {
        let mut tree = DirTree::new(ws.root());
        for file in &files {
            tree.insert(file.dir().to_path_buf());
        }
        Self {
            ws,
            update_prefix: String::new(),
            files,
            tree,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        self.ws
    }

    /// Build files in discovery order
    pub fn files(&self) -> &[BuildFile] {
        &self.files
    }

    pub fn tree(&self) -> &DirTree {
        &self.tree
    }

    pub fn file_by_label(&self, label: &str) -> Option<&BuildFile> {
        self.files.iter().find(|f| f.label.as_str() == label)
    }

    /// Build files whose package path starts with `prefix`.
    ///
    /// The root prefix `//` returns only the root package's file.
    pub fn query_files_by_prefix(&self, prefix: &str) -> crate::Result<Vec<&BuildFile>> {
        if prefix.is_empty() {
            return Err(MmakeError::invalid_query(prefix, "prefix required"));
        }
        let rel = prefix
            .strip_prefix(ROOT_LABEL)
            .ok_or_else(|| MmakeError::invalid_query(prefix, "prefix must start with //"))?;

        if rel.is_empty() {
            return Ok(self.file_by_label(ROOT_LABEL).into_iter().collect());
        }

        Ok(self
            .files
            .iter()
            .filter(|f| !f.label.is_root() && f.label.rel_path().starts_with(rel))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::label::Label;
    use std::path::Path;

    pub(crate) const ROOT: &str = "/test/workspace";

    pub(crate) fn workspace() -> Workspace {
        Workspace::new(ROOT, Config::default()).unwrap()
    }

    /// In-memory build file with the given targets
    pub(crate) fn file(label: &str, targets: &[&str]) -> BuildFile {
        let label: Label = label.parse().unwrap();
        let text: String = targets.iter().map(|t| format!("{t}:\n")).collect();
        BuildFile::from_text(label.dir_in(Path::new(ROOT)).join("Makefile"), label, &text)
    }

    #[test]
    fn test_query_files_by_prefix() {
        let ws = workspace();
        let query = Query::from_files(
            &ws,
            vec![
                file("//", &["all"]),
                file("//pkg/mmake", &["build"]),
                file("//pkg/ffake", &["build"]),
            ],
        );

        let labels = |prefix: &str| -> Vec<String> {
            query
                .query_files_by_prefix(prefix)
                .unwrap()
                .iter()
                .map(|f| f.label.to_string())
                .collect()
        };

        assert_eq!(labels("//"), vec!["//"]);
        assert_eq!(labels("//pkg/mmak"), vec!["//pkg/mmake"]);
        assert_eq!(labels("//pkg/"), vec!["//pkg/mmake", "//pkg/ffake"]);
        assert!(labels("//nothing").is_empty());
        assert!(query.query_files_by_prefix("").is_err());
        assert!(query.query_files_by_prefix("pkg").is_err());
    }

    #[test]
    fn test_from_files_builds_tree() {
        let ws = workspace();
        let query = Query::from_files(
            &ws,
            vec![
                file("//", &[]),
                file("//pkg/mmake", &[]),
                file("//pkg/mmake/mmake2", &[]),
            ],
        );
        let tree = query.tree();
        assert_eq!(tree.len(), 3);
        assert_eq!(
            tree.depth(&Path::new(ROOT).join("pkg/mmake/mmake2")),
            Some(2)
        );
        assert!(query.file_by_label("//pkg/mmake").is_some());
        assert!(query.file_by_label("//pkg").is_none());
    }
}

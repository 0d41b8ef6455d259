//! Depth-bounded discovery of build files

use super::Query;
use crate::build_file::{is_build_file, BuildFile};
use crate::cancel::CancellationToken;
use crate::label::{ROOT_LABEL, TARGET_SEPARATOR};
use crate::tree::DirTree;
use std::path::PathBuf;

impl Query<'_> {
    /// Rescan the workspace and rebuild the index from scratch.
    ///
    /// `depth` bounds how many package levels below the scan start are
    /// discovered: a directory is not entered once its nearest package
    /// ancestor is already `depth` edges from the root. `0` scans everything.
    pub fn update(&mut self, cancel: &CancellationToken, depth: usize) -> crate::Result<()> {
        self.files.clear();
        let start = self.scan_start();
        self.tree = DirTree::new(&start);

        let mut walker = self.ws.walk(&start);
        while let Some(entry) = walker.next() {
            cancel.check()?;
            let entry = entry?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if self.ws.is_ignored(&entry) {
                    walker.skip_current_dir();
                } else if depth > 0 && self.tree.ancestor_depth(path) + 1 > depth {
                    tracing::trace!(dir = %path.display(), depth, "depth bound reached");
                    walker.skip_current_dir();
                }
                continue;
            }

            if !is_build_file(path) {
                continue;
            }
            // One build file per package; the first by name wins
            let dir = path.parent().map(PathBuf::from).unwrap_or_default();
            if self.files.last().is_some_and(|f| f.dir() == dir) {
                continue;
            }

            let file = BuildFile::parse(path, self.ws.root())?;
            tracing::debug!(label = %file.label, targets = file.targets.len(), "discovered");
            self.tree.insert(dir);
            self.files.push(file);
        }

        Ok(())
    }

    /// Directory the scan starts from: the parent of the prefix's package
    /// path, or the workspace root.
    ///
    /// Falls back to the nearest existing ancestor when the prefix names a
    /// directory that does not exist.
    fn scan_start(&self) -> PathBuf {
        let root = self.ws.root();
        let Some(rel) = self.update_prefix.strip_prefix(ROOT_LABEL) else {
            return root.to_path_buf();
        };
        let rel = rel.split(TARGET_SEPARATOR).next().unwrap_or("");
        let parent = match rel.rfind('/') {
            Some(i) => &rel[..i],
            None => "",
        };

        let mut start = root.to_path_buf();
        for segment in parent.split('/').filter(|s| !s.is_empty()) {
            if matches!(segment, "." | "..") {
                return root.to_path_buf();
            }
            let next = start.join(segment);
            if !next.is_dir() {
                tracing::warn!(prefix = %self.update_prefix, "scan start does not exist");
                break;
            }
            start = next;
        }
        start
    }
}

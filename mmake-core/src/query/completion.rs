//! Shell completion of partial labels
//!
//! A prefix containing `:` completes target names of one package. Any other
//! prefix completes package labels and directories. Directories are emitted
//! with a trailing `/` to signal "descend to find a label".

use super::Query;
use crate::label::{Label, ROOT_LABEL, TARGET_SEPARATOR};
use crate::MmakeError;
use std::collections::HashSet;

/// How a completion prefix is interpreted, decided once on entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPrefix<'a> {
    /// `//pkg/mmake:te`: complete target names of `//pkg/mmake`
    Target { label: &'a str, fragment: &'a str },
    /// The prefix is exactly the label of a known package
    ExactLabel(Label),
    /// A partial path; `rel` is the prefix without its leading `//`
    DirectoryPrefix { rel: &'a str },
}

impl Query<'_> {
    /// Classify `prefix`. Malformed prefixes are rejected here.
    pub fn resolve_prefix<'p>(&self, prefix: &'p str) -> crate::Result<ResolvedPrefix<'p>> {
        if prefix.is_empty() {
            return Err(MmakeError::invalid_query(prefix, "prefix required"));
        }
        if prefix.contains(TARGET_SEPARATOR) && prefix.len() < 3 {
            return Err(MmakeError::invalid_query(
                prefix,
                "target prefix must be at least 3 characters",
            ));
        }
        let Some(rel) = prefix.strip_prefix(ROOT_LABEL) else {
            return Err(MmakeError::invalid_query(prefix, "prefix must start with //"));
        };

        if let Some((label, fragment)) = prefix.split_once(TARGET_SEPARATOR) {
            if fragment.contains(TARGET_SEPARATOR) {
                return Err(MmakeError::invalid_query(
                    prefix,
                    "prefix may contain at most one ':'",
                ));
            }
            return Ok(ResolvedPrefix::Target { label, fragment });
        }

        match self.file_by_label(prefix) {
            Some(file) => Ok(ResolvedPrefix::ExactLabel(file.label.clone())),
            None => Ok(ResolvedPrefix::DirectoryPrefix { rel }),
        }
    }

    /// Completions for `prefix`, one per line, each terminated by `\n`.
    pub fn gen_comp(&self, prefix: &str) -> crate::Result<String> {
        Ok(self
            .completions(prefix)?
            .into_iter()
            .map(|c| c + "\n")
            .collect())
    }

    /// Ordered, deduplicated completions for `prefix`.
    ///
    /// Completing an exact label also lists its targets, after the paths.
    pub fn completions(&self, prefix: &str) -> crate::Result<Vec<String>> {
        match self.resolve_prefix(prefix)? {
            ResolvedPrefix::Target { label, fragment } => self.complete_targets(label, fragment),
            ResolvedPrefix::ExactLabel(label) => {
                let mut out = self.complete_label(&label);
                out.extend(self.complete_targets(label.as_str(), "")?);
                Ok(out)
            }
            ResolvedPrefix::DirectoryPrefix { rel } => Ok(self.complete_directory(rel)),
        }
    }

    /// Path completions only, without the targets of an exact label.
    pub fn complete_paths(&self, prefix: &str) -> crate::Result<Vec<String>> {
        match self.resolve_prefix(prefix)? {
            ResolvedPrefix::Target { .. } => Err(MmakeError::invalid_query(
                prefix,
                "prefix names a target, not a path",
            )),
            ResolvedPrefix::ExactLabel(label) => Ok(self.complete_label(&label)),
            ResolvedPrefix::DirectoryPrefix { rel } => Ok(self.complete_directory(rel)),
        }
    }

    /// `<label>:<target>` for each target starting with `fragment`, in file
    /// order, repeated definitions included.
    fn complete_targets(&self, label: &str, fragment: &str) -> crate::Result<Vec<String>> {
        let file = self
            .file_by_label(label)
            .ok_or_else(|| MmakeError::invalid_query(label, "no file found for prefix"))?;

        Ok(file
            .targets
            .iter()
            .filter(|t| t.starts_with(fragment))
            .map(|t| file.label.with_target(t))
            .collect())
    }

    /// The label itself, its siblings whose names extend it, and the way to
    /// descend below it.
    ///
    /// Below a regular package that is the package path with a trailing
    /// `/`. The root cannot be spelled that way, so its first level of
    /// labels and directories is listed instead.
    fn complete_label(&self, label: &Label) -> Vec<String> {
        let mut out = vec![label.to_string()];
        if label.is_root() {
            out.extend(self.level_entries("", ""));
        } else {
            let rel = label.rel_path();
            let base = match rel.rfind('/') {
                Some(i) => &rel[..=i],
                None => "",
            };
            out.extend(self.level_entries(base, label.name()));

            let below = format!("{}/", label.rel_path());
            if self
                .files
                .iter()
                .any(|f| f.label.rel_path().starts_with(&below))
            {
                out.push(format!("{label}/"));
            }
        }
        sort_dedup(out)
    }

    /// Complete a partial path one segment at a time.
    ///
    /// When the only candidate is a directory there is nothing to choose,
    /// so completion descends into it and lists the next level instead.
    fn complete_directory(&self, rel: &str) -> Vec<String> {
        let (mut base, mut fragment) = match rel.rfind('/') {
            Some(i) => (rel[..=i].to_string(), &rel[i + 1..]),
            None => (String::new(), rel),
        };

        loop {
            let entries = self.level_entries(&base, fragment);
            match entries.as_slice() {
                [only] if only.ends_with('/') => {
                    base = only[ROOT_LABEL.len()..].to_string();
                    fragment = "";
                }
                _ => return entries,
            }
        }
    }

    /// Entries one segment below `base` (empty or ending in `/`) whose name
    /// starts with `fragment`.
    ///
    /// A package at that level is listed as its label. A directory that only
    /// leads to deeper packages is listed with a trailing `/`.
    fn level_entries(&self, base: &str, fragment: &str) -> Vec<String> {
        let labels: HashSet<&str> = self.files.iter().map(|f| f.label.rel_path()).collect();

        let mut out = Vec::new();
        for file in &self.files {
            let Some(rest) = file.label.rel_path().strip_prefix(base) else {
                continue;
            };
            if rest.is_empty() || !rest.starts_with(fragment) {
                continue;
            }
            let segment = rest.split('/').next().unwrap_or(rest);
            let next = format!("{base}{segment}");
            if segment == rest {
                out.push(format!("{ROOT_LABEL}{next}"));
            } else if !labels.contains(next.as_str()) {
                out.push(format!("{ROOT_LABEL}{next}/"));
            }
        }
        sort_dedup(out)
    }
}

/// Shorter completions first, then lexical; exact duplicates removed.
fn sort_dedup(mut completions: Vec<String>) -> Vec<String> {
    completions.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    completions.dedup();
    completions
}

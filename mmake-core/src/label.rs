//! Label grammar: `//<path>` and `//<path>:<target>`
//!
//! A label names a package directory relative to the workspace root and,
//! optionally, a target inside that package's Makefile. The root package is
//! `//`. Without a `:` the target defaults to the last path segment, so
//! `//pkg/mmake` addresses `//pkg/mmake:mmake`.

use crate::MmakeError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Label of the workspace root package
pub const ROOT_LABEL: &str = "//";

/// Separator between the package path and the target name
pub const TARGET_SEPARATOR: char = ':';

/// A package label such as `//` or `//pkg/mmake` (never carries a target)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    pub fn root() -> Self {
        Self(ROOT_LABEL.to_string())
    }

    /// Build a label from a workspace-relative path (`""` is the root).
    pub fn from_rel_path(rel: &str) -> crate::Result<Self> {
        let rel = rel.trim_end_matches('/');
        validate_path(rel).map_err(|reason| MmakeError::invalid_label(rel, reason))?;
        Ok(Self(format!("{ROOT_LABEL}{rel}")))
    }

    /// Derive the label of a package directory under `root`.
    ///
    /// OS separators are normalized to `/`.
    pub fn from_dir(root: &Path, dir: &Path) -> crate::Result<Self> {
        let rel = dir.strip_prefix(root).map_err(|_| {
            MmakeError::invalid_label(
                &dir.display().to_string(),
                format!("not inside workspace {}", root.display()),
            )
        })?;
        let segments: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(Self(format!("{ROOT_LABEL}{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_LABEL
    }

    /// Path relative to the workspace root, without the leading `//`
    pub fn rel_path(&self) -> &str {
        &self.0[ROOT_LABEL.len()..]
    }

    /// Absolute package directory under `root`
    pub fn dir_in(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |p, s| p.join(s))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.rel_path().split('/').filter(|s| !s.is_empty())
    }

    /// Number of path segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Last path segment, empty for the root.
    pub fn name(&self) -> &str {
        self.segments().last().unwrap_or("")
    }

    /// Format `<label>:<target>`
    pub fn with_target(&self, target: &str) -> String {
        format!("{}{}{}", self.0, TARGET_SEPARATOR, target)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl TryFrom<String> for Label {
    type Error = MmakeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Label {
    type Err = MmakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rel = strip_root(s)?;
        if rel.contains(TARGET_SEPARATOR) {
            return Err(MmakeError::invalid_label(
                s,
                "package labels cannot name a target",
            ));
        }
        Self::from_rel_path(rel).map_err(|_| MmakeError::invalid_label(s, "invalid path segment"))
    }
}

/// A fully parsed `//path[:target]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub package: Label,
    /// Target name; empty only for a bare root label (make's default goal).
    pub target: String,
    /// Whether the target was spelled out after a `:`
    pub explicit: bool,
}

impl TargetRef {
    pub fn parse(label: &str) -> crate::Result<Self> {
        let rest = strip_root(label)?;
        let (path, target) = match rest.split_once(TARGET_SEPARATOR) {
            Some((path, target)) => {
                if target.contains(TARGET_SEPARATOR) {
                    return Err(MmakeError::invalid_label(
                        label,
                        "a label may contain at most one ':'",
                    ));
                }
                (path, Some(target))
            }
            None => (rest, None),
        };

        let package = Label::from_rel_path(path)
            .map_err(|_| MmakeError::invalid_label(label, "invalid path segment"))?;
        let explicit = target.is_some();
        let target = match target {
            Some(t) => t.to_string(),
            None => package.name().to_string(),
        };

        Ok(Self {
            package,
            target,
            explicit,
        })
    }

    /// Relative package path, e.g. `pkg/mmake`
    pub fn rel_path(&self) -> &str {
        self.package.rel_path()
    }
}

impl FromStr for TargetRef {
    type Err = MmakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.explicit {
            write!(f, "{}", self.package.with_target(&self.target))
        } else {
            write!(f, "{}", self.package)
        }
    }
}

/// Split a label into `(relative_path, target_name)`.
pub fn parse_target(label: &str) -> crate::Result<(String, String)> {
    let parsed = TargetRef::parse(label)?;
    Ok((parsed.rel_path().to_string(), parsed.target))
}

fn strip_root(label: &str) -> crate::Result<&str> {
    label
        .strip_prefix(ROOT_LABEL)
        .ok_or_else(|| MmakeError::invalid_label(label, "labels must start with //"))
}

fn validate_path(rel: &str) -> Result<(), &'static str> {
    if rel.is_empty() {
        return Ok(());
    }
    for segment in rel.split('/') {
        match segment {
            "" => return Err("empty path segment"),
            "." | ".." => return Err("relative path segments are not allowed"),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_with_colon() {
        let (path, target) = parse_target("//a/b:c").unwrap();
        assert_eq!(path, "a/b");
        assert_eq!(target, "c");
    }

    #[test]
    fn test_parse_target_defaults_to_last_segment() {
        let (path, target) = parse_target("//pkg/mmake").unwrap();
        assert_eq!(path, "pkg/mmake");
        assert_eq!(target, "mmake");
    }

    #[test]
    fn test_root_label() {
        let parsed = TargetRef::parse("//").unwrap();
        assert!(parsed.package.is_root());
        assert_eq!(parsed.rel_path(), "");
        assert_eq!(parsed.target, "");
        assert!(!parsed.explicit);

        let parsed = TargetRef::parse("//:build").unwrap();
        assert!(parsed.package.is_root());
        assert_eq!(parsed.target, "build");
        assert_eq!(parsed.to_string(), "//:build");
    }

    #[test]
    fn test_rejects_malformed_labels() {
        for bad in ["", "/", "pkg/mmake", "/pkg", "//a:b:c", "//a//b", "//a/../b"] {
            let err = TargetRef::parse(bad).unwrap_err();
            assert!(err.is_malformed_input(), "{bad:?} should be malformed");
        }
    }

    #[test]
    fn test_package_label_from_dir() {
        let root = Path::new("/test/workspace");
        assert_eq!(Label::from_dir(root, root).unwrap().as_str(), "//");
        let label = Label::from_dir(root, &root.join("pkg").join("mmake")).unwrap();
        assert_eq!(label.as_str(), "//pkg/mmake");
        assert_eq!(label.depth(), 2);
        assert_eq!(label.name(), "mmake");
        assert_eq!(label.dir_in(root), root.join("pkg/mmake"));
        assert!(Label::from_dir(root, Path::new("/elsewhere")).is_err());
    }

    #[test]
    fn test_label_from_str() {
        let label: Label = "//pkg/".parse().unwrap();
        assert_eq!(label.as_str(), "//pkg");
        assert!("//pkg:build".parse::<Label>().is_err());
        assert_eq!(Label::root().with_target("all"), "//:all");
    }
}

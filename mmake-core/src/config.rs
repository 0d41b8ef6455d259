//! Configuration for mmake
//!
//! The workspace marker file `WORKSPACE.mmake` is also the configuration
//! file. An empty marker is valid and yields the defaults.

use crate::MmakeError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the workspace marker file
pub const WORKSPACE_FILE: &str = "WORKSPACE.mmake";

/// Directories never walked unless the config says otherwise
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    "build-out",
    "vendor",
    "node_modules",
    "__pycache__",
    "__snapshots__",
    "__tests__",
    "__mocks__",
    "__fixtures__",
];

/// Default configuration written by `mmake init`
pub const DEFAULT_CONFIG: &str = r#"# mmake workspace
#
# This file marks the workspace root. Labels such as //pkg/api:build are
# resolved relative to the directory containing it.

[workspace]
# Build output root; mirrors the source tree, one directory per package
out_dir = "build-out"

[ignore]
# Directory names (or globs on the name) that are never scanned
dirs = [
    ".git",
    "build-out",
    "vendor",
    "node_modules",
    "__pycache__",
    "__snapshots__",
    "__tests__",
    "__mocks__",
    "__fixtures__",
]

[completion]
# Package levels scanned below the completion prefix (0 = unlimited)
depth = 2

[make]
# Program invoked to run targets
program = "make"
"#;

/// mmake configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub make: MakeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_dirs")]
    pub dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_depth")]
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeConfig {
    #[serde(default = "default_program")]
    pub program: String,
}

fn default_out_dir() -> String {
    "build-out".to_string()
}
fn default_ignore_dirs() -> Vec<String> {
    DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect()
}
fn default_depth() -> usize {
    2
}
fn default_program() -> String {
    "make".to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            dirs: default_ignore_dirs(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
        }
    }
}

impl Default for MakeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

impl Config {
    /// Load config from the workspace marker file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| MmakeError::ConfigParse(e.to_string()))
    }

    /// Matcher for directory names that are never walked.
    ///
    /// The output directory is always included.
    pub fn ignore_matcher(&self) -> crate::Result<IgnoreMatcher> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self
            .ignore
            .dirs
            .iter()
            .chain(std::iter::once(&self.workspace.out_dir))
        {
            let glob = Glob::new(pattern).map_err(|e| MmakeError::GlobPattern(e.to_string()))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| MmakeError::GlobPattern(e.to_string()))?;
        Ok(IgnoreMatcher { set })
    }
}

/// Matches directory base names against the ignore list
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.set.is_match(dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.workspace.out_dir, "build-out");
        assert_eq!(config.completion.depth, 2);
        assert_eq!(config.make.program, "make");
        assert_eq!(config.ignore.dirs, default_ignore_dirs());
    }

    #[test]
    fn test_empty_marker_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.workspace.out_dir, "build-out");
        assert_eq!(config.ignore.dirs.len(), DEFAULT_IGNORE_DIRS.len());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[workspace\nout_dir = 1").unwrap_err();
        assert!(matches!(err, MmakeError::ConfigParse(_)));
    }

    #[test]
    fn test_ignore_matcher() {
        let config = Config::from_toml(
            "[workspace]\nout_dir = \"out\"\n[ignore]\ndirs = [\".git\", \"*.cache\"]\n",
        )
        .unwrap();
        let matcher = config.ignore_matcher().unwrap();
        assert!(matcher.is_ignored(".git"));
        assert!(matcher.is_ignored("out"));
        assert!(matcher.is_ignored("bazel.cache"));
        assert!(!matcher.is_ignored("pkg"));
        assert!(!matcher.is_ignored("node_modules"));
    }
}

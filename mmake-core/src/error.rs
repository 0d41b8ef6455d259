//! Error types for mmake operations

use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum MmakeError {
    #[error("No WORKSPACE.mmake file found in {} or any parent directory", .start.display())]
    NoWorkspace { start: PathBuf },

    #[error("No Makefile found for {label}")]
    NoBuildFile { label: String },

    #[error("Target not found: {target} in {label}")]
    TargetNotFound { label: String, target: String },

    #[error("Invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    #[error("Invalid query {query:?}: {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("Target {target} already exists in {label}")]
    TargetExists { label: String, target: String },

    #[error("Workspace already exists at {}", .0.display())]
    ConfigExists(PathBuf),

    #[error("{program} exited with {status}")]
    Command { program: String, status: ExitStatus },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to parse build file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Glob pattern error: {0}")]
    GlobPattern(String),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MmakeError {
    pub(crate) fn invalid_label(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_query(query: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query: query.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the failure came from the delegated build tool.
    ///
    /// The tool has already printed its own diagnostics, so callers should
    /// exit without adding more.
    pub fn is_delegated_failure(&self) -> bool {
        matches!(self, Self::Command { .. })
    }

    /// True for malformed labels and completion prefixes.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::InvalidLabel { .. } | Self::InvalidQuery { .. })
    }

    /// True for the "nothing matched" family: no workspace, no build file,
    /// no package, no target.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoWorkspace { .. }
                | Self::NoBuildFile { .. }
                | Self::TargetNotFound { .. }
        )
    }
}

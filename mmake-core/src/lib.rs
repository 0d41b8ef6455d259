//! mmake Core - Labels, package index and completion for Makefile workspaces
//!
//! A workspace is a directory tree holding a `WORKSPACE.mmake` marker at its
//! root and any number of Makefiles below it. Each directory with a Makefile
//! is a package, addressed by a label such as `//pkg/api:build`.

pub mod build_file;
pub mod cancel;
pub mod config;
pub mod error;
pub mod label;
pub mod query;
pub mod recipe;
pub mod resolve;
pub mod run;
pub mod tree;
pub mod workspace;

pub use build_file::{is_build_file, BuildFile};
pub use cancel::CancellationToken;
pub use config::{Config, WORKSPACE_FILE};
pub use error::MmakeError;
pub use label::{parse_target, Label, TargetRef, ROOT_LABEL};
pub use query::{Query, ResolvedPrefix};
pub use resolve::ResolvedTarget;
pub use run::split_import_args;
pub use tree::{DirNode, DirTree};
pub use workspace::{find_workspace_file, Workspace};

/// Result type alias for mmake operations
pub type Result<T> = std::result::Result<T, MmakeError>;

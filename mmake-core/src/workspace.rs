//! Workspace discovery and output-directory bookkeeping

use crate::build_file::BuildFile;
use crate::cancel::CancellationToken;
use crate::config::{Config, IgnoreMatcher, DEFAULT_CONFIG, WORKSPACE_FILE};
use crate::label::TargetRef;
use crate::MmakeError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Absolute path to the workspace marker file
pub const ENV_ROOT: &str = "MM_ROOT";
/// Absolute path to the package directory being built
pub const ENV_PATH: &str = "MM_PATH";
/// Absolute path to the shared build-output root
pub const ENV_OUT_ROOT: &str = "MM_OUT_ROOT";
/// Absolute path to this package's build-output directory
pub const ENV_OUT_PATH: &str = "MM_OUT_PATH";

/// Find `WORKSPACE.mmake` in `start` or the nearest ancestor directory.
///
/// An empty `start` means the current directory. A path that already names
/// the marker file is returned as is.
pub fn find_workspace_file(cancel: &CancellationToken, start: &Path) -> crate::Result<PathBuf> {
    if start.file_name().is_some_and(|name| name == WORKSPACE_FILE) {
        return Ok(start.to_path_buf());
    }

    let start = if start.as_os_str().is_empty() {
        std::env::current_dir()?
    } else {
        start.canonicalize()?
    };
    let mut dir = if start.is_file() {
        start.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        start.clone()
    };

    loop {
        cancel.check()?;
        let candidate = dir.join(WORKSPACE_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "found workspace");
            return Ok(candidate);
        }
        if !dir.pop() {
            return Err(MmakeError::NoWorkspace { start });
        }
    }
}

/// A workspace rooted at the directory holding `WORKSPACE.mmake`
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
    ignore: IgnoreMatcher,
}

impl Workspace {
    /// Create a workspace marker with the default config in `dir`.
    pub fn init(dir: &Path) -> crate::Result<PathBuf> {
        let marker = dir.join(WORKSPACE_FILE);
        if marker.exists() {
            return Err(MmakeError::ConfigExists(marker));
        }
        fs::write(&marker, DEFAULT_CONFIG)?;
        Ok(marker)
    }

    /// Locate the marker from `start` and open the workspace it defines.
    pub fn discover(cancel: &CancellationToken, start: &Path) -> crate::Result<Self> {
        let marker = find_workspace_file(cancel, start)?;
        Self::open(&marker)
    }

    /// Open the workspace defined by the marker file at `marker`.
    ///
    /// The root is always absolute and canonical, whatever form `marker`
    /// was given in.
    pub fn open(marker: &Path) -> crate::Result<Self> {
        let config = Config::load(marker)?;
        let root = match marker.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.canonicalize()?,
            _ => std::env::current_dir()?.canonicalize()?,
        };
        Self::new(root, config)
    }

    pub fn new(root: impl Into<PathBuf>, config: Config) -> crate::Result<Self> {
        let ignore = config.ignore_matcher()?;
        Ok(Self {
            root: root.into(),
            config,
            ignore,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(WORKSPACE_FILE)
    }

    /// Root of the build-output tree
    pub fn out_root(&self) -> PathBuf {
        self.root.join(&self.config.workspace.out_dir)
    }

    /// Create the build-output root if it does not exist yet.
    pub fn init_output_dir(&self) -> crate::Result<()> {
        fs::create_dir_all(self.out_root())?;
        Ok(())
    }

    /// Environment for a delegated build of `build_file`.
    ///
    /// Creates the package's output directory on demand.
    pub fn env_for(&self, build_file: &BuildFile) -> crate::Result<Vec<(&'static str, PathBuf)>> {
        let out_path = build_file.label.dir_in(&self.out_root());
        fs::create_dir_all(&out_path)?;

        Ok(vec![
            (ENV_ROOT, self.marker_path()),
            (ENV_PATH, build_file.label.dir_in(&self.root)),
            (ENV_OUT_ROOT, self.out_root()),
            (ENV_OUT_PATH, out_path),
        ])
    }

    /// Remove a package's build-output directory. Returns the path removed.
    pub fn clean(&self, label: &str) -> crate::Result<PathBuf> {
        let target = TargetRef::parse(label)?;
        let out_path = target.package.dir_in(&self.out_root());
        if out_path.exists() {
            fs::remove_dir_all(&out_path)?;
            tracing::info!(path = %out_path.display(), "cleaned");
        }
        Ok(out_path)
    }

    /// Pre-order walk from `start`: files before directories, then by name.
    pub(crate) fn walk(&self, start: &Path) -> walkdir::IntoIter {
        WalkDir::new(start)
            .follow_links(false)
            .sort_by(|a, b| {
                let a_dir = a.file_type().is_dir();
                let b_dir = b.file_type().is_dir();
                a_dir
                    .cmp(&b_dir)
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
    }

    /// Whether a walked directory is on the ignore list.
    ///
    /// The walk's own starting directory is never ignored.
    pub(crate) fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .ignore
                .is_ignored(&entry.file_name().to_string_lossy())
    }
}

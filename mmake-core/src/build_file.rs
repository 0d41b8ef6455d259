//! Build files: Makefiles that define a package

use crate::label::Label;
use crate::recipe;
use crate::MmakeError;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Marks the first line of a build file as its description
const DESCRIPTION_MARKER: u8 = b'#';

/// A parsed build file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFile {
    /// Absolute path to the Makefile
    pub path: PathBuf,
    pub label: Label,
    /// Target names in file order
    pub targets: Vec<String>,
    /// First line of the file when it is a comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BuildFile {
    /// Read and parse the build file at `path`, labelled relative to `root`.
    pub fn parse(path: &Path, root: &Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| MmakeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or(root);
        let label = Label::from_dir(root, dir)?;
        Ok(Self::from_text(path.to_path_buf(), label, &text))
    }

    /// Build a record from already loaded text.
    pub fn from_text(path: PathBuf, label: Label, text: &str) -> Self {
        Self {
            path,
            label,
            targets: recipe::parse_targets(text),
            description: description(text),
        }
    }

    /// Directory containing the build file
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    pub fn has_target(&self, name: &str) -> bool {
        self.targets.iter().any(|t| t == name)
    }

    /// Append a new target whose recipe body is `command`.
    ///
    /// Fails with `TargetExists` if the name is already defined.
    pub fn append_target(&mut self, name: &str, command: &str) -> crate::Result<()> {
        if self.has_target(name) {
            return Err(MmakeError::TargetExists {
                label: self.label.to_string(),
                target: name.to_string(),
            });
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        file.write_all(recipe::render_target(name, command).as_bytes())?;
        self.targets.push(name.to_string());
        Ok(())
    }
}

/// Whether a file name denotes a build file (`makefile`, `Makefile`,
/// `rules.makefile`, `GNUMakefile`, ...).
pub fn is_build_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name.ends_with("makefile") || name.ends_with("Makefile")
        })
        .unwrap_or(false)
}

fn description(text: &str) -> Option<String> {
    if text.as_bytes().first() != Some(&DESCRIPTION_MARKER) {
        return None;
    }
    let line = text.split('\n').next().unwrap_or(text);
    Some(line.trim_end_matches('\r').to_string())
}

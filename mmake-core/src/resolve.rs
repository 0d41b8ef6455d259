//! Target resolution: map a label to the Makefile that governs it

use crate::build_file::{is_build_file, BuildFile};
use crate::cancel::CancellationToken;
use crate::label::TargetRef;
use crate::recipe;
use crate::workspace::Workspace;
use crate::MmakeError;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Shown by `info` for a target without recipe lines
pub const EMPTY_BODY: &str = "no target body";

/// A label resolved to a concrete build file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    /// Absolute path of the governing Makefile
    pub build_file: PathBuf,
    /// Target to run; empty means the Makefile's default goal
    pub target: String,
}

impl Workspace {
    /// Resolve `label` to `(build_file, target)`.
    ///
    /// The package directory is walked depth-first and the first build file
    /// found wins. A directory's own Makefile is always seen before those of
    /// its subdirectories.
    pub fn resolve(&self, cancel: &CancellationToken, label: &str) -> crate::Result<ResolvedTarget> {
        let target_ref = TargetRef::parse(label)?;
        let dir = target_ref.package.dir_in(self.root());
        let not_found = || MmakeError::NoBuildFile {
            label: target_ref.package.to_string(),
        };

        if !dir.is_dir() {
            return Err(not_found());
        }

        let mut walker = self.walk(&dir);
        while let Some(entry) = walker.next() {
            cancel.check()?;
            let entry = entry?;
            if entry.file_type().is_dir() {
                if self.is_ignored(&entry) {
                    walker.skip_current_dir();
                }
                continue;
            }
            if is_build_file(entry.path()) {
                let build_file = entry.path().canonicalize()?;
                tracing::debug!(%label, path = %build_file.display(), "resolved");
                return Ok(ResolvedTarget {
                    build_file,
                    target: target_ref.target,
                });
            }
        }

        Err(not_found())
    }

    /// Resolve and parse the build file governing `label`.
    pub fn build_file_for(&self, cancel: &CancellationToken, label: &str) -> crate::Result<BuildFile> {
        let resolved = self.resolve(cancel, label)?;
        BuildFile::parse(&resolved.build_file, self.root())
    }

    /// Describe a target by its recipe body.
    ///
    /// When the body opens with comment lines only that comment block is
    /// returned. A bare root label describes the Makefile's first target.
    pub fn info(&self, cancel: &CancellationToken, label: &str) -> crate::Result<String> {
        let resolved = self.resolve(cancel, label)?;
        let text = fs::read_to_string(&resolved.build_file).map_err(|source| MmakeError::Parse {
            path: resolved.build_file.clone(),
            source,
        })?;

        let name = if resolved.target.is_empty() {
            recipe::parse_targets(&text).into_iter().next().unwrap_or_default()
        } else {
            resolved.target
        };

        let target = recipe::target_body(&name, &text).ok_or_else(|| MmakeError::TargetNotFound {
            label: label.to_string(),
            target: name.clone(),
        })?;

        Ok(describe_body(&target.body))
    }
}

fn describe_body(body: &str) -> String {
    let lines: Vec<&str> = body
        .lines()
        .map(|l| l.strip_prefix('\t').unwrap_or(l))
        .collect();

    match lines.first() {
        None => EMPTY_BODY.to_string(),
        Some(first) if first.trim_start().starts_with('#') => lines
            .iter()
            .take_while(|l| l.trim_start().starts_with('#'))
            .copied()
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => lines.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn workspace(files: &[(&str, &str)]) -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        for (path, content) in files {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let ws = Workspace::new(root, Config::default()).unwrap();
        (dir, ws)
    }

    #[test]
    fn test_resolve_package_makefile() {
        let (_dir, ws) = workspace(&[
            ("Makefile", "all:\n"),
            ("pkg/mmake/Makefile", "build:\n"),
            ("pkg/mmake/a/Makefile", "build:\n"),
        ]);
        let cancel = CancellationToken::noop();

        let resolved = ws.resolve(&cancel, "//pkg/mmake:build").unwrap();
        assert_eq!(resolved.build_file, ws.root().join("pkg/mmake/Makefile"));
        assert_eq!(resolved.target, "build");

        let resolved = ws.resolve(&cancel, "//pkg/mmake").unwrap();
        assert_eq!(resolved.target, "mmake");

        let resolved = ws.resolve(&cancel, "//").unwrap();
        assert_eq!(resolved.build_file, ws.root().join("Makefile"));
        assert_eq!(resolved.target, "");
    }

    #[test]
    fn test_resolve_descends_to_first_build_file() {
        let (_dir, ws) = workspace(&[("pkg/b/Makefile", "b:\n"), ("pkg/a/x/Makefile", "x:\n")]);
        let cancel = CancellationToken::noop();
        let resolved = ws.resolve(&cancel, "//pkg:x").unwrap();
        assert_eq!(resolved.build_file, ws.root().join("pkg/a/x/Makefile"));
    }

    #[test]
    fn test_resolve_skips_ignored_dirs() {
        let (_dir, ws) = workspace(&[("pkg/node_modules/Makefile", "x:\n")]);
        let cancel = CancellationToken::noop();
        let err = ws.resolve(&cancel, "//pkg").unwrap_err();
        assert!(matches!(err, MmakeError::NoBuildFile { .. }));
    }

    #[test]
    fn test_resolve_errors_are_distinct() {
        let (_dir, ws) = workspace(&[("pkg/README.md", "")]);
        let cancel = CancellationToken::noop();

        assert!(matches!(
            ws.resolve(&cancel, "//pkg:build"),
            Err(MmakeError::NoBuildFile { .. })
        ));
        assert!(matches!(
            ws.resolve(&cancel, "//missing:build"),
            Err(MmakeError::NoBuildFile { .. })
        ));
        assert!(ws.resolve(&cancel, "pkg:build").unwrap_err().is_malformed_input());

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        assert!(matches!(
            ws.resolve(&cancelled, "//pkg"),
            Err(MmakeError::Cancelled)
        ));
    }

    #[test]
    fn test_info() {
        let (_dir, ws) = workspace(&[(
            "svc/Makefile",
            "serve:\n\t# Starts the server\n\t# on port 8080\n\t./serve --port 8080\n\
             build:\n\tgo build\n\tgo vet\n\
             empty:\n",
        )]);
        let cancel = CancellationToken::noop();

        assert_eq!(
            ws.info(&cancel, "//svc:serve").unwrap(),
            "# Starts the server\n# on port 8080"
        );
        assert_eq!(ws.info(&cancel, "//svc:build").unwrap(), "go build\ngo vet");
        assert_eq!(ws.info(&cancel, "//svc:empty").unwrap(), EMPTY_BODY);
        assert!(matches!(
            ws.info(&cancel, "//svc:nope"),
            Err(MmakeError::TargetNotFound { .. })
        ));
    }
}

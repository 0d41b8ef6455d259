//! Delegating targets to make, and importing commands as new targets

use crate::build_file::BuildFile;
use crate::cancel::CancellationToken;
use crate::label::TargetRef;
use crate::workspace::Workspace;
use crate::MmakeError;
use std::fs;
use std::process::Command;
use std::time::Duration;

/// Separates the label from a command to import
pub const IMPORT_SEPARATOR: &str = "--";

/// File name used for build files created by an import
pub const DEFAULT_BUILD_FILE: &str = "Makefile";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Split CLI arguments at the first `--`.
///
/// Returns the arguments before the separator and, when present, the
/// remainder joined with spaces as the command to import.
pub fn split_import_args(args: &[String]) -> (Vec<String>, Option<String>) {
    match args.iter().position(|a| a == IMPORT_SEPARATOR) {
        Some(i) => (args[..i].to_vec(), Some(args[i + 1..].join(" "))),
        None => (args.to_vec(), None),
    }
}

impl Workspace {
    /// Run a target through the configured make program.
    ///
    /// Stdio is inherited. The child is killed if `cancel` fires while it
    /// runs. A non-zero exit becomes `MmakeError::Command`.
    pub fn run_target(&self, cancel: &CancellationToken, label: &str) -> crate::Result<()> {
        let resolved = self.resolve(cancel, label)?;
        let build_file = BuildFile::parse(&resolved.build_file, self.root())?;
        let env = self.env_for(&build_file)?;
        let program = &self.config().make.program;

        let mut cmd = Command::new(program);
        cmd.arg("-f").arg(&resolved.build_file);
        if !resolved.target.is_empty() {
            cmd.arg(&resolved.target);
        }
        cmd.envs(env);

        tracing::info!(
            %label,
            makefile = %resolved.build_file.display(),
            target = %resolved.target,
            "running"
        );

        let mut child = cmd.spawn()?;
        let status = loop {
            if cancel.is_cancelled() {
                if let Err(e) = child.kill() {
                    tracing::warn!(pid = child.id(), error = %e, "failed to kill build");
                }
                let _ = child.wait();
                return Err(MmakeError::Cancelled);
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(MmakeError::Command {
                program: program.clone(),
                status,
            });
        }
        Ok(())
    }

    /// Record `command` as a new target for `label` and run it.
    ///
    /// The package's Makefile (and its directory) is created when missing.
    /// Fails with `TargetExists` if the target is already defined.
    pub fn import(
        &self,
        cancel: &CancellationToken,
        label: &str,
        command: &str,
    ) -> crate::Result<()> {
        let target = TargetRef::parse(label)?;
        if target.target.is_empty() {
            return Err(MmakeError::invalid_label(
                label,
                "import needs a target name",
            ));
        }
        if command.trim().is_empty() {
            return Err(MmakeError::invalid_label(
                label,
                format!("no command given after {IMPORT_SEPARATOR}"),
            ));
        }

        let mut build_file = match self.resolve(cancel, label) {
            Ok(resolved) => BuildFile::parse(&resolved.build_file, self.root())?,
            Err(MmakeError::NoBuildFile { .. }) => {
                let dir = target.package.dir_in(self.root());
                fs::create_dir_all(&dir)?;
                tracing::info!(dir = %dir.display(), "creating build file");
                BuildFile::from_text(dir.join(DEFAULT_BUILD_FILE), target.package.clone(), "")
            }
            Err(e) => return Err(e),
        };

        build_file.append_target(&target.target, command)?;
        self.run_target(cancel, label)
    }
}

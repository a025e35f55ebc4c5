//! Fake downstream programs.
//!
//! Each fake is a POSIX shell script that appends its arguments to a record
//! file, one per line followed by an end marker, then exits with a fixed code.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const END_MARKER: &str = "--end-of-invocation--";

/// Executable stand-in for a processing program.
#[derive(Debug, Clone)]
pub struct FakeProgram {
    path: PathBuf,
    record: PathBuf,
}

impl FakeProgram {
    /// Install a script at `root/relative` that exits with `exit_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the script or its parent directories cannot be written.
    pub fn install(root: &Path, relative: &str, exit_code: u8) -> Result<Self> {
        let path = root.join(relative);
        let parent = path
            .parent()
            .with_context(|| format!("program path {} has no parent", path.display()))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
        let record = path.with_extension("calls");
        let script = format!(
            "#!/bin/sh\nfor arg in \"$@\"; do printf '%s\\n' \"$arg\" >> '{record}'; done\nprintf '%s\\n' '{END_MARKER}' >> '{record}'\nexit {exit_code}\n",
            record = record.display(),
        );
        fs::write(&path, script).with_context(|| format!("failed to write {}", path.display()))?;
        make_executable(&path)?;
        Ok(Self { path, record })
    }

    /// Location of the script.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Argument vectors of every invocation so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the record file exists but cannot be read.
    pub fn invocations(&self) -> Result<Vec<Vec<String>>> {
        if !self.record.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.record)
            .with_context(|| format!("failed to read {}", self.record.display()))?;
        let mut calls = Vec::new();
        let mut current = Vec::new();
        for line in text.lines() {
            if line == END_MARKER {
                calls.push(std::mem::take(&mut current));
            } else {
                current.push(line.to_string());
            }
        }
        Ok(calls)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn install_creates_parent_directories() -> Result<()> {
        let temp = TempDir::new()?;
        let program = FakeProgram::install(temp.path(), "transforms/transform_file", 0)?;
        assert!(program.path().is_file());
        assert!(program.invocations()?.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn invocations_are_recorded_per_call() -> Result<()> {
        let temp = TempDir::new()?;
        let program = FakeProgram::install(temp.path(), "bin/fake", 3)?;
        let status = std::process::Command::new(program.path())
            .args(["-n", "acme corp", "-f", "a.csv"])
            .status()?;
        assert_eq!(status.code(), Some(3));
        std::process::Command::new(program.path()).status()?;

        let calls = program.invocations()?;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ["-n", "acme corp", "-f", "a.csv"]);
        assert!(calls[1].is_empty());
        Ok(())
    }
}

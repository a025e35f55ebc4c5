//! Scratch directory layouts for dispatcher tests.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dropzone_config::{DispatcherConfig, SettlePolicy};
use tempfile::TempDir;

use crate::programs::FakeProgram;

/// Temporary `incoming/`, `programs/`, and `archive/` layout.
#[derive(Debug)]
pub struct Workspace {
    _temp: TempDir,
    root: PathBuf,
    watch_dir: PathBuf,
    programs_root: PathBuf,
}

impl Workspace {
    /// Create an empty layout under the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn new() -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("dropzone-")
            .tempdir()
            .context("failed to create temp dir")?;
        let root = temp
            .path()
            .canonicalize()
            .context("failed to canonicalize temp dir")?;
        let watch_dir = root.join("incoming");
        let programs_root = root.join("programs");
        fs::create_dir_all(&watch_dir).context("failed to create watch dir")?;
        fs::create_dir_all(&programs_root).context("failed to create programs root")?;
        Ok(Self {
            _temp: temp,
            root,
            watch_dir,
            programs_root,
        })
    }

    /// Directory the dispatcher watches.
    #[must_use]
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    /// Directory failed files are archived into.
    #[must_use]
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    /// Dispatcher configuration pointing at this layout, with no settling delay.
    #[must_use]
    pub fn config(&self) -> DispatcherConfig {
        DispatcherConfig {
            watch_dir: self.watch_dir.clone(),
            programs_root: self.programs_root.clone(),
            settle: SettlePolicy::Fixed { delay_ms: 0 },
            ..DispatcherConfig::default()
        }
    }

    /// Install a fake program at `relative` under the programs root.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be written.
    pub fn program(&self, relative: &str, exit_code: u8) -> Result<FakeProgram> {
        FakeProgram::install(&self.programs_root, relative, exit_code)
    }

    /// Write `contents` to `name` inside the watch directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn drop_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.watch_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Names currently present in the watch directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub fn incoming(&self) -> Result<Vec<String>> {
        list(&self.watch_dir)
    }

    /// Names currently present in the archive directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn archived(&self) -> Result<Vec<String>> {
        let archive = self.archive_dir();
        if !archive.exists() {
            return Ok(Vec::new());
        }
        list(&archive)
    }
}

fn list(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Poll `check` every few milliseconds until it returns `true` or `timeout` elapses.
///
/// # Errors
///
/// Returns an error if the condition never holds or `check` fails.
pub async fn wait_for<F, Fut>(timeout: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await? {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            bail!("condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_and_config_agree() -> Result<()> {
        let workspace = Workspace::new()?;
        let config = workspace.config();
        assert_eq!(config.watch_dir, workspace.watch_dir());
        assert_eq!(
            config.archive_dir_for(workspace.watch_dir()),
            workspace.archive_dir()
        );
        workspace.drop_file("a.csv", b"x")?;
        assert_eq!(workspace.incoming()?, ["a.csv"]);
        assert!(workspace.archived()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn wait_for_reports_timeouts() {
        let result = wait_for(Duration::from_millis(30), || async { Ok(false) }).await;
        assert!(result.is_err());
    }
}

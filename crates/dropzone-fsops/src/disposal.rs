//! Post-processing disposal of dispatched files.
//!
//! # Design
//! - Successful files are deleted; failed files move into the archive directory
//!   under their own name, replacing any earlier file of that name.
//! - A file that is already gone is a no-op, not an error.
//! - Archive moves fall back to copy then remove when a rename cannot cross
//!   filesystems.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FsOpsError, FsOpsResult};
use crate::paths::file_in;

/// What disposal did with a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum Disposal {
    /// The file was no longer present.
    Missing,
    /// The file was deleted after a successful cycle.
    Deleted,
    /// The file was moved to the contained path after a failed cycle.
    Archived(PathBuf),
}

impl Disposal {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Deleted => "deleted",
            Self::Archived(_) => "archived",
        }
    }
}

/// Delete or archive `filename` in `directory` according to `failed`.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] when `filename` is not a plain file
/// name and [`FsOpsError::Io`] when the file cannot be removed, the archive
/// directory cannot be created, or the move fails.
pub fn dispose(
    filename: &str,
    failed: bool,
    directory: &Path,
    archive_dir: &Path,
) -> FsOpsResult<Disposal> {
    let path = file_in(directory, filename, "filename")?;
    match fs::symlink_metadata(&path) {
        Ok(metadata) if metadata.is_dir() => {
            return Err(FsOpsError::InvalidInput {
                field: "filename",
                reason: "is_directory",
                value: Some(filename.to_string()),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(file = %path.display(), "file already gone; nothing to dispose");
            return Ok(Disposal::Missing);
        }
        Err(err) => return Err(FsOpsError::io("dispose.inspect", &path, err)),
    }

    if !failed {
        return match fs::remove_file(&path) {
            Ok(()) => {
                info!(file = %path.display(), "deleted processed file");
                Ok(Disposal::Deleted)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Disposal::Missing),
            Err(err) => Err(FsOpsError::io("dispose.remove", &path, err)),
        };
    }

    fs::create_dir_all(archive_dir)
        .map_err(|err| FsOpsError::io("dispose.create_archive", archive_dir, err))?;
    let destination = archive_dir.join(filename);
    match move_file(&path, &destination) {
        Ok(()) => {
            info!(
                file = %path.display(),
                archive = %destination.display(),
                "archived failed file"
            );
            Ok(Disposal::Archived(destination))
        }
        Err(err) if err.io_kind() == Some(io::ErrorKind::NotFound) && !path.exists() => {
            Ok(Disposal::Missing)
        }
        Err(err) => Err(err),
    }
}

fn move_file(source: &Path, destination: &Path) -> FsOpsResult<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(FsOpsError::io("dispose.move", source, err))
        }
        Err(_rename_err) => {
            fs::copy(source, destination)
                .map_err(|err| FsOpsError::io("dispose.copy", destination, err))?;
            fs::remove_file(source).map_err(|err| FsOpsError::io("dispose.cleanup", source, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Layout {
        _temp: TempDir,
        watch: PathBuf,
        archive: PathBuf,
    }

    fn layout() -> anyhow::Result<Layout> {
        let temp = TempDir::new()?;
        let watch = temp.path().join("incoming");
        fs::create_dir_all(&watch)?;
        let archive = temp.path().join("archive");
        Ok(Layout {
            _temp: temp,
            watch,
            archive,
        })
    }

    #[test]
    fn success_deletes_the_file() -> anyhow::Result<()> {
        let layout = layout()?;
        fs::write(layout.watch.join("a.csv"), b"x")?;
        let outcome = dispose("a.csv", false, &layout.watch, &layout.archive)?;
        assert_eq!(outcome, Disposal::Deleted);
        assert!(!layout.watch.join("a.csv").exists());
        assert!(!layout.archive.exists());
        Ok(())
    }

    #[test]
    fn failure_archives_under_the_same_name() -> anyhow::Result<()> {
        let layout = layout()?;
        fs::write(layout.watch.join("B47001_02_201702_47001.pdf"), b"pdf")?;
        let outcome = dispose(
            "B47001_02_201702_47001.pdf",
            true,
            &layout.watch,
            &layout.archive,
        )?;
        let archived = layout.archive.join("B47001_02_201702_47001.pdf");
        assert_eq!(outcome, Disposal::Archived(archived.clone()));
        assert_eq!(fs::read(archived)?, b"pdf");
        assert!(!layout.watch.join("B47001_02_201702_47001.pdf").exists());
        Ok(())
    }

    #[test]
    fn missing_file_is_a_noop_either_way() -> anyhow::Result<()> {
        let layout = layout()?;
        for failed in [false, true] {
            assert_eq!(
                dispose("gone.csv", failed, &layout.watch, &layout.archive)?,
                Disposal::Missing
            );
        }
        assert!(!layout.archive.exists());
        Ok(())
    }

    #[test]
    fn archive_creation_is_idempotent_and_replaces_collisions() -> anyhow::Result<()> {
        let layout = layout()?;
        fs::create_dir_all(&layout.archive)?;
        fs::write(layout.archive.join("a.csv"), b"old")?;
        fs::write(layout.watch.join("a.csv"), b"new")?;

        dispose("a.csv", true, &layout.watch, &layout.archive)?;
        assert_eq!(fs::read(layout.archive.join("a.csv"))?, b"new");
        Ok(())
    }

    #[test]
    fn directories_are_never_disposed() -> anyhow::Result<()> {
        let layout = layout()?;
        fs::create_dir_all(layout.watch.join("nested"))?;
        let result = dispose("nested", false, &layout.watch, &layout.archive);
        assert!(matches!(
            result,
            Err(FsOpsError::InvalidInput {
                reason: "is_directory",
                ..
            })
        ));
        assert!(layout.watch.join("nested").is_dir());
        Ok(())
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Disposal::Missing.as_str(), "missing");
        assert_eq!(Disposal::Deleted.as_str(), "deleted");
        let archived = Disposal::Archived(PathBuf::from("/archive/a.csv"));
        assert_eq!(archived.as_str(), "archived");
    }
}

//! In-place renames to canonical file names.
//!
//! # Design
//! - The file is given time to settle before it is touched.
//! - One attempt only; every failure is logged with its cause and reported as `false`.
//! - An existing destination is never overwritten.
//! - The settle outcome travels with the result; a file whose size was still
//!   changing is renamed anyway and logged as a warning.

use std::io;
use std::path::{Path, PathBuf};

use dropzone_config::SettlePolicy;
use tracing::{info, warn};

use crate::error::{FsOpsError, FsOpsResult};
use crate::paths::file_in;
use crate::settle::{SettleOutcome, settle};

/// A completed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    /// New location of the file.
    pub destination: PathBuf,
    /// How the wait before the rename ended.
    pub settled: SettleOutcome,
}

/// Rename `old_name` to `new_name` inside `directory` after settling.
///
/// Returns `true` when the file now carries `new_name`. Failures are logged,
/// never retried.
pub async fn rename(old_name: &str, new_name: &str, directory: &Path, policy: &SettlePolicy) -> bool {
    match rename_settled(old_name, new_name, directory, policy).await {
        Ok(Renamed {
            destination,
            settled,
        }) => {
            if let SettleOutcome::Unstable { samples } = settled {
                warn!(
                    from = old_name,
                    samples,
                    "renamed while file size was still changing"
                );
            }
            info!(
                from = old_name,
                to = %destination.display(),
                settle = ?settled,
                "renamed file to canonical name"
            );
            true
        }
        Err(err) => {
            warn!(
                error = %err,
                cause = ?err.io_kind(),
                from = old_name,
                to = new_name,
                directory = %directory.display(),
                "rename failed"
            );
            false
        }
    }
}

/// Settle then rename, reporting the cause of any failure.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] when either name is not a plain file
/// name or both names are equal, and [`FsOpsError::Io`] when the source is
/// missing, the destination exists, or the rename itself fails.
pub async fn rename_settled(
    old_name: &str,
    new_name: &str,
    directory: &Path,
    policy: &SettlePolicy,
) -> FsOpsResult<Renamed> {
    let source = file_in(directory, old_name, "old_name")?;
    let destination = file_in(directory, new_name, "new_name")?;
    if source == destination {
        return Err(FsOpsError::InvalidInput {
            field: "new_name",
            reason: "unchanged",
            value: Some(new_name.to_string()),
        });
    }

    let settled = settle(&source, policy).await;

    match tokio::fs::symlink_metadata(&destination).await {
        Ok(_) => {
            return Err(FsOpsError::io(
                "rename.destination_exists",
                &destination,
                io::Error::from(io::ErrorKind::AlreadyExists),
            ));
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(FsOpsError::io("rename.inspect_destination", &destination, err)),
    }

    tokio::fs::rename(&source, &destination)
        .await
        .map_err(|err| FsOpsError::io("rename.move", &source, err))?;
    Ok(Renamed {
        destination,
        settled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const NO_WAIT: SettlePolicy = SettlePolicy::Fixed { delay_ms: 0 };

    #[tokio::test]
    async fn renames_within_directory() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("hlap bills.csv"), b"rows")?;

        assert!(rename("hlap bills.csv", "hlap_bills.csv", temp.path(), &NO_WAIT).await);
        assert!(!temp.path().join("hlap bills.csv").exists());
        assert_eq!(fs::read(temp.path().join("hlap_bills.csv"))?, b"rows");
        Ok(())
    }

    #[tokio::test]
    async fn reports_how_the_file_settled() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("hlap a.csv"), b"rows")?;

        let renamed = rename_settled("hlap a.csv", "hlap_a.csv", temp.path(), &NO_WAIT).await?;
        assert_eq!(renamed.destination, temp.path().join("hlap_a.csv"));
        assert_eq!(renamed.settled, SettleOutcome::Elapsed);
        Ok(())
    }

    #[tokio::test]
    async fn unsettled_file_is_still_renamed() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("hlap b.csv"), b"rows")?;
        let one_sample = SettlePolicy::SizeStable {
            interval_ms: 1,
            attempts: 1,
        };

        let renamed =
            rename_settled("hlap b.csv", "hlap_b.csv", temp.path(), &one_sample).await?;
        assert_eq!(renamed.settled, SettleOutcome::Unstable { samples: 1 });
        assert!(renamed.destination.is_file());

        fs::write(temp.path().join("hlap c.csv"), b"rows")?;
        assert!(rename("hlap c.csv", "hlap_c.csv", temp.path(), &one_sample).await);
        Ok(())
    }

    #[tokio::test]
    async fn missing_source_reports_false() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        assert!(!rename("gone.csv", "gone_.csv", temp.path(), &NO_WAIT).await);

        let err = rename_settled("gone.csv", "gone_.csv", temp.path(), &NO_WAIT)
            .await
            .err();
        assert_eq!(
            err.and_then(|err| err.io_kind()),
            Some(io::ErrorKind::NotFound)
        );
        Ok(())
    }

    #[tokio::test]
    async fn existing_destination_is_left_untouched() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("a b.csv"), b"new")?;
        fs::write(temp.path().join("a_b.csv"), b"old")?;

        let err = rename_settled("a b.csv", "a_b.csv", temp.path(), &NO_WAIT)
            .await
            .err();
        assert_eq!(
            err.and_then(|err| err.io_kind()),
            Some(io::ErrorKind::AlreadyExists)
        );
        assert_eq!(fs::read(temp.path().join("a_b.csv"))?, b"old");
        assert_eq!(fs::read(temp.path().join("a b.csv"))?, b"new");
        Ok(())
    }

    #[tokio::test]
    async fn names_with_separators_are_rejected() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let result = rename_settled("a.csv", "../escape.csv", temp.path(), &NO_WAIT).await;
        assert!(matches!(
            result,
            Err(FsOpsError::InvalidInput {
                field: "new_name",
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn identical_names_are_rejected() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("a.csv"), b"x")?;
        assert!(!rename("a.csv", "a.csv", temp.path(), &NO_WAIT).await);
        Ok(())
    }
}

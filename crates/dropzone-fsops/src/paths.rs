use std::path::{Component, Path, PathBuf};

use crate::error::{FsOpsError, FsOpsResult};

/// Join `name` onto `directory`, rejecting anything but a single plain file name.
pub(super) fn file_in(directory: &Path, name: &str, field: &'static str) -> FsOpsResult<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(directory.join(name)),
        _ => Err(FsOpsError::InvalidInput {
            field,
            reason: "not_a_file_name",
            value: Some(name.to_string()),
        }),
    }
}

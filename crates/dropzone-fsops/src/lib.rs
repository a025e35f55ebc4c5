#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Filesystem side effects of a dispatch cycle: settling, canonical renames,
//! and disposal of processed files.
//!
//! Layout: `settle.rs` (write-completion waits), `rename.rs` (in-place
//! renames), `disposal.rs` (delete or archive), `error.rs`.

pub mod disposal;
pub mod error;
mod paths;
pub mod rename;
pub mod settle;

pub use disposal::{Disposal, dispose};
pub use error::{FsOpsError, FsOpsResult};
pub use rename::{Renamed, rename, rename_settled};
pub use settle::{SettleOutcome, settle};

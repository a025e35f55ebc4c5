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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (scratch watch/program/archive layout), programs.rs (fake
//! downstream programs that record their arguments).

pub mod fixtures;
pub mod programs;

pub use fixtures::{Workspace, wait_for};
pub use programs::FakeProgram;

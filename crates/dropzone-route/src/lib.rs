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

//! Filename classification, program routing, and command construction.
//!
//! Everything in this crate is pure: no filesystem access, no process spawning.
//!
//! Layout: `model.rs` (parsed names, programs, decisions), `classify.rs`
//! (naming convention parser), `rules.rs` (ordered routing table),
//! `command.rs` (argument-vector invocations), `error.rs`.

pub mod classify;
pub mod command;
pub mod error;
pub mod model;
pub mod rules;

pub use classify::{Classifier, canonical_name};
pub use command::{CommandBuilder, Invocation};
pub use error::{RouteError, RouteResult};
pub use model::{DispatchDecision, ParsedFilename, Program};
pub use rules::{ROUTING_RULES, RouteInput, RoutingRule, matching_rule, select_program};

//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Dispatches arriving files to their processing programs.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dropzone",
    about = "Dispatch files to be processed to the appropriate program",
    version
)]
pub struct Cli {
    /// Dispatch this file once and exit instead of watching.
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,
    /// Directory to watch instead of the configured one; with `-f`, where a
    /// bare file name is looked up.
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,
    /// JSON configuration file layered over the built-in defaults.
    #[arg(short = 'c', long = "config", env = "DROPZONE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Dispatch a single file and exit.
    Once(PathBuf),
    /// Watch the configured directory until interrupted.
    Watch,
}

impl Cli {
    /// Run mode selected by the arguments.
    #[must_use]
    pub fn mode(&self) -> RunMode {
        self.file
            .clone()
            .map_or(RunMode::Watch, RunMode::Once)
    }
}

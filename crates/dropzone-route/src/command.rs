//! Argument-vector construction for downstream programs.
//!
//! # Design
//! - Invocations are discrete argument vectors; nothing is ever handed to a shell.
//! - Program locations resolve against a configured root with an optional
//!   interpreter and script extension.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use dropzone_config::DispatcherConfig;

use crate::model::Program;

const FLAG_COMPANY: &str = "-n";
const FLAG_FILE_TYPE: &str = "-t";
const FLAG_FILENAME: &str = "-f";
const FLAG_SOURCE_DIR: &str = "-p";

/// Resolves programs to executable invocations.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    programs_root: PathBuf,
    interpreter: Option<String>,
    extension: Option<String>,
}

impl CommandBuilder {
    /// Builder rooted at `programs_root` that executes scripts directly.
    #[must_use]
    pub fn new(programs_root: impl Into<PathBuf>) -> Self {
        Self {
            programs_root: programs_root.into(),
            interpreter: None,
            extension: None,
        }
    }

    /// Builder configured from the dispatcher configuration.
    #[must_use]
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            programs_root: config.programs_root.clone(),
            interpreter: config.interpreter.clone(),
            extension: config.program_extension.clone(),
        }
    }

    /// Run every program through `interpreter`.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    /// Append `extension` to every program path.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Location of the script implementing `program`.
    #[must_use]
    pub fn program_path(&self, program: Program) -> PathBuf {
        let relative = match &self.extension {
            Some(extension) => format!("{}.{extension}", program.relative_path()),
            None => program.relative_path().to_string(),
        };
        self.programs_root.join(relative)
    }

    /// Invocation processing `filename` with `program`.
    #[must_use]
    pub fn build(
        &self,
        program: Program,
        company_code: &str,
        file_type: &str,
        filename: &str,
        source_dir: &Path,
    ) -> Invocation {
        let script = self.program_path(program);
        let (executable, mut args) = match &self.interpreter {
            Some(interpreter) => (OsString::from(interpreter), vec![script.into_os_string()]),
            None => (script.into_os_string(), Vec::with_capacity(8)),
        };
        args.extend([
            OsString::from(FLAG_COMPANY),
            OsString::from(company_code),
            OsString::from(FLAG_FILE_TYPE),
            OsString::from(file_type),
            OsString::from(FLAG_FILENAME),
            OsString::from(filename),
            OsString::from(FLAG_SOURCE_DIR),
            source_dir.as_os_str().to_os_string(),
        ]);
        Invocation {
            program,
            executable,
            args,
        }
    }
}

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: Program,
    executable: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    /// Program this invocation runs.
    #[must_use]
    pub const fn program(&self) -> Program {
        self.program
    }

    /// First element of the argument vector.
    #[must_use]
    pub fn executable(&self) -> &OsStr {
        &self.executable
    }

    /// Remaining arguments, in order.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Full argument vector including the executable.
    #[must_use]
    pub fn argv(&self) -> Vec<&OsStr> {
        std::iter::once(self.executable.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .collect()
    }

    /// Process builder for this invocation.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arg in self.argv() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            let text = arg.to_string_lossy();
            if text.is_empty() || text.chars().any(char::is_whitespace) {
                write!(f, "{text:?}")?;
            } else {
                f.write_str(&text)?;
            }
        }
        Ok(())
    }
}

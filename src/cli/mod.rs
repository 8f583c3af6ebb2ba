//! CLI support for tickscript
//!
//! Provides programmatic access to the `tickfmt` formatter so other tools
//! can format scripts the same way the command does.

mod format;

pub use format::{execute_format, format_source, FormatOptions, FormatResult, BACKUP_EXT};

use std::io;
use std::path::PathBuf;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parser error
    Parse(crate::ParseError),
    /// JSON encoding error
    Json(crate::JsonError),
    /// IO error
    Io(io::Error),
    /// `-w` was given without any files
    NoFiles,
    /// An error tied to one input file
    File { path: PathBuf, source: Box<CliError> },
}

impl CliError {
    /// Attaches the path of the file being processed.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        CliError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NoFiles => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoFiles => write!(f, "Cannot write source files, none given."),
            CliError::File { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::File { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<crate::JsonError> for CliError {
    fn from(e: crate::JsonError) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

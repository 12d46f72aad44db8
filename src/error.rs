//! Error types for conversion failures
//!
//! The external converter reports problems only through its exit code and
//! free-form stderr text, so [`ConvertError`] keeps the small taxonomy callers
//! can act on (bad input, outdated runtime, anything else) plus the plain I/O
//! failures around the subprocess and its output file.

use std::env::JoinPathsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::depfile::DepParseError;
use crate::failure::FailureKind;

/// Advisory shown when the Java runtime cannot load the converter classes.
pub const RUNTIME_TOO_OLD_MESSAGE: &str = "Your Java runtime is too old (must be 1.8+ to use \
     CoreNLP version 3.5.0 or later and 1.6+ to use CoreNLP version 1.3.1 or later)";

/// Error raised by [`Converter`](crate::Converter) operations
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Tree(s) not in valid Penn Treebank format")]
    MalformedInput,

    #[error("{}", RUNTIME_TOO_OLD_MESSAGE)]
    RuntimeTooOld,

    #[error("Bad exit code from the external converter ({exit_code})")]
    ExternalTool { exit_code: i32 },

    /// A tree was rejected before the converter was started
    #[error("Tree {index} not in valid Penn Treebank format: {message}")]
    InvalidTree { index: usize, message: String },

    #[error("Failed to read converter output {}: {source}", .path.display())]
    ReadOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid classpath entry: {0}")]
    Classpath(#[from] JoinPathsError),

    #[error(transparent)]
    Parse(#[from] DepParseError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConvertError {
    /// The classified converter failure, if this error is one
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ConvertError::MalformedInput | ConvertError::InvalidTree { .. } => {
                Some(FailureKind::MalformedInput)
            }
            ConvertError::RuntimeTooOld => Some(FailureKind::RuntimeTooOld),
            ConvertError::ExternalTool { .. } => Some(FailureKind::ExternalTool),
            _ => None,
        }
    }

    pub fn is_malformed_input(&self) -> bool {
        self.kind() == Some(FailureKind::MalformedInput)
    }

    /// The underlying I/O error for spawn, scratch and output-file failures
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            ConvertError::Io(e) | ConvertError::ReadOutput { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

//! Classification of converter failures from exit code and stderr
//!
//! The converter has no structured error channel. Failures are recognized by
//! marker substrings in stderr, evaluated in table order. The Penn Treebank
//! reader warning wins regardless of exit code; the remaining rules only
//! apply to a non-zero exit.

use bstr::ByteSlice;

use crate::error::ConvertError;

/// The failure categories callers can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The input trees could not be read by the converter
    MalformedInput,
    /// The Java runtime is older than the converter's class files
    RuntimeTooOld,
    /// Any other non-zero exit
    ExternalTool,
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct FailureRule {
    pub marker: &'static str,
    pub needs_nonzero_exit: bool,
    pub kind: FailureKind,
}

/// Marker rules in priority order
pub const FAILURE_RULES: &[FailureRule] = &[
    FailureRule {
        marker: "PennTreeReader: warning:",
        needs_nonzero_exit: false,
        kind: FailureKind::MalformedInput,
    },
    // Oracle wording
    FailureRule {
        marker: "Unsupported major.minor version",
        needs_nonzero_exit: true,
        kind: FailureKind::RuntimeTooOld,
    },
    // IBM wording
    FailureRule {
        marker: "JVMCFRE003 bad major version",
        needs_nonzero_exit: true,
        kind: FailureKind::RuntimeTooOld,
    },
];

/// Classify a finished invocation, or `None` if it succeeded
pub fn classify(exit_code: i32, stderr: impl AsRef<[u8]>) -> Option<FailureKind> {
    let stderr = stderr.as_ref();
    let failed = exit_code != 0;

    FAILURE_RULES
        .iter()
        .filter(|rule| failed || !rule.needs_nonzero_exit)
        .find(|rule| stderr.contains_str(rule.marker))
        .map(|rule| rule.kind)
        .or(failed.then_some(FailureKind::ExternalTool))
}

/// Raise the matching [`ConvertError`] for a failed invocation
pub fn classify_failure(exit_code: i32, stderr: &str) -> Result<(), ConvertError> {
    match classify(exit_code, stderr) {
        None => Ok(()),
        Some(FailureKind::MalformedInput) => Err(ConvertError::MalformedInput),
        Some(FailureKind::RuntimeTooOld) => Err(ConvertError::RuntimeTooOld),
        Some(FailureKind::ExternalTool) => Err(ConvertError::ExternalTool { exit_code }),
    }
}

//! Converter invocation and process execution
//!
//! [`Invocation`] is the command line; [`CommandRunner`] is the seam between
//! building it and running it, so the conversion pipeline can be exercised
//! with a fake runner and no JVM.

use std::ffi::OsString;
#[cfg(test)]
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::ConverterConfig;
use crate::error::ConvertError;

/// Program and arguments for one converter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// `<java> -ea -cp <classpath> <class> -h <head rules> -i <input>`
    pub fn for_input(config: &ConverterConfig, input: &Path) -> Result<Self, ConvertError> {
        let args = vec![
            OsString::from("-ea"),
            OsString::from("-cp"),
            config.classpath_arg()?,
            OsString::from(&config.class_name),
            OsString::from("-h"),
            config.head_rule_path.clone().into_os_string(),
            OsString::from("-i"),
            input.as_os_str().to_os_string(),
        ];

        Ok(Self {
            program: OsString::from(&config.java_command),
            args,
        })
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Exit code with signal termination reported as -1
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an invocation to completion
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

/// Runs invocations as real child processes
///
/// Stdin is closed. Stdout and stderr are drained together while waiting, so
/// a chatty converter cannot block on a full pipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Argument following `flag`, if present
#[cfg(test)]
pub(crate) fn flag_value<'a>(invocation: &'a Invocation, flag: &str) -> Option<&'a OsStr> {
    invocation
        .args
        .iter()
        .position(|arg| arg == flag)
        .and_then(|i| invocation.args.get(i + 1))
        .map(OsString::as_os_str)
}

// # Command Runner Trait
//
// Abstracts spawning an external program so that lexicon invocations can be
// observed and scripted in tests.
//
// ## Implementations
//
// - [`TokioCommandRunner`](crate::process::TokioCommandRunner): real child
//   processes via `tokio::process`
// - Tests: recording doubles in `tests/common`

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// A fully described program invocation
#[derive(Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Program to execute
    pub program: String,
    /// Arguments (may contain credentials)
    pub args: Vec<String>,
    /// Extra environment variables layered over the inherited environment
    pub env: Vec<(String, String)>,
    /// Deadline for the whole run, including output collection
    pub timeout: Duration,
}

impl CommandInvocation {
    /// Create an invocation with no arguments
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            timeout,
        }
    }

    /// Append arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Arguments with credential values replaced, safe to log
    pub fn sanitized_args(&self) -> Vec<String> {
        crate::lexicon::sanitize_args(&self.args)
    }
}

// Arguments carry the auth token, so Debug goes through the sanitizer.
impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("program", &self.program)
            .field("args", &self.sanitized_args())
            .field("env", &self.env)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Captured result of a finished program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Whether the program exited successfully
    pub success: bool,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit code and stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        out.push_str(self.stdout.trim_end());
        if !self.stdout.trim().is_empty() && !self.stderr.trim().is_empty() {
            out.push('\n');
        }
        out.push_str(self.stderr.trim_end());
        out.trim().to_string()
    }
}

/// Trait for running external programs
///
/// # Contract
///
/// - A non-zero exit is **not** an error: it is reported through
///   [`CommandOutput::success`] so callers can attach the output.
/// - Spawn failures return [`Error::Io`](crate::Error::Io).
/// - Exceeding [`CommandInvocation::timeout`] kills the child and returns
///   [`Error::Timeout`](crate::Error::Timeout).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the program to completion
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, crate::Error>;
}

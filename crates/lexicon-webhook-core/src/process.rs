//! Child process execution via `tokio::process`

use crate::error::{Error, Result};
use crate::traits::{CommandInvocation, CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs programs as real child processes
///
/// The child inherits the parent environment plus [`CommandInvocation::env`],
/// gets a null stdin, and is killed if the deadline expires.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    /// Create a new runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Dropping the output future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(invocation.timeout, command.output())
            .await
            .map_err(|_| Error::timeout(invocation.program.clone(), invocation.timeout))??;

        debug!(
            "{} exited with {:?} ({} bytes stdout, {} bytes stderr)",
            invocation.program,
            output.status.code(),
            output.stdout.len(),
            output.stderr.len()
        );

        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

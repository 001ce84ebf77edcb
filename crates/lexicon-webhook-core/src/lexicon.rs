// # lexicon CLI client
//
// Builds and runs `lexicon` invocations through a [`CommandRunner`].
//
// ## Command Shape
//
// ```text
// lexicon <provider> create <zone> TXT --name <n> --content <c> --ttl <t> --auth-token <token>
// lexicon <provider> update <zone> TXT --name <n> --content <c> --ttl <t> --auth-token <token>
// lexicon <provider> delete <zone> TXT --name <n> --content <c> --auth-token <token>
// lexicon <provider> list   <zone> TXT --name <n> --output JSON --auth-token <token>
// ```
//
// ## Security
//
// The token is appended last and every logged argument list goes through
// [`sanitize_args`]. Error messages carry lexicon's output, never the
// argument list.

use crate::config::SolverSettings;
use crate::credentials::Credential;
use crate::error::{Error, Result};
use crate::record::{RecordSpec, TXT};
use crate::traits::{CommandInvocation, CommandOutput, CommandRunner};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Placeholder logged in place of credential values
pub const REDACTED: &str = "<redacted>";

/// Flags whose following argument is a credential
const SENSITIVE_FLAGS: [&str; 3] = ["--auth-token", "--auth-username", "--auth-password"];

/// Replace credential values in an argument list
///
/// Handles both `--auth-token <value>` and `--auth-token=<value>`.
pub fn sanitize_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if SENSITIVE_FLAGS.contains(&arg.as_str()) {
            out.push(arg.clone());
            if iter.next().is_some() {
                out.push(REDACTED.to_string());
            }
            continue;
        }

        match arg.split_once('=') {
            Some((flag, _)) if SENSITIVE_FLAGS.contains(&flag) => {
                out.push(format!("{}={}", flag, REDACTED));
            }
            _ => out.push(arg.clone()),
        }
    }

    out
}

/// One record from `lexicon ... list --output JSON`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LexiconRecord {
    /// Record type
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Record name as the provider reports it (usually fully-qualified)
    #[serde(default)]
    pub name: String,
    /// Record content
    #[serde(default)]
    pub content: String,
    /// TTL, if the provider reports one
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Provider record ID (string or number depending on provider)
    #[serde(default)]
    pub id: serde_json::Value,
}

/// Parse the stdout of a `list --output JSON` call
///
/// Empty output is treated as an empty list.
pub fn parse_list_output(stdout: &str) -> Result<Vec<LexiconRecord>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Client for the lexicon CLI
pub struct LexiconClient {
    /// Executes the program
    runner: Arc<dyn CommandRunner>,

    /// Program path
    program: String,

    /// Deadline per invocation
    timeout: Duration,
}

impl std::fmt::Debug for LexiconClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconClient")
            .field("program", &self.program)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LexiconClient {
    /// Create a client from process settings
    pub fn new(runner: Arc<dyn CommandRunner>, settings: &SolverSettings) -> Self {
        Self {
            runner,
            program: settings.lexicon_path.clone(),
            timeout: settings.lexicon_timeout,
        }
    }

    /// List TXT records named `name` in `zone`
    pub async fn list_records(
        &self,
        provider: &str,
        zone: &str,
        name: &str,
        credential: &Credential,
    ) -> Result<Vec<LexiconRecord>> {
        let args = ["--name", name, "--output", "JSON"];
        let output = self.execute(provider, "list", zone, &args, credential).await?;

        let records = parse_list_output(&output.stdout).map_err(|e| {
            Error::lexicon("list", format!("unparseable output: {}; output={}", e, output.combined()))
        })?;

        debug!("lexicon list {} in {}: {} record(s)", name, zone, records.len());
        Ok(records)
    }

    /// Perform the record's action
    pub async fn apply(
        &self,
        provider: &str,
        record: &RecordSpec,
        credential: &Credential,
    ) -> Result<()> {
        let ttl = record.ttl.to_string();
        let mut args = vec!["--name", record.name.as_str(), "--content", record.content.as_str()];
        if record.action.carries_ttl() {
            args.extend(["--ttl", ttl.as_str()]);
        }

        self.execute(provider, record.action.as_str(), &record.zone, &args, credential)
            .await?;
        Ok(())
    }

    /// Build the invocation for one call
    fn invocation(
        &self,
        provider: &str,
        action: &str,
        zone: &str,
        args: &[&str],
        credential: &Credential,
    ) -> CommandInvocation {
        CommandInvocation::new(self.program.clone(), self.timeout)
            .args([provider, action, zone, TXT])
            .args(args.iter().copied())
            .args(["--auth-token", credential.expose()])
            .env("LEXICON_LOG_LEVEL", "warning")
    }

    /// Log, run, and turn a non-zero exit into an error carrying the output
    async fn execute(
        &self,
        provider: &str,
        action: &str,
        zone: &str,
        args: &[&str],
        credential: &Credential,
    ) -> Result<CommandOutput> {
        let invocation = self.invocation(provider, action, zone, args, credential);

        info!(
            "Calling lexicon: provider={} action={} zone={} args={:?}",
            provider,
            action,
            zone,
            invocation.sanitized_args()
        );

        let output = self.runner.run(&invocation).await?;
        if !output.success {
            return Err(Error::lexicon(
                action,
                format!(
                    "exit status {}; output={}",
                    output
                        .code
                        .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    output.combined()
                ),
            ));
        }
        Ok(output)
    }
}

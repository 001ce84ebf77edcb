//! Test doubles and common utilities for solver contract tests
//!
//! This module provides minimal test doubles for the solver's I/O seams:
//! an in-memory secret store and a command runner that records every
//! invocation and answers from a per-action script.

#![allow(dead_code)]

use lexicon_webhook_core::error::{Error, Result};
use lexicon_webhook_core::traits::{
    CommandInvocation, CommandOutput, CommandRunner, SecretData, SecretStore,
};
use lexicon_webhook_core::{
    ChallengeAction, ChallengeRequest, LexiconSolver, SolverSettings,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const NAMESPACE: &str = "cert-manager";
pub const SECRET_NAME: &str = "lexicon-credentials";
pub const SECRET_KEY: &str = "token";
pub const TOKEN: &str = "super-secret-token-value";

/// In-memory secret store keyed by (namespace, name)
pub struct MockSecretStore {
    secrets: Mutex<HashMap<(String, String), SecretData>>,
    /// Call counter for get_secret()
    get_call_count: Arc<AtomicUsize>,
    /// Fail every lookup with a store error
    fail: bool,
    /// Sleep before answering
    delay: Option<Duration>,
}

impl MockSecretStore {
    pub fn new() -> Self {
        Self {
            secrets: Mutex::new(HashMap::new()),
            get_call_count: Arc::new(AtomicUsize::new(0)),
            fail: false,
            delay: None,
        }
    }

    /// Store holding the default test token
    pub fn with_token() -> Self {
        let store = Self::new();
        store.insert(NAMESPACE, SECRET_NAME, SECRET_KEY, format!("  {}\n", TOKEN).as_bytes());
        store
    }

    /// A store whose every lookup fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// A store that answers only after `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::with_token()
        }
    }

    pub fn insert(&self, namespace: &str, name: &str, key: &str, value: &[u8]) {
        self.secrets
            .lock()
            .unwrap()
            .entry((namespace.to_string(), name.to_string()))
            .or_default()
            .insert(key.to_string(), value.to_vec());
    }

    /// Get the number of times get_secret() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SecretStore for MockSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::secret("store unavailable"));
        }

        Ok(self
            .secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    fn store_name(&self) -> &'static str {
        "mock"
    }
}

/// Scripted answer for one lexicon action
#[derive(Debug, Clone)]
pub enum Script {
    /// Exit 0 with this stdout
    Succeed(String),
    /// Exit with this code and stderr
    Fail(i32, String),
    /// Runner reports a timeout
    Timeout,
}

/// Command runner that records invocations and replays scripts by lexicon action
pub struct ScriptedRunner {
    scripts: Mutex<HashMap<String, Script>>,
    invocations: Arc<Mutex<Vec<CommandInvocation>>>,
}

impl ScriptedRunner {
    /// Every action succeeds, `list` returns an empty array
    pub fn new() -> Self {
        let runner = Self {
            scripts: Mutex::new(HashMap::new()),
            invocations: Arc::new(Mutex::new(Vec::new())),
        };
        runner.script("list", Script::Succeed("[]".to_string()));
        runner
    }

    pub fn script(&self, action: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(action.to_string(), script);
    }

    /// All recorded invocations, in call order
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Lexicon action of each recorded invocation (second argument)
    pub fn actions(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(|i| i.args.get(1).cloned().unwrap_or_default())
            .collect()
    }

    /// The recorded invocation for `action`, if any
    pub fn invocation_for(&self, action: &str) -> Option<CommandInvocation> {
        self.invocations()
            .into_iter()
            .find(|i| i.args.get(1).map(String::as_str) == Some(action))
    }
}

#[async_trait::async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let action = invocation.args.get(1).cloned().unwrap_or_default();
        let script = self.scripts.lock().unwrap().get(&action).cloned();

        match script {
            None => Ok(CommandOutput::success("")),
            Some(Script::Succeed(stdout)) => Ok(CommandOutput::success(stdout)),
            Some(Script::Fail(code, stderr)) => Ok(CommandOutput::failure(code, stderr)),
            Some(Script::Timeout) => Err(Error::timeout(
                invocation.program.clone(),
                invocation.timeout,
            )),
        }
    }
}

/// Solver wired to the given doubles with test settings
pub fn solver(secrets: Arc<MockSecretStore>, runner: Arc<ScriptedRunner>) -> LexiconSolver {
    let settings = SolverSettings::new()
        .with_lexicon_path("lexicon")
        .with_lexicon_timeout(Duration::from_secs(5))
        .with_secret_timeout(Duration::from_millis(200));
    LexiconSolver::new(secrets, runner, &settings)
}

/// Solver config block pointing at the default test secret
pub fn solver_config(provider: &str) -> serde_json::Value {
    serde_json::json!({
        "provider": provider,
        "authTokenSecretRef": { "name": SECRET_NAME, "key": SECRET_KEY }
    })
}

/// A challenge request for `fqdn` in `zone` with the default test config
pub fn challenge(action: ChallengeAction, fqdn: &str, zone: &str) -> ChallengeRequest {
    ChallengeRequest::new(
        action,
        fqdn,
        zone,
        "txt-key-authorization",
        NAMESPACE,
        Some(solver_config("hetzner")),
    )
    .with_uid("uid-1")
}

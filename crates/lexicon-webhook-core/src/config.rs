//! Configuration types for the lexicon webhook
//!
//! Two kinds of configuration exist:
//!
//! - [`SolverConfig`]: per-issuer configuration embedded in every challenge
//!   request (the `config` block of the issuer's webhook solver).
//! - [`SolverSettings`]: process-wide settings fixed at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTL used when the issuer does not set one (or sets 0)
pub const DEFAULT_TTL: u32 = 60;

/// Deadline for reading the provider credential from the secret store
pub const DEFAULT_SECRET_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for a single lexicon invocation
pub const DEFAULT_LEXICON_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-issuer solver configuration
///
/// Example issuer snippet:
///
/// ```yaml
/// config:
///   provider: hetzner
///   zoneName: example.com
///   ttl: 120
///   authTokenSecretRef:
///     name: hetzner-token
///     key: token
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// lexicon provider name (e.g. "hetzner", "desec")
    #[serde(default)]
    pub provider: String,

    /// Zone override; the ACME-resolved zone is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,

    /// Secret holding the provider auth token
    #[serde(default)]
    pub auth_token_secret_ref: SecretKeySelector,

    /// Record TTL in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl SolverConfig {
    /// Parse the opaque config block of a challenge request
    ///
    /// A missing (or JSON `null`) block yields the empty configuration, which
    /// [`validate`](Self::validate) then rejects.
    pub fn from_json(config: Option<&serde_json::Value>) -> Result<Self, crate::Error> {
        match config {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => Self::deserialize(value).map_err(|e| {
                crate::Error::config(format!("error decoding solver config: {}", e))
            }),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.provider.trim().is_empty() {
            return Err(crate::Error::config(
                "config.provider must be set (e.g. hetzner, desec)",
            ));
        }
        Ok(())
    }

    /// TTL to write, falling back to [`DEFAULT_TTL`]
    pub fn effective_ttl(&self) -> u32 {
        match self.ttl {
            Some(ttl) if ttl > 0 => ttl,
            _ => DEFAULT_TTL,
        }
    }
}

/// Reference to one key of a secret in the challenge's namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret name
    #[serde(default)]
    pub name: String,

    /// Key inside the secret's data
    #[serde(default)]
    pub key: String,
}

impl SecretKeySelector {
    /// Create a new selector
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Process-wide solver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverSettings {
    /// Program to execute for lexicon calls
    pub lexicon_path: String,

    /// Deadline for each lexicon invocation
    pub lexicon_timeout: Duration,

    /// Deadline for each secret lookup
    pub secret_timeout: Duration,
}

impl SolverSettings {
    /// Create settings with default timeouts
    pub fn new() -> Self {
        Self {
            lexicon_path: "lexicon".to_string(),
            lexicon_timeout: DEFAULT_LEXICON_TIMEOUT,
            secret_timeout: DEFAULT_SECRET_TIMEOUT,
        }
    }

    /// Set the lexicon program path
    pub fn with_lexicon_path(mut self, path: impl Into<String>) -> Self {
        self.lexicon_path = path.into();
        self
    }

    /// Set the lexicon invocation timeout
    pub fn with_lexicon_timeout(mut self, timeout: Duration) -> Self {
        self.lexicon_timeout = timeout;
        self
    }

    /// Set the secret lookup timeout
    pub fn with_secret_timeout(mut self, timeout: Duration) -> Self {
        self.secret_timeout = timeout;
        self
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self::new()
    }
}

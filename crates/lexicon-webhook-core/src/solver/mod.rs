//! DNS-01 challenge solver
//!
//! The LexiconSolver is responsible for:
//! - Parsing the issuer's solver config
//! - Resolving zone and challenge record name
//! - Fetching the provider credential
//! - Choosing create vs. update and calling lexicon
//!
//! ## Flow
//!
//! ```text
//! Present:  config → zone/name → credential → lexicon list ─┬─ empty ─→ lexicon create
//!                                                           ├─ found ─→ lexicon update
//!                                                           └─ error ─→ lexicon create
//!
//! CleanUp:  config → zone/name → credential → lexicon delete (errors ignored)
//! ```
//!
//! Nothing is retried here; cert-manager re-queues failed challenges.

use crate::challenge::ChallengeRequest;
use crate::config::{SolverConfig, SolverSettings};
use crate::credentials::{Credential, fetch_credential};
use crate::error::Result;
use crate::lexicon::LexiconClient;
use crate::record::{RecordAction, RecordSpec};
use crate::resolver::{record_name_for_challenge, resolve_zone};
use crate::traits::{CommandRunner, SecretStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name the solver registers under (`solverName` in issuer config)
pub const SOLVER_NAME: &str = "dns-lexicon";

/// Interface the webhook host drives
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Solver name, matched against the request path
    fn name(&self) -> &str;

    /// Publish the challenge TXT record
    async fn present(&self, request: &ChallengeRequest) -> Result<()>;

    /// Remove the challenge TXT record
    async fn cleanup(&self, request: &ChallengeRequest) -> Result<()>;
}

/// Everything a challenge resolves to before lexicon is called
#[derive(Debug)]
struct ResolvedChallenge {
    provider: String,
    record: RecordSpec,
    credential: Credential,
}

/// Solver that manages records through the lexicon CLI
pub struct LexiconSolver {
    /// Source of provider credentials
    secrets: Arc<dyn SecretStore>,

    /// lexicon invocations
    lexicon: LexiconClient,

    /// Deadline for secret reads
    secret_timeout: Duration,
}

impl LexiconSolver {
    /// Create a solver
    ///
    /// This is the solver's initialization step: the secret store handle
    /// (typically a Kubernetes client) is built by the host and passed in.
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        runner: Arc<dyn CommandRunner>,
        settings: &SolverSettings,
    ) -> Self {
        Self {
            secrets,
            lexicon: LexiconClient::new(runner, settings),
            secret_timeout: settings.secret_timeout,
        }
    }

    /// Shared first half of Present and CleanUp
    async fn resolve(
        &self,
        request: &ChallengeRequest,
        action: RecordAction,
    ) -> Result<ResolvedChallenge> {
        let config = SolverConfig::from_json(request.config.as_ref())?;
        config.validate()?;

        let zone = resolve_zone(config.zone_name.as_deref(), &request.resolved_zone)?;
        let name = record_name_for_challenge(&request.resolved_fqdn, &zone);

        debug!(
            "Resolved {} to record {} in zone {}",
            request.resolved_fqdn, name, zone
        );

        let credential = fetch_credential(
            self.secrets.as_ref(),
            &request.resource_namespace,
            &config.auth_token_secret_ref,
            self.secret_timeout,
        )
        .await?;

        Ok(ResolvedChallenge {
            provider: config.provider.trim().to_string(),
            record: RecordSpec::new(zone, name, &request.key, config.effective_ttl(), action),
            credential,
        })
    }

    /// Create or update depending on what already exists
    async fn decide_action(&self, challenge: &ResolvedChallenge) -> RecordAction {
        let record = &challenge.record;
        match self
            .lexicon
            .list_records(&challenge.provider, &record.zone, &record.name, &challenge.credential)
            .await
        {
            Ok(existing) => RecordAction::for_existing(existing.len()),
            Err(e) => {
                warn!(
                    "Listing {} in {} failed, assuming no record exists: {}",
                    record.name, record.zone, e
                );
                RecordAction::Create
            }
        }
    }
}

impl std::fmt::Debug for LexiconSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexiconSolver")
            .field("secrets", &self.secrets.store_name())
            .field("lexicon", &self.lexicon)
            .field("secret_timeout", &self.secret_timeout)
            .finish()
    }
}

#[async_trait]
impl ChallengeSolver for LexiconSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<()> {
        let challenge = self.resolve(request, RecordAction::Create).await?;
        let action = self.decide_action(&challenge).await;
        let record = challenge.record.clone().with_action(action);

        info!(
            "Presenting challenge: {} record {} in zone {} via {}",
            action, record.name, record.zone, challenge.provider
        );

        self.lexicon
            .apply(&challenge.provider, &record, &challenge.credential)
            .await?;

        info!("Challenge record {} in {} is live", record.name, record.zone);
        Ok(())
    }

    async fn cleanup(&self, request: &ChallengeRequest) -> Result<()> {
        let challenge = self.resolve(request, RecordAction::Delete).await?;
        let record = &challenge.record;

        info!(
            "Cleaning up challenge: record {} in zone {} via {}",
            record.name, record.zone, challenge.provider
        );

        // Providers disagree on what "not found" looks like, so any failure is tolerated.
        if let Err(e) = self
            .lexicon
            .apply(&challenge.provider, record, &challenge.credential)
            .await
        {
            warn!(
                "Ignoring failed delete of {} in {}: {}",
                record.name, record.zone, e
            );
        }

        Ok(())
    }
}

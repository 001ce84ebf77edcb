// # lexicon-webhook-core
//
// Core library for a cert-manager ACME DNS-01 webhook that manages challenge
// TXT records through the `lexicon` CLI.
//
// ## Architecture Overview
//
// - **ChallengeSolver**: Present/CleanUp entry points driven by the webhook host
// - **LexiconSolver**: Resolves zone and record name, fetches the credential,
//   decides create vs. update and runs lexicon
// - **SecretStore**: Trait for reading provider credentials (Kubernetes in production)
// - **CommandRunner**: Trait for spawning lexicon (tokio::process in production)
// - **handle_payload**: Maps a `ChallengePayload` onto the solver
//
// ## Design Principles
//
// 1. **Stateless**: Every call fetches its own credential and queries live records
// 2. **Explicit credentials**: Secrets are read from the challenge's namespace only
// 3. **Redacted logging**: Credential values never reach logs or error messages
// 4. **Library-First**: The daemon is a thin HTTP layer over this crate

pub mod traits;
pub mod config;
pub mod error;
pub mod challenge;
pub mod resolver;
pub mod credentials;
pub mod record;
pub mod lexicon;
pub mod process;
pub mod solver;
pub mod webhook;

// Re-export core types for convenience
pub use traits::{SecretStore, SecretData, CommandRunner, CommandInvocation, CommandOutput};
pub use config::{SolverConfig, SolverSettings, SecretKeySelector};
pub use error::{Error, Result};
pub use challenge::{ChallengeAction, ChallengePayload, ChallengeRequest, ChallengeResponse};
pub use credentials::Credential;
pub use record::{RecordAction, RecordSpec};
pub use lexicon::LexiconClient;
pub use process::TokioCommandRunner;
pub use solver::{ChallengeSolver, LexiconSolver, SOLVER_NAME};
pub use webhook::handle_payload;

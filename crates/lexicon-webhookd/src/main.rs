// # lexicon-webhookd - cert-manager webhook server
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add zone, record or credential logic here; it lives in lexicon-webhook-core
// - Configuration is via environment variables ONLY
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the Kubernetes client and the solver
// 4. Serving the webhook API until SIGTERM/SIGINT
//
// ## Configuration
//
// - `GROUP_NAME`: API group the APIService registers (required, e.g. acme.example.com)
// - `WEBHOOK_LISTEN_ADDR`: Listen address (default 0.0.0.0:443)
// - `WEBHOOK_TLS_CERT_FILE`: PEM certificate chain (set together with the key)
// - `WEBHOOK_TLS_KEY_FILE`: PEM private key
// - `LEXICON_PATH`: lexicon executable (default lexicon)
// - `LEXICON_TIMEOUT_SECS`: Deadline per lexicon call (default 60)
// - `WEBHOOK_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export GROUP_NAME=acme.example.com
// export WEBHOOK_TLS_CERT_FILE=/tls/tls.crt
// export WEBHOOK_TLS_KEY_FILE=/tls/tls.key
//
// lexicon-webhookd
// ```

mod server;

use anyhow::{Context, Result};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use lexicon_webhook_core::{ChallengeSolver, LexiconSolver, SolverSettings, TokioCommandRunner};
use lexicon_webhook_kube::KubeSecretStore;
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// How long in-flight challenges may run after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum WebhookExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WebhookExitCode> for ExitCode {
    fn from(code: WebhookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
struct Config {
    group_name: String,
    listen_addr: String,
    tls_cert_file: Option<String>,
    tls_key_file: Option<String>,
    lexicon_path: String,
    lexicon_timeout_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            group_name: env::var("GROUP_NAME").unwrap_or_default(),
            listen_addr: env::var("WEBHOOK_LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:443".to_string()),
            tls_cert_file: env::var("WEBHOOK_TLS_CERT_FILE").ok().filter(|s| !s.is_empty()),
            tls_key_file: env::var("WEBHOOK_TLS_KEY_FILE").ok().filter(|s| !s.is_empty()),
            lexicon_path: env::var("LEXICON_PATH").unwrap_or_else(|_| "lexicon".to_string()),
            lexicon_timeout_secs: env::var("LEXICON_TIMEOUT_SECS")
                .ok()
                .map(|s| s.trim().parse::<u64>())
                .transpose()
                .context("LEXICON_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(60),
            log_level: env::var("WEBHOOK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.group_name.is_empty() {
            anyhow::bail!(
                "GROUP_NAME must be specified. \
                Set it to the API group of your APIService, e.g. export GROUP_NAME=acme.example.com"
            );
        }

        if !self
            .group_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            anyhow::bail!(
                "GROUP_NAME '{}' is not a valid API group name",
                self.group_name
            );
        }

        self.listen_addr.parse::<SocketAddr>().with_context(|| {
            format!(
                "WEBHOOK_LISTEN_ADDR '{}' is not a valid socket address",
                self.listen_addr
            )
        })?;

        match (&self.tls_cert_file, &self.tls_key_file) {
            (Some(cert), Some(key)) => {
                for path in [cert, key] {
                    if !std::path::Path::new(path).exists() {
                        anyhow::bail!("TLS file does not exist: {}", path);
                    }
                }
            }
            (None, None) => {}
            _ => anyhow::bail!(
                "WEBHOOK_TLS_CERT_FILE and WEBHOOK_TLS_KEY_FILE must be set together"
            ),
        }

        if self.lexicon_path.trim().is_empty() {
            anyhow::bail!("LEXICON_PATH cannot be empty");
        }

        if !(1..=600).contains(&self.lexicon_timeout_secs) {
            anyhow::bail!(
                "LEXICON_TIMEOUT_SECS must be between 1 and 600 seconds. Got: {}",
                self.lexicon_timeout_secs
            );
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }

    /// Solver settings derived from this configuration
    fn solver_settings(&self) -> SolverSettings {
        SolverSettings::new()
            .with_lexicon_path(self.lexicon_path.clone())
            .with_lexicon_timeout(Duration::from_secs(self.lexicon_timeout_secs))
    }

    /// Both TLS paths, if configured
    fn tls_files(&self) -> Option<(&str, &str)> {
        match (&self.tls_cert_file, &self.tls_key_file) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "WEBHOOK_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return WebhookExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return WebhookExitCode::ConfigError.into();
    }

    // Validated above
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WebhookExitCode::ConfigError.into();
    }

    info!("Starting lexicon-webhookd v{}", env!("CARGO_PKG_VERSION"));
    info!("Serving API group {} on {}", config.group_name, config.listen_addr);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WebhookExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Webhook error: {:#}", e);
            WebhookExitCode::RuntimeError
        } else {
            WebhookExitCode::CleanShutdown
        }
    })
    .into()
}

/// Run the webhook server until a shutdown signal arrives
async fn run_daemon(config: Config) -> Result<()> {
    let secrets = KubeSecretStore::try_default()
        .await
        .context("Failed to initialize Kubernetes client")?;

    let settings = config.solver_settings();
    let solver: Arc<dyn ChallengeSolver> = Arc::new(LexiconSolver::new(
        Arc::new(secrets),
        Arc::new(TokioCommandRunner::new()),
        &settings,
    ));
    info!(
        "Solver {} ready (lexicon: {}, timeout: {:?})",
        solver.name(),
        settings.lexicon_path,
        settings.lexicon_timeout
    );

    let app = server::router(&config.group_name, solver);
    let addr: SocketAddr = config.listen_addr.parse()?;

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    match config.tls_files() {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key)
                .await
                .with_context(|| format!("Failed to load TLS material from {} / {}", cert, key))?;

            info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            warn!("TLS not configured, serving plain HTTP (the aggregation layer requires HTTPS)");
            info!("Listening on http://{}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Trigger graceful shutdown of the server on the first signal
async fn shutdown_on_signal(handle: Handle) {
    match wait_for_shutdown_signal().await {
        Ok(signal) => info!("Received shutdown signal: {}", signal),
        Err(e) => error!("Signal handling failed, shutting down: {}", e),
    }
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}

//! Dispatch of `ChallengePayload` requests to a solver
//!
//! Transport-agnostic: the daemon decodes the HTTP body, calls
//! [`handle_payload`] and encodes the result.

use crate::challenge::{
    ChallengeAction, ChallengePayload, ChallengeResponse, PAYLOAD_API_VERSION, PAYLOAD_KIND,
    Status,
};
use crate::error::{Error, Result};
use crate::solver::ChallengeSolver;
use tracing::{error, info};

/// Run the requested action and wrap the outcome in a response payload
///
/// Solver failures do not make this function fail: they are reported in the
/// response (`success: false` plus a `Failure` status), which is what
/// cert-manager inspects.
pub async fn handle_payload(
    solver: &dyn ChallengeSolver,
    payload: ChallengePayload,
) -> ChallengePayload {
    let api_version = if payload.api_version.is_empty() {
        PAYLOAD_API_VERSION.to_string()
    } else {
        payload.api_version.clone()
    };

    let uid = payload
        .request
        .as_ref()
        .map(|r| r.uid.clone())
        .unwrap_or_default();

    let response = match dispatch(solver, &payload).await {
        Ok(()) => ChallengeResponse {
            uid,
            success: true,
            status: None,
        },
        Err(e) => {
            error!("Challenge {} failed: {}", uid, e);
            ChallengeResponse {
                uid,
                success: false,
                status: Some(Status::failure(e.to_string())),
            }
        }
    };

    ChallengePayload {
        api_version,
        kind: PAYLOAD_KIND.to_string(),
        request: None,
        response: Some(response),
    }
}

async fn dispatch(solver: &dyn ChallengeSolver, payload: &ChallengePayload) -> Result<()> {
    let request = payload
        .request
        .as_ref()
        .ok_or_else(|| Error::payload("request must be set"))?;

    info!(
        "Handling {} for {} (uid {}, namespace {})",
        request.action, request.resolved_fqdn, request.uid, request.resource_namespace
    );

    match &request.action {
        ChallengeAction::Present => solver.present(request).await,
        ChallengeAction::CleanUp => solver.cleanup(request).await,
        ChallengeAction::Unknown(other) => {
            Err(Error::payload(format!("unsupported action {:?}", other)))
        }
    }
}

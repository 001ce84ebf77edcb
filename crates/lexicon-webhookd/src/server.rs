//! HTTP surface of the webhook
//!
//! The Kubernetes aggregation layer proxies
//! `POST /apis/<group>/v1alpha1/<solver>` to this server with a
//! `ChallengePayload` body. Discovery and health endpoints are served so the
//! APIService reports Available.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lexicon_webhook_core::challenge::PAYLOAD_KIND;
use lexicon_webhook_core::{ChallengePayload, ChallengeSolver, handle_payload};
use std::sync::Arc;
use tracing::warn;

/// Version segment of the solver API
const API_VERSION: &str = "v1alpha1";

#[derive(Clone)]
struct AppState {
    group_name: Arc<str>,
    solver: Arc<dyn ChallengeSolver>,
}

/// Build the router for `group_name` serving `solver`
pub fn router(group_name: &str, solver: Arc<dyn ChallengeSolver>) -> Router {
    let state = AppState {
        group_name: Arc::from(group_name),
        solver,
    };

    let base = format!("/apis/{}/{}", group_name, API_VERSION);

    Router::new()
        .route(&base, get(discovery))
        .route(&format!("{}/:solver", base), post(solve))
        .route("/healthz", get(health))
        .route("/livez", get(health))
        .route("/readyz", get(health))
        .with_state(state)
}

async fn solve(
    State(state): State<AppState>,
    Path(solver): Path<String>,
    Json(payload): Json<ChallengePayload>,
) -> Response {
    if solver != state.solver.name() {
        warn!("Request for unknown solver {:?}", solver);
        return (
            StatusCode::NOT_FOUND,
            format!("solver {:?} is not served by this webhook", solver),
        )
            .into_response();
    }

    let response = handle_payload(state.solver.as_ref(), payload).await;
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn discovery(State(state): State<AppState>) -> Json<serde_json::Value> {
    let name = state.solver.name();
    Json(serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": format!("{}/{}", state.group_name, API_VERSION),
        "resources": [{
            "name": name,
            "singularName": name,
            "namespaced": false,
            "kind": PAYLOAD_KIND,
            "verbs": ["create"]
        }]
    }))
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use lexicon_webhook_core::{ChallengeRequest, Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const GROUP: &str = "acme.example.com";

    /// Solver that counts calls and fails presents for one FQDN
    #[derive(Default)]
    struct FakeSolver {
        presents: AtomicUsize,
        cleanups: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ChallengeSolver for FakeSolver {
        fn name(&self) -> &str {
            "dns-lexicon"
        }

        async fn present(&self, request: &ChallengeRequest) -> Result<()> {
            self.presents.fetch_add(1, Ordering::SeqCst);
            if request.resolved_fqdn.starts_with("_acme-challenge.broken.") {
                return Err(Error::config("config.provider must be set"));
            }
            Ok(())
        }

        async fn cleanup(&self, _request: &ChallengeRequest) -> Result<()> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn payload(action: &str, fqdn: &str) -> String {
        serde_json::json!({
            "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
            "kind": "ChallengePayload",
            "request": {
                "uid": "uid-42",
                "action": action,
                "type": "dns-01",
                "key": "txt",
                "resourceNamespace": "default",
                "resolvedFQDN": fqdn,
                "resolvedZone": "example.com."
            }
        })
        .to_string()
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_present_is_dispatched() {
        let solver = Arc::new(FakeSolver::default());
        let app = router(GROUP, solver.clone());

        let response = app
            .oneshot(post_json(
                "/apis/acme.example.com/v1alpha1/dns-lexicon",
                payload("Present", "_acme-challenge.www.example.com."),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "ChallengePayload");
        assert_eq!(body["response"]["uid"], "uid-42");
        assert_eq!(body["response"]["success"], true);
        assert_eq!(solver.presents.load(Ordering::SeqCst), 1);
        assert_eq!(solver.cleanups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cleanup_is_dispatched() {
        let solver = Arc::new(FakeSolver::default());
        let app = router(GROUP, solver.clone());

        let response = app
            .oneshot(post_json(
                "/apis/acme.example.com/v1alpha1/dns-lexicon",
                payload("CleanUp", "_acme-challenge.www.example.com."),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(solver.cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_solver_failure_reported_in_body() {
        let app = router(GROUP, Arc::new(FakeSolver::default()));

        let response = app
            .oneshot(post_json(
                "/apis/acme.example.com/v1alpha1/dns-lexicon",
                payload("Present", "_acme-challenge.broken.example.com."),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["response"]["success"], false);
        assert_eq!(body["response"]["status"]["status"], "Failure");
        assert!(
            body["response"]["status"]["message"]
                .as_str()
                .unwrap()
                .contains("config.provider")
        );
    }

    #[tokio::test]
    async fn test_unknown_solver_is_not_found() {
        let solver = Arc::new(FakeSolver::default());
        let app = router(GROUP, solver.clone());

        let response = app
            .oneshot(post_json(
                "/apis/acme.example.com/v1alpha1/route53",
                payload("Present", "_acme-challenge.www.example.com."),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(solver.presents.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_group_is_not_routed() {
        let app = router(GROUP, Arc::new(FakeSolver::default()));

        let response = app
            .oneshot(post_json(
                "/apis/other.example.org/v1alpha1/dns-lexicon",
                payload("Present", "_acme-challenge.www.example.com."),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = router(GROUP, Arc::new(FakeSolver::default()));

        let response = app
            .oneshot(post_json(
                "/apis/acme.example.com/v1alpha1/dns-lexicon",
                "{not json".to_string(),
            ))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_discovery_lists_solver() {
        let app = router(GROUP, Arc::new(FakeSolver::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/apis/acme.example.com/v1alpha1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["groupVersion"], "acme.example.com/v1alpha1");
        assert_eq!(body["resources"][0]["name"], "dns-lexicon");
        assert_eq!(body["resources"][0]["kind"], "ChallengePayload");
        assert_eq!(body["resources"][0]["verbs"][0], "create");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        for path in ["/healthz", "/livez", "/readyz"] {
            let app = router(GROUP, Arc::new(FakeSolver::default()));
            let response = app
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", path);
        }
    }
}

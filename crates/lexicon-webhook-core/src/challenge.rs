//! Wire types of the cert-manager ACME webhook protocol
//!
//! cert-manager POSTs a `ChallengePayload` carrying a [`ChallengeRequest`]
//! and expects the same envelope back with a [`ChallengeResponse`]. Field
//! names follow `webhook.acme.cert-manager.io/v1alpha1`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// API group/version of the payload envelope
pub const PAYLOAD_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";

/// Kind of the payload envelope
pub const PAYLOAD_KIND: &str = "ChallengePayload";

/// Requested solver action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    /// Publish the TXT record
    Present,
    /// Remove the TXT record
    CleanUp,
    /// Anything this solver does not know
    #[serde(untagged)]
    Unknown(String),
}

impl fmt::Display for ChallengeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeAction::Present => f.write_str("Present"),
            ChallengeAction::CleanUp => f.write_str("CleanUp"),
            ChallengeAction::Unknown(other) => f.write_str(other),
        }
    }
}

/// A single DNS-01 challenge to present or clean up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Request UID, echoed in the response
    #[serde(default)]
    pub uid: String,

    /// Present or CleanUp
    pub action: ChallengeAction,

    /// Challenge type, always `dns-01` for this solver
    #[serde(rename = "type", default)]
    pub challenge_type: String,

    /// Domain being validated
    #[serde(default)]
    pub dns_name: String,

    /// TXT record value
    #[serde(default)]
    pub key: String,

    /// Namespace of the challenge resource; secrets are read from here
    #[serde(default)]
    pub resource_namespace: String,

    /// Fully-qualified challenge record name (`_acme-challenge.example.com.`)
    #[serde(rename = "resolvedFQDN", default)]
    pub resolved_fqdn: String,

    /// Zone cert-manager resolved for the FQDN (`example.com.`)
    #[serde(default)]
    pub resolved_zone: String,

    /// Whether ambient credentials may be used (never, for this solver)
    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Issuer's solver config block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl ChallengeRequest {
    /// Create a request with the fields the solver consumes
    pub fn new(
        action: ChallengeAction,
        resolved_fqdn: impl Into<String>,
        resolved_zone: impl Into<String>,
        key: impl Into<String>,
        resource_namespace: impl Into<String>,
        config: Option<serde_json::Value>,
    ) -> Self {
        Self {
            uid: String::new(),
            action,
            challenge_type: "dns-01".to_string(),
            dns_name: String::new(),
            key: key.into(),
            resource_namespace: resource_namespace.into(),
            resolved_fqdn: resolved_fqdn.into(),
            resolved_zone: resolved_zone.into(),
            allow_ambient_credentials: false,
            config,
        }
    }

    /// Set the request UID
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }
}

/// Kubernetes-style status attached to failed responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// `Success` or `Failure`
    #[serde(default)]
    pub status: String,

    /// Human-readable description
    #[serde(default)]
    pub message: String,

    /// Machine-readable reason
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// HTTP-like status code
    #[serde(default)]
    pub code: u16,
}

impl Status {
    /// A failure status with code 500
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: "Failure".to_string(),
            message: message.into(),
            reason: "InternalError".to_string(),
            code: 500,
        }
    }
}

/// Result of handling one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    /// UID of the request this answers
    #[serde(default)]
    pub uid: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Failure details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Request/response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    /// API group/version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Always `ChallengePayload`
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Incoming request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,

    /// Outgoing response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    /// Wrap a request
    pub fn for_request(request: ChallengeRequest) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            request: Some(request),
            response: None,
        }
    }
}

fn default_api_version() -> String {
    PAYLOAD_API_VERSION.to_string()
}

fn default_kind() -> String {
    PAYLOAD_KIND.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_cert_manager_payload() {
        let raw = json!({
            "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
            "kind": "ChallengePayload",
            "request": {
                "uid": "6b1d0f2c",
                "action": "Present",
                "type": "dns-01",
                "dnsName": "www.example.com",
                "key": "txt-value",
                "resourceNamespace": "default",
                "resolvedFQDN": "_acme-challenge.www.example.com.",
                "resolvedZone": "example.com.",
                "allowAmbientCredentials": false,
                "config": { "provider": "desec" }
            }
        });

        let payload: ChallengePayload = serde_json::from_value(raw).unwrap();
        let request = payload.request.unwrap();
        assert_eq!(request.action, ChallengeAction::Present);
        assert_eq!(request.resolved_fqdn, "_acme-challenge.www.example.com.");
        assert_eq!(request.resolved_zone, "example.com.");
        assert_eq!(request.resource_namespace, "default");
        assert_eq!(request.challenge_type, "dns-01");
        assert_eq!(request.config, Some(json!({ "provider": "desec" })));
    }

    #[test]
    fn test_unknown_action_is_preserved() {
        let request: ChallengeRequest =
            serde_json::from_value(json!({ "action": "Refresh" })).unwrap();
        assert_eq!(request.action, ChallengeAction::Unknown("Refresh".to_string()));
        assert_eq!(request.action.to_string(), "Refresh");
    }

    #[test]
    fn test_encode_failure_response() {
        let payload = ChallengePayload {
            api_version: PAYLOAD_API_VERSION.to_string(),
            kind: PAYLOAD_KIND.to_string(),
            request: None,
            response: Some(ChallengeResponse {
                uid: "abc".to_string(),
                success: false,
                status: Some(Status::failure("boom")),
            }),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["response"]["uid"], "abc");
        assert_eq!(value["response"]["success"], false);
        assert_eq!(value["response"]["status"]["message"], "boom");
        assert_eq!(value["response"]["status"]["code"], 500);
        assert!(value.get("request").is_none());
    }
}

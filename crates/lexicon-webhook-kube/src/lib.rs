// # Kubernetes Secret Store
//
// This crate provides the Kubernetes-backed [`SecretStore`] for the lexicon
// webhook: provider tokens are read from `Secret` objects in the namespace of
// the challenge.
//
// ## Security Requirements
//
// - Reads only the namespace it is asked for (no default namespace)
// - Secret values NEVER appear in logs
// - No caching: every call is a fresh `GET`
//
// ## RBAC
//
// The webhook's service account needs `get` on `secrets` in every namespace
// that holds issuer credentials.
//
// ## API Reference
//
// - Read Secret: GET `/api/v1/namespaces/:namespace/secrets/:name`

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use lexicon_webhook_core::traits::{SecretData, SecretStore};
use lexicon_webhook_core::{Error, Result};

/// Secret store backed by the Kubernetes API
///
/// Holds a read-only client handle; clones share the underlying connection pool.
#[derive(Clone)]
pub struct KubeSecretStore {
    /// Kubernetes API client
    client: Client,
}

// kube::Client has no Debug impl.
impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore")
            .field("default_namespace", &self.client.default_namespace())
            .finish()
    }
}

impl KubeSecretStore {
    /// Create a store from an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a store from the in-cluster or kubeconfig environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no cluster configuration can be inferred.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .map_err(|e| Error::config(format!("failed to build Kubernetes client: {}", e)))?;

        tracing::info!(
            "Kubernetes client initialized (default namespace: {})",
            client.default_namespace()
        );
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>> {
        tracing::debug!("GET secret {}/{}", namespace, name);

        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api.get_opt(name).await.map_err(|e| {
            Error::secret(format!("Kubernetes API error for {}/{}: {}", namespace, name, e))
        })?;

        Ok(secret.map(secret_data))
    }

    fn store_name(&self) -> &'static str {
        "kubernetes"
    }
}

/// Flatten a Secret into key → bytes
///
/// `data` wins over `stringData` for keys present in both. The API server
/// folds `stringData` into `data` on write, so `stringData` only shows up
/// on objects that never went through it.
pub fn secret_data(secret: Secret) -> SecretData {
    let mut out: SecretData = secret
        .string_data
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.into_bytes()))
        .collect();

    for (key, value) in secret.data.unwrap_or_default() {
        out.insert(key, value.0);
    }
    out
}

// # Secret Store Trait
//
// Defines the interface for reading provider credentials from a namespaced
// key-value store.
//
// ## Implementations
//
// - Kubernetes: `lexicon-webhook-kube` crate
// - Tests: in-memory doubles in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use lexicon_webhook_core::SecretStore;
//
// let data = store.get_secret("cert-manager", "hetzner-token").await?;
// if let Some(data) = data {
//     let token = data.get("token");
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Key → raw bytes, as stored in a secret's data
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Trait for secret store implementations
///
/// # Contract
///
/// - Reads only the secret named, in the namespace named. No implicit default
///   namespace, no fallback to other namespaces.
/// - `Ok(None)` means the secret does not exist; `Err` means the store could
///   not answer.
/// - No caching: every call reflects the store's current content.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch all data of one secret
    ///
    /// # Parameters
    ///
    /// - `namespace`: Namespace of the secret (never empty when called by the solver)
    /// - `name`: Secret name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))`: The secret exists
    /// - `Ok(None)`: No such secret
    /// - `Err(Error)`: The store failed
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SecretData>, crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

//! Provider credential lookup
//!
//! The auth token for lexicon lives in a secret in the namespace the
//! challenge belongs to. Every lookup is explicit: no default namespace, no
//! empty-token fallback, and no caching between calls.

use crate::config::SecretKeySelector;
use crate::error::{Error, Result};
use crate::traits::SecretStore;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// A provider credential
///
/// Debug and Display never show the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for handing to the external tool
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Read one key of a namespaced secret
///
/// # Errors
///
/// - Configuration error if `namespace`, `selector.name` or `selector.key` is empty
/// - Secret error if the secret or key is missing, or the store fails
/// - Timeout error if the store does not answer within `timeout`
pub async fn fetch_credential(
    store: &dyn SecretStore,
    namespace: &str,
    selector: &SecretKeySelector,
    timeout: Duration,
) -> Result<Credential> {
    if namespace.is_empty() {
        return Err(Error::config(
            "resource namespace is empty; cannot read secret",
        ));
    }
    if selector.name.is_empty() {
        return Err(Error::config("authTokenSecretRef.name must be set"));
    }
    if selector.key.is_empty() {
        return Err(Error::config("authTokenSecretRef.key must be set"));
    }

    debug!(
        "Reading secret {}/{} key {:?} from {}",
        namespace,
        selector.name,
        selector.key,
        store.store_name()
    );

    let data = tokio::time::timeout(timeout, store.get_secret(namespace, &selector.name))
        .await
        .map_err(|_| {
            Error::timeout(format!("reading secret {}/{}", namespace, selector.name), timeout)
        })?
        .map_err(|e| {
            Error::secret(format!(
                "failed to get secret {}/{}: {}",
                namespace, selector.name, e
            ))
        })?
        .ok_or_else(|| {
            Error::secret(format!("secret {}/{} not found", namespace, selector.name))
        })?;

    let value = data.get(&selector.key).ok_or_else(|| {
        Error::secret(format!(
            "secret {}/{} missing key {:?}",
            namespace, selector.name, selector.key
        ))
    })?;

    Ok(Credential::new(String::from_utf8_lossy(value).trim()))
}

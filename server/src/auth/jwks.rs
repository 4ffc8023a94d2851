//! Trusted signing-key sets.
//!
//! The identity provider publishes its RSA public keys as a JSON Web Key Set
//! at a well-known URL. [`KeySetSource`] is the seam the verifier fetches
//! through; [`RemoteKeySet`] is the HTTP implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;

/// Upper bound on a single key-set request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error returned when the trusted key set cannot be used.
#[derive(Debug, Error)]
pub enum KeySetError {
    /// The request failed or the body was not a key set.
    #[error("key set request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("key set endpoint returned status {0}")]
    Status(u16),
    /// A published key could not be turned into a verification key.
    #[error("key '{kid}' is not a usable RSA key: {source}")]
    UnusableKey {
        kid: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

/// Somewhere the current trusted key set can be fetched from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the complete key set. Called again on every cache refresh.
    async fn fetch(&self) -> Result<JwkSet, KeySetError>;
}

/// Key set published over HTTPS by the identity provider.
#[derive(Debug, Clone)]
pub struct RemoteKeySet {
    url: String,
    client: reqwest::Client,
}

impl RemoteKeySet {
    /// Create a source for the key set at `url`.
    ///
    /// # Errors
    /// Returns `KeySetError::Request` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl KeySetSource for RemoteKeySet {
    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        tracing::debug!(url = %self.url, "fetching signing key set");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::Status(status.as_u16()));
        }

        let keys: JwkSet = response.json().await?;
        tracing::debug!(count = keys.keys.len(), "fetched signing key set");
        Ok(keys)
    }
}

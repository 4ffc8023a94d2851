//! JWT verification module.
//!
//! Verifies RS256 bearer tokens against the identity provider's key set and
//! extracts the caller's permissions.
//!
//! # Pre-conditions
//! - The key set source publishes RSA keys with a `kid`.
//! - Tokens carry a `kid` header and `exp`, `iss` and `aud` claims.
//!
//! # Post-conditions
//! - On success, the returned `AuthContext` comes from a token whose
//!   signature, audience, issuer and expiry were all checked.
//! - On failure, a typed `AuthError` says which step rejected the token.
//!
//! # Invariants
//! - The cached key set is only replaced by a successful fetch.
//! - At most one forced refresh happens per verification, and none while the
//!   cached set is younger than the minimum refresh interval.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{AuthError, KeySetError, KeySetSource};

/// Default minimum age of a cached key set before an unknown `kid` refetches it.
const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Claims read from a verified token.
///
/// `exp`, `iss` and `aud` are validated by `jsonwebtoken` directly and are not
/// kept here.
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    permissions: Option<Vec<String>>,
}

/// Identity and permissions of the caller of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// The token's `sub` claim, if any.
    pub subject: Option<String>,
    /// Permissions granted by the token. Empty when the claim is absent.
    pub permissions: BTreeSet<String>,
}

impl AuthContext {
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            permissions: claims.permissions.unwrap_or_default().into_iter().collect(),
        }
    }
}

struct CachedKeySet {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

/// Verifies bearer tokens against a cached copy of the trusted key set.
pub struct TokenVerifier {
    source: Arc<dyn KeySetSource>,
    cache: RwLock<Option<CachedKeySet>>,
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier expecting tokens for `audience` issued by `issuer`.
    ///
    /// A fetched key set is reused for `cache_ttl`; a zero TTL refetches on
    /// every verification.
    pub fn new(
        source: Arc<dyn KeySetSource>,
        audience: &str,
        issuer: &str,
        cache_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);

        Self {
            source,
            cache: RwLock::new(None),
            cache_ttl,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            validation,
        }
    }

    /// Set how old the cached key set must be before a token with an unknown
    /// `kid` may force a refetch. Younger sets reject the token directly.
    #[must_use]
    pub const fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Verify the bearer token carried by a request's headers.
    pub async fn verify_headers(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = bearer_token(headers)?;
        self.verify(token).await
    }

    /// Verify a raw token.
    pub async fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let (keys, fetched_at, fetched_now) = self.current_keys().await?;

        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.ok_or(AuthError::MalformedToken)?;

        let jwk = match keys.find(&kid) {
            Some(jwk) => jwk.clone(),
            // Keys may have rotated since the cached set was fetched.
            None if !fetched_now && fetched_at.elapsed() >= self.min_refresh_interval => {
                tracing::debug!(kid = %kid, "unknown key id, refreshing key set");
                let refreshed = self.refresh(fetched_at).await?;
                refreshed.find(&kid).cloned().ok_or(AuthError::UnknownKey)?
            }
            None => {
                tracing::debug!(kid = %kid, "unknown key id, key set refreshed recently");
                return Err(AuthError::UnknownKey);
            }
        };

        let key = DecodingKey::from_jwk(&jwk).map_err(|source| KeySetError::UnusableKey {
            kid: kid.clone(),
            source,
        })?;

        let token_data =
            decode::<Claims>(token, &key, &self.validation).map_err(map_jwt_error)?;

        Ok(token_data.claims.into())
    }

    /// The cached key set if still fresh, otherwise a newly fetched one.
    ///
    /// Returns the set, when it was fetched, and whether this call fetched it.
    async fn current_keys(&self) -> Result<(Arc<JwkSet>, Instant, bool), KeySetError> {
        if let Some((keys, fetched_at)) = self.fresh_cached(&*self.cache.read().await) {
            return Ok((keys, fetched_at, false));
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some((keys, fetched_at)) = self.fresh_cached(&cache) {
            return Ok((keys, fetched_at, false));
        }
        let (keys, fetched_at) = self.fetch_into(&mut cache).await?;
        Ok((keys, fetched_at, true))
    }

    /// Refetch the key set unless it was replaced after `stale` was fetched.
    async fn refresh(&self, stale: Instant) -> Result<Arc<JwkSet>, KeySetError> {
        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref().filter(|cached| cached.fetched_at > stale) {
            return Ok(Arc::clone(&cached.keys));
        }
        let (keys, _) = self.fetch_into(&mut cache).await?;
        Ok(keys)
    }

    fn fresh_cached(&self, cache: &Option<CachedKeySet>) -> Option<(Arc<JwkSet>, Instant)> {
        cache
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(|cached| (Arc::clone(&cached.keys), cached.fetched_at))
    }

    async fn fetch_into(
        &self,
        cache: &mut Option<CachedKeySet>,
    ) -> Result<(Arc<JwkSet>, Instant), KeySetError> {
        let keys = match self.source.fetch().await {
            Ok(keys) => Arc::new(keys),
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch signing key set");
                return Err(error);
            }
        };

        let fetched_at = Instant::now();
        *cache = Some(CachedKeySet {
            keys: Arc::clone(&keys),
            fetched_at,
        });
        Ok((keys, fetched_at))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively and the value must have exactly
/// two whitespace-separated parts.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        (None, _, _) => Err(AuthError::MissingAuthHeader),
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// Maps jsonwebtoken errors to our `AuthError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        _ => AuthError::MalformedToken,
    }
}

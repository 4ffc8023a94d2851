//! Authentication and authorization failures.
//!
//! The `Display` text of each variant is the message returned to the client,
//! so it never includes token contents or upstream error details.

use thiserror::Error;

use super::jwks::KeySetError;

/// Why a request failed the authorization gate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    #[error("Authorization header is expected.")]
    MissingAuthHeader,
    /// The header is not `Bearer <token>`.
    #[error("Authorization header must be a bearer token.")]
    MalformedAuthHeader,
    /// The token header could not be decoded or has no key id.
    #[error("Unable to parse authentication token.")]
    MalformedToken,
    /// No trusted key has the token's key id.
    #[error("Unable to find the appropriate key.")]
    UnknownKey,
    /// The token's `exp` has passed.
    #[error("Token expired.")]
    TokenExpired,
    /// Audience, issuer or another registered claim is wrong.
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    /// The signature does not match the selected key.
    #[error("Unable to verify token signature.")]
    InvalidSignature,
    /// The trusted key set could not be obtained.
    #[error("Failed to fetch signing keys.")]
    KeySetFetch(#[from] KeySetError),
    /// The token is valid but lacks the route's permission.
    #[error("Permission not found.")]
    PermissionDenied,
}

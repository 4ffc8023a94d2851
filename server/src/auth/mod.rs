//! Authentication module.
//!
//! Bearer tokens are JSON Web Tokens issued by an external identity provider
//! and signed with RS256. Verification checks them against the provider's
//! published key set; the gate then enforces a per-route permission.
//!
//! # Pre-conditions
//! - The identity provider's key set is reachable at the configured URL.
//!
//! # Post-conditions
//! - A request that passes the gate carries an `AuthContext` built from a
//!   token whose signature, issuer, audience and expiry have been checked.
//!
//! # Invariants
//! - `AuthContext` values are never cached or reused across requests.

pub mod error;
pub mod gate;
pub mod jwks;
pub mod jwt;

pub use error::AuthError;
pub use gate::{
    Authorized, AuthorizedJson, DeleteDrinks, GetDrinksDetail, PatchDrinks, Permission,
    PostDrinks, authorize, body_rejected,
};
pub use jwks::{KeySetError, KeySetSource, RemoteKeySet};
pub use jwt::{AuthContext, TokenVerifier};

//! Authorization gate.
//!
//! Each protected route names the permission it needs as a type parameter of
//! its extractor, e.g. `Authorized<PostDrinks>`. The extractor verifies the
//! bearer token and checks the permission before the handler body runs.

use std::marker::PhantomData;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::Json;
use serde_json::Value;

use super::{AuthContext, AuthError, TokenVerifier};
use crate::error::ApiError;

/// A permission string a route requires.
pub trait Permission: Send + Sync + 'static {
    /// Value that must appear in the token's `permissions` claim.
    /// An empty string accepts any valid token.
    const NAME: &'static str;
}

macro_rules! permission {
    ($(#[$doc:meta])* $marker:ident => $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Permission for $marker {
            const NAME: &'static str = $name;
        }
    };
}

permission!(
    /// Read drinks with full recipes.
    GetDrinksDetail => "get:drinks-detail"
);
permission!(
    /// Create drinks.
    PostDrinks => "post:drinks"
);
permission!(
    /// Update drinks.
    PatchDrinks => "patch:drinks"
);
permission!(
    /// Delete drinks.
    DeleteDrinks => "delete:drinks"
);

/// Verify the request's bearer token and require `permission`.
///
/// Verifier failures propagate unchanged. An empty `permission` only
/// requires a valid token.
pub async fn authorize(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
    permission: &str,
) -> Result<AuthContext, AuthError> {
    let context = verifier.verify_headers(headers).await.inspect_err(|error| {
        tracing::debug!(error = %error, "bearer token rejected");
    })?;

    if !permission.is_empty() && !context.has_permission(permission) {
        tracing::debug!(
            subject = ?context.subject,
            required = permission,
            "token lacks required permission"
        );
        return Err(AuthError::PermissionDenied);
    }

    Ok(context)
}

/// Extractor for a caller holding permission `P`.
#[derive(Debug)]
pub struct Authorized<P> {
    pub context: AuthContext,
    permission: PhantomData<fn() -> P>,
}

impl<P> Authorized<P> {
    const fn new(context: AuthContext) -> Self {
        Self {
            context,
            permission: PhantomData,
        }
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: Permission,
    Arc<TokenVerifier>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let context = authorize(&verifier, &parts.headers, P::NAME).await?;
        Ok(Self::new(context))
    }
}

/// Extractor for a JSON body `T` submitted by a caller holding permission `P`.
///
/// The body is parsed and validated before the token is looked at, so a bad
/// body is rejected with 400 whatever the credentials.
#[derive(Debug)]
pub struct AuthorizedJson<P, T> {
    pub context: AuthContext,
    pub body: T,
    permission: PhantomData<fn() -> P>,
}

impl<S, P, T> FromRequest<S> for AuthorizedJson<P, T>
where
    S: Send + Sync,
    P: Permission,
    T: TryFrom<Value> + Send,
    ApiError: From<T::Error>,
    Arc<TokenVerifier>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(body_rejected)?;
        let body = T::try_from(value)?;

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let context = authorize(&verifier, &headers, P::NAME).await?;

        Ok(Self {
            context,
            body,
            permission: PhantomData,
        })
    }
}

/// A body that is absent, not labelled JSON, or not parseable is a 400.
pub fn body_rejected(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection, "rejected request body");
    ApiError::bad_request("Missing JSON body")
}

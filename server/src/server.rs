//! Application state and routing.

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::http::{Method, header};
use axum::routing::{get, patch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenVerifier;
use crate::error::ApiError;
use crate::handlers::{create_drink, delete_drink, list_drink_details, list_drinks, update_drink};
use crate::storage::DrinkStore;

/// Shared state handed to every handler.
///
/// Both members are built once at startup; there is no other process-wide
/// state.
#[derive(Clone)]
pub struct AppState {
    pub store: DrinkStore,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    #[must_use]
    pub const fn new(store: DrinkStore, verifier: Arc<TokenVerifier>) -> Self {
        Self { store, verifier }
    }
}

impl FromRef<AppState> for DrinkStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.verifier)
    }
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(list_drink_details))
        .route("/drinks/{id}", patch(update_drink).delete(delete_drink))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The browser frontend is served from another origin.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

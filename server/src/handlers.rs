//! Drink endpoints.
//!
//! Life of a request:
//! 1. Item routes parse the `{id}` segment first; a non-integer id is 404.
//! 2. Create validates its body, then checks the token and permission.
//!    Update and delete check the token and permission, then the id exists,
//!    and only then (update) read the body.
//! 3. The handler runs one store operation.
//! 4. The result is wrapped in `{"success": true, ...}`; failures become an
//!    `ApiError` response.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use serde::Serialize;
use serde_json::Value;

use crate::auth::{
    Authorized, AuthorizedJson, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks,
    body_rejected,
};
use crate::error::ApiError;
use crate::storage::DrinkStore;
use crate::types::{Drink, DrinkId, DrinkSummary, NewDrink};

/// Body of both listings: `{"success": true, "drinks": [...]}`.
#[derive(Debug, Serialize)]
pub struct DrinkList<T> {
    success: bool,
    drinks: Vec<T>,
}

/// Body of create and update: the affected drink in detail form.
///
/// The key is `drinks` even though it holds a single drink.
#[derive(Debug, Serialize)]
pub struct DrinkResponse {
    success: bool,
    drinks: Drink,
}

/// Body of a successful delete, carrying the removed id.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    success: bool,
    delete: DrinkId,
}

/// The `{id}` segment of an item route.
///
/// Rejects with 404 before any other extractor runs, so a non-integer id
/// never reaches token verification or body parsing.
#[derive(Debug, Clone, Copy)]
pub struct DrinkPath(pub DrinkId);

impl<S> FromRequestParts<S> for DrinkPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "unparseable drink id");
                ApiError::NotFound
            })?;
        Ok(Self(DrinkId::from(id)))
    }
}

/// `GET /drinks`: public listing in summary form.
pub async fn list_drinks(
    State(store): State<DrinkStore>,
) -> Result<Json<DrinkList<DrinkSummary>>, ApiError> {
    let drinks = store.list().await?;
    Ok(Json(DrinkList {
        success: true,
        drinks: drinks.into_iter().map(DrinkSummary::from).collect(),
    }))
}

/// `GET /drinks-detail`: full listing.
pub async fn list_drink_details(
    State(store): State<DrinkStore>,
    _auth: Authorized<GetDrinksDetail>,
) -> Result<Json<DrinkList<Drink>>, ApiError> {
    let drinks = store.list().await?;
    Ok(Json(DrinkList {
        success: true,
        drinks,
    }))
}

/// `POST /drinks`
pub async fn create_drink(
    State(store): State<DrinkStore>,
    request: AuthorizedJson<PostDrinks, NewDrink>,
) -> Result<Json<DrinkResponse>, ApiError> {
    let drink = store.insert(&request.body).await?;
    tracing::info!(id = %drink.id, subject = ?request.context.subject, "created drink");
    Ok(Json(DrinkResponse {
        success: true,
        drinks: drink,
    }))
}

/// `PATCH /drinks/{id}`
///
/// An unknown id is 404 whatever the body holds.
pub async fn update_drink(
    State(store): State<DrinkStore>,
    DrinkPath(id): DrinkPath,
    auth: Authorized<PatchDrinks>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DrinkResponse>, ApiError> {
    if store.get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let Json(body) = body.map_err(body_rejected)?;
    let update = NewDrink::try_from(body)?;

    // The drink may have been deleted since the lookup.
    let drink = store.update(id, &update).await?.ok_or(ApiError::NotFound)?;
    tracing::info!(id = %drink.id, subject = ?auth.context.subject, "updated drink");
    Ok(Json(DrinkResponse {
        success: true,
        drinks: drink,
    }))
}

/// `DELETE /drinks/{id}`
pub async fn delete_drink(
    State(store): State<DrinkStore>,
    DrinkPath(id): DrinkPath,
    auth: Authorized<DeleteDrinks>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !store.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id = %id, subject = ?auth.context.subject, "deleted drink");
    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}

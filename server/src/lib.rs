#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// Life of a request:
// 1. axum routes the request; CORS and tracing layers wrap every route
// 2. Item routes parse `{id}` first (`DrinkPath`, 404 on failure)
// 3. Protected routes extract an `Authorized<P>` / `AuthorizedJson<P, T>`:
//     - Validate the JSON body first (create only)
//     - Verify the bearer token against the cached signing-key set
//     - Check the route's permission
// 4. The handler runs its store calls (update checks the id exists before
//    reading the body)
// 5. The result or the `ApiError` is rendered as JSON
//
// System components:
//  - SQLite drinks table (sqlx)
//  - Token verifier + key-set cache
//  - Authorization gate (typed permission extractors)

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod storage;
pub mod types;


pub use server::{AppState, router};

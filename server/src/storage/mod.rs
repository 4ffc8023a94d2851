//! Drink persistence.
//!
//! Drinks live in a single SQLite table accessed through a `sqlx` pool. Every
//! mutation runs in its own transaction that either commits or is explicitly
//! rolled back before the error reaches the caller.

mod database;
mod transaction;

pub use database::{DrinkStore, StoreError};

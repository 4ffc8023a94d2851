//! Commit-or-rollback helper for store transactions.
//!
//! A `sqlx` transaction that is dropped rolls back on its own, but only once
//! the connection is returned to the pool. Store operations end every
//! transaction explicitly through [`finish`] so a failed mutation is undone
//! before its error is surfaced.

use sqlx::{Sqlite, Transaction};

use super::StoreError;

/// Commit `tx` if `outcome` is `Ok`, roll it back otherwise.
///
/// # Post-conditions
/// - On `Ok`, the work done in `tx` is durable.
/// - On `Err`, nothing done in `tx` is visible to other connections.
pub async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    outcome: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            tracing::warn!(error = %error, "rolling back drink store transaction");
            if let Err(rollback_error) = tx.rollback().await {
                tracing::error!(error = %rollback_error, "transaction rollback failed");
            }
            Err(error)
        }
    }
}

//! SQLite-backed drink store.
//!
//! # Pre-conditions
//! - `migrate` (or `reset`) has run on the pool before any other operation.
//!
//! # Invariants
//! - Every stored `recipe` is the JSON encoding of a non-empty ingredient list.
//! - Ids come from `AUTOINCREMENT` and are never reused after a delete.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, SqliteConnection};
use thiserror::Error;

use super::transaction::finish;
use crate::types::recipe::{decode_recipe, encode_recipe};
use crate::types::{Drink, DrinkId, Ingredient, NewDrink};

/// Maximum pooled connections for file-backed databases.
const MAX_CONNECTIONS: u32 = 5;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS drinks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    recipe TEXT NOT NULL
)";

/// Errors raised by the drink store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed an operation.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A recipe could not be serialized for storage.
    #[error("recipe could not be serialized: {0}")]
    Encode(#[source] serde_json::Error),
    /// A stored recipe is no longer valid JSON for an ingredient list.
    #[error("stored recipe for drink {id} is corrupt: {source}")]
    CorruptRecipe {
        id: DrinkId,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let id = DrinkId(row.id);
        let recipe =
            decode_recipe(&row.recipe).map_err(|source| StoreError::CorruptRecipe { id, source })?;
        Ok(Self {
            id,
            title: row.title,
            recipe,
        })
    }
}

/// Handle to the drinks table.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DrinkStore {
    pool: SqlitePool,
}

impl DrinkStore {
    /// Open a pool for the given SQLite URL, creating the file if needed.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create the drinks table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop and recreate the drinks table, then seed it with a single drink.
    ///
    /// All existing records are lost.
    pub async fn reset(&self) -> Result<Drink, StoreError> {
        let seed = NewDrink {
            title: "water".to_string(),
            recipe: vec![Ingredient {
                name: "water".to_string(),
                color: "blue".to_string(),
                parts: 1,
            }],
        };

        let mut tx = self.pool.begin().await?;
        let outcome = async {
            sqlx::query("DROP TABLE IF EXISTS drinks")
                .execute(&mut *tx)
                .await?;
            sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
            insert_row(&mut tx, &seed).await
        }
        .await;
        finish(tx, outcome).await
    }

    /// All drinks in ascending id order.
    pub async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let rows: Vec<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Drink::try_from).collect()
    }

    /// Look up a single drink.
    pub async fn get(&self, id: DrinkId) -> Result<Option<Drink>, StoreError> {
        let row: Option<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = ?")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Drink::try_from).transpose()
    }

    /// Insert a drink and return it with its assigned id.
    pub async fn insert(&self, drink: &NewDrink) -> Result<Drink, StoreError> {
        let mut tx = self.pool.begin().await?;
        let outcome = insert_row(&mut tx, drink).await;
        finish(tx, outcome).await
    }

    /// Replace the title and recipe of an existing drink.
    ///
    /// Returns `None` when no drink has this id; nothing is written then.
    pub async fn update(&self, id: DrinkId, drink: &NewDrink) -> Result<Option<Drink>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let outcome = async {
            let recipe = encode_recipe(&drink.recipe).map_err(StoreError::Encode)?;
            let result = sqlx::query("UPDATE drinks SET title = ?, recipe = ? WHERE id = ?")
                .bind(&drink.title)
                .bind(recipe)
                .bind(id.get())
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Ok(None);
            }
            Ok::<_, StoreError>(Some(Drink {
                id,
                title: drink.title.clone(),
                recipe: drink.recipe.clone(),
            }))
        }
        .await;
        finish(tx, outcome).await
    }

    /// Delete a drink. Returns `false` when no drink has this id.
    pub async fn delete(&self, id: DrinkId) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let outcome = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(StoreError::from);
        finish(tx, outcome).await
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn insert_row(conn: &mut SqliteConnection, drink: &NewDrink) -> Result<Drink, StoreError> {
    let recipe = encode_recipe(&drink.recipe).map_err(StoreError::Encode)?;
    let result = sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
        .bind(&drink.title)
        .bind(recipe)
        .execute(conn)
        .await?;
    Ok(Drink {
        id: DrinkId(result.last_insert_rowid()),
        title: drink.title.clone(),
        recipe: drink.recipe.clone(),
    })
}

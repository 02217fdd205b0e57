//! Database operations for the `targets` table.

use chrono::{DateTime, Utc};
use pricewatch_core::Target;
use sqlx::{SqliteConnection, SqlitePool};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `targets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TargetRow {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub locator: String,
    pub created_at: DateTime<Utc>,
}

impl TargetRow {
    #[must_use]
    pub fn into_target(self) -> Target {
        Target::new(self.name, self.location, self.locator)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every stored target in import order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_targets(pool: &SqlitePool) -> Result<Vec<TargetRow>, DbError> {
    let rows = sqlx::query_as::<_, TargetRow>(
        "SELECT id, name, location, locator, created_at \
         FROM targets \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Appends `targets` to the catalog in a single transaction.
///
/// Returns the number of rows inserted. Either every target is stored or
/// none is.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_targets(pool: &SqlitePool, targets: &[Target]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let inserted = insert_rows(&mut tx, targets).await?;
    tx.commit().await?;

    tracing::debug!(inserted, "inserted targets");
    Ok(inserted)
}

/// Replaces the whole catalog with `targets` atomically.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete or any insert fails; the previous
/// catalog is left intact in that case.
pub async fn replace_targets(pool: &SqlitePool, targets: &[Target]) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let removed = sqlx::query("DELETE FROM targets")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let inserted = insert_rows(&mut tx, targets).await?;
    tx.commit().await?;

    tracing::debug!(removed, inserted, "replaced targets");
    Ok(inserted)
}

/// Deletes every stored target. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn clear_targets(pool: &SqlitePool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM targets").execute(pool).await?;
    Ok(result.rows_affected())
}

async fn insert_rows(conn: &mut SqliteConnection, targets: &[Target]) -> Result<u64, DbError> {
    let mut inserted: u64 = 0;
    for target in targets {
        let result =
            sqlx::query("INSERT INTO targets (name, location, locator) VALUES (?1, ?2, ?3)")
                .bind(&target.name)
                .bind(&target.location)
                .bind(&target.locator)
                .execute(&mut *conn)
                .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

//! Record store queries: eligibility selection, status transitions, and
//! the filter catalog.
//!
//! Table and column names are compile-time constants from the [`Record`]
//! trait, never user input.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::records::{Record, INDEXED_SENTINEL};

/// Select all records eligible for indexing (status NULL or not the indexed
/// sentinel), ordered by id ascending so repeated runs are deterministic and
/// resumable. `limit` bounds the selection before batching.
pub async fn fetch_eligible<R: Record>(
    pool: &SqlitePool,
    limit: Option<usize>,
) -> Result<Vec<R>> {
    let limit_val = limit.unwrap_or(usize::MAX) as i64;

    let records = sqlx::query_as::<_, R>(&format!(
        "SELECT * FROM {} WHERE index_status IS NULL OR index_status != {} ORDER BY id ASC LIMIT ?",
        R::TABLE,
        INDEXED_SENTINEL
    ))
    .bind(limit_val)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Mark a batch of records as indexed in one transaction. Either every id
/// in the batch transitions or none does.
pub async fn mark_indexed(pool: &SqlitePool, table: &str, ids: &[i64]) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for id in ids {
        sqlx::query(&format!(
            "UPDATE {} SET index_status = {}, updated_at = ? WHERE id = ?",
            table, INDEXED_SENTINEL
        ))
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Reset index_status to NULL for every record of a table. The only
/// supported "delete and rebuild" trigger; there is no per-record reset.
pub async fn reset_index_status(pool: &SqlitePool, table: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(&format!(
        "UPDATE {} SET index_status = NULL, updated_at = ?",
        table
    ))
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// Distinct non-null values of a filterable column, sorted ascending.
pub async fn distinct_values(pool: &SqlitePool, table: &str, column: &str) -> Result<Vec<String>> {
    let values: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL AND {col} != '' ORDER BY {col} ASC",
        col = column,
        table = table
    ))
    .fetch_all(pool)
    .await?;

    Ok(values)
}

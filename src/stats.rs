//! Database statistics and health overview.
//!
//! Provides a quick summary of indexing coverage: record counts per
//! collection, how many are indexed vs. still eligible, vector entry
//! counts, and artifact library totals. Used by `cforge stats` to give
//! confidence that indexing runs are keeping up.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::records::{GenericContent, Job, NewsArticle, Record, INDEXED_SENTINEL};

struct CollectionStats {
    collection: &'static str,
    total: i64,
    indexed: i64,
    eligible: i64,
    vectors: i64,
}

async fn collect<R: Record>(pool: &SqlitePool) -> Result<CollectionStats> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", R::TABLE))
        .fetch_one(pool)
        .await?;

    let indexed: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE index_status = {}",
        R::TABLE,
        INDEXED_SENTINEL
    ))
    .fetch_one(pool)
    .await?;

    let vectors: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM vector_entries WHERE collection = ?")
            .bind(R::COLLECTION)
            .fetch_one(pool)
            .await?;

    Ok(CollectionStats {
        collection: R::COLLECTION,
        total,
        indexed,
        eligible: total - indexed,
        vectors,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config, pool: &SqlitePool) -> Result<()> {
    let collections = vec![
        collect::<Job>(pool).await?,
        collect::<NewsArticle>(pool).await?,
        collect::<GenericContent>(pool).await?,
    ];

    let titles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generated_titles")
        .fetch_one(pool)
        .await?;
    let social: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generated_social")
        .fetch_one(pool)
        .await?;
    let blogs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM generated_blogs")
        .fetch_one(pool)
        .await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Content Forge — Database Stats");
    println!("==============================");
    println!();
    println!("  Database:  {}", config.db.path.display());
    println!("  Size:      {}", format_bytes(db_size));
    println!();
    println!(
        "  {:<12} {:>8} {:>9} {:>9} {:>9}",
        "COLLECTION", "RECORDS", "INDEXED", "ELIGIBLE", "VECTORS"
    );
    println!("  {}", "-".repeat(52));
    for s in &collections {
        println!(
            "  {:<12} {:>8} {:>9} {:>9} {:>9}",
            s.collection, s.total, s.indexed, s.eligible, s.vectors
        );
    }
    println!();
    println!("  Generated titles: {}", titles);
    println!("  Generated social: {}", social);
    println!("  Generated blogs:  {}", blogs);
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

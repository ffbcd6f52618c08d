use anyhow::Result;
use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Source record tables. Records arrive from an external ingestion
    // process with index_status NULL; the indexer is the only writer of
    // index_status.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            company TEXT,
            role TEXT,
            location TEXT,
            sector TEXT,
            salary TEXT,
            experience TEXT,
            education TEXT,
            job_type TEXT,
            description TEXT,
            skills TEXT,
            site_source TEXT,
            index_status INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news_articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            content TEXT,
            category TEXT,
            source TEXT,
            published_at INTEGER,
            index_status INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generic_content (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            body TEXT,
            category TEXT,
            source TEXT,
            index_status INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Vector entries: one live row per indexed record per collection.
    // Re-indexing overwrites via upsert, never appends.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vector_entries (
            collection TEXT NOT NULL,
            record_id INTEGER NOT NULL,
            embedding BLOB NOT NULL,
            text TEXT NOT NULL,
            metadata_json TEXT NOT NULL DEFAULT '{}',
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (collection, record_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Generated artifact library
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generated_titles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            topic TEXT NOT NULL,
            title TEXT NOT NULL,
            filter_sector TEXT,
            filter_category TEXT,
            filter_source TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generated_social (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            topic TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            tone TEXT NOT NULL,
            filter_sector TEXT,
            filter_category TEXT,
            filter_source TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generated_blogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            title TEXT NOT NULL,
            topic TEXT NOT NULL,
            content TEXT NOT NULL,
            summary TEXT NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            word_count INTEGER NOT NULL,
            tone TEXT NOT NULL,
            length TEXT NOT NULL,
            filter_sector TEXT,
            filter_category TEXT,
            filter_source TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_index_status ON jobs(index_status)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_news_articles_index_status ON news_articles(index_status)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_generic_content_index_status ON generic_content(index_status)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_vector_entries_collection ON vector_entries(collection)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_generated_titles_created_at ON generated_titles(created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

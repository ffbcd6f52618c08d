//! Generated artifact library.
//!
//! Every successful generation is recorded here — titles, social posts, and
//! blogs, together with the parameters that produced them — so editors can
//! review and reuse past output. The orchestrator treats these writes as an
//! opaque save step.

use anyhow::Result;
use sqlx::{FromRow, SqlitePool};

/// Filter values a generation request was constrained by. Stored alongside
/// the artifact for provenance.
#[derive(Debug, Clone, Default)]
pub struct GenerationFilters {
    pub sector: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SavedTitle {
    pub id: i64,
    pub collection: String,
    pub topic: String,
    pub title: String,
    pub filter_sector: Option<String>,
    pub filter_category: Option<String>,
    pub filter_source: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SavedSocial {
    pub id: i64,
    pub collection: String,
    pub topic: String,
    pub title: String,
    pub content: String,
    pub tone: String,
    pub filter_sector: Option<String>,
    pub filter_category: Option<String>,
    pub filter_source: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SavedBlog {
    pub id: i64,
    pub collection: String,
    pub title: String,
    pub topic: String,
    pub content: String,
    pub summary: String,
    pub tags_json: String,
    pub word_count: i64,
    pub tone: String,
    pub length: String,
    pub filter_sector: Option<String>,
    pub filter_category: Option<String>,
    pub filter_source: Option<String>,
    pub created_at: i64,
}

pub async fn save_title(
    pool: &SqlitePool,
    collection: &str,
    topic: &str,
    title: &str,
    filters: &GenerationFilters,
) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(
        r#"
        INSERT INTO generated_titles (collection, topic, title, filter_sector, filter_category, filter_source, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(collection)
    .bind(topic)
    .bind(title)
    .bind(&filters.sector)
    .bind(&filters.category)
    .bind(&filters.source)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

#[allow(clippy::too_many_arguments)]
pub async fn save_social(
    pool: &SqlitePool,
    collection: &str,
    topic: &str,
    title: &str,
    content: &str,
    tone: &str,
    filters: &GenerationFilters,
) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let result = sqlx::query(
        r#"
        INSERT INTO generated_social (collection, topic, title, content, tone, filter_sector, filter_category, filter_source, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(collection)
    .bind(topic)
    .bind(title)
    .bind(content)
    .bind(tone)
    .bind(&filters.sector)
    .bind(&filters.category)
    .bind(&filters.source)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

#[allow(clippy::too_many_arguments)]
pub async fn save_blog(
    pool: &SqlitePool,
    collection: &str,
    title: &str,
    topic: &str,
    content: &str,
    summary: &str,
    tags: &[String],
    word_count: usize,
    tone: &str,
    length: &str,
    filters: &GenerationFilters,
) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let tags_json = serde_json::to_string(tags)?;
    let result = sqlx::query(
        r#"
        INSERT INTO generated_blogs (collection, title, topic, content, summary, tags_json, word_count, tone, length, filter_sector, filter_category, filter_source, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(collection)
    .bind(title)
    .bind(topic)
    .bind(content)
    .bind(summary)
    .bind(&tags_json)
    .bind(word_count as i64)
    .bind(tone)
    .bind(length)
    .bind(&filters.sector)
    .bind(&filters.category)
    .bind(&filters.source)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn list_titles(pool: &SqlitePool, limit: i64) -> Result<Vec<SavedTitle>> {
    let titles = sqlx::query_as::<_, SavedTitle>(
        "SELECT * FROM generated_titles ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(titles)
}

pub async fn list_social(pool: &SqlitePool, limit: i64) -> Result<Vec<SavedSocial>> {
    let posts = sqlx::query_as::<_, SavedSocial>(
        "SELECT * FROM generated_social ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(posts)
}

pub async fn list_blogs(pool: &SqlitePool, limit: i64) -> Result<Vec<SavedBlog>> {
    let blogs = sqlx::query_as::<_, SavedBlog>(
        "SELECT * FROM generated_blogs ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(blogs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate;

    async fn test_pool() -> SqlitePool {
        // A single connection keeps every query on the same in-memory database.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_save_and_list_titles_newest_first() {
        let pool = test_pool().await;
        let filters = GenerationFilters {
            sector: Some("Technology".to_string()),
            ..Default::default()
        };

        let first = save_title(&pool, "jobs", "ai hiring", "Title One", &filters)
            .await
            .unwrap();
        let second = save_title(&pool, "jobs", "ai hiring", "Title Two", &filters)
            .await
            .unwrap();
        assert!(second > first);

        let titles = list_titles(&pool, 10).await.unwrap();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[0].title, "Title Two");
        assert_eq!(titles[0].filter_sector.as_deref(), Some("Technology"));
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let pool = test_pool().await;
        for i in 0..5 {
            save_title(
                &pool,
                "news",
                "topic",
                &format!("Title {}", i),
                &GenerationFilters::default(),
            )
            .await
            .unwrap();
        }
        let titles = list_titles(&pool, 3).await.unwrap();
        assert_eq!(titles.len(), 3);
    }

    #[tokio::test]
    async fn test_save_blog_roundtrip() {
        let pool = test_pool().await;
        let id = save_blog(
            &pool,
            "news",
            "Remote Work in 2026",
            "remote work",
            "Body text here.",
            "Summary.",
            &["remote".to_string(), "work".to_string()],
            3,
            "professional",
            "medium",
            &GenerationFilters::default(),
        )
        .await
        .unwrap();

        let blogs = list_blogs(&pool, 10).await.unwrap();
        assert_eq!(blogs.len(), 1);
        assert_eq!(blogs[0].id, id);
        assert_eq!(blogs[0].word_count, 3);
        let tags: Vec<String> = serde_json::from_str(&blogs[0].tags_json).unwrap();
        assert_eq!(tags, vec!["remote", "work"]);
    }
}

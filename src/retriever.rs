//! Filtered similarity retrieval.
//!
//! Embeds the query text and runs a top-k nearest-neighbor query against
//! one collection, constrained by exact-match metadata filters. Ordering is
//! descending similarity; ties fall back to store order, which callers must
//! not rely on.

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::vector_store::{MetadataFilter, SearchHit, VectorIndex};

pub struct Retriever {
    pool: SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(pool: SqlitePool, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { pool, embedder }
    }

    /// Top-k records of `collection` most similar to `query`, restricted to
    /// entries whose metadata matches every filter. Fewer than `top_k`
    /// results are returned when the filtered candidate set is smaller.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
        filters: &[MetadataFilter],
    ) -> Result<Vec<SearchHit>> {
        let index = VectorIndex::open(&self.pool, collection, self.embedder.as_ref()).await?;
        let query_vec = self.embedder.embed_one(query).await?;
        index.query(&self.pool, &query_vec, top_k, filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::{stub_vector, StubProvider};
    use crate::migrate;
    use crate::project::Document;
    use std::collections::BTreeMap;

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

    async fn seed_entry(pool: &SqlitePool, id: i64, text: &str, sector: &str) {
        let provider = StubProvider::new(8);
        let index = VectorIndex::open(pool, "jobs", &provider).await.unwrap();
        let mut metadata = BTreeMap::new();
        metadata.insert("sector".to_string(), sector.to_string());
        let doc = Document {
            id,
            text: text.to_string(),
            metadata,
        };
        index
            .upsert(pool, &doc, &stub_vector(text, 8))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_ranks_exact_text_first() {
        let pool = test_pool().await;
        seed_entry(&pool, 1, "rust backend engineer", "Technology").await;
        seed_entry(&pool, 2, "pediatric nurse", "Healthcare").await;

        let retriever = Retriever::new(pool.clone(), Arc::new(StubProvider::new(8)));
        let hits = retriever
            .search("jobs", "rust backend engineer", 2, &[])
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record_id, 1);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_search_never_exceeds_top_k() {
        let pool = test_pool().await;
        for i in 0..6 {
            seed_entry(&pool, i, &format!("engineer role {}", i), "Technology").await;
        }

        let retriever = Retriever::new(pool.clone(), Arc::new(StubProvider::new(8)));
        let hits = retriever.search("jobs", "engineer", 3, &[]).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_search_filters_conjunction() {
        let pool = test_pool().await;
        seed_entry(&pool, 1, "rust backend engineer", "Technology").await;
        seed_entry(&pool, 2, "pediatric nurse", "Healthcare").await;

        let retriever = Retriever::new(pool.clone(), Arc::new(StubProvider::new(8)));
        let filters = vec![MetadataFilter::new("sector", "Healthcare")];
        let hits = retriever
            .search("jobs", "engineer", 5, &filters)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record_id, 2);
    }

    #[tokio::test]
    async fn test_unmatched_filter_value_yields_empty() {
        let pool = test_pool().await;
        seed_entry(&pool, 1, "rust backend engineer", "Technology").await;

        let retriever = Retriever::new(pool.clone(), Arc::new(StubProvider::new(8)));
        let filters = vec![MetadataFilter::new("sector", "Agriculture")];
        let hits = retriever
            .search("jobs", "engineer", 5, &filters)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}

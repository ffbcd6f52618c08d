//! SQLite-backed vector store.
//!
//! One logical collection per record type, all stored in the
//! `vector_entries` table keyed by `(collection, record_id)`. Similarity is
//! computed in-process with cosine distance over the candidate set, after
//! exact-match metadata filters have narrowed it.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, EmbeddingProvider};
use crate::project::Document;

/// An exact-match predicate over stored metadata. Filters combine as a
/// conjunction; an empty filter list imposes no constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilter {
    pub key: String,
    pub value: String,
}

impl MetadataFilter {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// A ranked similarity hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub record_id: i64,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    pub score: f32,
}

/// Handle to an opened collection.
///
/// `open` is the explicit attach step: it verifies that any existing entries
/// were built with the same model and dimensionality, and is idempotent.
/// Indexing and querying require an opened handle.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    collection: String,
    model: String,
    dims: usize,
}

impl VectorIndex {
    /// Attach to a collection, creating it implicitly on first upsert.
    ///
    /// Fails if the collection already holds entries produced by a
    /// different model or dimensionality — switching providers invalidates
    /// the collection and requires a `reindex`.
    pub async fn open(
        pool: &SqlitePool,
        collection: &str,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let existing = sqlx::query(
            "SELECT model, dims FROM vector_entries WHERE collection = ? LIMIT 1",
        )
        .bind(collection)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = existing {
            let model: String = row.get("model");
            let dims: i64 = row.get("dims");
            if model != provider.model_name() || dims != provider.dims() as i64 {
                bail!(
                    "collection '{}' was built with model '{}' ({} dims) but the configured \
                     provider is '{}' ({} dims); run reindex to rebuild it",
                    collection,
                    model,
                    dims,
                    provider.model_name(),
                    provider.dims()
                );
            }
        }

        Ok(Self {
            collection: collection.to_string(),
            model: provider.model_name().to_string(),
            dims: provider.dims(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Write or overwrite the entry for a record. Exactly one live entry per
    /// record id per collection.
    pub async fn upsert(&self, pool: &SqlitePool, doc: &Document, vector: &[f32]) -> Result<()> {
        let blob = vec_to_blob(vector);
        let metadata_json = serde_json::to_string(&doc.metadata)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO vector_entries (collection, record_id, embedding, text, metadata_json, model, dims, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, record_id) DO UPDATE SET
                embedding = excluded.embedding,
                text = excluded.text,
                metadata_json = excluded.metadata_json,
                model = excluded.model,
                dims = excluded.dims,
                created_at = excluded.created_at
            "#,
        )
        .bind(&self.collection)
        .bind(doc.id)
        .bind(&blob)
        .bind(&doc.text)
        .bind(&metadata_json)
        .bind(&self.model)
        .bind(self.dims as i64)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Top-k nearest neighbors of `query_vec`, constrained by metadata
    /// filters. Results are ordered by descending similarity; a filter key
    /// absent from the stored metadata yields an empty result set rather
    /// than an error.
    pub async fn query(
        &self,
        pool: &SqlitePool,
        query_vec: &[f32],
        top_k: usize,
        filters: &[MetadataFilter],
    ) -> Result<Vec<SearchHit>> {
        let rows = sqlx::query(
            "SELECT record_id, embedding, text, metadata_json FROM vector_entries WHERE collection = ?",
        )
        .bind(&self.collection)
        .fetch_all(pool)
        .await?;

        let mut hits: Vec<SearchHit> = Vec::new();

        for row in &rows {
            let metadata_json: String = row.get("metadata_json");
            let metadata: BTreeMap<String, String> =
                serde_json::from_str(&metadata_json).unwrap_or_default();

            let matches = filters
                .iter()
                .all(|f| metadata.get(&f.key).map(|v| v == &f.value).unwrap_or(false));
            if !matches {
                continue;
            }

            let blob: Vec<u8> = row.get("embedding");
            let vector = blob_to_vec(&blob);
            let score = cosine_similarity(query_vec, &vector);

            hits.push(SearchHit {
                record_id: row.get("record_id"),
                text: row.get("text"),
                metadata,
                score,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);

        Ok(hits)
    }
}

//! Incremental indexing engine.
//!
//! Orchestrates projector → embedding provider → vector store for one
//! record type. The record itself is the checkpoint: `index_status` on the
//! source row is the only durable signal of what has been embedded, so an
//! interrupted run is always safe to re-invoke.
//!
//! Batch-level atomicity bounds wasted work on failure: a failed batch is
//! re-embedded on the next run, while prior successful batches keep their
//! committed status. The vector write itself is outside the status
//! transaction — a crash between the two leaves an entry that the next run
//! overwrites, which is an idempotent recovery, not a correctness violation.

use anyhow::{anyhow, ensure, Result};
use sqlx::SqlitePool;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::project::Projector;
use crate::records::{GenericContent, Job, NewsArticle, Record};
use crate::store;
use crate::vector_store::VectorIndex;

/// Aggregate counters for one indexing run. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub total_processed: u64,
    pub total_indexed: u64,
    pub errors: u64,
}

/// Incremental indexer for one record type.
///
/// Two-phase lifecycle: [`open`](Indexer::open) attaches to the vector
/// collection (idempotent, creates on first use), then
/// [`index`](Indexer::index) / [`reindex`](Indexer::reindex) run against the
/// opened collection.
pub struct Indexer<R> {
    pool: SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
    projector: Projector,
    index: Option<VectorIndex>,
    _record: PhantomData<R>,
}

impl<R: Record> Indexer<R> {
    pub fn new(pool: SqlitePool, embedder: Arc<dyn EmbeddingProvider>, projector: Projector) -> Self {
        Self {
            pool,
            embedder,
            projector,
            index: None,
            _record: PhantomData,
        }
    }

    /// Attach to the record type's vector collection. Idempotent.
    pub async fn open(&mut self) -> Result<()> {
        if self.index.is_none() {
            let index =
                VectorIndex::open(&self.pool, R::COLLECTION, self.embedder.as_ref()).await?;
            self.index = Some(index);
        }
        Ok(())
    }

    fn opened(&self) -> Result<&VectorIndex> {
        self.index.as_ref().ok_or_else(|| {
            anyhow!(
                "collection '{}' is not opened; call open() before indexing",
                R::COLLECTION
            )
        })
    }

    /// Index all eligible records in batches.
    ///
    /// Selection is ordered by id ascending and bounded by `limit` before
    /// batching. Each batch is projected, embedded, written to the vector
    /// store, and only then marked indexed in a single status transaction.
    /// A failing batch rolls back its own status writes, adds its size to
    /// `errors`, and the run continues with the next batch.
    ///
    /// Returns `Ok(stats)` unless the failure was fatal at selection time
    /// (store unreachable, collection not opened).
    pub async fn index(&self, batch_size: usize, limit: Option<usize>) -> Result<IndexStats> {
        ensure!(batch_size >= 1, "batch_size must be >= 1");
        let index = self.opened()?;

        let records: Vec<R> = store::fetch_eligible(&self.pool, limit).await?;
        let mut stats = IndexStats::default();

        if records.is_empty() {
            info!(collection = R::COLLECTION, "no eligible records to index");
            return Ok(stats);
        }

        info!(
            collection = R::COLLECTION,
            eligible = records.len(),
            "starting indexing run"
        );

        for batch in records.chunks(batch_size) {
            stats.total_processed += batch.len() as u64;

            match self.index_batch(index, batch).await {
                Ok(()) => {
                    stats.total_indexed += batch.len() as u64;
                    info!(
                        collection = R::COLLECTION,
                        batch = batch.len(),
                        "batch indexed"
                    );
                }
                Err(e) => {
                    stats.errors += batch.len() as u64;
                    warn!(
                        collection = R::COLLECTION,
                        batch = batch.len(),
                        error = %e,
                        "batch failed; records remain eligible for the next run"
                    );
                }
            }
        }

        info!(
            collection = R::COLLECTION,
            processed = stats.total_processed,
            indexed = stats.total_indexed,
            errors = stats.errors,
            "indexing run complete"
        );

        Ok(stats)
    }

    /// Force recomputation of the whole collection: reset every record's
    /// index_status to NULL, commit, then run the normal incremental path.
    /// Deliberately all-or-nothing at the selection level.
    pub async fn reindex(&self, batch_size: usize) -> Result<IndexStats> {
        self.opened()?;
        store::reset_index_status(&self.pool, R::TABLE).await?;
        info!(collection = R::COLLECTION, "index status reset; rebuilding");
        self.index(batch_size, None).await
    }

    /// Project, embed, and store one batch, then commit the status flip for
    /// every record in it. Any error propagates before the status commit,
    /// leaving the batch's records eligible.
    async fn index_batch(&self, index: &VectorIndex, batch: &[R]) -> Result<()> {
        let mut docs = Vec::with_capacity(batch.len());
        for record in batch {
            docs.push(self.projector.project(record)?);
        }

        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        ensure!(
            vectors.len() == docs.len(),
            "embedding count mismatch: {} documents, {} vectors",
            docs.len(),
            vectors.len()
        );

        for (doc, vector) in docs.iter().zip(vectors.iter()) {
            index.upsert(&self.pool, doc, vector).await?;
        }

        let ids: Vec<i64> = batch.iter().map(|r| r.id()).collect();
        store::mark_indexed(&self.pool, R::TABLE, &ids).await?;

        Ok(())
    }
}

/// Run an incremental index pass over every record type, isolating fatal
/// errors per collection so one broken collection does not stop the rest.
pub async fn index_all_collections(
    pool: &SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
    projector: &Projector,
    batch_size: usize,
    limit: Option<usize>,
) -> Vec<(&'static str, Result<IndexStats>)> {
    let mut results = Vec::new();

    results.push((
        Job::COLLECTION,
        index_one::<Job>(pool, embedder.clone(), projector, batch_size, limit).await,
    ));
    results.push((
        NewsArticle::COLLECTION,
        index_one::<NewsArticle>(pool, embedder.clone(), projector, batch_size, limit).await,
    ));
    results.push((
        GenericContent::COLLECTION,
        index_one::<GenericContent>(pool, embedder, projector, batch_size, limit).await,
    ));

    results
}

async fn index_one<R: Record>(
    pool: &SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
    projector: &Projector,
    batch_size: usize,
    limit: Option<usize>,
) -> Result<IndexStats> {
    let mut indexer: Indexer<R> = Indexer::new(pool.clone(), embedder, projector.clone());
    indexer.open().await?;
    indexer.index(batch_size, limit).await
}

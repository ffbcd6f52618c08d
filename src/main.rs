//! # Content Forge CLI (`cforge`)
//!
//! The `cforge` binary is the thin collaborator layer over the indexing and
//! generation core. It provides commands for database initialization,
//! incremental indexing, filtered search, content generation, and inspecting
//! the artifact library.
//!
//! ## Usage
//!
//! ```bash
//! cforge --config ./config/forge.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cforge init` | Create the SQLite database and schema |
//! | `cforge index <collection\|all>` | Embed eligible records incrementally |
//! | `cforge reindex <collection>` | Reset and rebuild a whole collection |
//! | `cforge search <collection> "<query>"` | Filtered similarity search |
//! | `cforge generate titles\|social\|blog` | Retrieval-grounded generation |
//! | `cforge library <titles\|social\|blogs>` | List saved artifacts |
//! | `cforge filters <collection>` | Show available filter values |
//! | `cforge stats` | Indexing coverage overview |

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use content_forge::artifacts::{self, GenerationFilters};
use content_forge::config::{self, Config};
use content_forge::db;
use content_forge::embedding::{self, EmbeddingProvider};
use content_forge::generate::GenerationEngine;
use content_forge::indexer::{self, IndexStats, Indexer};
use content_forge::llm;
use content_forge::migrate;
use content_forge::project::Projector;
use content_forge::records::{self, GenericContent, Job, NewsArticle, Record};
use content_forge::retriever::Retriever;
use content_forge::stats;
use content_forge::store;
use content_forge::vector_store::MetadataFilter;

/// Content Forge — incremental vector indexing and retrieval-augmented
/// content generation for editorial records.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/forge.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cforge",
    about = "Content Forge — incremental vector indexing and retrieval-augmented content generation",
    version,
    long_about = "Content Forge converts structured records (job postings, news articles, generic \
    content) into per-collection vector indexes, and answers content-generation requests by \
    retrieving semantically relevant records narrowed by exact-match metadata filters."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/forge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables (record
    /// tables, vector entries, artifact library). Idempotent.
    Init,

    /// Incrementally index eligible records of a collection.
    ///
    /// Selects records whose index status is unset or stale, embeds them in
    /// batches, and marks each batch indexed only after its vector writes
    /// succeed. A failed batch is retried on the next run.
    Index {
        /// Collection to index: `jobs`, `news`, `content`, or `all`.
        collection: String,

        /// Records per batch (status commits are batch-atomic).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Maximum number of records to select for this run.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Reset a collection's index status and rebuild it from scratch.
    ///
    /// The only path that forces recomputation of already-indexed records.
    /// Required after changing the embedding provider, model, or dims.
    Reindex {
        /// Collection to rebuild: `jobs`, `news`, or `content`.
        collection: String,

        /// Records per batch.
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Search a collection by semantic similarity.
    ///
    /// Results are ranked by cosine similarity and narrowed by exact-match
    /// metadata filters before ranking.
    Search {
        /// Collection to search: `jobs`, `news`, or `content`.
        collection: String,

        /// The query text.
        query: String,

        /// Metadata filters as `key=value` pairs (exact match, ANDed).
        #[arg(long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,

        /// Maximum number of results.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Generate content grounded in indexed records.
    Generate {
        #[command(subcommand)]
        action: GenerateAction,
    },

    /// List saved generated artifacts.
    Library {
        /// Artifact kind: `titles`, `social`, or `blogs`.
        kind: String,

        /// Maximum number of artifacts to list.
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Show the distinct filter values available for a collection.
    Filters {
        /// Collection: `jobs`, `news`, or `content`.
        collection: String,
    },

    /// Show record counts, indexing coverage, and artifact totals.
    Stats,
}

/// Generation subcommands.
#[derive(Subcommand)]
enum GenerateAction {
    /// Generate blog title suggestions for a topic.
    Titles {
        /// Collection to retrieve context from.
        #[arg(long)]
        collection: String,

        /// Topic to generate titles about.
        #[arg(long)]
        topic: String,

        /// Number of titles to request.
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Restrict context to a job sector.
        #[arg(long)]
        sector: Option<String>,

        /// Restrict context to a news/content category.
        #[arg(long)]
        category: Option<String>,

        /// Restrict context to a news/content source.
        #[arg(long)]
        source: Option<String>,
    },

    /// Generate a social media post for a chosen title.
    Social {
        #[arg(long)]
        collection: String,

        #[arg(long)]
        topic: String,

        /// The title the post should promote.
        #[arg(long)]
        title: String,

        /// Writing tone.
        #[arg(long, default_value = "professional")]
        tone: String,

        #[arg(long)]
        sector: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        source: Option<String>,
    },

    /// Generate a full blog post for a chosen title.
    Blog {
        #[arg(long)]
        collection: String,

        /// The blog title.
        #[arg(long)]
        title: String,

        #[arg(long)]
        topic: String,

        /// Writing tone.
        #[arg(long, default_value = "professional")]
        tone: String,

        /// Length preset: `short`, `medium`, or `long`.
        #[arg(long, default_value = "medium")]
        length: String,

        #[arg(long)]
        sector: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        source: Option<String>,
    },
}

/// Parse a `key=value` pair for `--filter` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Index {
            collection,
            batch_size,
            limit,
        } => {
            run_index(&cfg, &collection, batch_size, limit).await?;
        }
        Commands::Reindex {
            collection,
            batch_size,
        } => {
            run_reindex(&cfg, &collection, batch_size).await?;
        }
        Commands::Search {
            collection,
            query,
            filters,
            top_k,
        } => {
            run_search(&cfg, &collection, &query, filters, top_k).await?;
        }
        Commands::Generate { action } => {
            run_generate(&cfg, action).await?;
        }
        Commands::Library { kind, limit } => {
            run_library(&cfg, &kind, limit).await?;
        }
        Commands::Filters { collection } => {
            run_filters(&cfg, &collection).await?;
        }
        Commands::Stats => {
            let pool = db::connect(&cfg).await?;
            stats::run_stats(&cfg, &pool).await?;
            pool.close().await;
        }
    }

    Ok(())
}

fn require_embedding(cfg: &Config) -> Result<()> {
    if !cfg.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }
    Ok(())
}

fn build_embedder(cfg: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(embedding::create_provider(&cfg.embedding)?.into())
}

async fn run_index(
    cfg: &Config,
    collection: &str,
    batch_size: Option<usize>,
    limit: Option<usize>,
) -> Result<()> {
    if collection != "all" {
        validate_collection(collection)?;
    }
    require_embedding(cfg)?;
    let pool = db::connect(cfg).await?;
    let embedder = build_embedder(cfg)?;
    let projector = Projector::from_config(&cfg.projector)?;
    let batch_size = batch_size.unwrap_or(cfg.indexing.batch_size);

    if collection == "all" {
        let results =
            indexer::index_all_collections(&pool, embedder, &projector, batch_size, limit).await;
        for (name, result) in results {
            match result {
                Ok(stats) => print_stats(&format!("index {}", name), &stats),
                Err(e) => {
                    println!("index {}", name);
                    println!("  error: {}", e);
                }
            }
        }
    } else {
        let stats = match collection {
            Job::COLLECTION => {
                index_one::<Job>(&pool, embedder, projector, batch_size, limit, false).await?
            }
            NewsArticle::COLLECTION => {
                index_one::<NewsArticle>(&pool, embedder, projector, batch_size, limit, false)
                    .await?
            }
            GenericContent::COLLECTION => {
                index_one::<GenericContent>(&pool, embedder, projector, batch_size, limit, false)
                    .await?
            }
            other => bail!("Unknown collection: '{}'", other),
        };
        print_stats(&format!("index {}", collection), &stats);
    }

    println!("ok");
    pool.close().await;
    Ok(())
}

async fn run_reindex(cfg: &Config, collection: &str, batch_size: Option<usize>) -> Result<()> {
    validate_collection(collection)?;
    require_embedding(cfg)?;
    let pool = db::connect(cfg).await?;
    let embedder = build_embedder(cfg)?;
    let projector = Projector::from_config(&cfg.projector)?;
    let batch_size = batch_size.unwrap_or(cfg.indexing.batch_size);

    let stats = match collection {
        Job::COLLECTION => {
            index_one::<Job>(&pool, embedder, projector, batch_size, None, true).await?
        }
        NewsArticle::COLLECTION => {
            index_one::<NewsArticle>(&pool, embedder, projector, batch_size, None, true).await?
        }
        GenericContent::COLLECTION => {
            index_one::<GenericContent>(&pool, embedder, projector, batch_size, None, true).await?
        }
        other => bail!("Unknown collection: '{}'", other),
    };

    print_stats(&format!("reindex {}", collection), &stats);
    println!("ok");
    pool.close().await;
    Ok(())
}

async fn index_one<R: Record>(
    pool: &SqlitePool,
    embedder: Arc<dyn EmbeddingProvider>,
    projector: Projector,
    batch_size: usize,
    limit: Option<usize>,
    full: bool,
) -> Result<IndexStats> {
    let mut indexer: Indexer<R> = Indexer::new(pool.clone(), embedder, projector);
    indexer.open().await?;
    if full {
        indexer.reindex(batch_size).await
    } else {
        indexer.index(batch_size, limit).await
    }
}

fn print_stats(heading: &str, stats: &IndexStats) {
    println!("{}", heading);
    println!("  processed: {}", stats.total_processed);
    println!("  indexed:   {}", stats.total_indexed);
    println!("  errors:    {}", stats.errors);
}

async fn run_search(
    cfg: &Config,
    collection: &str,
    query: &str,
    filters: Vec<(String, String)>,
    top_k: Option<usize>,
) -> Result<()> {
    validate_collection(collection)?;
    require_embedding(cfg)?;

    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let pool = db::connect(cfg).await?;
    let embedder = build_embedder(cfg)?;
    let retriever = Retriever::new(pool.clone(), embedder);
    let top_k = top_k.unwrap_or(cfg.retrieval.top_k);

    let filters: Vec<MetadataFilter> = filters
        .into_iter()
        .map(|(key, value)| MetadataFilter { key, value })
        .collect();

    let hits = retriever.search(collection, query, top_k, &filters).await?;

    if hits.is_empty() {
        println!("No results.");
        pool.close().await;
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let excerpt: String = hit.text.chars().take(160).collect();
        println!("{}. [{:.3}] record {}", i + 1, hit.score, hit.record_id);
        println!("    excerpt: \"{}\"", excerpt.replace('\n', " "));
        let tagged: Vec<String> = hit
            .metadata
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !tagged.is_empty() {
            println!("    metadata: {}", tagged.join(", "));
        }
        println!();
    }

    pool.close().await;
    Ok(())
}

async fn run_generate(cfg: &Config, action: GenerateAction) -> Result<()> {
    require_embedding(cfg)?;
    if !cfg.llm.is_enabled() {
        bail!("Generation model is disabled. Set [llm] provider in config.");
    }

    let pool = db::connect(cfg).await?;
    let embedder = build_embedder(cfg)?;
    let retriever = Retriever::new(pool.clone(), embedder);
    let model: Arc<dyn llm::GenerationModel> = llm::create_model(&cfg.llm)?.into();
    let engine = GenerationEngine::new(pool.clone(), retriever, model);

    match action {
        GenerateAction::Titles {
            collection,
            topic,
            count,
            sector,
            category,
            source,
        } => {
            validate_collection(&collection)?;
            let filters = GenerationFilters {
                sector,
                category,
                source,
            };
            let titles = engine
                .generate_titles(&collection, &topic, &filters, count)
                .await?;

            if titles.is_empty() {
                println!("No titles generated.");
            } else {
                for (i, title) in titles.iter().enumerate() {
                    println!("{}. {}", i + 1, title);
                }
            }
        }
        GenerateAction::Social {
            collection,
            topic,
            title,
            tone,
            sector,
            category,
            source,
        } => {
            validate_collection(&collection)?;
            let filters = GenerationFilters {
                sector,
                category,
                source,
            };
            let content = engine
                .generate_social(&collection, &topic, &title, &tone, &filters)
                .await?;

            if content.is_empty() {
                println!("No content generated.");
            } else {
                println!("{}", content);
            }
        }
        GenerateAction::Blog {
            collection,
            title,
            topic,
            tone,
            length,
            sector,
            category,
            source,
        } => {
            validate_collection(&collection)?;
            let filters = GenerationFilters {
                sector,
                category,
                source,
            };
            let blog = engine
                .generate_blog(&collection, &title, &topic, &tone, &length, &filters)
                .await?;

            if blog.content.is_empty() {
                println!("No content generated.");
            } else {
                println!("{}", blog.content);
                println!();
                println!("  word count: {}", blog.word_count);
                if !blog.tags.is_empty() {
                    println!("  tags: {}", blog.tags.join(", "));
                }
                println!("  summary: {}", blog.summary);
            }
        }
    }

    pool.close().await;
    Ok(())
}

async fn run_library(cfg: &Config, kind: &str, limit: i64) -> Result<()> {
    let pool = db::connect(cfg).await?;

    match kind {
        "titles" => {
            let titles = artifacts::list_titles(&pool, limit).await?;
            if titles.is_empty() {
                println!("No saved titles.");
            }
            for t in titles {
                println!("#{} [{}] {} (topic: {})", t.id, t.collection, t.title, t.topic);
            }
        }
        "social" => {
            let posts = artifacts::list_social(&pool, limit).await?;
            if posts.is_empty() {
                println!("No saved social posts.");
            }
            for p in posts {
                println!("#{} [{}] {} ({})", p.id, p.collection, p.title, p.tone);
                println!("    {}", p.content);
            }
        }
        "blogs" => {
            let blogs = artifacts::list_blogs(&pool, limit).await?;
            if blogs.is_empty() {
                println!("No saved blogs.");
            }
            for b in blogs {
                println!(
                    "#{} [{}] {} ({} words, {})",
                    b.id, b.collection, b.title, b.word_count, b.length
                );
                println!("    {}", b.summary);
            }
        }
        other => bail!("Unknown artifact kind: '{}'. Available: titles, social, blogs", other),
    }

    pool.close().await;
    Ok(())
}

async fn run_filters(cfg: &Config, collection: &str) -> Result<()> {
    let pool = db::connect(cfg).await?;

    let (table, columns): (&str, &[&str]) = match collection {
        Job::COLLECTION => (Job::TABLE, Job::FILTER_COLUMNS),
        NewsArticle::COLLECTION => (NewsArticle::TABLE, NewsArticle::FILTER_COLUMNS),
        GenericContent::COLLECTION => (GenericContent::TABLE, GenericContent::FILTER_COLUMNS),
        other => bail!("Unknown collection: '{}'. Available: jobs, news, content", other),
    };

    println!("filters {}", collection);
    for column in columns {
        let values = store::distinct_values(&pool, table, column).await?;
        if values.is_empty() {
            println!("  {}: (none)", column);
        } else {
            println!("  {}: {}", column, values.join(", "));
        }
    }

    pool.close().await;
    Ok(())
}

fn validate_collection(collection: &str) -> Result<()> {
    if records::ALL_COLLECTIONS.contains(&collection) {
        Ok(())
    } else {
        bail!(
            "Unknown collection: '{}'. Available: {}",
            collection,
            records::ALL_COLLECTIONS.join(", ")
        )
    }
}

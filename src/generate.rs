//! Generation orchestration.
//!
//! Each operation retrieves a bounded context from the vector store
//! (filtered by exact-match metadata predicates), renders a deterministic
//! prompt around it, makes a single generation-model call, parses the
//! response into its structured shape, and records the result in the
//! artifact library.
//!
//! Zero parsed titles is a valid, signaling outcome — the model produced
//! nothing usable — and is logged rather than raised.

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

use crate::artifacts::{self, GenerationFilters};
use crate::llm::GenerationModel;
use crate::parse;
use crate::retriever::Retriever;
use crate::vector_store::{MetadataFilter, SearchHit};

/// Context size for title and blog generation.
const TITLE_TOP_K: usize = 10;
const BLOG_TOP_K: usize = 10;
/// Social posts are short; a smaller context keeps them focused.
const SOCIAL_TOP_K: usize = 5;

/// A generated blog post with derived fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogResult {
    pub content: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub word_count: usize,
}

pub struct GenerationEngine {
    pool: SqlitePool,
    retriever: Retriever,
    model: Arc<dyn GenerationModel>,
}

impl GenerationEngine {
    pub fn new(pool: SqlitePool, retriever: Retriever, model: Arc<dyn GenerationModel>) -> Self {
        Self {
            pool,
            retriever,
            model,
        }
    }

    /// Generate up to `count` blog title suggestions grounded in records
    /// matching `topic` and `filters`. Every parsed title is saved.
    pub async fn generate_titles(
        &self,
        collection: &str,
        topic: &str,
        filters: &GenerationFilters,
        count: usize,
    ) -> Result<Vec<String>> {
        let hits = self
            .retriever
            .search(collection, topic, TITLE_TOP_K, &metadata_filters(filters))
            .await?;

        let prompt = title_prompt(topic, count, &hits);
        let response = self.model.complete(&prompt).await?;
        let titles = parse::parse_titles(&response, count);

        if titles.is_empty() {
            warn!(collection, topic, "generation returned no parsable titles");
            return Ok(titles);
        }

        for title in &titles {
            artifacts::save_title(&self.pool, collection, topic, title, filters).await?;
        }

        Ok(titles)
    }

    /// Generate a short social media post for a chosen title.
    pub async fn generate_social(
        &self,
        collection: &str,
        topic: &str,
        title: &str,
        tone: &str,
        filters: &GenerationFilters,
    ) -> Result<String> {
        let hits = self
            .retriever
            .search(collection, topic, SOCIAL_TOP_K, &metadata_filters(filters))
            .await?;

        let prompt = social_prompt(topic, title, tone, &hits);
        let response = self.model.complete(&prompt).await?;
        let content = response.trim().to_string();

        if content.is_empty() {
            warn!(collection, topic, "generation returned an empty social post");
            return Ok(content);
        }

        artifacts::save_social(&self.pool, collection, topic, title, &content, tone, filters)
            .await?;

        Ok(content)
    }

    /// Generate a full blog post for a chosen title.
    pub async fn generate_blog(
        &self,
        collection: &str,
        title: &str,
        topic: &str,
        tone: &str,
        length: &str,
        filters: &GenerationFilters,
    ) -> Result<BlogResult> {
        let hits = self
            .retriever
            .search(collection, topic, BLOG_TOP_K, &metadata_filters(filters))
            .await?;

        let target_words = length_to_words(length);
        let prompt = blog_prompt(title, topic, tone, target_words, &hits);
        let response = self.model.complete(&prompt).await?;

        let sections = parse::parse_blog(&response);
        let summary = if sections.summary.is_empty() {
            parse::fallback_summary(&sections.content)
        } else {
            sections.summary
        };
        let word_count = parse::word_count(&sections.content);

        let result = BlogResult {
            content: sections.content,
            tags: sections.tags,
            summary,
            word_count,
        };

        if result.content.is_empty() {
            warn!(collection, title, "generation returned an empty blog body");
            return Ok(result);
        }

        artifacts::save_blog(
            &self.pool,
            collection,
            title,
            topic,
            &result.content,
            &result.summary,
            &result.tags,
            result.word_count,
            tone,
            length,
            filters,
        )
        .await?;

        Ok(result)
    }
}

/// Map a length preset to a target word count. Unknown presets fall back to
/// the medium target.
fn length_to_words(length: &str) -> usize {
    match length {
        "short" => 500,
        "long" => 1500,
        _ => 1000,
    }
}

fn metadata_filters(filters: &GenerationFilters) -> Vec<MetadataFilter> {
    let mut out = Vec::new();
    if let Some(sector) = &filters.sector {
        out.push(MetadataFilter::new("sector", sector));
    }
    if let Some(category) = &filters.category {
        out.push(MetadataFilter::new("category", category));
    }
    if let Some(source) = &filters.source {
        out.push(MetadataFilter::new("source", source));
    }
    out
}

/// Render retrieved records as a numbered context block.
fn render_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "(no matching records)".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("[{}] {}", i + 1, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn title_prompt(topic: &str, count: usize, hits: &[SearchHit]) -> String {
    format!(
        "Context records:\n{context}\n\n\
         Using the context records above, generate {count} engaging blog post titles about: {topic}\n\n\
         Requirements:\n\
         - Make titles catchy and SEO-friendly\n\
         - Base titles on the context records, not general knowledge\n\
         - Focus on trends, insights, or valuable information\n\
         - Each title must be unique\n\n\
         Return only the titles, one per line, without numbering.",
        context = render_context(hits),
        count = count,
        topic = topic,
    )
}

fn social_prompt(topic: &str, title: &str, tone: &str, hits: &[SearchHit]) -> String {
    format!(
        "Context records:\n{context}\n\n\
         Using the context records above, write a social media post about \"{topic}\" \
         with the title: \"{title}\"\n\n\
         Requirements:\n\
         - Use a {tone} tone\n\
         - Include relevant insights from the context records\n\
         - Keep it between 150 and 250 characters\n\
         - Make it shareable and engaging\n\
         - Do NOT include hashtags or emojis\n\n\
         Return only the social media post text.",
        context = render_context(hits),
        topic = topic,
        title = title,
        tone = tone,
    )
}

fn blog_prompt(title: &str, topic: &str, tone: &str, target_words: usize, hits: &[SearchHit]) -> String {
    format!(
        "Context records:\n{context}\n\n\
         Using the context records above, write a blog post with the title: \"{title}\"\n\n\
         Topic: {topic}\n\
         Tone: {tone}\n\
         Target length: approximately {target_words} words\n\n\
         Requirements:\n\
         - Create well-structured content with clear sections\n\
         - Base the content on the context records\n\
         - Cite specific examples from the records where possible\n\n\
         Format the response as:\n\
         CONTENT:\n\
         [the blog content]\n\n\
         TAGS:\n\
         [comma-separated relevant tags]\n\n\
         SUMMARY:\n\
         [a 2-3 sentence summary]",
        context = render_context(hits),
        title = title,
        topic = topic,
        tone = tone,
        target_words = target_words,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{list_blogs, list_social, list_titles};
    use crate::embedding::testing::{stub_vector, StubProvider};
    use crate::migrate;
    use crate::project::Document;
    use crate::vector_store::VectorIndex;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// Model stub returning a fixed response and recording the last prompt.
    struct StubModel {
        response: String,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl StubModel {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationModel for StubModel {
        fn model_name(&self) -> &str {
            "stub"
        }
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Ok(self.response.clone())
        }
    }

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

    async fn seed_entry(pool: &SqlitePool, collection: &str, id: i64, text: &str, sector: &str) {
        let provider = StubProvider::new(8);
        let index = VectorIndex::open(pool, collection, &provider).await.unwrap();
        let mut metadata = BTreeMap::new();
        metadata.insert("sector".to_string(), sector.to_string());
        let doc = Document {
            id,
            text: text.to_string(),
            metadata,
        };
        index.upsert(pool, &doc, &stub_vector(text, 8)).await.unwrap();
    }

    fn engine(pool: &SqlitePool, model: Arc<dyn GenerationModel>) -> GenerationEngine {
        let retriever = Retriever::new(pool.clone(), Arc::new(StubProvider::new(8)));
        GenerationEngine::new(pool.clone(), retriever, model)
    }

    #[tokio::test]
    async fn test_generate_titles_parses_and_saves() {
        let pool = test_pool().await;
        seed_entry(&pool, "jobs", 1, "rust engineer chennai", "Technology").await;

        let model = Arc::new(StubModel::new(
            "Here are the titles:\n1. Chennai's Rust Boom\n2. Hiring Beyond the Metro\n3. Extra Title\n",
        ));
        let engine = engine(&pool, model.clone());

        let titles = engine
            .generate_titles("jobs", "rust hiring", &GenerationFilters::default(), 2)
            .await
            .unwrap();

        assert_eq!(titles, vec!["Chennai's Rust Boom", "Hiring Beyond the Metro"]);
        let saved = list_titles(&pool, 10).await.unwrap();
        assert_eq!(saved.len(), 2);

        // The retrieved record text must be embedded in the prompt.
        let prompts = model.seen.lock().unwrap();
        assert!(prompts[0].contains("rust engineer chennai"));
    }

    #[tokio::test]
    async fn test_generate_titles_empty_response_is_not_an_error() {
        let pool = test_pool().await;
        seed_entry(&pool, "jobs", 1, "rust engineer chennai", "Technology").await;

        let engine = engine(&pool, Arc::new(StubModel::new("Empty Response")));
        let titles = engine
            .generate_titles("jobs", "rust hiring", &GenerationFilters::default(), 5)
            .await
            .unwrap();

        assert!(titles.is_empty());
        assert!(list_titles(&pool, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_titles_respects_filters() {
        let pool = test_pool().await;
        seed_entry(&pool, "jobs", 1, "rust engineer", "Technology").await;
        seed_entry(&pool, "jobs", 2, "staff nurse", "Healthcare").await;

        let model = Arc::new(StubModel::new("1. Only One Title\n"));
        let engine = engine(&pool, model.clone());
        let filters = GenerationFilters {
            sector: Some("Healthcare".to_string()),
            ..Default::default()
        };

        engine
            .generate_titles("jobs", "hiring", &filters, 5)
            .await
            .unwrap();

        let prompts = model.seen.lock().unwrap();
        assert!(prompts[0].contains("staff nurse"));
        assert!(!prompts[0].contains("rust engineer"));
    }

    #[tokio::test]
    async fn test_generate_social_trims_and_saves() {
        let pool = test_pool().await;
        seed_entry(&pool, "news", 1, "election coverage roundup", "").await;

        let engine = engine(&pool, Arc::new(StubModel::new("  A crisp post about coverage.  ")));
        let content = engine
            .generate_social(
                "news",
                "election",
                "Coverage Roundup",
                "professional",
                &GenerationFilters::default(),
            )
            .await
            .unwrap();

        assert_eq!(content, "A crisp post about coverage.");
        let saved = list_social(&pool, 10).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].tone, "professional");
    }

    #[tokio::test]
    async fn test_generate_blog_parses_sections() {
        let pool = test_pool().await;
        seed_entry(&pool, "news", 1, "ai regulation debate", "").await;

        let engine = engine(
            &pool,
            Arc::new(StubModel::new(
                "CONTENT:\nRegulators met this week.\nTAGS:\nai, policy\nSUMMARY:\nA short recap.",
            )),
        );
        let blog = engine
            .generate_blog(
                "news",
                "AI Policy Watch",
                "ai regulation",
                "analytical",
                "short",
                &GenerationFilters::default(),
            )
            .await
            .unwrap();

        assert_eq!(blog.content, "Regulators met this week.");
        assert_eq!(blog.tags, vec!["ai", "policy"]);
        assert_eq!(blog.summary, "A short recap.");
        assert_eq!(blog.word_count, 4);

        let saved = list_blogs(&pool, 10).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].length, "short");
    }

    #[tokio::test]
    async fn test_generate_blog_summary_fallback() {
        let pool = test_pool().await;
        seed_entry(&pool, "news", 1, "ai regulation debate", "").await;

        let body = "word ".repeat(100);
        let engine = engine(&pool, Arc::new(StubModel::new(&format!("CONTENT:\n{}", body))));
        let blog = engine
            .generate_blog(
                "news",
                "AI Policy Watch",
                "ai regulation",
                "analytical",
                "medium",
                &GenerationFilters::default(),
            )
            .await
            .unwrap();

        assert!(blog.summary.ends_with("..."));
        assert_eq!(blog.summary.chars().count(), 203);
        assert_eq!(blog.word_count, 100);
        assert!(blog.tags.is_empty());
    }

    #[test]
    fn test_length_presets() {
        assert_eq!(length_to_words("short"), 500);
        assert_eq!(length_to_words("medium"), 1000);
        assert_eq!(length_to_words("long"), 1500);
        assert_eq!(length_to_words("novel"), 1000);
    }

    #[test]
    fn test_render_context_numbers_hits() {
        let hits = vec![
            SearchHit {
                record_id: 1,
                text: "first".to_string(),
                metadata: BTreeMap::new(),
                score: 0.9,
            },
            SearchHit {
                record_id: 2,
                text: "second".to_string(),
                metadata: BTreeMap::new(),
                score: 0.8,
            },
        ];
        let context = render_context(&hits);
        assert!(context.starts_with("[1] first"));
        assert!(context.contains("[2] second"));
        assert_eq!(render_context(&[]), "(no matching records)");
    }
}

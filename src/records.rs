//! Source record types and the capability trait the indexer is generic over.
//!
//! Each record type maps to one relational table and one vector collection.
//! The trait exposes what the projector needs: a stable identity, the
//! labelled text fields in projection order (title first, categorical
//! attributes next, long-form body last), and the low-cardinality fields
//! that become exact-match filter metadata.

use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

/// Status value meaning "embedding is current". Anything else — including
/// NULL — marks the record as eligible for (re)indexing.
pub const INDEXED_SENTINEL: i64 = 1;

/// Capability interface over the concrete record shapes.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin {
    /// Backing relational table.
    const TABLE: &'static str;
    /// Vector collection name (one physical collection per record type).
    const COLLECTION: &'static str;
    /// Metadata keys usable as filters, with their backing columns.
    const FILTER_COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Labelled text fields in stable projection order.
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)>;

    /// Low-cardinality fields stored as filter metadata.
    fn metadata_fields(&self) -> Vec<(&'static str, Option<&str>)>;
}

/// A scraped job posting.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: i64,
    pub title: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub sector: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub job_type: Option<String>,
    pub description: Option<String>,
    pub skills: Option<String>,
    pub site_source: Option<String>,
    pub index_status: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Job {
    const TABLE: &'static str = "jobs";
    const COLLECTION: &'static str = "jobs";
    const FILTER_COLUMNS: &'static [&'static str] = &[
        "sector",
        "location",
        "company",
        "job_type",
        "site_source",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("Job Title", self.title.as_deref()),
            ("Company", self.company.as_deref()),
            ("Role", self.role.as_deref()),
            ("Location", self.location.as_deref()),
            ("Sector", self.sector.as_deref()),
            ("Salary", self.salary.as_deref()),
            ("Experience Required", self.experience.as_deref()),
            ("Education", self.education.as_deref()),
            ("Job Type", self.job_type.as_deref()),
            ("Skills Required", self.skills.as_deref()),
            ("Description", self.description.as_deref()),
        ]
    }

    fn metadata_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("company", self.company.as_deref()),
            ("location", self.location.as_deref()),
            ("sector", self.sector.as_deref()),
            ("job_type", self.job_type.as_deref()),
            ("salary", self.salary.as_deref()),
            ("experience", self.experience.as_deref()),
            ("site_source", self.site_source.as_deref()),
        ]
    }
}

/// A scraped news article.
#[derive(Debug, Clone, FromRow)]
pub struct NewsArticle {
    pub id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<i64>,
    pub index_status: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for NewsArticle {
    const TABLE: &'static str = "news_articles";
    const COLLECTION: &'static str = "news";
    const FILTER_COLUMNS: &'static [&'static str] = &["category", "source"];

    fn id(&self) -> i64 {
        self.id
    }

    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("Title", self.title.as_deref()),
            ("Category", self.category.as_deref()),
            ("Source", self.source.as_deref()),
            ("Content", self.content.as_deref()),
        ]
    }

    fn metadata_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("category", self.category.as_deref()),
            ("source", self.source.as_deref()),
        ]
    }
}

/// Free-form content that doesn't fit the other shapes.
#[derive(Debug, Clone, FromRow)]
pub struct GenericContent {
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub index_status: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for GenericContent {
    const TABLE: &'static str = "generic_content";
    const COLLECTION: &'static str = "content";
    const FILTER_COLUMNS: &'static [&'static str] = &["category", "source"];

    fn id(&self) -> i64 {
        self.id
    }

    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("Title", self.title.as_deref()),
            ("Category", self.category.as_deref()),
            ("Source", self.source.as_deref()),
            ("Body", self.body.as_deref()),
        ]
    }

    fn metadata_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("category", self.category.as_deref()),
            ("source", self.source.as_deref()),
        ]
    }
}

/// Collection names known to the CLI, in indexing order.
pub const ALL_COLLECTIONS: &[&str] = &[
    Job::COLLECTION,
    NewsArticle::COLLECTION,
    GenericContent::COLLECTION,
];

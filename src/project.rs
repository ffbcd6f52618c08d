//! Document projection.
//!
//! Converts a typed record into the flat text + metadata document that
//! crosses the boundary into the vector store. Projection is deterministic:
//! the same record always yields byte-identical text and metadata, so
//! re-running indexing on an unchanged record produces the same document.
//!
//! Empty fields are omitted from the text entirely rather than rendered as
//! empty lines. Metadata values default to the empty string — an intentional
//! "no filter value" sentinel that a concrete filter never matches.

use anyhow::{bail, Result};
use std::collections::BTreeMap;

use crate::config::ProjectorConfig;
use crate::records::Record;

/// Derived, ephemeral document. Never persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: i64,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

/// A named text-transform step. Steps apply to the document text only,
/// in the order they were configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStep {
    /// Collapse runs of spaces and tabs within each line.
    CollapseWhitespace,
    /// Cap the document text at a character count.
    TruncateBody(usize),
}

impl TransformStep {
    fn apply(&self, text: String) -> String {
        match self {
            TransformStep::CollapseWhitespace => text
                .lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
            TransformStep::TruncateBody(max_chars) => {
                if text.chars().count() <= *max_chars {
                    text
                } else {
                    text.chars().take(*max_chars).collect()
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projector {
    transforms: Vec<TransformStep>,
}

impl Projector {
    pub fn new(transforms: Vec<TransformStep>) -> Self {
        Self { transforms }
    }

    /// Build a projector from configuration. Transform names were validated
    /// at config load; an unknown name here is still an error.
    pub fn from_config(config: &ProjectorConfig) -> Result<Self> {
        let mut transforms = Vec::with_capacity(config.transforms.len());
        for name in &config.transforms {
            let step = match name.as_str() {
                "collapse-whitespace" => TransformStep::CollapseWhitespace,
                "truncate-body" => TransformStep::TruncateBody(config.max_body_chars),
                other => bail!("Unknown projector transform: '{}'", other),
            };
            transforms.push(step);
        }
        Ok(Self::new(transforms))
    }

    /// Project a record into a document.
    ///
    /// A record whose every text field is empty cannot be embedded and
    /// yields an error; the batch containing it counts toward the run's
    /// error counter.
    pub fn project<R: Record>(&self, record: &R) -> Result<Document> {
        let mut parts = Vec::new();
        for (label, value) in record.text_fields() {
            if let Some(value) = value {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    parts.push(format!("{}: {}", label, trimmed));
                }
            }
        }

        if parts.is_empty() {
            bail!(
                "record {} in {} has no indexable text",
                record.id(),
                R::TABLE
            );
        }

        let mut text = parts.join("\n");
        for step in &self.transforms {
            text = step.apply(text);
        }

        let mut metadata = BTreeMap::new();
        for (key, value) in record.metadata_fields() {
            let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
            metadata.insert(key.to_string(), value);
        }

        Ok(Document {
            id: record.id(),
            text,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Job, NewsArticle};

    fn sample_job() -> Job {
        Job {
            id: 7,
            title: Some("Backend Engineer".to_string()),
            company: Some("Acme Corp".to_string()),
            role: None,
            location: Some("Chennai".to_string()),
            sector: Some("Technology".to_string()),
            salary: None,
            experience: Some("  3-5 years ".to_string()),
            education: None,
            job_type: Some("Full Time".to_string()),
            description: Some("Build and operate APIs.".to_string()),
            skills: Some("Rust, SQL".to_string()),
            site_source: None,
            index_status: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_projection_deterministic() {
        let projector = Projector::new(vec![TransformStep::CollapseWhitespace]);
        let job = sample_job();
        let a = projector.project(&job).unwrap();
        let b = projector.project(&job).unwrap();
        assert_eq!(a.text, b.text);
        assert_eq!(a.metadata, b.metadata);
    }

    #[test]
    fn test_empty_fields_omitted_from_text() {
        let projector = Projector::new(vec![]);
        let doc = projector.project(&sample_job()).unwrap();
        assert!(!doc.text.contains("Salary"));
        assert!(!doc.text.contains("Education"));
        assert!(doc.text.starts_with("Job Title: Backend Engineer"));
        // Long-form body comes last
        assert!(doc.text.ends_with("Description: Build and operate APIs."));
    }

    #[test]
    fn test_metadata_defaults_to_empty_string() {
        let projector = Projector::new(vec![]);
        let doc = projector.project(&sample_job()).unwrap();
        assert_eq!(doc.metadata.get("salary").map(String::as_str), Some(""));
        assert_eq!(
            doc.metadata.get("sector").map(String::as_str),
            Some("Technology")
        );
    }

    #[test]
    fn test_all_empty_record_is_an_error() {
        let projector = Projector::new(vec![]);
        let article = NewsArticle {
            id: 1,
            title: None,
            content: Some("   ".to_string()),
            category: None,
            source: None,
            published_at: None,
            index_status: None,
            created_at: 0,
            updated_at: 0,
        };
        let err = projector.project(&article).unwrap_err();
        assert!(err.to_string().contains("no indexable text"));
    }

    #[test]
    fn test_collapse_whitespace_transform() {
        let projector = Projector::new(vec![TransformStep::CollapseWhitespace]);
        let doc = projector.project(&sample_job()).unwrap();
        assert!(doc.text.contains("Experience Required: 3-5 years"));
    }

    #[test]
    fn test_truncate_body_transform() {
        let projector = Projector::new(vec![TransformStep::TruncateBody(10)]);
        let doc = projector.project(&sample_job()).unwrap();
        assert_eq!(doc.text.chars().count(), 10);
    }

    #[test]
    fn test_transforms_apply_in_order() {
        // Collapse first, then truncate: result differs from truncate-only
        // because collapsing shortens the text before the cap applies.
        let job = sample_job();
        let collapsed_first = Projector::new(vec![
            TransformStep::CollapseWhitespace,
            TransformStep::TruncateBody(40),
        ])
        .project(&job)
        .unwrap();
        assert!(collapsed_first.text.chars().count() <= 40);
    }
}

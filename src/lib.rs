//! # Content Forge
//!
//! Incremental vector indexing and retrieval-augmented content generation
//! for editorial records.
//!
//! Content Forge converts structured records (job postings, news articles,
//! generic content) from a relational store into per-collection vector
//! indexes, then answers content-generation requests (titles, social posts,
//! blog articles) by retrieving semantically relevant records — narrowed by
//! exact-match metadata filters — and handing the bounded context to a
//! generation model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Record Store │──▶│ Projector + │──▶│   SQLite      │
//! │ jobs/news/…  │   │ Embeddings │   │ vector store  │
//! └──────────────┘   └────────────┘   └──────┬───────┘
//!                                           │
//!                        ┌──────────────────┤
//!                        ▼                  ▼
//!                  ┌──────────┐      ┌────────────┐
//!                  │  Search  │      │ Generation │
//!                  │ (cforge) │      │ (LLM call) │
//!                  └──────────┘      └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cforge init                              # create database
//! cforge index all                         # embed eligible records
//! cforge search jobs "rust backend"        # filtered similarity search
//! cforge generate titles --collection jobs --topic "remote hiring"
//! cforge stats                             # indexing coverage
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`records`] | Source record types and the record capability trait |
//! | [`project`] | Record → document projection with transform steps |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`vector_store`] | Per-collection vector entries and filtered queries |
//! | [`indexer`] | Incremental indexing engine |
//! | [`retriever`] | Filtered top-k similarity retrieval |
//! | [`llm`] | Generation model abstraction |
//! | [`generate`] | Generation orchestration and prompt templates |
//! | [`parse`] | Structured parsing of model responses |
//! | [`artifacts`] | Generated artifact library |
//! | [`store`] | Record store queries and status transitions |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema bootstrap |
//! | [`stats`] | Indexing coverage overview |

pub mod artifacts;
pub mod config;
pub mod db;
pub mod embedding;
pub mod generate;
pub mod indexer;
pub mod llm;
pub mod migrate;
pub mod parse;
pub mod project;
pub mod records;
pub mod retriever;
pub mod stats;
pub mod store;
pub mod vector_store;

//! Generic full-text search collections for arbitrary record types.
//!
//! This crate turns typed records into searchable documents, keeps them in a
//! persistent Tantivy index (one directory per namespace), and answers ranked
//! multi-field keyword queries with optional per-field weights.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       quarry-fts                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Collection<R> (add / update / delete / search facade)      │
//! │  SearchBackend trait (async, via the blocking pool)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Projection<R> (named field extractors)                     │
//! │  DocumentBuilder → GenericDocument                          │
//! │  QueryBuilder (weighted multi-field queries)                │
//! │  SearchExecutor (top-N ranked hits)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexStore (scoped read/write sessions, per-dir RwLock)    │
//! │  IndexSchema (identifier + searchable + extra fields)       │
//! │  Analyzer (unicode / simple / en_stem)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Field Layout
//!
//! | Field | Indexing | Stored |
//! |-------|----------|--------|
//! | identifier | raw term, exact match | yes |
//! | searchable fields | analyzed, with positions | yes |
//! | extra fields | `exact` or `text`, as declared | as declared |
//!
//! # Example
//!
//! ```rust,no_run
//! use quarry_fts::{Collection, CollectionConfig, Projection, Record};
//!
//! struct Product {
//!     pid: String,
//!     pname: String,
//!     intro: String,
//! }
//!
//! impl Record for Product {
//!     fn projection() -> Projection<Self> {
//!         Projection::builder()
//!             .field("pid", |p: &Product| p.pid.clone())
//!             .field("pname", |p: &Product| p.pname.clone())
//!             .field("intro", |p: &Product| p.intro.clone())
//!             .build()
//!     }
//! }
//!
//! # fn main() -> quarry_core::Result<()> {
//! let config = CollectionConfig::new("Product", "pid", ["pname", "intro"]);
//! let products = Collection::<Product>::open_record(config)?;
//!
//! let result = products.search_weighted(
//!     ["pname", "intro"],
//!     "灯",
//!     [("pname", 3.0)],
//!     10,
//! )?;
//! for doc in result.documents() {
//!     println!("{}: {:?}", doc.identifier, doc.get("pname"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod backend;
pub mod collection;
pub mod document;
pub mod projection;
pub mod query;
pub mod schema;
pub mod search;
pub mod session;
pub mod types;

// Re-exports
pub use analyzer::Analyzer;
pub use backend::{SearchBackend, SearchParams, SearchResults};
pub use collection::{Collection, CollectionState, ItemFailure, WriteStats};
pub use document::{DocumentBuilder, GenericDocument, GenericDocumentBuilder};
pub use projection::{Projection, ProjectionBuilder, Record};
pub use query::{QueryBuilder, SearchQuery};
pub use schema::IndexSchema;
pub use search::{Hit, SearchExecutor, SearchResult};
pub use session::{IndexStore, ReadSession, WriteSession};
pub use types::{CollectionConfig, FieldDecl, FieldKind, QueryMode};

pub use quarry_core::{Error, Result};

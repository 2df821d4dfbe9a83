//! The collection facade.
//!
//! A [`Collection`] binds one record type to one namespace. It is the single
//! entry point for indexing and searching: records go through the projection
//! and the document builder into a write session; queries go through the
//! query builder and the search executor inside a read session.
//!
//! Every operation opens and closes its own session. Batch writes are best
//! effort: a record that fails to project is logged, reported in
//! [`WriteStats`] and skipped, and the rest of the batch is committed.
//!
//! ```rust,no_run
//! use quarry_fts::{Collection, CollectionConfig, Projection};
//!
//! struct NewsInfo {
//!     nid: u32,
//!     title: String,
//!     content: String,
//! }
//!
//! # fn main() -> quarry_core::Result<()> {
//! let projection = Projection::<NewsInfo>::builder()
//!     .field("nid", |n| n.nid)
//!     .field("title", |n| n.title.clone())
//!     .field("content", |n| n.content.clone())
//!     .build();
//!
//! let config = CollectionConfig::new("NewsInfo", "nid", ["title", "content"]);
//! let news = Collection::open(config, projection)?;
//!
//! news.add(&[NewsInfo {
//!     nid: 1,
//!     title: "中国经济".to_string(),
//!     content: "增长强劲".to_string(),
//! }])?;
//!
//! let result = news.search(["title", "content"], "中国", 10)?;
//! assert_eq!(result.identifiers(), vec!["1"]);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use quarry_core::{Error, Result};

use crate::document::{DocumentBuilder, GenericDocument};
use crate::projection::{Projection, Record};
use crate::query::SearchQuery;
use crate::schema::IndexSchema;
use crate::search::{SearchExecutor, SearchResult};
use crate::session::{IndexStore, WriteSession};
use crate::types::CollectionConfig;

/// Lifecycle state of a collection's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    /// Nothing has been written yet.
    Empty,
    /// At least one document has been written. Clearing the index does not
    /// revert this.
    Populated,
}

/// A batch item that was skipped.
#[derive(Debug)]
pub struct ItemFailure {
    /// Position of the item in the batch.
    pub position: usize,
    /// Identifier of the item, when it could be determined.
    pub identifier: Option<String>,
    /// Why the item was skipped.
    pub error: Error,
}

/// Outcome of a best-effort batch write.
#[derive(Debug, Default)]
pub struct WriteStats {
    /// Documents committed.
    pub written: usize,
    /// Items skipped.
    pub skipped: usize,
    /// One entry per skipped item, in batch order.
    pub failures: Vec<ItemFailure>,
}

impl WriteStats {
    /// Whether every item was written.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    fn skip(&mut self, position: usize, identifier: Option<String>, error: Error) {
        log::warn!(
            "Skipping item {position} ({}): {error}",
            identifier.as_deref().unwrap_or("no identifier")
        );
        self.skipped += 1;
        self.failures.push(ItemFailure {
            position,
            identifier,
            error,
        });
    }
}

struct Inner<R> {
    config: CollectionConfig,
    projection: Projection<R>,
    builder: DocumentBuilder,
    store: IndexStore,
    executor: SearchExecutor,
    populated: AtomicBool,
}

/// A searchable collection of records of type `R`.
///
/// Cloning is cheap; clones share the same configuration and state.
pub struct Collection<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Collection<R> {
    /// Open a collection.
    ///
    /// Validates the configuration and checks that the projection covers the
    /// identifier and every searchable field. An index already on disk must
    /// have been created with the same field layout.
    pub fn open(config: CollectionConfig, projection: Projection<R>) -> Result<Self> {
        config.validate()?;
        projection.check_covers(
            std::iter::once(config.identifier_field.as_str())
                .chain(config.searchable_fields.iter().map(String::as_str)),
        )?;

        let schema = IndexSchema::build(&config);
        let store = IndexStore::new(&config, schema)?;
        let builder = DocumentBuilder::new(
            config.identifier_field.clone(),
            config.searchable_fields.clone(),
        );
        let executor = SearchExecutor::new(config.query_mode);

        let existing = store.with_read_session(|session| Ok(session.num_docs()))?;
        log::debug!(
            "Opened collection '{}' at {} ({existing} docs)",
            config.namespace,
            store.path().display()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                projection,
                builder,
                store,
                executor,
                populated: AtomicBool::new(existing > 0),
            }),
        })
    }

    /// Configuration the collection was opened with.
    pub fn config(&self) -> &CollectionConfig {
        &self.inner.config
    }

    /// Index schema.
    pub fn schema(&self) -> &IndexSchema {
        self.inner.store.schema()
    }

    /// Directory holding the index.
    pub fn index_path(&self) -> &Path {
        self.inner.store.path()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CollectionState {
        if self.inner.populated.load(Ordering::Acquire) {
            CollectionState::Populated
        } else {
            CollectionState::Empty
        }
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Index a batch of records in one write session.
    ///
    /// Records that fail to project are skipped and reported; the rest are
    /// committed together.
    pub fn add(&self, records: &[R]) -> Result<WriteStats> {
        let mut stats = WriteStats::default();
        let mut docs = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            match self.build(record) {
                Ok(doc) => docs.push((position, doc)),
                Err(e) => stats.skip(position, self.identifier_of(record), e),
            }
        }

        self.write_batch(docs, stats)
    }

    /// Index a single record. Failures are returned, not skipped.
    pub fn add_one(&self, record: &R) -> Result<()> {
        let doc = self.build(record)?;
        self.write(|session| session.add(&doc))?;
        self.mark_populated();
        Ok(())
    }

    /// Index pre-built documents verbatim.
    ///
    /// Documents may use any declared field, including extra fields. A
    /// document with an empty identifier or an undeclared field is skipped
    /// and reported.
    pub fn add_documents(&self, documents: &[GenericDocument]) -> Result<WriteStats> {
        let docs = documents.iter().cloned().enumerate().collect();
        self.write_batch(docs, WriteStats::default())
    }

    /// Replace every document sharing the record's identifier with the
    /// record's current projection.
    pub fn update(&self, record: &R) -> Result<()> {
        let doc = self.build(record)?;
        self.write(|session| session.replace(&doc))?;
        self.mark_populated();
        log::debug!("Updated '{}' in '{}'", doc.identifier, self.namespace());
        Ok(())
    }

    /// Replace every document whose `field` holds the term `value` with
    /// `document`.
    pub fn update_document(
        &self,
        document: &GenericDocument,
        field: &str,
        value: &str,
    ) -> Result<()> {
        self.write(|session| {
            session.delete_term(field, value)?;
            session.add(document)
        })?;
        self.mark_populated();
        Ok(())
    }

    /// Remove every document with this identifier.
    pub fn delete(&self, identifier: &str) -> Result<()> {
        self.write(|session| {
            session.delete_identifier(identifier);
            Ok(())
        })?;
        log::debug!("Deleted '{identifier}' from '{}'", self.namespace());
        Ok(())
    }

    /// Remove every document whose `field` holds the term `value`.
    pub fn delete_term(&self, field: &str, value: &str) -> Result<()> {
        self.write(|session| session.delete_term(field, value))
    }

    /// Remove every document. The index directory is kept.
    pub fn delete_all(&self) -> Result<()> {
        self.write(|session| session.delete_all())?;
        log::info!("Cleared collection '{}'", self.namespace());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Search `fields` for `keyword`, returning at most `limit` hits.
    pub fn search<I, S>(&self, fields: I, keyword: &str, limit: usize) -> Result<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_query(&SearchQuery::new(fields, keyword, limit))
    }

    /// Search with per-field weights. Weights for fields not searched are
    /// ignored; searched fields without a weight use 1.0.
    pub fn search_weighted<I, S, W, T>(
        &self,
        fields: I,
        keyword: &str,
        weights: W,
        limit: usize,
    ) -> Result<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        W: IntoIterator<Item = (T, f32)>,
        T: Into<String>,
    {
        self.search_query(&SearchQuery::new(fields, keyword, limit).with_weights(weights))
    }

    /// Run a prepared query.
    pub fn search_query(&self, query: &SearchQuery) -> Result<SearchResult> {
        let mut query = query.clone();
        query.normalize();
        self.inner
            .store
            .with_read_session(|session| self.inner.executor.execute(session, &query))
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> Result<u64> {
        self.inner
            .store
            .with_read_session(|session| Ok(session.num_docs()))
    }

    /// The stored document with this identifier, if any.
    ///
    /// When duplicates exist, the first in index order is returned.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<GenericDocument>> {
        let result = self.inner.store.with_read_session(|session| {
            self.inner.executor.find_term(
                session,
                &self.inner.config.identifier_field,
                identifier,
                1,
            )
        })?;
        Ok(result.into_documents().into_iter().next())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn namespace(&self) -> &str {
        &self.inner.config.namespace
    }

    fn build(&self, record: &R) -> Result<GenericDocument> {
        self.inner.builder.build(&self.inner.projection, record)
    }

    fn identifier_of(&self, record: &R) -> Option<String> {
        self.inner
            .projection
            .project(record, &self.inner.config.identifier_field)
            .ok()
            .filter(|id| !id.is_empty())
    }

    fn mark_populated(&self) {
        self.inner.populated.store(true, Ordering::Release);
    }

    fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteSession<'_>) -> Result<T>,
    {
        self.inner.store.with_write_session(f)
    }

    fn write_batch(
        &self,
        docs: Vec<(usize, GenericDocument)>,
        mut stats: WriteStats,
    ) -> Result<WriteStats> {
        if !docs.is_empty() {
            stats = self.write(|session| {
                for (position, doc) in docs {
                    match session.add(&doc) {
                        Ok(()) => stats.written += 1,
                        Err(e) if is_item_error(&e) => {
                            let identifier = Some(doc.identifier).filter(|id| !id.is_empty());
                            stats.skip(position, identifier, e);
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(stats)
            })?;
            stats.failures.sort_by_key(|failure| failure.position);
        }

        if stats.written > 0 {
            self.mark_populated();
        }
        log::info!(
            "Indexed {} documents into '{}' ({} skipped)",
            stats.written,
            self.namespace(),
            stats.skipped
        );
        Ok(stats)
    }
}

impl<R: Record> Collection<R> {
    /// Open a collection using the record type's own projection.
    pub fn open_record(config: CollectionConfig) -> Result<Self> {
        Self::open(config, R::projection())
    }
}

impl<R> std::fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("namespace", &self.inner.config.namespace)
            .field("path", &self.inner.store.path())
            .field("state", &self.state())
            .finish()
    }
}

/// Errors that only concern one document of a batch.
fn is_item_error(e: &Error) -> bool {
    matches!(
        e,
        Error::FieldNotFound { .. } | Error::Projection { .. } | Error::Validation { .. }
    )
}

// ============================================================================
// Tests
// ============================================================================

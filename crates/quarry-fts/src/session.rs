//! Index session management.
//!
//! [`IndexStore`] arbitrates access to one namespace's on-disk index. Every
//! operation opens its own session and the session is released when its
//! scope ends, on success, error, early return or panic alike.
//!
//! # Locking
//!
//! A process-wide registry hands out one readers-writer lock per index
//! directory:
//!
//! - write sessions hold the exclusive side for their whole lifetime, so a
//!   second writer on the same namespace blocks until the first has committed
//!   and released the engine's writer lock;
//! - read sessions hold the shared side only while opening their snapshot,
//!   then release it. The snapshot stays valid and consistent afterwards, so
//!   a slow reader never holds up the next writer.
//!
//! # Write Semantics
//!
//! All operations of one write session are committed with a single commit
//! when the callback returns `Ok`. When it returns `Err`, uncommitted
//! operations are discarded with the writer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, Weak};

use quarry_core::{Error, Result};
use tantivy::directory::MmapDirectory;
use tantivy::tokenizer::TokenizerManager;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyError, Term};

use crate::analyzer::{ANALYZER_NAME, Analyzer};
use crate::document::GenericDocument;
use crate::schema::IndexSchema;
use crate::types::CollectionConfig;

/// File tantivy writes once an index exists in a directory.
const META_FILE: &str = "meta.json";

/// Minimum writer budget accepted by the engine.
const MIN_WRITER_MEMORY: usize = 15_000_000;

type LockRegistry = Mutex<HashMap<PathBuf, Weak<RwLock<()>>>>;

fn session_lock(path: &Path) -> Arc<RwLock<()>> {
    static LOCKS: OnceLock<LockRegistry> = OnceLock::new();

    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }

    locks.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(RwLock::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Access point to one namespace's index directory.
pub struct IndexStore {
    path: PathBuf,
    schema: IndexSchema,
    analyzer: Analyzer,
    writer_memory_bytes: usize,
    lock: Arc<RwLock<()>>,
}

impl IndexStore {
    /// Create a store for a configuration. Nothing is created on disk yet.
    pub fn new(config: &CollectionConfig, schema: IndexSchema) -> Result<Self> {
        let path = config.index_path()?;
        let lock = session_lock(&path);
        Ok(Self {
            path,
            schema,
            analyzer: config.analyzer,
            writer_memory_bytes: config.writer_memory_bytes.max(MIN_WRITER_MEMORY),
            lock,
        })
    }

    /// Index directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema used for every session.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Whether an index has been created in the directory.
    pub fn exists(&self) -> bool {
        self.path.join(META_FILE).exists()
    }

    /// Run `f` with an open write session and commit once if it succeeds.
    ///
    /// Creates the directory and index on first use. Blocks while another
    /// write session on the same directory is open in this process.
    pub fn with_write_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteSession<'_>) -> Result<T>,
    {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Opening write session at {}", self.path.display());

        let index = self.open_or_create()?;
        let writer: IndexWriter = index
            .writer(self.writer_memory_bytes)
            .map_err(|e| self.unavailable(e))?;

        let mut session = WriteSession {
            store: self,
            writer,
            operations: 0,
        };

        match f(&mut session) {
            Ok(value) => {
                session.close()?;
                Ok(value)
            }
            Err(e) => {
                log::debug!(
                    "Write session at {} failed, discarding {} uncommitted operations",
                    self.path.display(),
                    session.operations
                );
                Err(e)
            }
        }
    }

    /// Run `f` against a read-only snapshot.
    ///
    /// When no index exists yet, `f` receives an empty snapshot and nothing
    /// is created on disk.
    pub fn with_read_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadSession<'_>) -> Result<T>,
    {
        let snapshot = {
            let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
            self.open_snapshot()?
        };
        log::debug!(
            "Opened read session at {} ({} docs)",
            self.path.display(),
            snapshot.as_ref().map_or(0, |s| s.searcher.num_docs())
        );

        let session = ReadSession {
            store: self,
            snapshot,
        };
        f(&session)
    }

    fn open_or_create(&self) -> Result<Index> {
        std::fs::create_dir_all(&self.path)
            .map_err(|e| Error::index_unavailable(&self.path, e.to_string()))?;
        let dir = MmapDirectory::open(&self.path)
            .map_err(|e| Error::index_unavailable(&self.path, e.to_string()))?;
        let index = Index::open_or_create(dir, self.schema.schema().clone())
            .map_err(|e| self.open_error(e))?;
        self.analyzer.register(&index);
        Ok(index)
    }

    fn open_snapshot(&self) -> Result<Option<Snapshot>> {
        if !self.exists() {
            return Ok(None);
        }

        let index = Index::open_in_dir(&self.path).map_err(|e| self.open_error(e))?;
        if index.schema() != *self.schema.schema() {
            return Err(Error::schema_mismatch(
                &self.path,
                "the index on disk was created with a different field layout",
            ));
        }
        self.analyzer.register(&index);

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| self.unavailable(e))?;
        let searcher = reader.searcher();

        Ok(Some(Snapshot { index, searcher }))
    }

    fn open_error(&self, e: TantivyError) -> Error {
        match e {
            TantivyError::SchemaError(message) => Error::schema_mismatch(&self.path, message),
            TantivyError::DataCorruption(corruption) => {
                Error::index_corrupt(format!("{}: {corruption:?}", self.path.display()))
            }
            other => self.unavailable(other),
        }
    }

    fn unavailable(&self, e: TantivyError) -> Error {
        Error::index_unavailable(&self.path, e.to_string())
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("path", &self.path)
            .field("analyzer", &self.analyzer)
            .finish()
    }
}

/// An open mutation session.
pub struct WriteSession<'a> {
    store: &'a IndexStore,
    writer: IndexWriter,
    operations: usize,
}

impl WriteSession<'_> {
    /// Stage a document for insertion.
    pub fn add(&mut self, doc: &GenericDocument) -> Result<()> {
        let tantivy_doc = self.store.schema.to_tantivy(doc)?;
        self.writer
            .add_document(tantivy_doc)
            .map_err(|e| self.store.unavailable(e))?;
        self.operations += 1;
        Ok(())
    }

    /// Stage removal of every document whose identifier equals
    /// `doc.identifier`, then the insertion of `doc`.
    pub fn replace(&mut self, doc: &GenericDocument) -> Result<()> {
        let tantivy_doc = self.store.schema.to_tantivy(doc)?;
        self.delete_identifier(&doc.identifier);
        self.writer
            .add_document(tantivy_doc)
            .map_err(|e| self.store.unavailable(e))?;
        self.operations += 1;
        Ok(())
    }

    /// Stage removal of every document whose `field` holds the term `value`.
    ///
    /// The value is matched as one term, as it is stored in the index: the
    /// whole value for exact fields, a single analyzed token for text fields.
    pub fn delete_term(&mut self, field: &str, value: &str) -> Result<()> {
        let field = self.store.schema.require_field(field)?;
        self.writer.delete_term(Term::from_field_text(field, value));
        self.operations += 1;
        Ok(())
    }

    /// Stage removal of every document with this identifier.
    pub fn delete_identifier(&mut self, identifier: &str) {
        let term = Term::from_field_text(self.store.schema.identifier(), identifier);
        self.writer.delete_term(term);
        self.operations += 1;
    }

    /// Stage removal of every document in the index.
    pub fn delete_all(&mut self) -> Result<()> {
        self.writer
            .delete_all_documents()
            .map_err(|e| self.store.unavailable(e))?;
        self.operations += 1;
        Ok(())
    }

    /// Number of operations staged so far.
    pub fn operations(&self) -> usize {
        self.operations
    }

    /// Schema of the index being written.
    pub fn schema(&self) -> &IndexSchema {
        &self.store.schema
    }

    fn close(mut self) -> Result<()> {
        self.writer
            .commit()
            .map_err(|e| self.store.unavailable(e))?;
        log::debug!(
            "Committed {} operations at {}",
            self.operations,
            self.store.path.display()
        );

        if let Err(e) = self.writer.wait_merging_threads() {
            log::warn!(
                "Background merge at {} did not finish cleanly: {e}",
                self.store.path.display()
            );
        }
        Ok(())
    }
}

struct Snapshot {
    index: Index,
    searcher: Searcher,
}

/// A read-only snapshot of the index.
///
/// Sees every commit made before it was opened and none made after.
pub struct ReadSession<'a> {
    store: &'a IndexStore,
    snapshot: Option<Snapshot>,
}

impl ReadSession<'_> {
    /// The opened index, or `None` if no index exists yet.
    pub fn index(&self) -> Option<&Index> {
        self.snapshot.as_ref().map(|s| &s.index)
    }

    /// The snapshot searcher, or `None` if no index exists yet.
    pub fn searcher(&self) -> Option<&Searcher> {
        self.snapshot.as_ref().map(|s| &s.searcher)
    }

    /// Tokenizers for parsing keywords against this snapshot.
    ///
    /// Falls back to a manager holding only the collection analyzer when no
    /// index exists, so keywords are still parsed and validated.
    pub fn tokenizers(&self) -> TokenizerManager {
        match self.index() {
            Some(index) => index.tokenizers().clone(),
            None => {
                let manager = TokenizerManager::default();
                manager.register(ANALYZER_NAME, self.store.analyzer.text_analyzer());
                manager
            }
        }
    }

    /// Number of live documents in the snapshot.
    pub fn num_docs(&self) -> u64 {
        self.searcher().map_or(0, Searcher::num_docs)
    }

    /// Schema of the index being read.
    pub fn schema(&self) -> &IndexSchema {
        &self.store.schema
    }
}

// ============================================================================
// Tests
// ============================================================================

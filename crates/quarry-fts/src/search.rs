//! Search execution.
//!
//! [`SearchExecutor`] runs a [`SearchQuery`] against a read session and
//! materializes the top hits as [`GenericDocument`]s, best first.

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{Query, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::{DocAddress, Score, Searcher, TantivyDocument, Term};

use crate::document::GenericDocument;
use crate::query::{QueryBuilder, SearchQuery};
use crate::schema::IndexSchema;
use crate::session::ReadSession;
use crate::types::QueryMode;

/// One scored match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Relevance score; higher is better.
    pub score: f32,
    /// Stored fields of the matched document.
    pub document: GenericDocument,
}

/// Ranked hits, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    hits: Vec<Hit>,
    total: usize,
}

impl SearchResult {
    /// An empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hits in rank order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Matched documents in rank order.
    pub fn documents(&self) -> impl Iterator<Item = &GenericDocument> {
        self.hits.iter().map(|hit| &hit.document)
    }

    /// Consume the result, keeping only the documents.
    pub fn into_documents(self) -> Vec<GenericDocument> {
        self.hits.into_iter().map(|hit| hit.document).collect()
    }

    /// Identifiers of the matched documents in rank order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.documents().map(|doc| doc.identifier.as_str()).collect()
    }

    /// Number of matching documents in the snapshot, which may exceed
    /// [`len`](Self::len) when the limit cut the hit list short.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl IntoIterator for SearchResult {
    type Item = Hit;
    type IntoIter = std::vec::IntoIter<Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

/// Runs queries against read sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchExecutor {
    builder: QueryBuilder,
}

impl SearchExecutor {
    /// Create an executor.
    pub fn new(mode: QueryMode) -> Self {
        Self {
            builder: QueryBuilder::new(mode),
        }
    }

    /// Execute a ranked query.
    ///
    /// Returns at most `query.limit` hits ordered by descending score; equal
    /// scores keep index order. The query is validated and parsed even when
    /// the index does not exist yet.
    pub fn execute(&self, session: &ReadSession<'_>, query: &SearchQuery) -> Result<SearchResult> {
        let parsed = self
            .builder
            .build(session.schema(), &session.tokenizers(), query)?;

        let Some(searcher) = session.searcher() else {
            log::debug!("No index yet, returning no hits for '{}'", query.keyword);
            return Ok(SearchResult::empty());
        };

        let result = collect(searcher, session.schema(), parsed.as_ref(), query.limit)?;
        log::debug!(
            "Query '{}' over {:?} returned {} hits",
            query.keyword,
            query.fields,
            result.len()
        );
        Ok(result)
    }

    /// Find documents whose `field` holds exactly the term `value`.
    ///
    /// Hits are unranked beyond index order.
    pub fn find_term(
        &self,
        session: &ReadSession<'_>,
        field: &str,
        value: &str,
        limit: usize,
    ) -> Result<SearchResult> {
        let schema = session.schema();
        let field = schema.require_field(field)?;
        if limit == 0 {
            return Err(Error::validation_field("limit", "limit must be positive"));
        }

        let Some(searcher) = session.searcher() else {
            return Ok(SearchResult::empty());
        };

        let query = TermQuery::new(
            Term::from_field_text(field, value),
            IndexRecordOption::Basic,
        );
        collect(searcher, schema, &query, limit)
    }
}

fn collect(
    searcher: &Searcher,
    schema: &IndexSchema,
    query: &dyn Query,
    limit: usize,
) -> Result<SearchResult> {
    // The collector preallocates for `limit`, so cap it at what the snapshot holds.
    let available = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
    let limit = limit.min(available.max(1));

    let (mut top, total): (Vec<(Score, DocAddress)>, usize) = searcher
        .search(query, &(TopDocs::with_limit(limit), Count))
        .map_err(|e| Error::index_corrupt(format!("Search failed: {e}")))?;
    top.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut hits = Vec::with_capacity(top.len());
    for (score, address) in top {
        let doc: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| Error::index_corrupt(format!("Failed to load stored document: {e}")))?;
        hits.push(Hit {
            score,
            document: schema.from_tantivy(&doc),
        });
    }

    Ok(SearchResult { hits, total })
}

// ============================================================================
// Tests
// ============================================================================

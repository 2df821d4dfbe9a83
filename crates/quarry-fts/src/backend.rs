//! Async search backend.
//!
//! The synchronous [`Collection`] API is the primary way to search; it does
//! all of its work on the calling thread. [`SearchBackend`] is an opt-in
//! async face for services that must not block their executor on index I/O. The [`Collection`]
//! implementation runs each search on tokio's blocking pool, so a caller can
//! bound it with `tokio::time::timeout`; a search that outlives its timeout
//! still runs to completion and releases its session.
//!
//! ```rust,ignore
//! use quarry_fts::{SearchBackend, SearchParams};
//!
//! let params = SearchParams {
//!     query: "中国".to_string(),
//!     limit: Some(10),
//!     ..Default::default()
//! };
//!
//! let results = news.search(params).await?;
//! println!("Found {} results", results.total);
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::query::SearchQuery;
use crate::search::Hit;

/// Parameters for a search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Keyword string.
    pub query: String,

    /// Fields to search; defaults to every searchable field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,

    /// Per-field weights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f32>>,

    /// Maximum results to return; defaults to the collection's limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Collection of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits, best first.
    pub items: Vec<Hit>,

    /// Total number of matching documents (may be > items.len() if limited).
    pub total: usize,

    /// Backend that executed the search.
    pub backend: String,
}

impl SearchResults {
    /// Create empty results.
    pub fn empty(backend: &str) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            backend: backend.to_string(),
        }
    }
}

/// Abstract search backend trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search query.
    ///
    /// Returns results ordered by relevance (highest first).
    async fn search(&self, params: SearchParams) -> Result<SearchResults>;

    /// Get the backend name for diagnostics.
    fn name(&self) -> &str;

    /// Check if the backend is ready to handle queries.
    fn is_ready(&self) -> bool {
        true
    }
}

impl<R> Collection<R> {
    /// Resolve request parameters against the collection's defaults.
    pub fn resolve_params(&self, params: SearchParams) -> SearchQuery {
        let config = self.config();
        let fields = params
            .fields
            .unwrap_or_else(|| config.searchable_fields.clone());
        let limit = params.limit.unwrap_or(config.default_limit);
        SearchQuery::new(fields, params.query, limit)
            .with_weights(params.weights.unwrap_or_default())
    }
}

#[async_trait]
impl<R: Send + Sync + 'static> SearchBackend for Collection<R> {
    async fn search(&self, params: SearchParams) -> Result<SearchResults> {
        let query = self.resolve_params(params);
        let collection = self.clone();

        let result = tokio::task::spawn_blocking(move || collection.search_query(&query))
            .await
            .map_err(|e| {
                Error::index_unavailable(self.index_path(), format!("search task failed: {e}"))
            })??;

        let total = result.total();
        Ok(SearchResults {
            items: result.into_iter().collect(),
            total,
            backend: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Query building.
//!
//! A [`SearchQuery`] names the fields to search, optional per-field weights,
//! the keyword string and a result cap. [`QueryBuilder`] validates it and
//! hands the keyword to tantivy's query parser, scoped to exactly the
//! requested fields and boosted by their weights.
//!
//! The keyword supports the parser's syntax: bare terms, `"phrases"`,
//! `+required`, `-excluded`, `AND`/`OR`, parentheses and `field:term`.
//! A `field:` prefix may name any field declared in the schema, including
//! ones outside the query's field list; unprefixed terms search only the
//! requested fields. Malformed input is rejected, never corrected.

use std::collections::{BTreeMap, HashSet};

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tantivy::query::{Query, QueryParser};
use tantivy::schema::Field;
use tantivy::tokenizer::TokenizerManager;

use crate::schema::IndexSchema;
use crate::types::QueryMode;

/// Weight applied to fields without an explicit one.
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// A ranked multi-field keyword query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Fields to search, in order.
    pub fields: Vec<String>,
    /// Per-field boosts; fields absent here use [`DEFAULT_WEIGHT`].
    #[serde(default)]
    pub weights: BTreeMap<String, f32>,
    /// Keyword string in query-parser syntax.
    pub keyword: String,
    /// Maximum number of hits.
    pub limit: usize,
}

impl SearchQuery {
    /// Create an unweighted query.
    pub fn new<I, S>(fields: I, keyword: impl Into<String>, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            weights: BTreeMap::new(),
            keyword: keyword.into(),
            limit,
        }
    }

    /// Set per-field weights.
    pub fn with_weights<I, S>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        self.weights
            .extend(weights.into_iter().map(|(field, weight)| (field.into(), weight)));
        self
    }

    /// Set one field's weight.
    pub fn with_weight(mut self, field: impl Into<String>, weight: f32) -> Self {
        self.weights.insert(field.into(), weight);
        self
    }

    /// Drop weights for fields that are not queried.
    pub fn normalize(&mut self) {
        let fields: HashSet<&str> = self.fields.iter().map(String::as_str).collect();
        self.weights.retain(|field, _| fields.contains(field.as_str()));
    }

    /// Effective weight of a field.
    pub fn weight(&self, field: &str) -> f32 {
        self.weights.get(field).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Check the query shape. Weights of unqueried fields are ignored.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::validation_field(
                "fields",
                "at least one field is required",
            ));
        }
        if self.keyword.trim().is_empty() {
            return Err(Error::validation_field(
                "keyword",
                "keyword must not be empty",
            ));
        }
        if self.limit == 0 {
            return Err(Error::validation_field("limit", "limit must be positive"));
        }
        for field in &self.fields {
            let weight = self.weight(field);
            if !weight.is_finite() || weight <= 0.0 {
                return Err(Error::validation_field(
                    field,
                    format!("weight must be a positive number, got {weight}"),
                ));
            }
        }
        Ok(())
    }
}

/// Builds parsed queries from [`SearchQuery`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    mode: QueryMode,
}

impl QueryBuilder {
    /// Create a query builder.
    pub fn new(mode: QueryMode) -> Self {
        Self { mode }
    }

    /// Query mode in use.
    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Validate and parse a query.
    ///
    /// Every queried field must be declared in `schema`. Parse failures are
    /// reported as query syntax errors.
    pub fn build(
        &self,
        schema: &IndexSchema,
        tokenizers: &TokenizerManager,
        query: &SearchQuery,
    ) -> Result<Box<dyn Query>> {
        query.validate()?;

        let mut seen = HashSet::new();
        let mut fields: Vec<(Field, f32)> = Vec::with_capacity(query.fields.len());
        for name in &query.fields {
            if seen.insert(name.as_str()) {
                fields.push((schema.require_field(name)?, query.weight(name)));
            }
        }

        let mut parser = QueryParser::new(
            schema.schema().clone(),
            fields.iter().map(|(field, _)| *field).collect(),
            tokenizers.clone(),
        );
        if self.mode == QueryMode::And {
            parser.set_conjunction_by_default();
        }
        for (field, weight) in &fields {
            if *weight != DEFAULT_WEIGHT {
                parser.set_field_boost(*field, *weight);
            }
        }

        log::debug!(
            "Parsing '{}' over {:?} (mode {:?})",
            query.keyword,
            query.fields,
            self.mode
        );
        parser
            .parse_query(&query.keyword)
            .map_err(|e| Error::query_syntax(&query.keyword, e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

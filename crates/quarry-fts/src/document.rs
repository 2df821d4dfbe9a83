//! Generic document representation.
//!
//! A [`GenericDocument`] is what goes into and comes out of the index: one
//! identifier plus a map of named string values. [`DocumentBuilder`] turns a
//! typed record into one through a [`Projection`].
//!
//! # Creating Documents
//!
//! ```rust
//! use quarry_fts::GenericDocument;
//!
//! let doc = GenericDocument::builder("42")
//!     .field("title", "Weather report")
//!     .field("content", "Sunny")
//!     .build();
//!
//! assert_eq!(doc.identifier, "42");
//! assert_eq!(doc.get("title"), Some("Weather report"));
//! ```

use std::collections::BTreeMap;

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::projection::Projection;

/// A document to be indexed, or a hit read back from the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDocument {
    /// Value of the identifier field (exact-match, never tokenized).
    pub identifier: String,
    /// Other field values by name.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl GenericDocument {
    /// Create a document with no fields.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Create a new document builder.
    pub fn builder(identifier: impl Into<String>) -> GenericDocumentBuilder {
        GenericDocumentBuilder {
            doc: Self::new(identifier),
        }
    }

    /// Value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Set a field value, returning the previous one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field.into(), value.into())
    }
}

/// Builder for [`GenericDocument`].
#[derive(Debug)]
pub struct GenericDocumentBuilder {
    doc: GenericDocument,
}

impl GenericDocumentBuilder {
    /// Set a field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.doc.fields.insert(name.into(), value.into());
        self
    }

    /// Build the document.
    pub fn build(self) -> GenericDocument {
        self.doc
    }
}

/// Assembles [`GenericDocument`]s from typed records.
///
/// Projects the identifier field once and each searchable field once, in
/// declaration order. Either every field projects or no document is built.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    identifier_field: String,
    searchable_fields: Vec<String>,
}

impl DocumentBuilder {
    /// Create a builder for the given field layout.
    pub fn new(identifier_field: impl Into<String>, searchable_fields: Vec<String>) -> Self {
        Self {
            identifier_field: identifier_field.into(),
            searchable_fields,
        }
    }

    /// Identifier field name.
    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    /// Searchable field names in declaration order.
    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    /// Build a document from a record.
    ///
    /// An empty identifier is reported as a projection error, since such a
    /// document could never be updated or deleted by identifier.
    pub fn build<R>(&self, projection: &Projection<R>, record: &R) -> Result<GenericDocument> {
        let identifier = projection.project(record, &self.identifier_field)?;
        if identifier.is_empty() {
            return Err(Error::projection(
                &self.identifier_field,
                "identifier projected to an empty value",
            ));
        }

        let mut doc = GenericDocument::new(identifier);
        for field in &self.searchable_fields {
            let value = projection.project(record, field)?;
            doc.fields.insert(field.clone(), value);
        }
        Ok(doc)
    }
}

// ============================================================================
// Tests
// ============================================================================

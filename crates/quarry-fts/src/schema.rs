//! Tantivy schema derived from a collection configuration.
//!
//! # Field Layout
//!
//! Fields are added in a fixed order so the same configuration always yields
//! the same schema:
//!
//! 1. The identifier field: raw (untokenized) and stored. Exact-match
//!    semantics; used as the delete/update key.
//! 2. Searchable fields, in declaration order: tokenized by the collection
//!    analyzer with frequencies and positions (for phrase matching), stored.
//! 3. Extra fields, as declared: `exact` or `text`, stored or not.
//!
//! An index on disk created from a different configuration will not open with
//! this schema; the session layer reports that as a schema mismatch.

use std::collections::HashMap;

use quarry_core::{Error, Result};
use tantivy::TantivyDocument;
use tantivy::schema::{
    Field, IndexRecordOption, STRING, Schema, SchemaBuilder, TextFieldIndexing, TextOptions, Value,
};

use crate::analyzer::ANALYZER_NAME;
use crate::document::GenericDocument;
use crate::types::{CollectionConfig, FieldKind};

#[derive(Debug, Clone, Copy)]
struct FieldInfo {
    field: Field,
    kind: FieldKind,
    stored: bool,
}

/// Search schema holding field handles and the Tantivy schema.
///
/// Provides typed access to fields by name, so documents and queries never
/// touch raw schema lookups.
#[derive(Clone)]
pub struct IndexSchema {
    schema: Schema,
    identifier_name: String,
    identifier: Field,
    searchable: Vec<(String, Field)>,
    by_name: HashMap<String, FieldInfo>,
}

impl IndexSchema {
    /// Build the schema for a configuration.
    pub fn build(config: &CollectionConfig) -> Self {
        let mut builder = SchemaBuilder::new();
        let mut by_name = HashMap::new();

        let identifier = add_field(&mut builder, &config.identifier_field, FieldKind::Exact, true);
        by_name.insert(
            config.identifier_field.clone(),
            FieldInfo {
                field: identifier,
                kind: FieldKind::Exact,
                stored: true,
            },
        );

        let mut searchable = Vec::with_capacity(config.searchable_fields.len());
        for name in &config.searchable_fields {
            let field = add_field(&mut builder, name, FieldKind::Text, true);
            searchable.push((name.clone(), field));
            by_name.insert(
                name.clone(),
                FieldInfo {
                    field,
                    kind: FieldKind::Text,
                    stored: true,
                },
            );
        }

        for decl in &config.extra_fields {
            let field = add_field(&mut builder, &decl.name, decl.kind, decl.stored);
            by_name.insert(
                decl.name.clone(),
                FieldInfo {
                    field,
                    kind: decl.kind,
                    stored: decl.stored,
                },
            );
        }

        Self {
            schema: builder.build(),
            identifier_name: config.identifier_field.clone(),
            identifier,
            searchable,
            by_name,
        }
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Identifier field handle.
    pub fn identifier(&self) -> Field {
        self.identifier
    }

    /// Identifier field name.
    pub fn identifier_name(&self) -> &str {
        &self.identifier_name
    }

    /// Searchable fields in declaration order.
    pub fn searchable_fields(&self) -> &[(String, Field)] {
        &self.searchable
    }

    /// Look up a field handle by name.
    pub fn field(&self, name: &str) -> Option<Field> {
        self.by_name.get(name).map(|info| info.field)
    }

    /// Look up a field handle by name, failing with `FieldNotFound`.
    pub fn require_field(&self, name: &str) -> Result<Field> {
        self.field(name).ok_or_else(|| Error::field_not_found(name))
    }

    /// Whether the named field is tokenized.
    pub fn is_tokenized(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|info| info.kind == FieldKind::Text)
    }

    /// Whether the named field is stored.
    pub fn is_stored(&self, name: &str) -> bool {
        self.by_name.get(name).is_some_and(|info| info.stored)
    }

    /// Names of stored fields, identifier first, the rest sorted.
    pub fn stored_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .iter()
            .filter(|(name, info)| info.stored && *name != &self.identifier_name)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names.insert(0, self.identifier_name.as_str());
        names
    }

    /// Number of declared fields, identifier included.
    pub fn field_count(&self) -> usize {
        self.by_name.len()
    }

    /// Convert a generic document into a Tantivy document.
    ///
    /// Every field in the document must be declared; the identifier must be
    /// non-empty.
    pub fn to_tantivy(&self, doc: &GenericDocument) -> Result<TantivyDocument> {
        if doc.identifier.is_empty() {
            return Err(Error::validation_field(
                &self.identifier_name,
                "document identifier must not be empty",
            ));
        }

        let mut tantivy_doc = TantivyDocument::new();
        tantivy_doc.add_text(self.identifier, &doc.identifier);

        for (name, value) in &doc.fields {
            if name == &self.identifier_name {
                return Err(Error::validation_field(
                    name,
                    "identifier must be set through the identifier, not as a field",
                ));
            }
            let field = self.require_field(name)?;
            tantivy_doc.add_text(field, value);
        }

        Ok(tantivy_doc)
    }

    /// Materialize a stored Tantivy document back into a generic document.
    ///
    /// Only stored fields are present; unstored fields are absent.
    pub fn from_tantivy(&self, doc: &TantivyDocument) -> GenericDocument {
        let identifier = first_text(doc, self.identifier).unwrap_or_default();
        let mut generic = GenericDocument::new(identifier);

        for (name, info) in &self.by_name {
            if !info.stored || info.field == self.identifier {
                continue;
            }
            if let Some(value) = first_text(doc, info.field) {
                generic.fields.insert(name.clone(), value);
            }
        }

        generic
    }
}

fn add_field(builder: &mut SchemaBuilder, name: &str, kind: FieldKind, stored: bool) -> Field {
    let options = match kind {
        FieldKind::Exact => STRING,
        FieldKind::Text => TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(ANALYZER_NAME)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        ),
    };
    let options = if stored { options.set_stored() } else { options };
    builder.add_text_field(name, options)
}

fn first_text(doc: &TantivyDocument, field: Field) -> Option<String> {
    doc.get_first(field)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

impl std::fmt::Debug for IndexSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSchema")
            .field("identifier", &self.identifier_name)
            .field("field_count", &self.field_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Field projection from typed records.
//!
//! A [`Projection`] is an explicit table mapping field names to extractor
//! functions for one record type. Collections check at construction time that
//! every configured field has an extractor, so a missing field is a setup
//! error rather than something discovered per record.
//!
//! ```rust
//! use quarry_fts::Projection;
//!
//! struct Article {
//!     id: u32,
//!     title: String,
//! }
//!
//! let projection = Projection::<Article>::builder()
//!     .field("id", |a| a.id)
//!     .field("title", |a| a.title.clone())
//!     .build();
//!
//! let article = Article { id: 7, title: "Hello".to_string() };
//! assert_eq!(projection.project(&article, "id").unwrap(), "7");
//! assert!(projection.project(&article, "author").is_err());
//! ```

use std::collections::HashMap;
use std::fmt;

use quarry_core::{Error, Result};

type Extractor<R> = Box<dyn Fn(&R) -> std::result::Result<String, String> + Send + Sync>;

/// Named string extractors for a record type.
pub struct Projection<R> {
    extractors: HashMap<String, Extractor<R>>,
}

impl<R> Projection<R> {
    /// Start building a projection.
    pub fn builder() -> ProjectionBuilder<R> {
        ProjectionBuilder {
            extractors: HashMap::new(),
        }
    }

    /// Project one field of a record to its string value.
    ///
    /// Fails with [`Error::FieldNotFound`] when no extractor is registered
    /// and with [`Error::Projection`] when the extractor itself fails.
    pub fn project(&self, record: &R, field: &str) -> Result<String> {
        let extractor = self
            .extractors
            .get(field)
            .ok_or_else(|| Error::field_not_found(field))?;
        extractor(record).map_err(|message| Error::projection(field, message))
    }

    /// Whether an extractor is registered for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.extractors.contains_key(field)
    }

    /// Verify that every name in `fields` has an extractor.
    pub fn check_covers<'a, I>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for field in fields {
            if !self.has_field(field) {
                return Err(Error::field_not_found(field));
            }
        }
        Ok(())
    }

    /// Registered field names, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<R> fmt::Debug for Projection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("fields", &self.field_names())
            .finish()
    }
}

/// Builder for [`Projection`].
pub struct ProjectionBuilder<R> {
    extractors: HashMap<String, Extractor<R>>,
}

impl<R> ProjectionBuilder<R> {
    /// Register an infallible extractor. Later registrations replace earlier
    /// ones for the same name.
    pub fn field<F, V>(mut self, name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: ToString,
    {
        self.extractors
            .insert(name.into(), Box::new(move |r| Ok(extract(r).to_string())));
        self
    }

    /// Register a fallible extractor; its error becomes a projection error.
    pub fn try_field<F, V, E>(mut self, name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&R) -> std::result::Result<V, E> + Send + Sync + 'static,
        V: ToString,
        E: fmt::Display,
    {
        self.extractors.insert(
            name.into(),
            Box::new(move |r| {
                extract(r)
                    .map(|v| v.to_string())
                    .map_err(|e| e.to_string())
            }),
        );
        self
    }

    /// Build the projection.
    pub fn build(self) -> Projection<R> {
        Projection {
            extractors: self.extractors,
        }
    }
}

/// Record types that carry their own projection table.
pub trait Record: Sized {
    /// The extractor table for this type.
    fn projection() -> Projection<Self>;
}

// ============================================================================
// Tests
// ============================================================================

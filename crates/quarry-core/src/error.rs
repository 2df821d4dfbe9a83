//! Error types for Quarry.
//!
//! The variants mirror the failure classes a search collection can surface:
//! record projection, index availability, query syntax, and structural read
//! failures. The facade never retries; [`Error::is_retryable`] lets callers
//! decide.

use std::path::{Path, PathBuf};

/// Result type alias for Quarry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing or searching a collection.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No extractor is registered for a field name.
    #[error("Field not found: {field}")]
    FieldNotFound {
        /// Field that could not be resolved
        field: String,
    },

    /// An extractor ran but could not produce a value.
    #[error("Projection of field '{field}' failed: {message}")]
    Projection {
        /// Field being projected
        field: String,
        /// What went wrong
        message: String,
    },

    /// The index directory cannot be created or opened.
    #[error("Index unavailable at {}: {message}", path.display())]
    IndexUnavailable {
        /// Index directory
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// An index already exists at the path with a different field layout.
    #[error("Schema mismatch at {}: {message}", path.display())]
    SchemaMismatch {
        /// Index directory
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// The keyword string could not be parsed.
    #[error("Query syntax error in '{query}': {message}")]
    QuerySyntax {
        /// Keyword string as supplied
        query: String,
        /// Parser diagnostic
        message: String,
    },

    /// A structural failure while reading the index.
    #[error("Index corrupt: {message}")]
    IndexCorrupt {
        /// What went wrong
        message: String,
    },

    /// Input rejected before reaching the engine.
    #[error("Validation error: {message}")]
    Validation {
        /// Field or parameter that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error tied to a path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns whether a caller may reasonably retry the operation.
    ///
    /// Only availability problems are transient; everything else stays
    /// wrong until the input or the data changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::IndexUnavailable { .. } => true,
            Error::Io { .. } => true,
            Error::FieldNotFound { .. } => false,
            Error::Projection { .. } => false,
            Error::SchemaMismatch { .. } => false,
            Error::QuerySyntax { .. } => false,
            Error::IndexCorrupt { .. } => false,
            Error::Validation { .. } => false,
            Error::Config { .. } => false,
        }
    }

    /// Creates a field-not-found error.
    pub fn field_not_found<S: Into<String>>(field: S) -> Self {
        Error::FieldNotFound {
            field: field.into(),
        }
    }

    /// Creates a projection error.
    pub fn projection<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Projection {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an index-unavailable error.
    pub fn index_unavailable<M: Into<String>>(path: &Path, message: M) -> Self {
        Error::IndexUnavailable {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a schema-mismatch error.
    pub fn schema_mismatch<M: Into<String>>(path: &Path, message: M) -> Self {
        Error::SchemaMismatch {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a query syntax error.
    pub fn query_syntax<Q, M>(query: Q, message: M) -> Self
    where
        Q: Into<String>,
        M: Into<String>,
    {
        Error::QuerySyntax {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Creates an index-corrupt error.
    pub fn index_corrupt<M: Into<String>>(message: M) -> Self {
        Error::IndexCorrupt {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a validation error tied to a field or parameter name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that triggered it.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

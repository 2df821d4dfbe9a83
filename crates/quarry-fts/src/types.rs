//! Collection configuration.
//!
//! A [`CollectionConfig`] fixes everything a collection needs at
//! construction time: which namespace (and therefore which index directory)
//! it owns, which field is the identifier, which fields are searchable, and
//! how text is analyzed and queried.
//!
//! Configurations can be built in code or loaded from TOML:
//!
//! ```rust
//! use quarry_fts::CollectionConfig;
//!
//! let config = CollectionConfig::from_toml_str(r#"
//!     namespace = "NewsInfo"
//!     identifier_field = "nid"
//!     searchable_fields = ["title", "content"]
//! "#).unwrap();
//!
//! assert_eq!(config.index_root.to_str(), Some("index"));
//! assert_eq!(config.default_limit, 10);
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use quarry_core::util::namespace::{
    DEFAULT_INDEX_ROOT, effective_index_root, resolve_index_path, validate_namespace,
};
use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;

/// How bare keyword terms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Any term can match (OR).
    #[default]
    Or,
    /// All terms must match (AND).
    And,
}

/// How a declared field is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Indexed verbatim as a single term (exact-match semantics).
    Exact,
    /// Tokenized by the collection's analyzer (term semantics).
    Text,
}

/// An additional field for pre-built documents with custom typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Indexing kind.
    pub kind: FieldKind,
    /// Whether the value is stored and returned with hits.
    #[serde(default = "default_true")]
    pub stored: bool,
}

impl FieldDecl {
    /// Declare a field.
    pub fn new(name: impl Into<String>, kind: FieldKind, stored: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            stored,
        }
    }
}

/// Configuration for one collection (one namespace, one index directory).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Logical collection name; the index lives at `<index_root>/<namespace>`.
    pub namespace: String,

    /// Field holding the unique identifier (stored, never tokenized).
    pub identifier_field: String,

    /// Searchable fields in declaration order (stored and tokenized).
    pub searchable_fields: Vec<String>,

    /// Root directory for all namespaces.
    #[serde(default = "default_index_root")]
    pub index_root: PathBuf,

    /// Text analyzer for tokenized fields and keyword parsing.
    #[serde(default)]
    pub analyzer: Analyzer,

    /// Default combination of bare keyword terms.
    #[serde(default)]
    pub query_mode: QueryMode,

    /// Result cap used when a request does not set one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Index writer memory budget in bytes.
    #[serde(default = "default_writer_memory")]
    pub writer_memory_bytes: usize,

    /// Extra fields accepted from pre-built documents.
    #[serde(default)]
    pub extra_fields: Vec<FieldDecl>,
}

fn default_index_root() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_ROOT)
}

fn default_limit() -> usize {
    10
}

fn default_writer_memory() -> usize {
    50_000_000
}

fn default_true() -> bool {
    true
}

impl CollectionConfig {
    /// Create a configuration with defaults for everything but the fields.
    pub fn new<N, I, F, S>(namespace: N, identifier_field: I, searchable_fields: F) -> Self
    where
        N: Into<String>,
        I: Into<String>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            identifier_field: identifier_field.into(),
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
            index_root: default_index_root(),
            analyzer: Analyzer::default(),
            query_mode: QueryMode::default(),
            default_limit: default_limit(),
            writer_memory_bytes: default_writer_memory(),
            extra_fields: Vec::new(),
        }
    }

    /// Set the index root directory.
    pub fn with_index_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.index_root = root.into();
        self
    }

    /// Set the analyzer.
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set the query mode.
    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    /// Set the default result cap.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Declare an extra field for pre-built documents.
    pub fn with_extra_field(mut self, field: FieldDecl) -> Self {
        self.extra_fields.push(field);
        self
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse collection config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str::<Self>(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
            .and_then(|config| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Check the configuration for structural problems.
    pub fn validate(&self) -> Result<()> {
        validate_namespace(&self.namespace)?;

        if self.identifier_field.trim().is_empty() {
            return Err(Error::config("identifier_field must not be empty"));
        }
        if self.searchable_fields.is_empty() {
            return Err(Error::config("searchable_fields must not be empty"));
        }
        if self.default_limit == 0 {
            return Err(Error::config("default_limit must be positive"));
        }

        let mut seen = HashSet::new();
        seen.insert(self.identifier_field.as_str());
        let names = self
            .searchable_fields
            .iter()
            .chain(self.extra_fields.iter().map(|f| &f.name));
        for name in names {
            if name.trim().is_empty() {
                return Err(Error::config("field names must not be empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!(
                    "field '{name}' is declared more than once"
                )));
            }
        }

        Ok(())
    }

    /// Directory holding this collection's index.
    ///
    /// `QUARRY_INDEX_ROOT` overrides the root only while it is the default.
    pub fn index_path(&self) -> Result<PathBuf> {
        resolve_index_path(&effective_index_root(&self.index_root), &self.namespace)
    }
}

// ============================================================================
// Tests
// ============================================================================

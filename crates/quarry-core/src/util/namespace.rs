//! Namespace validation and index path resolution.
//!
//! A namespace is the logical collection name; it maps to exactly one
//! directory under the index root. Namespaces are a single path component so
//! two collections can never share or nest directories.
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use quarry_core::util::namespace::resolve_index_path;
//!
//! let path = resolve_index_path(Path::new("index"), "NewsInfo").unwrap();
//! assert_eq!(path, Path::new("index/NewsInfo"));
//! ```

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Environment variable that overrides the configured index root.
pub const INDEX_ROOT_ENV: &str = "QUARRY_INDEX_ROOT";

/// Check that a namespace is a single, non-empty, relative path component.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.trim().is_empty() {
        return Err(Error::validation_field(
            "namespace",
            "namespace must not be empty",
        ));
    }

    let mut components = Path::new(namespace).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::validation_field(
            "namespace",
            format!("namespace '{namespace}' must be a single path component"),
        )),
    }
}

/// Resolve `<root>/<namespace>` after validating the namespace.
pub fn resolve_index_path(root: &Path, namespace: &str) -> Result<PathBuf> {
    validate_namespace(namespace)?;
    Ok(root.join(namespace))
}

/// Root used when the configuration does not name one.
pub const DEFAULT_INDEX_ROOT: &str = "index";

/// Pick the index root.
///
/// The environment override replaces only the default root; a root set
/// explicitly in code or configuration always wins.
pub fn effective_index_root(configured: &Path) -> PathBuf {
    select_index_root(configured, std::env::var_os(INDEX_ROOT_ENV))
}

fn select_index_root(configured: &Path, env_root: Option<OsString>) -> PathBuf {
    match env_root {
        Some(root) if !root.is_empty() && configured == Path::new(DEFAULT_INDEX_ROOT) => {
            log::debug!("Using index root from {INDEX_ROOT_ENV}: {root:?}");
            PathBuf::from(root)
        }
        _ => configured.to_path_buf(),
    }
}

//! Quarry Core: shared error taxonomy and namespace utilities.
//!
//! This crate has no search-engine dependency. It is shared by the facade
//! crate (`quarry-fts`) and by anything that wants to classify its errors.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`util`]: Namespace validation and index path resolution

pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

pub use util::namespace::{resolve_index_path, validate_namespace};

//! Utility modules.
//!
//! # Modules
//!
//! - [`namespace`]: Namespace validation and `<root>/<namespace>` resolution

pub mod namespace;

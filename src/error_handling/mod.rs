//! Error types and transport error categorization.
//!
//! This module provides:
//! - Error type definitions for initialization, fetching and table operations
//! - Categorization of transport failures for log output
//!
//! Errors fall into four groups:
//! - **Configuration errors**: rejected before any work starts
//! - **Lookup misses**: not errors, resolved to null
//! - **Parse failures**: not errors, the original text is kept
//! - **Transport failures**: propagated, aborting the fetch

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_fetch_error, TransportErrorKind};
pub use types::{FetchError, InitializationError, TableError};

//! Run-level logging shared by the extractors and the CLI.
//!
//! This module provides the request log (one line per request plus run
//! summaries), written to a log file and/or the logger.

pub mod logging;

// Re-export public API
pub use logging::{format_hms, timestamp, RunLog};

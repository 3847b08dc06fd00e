//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (API endpoints, pacing, file naming)
//! - Logging options shared by the library and the CLI
//! - The extraction run configuration

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{ExtractConfig, LogFormat, LogLevel};

//! Configuration types.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and library configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_BATCH_COUNT, DEFAULT_BATCH_SIZE, DEFAULT_FIELDS, IGDB_API_BASE_URL, LOG_FILE,
    MIN_REQUEST_INTERVAL, TWITCH_TOKEN_URL,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Configuration of an extraction run against the game-metadata API.
///
/// Constructed programmatically or from the CLI `extract` subcommand.
///
/// # Examples
///
/// ```no_run
/// use gamedata_etl::ExtractConfig;
///
/// let config = ExtractConfig {
///     endpoints: vec!["games".to_string(), "genres".to_string()],
///     client_id: "my-client".to_string(),
///     client_secret: "my-secret".to_string(),
///     batch_count: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Endpoint names, without the base URL. The first becomes the main table.
    pub endpoints: Vec<String>,

    /// OAuth client id (also sent as the `Client-ID` header)
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Maximum number of requests per endpoint
    pub batch_count: usize,

    /// Records requested per batch
    pub batch_size: usize,

    /// Field list sent with every request
    pub fields: String,

    /// Minimum time between the start of two requests
    pub min_interval: Duration,

    /// Append request log lines to `log_file`
    pub keep_logs: bool,

    /// Emit request log lines through the logger
    pub show_logs: bool,

    /// Log file path
    pub log_file: PathBuf,

    /// Directory to write `{endpoint}_data.csv` files into (no files when `None`)
    pub save_csv_dir: Option<PathBuf>,

    /// Base URL endpoints are appended to
    pub api_base_url: String,

    /// OAuth token endpoint
    pub token_url: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            client_id: String::new(),
            client_secret: String::new(),
            batch_count: DEFAULT_BATCH_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            fields: DEFAULT_FIELDS.to_string(),
            min_interval: MIN_REQUEST_INTERVAL,
            keep_logs: false,
            show_logs: true,
            log_file: PathBuf::from(LOG_FILE),
            save_csv_dir: None,
            api_base_url: IGDB_API_BASE_URL.to_string(),
            token_url: TWITCH_TOKEN_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_log_level_ordering() {
        let error = log::LevelFilter::from(LogLevel::Error);
        let warn = log::LevelFilter::from(LogLevel::Warn);
        let info = log::LevelFilter::from(LogLevel::Info);
        let debug = log::LevelFilter::from(LogLevel::Debug);
        let trace = log::LevelFilter::from(LogLevel::Trace);

        assert!(error < warn);
        assert!(warn < info);
        assert!(info < debug);
        assert!(debug < trace);
    }

    #[test]
    fn test_extract_config_default() {
        let config = ExtractConfig::default();
        assert!(config.endpoints.is_empty());
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.batch_count, 100_000);
        assert_eq!(config.fields, "*");
        assert_eq!(config.min_interval, Duration::from_millis(255));
        assert!(!config.keep_logs);
        assert!(config.show_logs);
        assert_eq!(config.log_file, PathBuf::from("logs.txt"));
        assert!(config.save_csv_dir.is_none());
        assert_eq!(config.api_base_url, "https://api.igdb.com/v4");
    }
}

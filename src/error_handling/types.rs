//! Error type definitions.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The token request failed or its body was not JSON.
    #[error("Access token request error: {0}")]
    TokenRequestError(#[source] ReqwestError),

    /// The token endpoint answered without an `access_token`.
    #[error("Access token missing from token response (status {status})")]
    TokenError {
        /// HTTP status of the token response
        status: u16,
    },
}

/// Errors raised while fetching pages from a remote API.
///
/// None of these are retried: the first one aborts the fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network, TLS or body read failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        /// Requested URL
        url: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A batch size of zero can never make progress.
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    /// The server returned more records than were requested.
    #[error("Batch {batch} returned {received} records, more than the requested {limit}")]
    OversizedBatch {
        /// 1-based batch index
        batch: usize,
        /// Records in the response
        received: usize,
        /// Requested limit
        limit: usize,
    },
}

/// Errors raised by table loading and column operations.
#[derive(Error, Debug)]
pub enum TableError {
    /// Parallel option lists of a rewrite plan differ in length.
    #[error("'columns', 'tables', 'fields' and 'keys' must all be the same size (got {columns}, {tables}, {fields}, {keys})")]
    LengthMismatch {
        /// Number of columns to rewrite
        columns: usize,
        /// Number of foreign tables
        tables: usize,
        /// Number of value columns
        fields: usize,
        /// Number of key columns (equal to `columns` when one key is shared)
        keys: usize,
    },

    /// No table is registered under this name.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The table has no column with this name.
    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn {
        /// Table name
        table: String,
        /// Column name
        column: String,
    },

    /// A column's cell count differs from the table's row count.
    #[error("Column '{column}' has {actual} cells, table has {expected} rows")]
    RowCount {
        /// Column name
        column: String,
        /// Rows in the table
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// An operation addressed the main table before anything was loaded.
    #[error("No main table loaded")]
    NoMainTable,

    /// CSV read or write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including API locations, pacing, batch limits and file naming.

use std::time::Duration;

/// Base URL of the game-metadata API (endpoint names are appended).
pub const IGDB_API_BASE_URL: &str = "https://api.igdb.com/v4";

/// OAuth2 token endpoint used for the client-credentials grant.
pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Base URL of the spreadsheet backend (`{base}/{app}/{table}`).
pub const AIRTABLE_API_BASE_URL: &str = "https://api.airtable.com/v0";

/// Maximum number of records the game-metadata API returns per request.
pub const MAX_BATCH_SIZE: usize = 500;

/// Default number of records requested per batch.
pub const DEFAULT_BATCH_SIZE: usize = MAX_BATCH_SIZE;

/// Default ceiling on the number of requests per endpoint.
pub const DEFAULT_BATCH_COUNT: usize = 100_000;

/// Default field list (`*` selects every field).
pub const DEFAULT_FIELDS: &str = "*";

/// Minimum time between the start of two consecutive requests.
///
/// The API allows 4 requests per second; 255ms keeps us just under it.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(255);

/// File the request log lines are appended to when `keep_logs` is set.
pub const LOG_FILE: &str = "logs.txt";

/// Suffix of persisted table files (`{name}_data.csv`).
pub const CSV_SUFFIX: &str = "_data.csv";

/// Default key column used when resolving foreign ids.
pub const DEFAULT_KEY_COLUMN: &str = "id";

/// Text the spreadsheet backend uses for missing numeric values.
pub const SPREADSHEET_NAN: &str = "nan";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("gamedata_etl/", env!("CARGO_PKG_VERSION"));

//! HTTP client initialization.

use reqwest::ClientBuilder;

use crate::config::USER_AGENT;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client shared by every request of a run.
///
/// No request timeout is set: a stalled request stalls the run, which is
/// then aborted by the caller.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client() -> Result<reqwest::Client, InitializationError> {
    Ok(ClientBuilder::new().user_agent(USER_AGENT).build()?)
}

//! Transport error categorization.
//!
//! Failures are not retried, so the category only feeds the final log line
//! that explains why a fetch was aborted.

use super::types::FetchError;

/// Coarse category of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// 401/403: bad or expired credentials
    Unauthorized,
    /// 404: wrong endpoint name
    NotFound,
    /// 429: the request-rate ceiling was exceeded
    TooManyRequests,
    /// Other 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Connection could not be established
    Connect,
    /// Body was not the expected JSON
    Decode,
    /// Invalid request parameters (batch size, oversized pages)
    Protocol,
    /// Anything else
    Other,
}

impl TransportErrorKind {
    /// Returns a human-readable label for log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Unauthorized => "Unauthorized (401/403)",
            TransportErrorKind::NotFound => "Not Found (404)",
            TransportErrorKind::TooManyRequests => "Too many requests (429)",
            TransportErrorKind::ClientError => "Client error (4xx)",
            TransportErrorKind::ServerError => "Server error (5xx)",
            TransportErrorKind::Connect => "Connect error",
            TransportErrorKind::Decode => "Decode error",
            TransportErrorKind::Protocol => "Protocol error",
            TransportErrorKind::Other => "Other error",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn categorize_status(status: u16) -> TransportErrorKind {
    match status {
        401 | 403 => TransportErrorKind::Unauthorized,
        404 => TransportErrorKind::NotFound,
        429 => TransportErrorKind::TooManyRequests,
        400..=499 => TransportErrorKind::ClientError,
        500..=599 => TransportErrorKind::ServerError,
        _ => TransportErrorKind::Other,
    }
}

/// Categorizes a `FetchError` for logging.
///
/// # Arguments
///
/// * `error` - The error that aborted the fetch
///
/// # Returns
///
/// The matching `TransportErrorKind`.
pub fn categorize_fetch_error(error: &FetchError) -> TransportErrorKind {
    match error {
        FetchError::Status { status, .. } => categorize_status(*status),
        FetchError::Decode { .. } => TransportErrorKind::Decode,
        FetchError::InvalidBatchSize | FetchError::OversizedBatch { .. } => {
            TransportErrorKind::Protocol
        }
        FetchError::Transport(e) => {
            if let Some(status) = e.status() {
                categorize_status(status.as_u16())
            } else if e.is_connect() {
                TransportErrorKind::Connect
            } else if e.is_decode() {
                TransportErrorKind::Decode
            } else {
                TransportErrorKind::Other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> FetchError {
        FetchError::Status {
            status,
            url: "http://localhost/games".to_string(),
        }
    }

    #[test]
    fn test_categorize_status_codes() {
        assert_eq!(
            categorize_fetch_error(&status_error(401)),
            TransportErrorKind::Unauthorized
        );
        assert_eq!(
            categorize_fetch_error(&status_error(403)),
            TransportErrorKind::Unauthorized
        );
        assert_eq!(
            categorize_fetch_error(&status_error(404)),
            TransportErrorKind::NotFound
        );
        assert_eq!(
            categorize_fetch_error(&status_error(429)),
            TransportErrorKind::TooManyRequests
        );
        assert_eq!(
            categorize_fetch_error(&status_error(418)),
            TransportErrorKind::ClientError
        );
        assert_eq!(
            categorize_fetch_error(&status_error(503)),
            TransportErrorKind::ServerError
        );
    }

    #[test]
    fn test_categorize_protocol_errors() {
        assert_eq!(
            categorize_fetch_error(&FetchError::InvalidBatchSize),
            TransportErrorKind::Protocol
        );
        let oversized = FetchError::OversizedBatch {
            batch: 1,
            received: 3,
            limit: 2,
        };
        assert_eq!(
            categorize_fetch_error(&oversized),
            TransportErrorKind::Protocol
        );
    }

    #[test]
    fn test_categorize_decode_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FetchError::Decode {
            url: "http://localhost/games".to_string(),
            source,
        };
        assert_eq!(categorize_fetch_error(&err), TransportErrorKind::Decode);
        assert_eq!(TransportErrorKind::Decode.to_string(), "Decode error");
    }

    #[test]
    fn test_categorize_transport_error_without_status() {
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert_eq!(
            categorize_fetch_error(&FetchError::Transport(source)),
            TransportErrorKind::Other
        );
    }
}

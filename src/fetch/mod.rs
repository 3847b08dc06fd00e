//! Paginated extraction from REST APIs.
//!
//! This module provides:
//! - [`PaginatedFetcher`]: the offset/limit fetch loop with fixed-interval pacing
//! - [`PageSource`]: the seam between the loop and a concrete API
//! - [`igdb`]: the game-metadata API page source and token acquisition
//! - [`spreadsheet`]: cursor-paginated extraction from the spreadsheet backend
//!
//! Fetching is sequential: each request is awaited before the next one is
//! issued. Failures are never retried.

pub mod igdb;
pub mod pacer;
pub mod spreadsheet;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, error};

use crate::app::{timestamp, RunLog};
use crate::error_handling::{categorize_fetch_error, FetchError};
use crate::table::Record;
use pacer::{Clock, Pacer, Sleeper, SystemClock, TokioSleeper};

/// Parameters of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery<'a> {
    /// Field list, passed through verbatim
    pub fields: &'a str,
    /// Maximum number of records in the page
    pub limit: usize,
    /// Number of records to skip
    pub offset: usize,
}

/// One page of records and the status it was served with.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// HTTP status code
    pub status: u16,
    /// Records in the page
    pub records: Vec<Record>,
}

/// A remote API that serves records by offset and limit.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Requests one page from `endpoint`.
    ///
    /// # Errors
    ///
    /// Implementations return `FetchError` on transport failure, non-success
    /// status, or an undecodable body.
    async fn fetch_page(&self, endpoint: &str, query: &PageQuery<'_>) -> Result<Page, FetchError>;
}

/// Fetches an endpoint page by page while respecting a minimum interval
/// between request starts.
pub struct PaginatedFetcher<S, C = SystemClock, Z = TokioSleeper> {
    source: S,
    pacer: Pacer<C, Z>,
    log: RunLog,
}

impl<S: PageSource> PaginatedFetcher<S> {
    /// Creates a fetcher on the wall clock.
    ///
    /// # Arguments
    ///
    /// * `source` - API the pages are requested from
    /// * `min_interval` - Minimum time between the starts of two requests
    /// * `log` - Destination of the per-request and summary lines
    pub fn new(source: S, min_interval: Duration, log: RunLog) -> Self {
        Self::with_pacer(source, Pacer::new(min_interval), log)
    }
}

impl<S, C, Z> PaginatedFetcher<S, C, Z>
where
    S: PageSource,
    C: Clock,
    Z: Sleeper,
{
    /// Creates a fetcher with an explicit pacer.
    pub fn with_pacer(source: S, pacer: Pacer<C, Z>, log: RunLog) -> Self {
        Self { source, pacer, log }
    }

    /// The page source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetches up to `batch_count` pages of `batch_size` records from `endpoint`.
    ///
    /// Requests go out at offsets `0, batch_size, 2 * batch_size, ...`. The
    /// loop ends after the first page with zero records, or after
    /// `batch_count` requests even if more data exists. A short page does not
    /// end the loop.
    ///
    /// One log line is written per request (endpoint, batch, status, response
    /// time, time elapsed) and one summary line when the loop ends.
    ///
    /// # Returns
    ///
    /// All records received, in request order.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidBatchSize` when `batch_size` is 0, and
    /// `FetchError::OversizedBatch` when a page holds more than `batch_size`
    /// records. Any error from the page source aborts the fetch and is
    /// returned as-is; records received so far are dropped.
    pub async fn fetch(
        &mut self,
        endpoint: &str,
        fields: &str,
        batch_count: usize,
        batch_size: usize,
    ) -> Result<Vec<Record>, FetchError> {
        if batch_size == 0 {
            return Err(FetchError::InvalidBatchSize);
        }

        let started = self.pacer.now();
        let mut data: Vec<Record> = Vec::new();
        let mut requests = 0usize;

        for batch in 0..batch_count {
            let query = PageQuery {
                fields,
                limit: batch_size,
                offset: batch * batch_size,
            };

            let request_start = self.pacer.wait().await;
            requests += 1;
            let page = match self.source.fetch_page(endpoint, &query).await {
                Ok(page) => page,
                Err(e) => {
                    error!(
                        "Fetch of {} aborted at batch {} ({}): {}",
                        endpoint,
                        batch + 1,
                        categorize_fetch_error(&e),
                        e
                    );
                    return Err(e);
                }
            };
            let finished = self.pacer.now();

            let received = page.records.len();
            if received > batch_size {
                return Err(FetchError::OversizedBatch {
                    batch: batch + 1,
                    received,
                    limit: batch_size,
                });
            }

            self.log.write(&request_line(
                endpoint,
                batch + 1,
                page.status,
                finished.saturating_duration_since(request_start),
                finished.saturating_duration_since(started),
            ));

            data.extend(page.records);

            if received == 0 {
                debug!("{}: empty batch {}, end of data", endpoint, batch + 1);
                break;
            }
            if batch + 1 == batch_count {
                debug!(
                    "{}: batch ceiling of {} reached, further records not requested",
                    endpoint, batch_count
                );
            }
        }

        let total = elapsed_since(started, self.pacer.now());
        self.log.write(&format!(
            "[FETCH_DATA] | {} | Endpoint: {} | Requests {} | Total time {:.2}s | Dataset size {}",
            timestamp(),
            endpoint,
            requests,
            total.as_secs_f64(),
            data.len()
        ));

        Ok(data)
    }
}

fn elapsed_since(start: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(start)
}

/// Formats the per-request log line.
fn request_line(
    endpoint: &str,
    batch: usize,
    status: u16,
    response_time: Duration,
    elapsed: Duration,
) -> String {
    format!(
        "[REQUEST] | {} | Status {} | Endpoint: {} | Batch {} | Response time [{:.2}s] | Time elapsed [{:.2}s]",
        timestamp(),
        status,
        endpoint,
        batch,
        response_time.as_secs_f64(),
        elapsed.as_secs_f64()
    )
}

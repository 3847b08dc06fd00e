//! gamedata_etl library: paginated extraction and table flattening
//!
//! This library pulls paginated records from a game-metadata API and a
//! spreadsheet backend, loads them into named tables, and resolves
//! foreign-id columns against auxiliary tables.
//!
//! # Example
//!
//! ```no_run
//! use gamedata_etl::{run_extract, ExtractConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractConfig {
//!     endpoints: vec!["games".to_string(), "genres".to_string()],
//!     client_id: "my-client-id".to_string(),
//!     client_secret: "my-client-secret".to_string(),
//!     batch_count: 4,
//!     ..Default::default()
//! };
//!
//! let report = run_extract(config).await?;
//! for (endpoint, count) in &report.records_per_endpoint {
//!     println!("{}: {} records", endpoint, count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Extraction requires a Tokio runtime. Table loading and the column
//! transformations are synchronous.

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod dataset;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod table;
pub mod transform;

// Re-export public API
pub use config::{ExtractConfig, LogFormat, LogLevel};
pub use dataset::{Dataset, Source, TableRef};
pub use error_handling::{FetchError, InitializationError, TableError};
pub use run::{endpoint_url, run_extract, ExtractReport};
pub use table::{Record, Table};
pub use transform::{KeyColumns, ReplacePlan};

// Internal run module (contains the extraction entry point)
mod run {
    use std::path::PathBuf;
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;

    use crate::app::{format_hms, timestamp, RunLog};
    use crate::config::ExtractConfig;
    use crate::dataset::{Dataset, Source};
    use crate::fetch::igdb::{request_access_token, IgdbSource};
    use crate::fetch::PaginatedFetcher;
    use crate::initialization::init_client;

    /// Results of an extraction run.
    #[derive(Debug, Clone)]
    pub struct ExtractReport {
        /// Extracted tables; the first endpoint is the main table
        pub dataset: Dataset,
        /// Record count per endpoint, in request order
        pub records_per_endpoint: Vec<(String, usize)>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
        /// CSV files written (empty unless `save_csv_dir` was set)
        pub csv_files: Vec<PathBuf>,
    }

    /// Full URL of an endpoint.
    pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Extracts every configured endpoint.
    ///
    /// Obtains an access token, then fetches the endpoints one after the
    /// other through a single paced fetcher, so the minimum interval also
    /// holds across endpoint boundaries. The first endpoint becomes the main
    /// table of the returned dataset.
    ///
    /// # Arguments
    ///
    /// * `config` - Credentials, endpoints, batching and logging options
    ///
    /// # Returns
    ///
    /// An `ExtractReport` with the loaded tables and per-endpoint counts.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The HTTP client cannot be built
    /// - No access token can be obtained
    /// - Any request fails (no retry is attempted)
    /// - Writing the CSV files fails
    pub async fn run_extract(config: ExtractConfig) -> Result<ExtractReport> {
        let start_time = Instant::now();

        let client = init_client().context("Failed to initialize HTTP client")?;
        let token = request_access_token(
            &client,
            &config.token_url,
            &config.client_id,
            &config.client_secret,
        )
        .await
        .context("Failed to obtain access token")?;

        let log = RunLog::new(
            config.keep_logs.then(|| config.log_file.clone()),
            config.show_logs,
        );
        let source = IgdbSource::new(client, config.client_id.as_str(), token);
        let mut fetcher = PaginatedFetcher::new(source, config.min_interval, log.clone());

        let mut dataset = Dataset::new();
        let mut records_per_endpoint = Vec::with_capacity(config.endpoints.len());
        for endpoint in &config.endpoints {
            let url = endpoint_url(&config.api_base_url, endpoint);
            let records = fetcher
                .fetch(&url, &config.fields, config.batch_count, config.batch_size)
                .await
                .with_context(|| format!("Failed to fetch endpoint '{}'", endpoint))?;
            info!("{}: {} records", endpoint, records.len());
            records_per_endpoint.push((endpoint.clone(), records.len()));
            dataset.push(Source::Records {
                name: endpoint.clone(),
                records,
            })?;
        }

        let csv_files = match &config.save_csv_dir {
            Some(dir) => dataset
                .save_csvs(dir)
                .with_context(|| format!("Failed to save CSV files to {}", dir.display()))?,
            None => Vec::new(),
        };

        let elapsed = start_time.elapsed();
        log.write(&format!(
            "[EXTRACT] | {} | DATA EXTRACTION FINISHED | TOTAL TIME: {}",
            timestamp(),
            format_hms(elapsed)
        ));

        Ok(ExtractReport {
            dataset,
            records_per_endpoint,
            elapsed_seconds: elapsed.as_secs_f64(),
            csv_files,
        })
    }

}

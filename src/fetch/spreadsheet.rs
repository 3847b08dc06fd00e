//! Spreadsheet backend extraction.
//!
//! The backend serves a table as pages of `{"records": [{"id", "createdTime",
//! "fields": {...}}], "offset": "..."}`. The `offset` cursor of each response
//! is sent back with the next request; a response without one is the last.

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{AIRTABLE_API_BASE_URL, SPREADSHEET_NAN};
use crate::error_handling::FetchError;
use crate::table::literal::parse_cell;
use crate::table::Record;

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<RemoteRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteRecord {
    #[serde(default)]
    fields: Record,
}

/// Client for reading tables from the spreadsheet backend.
#[derive(Debug, Clone)]
pub struct SpreadsheetClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SpreadsheetClient {
    /// Creates a client against the public API.
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, AIRTABLE_API_BASE_URL, api_key)
    }

    /// Creates a client against another base URL.
    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// URL of one table.
    pub fn table_url(&self, app: &str, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, app, table)
    }

    /// Reads every record of one table, following the `offset` cursor.
    ///
    /// Each record's `fields` object becomes a [`Record`]; text cells are
    /// normalized with [`normalize_cell`].
    ///
    /// # Errors
    ///
    /// The first failed request aborts the extraction, see [`FetchError`].
    pub async fn extract_table(&self, app: &str, table: &str) -> Result<Vec<Record>, FetchError> {
        let url = self.table_url(app, table);
        let mut records: Vec<Record> = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).bearer_auth(&self.api_key);
            if let Some(cursor) = &offset {
                request = request.query(&[("offset", cursor.as_str())]);
            }
            let response = request.send().await?;
            let status = response.status();
            debug!("GET {} -> {}", response.url(), status);
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }

            let body = response.text().await?;
            let page: ListResponse =
                serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                    url: url.clone(),
                    source,
                })?;

            records.extend(page.records.into_iter().map(|r| normalize_record(r.fields)));
            debug!("{}: {} records so far", table, records.len());

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        info!("Extracted {} records from {}/{}", records.len(), app, table);
        Ok(records)
    }

    /// Reads several tables of one app and concatenates their records in order.
    ///
    /// # Errors
    ///
    /// The first failed table aborts the extraction.
    pub async fn extract_tables<S: AsRef<str>>(
        &self,
        app: &str,
        tables: &[S],
    ) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();
        for table in tables {
            records.extend(self.extract_table(app, table.as_ref()).await?);
        }
        Ok(records)
    }
}

fn normalize_record(fields: Record) -> Record {
    fields
        .into_iter()
        .map(|(key, value)| (key, normalize_cell(value)))
        .collect()
}

/// Normalizes a cell read from the spreadsheet backend.
///
/// Text runs through the literal parse chain (`"[1, 2]"` becomes a list,
/// `"12"` a number) and the text `nan` becomes null. Other values are kept.
pub fn normalize_cell(value: Value) -> Value {
    match value {
        Value::String(text) if text == SPREADSHEET_NAN => Value::Null,
        Value::String(text) => parse_cell(&text).into_value(),
        other => other,
    }
}

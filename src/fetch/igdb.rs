//! Game-metadata API page source.
//!
//! Pages are requested with a POST whose body is the API's query language:
//! `fields {fields}; limit {limit}; offset {offset};`. Requests carry the
//! application's client id and a bearer token obtained through the OAuth2
//! client-credentials grant.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{Page, PageQuery, PageSource};
use crate::error_handling::{FetchError, InitializationError};
use crate::table::Record;

/// Header carrying the application's client id.
pub const CLIENT_ID_HEADER: &str = "Client-ID";

/// Builds the request body for one page.
pub fn request_body(query: &PageQuery<'_>) -> String {
    format!(
        "fields {}; limit {}; offset {};",
        query.fields, query.limit, query.offset
    )
}

/// Page source for the game-metadata API.
#[derive(Debug, Clone)]
pub struct IgdbSource {
    client: Client,
    client_id: String,
    token: String,
}

impl IgdbSource {
    /// Creates a page source.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every request
    /// * `client_id` - Sent as the `Client-ID` header
    /// * `token` - Bearer token for the `Authorization` header
    pub fn new(client: Client, client_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl PageSource for IgdbSource {
    async fn fetch_page(&self, endpoint: &str, query: &PageQuery<'_>) -> Result<Page, FetchError> {
        let response = self
            .client
            .post(endpoint)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .bearer_auth(&self.token)
            .body(request_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let records: Vec<Record> =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                url: endpoint.to_string(),
                source,
            })?;

        Ok(Page {
            status: status.as_u16(),
            records,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Requests an access token with the client-credentials grant.
///
/// # Arguments
///
/// * `client` - HTTP client
/// * `token_url` - OAuth2 token endpoint
/// * `client_id` - Application client id
/// * `client_secret` - Application client secret
///
/// # Errors
///
/// Returns `InitializationError::TokenRequestError` if the request fails or
/// the body is not JSON, and `InitializationError::TokenError` if the response
/// carries no `access_token`.
pub async fn request_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, InitializationError> {
    let response = client
        .post(token_url)
        .query(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "client_credentials"),
        ])
        .send()
        .await
        .map_err(InitializationError::TokenRequestError)?;

    let status = response.status().as_u16();
    let body: TokenResponse = response
        .json()
        .await
        .map_err(InitializationError::TokenRequestError)?;

    body.access_token
        .filter(|token| !token.is_empty())
        .ok_or(InitializationError::TokenError { status })
}

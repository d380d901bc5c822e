//! Frappe REST client.
//!
//! Handles authentication, response decoding, Frappe error bodies and retry
//! with exponential backoff for transient failures.

use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{count_path, ListQuery, ListResponse, MethodResponse, Record};
use crate::config::Profile;
use crate::table::ServerQuery;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for one request.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Batch size used when reading a whole doctype.
const FETCH_ALL_BATCH: usize = 500;

/// Upper bound on batches read by [`FrappeClient::get_all`].
const FETCH_ALL_MAX_BATCHES: usize = 200;

/// Client for one Frappe site.
#[derive(Debug, Clone)]
pub struct FrappeClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl FrappeClient {
    /// Create a client for a profile, reading the secret from the keyring.
    #[instrument(skip(profile), fields(profile_name = %profile.name))]
    pub fn from_profile(profile: &Profile) -> Result<Self> {
        let auth = Auth::from_keyring(&profile.name, &profile.api_key, profile.auth)?;
        let client = Self::with_auth(&profile.url, auth)?;
        info!(url = %client.base_url, "Frappe client created");
        Ok(client)
    }

    /// Create a client with explicit credentials.
    pub fn with_auth(base_url: &str, auth: Auth) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The user the key pair belongs to.
    #[instrument(skip(self))]
    pub async fn logged_user(&self) -> Result<String> {
        let response: MethodResponse<String> = self
            .get("/api/method/frappe.auth.get_logged_user")
            .await?;
        info!(user = %response.message, "Connected");
        Ok(response.message)
    }

    /// One list request.
    #[instrument(skip(self, query), fields(doctype = %query.doctype, start = query.limit_start))]
    pub async fn get_list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        let response: ListResponse = self.get(&query.to_path()).await?;
        debug!(rows = response.data.len(), "List fetched");
        Ok(response.data)
    }

    /// Number of documents matching `filters`.
    #[instrument(skip(self, filters))]
    pub async fn get_count(&self, doctype: &str, filters: &str) -> Result<usize> {
        let response: MethodResponse<usize> = self.get(&count_path(doctype, filters)).await?;
        Ok(response.message)
    }

    /// One table page and the total count for its filters, fetched together.
    pub async fn get_page(
        &self,
        doctype: &str,
        fields: &[&str],
        query: &ServerQuery,
    ) -> Result<(Vec<Record>, usize)> {
        let list = ListQuery::from_server(doctype, fields, query);
        let filters = query.filters_json();
        tokio::try_join!(self.get_list(&list), self.get_count(doctype, &filters))
    }

    /// Every row matching `base`, read in batches.
    #[instrument(skip(self, base), fields(doctype = %base.doctype))]
    pub async fn get_all(&self, base: &ListQuery) -> Result<Vec<Record>> {
        let mut rows = Vec::new();
        for batch in 0..FETCH_ALL_MAX_BATCHES {
            let query = base.clone().page(batch * FETCH_ALL_BATCH, FETCH_ALL_BATCH);
            let page = self.get_list(&query).await?;
            let done = page.len() < FETCH_ALL_BATCH;
            rows.extend(page);
            if done {
                debug!(rows = rows.len(), "All rows fetched");
                return Ok(rows);
            }
        }
        warn!(
            rows = rows.len(),
            "Stopped after {} batches; result is truncated", FETCH_ALL_MAX_BATCHES
        );
        Ok(rows)
    }

    /// GET with retry.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            match self.execute_get::<T>(&url).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                    let delay = calculate_retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let url = response.url().path().to_string();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    } else {
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);
        Err(ApiError::from_status(status, &url, &body))
    }
}

fn calculate_retry_delay(attempt: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(attempt.saturating_sub(1))
}

/// Trim trailing slashes and require an http(s) scheme.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ApiError::InvalidUrl(url.to_string()));
    }
    if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}", url);
    }
    Ok(url.to_string())
}

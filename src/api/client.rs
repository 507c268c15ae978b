//! Employee filter API client.
//!
//! Issues `GET /api/employees/filter` with the non-empty criteria and turns
//! the response envelope into a `FilterPage` or a `FetchError`.

use crate::api::models::{ApiEnvelope, FilterPage};
use crate::config::Config;
use crate::filter::FilterCriteria;
use anyhow::Context;
use reqwest::{Client, StatusCode, Url};
use std::future::Future;
use std::time::Duration;

/// Path of the filtering endpoint, relative to the application origin.
pub const FILTER_PATH: &str = "/api/employees/filter";

/// Why a filter request did not produce a list.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// `error` field in the response envelope
    #[error("{0}")]
    Application(String),

    /// Body was not a valid envelope
    #[error("invalid response: {0}")]
    Decode(String),

    /// Superseded by a newer request
    #[error("request superseded")]
    Cancelled,
}

/// Something that can answer a filter query.
///
/// The returned future must not borrow `self`: it is spawned onto the
/// runtime and may outlive the call.
pub trait EmployeeSource: Send + Sync + 'static {
    fn fetch(
        &self,
        criteria: &FilterCriteria,
    ) -> impl Future<Output = Result<FilterPage, FetchError>> + Send + 'static;
}

/// HTTP client for the application's employee API.
#[derive(Debug, Clone)]
pub struct EmployeeClient {
    /// HTTP client for API requests
    client: Client,
    /// Absolute URL of the filtering endpoint
    filter_url: Url,
}

impl EmployeeClient {
    /// Create a new client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `anyhow::Result<EmployeeClient>` - New client or error
    ///
    /// # Details
    /// Fails when `base_url` is not an absolute URL.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base_url: {}", config.base_url))?;
        let filter_url = base
            .join(FILTER_PATH)
            .with_context(|| format!("Cannot build filter URL from {}", base))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, filter_url })
    }

    /// Build the request URL for the given criteria.
    ///
    /// # Details
    /// Only non-empty fields become query parameters; with no constraints the
    /// URL carries no query string at all.
    pub fn filter_url(&self, criteria: &FilterCriteria) -> Url {
        let mut url = self.filter_url.clone();
        let pairs = criteria.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    async fn get_page(client: Client, url: Url) -> Result<FilterPage, FetchError> {
        let response = client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

impl EmployeeSource for EmployeeClient {
    fn fetch(
        &self,
        criteria: &FilterCriteria,
    ) -> impl Future<Output = Result<FilterPage, FetchError>> + Send + 'static {
        let client = self.client.clone();
        let url = self.filter_url(criteria);
        tracing::debug!(%url, "requesting employees");
        Self::get_page(client, url)
    }
}

/// Interpret a response status and body.
///
/// # Details
/// - non-2xx: `Status`, using the envelope's `error` text when the body has
///   one, otherwise the status reason;
/// - 2xx with `error`: `Application`;
/// - 2xx otherwise: the page; `count` falls back to the number of records.
pub fn parse_response(status: StatusCode, body: &str) -> Result<FilterPage, FetchError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ApiEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(FetchError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(error) = envelope.error {
        return Err(FetchError::Application(error));
    }

    let count = envelope.count.unwrap_or(envelope.employees.len());
    Ok(FilterPage {
        employees: envelope.employees,
        count,
    })
}

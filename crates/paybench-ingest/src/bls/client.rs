//! HTTP client for the BLS timeseries API

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::response::BlsResponse;
use crate::config::BlsConfig;

/// Why a batch produced no usable response. Recoverable: the batch's series
/// become gaps and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error on batch request: {0}")]
    Transport(String),

    #[error("HTTP error on batch request: status {0}")]
    Status(u16),

    #[error("BLS response is not valid JSON: {0}")]
    Malformed(String),

    #[error("Unexpected BLS response schema, missing 'status' or 'Results'. Keys found: {0:?}")]
    SchemaMismatch(Vec<String>),
}

/// Source of timeseries responses
#[async_trait]
pub trait BlsApi: Send + Sync {
    /// Request one batch of series for a single year
    async fn fetch_batch(&self, series_ids: &[String], year: i32)
        -> Result<BlsResponse, FetchError>;
}

#[async_trait]
impl<T: BlsApi + ?Sized> BlsApi for Arc<T> {
    async fn fetch_batch(
        &self,
        series_ids: &[String],
        year: i32,
    ) -> Result<BlsResponse, FetchError> {
        (**self).fetch_batch(series_ids, year).await
    }
}

#[derive(Debug, Serialize)]
struct TimeseriesRequest<'a> {
    seriesid: &'a [String],
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<&'a str>,
}

/// BLS public API v2 client
pub struct BlsClient {
    client: Client,
    series_url: String,
    registration_key: Option<String>,
}

impl BlsClient {
    pub fn new(config: &BlsConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            series_url: config.series_url(),
            registration_key: config.registration_key.clone(),
        })
    }
}

#[async_trait]
impl BlsApi for BlsClient {
    async fn fetch_batch(
        &self,
        series_ids: &[String],
        year: i32,
    ) -> Result<BlsResponse, FetchError> {
        let request = TimeseriesRequest {
            seriesid: series_ids,
            startyear: year.to_string(),
            endyear: year.to_string(),
            registrationkey: self.registration_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.series_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let value: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        match value.as_object() {
            Some(object) if object.contains_key("status") && object.contains_key("Results") => {},
            Some(object) => {
                return Err(FetchError::SchemaMismatch(object.keys().cloned().collect()));
            },
            None => return Err(FetchError::SchemaMismatch(Vec::new())),
        }

        let parsed: BlsResponse =
            serde_json::from_value(value).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if parsed.succeeded() {
            debug!(series = parsed.series().len(), "BLS request succeeded");
        } else {
            // Partial data may still be present; parse it anyway.
            warn!(
                status = parsed.status.as_deref().unwrap_or("<missing>"),
                messages = ?parsed.message,
                "BLS API did not report success"
            );
        }

        Ok(parsed)
    }
}

//! HTTP Aggregation Backend
//!
//! Talks to the surveillance analytics service over its JSON aggregation
//! endpoint. Transport failures are surfaced to the caller; retries, if any,
//! belong to the layer in front of this backend.

use crate::backend::{AggregationBackend, AggregationRequest, AggregationResponse};
use crate::error::{EpiError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

// Aggregation API: POST /v1/aggregate with the request as JSON.
// GET /v1/health reports service availability.

pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Create a new HTTP backend
    ///
    /// # Arguments
    /// * `base_url` - Service base URL (e.g. "http://localhost:8080")
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EpiError::Backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create the backend from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("EPIVIGIL_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        Self::new(base_url)
    }
}

#[async_trait]
impl AggregationBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, request: &AggregationRequest) -> Result<AggregationResponse> {
        let url = format!("{}/v1/aggregate", self.base_url);
        info!(
            "Fetching {} for period {}",
            request.measure, request.filters.period
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| EpiError::Backend(format!("Failed to submit aggregation request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EpiError::Backend(format!(
                "Aggregation request failed with status {}: {}",
                status, text
            )));
        }

        let parsed: AggregationResponse = response.json().await.map_err(|e| {
            EpiError::Backend(format!("Failed to parse aggregation response: {}", e))
        })?;

        Ok(parsed)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    Ok(true)
                } else {
                    error!("Health check failed: status {}", response.status());
                    Ok(false)
                }
            }
            Err(e) => {
                error!("Health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

//! In-Memory Aggregation Backend
//!
//! Serves canned per-period responses. Used by tests and offline runs;
//! failures can be programmed per period to exercise partial results.

use crate::backend::{
    AggregationBackend, AggregationRequest, AggregationResponse, ResponseMetadata,
};
use crate::error::{EpiError, Result};
use crate::period::EpiPeriod;
use crate::row::MetricRow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryBackend {
    responses: Mutex<HashMap<(String, EpiPeriod), Vec<MetricRow>>>,
    failures: Mutex<HashMap<(String, EpiPeriod), String>>,
    fetches: AtomicU64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows returned for a (measure, period) pair.
    pub fn insert(&self, measure: impl Into<String>, period: EpiPeriod, rows: Vec<MetricRow>) {
        self.responses
            .lock()
            .unwrap()
            .insert((measure.into(), period), rows);
    }

    /// Make fetches for a (measure, period) pair fail with the given message.
    pub fn fail_with(&self, measure: impl Into<String>, period: EpiPeriod, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap()
            .insert((measure.into(), period), message.into());
    }

    /// Total number of fetches served, including failed ones.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AggregationBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, request: &AggregationRequest) -> Result<AggregationResponse> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let key = (request.measure.clone(), request.filters.period);

        if let Some(message) = self.failures.lock().unwrap().get(&key) {
            return Err(EpiError::Backend(message.clone()));
        }

        let data = self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default();

        let total_rows = data.len() as u64;
        Ok(AggregationResponse {
            data,
            metadata: ResponseMetadata {
                measure: request.measure.clone(),
                dimensions: request.dimensions.clone(),
                total_rows,
            },
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_canned_rows_and_counts_fetches() {
        let backend = InMemoryBackend::new();
        let period = EpiPeriod::new(2025, 1, 2025, 10).unwrap();
        backend.insert(
            "casos_notificados",
            period,
            vec![MetricRow::new().set("provincia", "Chaco").set("valor", 40)],
        );

        let query = crate::query::MetricQuery::new("casos_notificados", period);
        let request = AggregationRequest::for_period(&query, period);

        let response = backend.fetch(&request).await.unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.metadata.total_rows, 1);
        assert_eq!(backend.fetch_count(), 1);

        // Unknown periods come back empty, not as errors.
        let other = EpiPeriod::new(2024, 1, 2024, 10).unwrap();
        let request = AggregationRequest::for_period(&query, other);
        let response = backend.fetch(&request).await.unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_programmed_failures_surface_as_backend_errors() {
        let backend = InMemoryBackend::new();
        let period = EpiPeriod::new(2025, 1, 2025, 10).unwrap();
        backend.fail_with("casos_notificados", period, "aggregation timed out");

        let query = crate::query::MetricQuery::new("casos_notificados", period);
        let request = AggregationRequest::for_period(&query, period);
        let err = backend.fetch(&request).await.unwrap_err();
        assert!(err.to_string().contains("aggregation timed out"));
    }
}

//! Aggregation Backend Trait - contract for the remote analytics service
//!
//! The engine is transport-agnostic; backends are pluggable and only need to
//! answer the aggregation request shape below.

use crate::error::Result;
use crate::period::EpiPeriod;
use crate::query::MetricQuery;
use crate::row::MetricRow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

/// Filters block of an aggregation request: the period plus any extra field
/// filters, flattened on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFilters {
    pub period: EpiPeriod,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One physical aggregation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub measure: String,
    pub dimensions: Vec<String>,
    pub filters: RequestFilters,
}

impl AggregationRequest {
    /// Materialize the request for one of the two periods of a query.
    pub fn for_period(query: &MetricQuery, period: EpiPeriod) -> Self {
        Self {
            measure: query.measure.clone(),
            dimensions: query.dimensions.clone(),
            filters: RequestFilters {
                period,
                extra: query.filters.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub measure: String,
    pub dimensions: Vec<String>,
    pub total_rows: u64,
}

/// Aggregation response. Rows are not guaranteed sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResponse {
    pub data: Vec<MetricRow>,
    pub metadata: ResponseMetadata,
}

/// Aggregation backend trait - all backends must implement this
#[async_trait]
pub trait AggregationBackend: Send + Sync {
    /// Backend name (e.g. "http", "memory")
    fn name(&self) -> &'static str;

    /// Run one aggregation request
    async fn fetch(&self, request: &AggregationRequest) -> Result<AggregationResponse>;

    /// Check if the backend is available/healthy
    async fn health_check(&self) -> Result<bool>;
}

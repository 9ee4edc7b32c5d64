//! Metric Query Model
//!
//! One logical comparison request. The engine expands it into two physical
//! aggregation requests that differ only in period.

use crate::comparison::ComparisonMode;
use crate::period::EpiPeriod;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricQuery {
    pub measure: String,
    pub dimensions: Vec<String>,
    pub period: EpiPeriod,
    /// Field filters; values may be scalars or lists. Ordered so the
    /// fingerprint is stable.
    pub filters: BTreeMap<String, Value>,
    pub comparison: ComparisonMode,
}

impl MetricQuery {
    pub fn new(measure: impl Into<String>, period: EpiPeriod) -> Self {
        Self {
            measure: measure.into(),
            dimensions: Vec::new(),
            period,
            filters: BTreeMap::new(),
            comparison: ComparisonMode::None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Vec<String>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn with_comparison(mut self, comparison: ComparisonMode) -> Self {
        self.comparison = comparison;
        self
    }

    /// Stable cache key over the full query tuple. Two queries with the same
    /// measure, dimensions, period, filters, and mode always produce the
    /// same string, so an external request layer can dedup on it.
    pub fn fingerprint(&self) -> String {
        let filters = self
            .filters
            .iter()
            .map(|(field, value)| format!("{}={}", field, value))
            .join(",");
        format!(
            "{}|{}|{}|{}|{}",
            self.measure,
            self.dimensions.join(","),
            self.period,
            filters,
            self.comparison.as_str()
        )
    }
}

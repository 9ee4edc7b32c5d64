//! Dual-Period Query Coordinator
//!
//! Resolves the comparison window for a query, fetches both windows from the
//! aggregation backend concurrently, and merges the two result sets into a
//! single comparison view. The two fetches are independent: one side failing
//! never discards the other side's rows.

use crate::backend::{AggregationBackend, AggregationRequest, ResponseMetadata};
use crate::catalog::MeasureCatalog;
use crate::comparison::comparison_period;
use crate::delta::{calculate_delta, Delta};
use crate::error::Result;
use crate::observability::{ComparisonLogEntry, QueryLogger};
use crate::period::EpiPeriod;
use crate::query::MetricQuery;
use crate::row::{KeyFields, MetricRow};
use crate::row_key::row_key;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Merged view over the current and comparison result sets of one query.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub fingerprint: String,
    /// Always a vec; empty while nothing loaded or on failure.
    pub current: Vec<MetricRow>,
    /// `None` when no comparison ran or the comparison fetch failed.
    pub previous: Option<Vec<MetricRow>>,
    pub current_error: Option<String>,
    pub previous_error: Option<String>,
    pub current_period: EpiPeriod,
    pub previous_period: Option<EpiPeriod>,
    pub current_metadata: Option<ResponseMetadata>,
    pub previous_metadata: Option<ResponseMetadata>,
    key_fields: KeyFields,
    previous_by_key: HashMap<String, f64>,
}

impl ComparisonResult {
    /// Measure value of the previous row matching the descriptor's
    /// dimensional key. `None` when no comparison ran, the comparison fetch
    /// failed, or no previous row matches.
    pub fn previous_value(&self, descriptor: &MetricRow) -> Option<f64> {
        if self.previous.is_none() {
            return None;
        }
        let key = row_key(descriptor, &self.key_fields, &[]);
        self.previous_by_key.get(&key).copied()
    }

    pub fn delta(&self, current: f64, previous: f64) -> Delta {
        calculate_delta(current, previous)
    }

    /// Key of a row, as used for previous-row lookups.
    pub fn key_of(&self, row: &MetricRow) -> String {
        row_key(row, &self.key_fields, &[])
    }

    /// Measure value of a row under this result's field naming.
    pub fn measure_value(&self, row: &MetricRow) -> Option<f64> {
        row.number(&self.key_fields.measure)
    }

    /// True when one side failed while the other still has data.
    pub fn is_partial(&self) -> bool {
        self.current_error.is_some() != self.previous_error.is_some()
    }
}

/// Coordinates the two per-period fetches behind one logical query.
pub struct ComparisonEngine {
    backend: Arc<dyn AggregationBackend>,
    catalog: Option<MeasureCatalog>,
    key_fields: KeyFields,
    logger: Option<QueryLogger>,
}

impl ComparisonEngine {
    pub fn new(backend: Arc<dyn AggregationBackend>) -> Self {
        Self {
            backend,
            catalog: None,
            key_fields: KeyFields::default(),
            logger: None,
        }
    }

    pub fn with_catalog(mut self, catalog: MeasureCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_key_fields(mut self, key_fields: KeyFields) -> Self {
        self.key_fields = key_fields;
        self
    }

    pub fn with_logger(mut self, logger: QueryLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Run one comparison. Catalog violations fail fast; fetch failures are
    /// reported per side on the result instead of as an error.
    pub async fn run(&self, query: &MetricQuery) -> Result<ComparisonResult> {
        let started = Instant::now();

        if let Some(catalog) = &self.catalog {
            catalog.validate(query)?;
        }

        let previous_period = comparison_period(&query.period, query.comparison);
        info!(
            "Comparing {} over {} ({})",
            query.measure,
            query.period,
            query.comparison.as_str()
        );

        let current_request = AggregationRequest::for_period(query, query.period);
        let current_fut = self.backend.fetch(&current_request);

        // The comparison fetch is skipped entirely for mode none, not issued
        // and discarded.
        let (current_outcome, previous_outcome) = match previous_period {
            Some(period) => {
                let previous_request = AggregationRequest::for_period(query, period);
                let (current, previous) =
                    tokio::join!(current_fut, self.backend.fetch(&previous_request));
                (current, Some(previous))
            }
            None => (current_fut.await, None),
        };

        let (current, current_error, current_metadata) = match current_outcome {
            Ok(response) => (response.data, None, Some(response.metadata)),
            Err(e) => {
                warn!("Current period fetch failed: {}", e);
                (Vec::new(), Some(e.to_string()), None)
            }
        };

        let (previous, previous_error, previous_metadata) = match previous_outcome {
            Some(Ok(response)) => (Some(response.data), None, Some(response.metadata)),
            Some(Err(e)) => {
                warn!("Comparison period fetch failed: {}", e);
                (None, Some(e.to_string()), None)
            }
            None => (None, None, None),
        };

        // The lookup index is rebuilt for every result, so it can never
        // serve values from an earlier dataset.
        let previous_by_key =
            build_previous_index(previous.as_deref().unwrap_or(&[]), &self.key_fields);

        let result = ComparisonResult {
            fingerprint: query.fingerprint(),
            current,
            previous,
            current_error,
            previous_error,
            current_period: query.period,
            previous_period,
            current_metadata,
            previous_metadata,
            key_fields: self.key_fields.clone(),
            previous_by_key,
        };

        if let Some(logger) = &self.logger {
            let entry = ComparisonLogEntry {
                timestamp: Utc::now(),
                query_id: Uuid::new_v4().to_string(),
                measure: query.measure.clone(),
                period: query.period.to_string(),
                comparison: query.comparison.as_str().to_string(),
                current_rows: result.current.len(),
                previous_rows: result.previous.as_ref().map(|rows| rows.len()),
                duration_ms: started.elapsed().as_millis() as u64,
                success: result.current_error.is_none() && result.previous_error.is_none(),
                error_message: result
                    .current_error
                    .clone()
                    .or_else(|| result.previous_error.clone()),
            };
            if let Err(e) = logger.log(entry) {
                warn!("Failed to log comparison run: {}", e);
            }
        }

        Ok(result)
    }
}

fn build_previous_index(rows: &[MetricRow], key_fields: &KeyFields) -> HashMap<String, f64> {
    let mut index = HashMap::new();
    for row in rows {
        if let Some(value) = row.number(&key_fields.measure) {
            index.insert(row_key(row, key_fields, &[]), value);
        }
    }
    index
}

/// Keeps only the latest comparison state when queries are re-submitted
/// while earlier fetch pairs are still in flight. A completion belonging to
/// a superseded submission is dropped instead of overwriting newer state.
pub struct ComparisonSession {
    engine: Arc<ComparisonEngine>,
    submissions: AtomicU64,
    latest: Mutex<Option<SessionState>>,
}

struct SessionState {
    seq: u64,
    fingerprint: String,
    result: Arc<ComparisonResult>,
}

impl ComparisonSession {
    pub fn new(engine: Arc<ComparisonEngine>) -> Self {
        Self {
            engine,
            submissions: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Run the query. Returns `None` when a newer submission overtook this
    /// one while its fetches were in flight.
    pub async fn submit(&self, query: &MetricQuery) -> Result<Option<Arc<ComparisonResult>>> {
        let seq = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        let result = Arc::new(self.engine.run(query).await?);

        let mut latest = self.latest.lock().unwrap();
        match latest.as_ref() {
            Some(state) if state.seq > seq => {
                info!("Discarding superseded result for {}", result.fingerprint);
                Ok(None)
            }
            _ => {
                *latest = Some(SessionState {
                    seq,
                    fingerprint: result.fingerprint.clone(),
                    result: Arc::clone(&result),
                });
                Ok(Some(result))
            }
        }
    }

    /// Latest stored result, if it belongs to the given query fingerprint.
    pub fn latest(&self, fingerprint: &str) -> Option<Arc<ComparisonResult>> {
        let latest = self.latest.lock().unwrap();
        latest
            .as_ref()
            .filter(|state| state.fingerprint == fingerprint)
            .map(|state| Arc::clone(&state.result))
    }
}

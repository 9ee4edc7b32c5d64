//! Measure Catalog
//!
//! Defines which surveillance measures exist and which dimensions and
//! filters each one supports. Queries are validated against the catalog
//! before anything is sent to the aggregation service.

use crate::error::{EpiError, Result};
use crate::query::MetricQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregation applied server-side when the measure is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    CountDistinct,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count => "count",
            Aggregation::CountDistinct => "count_distinct",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}

/// Filter a measure cannot be queried without
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredFilter {
    pub field: String,
    pub description: String,
}

/// Surveillance measure definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveillanceMeasure {
    pub name: String,
    pub description: String,
    pub aggregation: Aggregation,
    /// Dimensions the measure may be grouped by. Empty means unrestricted.
    pub allowed_dimensions: Vec<String>,
    pub required_filters: Vec<RequiredFilter>,
}

impl SurveillanceMeasure {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            aggregation,
            allowed_dimensions: Vec::new(),
            required_filters: Vec::new(),
        }
    }

    pub fn with_allowed_dimensions(mut self, dimensions: Vec<String>) -> Self {
        self.allowed_dimensions = dimensions;
        self
    }

    pub fn with_required_filters(mut self, filters: Vec<RequiredFilter>) -> Self {
        self.required_filters = filters;
        self
    }
}

/// In-memory measure catalog
#[derive(Default)]
pub struct MeasureCatalog {
    measures: HashMap<String, SurveillanceMeasure>,
}

impl MeasureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, measure: SurveillanceMeasure) {
        self.measures.insert(measure.name.clone(), measure);
    }

    pub fn measure(&self, name: &str) -> Option<&SurveillanceMeasure> {
        // Try exact match first
        if let Some(measure) = self.measures.get(name) {
            return Some(measure);
        }

        // Try case-insensitive match
        self.measures
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, measure)| measure)
    }

    pub fn list_measures(&self) -> Vec<String> {
        let mut names: Vec<String> = self.measures.keys().cloned().collect();
        names.sort();
        names
    }

    /// Validate a query before it is sent anywhere.
    pub fn validate(&self, query: &MetricQuery) -> Result<()> {
        let measure = self.measure(&query.measure).ok_or_else(|| {
            EpiError::Catalog(format!("Unknown measure: {}", query.measure))
        })?;

        if !measure.allowed_dimensions.is_empty() {
            for dimension in &query.dimensions {
                if !measure.allowed_dimensions.contains(dimension) {
                    return Err(EpiError::Catalog(format!(
                        "Dimension '{}' is not allowed for measure '{}'",
                        dimension, measure.name
                    )));
                }
            }
        }

        for required in &measure.required_filters {
            if !query.filters.contains_key(&required.field) {
                return Err(EpiError::Catalog(format!(
                    "Measure '{}' requires filter '{}'",
                    measure.name, required.field
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::EpiPeriod;

    fn catalog() -> MeasureCatalog {
        let mut catalog = MeasureCatalog::new();
        catalog.register(
            SurveillanceMeasure::new(
                "casos_notificados",
                "Notified case count",
                Aggregation::Sum,
            )
            .with_allowed_dimensions(vec![
                "provincia".to_string(),
                "grupo_etario".to_string(),
            ])
            .with_required_filters(vec![RequiredFilter {
                field: "evento".to_string(),
                description: "Event type under surveillance".to_string(),
            }]),
        );
        catalog
    }

    fn period() -> EpiPeriod {
        EpiPeriod::new(2025, 1, 2025, 10).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = catalog();
        assert!(catalog.measure("casos_notificados").is_some());
        assert!(catalog.measure("Casos_Notificados").is_some());
        assert!(catalog.measure("unknown").is_none());
        assert_eq!(catalog.list_measures(), vec!["casos_notificados"]);
    }

    #[test]
    fn test_validate_accepts_well_formed_queries() {
        let query = MetricQuery::new("casos_notificados", period())
            .with_dimensions(vec!["provincia".to_string()])
            .with_filter("evento", "dengue");
        assert!(catalog().validate(&query).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_measure() {
        let query = MetricQuery::new("internaciones", period());
        let err = catalog().validate(&query).unwrap_err();
        assert!(err.to_string().contains("Unknown measure"));
    }

    #[test]
    fn test_validate_rejects_disallowed_dimension() {
        let query = MetricQuery::new("casos_notificados", period())
            .with_dimensions(vec!["hospital".to_string()])
            .with_filter("evento", "dengue");
        let err = catalog().validate(&query).unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn test_validate_rejects_missing_required_filter() {
        let query = MetricQuery::new("casos_notificados", period());
        let err = catalog().validate(&query).unwrap_err();
        assert!(err.to_string().contains("requires filter"));
    }
}

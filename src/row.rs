//! Metric Row Model
//!
//! Flat result rows from the aggregation service: field name to JSON scalar.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One result row. Backed by an ordered map so downstream key building is
/// independent of the order fields arrived in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricRow(pub BTreeMap<String, Value>);

impl MetricRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Numeric value of a field, accepting both JSON numbers and numeric
    /// strings (the service is not consistent about which it sends).
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Field names that never take part in a row's dimensional identity: the
/// measure value itself and the two period-identifying fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFields {
    pub measure: String,
    pub week: String,
    pub year: String,
}

impl Default for KeyFields {
    fn default() -> Self {
        // Wire names used by the surveillance service
        Self {
            measure: "valor".to_string(),
            week: "semana_epidemiologica".to_string(),
            year: "anio".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_accepts_numbers_and_numeric_strings() {
        let row = MetricRow::new()
            .set("valor", 40)
            .set("tasa", "12.5")
            .set("provincia", "Chaco");

        assert_eq!(row.number("valor"), Some(40.0));
        assert_eq!(row.number("tasa"), Some(12.5));
        assert_eq!(row.number("provincia"), None);
        assert_eq!(row.number("missing"), None);
    }

    #[test]
    fn test_rows_deserialize_from_plain_objects() {
        let row: MetricRow = serde_json::from_value(json!({
            "provincia": "Chaco",
            "valor": 40,
            "semana_epidemiologica": 10
        }))
        .unwrap();
        assert_eq!(row.get("provincia"), Some(&json!("Chaco")));
        assert_eq!(row.number("valor"), Some(40.0));
    }
}

//! Row Key Normalization
//!
//! Canonical, order-independent identity for a dimensional slice, used to
//! match rows across the current and comparison result sets. The two
//! underlying queries return different week/year values for the "same"
//! slice, so those fields never participate in the key.

use crate::row::{KeyFields, MetricRow};
use itertools::Itertools;
use serde_json::Value;

/// Build the canonical key for a row: excluded and null fields are skipped,
/// the remaining `field:value` pairs are sorted and joined with `|`.
///
/// Two rows with the same non-excluded field/value pairs always produce the
/// same key, regardless of field order or extra excluded fields.
pub fn row_key(row: &MetricRow, key_fields: &KeyFields, extra_excludes: &[String]) -> String {
    row.fields()
        .filter(|(name, value)| !is_excluded(name, key_fields, extra_excludes) && !value.is_null())
        .map(|(name, value)| format!("{}:{}", name, scalar_text(value)))
        .sorted()
        .join("|")
}

fn is_excluded(name: &str, key_fields: &KeyFields, extra_excludes: &[String]) -> bool {
    name == key_fields.measure
        || name == key_fields.week
        || name == key_fields.year
        || extra_excludes.iter().any(|field| field == name)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_fields() -> KeyFields {
        KeyFields::default()
    }

    #[test]
    fn test_key_is_insertion_order_independent() {
        let a = MetricRow::new()
            .set("provincia", "Chaco")
            .set("grupo_etario", "0-4")
            .set("valor", 99)
            .set("semana_epidemiologica", 10);
        let b = MetricRow::new()
            .set("semana_epidemiologica", 3)
            .set("valor", 12)
            .set("grupo_etario", "0-4")
            .set("provincia", "Chaco");

        assert_eq!(row_key(&a, &key_fields(), &[]), row_key(&b, &key_fields(), &[]));
        assert_eq!(row_key(&a, &key_fields(), &[]), "grupo_etario:0-4|provincia:Chaco");
    }

    #[test]
    fn test_measure_and_period_fields_never_enter_the_key() {
        let with_period = MetricRow::new()
            .set("provincia", "Chaco")
            .set("valor", 40)
            .set("semana_epidemiologica", 10)
            .set("anio", 2025);
        let bare = MetricRow::new().set("provincia", "Chaco");

        assert_eq!(
            row_key(&with_period, &key_fields(), &[]),
            row_key(&bare, &key_fields(), &[])
        );
    }

    #[test]
    fn test_null_values_are_skipped() {
        let row = MetricRow::new()
            .set("provincia", "Chaco")
            .set("departamento", Value::Null);
        assert_eq!(row_key(&row, &key_fields(), &[]), "provincia:Chaco");
    }

    #[test]
    fn test_extra_excludes_are_honored() {
        let row = MetricRow::new()
            .set("provincia", "Chaco")
            .set("evento", "dengue");
        let key = row_key(&row, &key_fields(), &["evento".to_string()]);
        assert_eq!(key, "provincia:Chaco");
    }

    #[test]
    fn test_numeric_values_render_without_quotes() {
        let row = MetricRow::new().set("grupo_etario_id", 4).set("provincia", "Chaco");
        assert_eq!(
            row_key(&row, &key_fields(), &[]),
            "grupo_etario_id:4|provincia:Chaco"
        );
    }
}

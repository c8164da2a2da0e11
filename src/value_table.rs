use crate::feature::unique_property_values;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use geojson::Feature;
use std::collections::HashMap;
use tracing::debug;

/// Per-key numeric data parsed from `key,value` lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTable {
    values: HashMap<String, f64>,
}

impl ValueTable {
    /// Parse newline-delimited `key,value` rows.
    ///
    /// No header row and no quoting. A later duplicate key overwrites an earlier one.
    pub fn parse(input: &str) -> Result<Self> {
        let mut values = HashMap::new();
        if input.is_empty() {
            return Ok(ValueTable { values });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(input.as_bytes());

        let mut record = StringRecord::new();
        while reader
            .read_record(&mut record)
            .context("Failed to read value table row")?
        {
            let key = record.get(0).unwrap_or_default().to_string();
            let value = record.get(1).map_or(f64::NAN, parse_number);
            values.insert(key, value);
        }

        debug!(rows = values.len(), "parsed value table");
        Ok(ValueTable { values })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        ValueTable {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Numeric coercion for a table cell: blank is 0, anything unparseable is NaN.
pub fn parse_number(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            f64::NAN
        }
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// A starter table: one `value,0` row per distinct property value, sorted.
pub fn template(features: &[Feature], key: &str) -> String {
    unique_property_values(features, key)
        .iter()
        .map(|v| format!("{},0", v.key()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_basic_table() {
        let table = ValueTable::parse("A,1\nB,2").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A"), Some(1.0));
        assert_eq!(table.get("B"), Some(2.0));
        assert_eq!(table.get("C"), None);
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let table = ValueTable::parse("A,1\nA,7").unwrap();
        assert_eq!(table.get("A"), Some(7.0));
    }

    #[test]
    fn test_parse_value_coercion() {
        let table = ValueTable::parse("blank,\nmissing\nword,abc\nspaced, 4.5 \nsci,1e3").unwrap();
        assert_eq!(table.get("blank"), Some(0.0));
        assert!(table.get("missing").unwrap().is_nan());
        assert!(table.get("word").unwrap().is_nan());
        assert_eq!(table.get("spaced"), Some(4.5));
        assert_eq!(table.get("sci"), Some(1000.0));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(ValueTable::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_number_edge_cases() {
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert_eq!(parse_number("  "), 0.0);
    }

    #[test]
    fn test_from_iterator() {
        let table: ValueTable = vec![("x", 1.0), ("y", 2.0)].into_iter().collect();
        assert_eq!(table.get("y"), Some(2.0));
    }

    fn features(values: Vec<serde_json::Value>) -> Vec<Feature> {
        values
            .into_iter()
            .map(|value| Feature {
                bbox: None,
                geometry: None,
                id: None,
                properties: json!({ "name": value }).as_object().cloned(),
                foreign_members: None,
            })
            .collect()
    }

    #[test]
    fn test_template_sorted_rows() {
        let features = features(vec![json!("C"), json!("A"), json!("B"), json!("A")]);
        assert_eq!(template(&features, "name"), "A,0\nB,0\nC,0");
        assert_eq!(template(&features, "other"), "");
    }

    #[test]
    fn test_template_one_row_per_key() {
        let features = features(vec![json!(1), json!("b"), json!("1"), json!("A")]);
        assert_eq!(template(&features, "name"), "1,0\nA,0\nb,0");
    }
}

// GeoJSON feature collections and property lookup

use crate::format;
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn load_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read base map '{}'", path.display()))?;
    parse_feature_collection(&text)
        .with_context(|| format!("Failed to load base map '{}'", path.display()))
}

pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = text.parse().context("Invalid GeoJSON")?;
    let collection =
        FeatureCollection::try_from(geojson).context("GeoJSON is not a FeatureCollection")?;
    Ok(collection)
}

/// A feature property usable as a value-table key
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(PropertyValue::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(PropertyValue::Number),
            Value::Bool(b) => Some(PropertyValue::Text(b.to_string())),
            Value::Null => Some(PropertyValue::Text("null".to_string())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The string form looked up in a value table. Numbers print without a trailing `.0`.
    pub fn key(&self) -> String {
        match self {
            PropertyValue::Number(n) => format::raw(*n),
            PropertyValue::Text(s) => s.clone(),
        }
    }

    // Numbers ascending, then text in case-insensitive order with lowercase first on ties
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => a.total_cmp(b),
            (PropertyValue::Number(_), PropertyValue::Text(_)) => Ordering::Less,
            (PropertyValue::Text(_), PropertyValue::Number(_)) => Ordering::Greater,
            (PropertyValue::Text(a), PropertyValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| b.cmp(a)),
        }
    }
}

pub fn property_value(feature: &Feature, key: &str) -> Option<PropertyValue> {
    feature
        .properties
        .as_ref()
        .and_then(|props| props.get(key))
        .and_then(PropertyValue::from_json)
}

pub fn property_key(feature: &Feature, key: &str) -> Option<String> {
    property_value(feature, key).map(|v| v.key())
}

/// Distinct values of one property across the features, sorted.
///
/// Values are distinct by their table key, so `1` and `"1"` count once (first one wins).
pub fn unique_property_values(features: &[Feature], key: &str) -> Vec<PropertyValue> {
    let mut seen = HashSet::new();
    let mut values: Vec<PropertyValue> = features
        .iter()
        .filter_map(|f| property_value(f, key))
        .filter(|v| seen.insert(v.key()))
        .collect();
    values.sort_by(|a, b| a.compare(b));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(props: Value) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: props.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_parse_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "A"},
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}}
            ]
        }"#;
        let collection = parse_feature_collection(text).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(property_key(&collection.features[0], "name").as_deref(), Some("A"));
    }

    #[test]
    fn test_parse_rejects_non_collection() {
        let point = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(parse_feature_collection(point).is_err());
        assert!(parse_feature_collection("not json").is_err());
    }

    #[test]
    fn test_property_key_coercion() {
        let f = feature(json!({"code": 12, "ratio": 1.5, "flag": true, "nothing": null, "list": [1]}));
        assert_eq!(property_key(&f, "code").as_deref(), Some("12"));
        assert_eq!(property_key(&f, "ratio").as_deref(), Some("1.5"));
        assert_eq!(property_key(&f, "flag").as_deref(), Some("true"));
        assert_eq!(property_key(&f, "nothing").as_deref(), Some("null"));
        assert_eq!(property_key(&f, "list"), None);
        assert_eq!(property_key(&f, "missing"), None);
    }

    #[test]
    fn test_property_key_without_properties() {
        let f = feature(Value::Null);
        assert_eq!(property_key(&f, "name"), None);
    }

    #[test]
    fn test_unique_values_sorted_numbers_first() {
        let features = vec![
            feature(json!({"k": "b"})),
            feature(json!({"k": 10})),
            feature(json!({"k": "a"})),
            feature(json!({"k": 2})),
            feature(json!({"k": "b"})),
            feature(json!({})),
        ];
        let keys: Vec<String> = unique_property_values(&features, "k")
            .iter()
            .map(|v| v.key())
            .collect();
        assert_eq!(keys, vec!["2", "10", "a", "b"]);
    }

    #[test]
    fn test_unique_values_merge_number_and_text_keys() {
        let features = vec![
            feature(json!({"k": 1})),
            feature(json!({"k": "2"})),
            feature(json!({"k": "1"})),
            feature(json!({"k": 2.0})),
        ];
        let values = unique_property_values(&features, "k");
        assert_eq!(
            values,
            vec![PropertyValue::Number(1.0), PropertyValue::Text("2".to_string())]
        );
    }

    #[test]
    fn test_unique_values_text_ignores_case() {
        let features = vec![
            feature(json!({"k": "b"})),
            feature(json!({"k": "Bravo"})),
            feature(json!({"k": "A"})),
            feature(json!({"k": "alpha"})),
            feature(json!({"k": "a"})),
            feature(json!({"k": "B"})),
        ];
        let keys: Vec<String> = unique_property_values(&features, "k")
            .iter()
            .map(|v| v.key())
            .collect();
        assert_eq!(keys, vec!["a", "A", "alpha", "b", "B", "Bravo"]);
    }
}

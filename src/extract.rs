use crate::feature::property_key;
use crate::value_table::ValueTable;
use clap::ValueEnum;
use geojson::Feature;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where feature values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    #[default]
    Random,
    Custom,
}

pub enum DataSource<'a> {
    /// Fresh uniform draws in `[0, 1)` per feature
    Random,
    /// Lookup of each feature's `key` property in `table`
    Custom { key: &'a str, table: &'a ValueTable },
}

/// One value per feature, in collection order.
pub fn extract_values<R: Rng + ?Sized>(
    features: &[Feature],
    source: &DataSource,
    rng: &mut R,
) -> Vec<Option<f64>> {
    match source {
        DataSource::Random => features.iter().map(|_| Some(rng.gen::<f64>())).collect(),
        DataSource::Custom { key, table } => features
            .iter()
            .map(|f| property_key(f, key).and_then(|k| table.get(&k)))
            .collect(),
    }
}

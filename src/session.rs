// Editor session: the loaded map, data input and render state between edits

use crate::basemap::{self, BaseMap};
use crate::config::{EditorConfig, ResolvedConfig};
use crate::debounce::{Debouncer, DATA_INPUT_WAIT};
use crate::feature::load_feature_collection;
use crate::pipeline::{self, PipelineOutput};
use crate::value_table::{self, ValueTable};
use anyhow::{anyhow, bail, Result};
use geojson::FeatureCollection;
use rand::Rng;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub struct EditorSession {
    config: EditorConfig,
    resolved: ResolvedConfig,
    base_map: Option<BaseMap>,
    collection: Option<FeatureCollection>,
    loading: bool,
    data_key: Option<String>,
    data_input: String,
    table: ValueTable,
    debouncer: Debouncer<String>,
    legend_format_error: bool,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        let base_map = basemap::find(&config.base_map);
        if base_map.is_none() {
            debug!(id = %config.base_map, "base map is not in the catalog");
        }
        Ok(EditorSession {
            data_key: config.data_key.clone(),
            config,
            resolved,
            base_map,
            collection: None,
            loading: false,
            data_input: String::new(),
            table: ValueTable::default(),
            debouncer: Debouncer::new(DATA_INPUT_WAIT),
            legend_format_error: false,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replace the configuration. Returns whether anything changed.
    ///
    /// Switching to another catalog base map drops the current features until the next load.
    pub fn update_config(&mut self, config: EditorConfig) -> Result<bool> {
        if config == self.config {
            return Ok(false);
        }
        let resolved = config.resolve()?;
        let new_map = if config.base_map != self.config.base_map {
            let map = basemap::find(&config.base_map)
                .ok_or_else(|| anyhow!("Unknown base map '{}'", config.base_map))?;
            Some(map)
        } else {
            None
        };

        if config.data_key != self.config.data_key {
            self.data_key = config.data_key.clone();
        }
        self.config = config;
        self.resolved = resolved;
        if let Some(map) = new_map {
            info!(id = %map.id, "selected base map");
            self.base_map = Some(map);
            self.collection = None;
        }
        Ok(true)
    }

    pub fn base_map(&self) -> Option<&BaseMap> {
        self.base_map.as_ref()
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// On success the features replace the current ones, the data key falls back to the base
    /// map's first key unless the configured one is allowed, and the data input is reset to a
    /// template. On failure the map stays empty.
    pub fn finish_load(&mut self, result: Result<FeatureCollection>) -> Result<()> {
        self.loading = false;
        match result {
            Ok(collection) => {
                info!(features = collection.features.len(), "base map loaded");
                self.data_key = self.load_data_key();
                self.collection = Some(collection);
                self.reset_data_input()
            }
            Err(e) => {
                error!(error = %e, "base map failed to load");
                self.collection = None;
                Err(e)
            }
        }
    }

    // Configured key when the base map allows it, else the map's first key
    fn load_data_key(&self) -> Option<String> {
        match (&self.config.data_key, &self.base_map) {
            (Some(key), Some(map)) => match map.check_data_key(key) {
                Ok(()) => Some(key.clone()),
                Err(e) => {
                    let fallback = map.default_data_key();
                    warn!(error = %e, fallback, "configured data key rejected");
                    Some(fallback.to_string())
                }
            },
            (Some(key), None) => Some(key.clone()),
            (None, Some(map)) => Some(map.default_data_key().to_string()),
            (None, None) => None,
        }
    }

    /// Load the selected catalog map from `root`, the directory holding `<id>.json` files.
    pub fn load_from_dir(&mut self, root: &Path) -> Result<()> {
        let Some(map) = &self.base_map else {
            bail!("Base map '{}' is not in the catalog", self.config.base_map);
        };
        let path = map.file_in(root);
        self.load_from_path(&path)
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<()> {
        self.begin_load();
        let result = load_feature_collection(path);
        self.finish_load(result)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn collection(&self) -> Option<&FeatureCollection> {
        self.collection.as_ref()
    }

    pub fn data_key(&self) -> Option<&str> {
        self.data_key.as_deref()
    }

    pub fn data_input(&self) -> &str {
        &self.data_input
    }

    pub fn value_table(&self) -> &ValueTable {
        &self.table
    }

    /// Feed a raw edit of the data input through the debouncer.
    pub fn edit_data_input(&mut self, text: impl Into<String>, now: Instant) -> Result<()> {
        match self.debouncer.call(text.into(), now) {
            Some(text) => self.set_data_input(text),
            None => Ok(()),
        }
    }

    /// Apply a held edit once the debounce window has passed.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        match self.debouncer.poll(now) {
            Some(text) => self.set_data_input(text),
            None => Ok(()),
        }
    }

    /// Replace the data input and rebuild the value table right away.
    pub fn set_data_input(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.table = ValueTable::parse(&text)?;
        self.data_input = text;
        debug!(rows = self.table.len(), "value table rebuilt");
        Ok(())
    }

    /// Reset the data input to one zero row per distinct value of the data key.
    pub fn reset_data_input(&mut self) -> Result<()> {
        self.debouncer.cancel();
        let text = match (&self.collection, &self.data_key) {
            (Some(collection), Some(key)) => value_table::template(&collection.features, key),
            _ => String::new(),
        };
        self.set_data_input(text)
    }

    /// Run the pipeline for the loaded features.
    pub fn render<R: Rng + ?Sized>(&mut self, map_height: f64, rng: &mut R) -> Result<PipelineOutput> {
        let Some(collection) = &self.collection else {
            bail!("No base map loaded");
        };
        let mut resolved = self.resolved.clone();
        resolved.data_key = self.data_key.clone();
        let output = pipeline::run(&collection.features, &resolved, &self.table, map_height, rng);
        if output.legend.format_error {
            warn!(specifier = %resolved.legend.specifier, "legend format is invalid");
        }
        self.legend_format_error = output.legend.format_error;
        Ok(output)
    }

    pub fn legend_format_error(&self) -> bool {
        self.legend_format_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainMode;
    use crate::extract::DataMode;
    use crate::feature::parse_feature_collection;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "B"}, "geometry": null},
            {"type": "Feature", "properties": {"name": "A"}, "geometry": null},
            {"type": "Feature", "properties": {"name": "C"}, "geometry": null}
        ]
    }"#;

    fn custom_config() -> EditorConfig {
        EditorConfig::default()
            .with_data_mode(DataMode::Custom)
            .with_data_key("name")
            .with_domain_mode(DomainMode::Extent)
            .with_colors(["#fff", "#000"])
    }

    fn loaded(config: EditorConfig) -> EditorSession {
        let mut session = EditorSession::new(config.with_base_map("custom")).unwrap();
        session.begin_load();
        session
            .finish_load(parse_feature_collection(REGIONS))
            .unwrap();
        session
    }

    // Loading tests (5 tests)

    #[test]
    fn test_load_success_resets_data_input() {
        let session = loaded(custom_config());
        assert!(!session.is_loading());
        assert_eq!(session.collection().unwrap().features.len(), 3);
        assert_eq!(session.data_input(), "A,0\nB,0\nC,0");
        assert_eq!(session.value_table().get("B"), Some(0.0));
    }

    #[test]
    fn test_load_failure_leaves_map_empty() {
        let mut session = loaded(custom_config());
        session.begin_load();
        assert!(session.is_loading());
        let result = session.finish_load(Err(anyhow!("network down")));
        assert!(result.is_err());
        assert!(!session.is_loading());
        assert!(session.collection().is_none());
        assert!(session.render(100.0, &mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_catalog_map_uses_default_data_key() {
        let config = EditorConfig::default().with_base_map("us/ne_110m_admin_1_states_provinces_lakes_US");
        let mut session = EditorSession::new(config).unwrap();
        session.begin_load();
        session.finish_load(parse_feature_collection(REGIONS)).unwrap();
        assert_eq!(session.data_key(), Some("name"));
    }

    #[test]
    fn test_rejected_data_key_falls_back_to_first_key() {
        let config = custom_config().with_base_map("us/ne_110m_admin_1_states_provinces_lakes_US");
        let config = config.with_data_key("population");
        let mut session = EditorSession::new(config).unwrap();
        session.begin_load();
        session.finish_load(parse_feature_collection(REGIONS)).unwrap();
        assert_eq!(session.data_key(), Some("name"));
        assert_eq!(session.collection().unwrap().features.len(), 3);
        assert_eq!(session.data_input(), "A,0\nB,0\nC,0");
    }

    #[test]
    fn test_load_from_missing_dir_fails() {
        let mut session = EditorSession::new(EditorConfig::default()).unwrap();
        assert!(session.load_from_dir(Path::new("/nonexistent")).is_err());
        assert!(!session.is_loading());
        assert!(session.collection().is_none());
    }

    // Data input tests (2 tests)

    #[test]
    fn test_debounced_edits() {
        let mut session = loaded(custom_config());
        let start = Instant::now();
        session.edit_data_input("A,1", start).unwrap();
        assert_eq!(session.value_table().get("A"), Some(1.0));

        session.edit_data_input("A,2", start + Duration::from_millis(50)).unwrap();
        session.edit_data_input("A,3", start + Duration::from_millis(100)).unwrap();
        assert_eq!(session.value_table().get("A"), Some(1.0));

        session.tick(start + Duration::from_millis(200)).unwrap();
        assert_eq!(session.value_table().get("A"), Some(1.0));
        session.tick(start + Duration::from_millis(400)).unwrap();
        assert_eq!(session.value_table().get("A"), Some(3.0));
        assert_eq!(session.data_input(), "A,3");
    }

    #[test]
    fn test_render_end_to_end() {
        let mut session = loaded(custom_config());
        session.set_data_input("A,10\nB,20\nC,30").unwrap();
        let out = session.render(400.0, &mut StdRng::seed_from_u64(0)).unwrap();
        // Feature order is B, A, C
        assert_eq!(
            out.colors,
            vec![
                Some("#000".to_string()),
                Some("#fff".to_string()),
                Some("#000".to_string())
            ]
        );
    }

    // Configuration tests (3 tests)

    #[test]
    fn test_legend_format_error_flag_toggles() {
        let mut session = loaded(custom_config().with_legend_format("not-a-format"));
        session.set_data_input("A,42").unwrap();
        session.render(400.0, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(session.legend_format_error());

        let fixed = session.config().clone().with_legend_format(".1f");
        assert!(session.update_config(fixed).unwrap());
        session.render(400.0, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(!session.legend_format_error());
    }

    #[test]
    fn test_update_config_detects_no_change_and_rejects_bad_colors() {
        let mut session = loaded(custom_config());
        let same = session.config().clone();
        assert!(!session.update_config(same).unwrap());

        let bad = session.config().clone().with_colors(["oops"]);
        assert!(session.update_config(bad).is_err());
        assert_eq!(session.config().colors, vec!["#fff", "#000"]);
    }

    #[test]
    fn test_update_config_unknown_map_leaves_session_unchanged() {
        let mut session = EditorSession::new(EditorConfig::default()).unwrap();
        let before = session.config().clone();
        let unknown = before.clone().with_base_map("nowhere/map");
        assert!(session.update_config(unknown.clone()).is_err());
        assert_eq!(session.config(), &before);
        assert_eq!(session.base_map().unwrap().id, before.base_map);
        // Retrying is still treated as a change
        assert!(session.update_config(unknown).is_err());

        let us = before.with_base_map("us/ne_50m_admin_1_states_provinces_lakes_US");
        assert!(session.update_config(us).unwrap());
        assert_eq!(
            session.base_map().unwrap().id,
            "us/ne_50m_admin_1_states_provinces_lakes_US"
        );
    }
}

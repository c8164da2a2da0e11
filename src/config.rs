// Editor configuration: defaults, TOML loading and resolution into pipeline inputs

use crate::basemap;
use crate::color::Interpolation;
use crate::domain::{Domain, DomainMode};
use crate::extract::DataMode;
use crate::legend::LegendFormat;
use crate::palette::PaletteId;
use crate::scale::{ColorConfig, ColorList, ColorSource, ScaleKind, DEFAULT_BUCKETS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_COLORS: [&str; 5] = ["#d1c4e9", "#9575cd", "#673ab7", "#512da8", "#311b92"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Catalog id of the base map
    pub base_map: String,
    pub data_mode: DataMode,
    /// Feature property used to key the value table. Defaults to the base map's first key.
    pub data_key: Option<String>,
    pub scale: ScaleKind,
    /// Custom colors, used when no palette is set
    pub colors: Vec<String>,
    pub palette: Option<PaletteId>,
    /// Bucket count for palette-backed quantize scales
    pub buckets: usize,
    pub interpolation: Interpolation,
    pub domain_mode: DomainMode,
    /// Manual domain as `[min, max]`
    pub domain: [f64; 2],
    pub legend_format: String,
    pub legend_units: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            base_map: basemap::catalog()
                .first()
                .map(|m| m.id.clone())
                .unwrap_or_default(),
            data_mode: DataMode::Random,
            data_key: None,
            scale: ScaleKind::Quantize,
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            palette: None,
            buckets: DEFAULT_BUCKETS,
            interpolation: Interpolation::Rgb,
            domain_mode: DomainMode::Manual,
            domain: [0.0, 1.0],
            legend_format: ".1f".to_string(),
            legend_units: String::new(),
        }
    }
}

/// Validated configuration, ready for the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub data_mode: DataMode,
    pub data_key: Option<String>,
    pub domain_mode: DomainMode,
    pub manual_domain: Domain,
    pub color: ColorConfig,
    pub legend: LegendFormat,
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config '{}'", path.display()))
    }

    pub fn with_base_map(mut self, id: impl Into<String>) -> Self {
        self.base_map = id.into();
        self
    }

    pub fn with_data_mode(mut self, mode: DataMode) -> Self {
        self.data_mode = mode;
        self
    }

    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    pub fn with_scale(mut self, scale: ScaleKind) -> Self {
        self.scale = scale;
        self
    }

    /// Switch to custom colors, clearing any palette.
    pub fn with_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.colors = colors.into_iter().map(Into::into).collect();
        self.palette = None;
        self
    }

    pub fn with_palette(mut self, palette: PaletteId) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_domain_mode(mut self, mode: DomainMode) -> Self {
        self.domain_mode = mode;
        self
    }

    pub fn with_domain(mut self, min: f64, max: f64) -> Self {
        self.domain = [min, max];
        self
    }

    pub fn with_legend_format(mut self, specifier: impl Into<String>) -> Self {
        self.legend_format = specifier.into();
        self
    }

    pub fn with_legend_units(mut self, units: impl Into<String>) -> Self {
        self.legend_units = units.into();
        self
    }

    /// Validate colors and assemble the pipeline inputs.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let source = match self.palette {
            Some(palette) => ColorSource::Palette(palette),
            None => ColorSource::Custom(ColorList::parse(self.colors.as_slice())?),
        };
        let color = ColorConfig::new(self.scale, source)
            .with_interpolation(self.interpolation)
            .with_buckets(self.buckets);

        Ok(ResolvedConfig {
            data_mode: self.data_mode,
            data_key: self.data_key.clone(),
            domain_mode: self.domain_mode,
            manual_domain: Domain::new(self.domain[0], self.domain[1]),
            color,
            legend: LegendFormat::new(self.legend_format.clone(), self.legend_units.clone()),
        })
    }
}

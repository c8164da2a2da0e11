use crate::color::{HexColor, Interpolation};
use crate::domain::Domain;
use crate::palette::{ColorPalette, PaletteId};
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const MIN_BUCKETS: usize = 1;
pub const MAX_BUCKETS: usize = 20;
pub const DEFAULT_BUCKETS: usize = 5;

/// Discrete buckets or a continuous ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Quantize,
    Linear,
}

impl ScaleKind {
    pub fn is_discrete(self) -> bool {
        matches!(self, ScaleKind::Quantize)
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleKind::Quantize => "Quantize",
            ScaleKind::Linear => "Linear",
        }
    }
}

/// A non-empty list of user colors
#[derive(Debug, Clone, PartialEq)]
pub struct ColorList(Vec<HexColor>);

impl ColorList {
    pub fn new(colors: Vec<HexColor>) -> Result<Self> {
        if colors.is_empty() {
            bail!("Color list must contain at least one color");
        }
        Ok(ColorList(colors))
    }

    /// Parse every entry as a hex color; the first bad entry is the error.
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let parsed = colors
            .iter()
            .map(|c| HexColor::parse(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        ColorList::new(parsed)
    }

    pub fn first(&self) -> &HexColor {
        &self.0[0]
    }

    pub fn last(&self) -> &HexColor {
        &self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HexColor> {
        self.0.iter()
    }
}

/// Where scale colors come from
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSource {
    Custom(ColorList),
    Palette(PaletteId),
}

/// Everything the scale builder needs besides the domain
#[derive(Debug, Clone, PartialEq)]
pub struct ColorConfig {
    pub scale: ScaleKind,
    pub source: ColorSource,
    pub interpolation: Interpolation,
    pub buckets: usize,
}

impl ColorConfig {
    pub fn new(scale: ScaleKind, source: ColorSource) -> Self {
        ColorConfig {
            scale,
            source,
            interpolation: Interpolation::default(),
            buckets: DEFAULT_BUCKETS,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Bucket count for palette-backed quantize scales, clamped to `1..=20`.
    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets.clamp(MIN_BUCKETS, MAX_BUCKETS);
        self
    }
}

/// One quantize bucket: `[lower, upper)` and its color. Bounds are absent for an undefined domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub color: String,
}

/// A built value-to-color function
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    Quantize {
        domain: Option<Domain>,
        colors: Vec<String>,
        thresholds: Vec<f64>,
    },
    Linear {
        domain: Option<Domain>,
        start: HexColor,
        end: HexColor,
        interpolation: Interpolation,
    },
    Sequential {
        domain: Option<Domain>,
        palette: ColorPalette,
    },
}

impl ColorScale {
    pub fn build(config: &ColorConfig, domain: Option<Domain>) -> Self {
        match (config.scale, &config.source) {
            (ScaleKind::Quantize, ColorSource::Custom(list)) => {
                let colors: Vec<String> = list.iter().map(|c| c.as_str().to_string()).collect();
                ColorScale::quantize(domain, colors)
            }
            (ScaleKind::Quantize, ColorSource::Palette(id)) => {
                let buckets = config.buckets.clamp(MIN_BUCKETS, MAX_BUCKETS);
                ColorScale::quantize(domain, id.palette().sample(buckets))
            }
            (ScaleKind::Linear, ColorSource::Custom(list)) => ColorScale::Linear {
                domain,
                start: list.first().clone(),
                end: list.last().clone(),
                interpolation: config.interpolation,
            },
            (ScaleKind::Linear, ColorSource::Palette(id)) => ColorScale::Sequential {
                domain,
                palette: id.palette(),
            },
        }
    }

    fn quantize(domain: Option<Domain>, colors: Vec<String>) -> Self {
        let thresholds = match domain {
            Some(d) => {
                let edges = d.split(colors.len());
                edges[1..edges.len() - 1].to_vec()
            }
            None => Vec::new(),
        };
        ColorScale::Quantize {
            domain,
            colors,
            thresholds,
        }
    }

    pub fn domain(&self) -> Option<Domain> {
        match self {
            ColorScale::Quantize { domain, .. }
            | ColorScale::Linear { domain, .. }
            | ColorScale::Sequential { domain, .. } => *domain,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, ColorScale::Quantize { .. })
    }

    /// Color for a data value. `NaN` has no color; out-of-domain values clamp to the ends.
    pub fn color(&self, value: f64) -> Option<String> {
        if value.is_nan() {
            return None;
        }
        match self {
            ColorScale::Quantize {
                domain,
                colors,
                thresholds,
            } => {
                if domain.is_none() {
                    return colors.first().cloned();
                }
                colors.get(bisect_right(thresholds, value)).cloned()
            }
            _ => Some(self.color_at(position(self.domain(), value))),
        }
    }

    /// Color at a relative position `t` along the scale's range, low end first.
    pub fn color_at(&self, t: f64) -> String {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            ColorScale::Quantize { colors, .. } => {
                let last = colors.len().saturating_sub(1);
                let index = ((t * colors.len() as f64).floor() as usize).min(last);
                colors.get(index).cloned().unwrap_or_default()
            }
            ColorScale::Linear {
                start,
                end,
                interpolation,
                ..
            } => interpolation.mix(start, end, t),
            ColorScale::Sequential { palette, .. } => palette.eval_oriented(t),
        }
    }

    /// Edges between quantize buckets, `[min, t_0, ..., max]`. Empty when continuous or undefined.
    pub fn boundaries(&self) -> Vec<f64> {
        match self {
            ColorScale::Quantize {
                domain: Some(d),
                thresholds,
                ..
            } => {
                let mut edges = Vec::with_capacity(thresholds.len() + 2);
                edges.push(d.min);
                edges.extend_from_slice(thresholds);
                edges.push(d.max);
                edges
            }
            _ => Vec::new(),
        }
    }

    /// Quantize buckets in ascending order; continuous scales have none.
    pub fn buckets(&self) -> Vec<Bucket> {
        let ColorScale::Quantize { colors, .. } = self else {
            return Vec::new();
        };
        let edges = self.boundaries();
        colors
            .iter()
            .enumerate()
            .map(|(i, color)| Bucket {
                lower: edges.get(i).copied(),
                upper: edges.get(i + 1).copied(),
                color: color.clone(),
            })
            .collect()
    }
}

/// Relative position of `value` in the domain; 0 for an undefined or zero-width domain.
fn position(domain: Option<Domain>, value: f64) -> f64 {
    match domain {
        Some(d) if !d.is_degenerate() => d.normalize(value),
        _ => 0.0,
    }
}

/// Index of the first threshold greater than `x`.
fn bisect_right(thresholds: &[f64], x: f64) -> usize {
    let (mut lo, mut hi) = (0, thresholds.len());
    while lo < hi {
        let mid = (lo + hi) / 2;
        if thresholds[mid] <= x {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

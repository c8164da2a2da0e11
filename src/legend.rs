// Legend layout: discrete swatches or a continuous gradient bar

use crate::format::{self, NumberFormat};
use crate::scale::ColorScale;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const UNIT_SEPARATOR: &str = " – ";

/// How legend numbers are printed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegendFormat {
    /// Format specifier such as `.1f`; empty means the raw number
    pub specifier: String,
    /// Appended to every number
    pub units: String,
}

impl LegendFormat {
    pub fn new(specifier: impl Into<String>, units: impl Into<String>) -> Self {
        LegendFormat {
            specifier: specifier.into(),
            units: units.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub label: Option<String>,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Percent from the top of the bar
    pub offset: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: Option<f64>,
    pub y: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stops: Vec<GradientStop>,
    pub ticks: Vec<Tick>,
    pub tick_length: f64,
    pub label_x: f64,
    pub label_offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendBody {
    Swatches(Vec<Swatch>),
    Gradient(Gradient),
}

/// A laid-out legend in map pixel coordinates, anchored bottom-left
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub body: LegendBody,
    pub font_size: f64,
    pub padding: f64,
    /// The specifier could not be parsed and labels show raw numbers
    pub format_error: bool,
}

struct Labeler {
    format: Option<NumberFormat>,
    units: String,
    error: bool,
}

impl Labeler {
    fn new(legend_format: &LegendFormat) -> Self {
        let specifier = legend_format.specifier.as_str();
        let (format, error) = if specifier.is_empty() {
            (None, false)
        } else {
            match NumberFormat::parse(specifier) {
                Ok(f) => (Some(f), false),
                Err(e) => {
                    warn!(specifier, error = %e, "legend format rejected, showing raw numbers");
                    (None, true)
                }
            }
        };
        Labeler {
            format,
            units: legend_format.units.clone(),
            error,
        }
    }

    fn number(&self, value: f64) -> String {
        let text = match &self.format {
            Some(f) => f.format(value),
            None => format::raw(value),
        };
        format!("{}{}", text, self.units)
    }

    fn range(&self, lower: f64, upper: f64) -> String {
        format!("{}{}{}", self.number(lower), UNIT_SEPARATOR, self.number(upper))
    }
}

/// Lay out the legend for a scale on a map of the given pixel height.
pub fn render_legend(scale: &ColorScale, legend_format: &LegendFormat, map_height: f64) -> Legend {
    let labeler = Labeler::new(legend_format);
    let padding = map_height * 0.02;

    if scale.is_discrete() {
        discrete(scale, &labeler, map_height, padding)
    } else {
        continuous(scale, &labeler, map_height, padding)
    }
}

fn discrete(scale: &ColorScale, labeler: &Labeler, map_height: f64, padding: f64) -> Legend {
    let rect = map_height * 0.05;
    let gap = rect * 0.4;
    let font_size = (rect * 0.8).round();
    let buckets = scale.buckets();
    let count = buckets.len() as f64;
    let full_height = count * rect + (count - 2.0) * gap + padding * 2.0;
    let top = map_height - full_height;

    let swatches = buckets
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| {
            let y = top + i as f64 * (rect + gap);
            let label = match (bucket.lower, bucket.upper) {
                (Some(lower), Some(upper)) => Some(labeler.range(lower, upper)),
                _ => None,
            };
            Swatch {
                x: 0.0,
                y,
                size: rect,
                color: bucket.color,
                label,
                label_x: rect + padding,
                label_y: y + rect * 0.75,
            }
        })
        .collect();

    Legend {
        body: LegendBody::Swatches(swatches),
        font_size,
        padding,
        format_error: labeler.error,
    }
}

fn continuous(scale: &ColorScale, labeler: &Labeler, map_height: f64, padding: f64) -> Legend {
    let height = map_height * 0.4;
    let width = map_height * 0.05;
    let font_size = (width * 0.75).round();
    let top = map_height - height - padding;
    let domain = scale.domain();

    // Ten equal parts give eleven stops, listed from max down to min
    let edges = domain.map(|d| d.split(10));
    let stops = (0..=10)
        .map(|i| {
            let position = 1.0 - i as f64 / 10.0;
            let color = edges
                .as_ref()
                .and_then(|e| scale.color(e[10 - i]))
                .unwrap_or_else(|| scale.color_at(position));
            GradientStop {
                offset: 10.0 * i as f64,
                color,
            }
        })
        .collect();

    let ticks = match domain {
        Some(d) => d
            .split(4)
            .into_iter()
            .map(|value| {
                let t = if d.is_degenerate() { 0.5 } else { d.normalize(value) };
                Tick {
                    value: Some(value),
                    y: top + (height - 2.0) * (1.0 - t) + 1.0,
                    label: Some(labeler.number(value)),
                }
            })
            .collect(),
        None => (0..=4)
            .map(|i| Tick {
                value: None,
                y: top + (height - 2.0) * (1.0 - i as f64 / 4.0) + 1.0,
                label: None,
            })
            .collect(),
    };

    Legend {
        body: LegendBody::Gradient(Gradient {
            x: 0.0,
            y: top,
            width,
            height,
            stops,
            ticks,
            tick_length: padding * 0.4,
            label_x: width + padding,
            label_offset: font_size * 0.3,
        }),
        font_size,
        padding,
        format_error: labeler.error,
    }
}

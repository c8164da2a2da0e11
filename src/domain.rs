use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Numeric input range `[min, max]` of a color scale.
///
/// Kept exactly as given: `min > max` and `min == max` are legal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Default for Domain {
    fn default() -> Self {
        Domain { min: 0.0, max: 1.0 }
    }
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Self {
        Domain { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Cut the domain into `parts` equal pieces, returning the `parts + 1` edges from min to max.
    ///
    /// Interior edges use `((i + 1) * max - (i - k) * min) / (k + 1)` with `k = parts - 1`, so a
    /// degenerate domain yields repeated edges instead of dividing by its zero width.
    pub fn split(&self, parts: usize) -> Vec<f64> {
        let parts = parts.max(1);
        let k = (parts - 1) as f64;
        let mut edges = Vec::with_capacity(parts + 1);
        edges.push(self.min);
        for i in 0..parts - 1 {
            let i = i as f64;
            edges.push(((i + 1.0) * self.max - (i - k) * self.min) / (k + 1.0));
        }
        edges.push(self.max);
        edges
    }

    /// Position of `value` along the domain, unclamped. A zero-width domain reads as 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        let width = self.width();
        if width == 0.0 {
            0.5
        } else {
            (value - self.min) / width
        }
    }
}

/// How the active domain is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DomainMode {
    /// Min and max of the feature values
    Extent,
    /// A configured pair, used verbatim
    #[default]
    Manual,
}

impl DomainMode {
    pub fn label(self) -> &'static str {
        match self {
            DomainMode::Extent => "Data extent",
            DomainMode::Manual => "Manual",
        }
    }
}

/// Resolve the active domain for a feature value series.
///
/// Returns `None` in extent mode when the series holds no comparable value.
pub fn resolve_domain(values: &[Option<f64>], mode: DomainMode, manual: Domain) -> Option<Domain> {
    let domain = match mode {
        DomainMode::Manual => Some(manual),
        DomainMode::Extent => extent(values),
    };
    debug!(?mode, ?domain, "resolved domain");
    domain
}

/// Min and max over the defined, non-NaN entries.
pub fn extent(values: &[Option<f64>]) -> Option<Domain> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<Domain>, v| match acc {
            None => Some(Domain::new(v, v)),
            Some(d) => Some(Domain::new(d.min.min(v), d.max.max(v))),
        })
}

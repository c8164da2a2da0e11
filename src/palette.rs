// Named continuous color palettes

use crate::color::to_hex;
use clap::ValueEnum;
use colorgrad::Gradient;
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a built-in continuous palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaletteId {
    Blues,
    Greens,
    Greys,
    Inferno,
    Magma,
    Oranges,
    Reds,
    Viridis,
}

impl PaletteId {
    pub const ALL: [PaletteId; 8] = [
        PaletteId::Blues,
        PaletteId::Greens,
        PaletteId::Greys,
        PaletteId::Inferno,
        PaletteId::Magma,
        PaletteId::Oranges,
        PaletteId::Reds,
        PaletteId::Viridis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaletteId::Blues => "Blues",
            PaletteId::Greens => "Greens",
            PaletteId::Greys => "Greys",
            PaletteId::Inferno => "Inferno",
            PaletteId::Magma => "Magma",
            PaletteId::Oranges => "Oranges",
            PaletteId::Reds => "Reds",
            PaletteId::Viridis => "Viridis",
        }
    }

    /// Perceptual ramps run dark to light; they are flipped so high values read darker.
    fn is_reverse(self) -> bool {
        matches!(
            self,
            PaletteId::Inferno | PaletteId::Magma | PaletteId::Viridis
        )
    }

    fn gradient(self) -> Arc<dyn Gradient + Send + Sync> {
        use colorgrad::preset;
        match self {
            PaletteId::Blues => Arc::new(preset::blues()),
            PaletteId::Greens => Arc::new(preset::greens()),
            PaletteId::Greys => Arc::new(preset::greys()),
            PaletteId::Inferno => Arc::new(preset::inferno()),
            PaletteId::Magma => Arc::new(preset::magma()),
            PaletteId::Oranges => Arc::new(preset::oranges()),
            PaletteId::Reds => Arc::new(preset::reds()),
            PaletteId::Viridis => Arc::new(preset::viridis()),
        }
    }

    pub fn palette(self) -> ColorPalette {
        ColorPalette {
            id: self,
            reverse: self.is_reverse(),
            gradient: self.gradient(),
        }
    }
}

/// A continuous palette: `t ∈ [0, 1]` to color
#[derive(Clone)]
pub struct ColorPalette {
    id: PaletteId,
    reverse: bool,
    gradient: Arc<dyn Gradient + Send + Sync>,
}

impl fmt::Debug for ColorPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorPalette")
            .field("id", &self.id)
            .field("reverse", &self.reverse)
            .finish()
    }
}

impl PartialEq for ColorPalette {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.reverse == other.reverse
    }
}

impl ColorPalette {
    pub fn id(&self) -> PaletteId {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.id.label()
    }

    /// Whether low data values should sit at the palette's `t = 1` end.
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Evaluate the raw palette at `t` (clamped to `[0, 1]`; NaN reads as 0).
    pub fn eval(&self, t: f64) -> String {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let [red, green, blue, _] = self.gradient.at(t as f32).to_rgba8();
        to_hex(Srgb::new(red, green, blue))
    }

    /// Evaluate at a position along the data's low-to-high direction, honoring `reverse`.
    pub fn eval_oriented(&self, t: f64) -> String {
        if self.reverse {
            self.eval(1.0 - t)
        } else {
            self.eval(t)
        }
    }

    /// `count` evenly spaced colors, low to high.
    pub fn sample(&self, count: usize) -> Vec<String> {
        match count {
            0 => Vec::new(),
            1 => vec![self.eval_oriented(0.0)],
            _ => (0..count)
                .map(|i| self.eval_oriented(i as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;

    /// Colors match when every channel is within a couple of steps.
    fn assert_near(actual: &str, expected: &str) {
        let a = HexColor::parse(actual).unwrap().rgb();
        let e = HexColor::parse(expected).unwrap().rgb();
        let close = |x: u8, y: u8| x.abs_diff(y) <= 2;
        assert!(
            close(a.red, e.red) && close(a.green, e.green) && close(a.blue, e.blue),
            "{} is not close to {}",
            actual,
            expected
        );
    }

    // Palette value tests (4 tests)

    #[test]
    fn test_sequential_palette_end_stops() {
        let blues = PaletteId::Blues.palette();
        assert_near(&blues.eval(0.0), "#f7fbff");
        assert_near(&blues.eval(1.0), "#08306b");
        assert!(!blues.is_reverse());
    }

    #[test]
    fn test_sequential_palette_is_smooth_not_stepped() {
        let greys = PaletteId::Greys.palette();
        // At a knot the spline averages neighbours: (0xbd + 4 * 0x96 + 0x73) / 6
        let mid = greys.eval(0.5);
        assert_near(&mid, "#979797");
        assert_ne!(greys.eval(0.45), greys.eval(0.55));
    }

    #[test]
    fn test_perceptual_palette_midpoints() {
        assert_near(&PaletteId::Viridis.palette().eval(0.5), "#21918c");
        assert_near(&PaletteId::Inferno.palette().eval(0.5), "#bc3754");
        assert_near(&PaletteId::Magma.palette().eval(0.5), "#b73779");
    }

    #[test]
    fn test_eval_clamps_and_tolerates_nan() {
        let reds = PaletteId::Reds.palette();
        assert_eq!(reds.eval(-2.0), reds.eval(0.0));
        assert_eq!(reds.eval(9.0), reds.eval(1.0));
        assert_eq!(reds.eval(f64::NAN), reds.eval(0.0));
    }

    // Orientation tests (4 tests)

    #[test]
    fn test_eval_oriented_respects_reverse() {
        let magma = PaletteId::Magma.palette();
        assert!(magma.is_reverse());
        assert_eq!(magma.eval_oriented(0.0), magma.eval(1.0));
        assert_eq!(magma.eval_oriented(1.0), magma.eval(0.0));
        assert_near(&magma.eval_oriented(1.0), "#000004");

        let oranges = PaletteId::Oranges.palette();
        assert_eq!(oranges.eval_oriented(0.0), oranges.eval(0.0));
    }

    #[test]
    fn test_sample_counts() {
        let greens = PaletteId::Greens.palette();
        assert!(greens.sample(0).is_empty());
        assert_eq!(greens.sample(1), vec![greens.eval(0.0)]);

        let five = greens.sample(5);
        assert_eq!(five.len(), 5);
        assert_near(&five[0], "#f7fcf5");
        assert_near(&five[4], "#00441b");
    }

    #[test]
    fn test_sample_reverse_palette() {
        let inferno = PaletteId::Inferno.palette();
        let three = inferno.sample(3);
        assert_near(&three[0], "#fcffa4");
        assert_near(&three[2], "#000004");
    }

    #[test]
    fn test_palette_equality_and_labels() {
        assert_eq!(PaletteId::Viridis.palette(), PaletteId::Viridis.palette());
        assert_ne!(PaletteId::Viridis.palette(), PaletteId::Magma.palette());
        for id in PaletteId::ALL {
            assert_eq!(id.palette().label(), id.label());
            assert_eq!(id.palette().id(), id);
        }
    }
}

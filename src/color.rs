// Hex colors and two-color interpolation

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use palette::{FromColor, Hsl, Lab, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A user-supplied `#rgb` / `#rrggbb` color.
///
/// The original text is kept so that scales can hand back exactly what was configured.
#[derive(Debug, Clone, PartialEq)]
pub struct HexColor {
    raw: String,
    rgb: Srgb<u8>,
}

impl HexColor {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if !trimmed.starts_with('#') {
            bail!("Invalid color '{}': expected #rgb or #rrggbb", input);
        }
        let rgb = Srgb::<u8>::from_str(trimmed)
            .map_err(|_| anyhow!("Invalid color '{}': expected #rgb or #rrggbb", input))?;
        Ok(HexColor {
            raw: trimmed.to_string(),
            rgb,
        })
    }

    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let rgb = Srgb::new(red, green, blue);
        HexColor {
            raw: to_hex(rgb),
            rgb,
        }
    }

    /// The color exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn rgb(&self) -> Srgb<u8> {
        self.rgb
    }

    /// Normalized `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        to_hex(self.rgb)
    }
}

impl FromStr for HexColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        HexColor::parse(s)
    }
}

pub fn to_hex(rgb: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}

/// Color space used to blend the two endpoints of a linear custom scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Rgb,
    Hsl,
    Lab,
}

impl Interpolation {
    pub fn label(self) -> &'static str {
        match self {
            Interpolation::Rgb => "Interpolate RGB",
            Interpolation::Hsl => "Interpolate HSL",
            Interpolation::Lab => "Interpolate LAB",
        }
    }

    /// Blend `start` towards `end` by `t`.
    ///
    /// `t` is clamped to `[0, 1]`; the endpoints come back verbatim.
    pub fn mix(self, start: &HexColor, end: &HexColor, t: f64) -> String {
        if t.is_nan() || t <= 0.0 {
            return start.as_str().to_string();
        }
        if t >= 1.0 {
            return end.as_str().to_string();
        }

        let a = start.rgb().into_format::<f32>();
        let b = end.rgb().into_format::<f32>();
        let factor = t as f32;

        let blended: Srgb<f32> = match self {
            Interpolation::Rgb => a.mix(b, factor),
            Interpolation::Hsl => {
                let mut from: Hsl = Hsl::from_color(a);
                let mut to: Hsl = Hsl::from_color(b);
                // Greys have no meaningful hue; borrow the other endpoint's.
                if from.saturation <= f32::EPSILON {
                    from.hue = to.hue;
                }
                if to.saturation <= f32::EPSILON {
                    to.hue = from.hue;
                }
                Srgb::from_color(from.mix(to, factor))
            }
            Interpolation::Lab => {
                let from: Lab = Lab::from_color(a.into_linear());
                let to: Lab = Lab::from_color(b.into_linear());
                Srgb::from_linear(LinSrgb::from_color(from.mix(to, factor)))
            }
        };

        channels_to_hex([
            f64::from(blended.red) * 255.0,
            f64::from(blended.green) * 255.0,
            f64::from(blended.blue) * 255.0,
        ])
    }
}

/// Linear blend of two 0-255 channel triples, rounded to the nearest byte.
pub fn lerp_channels(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

pub fn channels_to_hex(channels: [f64; 3]) -> String {
    let byte = |c: f64| c.round().clamp(0.0, 255.0) as u8;
    to_hex(Srgb::new(byte(channels[0]), byte(channels[1]), byte(channels[2])))
}

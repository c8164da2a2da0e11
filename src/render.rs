// Map rendering: colored features plus legend, as SVG text or PNG bytes

use crate::color::{lerp_channels, HexColor};
use crate::legend::{Gradient, Legend, LegendBody, Swatch};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use geojson::{FeatureCollection, Value};
use image::ImageEncoder;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt::Write;
use tracing::{debug, warn};

const STROKE: &str = "#000000";
const FONT: &str = "monospace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

type Ring = Vec<(f64, f64)>;

/// Exterior ring first, then holes
type Shape = Vec<Ring>;

/// Render features filled with `colors` (one per feature) and the legend on top.
pub fn render_map(
    collection: &FeatureCollection,
    colors: &[Option<String>],
    legend: &Legend,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    if colors.len() != collection.features.len() {
        bail!(
            "Color count does not match feature count (colors: {}, features: {})",
            colors.len(),
            collection.features.len()
        );
    }
    if options.width == 0 || options.height == 0 {
        bail!("Output size must be positive ({}x{})", options.width, options.height);
    }

    let shapes: Vec<Vec<Shape>> = collection
        .features
        .iter()
        .map(|f| f.geometry.as_ref().map(|g| shapes_of(&g.value)).unwrap_or_default())
        .collect();
    let frame = Frame::fit(&shapes, options.width as f64, options.height as f64);
    debug!(features = shapes.len(), format = ?options.format, "rendering map");

    match options.format {
        OutputFormat::Svg => Ok(render_svg(&shapes, colors, legend, &frame)?.into_bytes()),
        OutputFormat::Png => render_png(&shapes, colors, legend, &frame, options),
    }
}

fn shapes_of(value: &Value) -> Vec<Shape> {
    let ring = |positions: &Vec<Vec<f64>>| -> Ring {
        positions
            .iter()
            .filter(|p| p.len() >= 2)
            .map(|p| (p[0], p[1]))
            .collect()
    };
    match value {
        Value::Polygon(rings) => vec![rings.iter().map(ring).collect()],
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| rings.iter().map(ring).collect())
            .collect(),
        Value::GeometryCollection(geometries) => {
            geometries.iter().flat_map(|g| shapes_of(&g.value)).collect()
        }
        _ => Vec::new(),
    }
}

/// Equirectangular lon/lat to pixel mapping that fits all shapes, Y down.
struct Frame {
    width: f64,
    height: f64,
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Frame {
    const MARGIN: f64 = 10.0;

    fn fit(shapes: &[Vec<Shape>], width: f64, height: f64) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in shapes.iter().flatten().flatten().flatten() {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if min_x > max_x {
            (min_x, max_x, min_y, max_y) = (-180.0, 180.0, -90.0, 90.0);
        }

        let span_x = if max_x > min_x { max_x - min_x } else { 1.0 };
        let span_y = if max_y > min_y { max_y - min_y } else { 1.0 };
        let inner_w = (width - 2.0 * Self::MARGIN).max(1.0);
        let inner_h = (height - 2.0 * Self::MARGIN).max(1.0);
        let scale = (inner_w / span_x).min(inner_h / span_y);

        Frame {
            width,
            height,
            min_x,
            max_y,
            scale,
            offset_x: Self::MARGIN + (inner_w - span_x * scale) / 2.0,
            offset_y: Self::MARGIN + (inner_h - span_y * scale) / 2.0,
        }
    }

    fn project(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.offset_x + (x - self.min_x) * self.scale,
            self.offset_y + (self.max_y - y) * self.scale,
        )
    }

    /// Legend coordinates start at the left edge; shift them in by the legend padding.
    fn legend_x(&self, legend: &Legend, x: f64) -> f64 {
        legend.padding + x
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_path(shape: &Shape, frame: &Frame) -> String {
    let mut out = String::new();
    for ring in shape {
        let mut coords = ring.iter().map(|&p| frame.project(p));
        if let Some((x, y)) = coords.next() {
            out.push_str(&format!(" M{x:.3},{y:.3}"));
            for (x, y) in coords {
                out.push_str(&format!(" L{x:.3},{y:.3}"));
            }
            out.push('Z');
        }
    }
    out
}

fn render_svg(
    shapes: &[Vec<Shape>],
    colors: &[Option<String>],
    legend: &Legend,
    frame: &Frame,
) -> Result<String> {
    let (width, height) = (frame.width, frame.height);
    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    writeln!(out, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;

    for (feature, color) in shapes.iter().zip(colors) {
        let fill = color.as_deref().map(escape).unwrap_or_else(|| "none".to_string());
        for shape in feature {
            writeln!(
                out,
                r#"<path d="{}" fill="{}" fill-rule="evenodd" stroke="{}" stroke-width="0.5"/>"#,
                svg_path(shape, frame),
                fill,
                STROKE
            )?;
        }
    }

    writeln!(
        out,
        r#"<g class="legend" font-family="{}" font-size="{}">"#,
        FONT, legend.font_size
    )?;
    match &legend.body {
        LegendBody::Swatches(swatches) => {
            for swatch in swatches {
                svg_swatch(&mut out, swatch, legend, frame)?;
            }
        }
        LegendBody::Gradient(gradient) => svg_gradient(&mut out, gradient, legend, frame)?,
    }
    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn svg_swatch(out: &mut String, swatch: &Swatch, legend: &Legend, frame: &Frame) -> Result<()> {
    let x = frame.legend_x(legend, swatch.x);
    writeln!(
        out,
        r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="{}"/>"#,
        x,
        swatch.y,
        swatch.size,
        swatch.size,
        escape(&swatch.color)
    )?;
    if let Some(label) = &swatch.label {
        writeln!(
            out,
            r#"<text x="{:.3}" y="{:.3}">{}</text>"#,
            frame.legend_x(legend, swatch.label_x),
            swatch.label_y,
            escape(label)
        )?;
    }
    Ok(())
}

fn svg_gradient(out: &mut String, gradient: &Gradient, legend: &Legend, frame: &Frame) -> Result<()> {
    writeln!(
        out,
        r#"<defs><linearGradient id="legend-gradient" x1="0" y1="0" x2="0" y2="1">"#
    )?;
    for stop in &gradient.stops {
        writeln!(
            out,
            r#"<stop offset="{}%" stop-color="{}"/>"#,
            stop.offset,
            escape(&stop.color)
        )?;
    }
    writeln!(out, "</linearGradient></defs>")?;

    let x = frame.legend_x(legend, gradient.x);
    writeln!(
        out,
        r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="url(#legend-gradient)"/>"#,
        x, gradient.y, gradient.width, gradient.height
    )?;

    let tick_x = x + gradient.width;
    for tick in &gradient.ticks {
        writeln!(
            out,
            r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}"/>"#,
            tick_x,
            tick.y,
            tick_x + gradient.tick_length,
            tick.y,
            STROKE
        )?;
        if let Some(label) = &tick.label {
            writeln!(
                out,
                r#"<text x="{:.3}" y="{:.3}">{}</text>"#,
                frame.legend_x(legend, gradient.label_x),
                tick.y + gradient.label_offset,
                escape(label)
            )?;
        }
    }
    Ok(())
}

fn rgb(color: &str) -> Option<RGBColor> {
    let parsed = HexColor::parse(color).ok()?;
    let c = parsed.rgb();
    Some(RGBColor(c.red, c.green, c.blue))
}

/// Blend between the two gradient stops around `fraction` (0 at the top).
fn gradient_color(gradient: &Gradient, fraction: f64) -> Option<RGBColor> {
    let stops: Vec<RGBColor> = gradient.stops.iter().filter_map(|s| rgb(&s.color)).collect();
    let last = stops.len().checked_sub(1)?;
    if last == 0 {
        return stops.first().copied();
    }
    let position = fraction.clamp(0.0, 1.0) * last as f64;
    let i = (position.floor() as usize).min(last - 1);
    let channels = |c: &RGBColor| [c.0 as f64, c.1 as f64, c.2 as f64];
    let mixed = lerp_channels(channels(&stops[i]), channels(&stops[i + 1]), position - i as f64);
    let byte = |c: f64| c.round().clamp(0.0, 255.0) as u8;
    Some(RGBColor(byte(mixed[0]), byte(mixed[1]), byte(mixed[2])))
}

fn px((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn draw_label<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    text: &str,
    at: (f64, f64),
    font_size: f64,
) {
    // Baseline-anchored like SVG text
    let style = (FONT, font_size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Bottom));
    if let Err(e) = area.draw(&Text::new(text.to_string(), px(at), style)) {
        warn!(label = text, error = %e, "failed to draw legend label");
    }
}

fn draw_map<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    shapes: &[Vec<Shape>],
    colors: &[Option<String>],
    legend: &Legend,
    frame: &Frame,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    area.fill(&WHITE).context("Failed to fill background")?;

    for (feature, color) in shapes.iter().zip(colors) {
        let fill = color.as_deref().and_then(rgb);
        for shape in feature {
            let Some(exterior) = shape.first() else {
                continue;
            };
            if let Some(fill) = fill {
                let points: Vec<(i32, i32)> = exterior.iter().map(|&p| px(frame.project(p))).collect();
                area.draw(&Polygon::new(points, fill.filled()))
                    .context("Failed to fill feature")?;
            }
            for ring in shape {
                let points: Vec<(i32, i32)> = ring.iter().map(|&p| px(frame.project(p))).collect();
                area.draw(&PathElement::new(points, BLACK.stroke_width(1)))
                    .context("Failed to outline feature")?;
            }
        }
    }

    match &legend.body {
        LegendBody::Swatches(swatches) => {
            for swatch in swatches {
                let x = frame.legend_x(legend, swatch.x);
                if let Some(color) = rgb(&swatch.color) {
                    area.draw(&Rectangle::new(
                        [px((x, swatch.y)), px((x + swatch.size, swatch.y + swatch.size))],
                        color.filled(),
                    ))
                    .context("Failed to draw legend swatch")?;
                }
                if let Some(label) = &swatch.label {
                    let at = (frame.legend_x(legend, swatch.label_x), swatch.label_y);
                    draw_label(area, label, at, legend.font_size);
                }
            }
        }
        LegendBody::Gradient(gradient) => {
            let x = frame.legend_x(legend, gradient.x);
            let rows = gradient.height.round().max(1.0) as i32;
            let top = gradient.y.round() as i32;
            for row in 0..rows {
                let Some(color) = gradient_color(gradient, row as f64 / rows as f64) else {
                    break;
                };
                area.draw(&Rectangle::new(
                    [
                        (x.round() as i32, top + row),
                        ((x + gradient.width).round() as i32, top + row + 1),
                    ],
                    color.filled(),
                ))
                .context("Failed to draw legend gradient")?;
            }

            let tick_x = x + gradient.width;
            for tick in &gradient.ticks {
                area.draw(&PathElement::new(
                    vec![px((tick_x, tick.y)), px((tick_x + gradient.tick_length, tick.y))],
                    BLACK.stroke_width(1),
                ))
                .context("Failed to draw legend tick")?;
                if let Some(label) = &tick.label {
                    let at = (
                        frame.legend_x(legend, gradient.label_x),
                        tick.y + gradient.label_offset,
                    );
                    draw_label(area, label, at, legend.font_size);
                }
            }
        }
    }

    area.present().context("Failed to present drawing")?;
    Ok(())
}

fn render_png(
    shapes: &[Vec<Shape>],
    colors: &[Option<String>],
    legend: &Legend,
    frame: &Frame,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let Some(len) = (options.width as usize)
        .checked_mul(options.height as usize)
        .and_then(|pixels| pixels.checked_mul(3))
    else {
        bail!("Output size is too large ({}x{})", options.width, options.height);
    };
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (options.width, options.height))
            .into_drawing_area();
        draw_map(&root, shapes, colors, legend, frame)?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                &buffer,
                options.width,
                options.height,
                image::ColorType::Rgb8,
            )
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

use anyhow::{Context, Result};
use choropleth::basemap;
use choropleth::color::Interpolation;
use choropleth::config::EditorConfig;
use choropleth::domain::DomainMode;
use choropleth::extract::DataMode;
use choropleth::palette::PaletteId;
use choropleth::render::{self, OutputFormat, RenderOptions};
use choropleth::scale::ScaleKind;
use choropleth::session::EditorSession;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILE_KEY: &str = "name";

#[derive(Parser, Debug)]
#[command(name = "choropleth")]
#[command(about = "Render choropleth maps from GeoJSON base maps and CSV values", long_about = None)]
struct Cli {
    #[arg(long = "config", global = true, help = "TOML file with editor settings")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a map with its legend
    Render(RenderArgs),
    /// Print the default value table for a map
    Template(MapArgs),
    /// List the base map catalog
    Maps,
}

#[derive(Args, Debug)]
struct MapArgs {
    #[arg(help = "Catalog id of the base map")]
    map: Option<String>,

    #[arg(long = "map-file", help = "GeoJSON file to use instead of a catalog map")]
    map_file: Option<PathBuf>,

    #[arg(long = "maps-dir", default_value = "maps", help = "Directory holding catalog GeoJSON files")]
    maps_dir: PathBuf,

    #[arg(short = 'k', long = "key", help = "Feature property that keys the value table")]
    key: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    map: MapArgs,

    #[arg(short = 'd', long = "data", help = "CSV file of key,value rows")]
    data: Option<PathBuf>,

    #[arg(long = "random", conflicts_with = "data", help = "Use random values")]
    random: bool,

    #[arg(long = "seed", help = "Seed for random values")]
    seed: Option<u64>,

    #[arg(long = "scale", value_enum, help = "Scale type")]
    scale: Option<ScaleKind>,

    #[arg(long = "colors", value_delimiter = ',', help = "Custom colors, e.g. #fff,#000")]
    colors: Option<Vec<String>>,

    #[arg(long = "palette", value_enum, conflicts_with = "colors", help = "Named color palette")]
    palette: Option<PaletteId>,

    #[arg(long = "buckets", help = "Bucket count for palette quantize scales (1-20)")]
    buckets: Option<usize>,

    #[arg(long = "interpolation", value_enum, help = "Color space for linear custom scales")]
    interpolation: Option<Interpolation>,

    #[arg(long = "extent", help = "Use the data extent as the domain")]
    extent: bool,

    #[arg(long = "domain-min", allow_hyphen_values = true, help = "Manual domain minimum")]
    domain_min: Option<f64>,

    #[arg(long = "domain-max", allow_hyphen_values = true, help = "Manual domain maximum")]
    domain_max: Option<f64>,

    #[arg(long = "legend-format", help = "Legend number format, e.g. .1f or ,.0f")]
    legend_format: Option<String>,

    #[arg(long = "legend-units", allow_hyphen_values = true, help = "Text appended to legend numbers")]
    legend_units: Option<String>,

    #[arg(long = "width", default_value = "960", help = "Output width in pixels")]
    width: u32,

    #[arg(long = "height", help = "Output height in pixels (defaults to half the width)")]
    height: Option<u32>,

    #[arg(long = "format", value_enum, default_value = "svg", help = "Output format")]
    format: OutputFormat,

    #[arg(short = 'o', long = "output", help = "Output file (defaults to stdout)")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Render(args) => render(config, args),
        Command::Template(args) => {
            let session = load_session(config, &args)?;
            write_output(session.data_input().as_bytes(), None)
        }
        Command::Maps => {
            let mut listing = String::new();
            for map in basemap::catalog() {
                listing.push_str(&format!("{}\t{}\n", map.id, map.label));
            }
            write_output(listing.as_bytes(), None)
        }
    }
}

fn load_session(mut config: EditorConfig, args: &MapArgs) -> Result<EditorSession> {
    match (&args.map, &args.map_file) {
        (Some(map), _) => config = config.with_base_map(map.clone()),
        // Files outside the catalog have no key list; fall back to the usual `name` property
        (None, Some(path)) => {
            config = config.with_base_map(path.display().to_string());
            if config.data_key.is_none() {
                config = config.with_data_key(DEFAULT_FILE_KEY);
            }
        }
        (None, None) => {}
    }
    if let Some(key) = &args.key {
        config = config.with_data_key(key.clone());
    }

    let mut session = EditorSession::new(config)?;
    let loaded = match &args.map_file {
        Some(path) => session.load_from_path(path),
        None => session.load_from_dir(&args.maps_dir),
    };
    loaded.context("Failed to load base map")?;
    Ok(session)
}

fn apply_overrides(mut config: EditorConfig, args: &RenderArgs) -> EditorConfig {
    if args.data.is_some() {
        config = config.with_data_mode(DataMode::Custom);
    }
    if args.random {
        config = config.with_data_mode(DataMode::Random);
    }
    if let Some(scale) = args.scale {
        config = config.with_scale(scale);
    }
    if let Some(colors) = &args.colors {
        config = config.with_colors(colors.clone());
    }
    if let Some(palette) = args.palette {
        config = config.with_palette(palette);
    }
    if let Some(buckets) = args.buckets {
        config = config.with_buckets(buckets);
    }
    if let Some(interpolation) = args.interpolation {
        config = config.with_interpolation(interpolation);
    }
    if args.domain_min.is_some() || args.domain_max.is_some() {
        let [min, max] = config.domain;
        config = config
            .with_domain(args.domain_min.unwrap_or(min), args.domain_max.unwrap_or(max))
            .with_domain_mode(DomainMode::Manual);
    }
    if args.extent {
        config = config.with_domain_mode(DomainMode::Extent);
    }
    if let Some(specifier) = &args.legend_format {
        config = config.with_legend_format(specifier.clone());
    }
    if let Some(units) = &args.legend_units {
        config = config.with_legend_units(units.clone());
    }
    config
}

fn render(config: EditorConfig, args: RenderArgs) -> Result<()> {
    let config = apply_overrides(config, &args);
    let mut session = load_session(config, &args.map)?;

    if let Some(path) = &args.data {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file '{}'", path.display()))?;
        session.set_data_input(text)?;
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let options = RenderOptions {
        width: args.width,
        height: args.height.unwrap_or(args.width / 2),
        format: args.format,
    };
    let output = session.render(options.height as f64, &mut rng)?;
    let collection = session
        .collection()
        .context("Base map was not loaded")?;

    let bytes = render::render_map(collection, &output.colors, &output.legend, &options)
        .context("Failed to render map")?;
    write_output(&bytes, args.output.as_ref())
}

fn write_output(bytes: &[u8], path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = path {
        return fs::write(path, bytes)
            .with_context(|| format!("Failed to write output '{}'", path.display()));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

use crate::config::ResolvedConfig;
use crate::domain::{resolve_domain, Domain};
use crate::extract::{extract_values, DataMode, DataSource};
use crate::legend::{render_legend, Legend};
use crate::resolve::resolve_colors;
use crate::scale::ColorScale;
use crate::value_table::ValueTable;
use geojson::Feature;
use rand::Rng;
use tracing::{debug, warn};

/// Everything derived from one configuration and one feature collection
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub values: Vec<Option<f64>>,
    pub domain: Option<Domain>,
    pub scale: ColorScale,
    pub colors: Vec<Option<String>>,
    pub legend: Legend,
}

/// Run extraction, domain resolution, scale building, color resolution and legend layout.
pub fn run<R: Rng + ?Sized>(
    features: &[Feature],
    config: &ResolvedConfig,
    table: &ValueTable,
    map_height: f64,
    rng: &mut R,
) -> PipelineOutput {
    let source = match config.data_mode {
        DataMode::Random => DataSource::Random,
        DataMode::Custom => {
            let key = config.data_key.as_deref().unwrap_or_else(|| {
                warn!("custom data mode without a data key, features will have no values");
                ""
            });
            DataSource::Custom { key, table }
        }
    };

    let values = extract_values(features, &source, rng);
    let domain = resolve_domain(&values, config.domain_mode, config.manual_domain);
    let scale = ColorScale::build(&config.color, domain);
    let colors = resolve_colors(&scale, &values);
    let legend = render_legend(&scale, &config.legend, map_height);

    debug!(
        features = features.len(),
        ?domain,
        format_error = legend.format_error,
        "pipeline complete"
    );

    PipelineOutput {
        values,
        domain,
        scale,
        colors,
        legend,
    }
}

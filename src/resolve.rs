use crate::scale::ColorScale;
use tracing::debug;

/// Apply the scale to every feature value, keeping collection order.
///
/// Missing and `NaN` values come back as `None` and render without fill.
pub fn resolve_colors(scale: &ColorScale, values: &[Option<f64>]) -> Vec<Option<String>> {
    let colors: Vec<Option<String>> = values
        .iter()
        .map(|value| value.and_then(|v| scale.color(v)))
        .collect();
    debug!(
        features = colors.len(),
        filled = colors.iter().filter(|c| c.is_some()).count(),
        "resolved feature colors"
    );
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::scale::{ColorConfig, ColorList, ColorSource, ScaleKind};

    fn black_and_white(domain: Option<Domain>) -> ColorScale {
        let colors = ColorList::parse(&["#fff", "#000"]).unwrap();
        let config = ColorConfig::new(ScaleKind::Quantize, ColorSource::Custom(colors));
        ColorScale::build(&config, domain)
    }

    #[test]
    fn test_resolve_preserves_order_and_length() {
        let scale = black_and_white(Some(Domain::new(10.0, 30.0)));
        let colors = resolve_colors(&scale, &[Some(10.0), Some(20.0), Some(30.0)]);
        assert_eq!(
            colors,
            vec![
                Some("#fff".to_string()),
                Some("#000".to_string()),
                Some("#000".to_string())
            ]
        );
    }

    #[test]
    fn test_resolve_missing_values() {
        let scale = black_and_white(Some(Domain::new(0.0, 1.0)));
        let colors = resolve_colors(&scale, &[None, Some(f64::NAN), Some(0.0)]);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], None);
        assert_eq!(colors[1], None);
        assert_eq!(colors[2].as_deref(), Some("#fff"));
    }

    #[test]
    fn test_resolve_empty_series() {
        let scale = black_and_white(None);
        assert!(resolve_colors(&scale, &[]).is_empty());
    }

    #[test]
    fn test_resolve_degenerate_domain_colors_everything() {
        let scale = black_and_white(Some(Domain::new(5.0, 5.0)));
        let colors = resolve_colors(&scale, &[Some(1.0), Some(5.0), Some(9.0)]);
        assert!(colors.iter().all(|c| c.is_some()));
    }
}

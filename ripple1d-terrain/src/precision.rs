/// Per-metric rounding precision for terrain agreement output (spec §8).
/// `avg_*` and `max_el_residuals_*` variants of a metric share its base
/// precision.
fn base_precision(name: &str) -> Option<u32> {
    let stripped = name.strip_prefix("avg_").or_else(|| name.strip_prefix("max_el_residuals_")).unwrap_or(name);
    match stripped {
        "inundation_overlap" | "flow_area_overlap" | "top_width_agreement" | "flow_area_agreement" | "hydraulic_radius_agreement" => Some(3),
        "mean" | "std" | "max" | "min" | "p_25" | "p_50" | "p_75" | "rmse" | "thalweg_elevation_difference" => Some(2),
        "normalized_rmse" | "r_squared" | "spectral_angle" | "spectral_correlation" | "correlation" | "max_cross_correlation" => Some(3),
        _ => None,
    }
}

/// Rounds `value` to the precision registered for `name`; passes unknown
/// metric names through unrounded.
pub fn round_metric(name: &str, value: f64) -> f64 {
    match base_precision(name) {
        Some(places) => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rounds_base_and_prefixed_metric_names_the_same() {
        assert_eq!(round_metric("inundation_overlap", 0.123456), 0.123);
        assert_eq!(round_metric("avg_inundation_overlap", 0.123456), 0.123);
        assert_eq!(round_metric("max_el_residuals_rmse", 1.2349), 1.23);
    }

    #[test]
    fn unknown_metric_passes_through() {
        assert_eq!(round_metric("not_a_metric", 1.23456), 1.23456);
    }
}

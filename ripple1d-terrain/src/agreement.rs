use std::f64::consts::FRAC_PI_2;

/// A sampled cross-section point: station plus elevation (spec §4.6 step 4,
/// grounded on `ras_terrain.py`'s `(station, elevation)` arrays).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub station: f64,
    pub elevation: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Descriptive statistics on elevation residuals (spec §4.6 step 4,
/// `residual_metrics` in `ras_terrain.py`).
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct ResidualStats {
    pub mean: f64,
    pub std: f64,
    pub max: f64,
    pub min: f64,
    pub p_25: f64,
    pub p_50: f64,
    pub p_75: f64,
    pub rmse: f64,
    pub normalized_rmse: f64,
}

pub fn residual_metrics(residuals: &[f64]) -> ResidualStats {
    if residuals.is_empty() {
        return ResidualStats::default();
    }
    let m = mean(residuals);
    let variance = mean(&residuals.iter().map(|r| (r - m).powi(2)).collect::<Vec<_>>());
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let p25 = percentile(&sorted, 25.0);
    let p75 = percentile(&sorted, 75.0);
    let rmse = (mean(&residuals.iter().map(|r| r * r).collect::<Vec<_>>())).sqrt();
    ResidualStats {
        mean: m,
        std: variance.sqrt(),
        max: sorted[sorted.len() - 1],
        min: sorted[0],
        p_25: p25,
        p_50: percentile(&sorted, 50.0),
        p_75: p75,
        rmse,
        normalized_rmse: if p75 != p25 { rmse / (p75 - p25) } else { 0.0 },
    }
}

fn sum_of_products_of_deviations(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum()
}

/// Coefficient of determination between two elevation series.
pub fn r_squared(a: &[f64], b: &[f64]) -> f64 {
    let ss_ab = sum_of_products_of_deviations(a, b);
    let ss_aa = sum_of_products_of_deviations(a, a);
    let ss_bb = sum_of_products_of_deviations(b, b);
    ss_ab * ss_ab / (ss_aa * ss_bb)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// `1 - arccos(a·b / (‖a‖‖b‖)) / (π/2)` (spec §4.6 "Definitions").
pub fn spectral_angle(a: &[f64], b: &[f64]) -> f64 {
    let cos = dot(a, b) / (norm(a) * norm(b));
    1.0 - cos.clamp(-1.0, 1.0).acos().abs() / FRAC_PI_2
}

pub fn spectral_correlation(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    let da: Vec<f64> = a.iter().map(|x| x - ma).collect();
    let db: Vec<f64> = b.iter().map(|x| x - mb).collect();
    let denom = norm(&da) * norm(&db);
    let ratio = dot(&da, &db) / denom;
    let sc = if ratio.abs() > 1.0 { 0.0 } else { ratio.acos() };
    1.0 - sc.abs() / FRAC_PI_2
}

/// Pearson's correlation coefficient.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    let num: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    let denom = (a.iter().map(|x| (x - ma).powi(2)).sum::<f64>() * b.iter().map(|y| (y - mb).powi(2)).sum::<f64>()).sqrt();
    num / denom
}

/// Maximum normalized cross-correlation across all lags.
pub fn max_cross_correlation(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    let da: Vec<f64> = a.iter().map(|x| x - ma).collect();
    let db: Vec<f64> = b.iter().map(|x| x - mb).collect();
    let norm_factor = (da.iter().map(|x| x * x).sum::<f64>() * db.iter().map(|x| x * x).sum::<f64>()).sqrt();
    if norm_factor == 0.0 {
        return 0.0;
    }
    let n = da.len() as isize;
    let m = db.len() as isize;
    let mut best = f64::NEG_INFINITY;
    for lag in -(m - 1)..n {
        let mut sum = 0.0;
        for i in 0..n {
            let j = i - lag;
            if j >= 0 && j < m {
                sum += da[i as usize] * db[j as usize];
            }
        }
        best = best.max(sum / norm_factor);
    }
    best
}

pub fn thalweg_elevation_difference(a: &[f64], b: &[f64]) -> f64 {
    a.iter().cloned().fold(f64::INFINITY, f64::min) - b.iter().cloned().fold(f64::INFINITY, f64::min)
}

fn smape_single(a: f64, b: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    (a - b).abs() / (a.abs() + b.abs())
}

/// Fraction of the cross-section width where both series agree on
/// wet/dry at `wse` (spec §4.6 step 4, `inundation_agreement`).
pub fn inundation_overlap(src: &[Sample], dem: &[Sample], wse: f64) -> f64 {
    let mut agree_width = 0.0;
    let mut total_width = 0.0;
    for i in 0..src.len().saturating_sub(1) {
        let dx = src[i + 1].station - src[i].station;
        let src_wet = src[i].elevation < wse || src[i + 1].elevation < wse;
        let dem_wet = dem[i].elevation < wse || dem[i + 1].elevation < wse;
        if src_wet || dem_wet {
            total_width += dx;
        }
        if src_wet && dem_wet {
            agree_width += dx;
        }
    }
    if total_width == 0.0 {
        return 1.0;
    }
    agree_width / total_width
}

/// `flow_area_overlap(wse) = Σmin(A_src, A_dem) / Σmax(A_src, A_dem)`
/// (spec §4.6 "Definitions").
pub fn flow_area_overlap(src: &[Sample], dem: &[Sample], wse: f64) -> f64 {
    let mut agree = 0.0;
    let mut max_total = 0.0;
    for i in 0..src.len().saturating_sub(1) {
        let dx = src[i + 1].station - src[i].station;
        let src_area = trapezoid_depth(src[i].elevation, src[i + 1].elevation, wse, dx);
        let dem_area = trapezoid_depth(dem[i].elevation, dem[i + 1].elevation, wse, dx);
        agree += src_area.min(dem_area);
        max_total += src_area.max(dem_area);
    }
    if max_total == 0.0 {
        return 1.0;
    }
    agree / max_total
}

fn trapezoid_depth(elev_a: f64, elev_b: f64, wse: f64, dx: f64) -> f64 {
    let depth_a = (wse - elev_a).max(0.0);
    let depth_b = (wse - elev_b).max(0.0);
    (depth_a + depth_b) / 2.0 * dx
}

pub fn wetted_top_width(section: &[Sample], wse: f64) -> f64 {
    let mut width = 0.0;
    for i in 0..section.len().saturating_sub(1) {
        if section[i].elevation < wse || section[i + 1].elevation < wse {
            width += section[i + 1].station - section[i].station;
        }
    }
    width
}

pub fn flow_area(section: &[Sample], wse: f64) -> f64 {
    let mut area = 0.0;
    for i in 0..section.len().saturating_sub(1) {
        let dx = section[i + 1].station - section[i].station;
        area += trapezoid_depth(section[i].elevation, section[i + 1].elevation, wse, dx);
    }
    area
}

pub fn wetted_perimeter(section: &[Sample], wse: f64) -> f64 {
    let wet: Vec<Sample> = section.iter().cloned().filter(|s| s.elevation < wse).collect();
    let mut perimeter = 0.0;
    for pair in wet.windows(2) {
        let dx = pair[1].station - pair[0].station;
        let dz = pair[1].elevation - pair[0].elevation;
        perimeter += (dx * dx + dz * dz).sqrt();
    }
    perimeter
}

pub fn hydraulic_radius(section: &[Sample], wse: f64) -> f64 {
    let wp = wetted_perimeter(section, wse);
    if wp == 0.0 {
        return 0.0;
    }
    flow_area(section, wse) / wp
}

pub fn top_width_agreement(src: &[Sample], dem: &[Sample], wse: f64) -> f64 {
    1.0 - smape_single(wetted_top_width(src, wse), wetted_top_width(dem, wse))
}

pub fn flow_area_agreement(src: &[Sample], dem: &[Sample], wse: f64) -> f64 {
    1.0 - smape_single(flow_area(src, wse), flow_area(dem, wse))
}

pub fn hydraulic_radius_agreement(src: &[Sample], dem: &[Sample], wse: f64) -> f64 {
    1.0 - smape_single(hydraulic_radius(src, wse), hydraulic_radius(dem, wse))
}

/// Generates the WSE grid (spec §4.6 step 4): an initial increment `init`
/// repeated `repeats` times, then `ramp * init` repeated `repeats` times,
/// and so on, up to the lower of the section's two endpoint elevations.
pub fn wse_grid(section: &[Sample], repeats: usize, ramp: f64, init: f64) -> Vec<f64> {
    let min_el = section.iter().map(|s| s.elevation).fold(f64::INFINITY, f64::min);
    let end_el = section.first().unwrap().elevation.min(section.last().unwrap().elevation);
    let end_el = (end_el / init).ceil() * init;

    let mut start = (min_el / init).ceil() * init;
    if (start - min_el).abs() < 1e-9 {
        start += init;
    }

    let mut series = Vec::new();
    let mut cumulative = -init;
    for power in 0..10 {
        let increment = ramp.powi(power) * init;
        for _ in 0..repeats {
            cumulative += increment;
            let wse = start + cumulative;
            if wse > end_el + 1e-9 {
                if series.last().copied().unwrap_or(f64::NEG_INFINITY) < end_el {
                    series.push((end_el * 10.0).round() / 10.0);
                }
                return series;
            }
            series.push((wse * 10.0).round() / 10.0);
        }
    }
    series
}

#[cfg(test)]
mod test {
    use super::*;

    fn flat_section(elevations: &[f64]) -> Vec<Sample> {
        elevations.iter().enumerate().map(|(i, &elevation)| Sample { station: i as f64 * 10.0, elevation }).collect()
    }

    #[test]
    fn wse_grid_stops_at_the_lower_endpoint_elevation_rounded_up_to_init() {
        let section = flat_section(&[10.3, 9.0, 10.6]);
        let grid = wse_grid(&section, 1, 2.0, 0.5);
        // Lower endpoint elevation is 10.3; rounded up to the nearest 0.5 ft
        // increment that is 10.5, not the raw 10.3.
        assert_eq!(grid, vec![9.5, 10.5]);
    }

    #[test]
    fn identical_sections_agree_perfectly() {
        let src = flat_section(&[20.0, 5.0, 3.0, 5.0, 20.0]);
        let dem = src.clone();
        assert_eq!(inundation_overlap(&src, &dem, 10.0), 1.0);
        assert_eq!(flow_area_overlap(&src, &dem, 10.0), 1.0);
        assert_eq!(top_width_agreement(&src, &dem, 10.0), 1.0);
    }

    #[test]
    fn shifted_dem_reduces_area_overlap() {
        let src = flat_section(&[20.0, 5.0, 3.0, 5.0, 20.0]);
        let dem = flat_section(&[20.0, 7.0, 5.0, 7.0, 20.0]);
        let overlap = flow_area_overlap(&src, &dem, 10.0);
        assert!(overlap > 0.0 && overlap < 1.0);
    }

    #[test]
    fn thalweg_difference_is_min_minus_min() {
        let a = [10.0, 2.0, 8.0];
        let b = [10.0, 4.0, 8.0];
        assert_eq!(thalweg_elevation_difference(&a, &b), -2.0);
    }

    #[test]
    fn r_squared_of_identical_series_is_one() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((r_squared(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn residual_metrics_computes_rmse() {
        let residuals = [1.0, -1.0, 2.0, -2.0];
        let stats = residual_metrics(&residuals);
        assert!((stats.rmse - (2.5f64).sqrt()).abs() < 1e-9);
    }
}

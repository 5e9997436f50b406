use std::collections::{HashMap, HashSet};

use ripple1d_common::structures::Polyline;
use ripple1d_common::RippleError;
use ripple1d_geometry::hull::concave_hull;
use ripple1d_geometry::index::{IndexedPolyline, PolylineIndex};
use ripple1d_geometry::network::{self, NetworkReach, DEFAULT_MAX_HOPS};
use ripple1d_geometry::is_correctly_drawn;
use ripple1d_model::types::{CrossSection, GeometryFile};

use crate::types::{Coverage, Lengths, ReachConflation, Stats, XsRef};

/// Tunable parameters for a conflation run (spec §4.4).
#[derive(Debug, Clone)]
pub struct ConflationParams {
    pub k_low: f64,
    pub k_high: f64,
    pub max_hops: usize,
    pub envelope_buffer: f64,
}

impl Default for ConflationParams {
    fn default() -> ConflationParams {
        ConflationParams {
            k_low: 1.0,
            k_high: 1.0,
            max_hops: DEFAULT_MAX_HOPS,
            envelope_buffer: 1000.0,
        }
    }
}

fn xs_ref(xs: &CrossSection) -> XsRef {
    XsRef {
        river: xs.river.clone(),
        reach: xs.reach.clone(),
        xs_id: xs.xs_id(),
        min_elevation: xs.min_elevation().unwrap_or(0.0),
        max_elevation: xs.max_elevation().unwrap_or(0.0),
    }
}

fn to_polyline(points: &[ripple1d_common::structures::Point2D]) -> Polyline {
    Polyline::new(points, 0)
}

/// A cross-section whose cut-line intersects a network reach, with the
/// crossing point's distance along the network polyline.
struct Hit<'a> {
    xs: &'a CrossSection,
    station_on_network: f64,
    network_point: ripple1d_common::structures::Point2D,
}

fn hits_for_reach<'a>(geometry: &'a GeometryFile, network_reach: &NetworkReach, envelope_buffer: f64) -> Vec<Hit<'a>> {
    let envelope = network_reach.polyline.get_bounding_box().buffered(envelope_buffer);
    let mut hits = Vec::new();
    for xs in geometry.cross_sections() {
        if xs.cut_line.len() < 2 {
            continue;
        }
        let cut_line = to_polyline(&xs.cut_line);
        if !envelope.overlaps(cut_line.get_bounding_box()) {
            continue;
        }
        if !is_correctly_drawn(&cut_line, &network_reach.polyline) {
            continue;
        }
        if let Some(point) = ripple1d_geometry::direction::intersect_with_centerline(&cut_line, &network_reach.polyline) {
            let (station, _) = network_reach.polyline.project(point);
            hits.push(Hit { xs, station_on_network: station, network_point: point });
        }
    }
    hits.sort_by(|a, b| a.station_on_network.partial_cmp(&b.station_on_network).unwrap());
    hits
}

/// True if the source geometry's junction graph can be walked downstream
/// from `from` to `to` within `max_hops` hops (spec §4.4 "hydrologically
/// connected" check on the RAS reach graph, not the NWM network graph).
fn ras_reaches_connected(geometry: &GeometryFile, from: (&str, &str), to: (&str, &str), max_hops: usize) -> bool {
    if from == to {
        return true;
    }
    let mut frontier = vec![(from.0.to_string(), from.1.to_string())];
    let mut visited: HashSet<(String, String)> = frontier.iter().cloned().collect();
    for _ in 0..max_hops {
        let mut next_frontier = Vec::new();
        for (river, reach) in &frontier {
            for junction in &geometry.junctions {
                if !junction.upstream.iter().any(|(r, c)| r == river && c == reach) {
                    continue;
                }
                for (d_river, d_reach) in &junction.downstream {
                    if (d_river.as_str(), d_reach.as_str()) == to {
                        return true;
                    }
                    if visited.insert((d_river.clone(), d_reach.clone())) {
                        next_frontier.push((d_river.clone(), d_reach.clone()));
                    }
                }
            }
        }
        if next_frontier.is_empty() {
            return false;
        }
        frontier = next_frontier;
    }
    false
}

/// The downstream chain of `(river, reach)` pairs reached by following the
/// first downstream leg of each junction from `start`, up to `max_hops`.
fn ras_descendant_chain(geometry: &GeometryFile, start: (&str, &str), max_hops: usize) -> Vec<(String, String)> {
    let mut chain = vec![(start.0.to_string(), start.1.to_string())];
    let mut current = chain[0].clone();
    for _ in 0..max_hops {
        let mut next = None;
        for junction in &geometry.junctions {
            if junction.upstream.iter().any(|(r, c)| r == &current.0 && c == &current.1) {
                if let Some(downstream) = junction.downstream.first() {
                    next = Some(downstream.clone());
                    break;
                }
            }
        }
        match next {
            Some(n) => {
                chain.push(n.clone());
                current = n;
            }
            None => break,
        }
    }
    chain
}

/// The nearest common descendant `(river, reach)` of `a` and `b` on the
/// source geometry's junction graph, mirroring
/// `ripple1d_geometry::network::confluence` one level down (spec §4.4
/// junction fix-up's "find the shared outlet reach").
fn ras_confluence(geometry: &GeometryFile, a: (&str, &str), b: (&str, &str), max_hops: usize) -> Option<(String, String)> {
    let chain_a = ras_descendant_chain(geometry, a, max_hops);
    let set_b: HashSet<(String, String)> = ras_descendant_chain(geometry, b, max_hops).into_iter().collect();
    chain_a.into_iter().find(|rr| set_b.contains(rr))
}

/// One `(river, reach)`'s worth of hits intersecting a single network
/// reach, with the along-network coverage span spec §4.4's
/// `calculate_reach_coverage` computes per group.
struct ReachGroup<'a> {
    river: String,
    reach: String,
    hits: Vec<&'a Hit<'a>>,
    min_rs: f64,
    coverage: f64,
}

/// Groups hits by source `(river, reach)` and keeps only groups drawn in
/// the same direction as the network reach (upstream RAS station above
/// downstream RAS station), per spec §4.4's `calculate_reach_coverage`.
fn group_hits_by_reach<'a>(hits: &'a [Hit<'a>]) -> Vec<ReachGroup<'a>> {
    let mut groups: HashMap<(String, String), Vec<&'a Hit<'a>>> = HashMap::new();
    for hit in hits {
        groups.entry((hit.xs.river.clone(), hit.xs.reach.clone())).or_default().push(hit);
    }
    groups
        .into_iter()
        .filter_map(|((river, reach), group_hits)| {
            let min_rs = group_hits.iter().map(|h| h.station_on_network).fold(f64::INFINITY, f64::min);
            let max_rs = group_hits.iter().map(|h| h.station_on_network).fold(f64::NEG_INFINITY, f64::max);
            let us_ras_rs = group_hits.iter().find(|h| h.station_on_network == min_rs)?.xs.river_station;
            let ds_ras_rs = group_hits.iter().find(|h| h.station_on_network == max_rs)?.xs.river_station;
            if us_ras_rs < ds_ras_rs {
                return None;
            }
            Some(ReachGroup { river, reach, hits: group_hits, min_rs, coverage: max_rs - min_rs })
        })
        .collect()
}

/// Selects the upstream- and downstream-most hits for one network reach,
/// honoring spec §4.4's "longest connected run" rule: when the envelope
/// catches cross-sections from more than one `(river, reach)`, chain the
/// correctly-oriented groups by RAS-graph connectivity, keep the chain with
/// the largest summed coverage, and take the max-station hit of its
/// upstream-most group / min-station hit of its downstream-most group
/// (mirrors `retrieve_us_ds_xs`/`calculate_reach_coverage`). Falls back to
/// the flat single-group selection when only one `(river, reach)` is hit at
/// all, matching the original's single-reach shortcut.
fn select_us_ds_hit<'a>(geometry: &GeometryFile, hits: &'a [Hit<'a>], max_hops: usize) -> Option<(&'a Hit<'a>, &'a Hit<'a>)> {
    let unique_reaches: HashSet<(String, String)> = hits.iter().map(|h| (h.xs.river.clone(), h.xs.reach.clone())).collect();
    if unique_reaches.len() <= 1 {
        let us = hits.iter().max_by(|a, b| a.xs.river_station.partial_cmp(&b.xs.river_station).unwrap())?;
        let ds = hits.iter().min_by(|a, b| a.xs.river_station.partial_cmp(&b.xs.river_station).unwrap())?;
        return Some((us, ds));
    }

    let mut groups = group_hits_by_reach(hits);
    if groups.is_empty() {
        return None;
    }
    groups.sort_by(|a, b| a.min_rs.partial_cmp(&b.min_rs).unwrap());

    let global_min_rs = groups[0].min_rs;
    let mut chains: Vec<Vec<usize>> = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if group.min_rs == global_min_rs {
            chains.push(vec![i]);
            continue;
        }
        let mut attached = false;
        for chain in chains.iter_mut() {
            let last = *chain.last().unwrap();
            if ras_reaches_connected(geometry, (&groups[last].river, &groups[last].reach), (&group.river, &group.reach), max_hops) {
                chain.push(i);
                attached = true;
                break;
            }
        }
        if !attached {
            chains.push(vec![i]);
        }
    }

    let mut best_idx = 0usize;
    let mut best_coverage = f64::NEG_INFINITY;
    for (i, chain) in chains.iter().enumerate() {
        let total: f64 = chain.iter().map(|&gi| groups[gi].coverage).sum();
        if total > best_coverage {
            best_coverage = total;
            best_idx = i;
        }
    }

    let best_chain = &chains[best_idx];
    let us_group = &groups[*best_chain.first().unwrap()];
    let ds_group = &groups[*best_chain.last().unwrap()];

    let us_hit = us_group.hits.iter().max_by(|a, b| a.xs.river_station.partial_cmp(&b.xs.river_station).unwrap())?;
    let ds_hit = ds_group.hits.iter().min_by(|a, b| a.xs.river_station.partial_cmp(&b.xs.river_station).unwrap())?;
    Some((*us_hit, *ds_hit))
}

/// Walks from the network reach nearest `start` toward the top-`k` network
/// reaches nearest `end`, returning the first chain the Walker accepts
/// (spec §4.4 steps 3-4). Retries with `start` advanced 5% of the
/// centerline's length at a time, up to 95% exhausted.
fn find_chain(
    centerline: &Polyline,
    index: &PolylineIndex,
    tree: &HashMap<i64, i64>,
    max_hops: usize,
) -> Option<Vec<i64>> {
    let mut advanced = 0.0;
    while advanced <= 0.95 {
        let start_point = centerline.point_at_distance(centerline.length() * advanced);
        let Some(us) = index.nearest(start_point, 1).into_iter().next() else {
            return None;
        };
        let end_point = centerline.last_vertex();
        for candidate in index.nearest(end_point, 5) {
            if let Ok(chain) = network::walk(tree, us.id, candidate.id, max_hops) {
                return Some(chain);
            }
        }
        advanced += 0.05;
    }
    None
}

/// Runs conflation for one source geometry against one local stream
/// network (spec §4.4). `centerlines` supplies each `(river, reach)`'s
/// source centerline geometry — a GIS layer the Model Parser does not
/// produce from HEC-RAS text files, so callers source it from the same
/// geopackage the source model ships alongside its `.gNN` file.
pub fn conflate(
    geometry: &GeometryFile,
    centerlines: &HashMap<(String, String), Polyline>,
    network: &[NetworkReach],
    params: &ConflationParams,
) -> HashMap<i64, ReachConflation> {
    let tree: HashMap<i64, i64> = network.iter().filter_map(|r| r.to_id.map(|to| (r.id, to))).collect();
    let index = PolylineIndex::build(
        network
            .iter()
            .map(|r| IndexedPolyline { id: r.id, polyline: r.polyline.clone() })
            .collect(),
    );
    let by_id: HashMap<i64, &NetworkReach> = network.iter().map(|r| (r.id, r)).collect();

    let mut candidate_chain_ids: HashSet<i64> = HashSet::new();
    let mut chain_starts: HashSet<i64> = HashSet::new();
    for (river, reach) in centerlines.keys() {
        let Some(geom_reach) = geometry.reach(river, reach) else { continue };
        if geom_reach.cross_sections.is_empty() {
            continue;
        }
        let centerline = &centerlines[&(river.clone(), reach.clone())];
        if let Some(chain) = find_chain(centerline, &index, &tree, params.max_hops) {
            if let Some(&first) = chain.first() {
                chain_starts.insert(first);
            }
            candidate_chain_ids.extend(chain);
        }
    }

    let mut reaches: HashMap<i64, ReachConflation> = HashMap::new();
    for &id in &candidate_chain_ids {
        let Some(network_reach) = by_id.get(&id) else { continue };
        let hits = hits_for_reach(geometry, network_reach, params.envelope_buffer);

        if hits.is_empty() {
            reaches.insert(id, ReachConflation::eclipsed());
            continue;
        }

        let Some((us_hit, ds_hit)) = select_us_ds_hit(geometry, &hits, params.max_hops) else {
            reaches.insert(
                id,
                ReachConflation {
                    eclipsed: false,
                    us_xs: None,
                    ds_xs: None,
                    network_to_id: network_reach.to_id,
                    low_flow: 0.0,
                    high_flow: 0.0,
                    gage: None,
                    metrics: None,
                    error: Some(
                        RippleError::BadConflation {
                            reach_id: id,
                            message: "no cross-sections overlap the reach in the correct direction".to_string(),
                        }
                        .to_string(),
                    ),
                },
            );
            continue;
        };

        let mut us_xs = us_hit.xs;
        if network_reach.stream_order == 1 && chain_starts.contains(&id) {
            if let Some(reach) = geometry.reach(&us_xs.river, &us_xs.reach) {
                if let Some(pos) = reach.cross_sections.iter().position(|xs| xs.xs_id() == us_xs.xs_id()) {
                    if pos > 0 {
                        us_xs = &reach.cross_sections[pos - 1];
                    }
                }
            }
        }

        let network_length = network_reach.polyline.length().max(1e-9);
        let us_station = network_reach.polyline.project(us_hit.network_point).0;
        let ds_station = ds_hit.station_on_network;

        let centerline_offsets: Vec<f64> = hits
            .iter()
            .filter_map(|h| {
                let centerline = centerlines.get(&(h.xs.river.clone(), h.xs.reach.clone()))?;
                let cut_line = to_polyline(&h.xs.cut_line);
                let own = ripple1d_geometry::direction::intersect_with_centerline(&cut_line, centerline)?;
                Some(h.network_point.distance(&own))
            })
            .collect();
        let thalweg_offsets: Vec<f64> = hits
            .iter()
            .filter_map(|h| {
                let thalweg = h.xs.thalweg()?;
                let cut_line = to_polyline(&h.xs.cut_line);
                let first_station = h.xs.station_elevation.points.first()?.station;
                let last_station = h.xs.station_elevation.points.last()?.station;
                let span = (last_station - first_station).abs().max(1e-9);
                let frac = (thalweg.station - first_station) / span;
                let point = cut_line.point_at_distance(cut_line.length() * frac.clamp(0.0, 1.0));
                Some(h.network_point.distance(&point))
            })
            .collect();

        let ras_length = (us_xs.xs_id() - ds_hit.xs.xs_id()).abs();

        let hull_xs: Vec<&CrossSection> = hits.iter().map(|h| h.xs).collect();
        let overlapped_reaches = concave_hull(&hull_xs)
            .map(|hull| overlapping_reaches(&hull, network, id))
            .unwrap_or_default();

        reaches.insert(
            id,
            ReachConflation {
                eclipsed: false,
                us_xs: Some(xs_ref(us_xs)),
                ds_xs: Some(xs_ref(ds_hit.xs)),
                network_to_id: network_reach.to_id,
                low_flow: network_reach.high_flow_threshold * params.k_low,
                high_flow: network_reach.f100year * params.k_high,
                gage: network_reach.gage.clone(),
                metrics: Some(crate::types::ConflationMetrics {
                    centerline_offset: Stats::of(&centerline_offsets),
                    thalweg_offset: Stats::of(&thalweg_offsets),
                    lengths: Lengths {
                        ras: ras_length,
                        network: network_length,
                        ratio: network_length / ras_length.max(1e-9),
                    },
                    coverage: Coverage {
                        start: (us_station / network_length).clamp(0.0, 1.0),
                        end: (ds_station / network_length).clamp(0.0, 1.0).min(1.0),
                    },
                    overlapped_reaches,
                    eclipsed_reaches: Vec::new(),
                }),
                error: None,
            },
        );
    }

    mark_eclipsed_spans(&mut reaches, &tree, params.max_hops);
    fix_junctions(geometry, &mut reaches, params.max_hops);
    clean_up(&mut reaches);
    validate(&mut reaches);
    reaches
}

/// Network reaches whose polyline crosses into `hull`'s bounding box,
/// paired with the crossing length — an axis-aligned approximation of
/// spec §4.4's exact polygon-intersection overlap length.
fn overlapping_reaches(hull: &[ripple1d_common::structures::Point2D], network: &[NetworkReach], self_id: i64) -> Vec<(i64, f64)> {
    let bbox = ripple1d_common::structures::BoundingBox::from_points(hull);
    let mut out = Vec::new();
    for reach in network {
        if reach.id == self_id {
            continue;
        }
        let mut overlap_length = 0.0;
        for i in 0..reach.polyline.len().saturating_sub(1) {
            let a = reach.polyline.get(i);
            let b = reach.polyline.get(i + 1);
            let mid = ripple1d_common::structures::Point2D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            if bbox.contains_point(mid) {
                overlap_length += a.distance(&b);
            }
        }
        if overlap_length > 0.0 {
            out.push((reach.id, overlap_length));
        }
    }
    out
}

/// For a reach with an immediate eclipsed predecessor in the walk tree,
/// records it as an `eclipsed_reaches` entry on the successor's metrics
/// (spec §4.4 eclipsed-reach detection).
fn mark_eclipsed_spans(reaches: &mut HashMap<i64, ReachConflation>, tree: &HashMap<i64, i64>, max_hops: usize) {
    let eclipsed_ids: Vec<i64> = reaches.iter().filter(|(_, r)| r.eclipsed).map(|(&id, _)| id).collect();
    for &eclipsed_id in &eclipsed_ids {
        if let Some(&successor) = tree.get(&eclipsed_id) {
            if network::are_connected(tree, eclipsed_id, successor, max_hops) {
                if let Some(conflation) = reaches.get_mut(&successor) {
                    if let Some(metrics) = conflation.metrics.as_mut() {
                        metrics.eclipsed_reaches.push(eclipsed_id);
                    }
                }
            }
        }
    }
}

/// For every non-eclipsed network reach with exactly two non-eclipsed
/// tributaries (`network_to_id` pointing at it), finds the RAS junction
/// confluence of the tribs' `us_xs` reaches and rewrites the parent's
/// `us_xs` *and* both tribs' `ds_xs` to the confluence reach's most-upstream
/// cross-section, matching `fix_junctions` (spec §4.4 "Junction fix-up").
fn fix_junctions(geometry: &GeometryFile, reaches: &mut HashMap<i64, ReachConflation>, max_hops: usize) {
    let mut children_by_parent: HashMap<i64, Vec<i64>> = HashMap::new();
    for (&id, conflation) in reaches.iter() {
        if conflation.eclipsed {
            continue;
        }
        if let Some(to_id) = conflation.network_to_id {
            children_by_parent.entry(to_id).or_default().push(id);
        }
    }

    let mut parent_ids: Vec<i64> = children_by_parent.keys().copied().collect();
    parent_ids.sort_unstable();

    for parent_id in parent_ids {
        let children = &children_by_parent[&parent_id];
        if children.len() != 2 {
            continue;
        }
        let Some(parent) = reaches.get(&parent_id) else { continue };
        if parent.eclipsed {
            continue;
        }

        let Some(us_a) = reaches[&children[0]].us_xs.clone() else { continue };
        let Some(us_b) = reaches[&children[1]].us_xs.clone() else { continue };

        let Some((conf_river, conf_reach)) = ras_confluence(geometry, (&us_a.river, &us_a.reach), (&us_b.river, &us_b.reach), max_hops) else {
            continue;
        };
        let Some(geom_reach) = geometry.reach(&conf_river, &conf_reach) else { continue };
        let Some(common_xs) = geom_reach.cross_sections.iter().max_by(|a, b| a.river_station.partial_cmp(&b.river_station).unwrap()) else {
            continue;
        };
        let common = xs_ref(common_xs);

        reaches.get_mut(&parent_id).unwrap().us_xs = Some(common.clone());
        reaches.get_mut(&children[0]).unwrap().ds_xs = Some(common.clone());
        reaches.get_mut(&children[1]).unwrap().ds_xs = Some(common);
    }
}

fn clean_up(reaches: &mut HashMap<i64, ReachConflation>) {
    reaches.retain(|_, r| r.eclipsed || r.us_xs != r.ds_xs);
}

fn validate(reaches: &mut HashMap<i64, ReachConflation>) {
    for conflation in reaches.values_mut() {
        if conflation.eclipsed {
            continue;
        }
        if let (Some(us), Some(ds)) = (&conflation.us_xs, &conflation.ds_xs) {
            if us.river == ds.river && us.reach == ds.reach && us.xs_id < ds.xs_id {
                conflation.error = Some(
                    RippleError::BadConflation {
                        reach_id: 0,
                        message: "inverted stationing: us_xs station is below ds_xs station".to_string(),
                    }
                    .to_string(),
                );
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_common::structures::{Point2D, StationElevation, StationSeries};
    use ripple1d_model::types::Reach;

    fn xs(river: &str, reach: &str, river_station: f64, x_center: f64) -> CrossSection {
        CrossSection {
            river: river.to_string(),
            reach: reach.to_string(),
            river_station,
            interpolated: false,
            left_reach_length: 0.0,
            channel_reach_length: 0.0,
            right_reach_length: 0.0,
            cut_line: vec![Point2D::new(x_center - 50.0, river_station), Point2D::new(x_center + 50.0, river_station)],
            station_elevation: StationSeries::new(vec![
                StationElevation { station: 0.0, elevation: 10.0 },
                StationElevation { station: 50.0, elevation: 0.0 },
                StationElevation { station: 100.0, elevation: 10.0 },
            ]),
            left_bank_station: 40.0,
            right_bank_station: 60.0,
            mannings: Vec::new(),
            source_block: Vec::new(),
        }
    }

    fn simple_geometry() -> GeometryFile {
        GeometryFile {
            title: "Test".to_string(),
            version: "6.31".to_string(),
            rivers: vec![ripple1d_model::types::River {
                name: "Test River".to_string(),
                reaches: vec![Reach {
                    river: "Test River".to_string(),
                    reach: "Test Reach".to_string(),
                    cross_sections: vec![xs("Test River", "Test Reach", 300.0, 0.0), xs("Test River", "Test Reach", 100.0, 0.0)],
                    structures: Vec::new(),
                }],
            }],
            junctions: Vec::new(),
            crs: "EPSG:2277".to_string(),
        }
    }

    fn straight_network_reach(id: i64, to_id: Option<i64>) -> NetworkReach {
        NetworkReach {
            id,
            to_id,
            polyline: Polyline::new(&[Point2D::new(0.0, 400.0), Point2D::new(0.0, 0.0)], id as usize),
            high_flow_threshold: 100.0,
            f100year: 1000.0,
            gage: None,
            stream_order: 2,
        }
    }

    #[test]
    fn single_reach_gets_bounding_cross_sections() {
        let geometry = simple_geometry();
        let mut centerlines = HashMap::new();
        centerlines.insert(
            ("Test River".to_string(), "Test Reach".to_string()),
            Polyline::new(&[Point2D::new(0.0, 400.0), Point2D::new(0.0, 0.0)], 0),
        );
        let network = vec![straight_network_reach(1, None)];
        let result = conflate(&geometry, &centerlines, &network, &ConflationParams::default());

        let conflation = result.get(&1).expect("reach 1 should be conflated");
        assert!(!conflation.eclipsed);
        assert_eq!(conflation.us_xs.as_ref().unwrap().xs_id, 300.0);
        assert_eq!(conflation.ds_xs.as_ref().unwrap().xs_id, 100.0);
    }

    #[test]
    fn select_us_ds_hit_picks_largest_coverage_chain_over_flat_min_max() {
        // Two unconnected (river, reach) groups straddle the same network
        // envelope: a short, disconnected group sits at the network's low
        // end (would win a flat min/max pick) while the longer, correctly
        // connected group covers most of the reach and should win instead.
        let mut geometry = simple_geometry();
        geometry.rivers.push(ripple1d_model::types::River {
            name: "Other River".to_string(),
            reaches: vec![Reach {
                river: "Other River".to_string(),
                reach: "Other Reach".to_string(),
                cross_sections: vec![xs("Other River", "Other Reach", 50.0, 0.0)],
                structures: Vec::new(),
            }],
        });

        // river_station 300 sits nearest the network polyline's start (low
        // station_on_network); river_station 100 sits nearest its end.
        let hits = vec![
            Hit {
                xs: &geometry.rivers[0].reaches[0].cross_sections[0],
                station_on_network: 100.0,
                network_point: Point2D::new(0.0, 300.0),
            },
            Hit {
                xs: &geometry.rivers[0].reaches[0].cross_sections[1],
                station_on_network: 300.0,
                network_point: Point2D::new(0.0, 100.0),
            },
            Hit {
                xs: &geometry.rivers[1].reaches[0].cross_sections[0],
                station_on_network: 10.0,
                network_point: Point2D::new(0.0, 10.0),
            },
        ];

        let (us, ds) = select_us_ds_hit(&geometry, &hits, DEFAULT_MAX_HOPS).expect("a pair should be selected");
        assert_eq!(us.xs.river, "Test River");
        assert_eq!(us.xs.xs_id(), 300.0);
        assert_eq!(ds.xs.river, "Test River");
        assert_eq!(ds.xs.xs_id(), 100.0);
    }

    #[test]
    fn fix_junctions_rewrites_parent_us_xs_and_both_trib_ds_xs() {
        let mut reaches = HashMap::new();
        reaches.insert(
            1,
            ReachConflation {
                eclipsed: false,
                us_xs: Some(XsRef { river: "A".to_string(), reach: "A".to_string(), xs_id: 500.0, min_elevation: 0.0, max_elevation: 0.0 }),
                ds_xs: Some(XsRef { river: "A".to_string(), reach: "A".to_string(), xs_id: 400.0, min_elevation: 0.0, max_elevation: 0.0 }),
                network_to_id: Some(3),
                low_flow: 0.0,
                high_flow: 0.0,
                gage: None,
                metrics: None,
                error: None,
            },
        );
        reaches.insert(
            2,
            ReachConflation {
                eclipsed: false,
                us_xs: Some(XsRef { river: "B".to_string(), reach: "B".to_string(), xs_id: 500.0, min_elevation: 0.0, max_elevation: 0.0 }),
                ds_xs: Some(XsRef { river: "B".to_string(), reach: "B".to_string(), xs_id: 400.0, min_elevation: 0.0, max_elevation: 0.0 }),
                network_to_id: Some(3),
                low_flow: 0.0,
                high_flow: 0.0,
                gage: None,
                metrics: None,
                error: None,
            },
        );
        reaches.insert(
            3,
            ReachConflation {
                eclipsed: false,
                us_xs: Some(XsRef { river: "C".to_string(), reach: "C".to_string(), xs_id: 900.0, min_elevation: 0.0, max_elevation: 0.0 }),
                ds_xs: Some(XsRef { river: "C".to_string(), reach: "C".to_string(), xs_id: 100.0, min_elevation: 0.0, max_elevation: 0.0 }),
                network_to_id: None,
                low_flow: 0.0,
                high_flow: 0.0,
                gage: None,
                metrics: None,
                error: None,
            },
        );

        let geometry = GeometryFile {
            title: "Test".to_string(),
            version: "6.31".to_string(),
            rivers: vec![
                ripple1d_model::types::River { name: "A".to_string(), reaches: vec![Reach { river: "A".to_string(), reach: "A".to_string(), cross_sections: vec![xs("A", "A", 500.0, -100.0), xs("A", "A", 400.0, -100.0)], structures: Vec::new() }] },
                ripple1d_model::types::River { name: "B".to_string(), reaches: vec![Reach { river: "B".to_string(), reach: "B".to_string(), cross_sections: vec![xs("B", "B", 500.0, 100.0), xs("B", "B", 400.0, 100.0)], structures: Vec::new() }] },
                ripple1d_model::types::River { name: "C".to_string(), reaches: vec![Reach { river: "C".to_string(), reach: "C".to_string(), cross_sections: vec![xs("C", "C", 900.0, 0.0), xs("C", "C", 100.0, 0.0)], structures: Vec::new() }] },
            ],
            junctions: vec![ripple1d_model::types::Junction {
                name: "J1".to_string(),
                upstream: vec![("A".to_string(), "A".to_string()), ("B".to_string(), "B".to_string())],
                downstream: vec![("C".to_string(), "C".to_string())],
                junction_lengths: vec![10.0, 10.0],
            }],
            crs: "EPSG:2277".to_string(),
        };

        fix_junctions(&geometry, &mut reaches, DEFAULT_MAX_HOPS);

        let confluence = XsRef { river: "C".to_string(), reach: "C".to_string(), xs_id: 900.0, min_elevation: 0.0, max_elevation: 0.0 };
        assert_eq!(reaches[&1].ds_xs, Some(confluence.clone()));
        assert_eq!(reaches[&2].ds_xs, Some(confluence.clone()));
        assert_eq!(reaches[&3].us_xs, Some(confluence));
    }
}

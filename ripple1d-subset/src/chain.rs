use ripple1d_common::{Result, RippleError};
use ripple1d_model::types::GeometryFile;

/// One hop of a subsetter reach chain: a source `(river, reach)` plus the
/// junction length that fed into it from the previous hop (0 for the first
/// hop, spec §4.5 step 1).
#[derive(Debug, Clone)]
pub struct ChainHop {
    pub river: String,
    pub reach: String,
    pub junction_length_into: f64,
}

/// Walks the source junction graph from `us` to `ds`, failing after
/// `max_hops` (spec §4.5 step 1). Returns the ordered hop list, upstream
/// first.
pub fn walk_reach_chain(geometry: &GeometryFile, us: (&str, &str), ds: (&str, &str), max_hops: usize) -> Result<Vec<ChainHop>> {
    let mut chain = vec![ChainHop { river: us.0.to_string(), reach: us.1.to_string(), junction_length_into: 0.0 }];
    if us == ds {
        return Ok(chain);
    }
    if search(geometry, &mut chain, ds, max_hops) {
        Ok(chain)
    } else {
        Err(RippleError::InvalidNetworkPath {
            from: 0,
            to: 0,
            max_hops,
        })
    }
}

fn search(geometry: &GeometryFile, chain: &mut Vec<ChainHop>, ds: (&str, &str), max_hops: usize) -> bool {
    if chain.len() > max_hops {
        return false;
    }
    let current = chain.last().unwrap().clone();
    if (current.river.as_str(), current.reach.as_str()) == ds {
        return true;
    }
    for junction in &geometry.junctions {
        let Some(idx) = junction.upstream.iter().position(|(r, c)| r == &current.river && c == &current.reach) else {
            continue;
        };
        let length = junction.junction_lengths.get(idx).copied().unwrap_or(0.0);
        for (river, reach) in &junction.downstream {
            if chain.iter().any(|h| &h.river == river && &h.reach == reach) {
                continue;
            }
            chain.push(ChainHop { river: river.clone(), reach: reach.clone(), junction_length_into: length });
            if search(geometry, chain, ds, max_hops) {
                return true;
            }
            chain.pop();
        }
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_model::types::{Junction, Reach, River};

    fn geometry_with_junction() -> GeometryFile {
        GeometryFile {
            title: "Test".to_string(),
            version: "6.31".to_string(),
            rivers: vec![River {
                name: "Test River".to_string(),
                reaches: vec![
                    Reach { river: "Test River".to_string(), reach: "Upper".to_string(), cross_sections: Vec::new(), structures: Vec::new() },
                    Reach { river: "Test River".to_string(), reach: "Lower".to_string(), cross_sections: Vec::new(), structures: Vec::new() },
                ],
            }],
            junctions: vec![Junction {
                name: "J1".to_string(),
                upstream: vec![("Test River".to_string(), "Upper".to_string())],
                downstream: vec![("Test River".to_string(), "Lower".to_string())],
                junction_lengths: vec![25.0],
            }],
            crs: "EPSG:2277".to_string(),
        }
    }

    #[test]
    fn walks_across_one_junction() {
        let geometry = geometry_with_junction();
        let chain = walk_reach_chain(&geometry, ("Test River", "Upper"), ("Test River", "Lower"), 100).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].junction_length_into, 25.0);
    }

    #[test]
    fn single_reach_chain_is_trivial() {
        let geometry = geometry_with_junction();
        let chain = walk_reach_chain(&geometry, ("Test River", "Upper"), ("Test River", "Upper"), 100).unwrap();
        assert_eq!(chain.len(), 1);
    }
}

use std::collections::{HashMap, HashSet};

use ripple1d_common::structures::Polyline;
use ripple1d_common::{Result, RippleError};

/// Default upper bound on the number of hops a chain walk will traverse
/// before giving up (spec §4.3).
pub const DEFAULT_MAX_HOPS: usize = 100;

/// An external stream-network reach (spec §3 "NetworkReach (external)").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NetworkReach {
    pub id: i64,
    pub to_id: Option<i64>,
    pub polyline: Polyline,
    pub high_flow_threshold: f64,
    pub f100year: f64,
    pub gage: Option<String>,
    pub stream_order: i32,
}

/// Walks the directed graph described by `tree_dict[id] -> to_id` from
/// `us_id` to `ds_id`, returning the inclusive chain of visited IDs.
///
/// Fails with [`RippleError::InvalidNetworkPath`] if the chain does not
/// terminate at `ds_id` within `max_hops` hops (spec §4.3).
pub fn walk(tree: &HashMap<i64, i64>, us_id: i64, ds_id: i64, max_hops: usize) -> Result<Vec<i64>> {
    let mut chain = vec![us_id];
    if us_id == ds_id {
        return Ok(chain);
    }
    let mut current = us_id;
    for _ in 0..max_hops {
        match tree.get(&current) {
            Some(&next) => {
                chain.push(next);
                if next == ds_id {
                    return Ok(chain);
                }
                current = next;
            }
            None => break,
        }
    }
    Err(RippleError::InvalidNetworkPath {
        from: us_id,
        to: ds_id,
        max_hops,
    })
}

/// Boolean variant of [`walk`].
pub fn are_connected(tree: &HashMap<i64, i64>, us_id: i64, ds_id: i64, max_hops: usize) -> bool {
    walk(tree, us_id, ds_id, max_hops).is_ok()
}

fn descendant_chain(tree: &HashMap<i64, i64>, start: i64, max_hops: usize) -> Vec<i64> {
    let mut chain = vec![start];
    let mut current = start;
    for _ in 0..max_hops {
        match tree.get(&current) {
            Some(&next) => {
                chain.push(next);
                current = next;
            }
            None => break,
        }
    }
    chain
}

/// The nearest common descendant of `a` and `b` in the directed graph, or
/// `None` if their descendant chains (within `max_hops`) never meet.
pub fn confluence(tree: &HashMap<i64, i64>, a: i64, b: i64, max_hops: usize) -> Option<i64> {
    let chain_a = descendant_chain(tree, a, max_hops);
    let set_b: HashSet<i64> = descendant_chain(tree, b, max_hops).into_iter().collect();
    chain_a.into_iter().find(|id| set_b.contains(id))
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_tree() -> HashMap<i64, i64> {
        // 1 -> 2 -> 3 -> 4 (terminal)
        // 5 -> 3 (tributary joining at 3)
        let mut tree = HashMap::new();
        tree.insert(1, 2);
        tree.insert(2, 3);
        tree.insert(3, 4);
        tree.insert(5, 3);
        tree
    }

    #[test]
    fn walk_returns_inclusive_chain() {
        let tree = sample_tree();
        let chain = walk(&tree, 1, 4, DEFAULT_MAX_HOPS).unwrap();
        assert_eq!(chain, vec![1, 2, 3, 4]);
    }

    #[test]
    fn walk_fails_when_terminal_reached_before_target() {
        let tree = sample_tree();
        let result = walk(&tree, 1, 99, DEFAULT_MAX_HOPS);
        assert!(matches!(result, Err(RippleError::InvalidNetworkPath { .. })));
    }

    #[test]
    fn are_connected_matches_walk() {
        let tree = sample_tree();
        assert!(are_connected(&tree, 1, 3, DEFAULT_MAX_HOPS));
        assert!(!are_connected(&tree, 4, 1, DEFAULT_MAX_HOPS));
    }

    #[test]
    fn confluence_finds_shared_downstream_reach() {
        let tree = sample_tree();
        assert_eq!(confluence(&tree, 1, 5, DEFAULT_MAX_HOPS), Some(3));
    }

    #[test]
    fn confluence_none_when_unrelated() {
        let tree = sample_tree();
        assert_eq!(confluence(&tree, 4, 99, DEFAULT_MAX_HOPS), None);
    }
}

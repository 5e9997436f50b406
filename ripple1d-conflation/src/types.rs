use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A cross-section reference carried on a [`ReachConflation`] (spec §3
/// "ConflationResult"): identifies a source-model cross-section by its
/// `(river, reach, xs_id)` key, plus the bounding elevations a consumer
/// needs without re-parsing the source geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XsRef {
    pub river: String,
    pub reach: String,
    pub xs_id: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    pub fn of(values: &[f64]) -> Stats {
        if values.is_empty() {
            return Stats::default();
        }
        let sum: f64 = values.iter().sum();
        Stats {
            mean: sum / values.len() as f64,
            min: values.iter().cloned().fold(f64::INFINITY, f64::min),
            max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Lengths {
    pub ras: f64,
    pub network: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coverage {
    pub start: f64,
    pub end: f64,
}

/// Per-reach descriptive metrics (spec §4.4 "Metrics").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConflationMetrics {
    pub centerline_offset: Stats,
    pub thalweg_offset: Stats,
    pub lengths: Lengths,
    pub coverage: Coverage,
    pub overlapped_reaches: Vec<(i64, f64)>,
    pub eclipsed_reaches: Vec<i64>,
}

/// One network reach's conflation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachConflation {
    pub eclipsed: bool,
    pub us_xs: Option<XsRef>,
    pub ds_xs: Option<XsRef>,
    pub network_to_id: Option<i64>,
    pub low_flow: f64,
    pub high_flow: f64,
    pub gage: Option<String>,
    pub metrics: Option<ConflationMetrics>,
    /// Set when this reach's validator raised `BadConflation`; the job
    /// still succeeds overall and other reaches are still processed
    /// (spec §7 "record on reach, mark it failed, continue other reaches").
    pub error: Option<String>,
}

impl ReachConflation {
    pub fn eclipsed() -> ReachConflation {
        ReachConflation {
            eclipsed: true,
            us_xs: None,
            ds_xs: None,
            network_to_id: None,
            low_flow: 0.0,
            high_flow: 0.0,
            gage: None,
            metrics: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflationMetadata {
    pub network_file: String,
    pub source_models: Vec<String>,
    pub engine_version: String,
}

/// A mapping `network_id → ReachConflation` plus run metadata (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflationResult {
    pub reaches: HashMap<i64, ReachConflation>,
    pub metadata: ConflationMetadata,
}

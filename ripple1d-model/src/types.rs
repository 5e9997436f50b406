use serde::{Deserialize, Serialize};

use ripple1d_common::structures::{Point2D, StationElevation, StationSeries};

/// The HEC-RAS unit system declared by a project's `Unit System=` line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSystem {
    English,
    Metric,
}

/// One parsed project (`.prj`) file: the root of a source model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceModel {
    pub title: String,
    pub units: UnitSystem,
    pub version: String,
    pub plans: Vec<String>,
    pub geoms: Vec<String>,
    pub flows: Vec<String>,
    pub current_plan: Option<String>,
}

/// The type code carried on a `Type RM Length L Ch R =` header (spec §4.1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureType {
    Culvert,
    Bridge,
    MultiOpening,
    Inline,
    Lateral,
}

impl StructureType {
    pub fn from_code(code: i32) -> Option<StructureType> {
        match code {
            2 => Some(StructureType::Culvert),
            3 => Some(StructureType::Bridge),
            4 => Some(StructureType::MultiOpening),
            5 => Some(StructureType::Inline),
            6 => Some(StructureType::Lateral),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            StructureType::Culvert => 2,
            StructureType::Bridge => 3,
            StructureType::MultiOpening => 4,
            StructureType::Inline => 5,
            StructureType::Lateral => 6,
        }
    }
}

/// A Manning's-n subdivision station, decoded from a `#Mann=` block.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManningSubdivision {
    pub station: f64,
    pub n: f64,
    /// 0 = subdivision boundary at a station, -1 = horizontal variation marker.
    pub code: i32,
}

/// A single cross-section node (spec §3: "each CrossSection carries...").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSection {
    pub river: String,
    pub reach: String,
    pub river_station: f64,
    /// `true` when the river station carried a trailing `*` (interpolated).
    pub interpolated: bool,
    pub left_reach_length: f64,
    pub channel_reach_length: f64,
    pub right_reach_length: f64,
    pub cut_line: Vec<Point2D>,
    pub station_elevation: StationSeries,
    pub left_bank_station: f64,
    pub right_bank_station: f64,
    pub mannings: Vec<ManningSubdivision>,
    /// The full verbatim record, line-for-line, so `write_geometry` can
    /// reproduce fields this parser does not model explicitly.
    pub source_block: Vec<String>,
}

impl CrossSection {
    pub fn xs_id(&self) -> f64 {
        self.river_station
    }

    pub fn min_elevation(&self) -> Option<f64> {
        self.station_elevation.min_elevation()
    }

    pub fn max_elevation(&self) -> Option<f64> {
        self.station_elevation.max_elevation()
    }

    pub fn thalweg(&self) -> Option<StationElevation> {
        self.station_elevation
            .thalweg(self.left_bank_station, self.right_bank_station)
    }
}

/// A hydraulic structure node (culvert, bridge, multi-opening, inline weir,
/// or lateral structure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub river: String,
    pub reach: String,
    pub river_station: f64,
    pub structure_type: StructureType,
    pub distance_to_upstream_xs: f64,
    pub width: f64,
    pub source_block: Vec<String>,
}

/// A named reach within a river: an ordered run of cross-sections and
/// structures sharing a `(river, reach)` key, sorted by decreasing river
/// station (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reach {
    pub river: String,
    pub reach: String,
    pub cross_sections: Vec<CrossSection>,
    pub structures: Vec<Structure>,
}

impl Reach {
    pub fn us_station(&self) -> Option<f64> {
        self.cross_sections.first().map(|xs| xs.river_station)
    }

    pub fn ds_station(&self) -> Option<f64> {
        self.cross_sections.last().map(|xs| xs.river_station)
    }
}

/// A named river: an ordered collection of its constituent reaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct River {
    pub name: String,
    pub reaches: Vec<Reach>,
}

/// A junction linking one or more upstream tribs to one or more downstream
/// outlets, each trib carrying its own junction length (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Junction {
    pub name: String,
    pub upstream: Vec<(String, String)>,
    pub downstream: Vec<(String, String)>,
    pub junction_lengths: Vec<f64>,
}

/// A parsed geometry (`.gNN`) file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryFile {
    pub title: String,
    pub version: String,
    pub rivers: Vec<River>,
    pub junctions: Vec<Junction>,
    pub crs: String,
}

impl GeometryFile {
    pub fn reach(&self, river: &str, reach: &str) -> Option<&Reach> {
        self.rivers
            .iter()
            .find(|r| r.name == river)?
            .reaches
            .iter()
            .find(|rc| rc.reach == reach)
    }

    pub fn cross_sections(&self) -> impl Iterator<Item = &CrossSection> {
        self.rivers.iter().flat_map(|r| r.reaches.iter()).flat_map(|rc| rc.cross_sections.iter())
    }
}

/// A flow change location: a station at which discharges are specified for
/// each simulated profile (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowChangeLocation {
    pub river: String,
    pub reach: String,
    pub river_station: f64,
    pub flows: Vec<f64>,
}

/// A parsed steady-flow (`.fNN`) file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowFile {
    pub title: String,
    pub profile_names: Vec<String>,
    pub flow_change_locations: Vec<FlowChangeLocation>,
    /// Downstream known water-surface elevations, one per profile, when the
    /// plan's boundary condition is `kwse` rather than normal depth.
    pub known_water_surface_elevations: Vec<Option<f64>>,
    pub normal_depth_slope: Option<f64>,
}

impl FlowFile {
    pub fn num_profiles(&self) -> usize {
        self.profile_names.len()
    }
}

/// A parsed plan (`.pNN`) file: references a geometry and a flow file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFile {
    pub title: String,
    pub short_id: String,
    pub version: String,
    pub geom_file: String,
    pub flow_file: String,
}

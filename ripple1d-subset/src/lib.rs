/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

pub mod chain;
pub mod gpkg;
pub mod sidecar;
mod subset;

pub use chain::{walk_reach_chain, ChainHop};
pub use gpkg::write_geopackage;
pub use sidecar::{write_sidecar, RippleSidecar};
pub use subset::{build_submodel, SubModelGeometry};

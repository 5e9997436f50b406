/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

pub mod bank;
pub mod direction;
pub mod hull;
pub mod index;
pub mod network;

pub use bank::banks_encompass_channel;
pub use direction::{intersect_with_centerline, is_correctly_drawn};
pub use hull::{concave_hull, concave_hulls_for_reaches};
pub use index::{IndexedPolyline, PolylineIndex};
pub use network::{are_connected, confluence, walk, NetworkReach, DEFAULT_MAX_HOPS};

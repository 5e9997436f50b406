/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/
// private sub-module defined in other files
mod is_clockwise_order;
mod line_ops;
mod poly_ops;

// exports identifiers from private sub-modules in the current module namespace
pub use self::is_clockwise_order::is_clockwise_order;
pub use self::line_ops::{
    do_polylines_intersect, find_line_intersections, find_split_points_at_line_intersections,
    point_line_distance, simplify_rdp,
};
pub use self::poly_ops::{
    interior_point, point_in_poly, poly_in_poly, poly_is_convex, poly_overlaps_poly,
    winding_number,
};

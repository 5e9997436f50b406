use std::path::PathBuf;

use ripple1d_common::structures::{BoundingBox, Point2D};
use ripple1d_common::Result;

use crate::tool::{ExternalTerrainTool, TerrainToolArgs};

/// Buffers the hull's bounding box by `distance` (spec §4.6 step 1: "buffer
/// the hull by 1000 ft after transforming to an equal-area CRS"). A true
/// polygon offset is not implemented here; the bounding-box buffer is what
/// actually bounds the DEM clip extent passed to the external tool, so it
/// is sufficient for that purpose even though it is coarser than the
/// source hull's concave boundary.
pub fn buffered_extent(hull: &[Point2D], distance: f64) -> BoundingBox {
    BoundingBox::from_points(hull).buffered(distance)
}

pub struct TerrainRequest {
    pub hull: Vec<Point2D>,
    pub buffer_distance: f64,
    pub units: String,
    pub projection_wkt: String,
    pub output_path: PathBuf,
    pub source_rasters: Vec<String>,
}

/// Runs the terrain builder's external-tool step (spec §4.6 steps 1-3).
/// Steps 1-2 (clip extent, reprojection, resampling) are the external
/// tool's responsibility; this function computes the clip extent and
/// delegates to it.
pub fn build_terrain(tool: &dyn ExternalTerrainTool, request: &TerrainRequest) -> Result<BoundingBox> {
    let extent = buffered_extent(&request.hull, request.buffer_distance);
    let args = TerrainToolArgs {
        units: request.units.clone(),
        stitch: true,
        projection_wkt: request.projection_wkt.clone(),
        output_path: request.output_path.clone(),
        source_rasters: request.source_rasters.clone(),
    };
    tool.run(&args)?;
    Ok(extent)
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_common::RippleError;

    struct RecordingTool;
    impl ExternalTerrainTool for RecordingTool {
        fn run(&self, _args: &TerrainToolArgs) -> Result<()> {
            Ok(())
        }
    }

    struct FailingTool;
    impl ExternalTerrainTool for FailingTool {
        fn run(&self, _args: &TerrainToolArgs) -> Result<()> {
            Err(RippleError::RasTerrainFailure { exit_code: Some(2), output: "no DEM".to_string() })
        }
    }

    fn sample_hull() -> Vec<Point2D> {
        vec![Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0), Point2D::new(100.0, 200.0), Point2D::new(0.0, 200.0)]
    }

    #[test]
    fn buffers_the_hull_bounding_box() {
        let extent = buffered_extent(&sample_hull(), 1000.0);
        assert_eq!(extent.min_x, -1000.0);
        assert_eq!(extent.max_x, 1100.0);
    }

    #[test]
    fn propagates_external_tool_failure() {
        let request = TerrainRequest {
            hull: sample_hull(),
            buffer_distance: 1000.0,
            units: "Feet".to_string(),
            projection_wkt: "EPSG:5070".to_string(),
            output_path: PathBuf::from("/tmp/out.tif"),
            source_rasters: vec!["s3://dem".to_string()],
        };
        let result = build_terrain(&FailingTool, &request);
        assert!(matches!(result, Err(RippleError::RasTerrainFailure { .. })));
    }

    #[test]
    fn succeeds_with_a_working_tool() {
        let request = TerrainRequest {
            hull: sample_hull(),
            buffer_distance: 1000.0,
            units: "Feet".to_string(),
            projection_wkt: "EPSG:5070".to_string(),
            output_path: PathBuf::from("/tmp/out.tif"),
            source_rasters: vec!["s3://dem".to_string()],
        };
        assert!(build_terrain(&RecordingTool, &request).is_ok());
    }
}

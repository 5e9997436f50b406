use std::path::Path;

use ripple1d_common::structures::Point2D;
use ripple1d_common::{Result, RippleError};
use rusqlite::{params, Connection};

use crate::subset::SubModelGeometry;

fn wkt_linestring(points: &[Point2D]) -> String {
    let coords: Vec<String> = points.iter().map(|p| format!("{} {}", p.x, p.y)).collect();
    format!("LINESTRING({})", coords.join(", "))
}

fn wkt_polygon(points: &[Point2D]) -> String {
    if points.is_empty() {
        return "POLYGON EMPTY".to_string();
    }
    let mut ring = points.to_vec();
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }
    let coords: Vec<String> = ring.iter().map(|p| format!("{} {}", p.x, p.y)).collect();
    format!("POLYGON(({}))", coords.join(", "))
}

/// Writes a reach geopackage: `XS`, `River`, `Structure`, `Junction`,
/// `XS_concave_hull` spatial layers plus a non-spatial `metadata` table
/// (spec §3 "Subsetter outputs"). Geometries are stored as WKT text rather
/// than OGC GeoPackage binary blobs, which keeps the writer to a plain
/// sqlite schema the rest of this crate can also read back for tests.
pub fn write_geopackage(path: &Path, submodel: &SubModelGeometry, crs: &str) -> Result<()> {
    let conn = Connection::open(path).map_err(|e| RippleError::Other(format!("opening geopackage {}: {e}", path.display())))?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS XS (
            river TEXT NOT NULL,
            reach TEXT NOT NULL,
            river_station REAL NOT NULL,
            left_bank_station REAL NOT NULL,
            right_bank_station REAL NOT NULL,
            geom TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS River (
            river TEXT NOT NULL,
            reach TEXT NOT NULL,
            geom TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS Structure (
            river TEXT NOT NULL,
            reach TEXT NOT NULL,
            river_station REAL NOT NULL,
            structure_type TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS Junction (
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS XS_concave_hull (
            nwm_id INTEGER NOT NULL,
            geom TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .map_err(|e| RippleError::Other(format!("creating geopackage schema: {e}")))?;

    let tx = conn.unchecked_transaction().map_err(|e| RippleError::Other(e.to_string()))?;

    for xs in &submodel.cross_sections {
        tx.execute(
            "INSERT INTO XS (river, reach, river_station, left_bank_station, right_bank_station, geom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![xs.river, xs.reach, xs.river_station, xs.left_bank_station, xs.right_bank_station, wkt_linestring(&xs.cut_line)],
        )
        .map_err(|e| RippleError::Other(format!("writing XS row: {e}")))?;
    }

    for structure in &submodel.structures {
        tx.execute(
            "INSERT INTO Structure (river, reach, river_station, structure_type) VALUES (?1, ?2, ?3, ?4)",
            params![structure.river, structure.reach, structure.river_station, format!("{:?}", structure.structure_type)],
        )
        .map_err(|e| RippleError::Other(format!("writing Structure row: {e}")))?;
    }

    let river_name = submodel.nwm_id.to_string();
    let centerline_points: Vec<Point2D> = (0..submodel.centerline.len()).map(|i| submodel.centerline.get(i)).collect();
    tx.execute(
        "INSERT INTO River (river, reach, geom) VALUES (?1, ?2, ?3)",
        params![river_name, river_name, wkt_linestring(&centerline_points)],
    )
    .map_err(|e| RippleError::Other(format!("writing River row: {e}")))?;

    tx.execute(
        "INSERT INTO XS_concave_hull (nwm_id, geom) VALUES (?1, ?2)",
        params![submodel.nwm_id, wkt_polygon(&submodel.hull)],
    )
    .map_err(|e| RippleError::Other(format!("writing XS_concave_hull row: {e}")))?;

    tx.execute("INSERT INTO metadata (key, value) VALUES ('crs', ?1)", params![crs])
        .map_err(|e| RippleError::Other(format!("writing metadata row: {e}")))?;
    tx.execute(
        "INSERT INTO metadata (key, value) VALUES ('nwm_id', ?1)",
        params![submodel.nwm_id.to_string()],
    )
    .map_err(|e| RippleError::Other(format!("writing metadata row: {e}")))?;

    tx.commit().map_err(|e| RippleError::Other(format!("committing geopackage write: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use ripple1d_common::structures::Polyline;

    #[test]
    fn linestring_wkt_joins_vertices() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)];
        assert_eq!(wkt_linestring(&points), "LINESTRING(0 0, 1 1)");
    }

    #[test]
    fn polygon_wkt_closes_the_ring() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0)];
        let wkt = wkt_polygon(&points);
        assert!(wkt.starts_with("POLYGON((0 0"));
        assert!(wkt.ends_with("0 0))"));
    }

    #[test]
    fn writes_a_geopackage_to_disk() {
        let submodel = SubModelGeometry {
            nwm_id: 123,
            cross_sections: Vec::new(),
            structures: Vec::new(),
            centerline: Polyline::new(&[Point2D::new(0.0, 0.0), Point2D::new(0.0, 10.0)], 0),
            hull: vec![Point2D::new(-1.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 10.0)],
        };
        let dir = std::env::temp_dir().join(format!("ripple1d-gpkg-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("123.gpkg");
        write_geopackage(&path, &submodel, "EPSG:5070").unwrap();
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}

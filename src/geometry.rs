//! Cell geometry construction and containment predicates.
//!
//! Cells are built in the local planar frame around their own center: a
//! hexagon's six vertices sit at its circumradius (equal to the edge
//! length), a square's four corners at half the edge length on both axes.
//! Containment is boundary-inclusive so a sample on a shared edge resolves
//! to exactly one cell instead of none.

use crate::projection::offset_km;
use crate::types::{Cell, CellLocator, CellStats};
use geo::{Intersects, Point, Polygon, Rect};
use std::f64::consts::TAU;

/// Build one hexagonal cell centered at `(center_lat, center_lon)`.
///
/// Vertices are placed counter-clockwise at angles `2πk/6` starting from
/// angle 0 (due east), each `edge_km` from the center.
pub fn build_hexagon(
    center_lat: f64,
    center_lon: f64,
    edge_km: f64,
    ring: u32,
    seq: usize,
    channel_count: usize,
) -> Cell {
    let vertices = (0..6)
        .map(|k| {
            let angle = TAU * k as f64 / 6.0;
            let (lat, lon) = offset_km(
                center_lat,
                center_lon,
                edge_km * angle.sin(),
                edge_km * angle.cos(),
            );
            (lon, lat)
        })
        .collect();

    Cell {
        id: format!("hex_{}_{}", ring, seq),
        center_lat,
        center_lon,
        size_km: edge_km,
        vertices,
        locator: CellLocator::Ring(ring),
        stats: CellStats::new(channel_count),
    }
}

/// Build one axis-aligned square cell centered at `(center_lat, center_lon)`.
///
/// Corners in fixed order: lower-left, lower-right, upper-right, upper-left.
pub fn build_square(
    center_lat: f64,
    center_lon: f64,
    edge_km: f64,
    i: i32,
    j: i32,
    seq: usize,
    channel_count: usize,
) -> Cell {
    let half = edge_km / 2.0;
    let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
    let vertices = corners
        .iter()
        .map(|&(d_lon_km, d_lat_km)| {
            let (lat, lon) = offset_km(center_lat, center_lon, d_lat_km, d_lon_km);
            (lon, lat)
        })
        .collect();

    Cell {
        id: format!("sq_{}_{}_{}", i, j, seq),
        center_lat,
        center_lon,
        size_km: edge_km,
        vertices,
        locator: CellLocator::Lattice { i, j },
        stats: CellStats::new(channel_count),
    }
}

/// Boundary-inclusive point-in-polygon test.
///
/// `geo::Contains` tests the interior only and would leave a point on a
/// shared cell edge in zero cells; `Intersects` includes the boundary, and
/// the first-match scan order makes the shared-edge case deterministic.
pub fn polygon_covers(polygon: &Polygon, point: &Point) -> bool {
    polygon.intersects(point)
}

/// Boundary-inclusive point-in-bbox test for the index fast path.
pub fn bbox_covers(bbox: &Rect, point: &Point) -> bool {
    let (x, y) = (point.x(), point.y());
    x >= bbox.min().x && x <= bbox.max().x && y >= bbox.min().y && y <= bbox.max().y
}

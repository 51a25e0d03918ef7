//! Grid generation: ring/lattice layout bounded by the circular region.
//!
//! Both shapes generate candidate cell centers in the local planar frame,
//! then keep a candidate iff its center projects back to within
//! `radius_km` of the origin under the approximate
//! [`km_distance`](crate::projection::km_distance) rule. Cells whose center
//! is inside but whose area extends past the disk are kept; cells whose
//! center falls outside are dropped even if part of their area overlaps.
//! That partial boundary coverage is the intended behavior, not a tiling
//! guarantee.

use crate::config::{CellShape, GridConfig};
use crate::error::Result;
use crate::geometry::{build_hexagon, build_square};
use crate::projection::{km_distance, offset_km};
use crate::types::{Cell, Grid};
use std::f64::consts::TAU;

/// Center-to-center spacing factor between adjacent hex rings, in units of
/// the edge length.
const HEX_RING_SPACING: f64 = 1.732_050_807_568_877_2; // sqrt(3)

impl Grid {
    /// Generate the grid for a validated configuration.
    ///
    /// Cells come back in deterministic generation order: the center cell
    /// first, then increasing rings (hex) or row-major lattice order
    /// (square, `i` outer, `j` inner). `radius_km < cell_size_km`
    /// legitimately yields a single center cell for the hex shape.
    pub fn generate(config: &GridConfig) -> Result<Grid> {
        config.validate()?;

        let cells = match config.shape {
            CellShape::Hexagon => generate_hex_cells(config),
            CellShape::Square => generate_square_cells(config),
        };

        log::info!(
            "Generated {} {:?} cells (radius {} km, cell size {} km)",
            cells.len(),
            config.shape,
            config.radius_km,
            config.cell_size_km
        );

        Ok(Grid::from_parts(config.clone(), cells))
    }
}

/// Distance from the grid origin to a candidate center, measured the same
/// way for both shapes: project the center to degree offsets, then apply
/// the flat 111 km/degree rule.
fn center_distance_km(config: &GridConfig, lat: f64, lon: f64) -> f64 {
    km_distance(lat - config.center_lat, lon - config.center_lon)
}

fn generate_hex_cells(config: &GridConfig) -> Vec<Cell> {
    let channel_count = config.channels.len();
    let mut cells = Vec::new();

    // One ring beyond the nominal coverage radius is always laid out, then
    // trimmed by the per-center distance check below.
    let max_ring = (config.radius_km / config.cell_size_km).floor() as u32;

    for ring in 0..=max_ring {
        if ring == 0 {
            cells.push(build_hexagon(
                config.center_lat,
                config.center_lon,
                config.cell_size_km,
                0,
                cells.len(),
                channel_count,
            ));
            continue;
        }

        let candidates = 6 * ring as usize;
        let ring_radius_km = ring as f64 * config.cell_size_km * HEX_RING_SPACING;
        let mut kept = 0;

        for k in 0..candidates {
            let angle = TAU * k as f64 / candidates as f64;
            let (lat, lon) = offset_km(
                config.center_lat,
                config.center_lon,
                ring_radius_km * angle.sin(),
                ring_radius_km * angle.cos(),
            );
            if center_distance_km(config, lat, lon) <= config.radius_km {
                cells.push(build_hexagon(
                    lat,
                    lon,
                    config.cell_size_km,
                    ring,
                    cells.len(),
                    channel_count,
                ));
                kept += 1;
            }
        }

        log::debug!("Hex ring {}: kept {}/{} candidates", ring, kept, candidates);
    }

    cells
}

fn generate_square_cells(config: &GridConfig) -> Vec<Cell> {
    let channel_count = config.channels.len();
    let mut cells = Vec::new();

    let reach = (config.radius_km / config.cell_size_km).floor() as i32;

    for i in -reach..=reach {
        for j in -reach..=reach {
            let (lat, lon) = offset_km(
                config.center_lat,
                config.center_lon,
                i as f64 * config.cell_size_km,
                j as f64 * config.cell_size_km,
            );
            if center_distance_km(config, lat, lon) <= config.radius_km {
                cells.push(build_square(
                    lat,
                    lon,
                    config.cell_size_km,
                    i,
                    j,
                    cells.len(),
                    channel_count,
                ));
            }
        }
    }

    cells
}

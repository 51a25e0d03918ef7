//! Spatial grid aggregation engine for aerial signal-coverage telemetry.
//!
//! Bins geolocated telemetry samples into a hexagonal or square grid
//! bounded by a circular region of interest and computes per-cell signal
//! statistics (count, mean, max, min per channel).
//!
//! ```rust
//! use signal_grid::{Assigner, CellShape, Grid, GridConfig, GridTable, Sample};
//! use signal_grid::filter::filter_within_radius;
//!
//! let config = GridConfig::new(39.9042, 116.4074, 2.5, 0.5)
//!     .with_shape(CellShape::Hexagon)
//!     .with_channels(["cellular_dbm", "sdr_quality"]);
//!
//! let samples = vec![
//!     Sample::new(1_700_000_000_000, 39.905, 116.408, 2)
//!         .with_channel(0, -72.5)
//!         .with_channel(1, 81.0),
//! ];
//!
//! let kept = filter_within_radius(&samples, config.center_lat, config.center_lon, config.radius_km);
//! let mut grid = Grid::generate(&config)?;
//! let report = Assigner::new().assign(&mut grid, &kept);
//! assert_eq!(report.assigned, 1);
//!
//! let table = GridTable::from_grid(&grid);
//! assert_eq!(table.rows().len(), grid.len());
//! # Ok::<(), signal_grid::GridError>(())
//! ```

pub mod assign;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod geometry;
pub mod grid;
pub mod projection;
pub mod synth;
pub mod types;

pub use assign::{AssignMode, Assigner, AssignmentReport};
pub use config::{CellShape, ChannelSet, GridConfig};
pub use error::{GridError, Result};
pub use export::{CellRow, ChannelSummary, GridTable};
pub use filter::filter_within_radius;
pub use types::{Cell, CellLocator, CellStats, ChannelAccumulator, Grid, Sample};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{AssignMode, Assigner, AssignmentReport};
    pub use crate::{Cell, CellLocator, CellStats, Grid, Sample};
    pub use crate::{CellShape, ChannelSet, GridConfig};
    pub use crate::{CellRow, GridTable};
    pub use crate::{GridError, Result};
    pub use crate::filter::filter_within_radius;
}

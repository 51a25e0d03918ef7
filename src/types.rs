//! Core data model: telemetry samples, grid cells, and the grid itself.
//!
//! A [`Cell`] separates its immutable geometry (id, center, vertices,
//! locator) from the mutable [`CellStats`] block; geometry is created once
//! by the generator and never touched again, while stats are rewritten by
//! each assignment pass.

use crate::config::GridConfig;
use geo::{Coord, LineString, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// One telemetry sample: a timestamped position plus per-channel signal
/// values stored positionally against the configured
/// [`ChannelSet`](crate::config::ChannelSet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Epoch milliseconds, as carried by the flight records.
    pub timestamp_ms: i64,
    /// Degrees, WGS84.
    pub latitude: f64,
    /// Degrees, WGS84.
    pub longitude: f64,
    channels: SmallVec<[Option<f64>; 2]>,
}

impl Sample {
    /// Create a sample with all `channel_count` channel slots empty.
    pub fn new(timestamp_ms: i64, latitude: f64, longitude: f64, channel_count: usize) -> Self {
        Self {
            timestamp_ms,
            latitude,
            longitude,
            channels: smallvec::smallvec![None; channel_count],
        }
    }

    /// Set one channel value by position. Out-of-range indices are ignored;
    /// the channel set is fixed, so callers index by
    /// [`ChannelSet::index_of`](crate::config::ChannelSet::index_of).
    pub fn with_channel(mut self, index: usize, value: f64) -> Self {
        if let Some(slot) = self.channels.get_mut(index) {
            *slot = Some(value);
        }
        self
    }

    pub fn channel(&self, index: usize) -> Option<f64> {
        self.channels.get(index).copied().flatten()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether the position can be used for geometry at all.
    pub fn has_finite_position(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Position as a `geo` point, `(x, y) = (lon, lat)`.
    pub fn position(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

/// Discrete grid coordinate of a cell relative to the grid center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellLocator {
    /// Hexagonal ring number, 0 at the center.
    Ring(u32),
    /// Square lattice coordinate, `(0, 0)` at the center.
    Lattice { i: i32, j: i32 },
}

impl fmt::Display for CellLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellLocator::Ring(ring) => write!(f, "ring:{}", ring),
            CellLocator::Lattice { i, j } => write!(f, "grid:{}:{}", i, j),
        }
    }
}

impl FromStr for CellLocator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        match parts.next() {
            Some("ring") => {
                let ring = parts
                    .next()
                    .and_then(|p| p.parse().ok())
                    .ok_or_else(|| format!("Bad ring locator: {}", s))?;
                Ok(CellLocator::Ring(ring))
            }
            Some("grid") => {
                let i = parts.next().and_then(|p| p.parse().ok());
                let j = parts.next().and_then(|p| p.parse().ok());
                match (i, j) {
                    (Some(i), Some(j)) => Ok(CellLocator::Lattice { i, j }),
                    _ => Err(format!("Bad lattice locator: {}", s)),
                }
            }
            _ => Err(format!("Unknown locator kind: {}", s)),
        }
    }
}

/// Running aggregate for one signal channel within one cell.
///
/// The mean is derived from an exact running sum; cell point counts are
/// small, so two-pass exactness is not worth the extra bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelAccumulator {
    sum: f64,
    count: u64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ChannelAccumulator {
    /// Record one finite value. Non-finite values must be filtered by the
    /// caller; they would poison the running sum.
    pub fn record(&mut self, value: f64) {
        debug_assert!(value.is_finite());
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

/// Mutable statistics block of a cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellStats {
    /// Number of samples assigned to the cell. Incremented once per sample,
    /// regardless of how many channel values the sample carried.
    pub point_count: u64,
    channels: Vec<ChannelAccumulator>,
}

impl CellStats {
    pub fn new(channel_count: usize) -> Self {
        Self {
            point_count: 0,
            channels: vec![ChannelAccumulator::default(); channel_count],
        }
    }

    /// Fold one assigned sample into the stats. A sample missing a channel
    /// still counts toward `point_count`; non-finite channel values are
    /// dropped per value.
    pub fn record(&mut self, sample: &Sample) {
        self.point_count += 1;
        for (index, acc) in self.channels.iter_mut().enumerate() {
            if let Some(value) = sample.channel(index) {
                if value.is_finite() {
                    acc.record(value);
                }
            }
        }
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelAccumulator> {
        self.channels.get(index)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn reset(&mut self) {
        self.point_count = 0;
        for acc in &mut self.channels {
            *acc = ChannelAccumulator::default();
        }
    }
}

/// One grid unit: immutable geometry plus a mutable stats block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Encodes shape, ring or lattice coordinate, and a sequence number,
    /// e.g. `hex_1_4` or `sq_-1_2_7`.
    pub id: String,
    pub center_lat: f64,
    pub center_lon: f64,
    /// Edge length in kilometers.
    pub size_km: f64,
    /// Ordered `(lon, lat)` vertices; 6 for hexagons, 4 for squares. The
    /// closing edge back to the first vertex is implicit.
    pub vertices: Vec<(f64, f64)>,
    pub locator: CellLocator,
    pub stats: CellStats,
}

impl Cell {
    /// Cell boundary as a closed `geo` polygon for containment tests.
    pub fn polygon(&self) -> Polygon {
        let ring: Vec<Coord> = self
            .vertices
            .iter()
            .map(|&(lon, lat)| Coord { x: lon, y: lat })
            .collect();
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Axis-aligned bounding box over the vertices.
    pub fn bbox(&self) -> Rect {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(lon, lat) in &self.vertices {
            min_x = min_x.min(lon);
            min_y = min_y.min(lat);
            max_x = max_x.max(lon);
            max_y = max_y.max(lat);
        }
        Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y })
    }
}

/// The set of cells produced for one configuration, in generation order
/// (center cell first, then increasing ring / row-major).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    config: GridConfig,
    cells: Vec<Cell>,
}

impl Grid {
    pub(crate) fn from_parts(config: GridConfig, cells: Vec<Cell>) -> Self {
        Self { config, cells }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells_with_data(&self) -> usize {
        self.cells.iter().filter(|c| c.stats.point_count > 0).count()
    }

    /// Fraction of cells holding at least one sample; 0.0 for an empty grid.
    pub fn coverage(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.cells_with_data() as f64 / self.cells.len() as f64
        }
    }

    /// Total samples across all cells.
    pub fn total_points(&self) -> u64 {
        self.cells.iter().map(|c| c.stats.point_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_with(values: &[Option<f64>]) -> Sample {
        let mut s = Sample::new(0, 0.0, 0.0, values.len());
        for (i, v) in values.iter().enumerate() {
            if let Some(v) = v {
                s = s.with_channel(i, *v);
            }
        }
        s
    }

    #[test]
    fn test_stats_mean_max_min() {
        let mut stats = CellStats::new(1);
        for v in [1.0, 2.0, 3.0] {
            stats.record(&sample_with(&[Some(v)]));
        }
        assert_eq!(stats.point_count, 3);
        let acc = stats.channel(0).unwrap();
        assert_relative_eq!(acc.mean().unwrap(), 2.0);
        assert_relative_eq!(acc.max().unwrap(), 3.0);
        assert_relative_eq!(acc.min().unwrap(), 1.0);
    }

    #[test]
    fn test_missing_channel_counts_point_only() {
        let mut stats = CellStats::new(2);
        stats.record(&sample_with(&[Some(-70.0), None]));
        assert_eq!(stats.point_count, 1);
        assert!(stats.channel(0).unwrap().mean().is_some());
        assert!(stats.channel(1).unwrap().mean().is_none());
    }

    #[test]
    fn test_nonfinite_channel_value_dropped() {
        let mut stats = CellStats::new(1);
        let mut s = Sample::new(0, 0.0, 0.0, 1);
        s = s.with_channel(0, f64::NAN);
        stats.record(&s);
        assert_eq!(stats.point_count, 1);
        assert!(stats.channel(0).unwrap().mean().is_none());
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = CellStats::new(1);
        stats.record(&sample_with(&[Some(5.0)]));
        stats.reset();
        assert_eq!(stats.point_count, 0);
        assert!(stats.channel(0).unwrap().mean().is_none());
    }

    #[test]
    fn test_locator_display_parse() {
        for locator in [
            CellLocator::Ring(0),
            CellLocator::Ring(12),
            CellLocator::Lattice { i: -3, j: 7 },
        ] {
            let text = locator.to_string();
            assert_eq!(text.parse::<CellLocator>().unwrap(), locator);
        }
        assert!("hex:1".parse::<CellLocator>().is_err());
    }

    #[test]
    fn test_sample_channel_access() {
        let s = Sample::new(1_700_000_000_000, 39.9, 116.4, 2).with_channel(1, 83.0);
        assert_eq!(s.channel(0), None);
        assert_eq!(s.channel(1), Some(83.0));
        assert_eq!(s.channel(5), None);
        assert!(s.has_finite_position());
    }

    #[test]
    fn test_cell_bbox() {
        let cell = Cell {
            id: "sq_0_0_0".to_string(),
            center_lat: 0.0,
            center_lon: 0.0,
            size_km: 1.0,
            vertices: vec![(-1.0, -2.0), (1.0, -2.0), (1.0, 2.0), (-1.0, 2.0)],
            locator: CellLocator::Lattice { i: 0, j: 0 },
            stats: CellStats::new(0),
        };
        let bbox = cell.bbox();
        assert_eq!(bbox.min().x, -1.0);
        assert_eq!(bbox.max().y, 2.0);
    }
}

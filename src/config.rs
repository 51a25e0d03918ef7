//! Grid configuration and the configured channel set.
//!
//! A [`GridConfig`] fully determines one grid: region of interest, cell
//! shape and size, and the named signal channels samples may carry. It is
//! serializable so a run can be reproduced from a JSON snippet.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Tessellation shape for the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CellShape {
    /// Regular hexagons laid out in concentric rings.
    #[default]
    Hexagon,
    /// Axis-aligned squares on an integer lattice.
    Square,
}

impl CellShape {
    /// Short tag used as the leading component of cell ids.
    pub fn id_tag(&self) -> &'static str {
        match self {
            CellShape::Hexagon => "hex",
            CellShape::Square => "sq",
        }
    }
}

/// Ordered set of signal channel names, fixed at configuration time.
///
/// Samples store channel values positionally against this set instead of
/// carrying per-record name/value maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ChannelSet {
    names: Vec<String>,
}

impl ChannelSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Positional index of a channel name, if configured.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        for (i, name) in self.names.iter().enumerate() {
            if name.is_empty() {
                return Err(GridError::InvalidConfig(
                    "Channel names must not be empty".to_string(),
                ));
            }
            if self.names[..i].contains(name) {
                return Err(GridError::InvalidConfig(format!(
                    "Duplicate channel name: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for one grid aggregation run.
///
/// # Example
///
/// ```rust
/// use signal_grid::{CellShape, GridConfig};
///
/// let config = GridConfig::new(39.9042, 116.4074, 2.5, 0.05)
///     .with_shape(CellShape::Hexagon)
///     .with_channels(["cellular_dbm", "sdr_quality"]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Latitude of the region-of-interest center, degrees.
    pub center_lat: f64,
    /// Longitude of the region-of-interest center, degrees.
    pub center_lon: f64,
    /// Radius of the circular region of interest, kilometers.
    pub radius_km: f64,
    /// Cell edge length, kilometers.
    pub cell_size_km: f64,
    /// Tessellation shape.
    #[serde(default)]
    pub shape: CellShape,
    /// Signal channels carried by samples, in storage order.
    #[serde(default)]
    pub channels: ChannelSet,
}

impl GridConfig {
    pub fn new(center_lat: f64, center_lon: f64, radius_km: f64, cell_size_km: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            radius_km,
            cell_size_km,
            shape: CellShape::default(),
            channels: ChannelSet::default(),
        }
    }

    pub fn with_shape(mut self, shape: CellShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_channels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = ChannelSet::new(names);
        self
    }

    /// Validate configuration values.
    ///
    /// The planar projection degenerates at the poles, so centers at
    /// `|lat| >= 90` are rejected here rather than checked at every
    /// projection call.
    pub fn validate(&self) -> Result<()> {
        if !self.center_lat.is_finite() || !self.center_lon.is_finite() {
            return Err(GridError::InvalidConfig(
                "Center coordinates must be finite".to_string(),
            ));
        }
        if self.center_lat.abs() >= 90.0 {
            return Err(GridError::InvalidConfig(format!(
                "Center latitude {} is at or beyond a pole",
                self.center_lat
            )));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "Radius must be positive and finite, got {}",
                self.radius_km
            )));
        }
        if !(self.cell_size_km.is_finite() && self.cell_size_km > 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "Cell size must be positive and finite, got {}",
                self.cell_size_km
            )));
        }
        self.channels.validate()
    }

    /// Load configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

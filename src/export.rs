//! Flattening aggregated grids to tabular rows and CSV.
//!
//! One row per cell in generation order, with fixed geometry/count columns
//! followed by `{channel}_mean`, `{channel}_max`, `{channel}_min` triplets
//! for every configured channel. Optional statistics serialize as empty
//! fields. Floats use the shortest round-trip representation, so a written
//! table reads back bit-for-bit.

use crate::error::{GridError, Result};
use crate::types::{CellLocator, Grid};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Fixed columns preceding the per-channel triplets.
const FIXED_COLUMNS: [&str; 6] = [
    "id",
    "center_lat",
    "center_lon",
    "size_km",
    "locator",
    "point_count",
];

/// Aggregated statistics of one channel within one cell, all `None` until
/// the first value landed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

/// One flattened cell record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRow {
    pub id: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub size_km: f64,
    pub locator: CellLocator,
    pub point_count: u64,
    pub channels: Vec<ChannelSummary>,
}

/// Flat tabular view of an aggregated grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTable {
    channel_names: Vec<String>,
    rows: Vec<CellRow>,
}

impl GridTable {
    /// Flatten a grid, preserving cell generation order.
    pub fn from_grid(grid: &Grid) -> Self {
        let channel_names: Vec<String> =
            grid.config().channels.names().map(String::from).collect();

        let rows = grid
            .cells()
            .iter()
            .map(|cell| CellRow {
                id: cell.id.clone(),
                center_lat: cell.center_lat,
                center_lon: cell.center_lon,
                size_km: cell.size_km,
                locator: cell.locator,
                point_count: cell.stats.point_count,
                channels: channel_names
                    .iter()
                    .enumerate()
                    .map(|(index, name)| {
                        let acc = cell.stats.channel(index);
                        ChannelSummary {
                            name: name.clone(),
                            mean: acc.and_then(|a| a.mean()),
                            max: acc.and_then(|a| a.max()),
                            min: acc.and_then(|a| a.min()),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            channel_names,
            rows,
        }
    }

    pub fn rows(&self) -> &[CellRow] {
        &self.rows
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    /// Write the table as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        for name in &self.channel_names {
            header.push(format!("{}_mean", name));
            header.push(format!("{}_max", name));
            header.push(format!("{}_min", name));
        }
        csv.write_record(&header)?;

        for row in &self.rows {
            let mut record: Vec<String> = vec![
                row.id.clone(),
                row.center_lat.to_string(),
                row.center_lon.to_string(),
                row.size_km.to_string(),
                row.locator.to_string(),
                row.point_count.to_string(),
            ];
            for channel in &row.channels {
                for value in [channel.mean, channel.max, channel.min] {
                    record.push(value.map(|v| v.to_string()).unwrap_or_default());
                }
            }
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)?;
        log::info!("Exported {} cell rows to {:?}", self.rows.len(), path.as_ref());
        Ok(())
    }

    /// Read a table previously written by [`write_csv`](Self::write_csv).
    ///
    /// Channel names are recovered from the `{name}_mean/_max/_min` header
    /// triplets; a header that does not follow that shape is rejected.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::Reader::from_reader(reader);

        let header = csv.headers()?.clone();
        let channel_names = parse_channel_header(&header)?;

        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record?;
            rows.push(parse_row(&record, &channel_names)?);
        }

        Ok(Self {
            channel_names,
            rows,
        })
    }

    pub fn read_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_csv(file)
    }
}

fn parse_channel_header(header: &csv::StringRecord) -> Result<Vec<String>> {
    let fields: Vec<&str> = header.iter().collect();
    if fields.len() < FIXED_COLUMNS.len()
        || fields[..FIXED_COLUMNS.len()] != FIXED_COLUMNS
        || (fields.len() - FIXED_COLUMNS.len()) % 3 != 0
    {
        return Err(GridError::Export(format!(
            "Unexpected CSV header: {:?}",
            fields
        )));
    }

    let mut names = Vec::new();
    for triplet in fields[FIXED_COLUMNS.len()..].chunks(3) {
        let name = triplet[0].strip_suffix("_mean").ok_or_else(|| {
            GridError::Export(format!("Expected a *_mean column, got {}", triplet[0]))
        })?;
        if triplet[1] != format!("{}_max", name) || triplet[2] != format!("{}_min", name) {
            return Err(GridError::Export(format!(
                "Channel columns for {} out of order: {:?}",
                name, triplet
            )));
        }
        names.push(name.to_string());
    }
    Ok(names)
}

fn parse_row(record: &csv::StringRecord, channel_names: &[String]) -> Result<CellRow> {
    let expected = FIXED_COLUMNS.len() + channel_names.len() * 3;
    if record.len() != expected {
        return Err(GridError::Export(format!(
            "Expected {} fields, got {}",
            expected,
            record.len()
        )));
    }

    let field = |index: usize| record.get(index).unwrap_or_default();
    let float = |index: usize| -> Result<f64> {
        field(index)
            .parse()
            .map_err(|_| GridError::Export(format!("Bad float field: {}", field(index))))
    };
    let opt_float = |index: usize| -> Result<Option<f64>> {
        let raw = field(index);
        if raw.is_empty() {
            Ok(None)
        } else {
            float(index).map(Some)
        }
    };

    let locator: CellLocator = field(4).parse().map_err(GridError::Export)?;
    let point_count = field(5)
        .parse()
        .map_err(|_| GridError::Export(format!("Bad point count: {}", field(5))))?;

    let mut channels = Vec::with_capacity(channel_names.len());
    for (c, name) in channel_names.iter().enumerate() {
        let base = FIXED_COLUMNS.len() + c * 3;
        channels.push(ChannelSummary {
            name: name.clone(),
            mean: opt_float(base)?,
            max: opt_float(base + 1)?,
            min: opt_float(base + 2)?,
        });
    }

    Ok(CellRow {
        id: field(0).to_string(),
        center_lat: float(1)?,
        center_lon: float(2)?,
        size_km: float(3)?,
        locator,
        point_count,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::Assigner;
    use crate::config::{CellShape, GridConfig};
    use crate::types::Sample;

    fn aggregated_grid() -> Grid {
        let config = GridConfig::new(0.0, 0.0, 1.5, 0.5)
            .with_shape(CellShape::Square)
            .with_channels(["cellular_dbm", "sdr_quality"]);
        let mut grid = Grid::generate(&config).unwrap();
        let samples = vec![
            Sample::new(0, 0.0, 0.0, 2)
                .with_channel(0, -71.0)
                .with_channel(1, 80.0),
            Sample::new(1, 0.0005, 0.0005, 2).with_channel(0, -69.0),
            Sample::new(2, 0.004, 0.0, 2).with_channel(1, 55.0),
        ];
        Assigner::new().assign(&mut grid, &samples);
        grid
    }

    #[test]
    fn test_table_preserves_grid_order_and_counts() {
        let grid = aggregated_grid();
        let table = GridTable::from_grid(&grid);
        assert_eq!(table.rows().len(), grid.len());
        for (row, cell) in table.rows().iter().zip(grid.cells()) {
            assert_eq!(row.id, cell.id);
            assert_eq!(row.point_count, cell.stats.point_count);
        }
    }

    #[test]
    fn test_empty_cell_has_no_channel_stats() {
        let grid = aggregated_grid();
        let table = GridTable::from_grid(&grid);
        let empty = table.rows().iter().find(|r| r.point_count == 0).unwrap();
        for channel in &empty.channels {
            assert!(channel.mean.is_none());
            assert!(channel.max.is_none());
            assert!(channel.min.is_none());
        }
    }

    #[test]
    fn test_csv_round_trip_bit_for_bit() {
        let table = GridTable::from_grid(&aggregated_grid());

        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let back = GridTable::read_csv(buffer.as_slice()).unwrap();

        assert_eq!(back.channel_names(), table.channel_names());
        assert_eq!(back.rows(), table.rows());
    }

    #[test]
    fn test_csv_header_shape() {
        let table = GridTable::from_grid(&aggregated_grid());
        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "id,center_lat,center_lon,size_km,locator,point_count,\
             cellular_dbm_mean,cellular_dbm_max,cellular_dbm_min,\
             sdr_quality_mean,sdr_quality_max,sdr_quality_min"
        );
    }

    #[test]
    fn test_read_rejects_malformed_header() {
        let bad = "id,center_lat\nx,1.0\n";
        assert!(GridTable::read_csv(bad.as_bytes()).is_err());

        let bad_triplet = "id,center_lat,center_lon,size_km,locator,point_count,\
                           a_mean,b_max,a_min\nhex_0_0,0,0,1,ring:0,0,,,\n";
        assert!(GridTable::read_csv(bad_triplet.as_bytes()).is_err());
    }

    #[test]
    fn test_read_rejects_bad_row() {
        let bad_row = "id,center_lat,center_lon,size_km,locator,point_count\n\
                       hex_0_0,not_a_float,0,1,ring:0,0\n";
        assert!(GridTable::read_csv(bad_row.as_bytes()).is_err());
    }
}

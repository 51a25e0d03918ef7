//! Point-to-cell assignment and per-cell statistics accumulation.
//!
//! Two interchangeable paths produce identical results: a naive exhaustive
//! scan (every point against every cell polygon) and an indexed path that
//! queries an R-tree of cell bounding boxes first and only runs the exact
//! polygon test on candidates. Candidates are tested in ascending cell
//! index order, so the indexed path matches the naive first-match rule
//! bit-for-bit, shared-edge ties included.

use crate::types::{Cell, Grid, Sample};
use geo::Polygon;
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;

use crate::geometry::polygon_covers;

/// Above this `points × cells` product the R-tree path pays for its build
/// cost; below it the exhaustive scan wins.
const INDEX_THRESHOLD: usize = 100_000;

/// Assignment path selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignMode {
    /// Pick naive or indexed based on `points × cells`.
    #[default]
    Auto,
    /// Exhaustive point-against-every-cell scan.
    Naive,
    /// Bounding-box R-tree pre-filter, exact test on candidates only.
    Indexed,
}

/// Diagnostics for one assignment pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentReport {
    /// Samples that landed in a cell.
    pub assigned: usize,
    /// Samples dropped for non-finite coordinates.
    pub skipped_malformed: usize,
    /// Well-formed samples outside every cell polygon.
    pub outside_grid: usize,
    /// Cells holding at least one sample after the pass.
    pub cells_with_data: usize,
    /// Total cells in the grid.
    pub total_cells: usize,
}

impl AssignmentReport {
    /// `cells_with_data / total_cells`; 0.0 for an empty grid.
    pub fn coverage(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.cells_with_data as f64 / self.total_cells as f64
        }
    }
}

/// Bounding-box entry for one cell in the R-tree.
struct CellEnvelope {
    cell_index: usize,
    aabb: AABB<[f64; 2]>,
}

impl CellEnvelope {
    fn new(cell_index: usize, cell: &Cell) -> Self {
        let bbox = cell.bbox();
        Self {
            cell_index,
            aabb: AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]),
        }
    }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Maps samples to cells and accumulates per-cell statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assigner {
    mode: AssignMode,
}

impl Assigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: AssignMode) -> Self {
        Self { mode }
    }

    /// Assign every sample to the first cell containing it and fold it into
    /// that cell's statistics.
    ///
    /// All cell stats are reset before accumulation, so invoking this again
    /// replaces the previous aggregation instead of compounding it. Empty
    /// input or an empty grid are valid degenerate successes.
    pub fn assign(&self, grid: &mut Grid, samples: &[Sample]) -> AssignmentReport {
        for cell in grid.cells_mut() {
            cell.stats.reset();
        }

        let mut report = AssignmentReport {
            total_cells: grid.len(),
            ..AssignmentReport::default()
        };

        let use_index = match self.mode {
            AssignMode::Naive => false,
            AssignMode::Indexed => true,
            AssignMode::Auto => samples.len().saturating_mul(grid.len()) > INDEX_THRESHOLD,
        };

        // Polygons are rebuilt from vertices once per pass; the geometry
        // itself never changes after generation.
        let polygons: Vec<Polygon> = grid.cells().iter().map(Cell::polygon).collect();

        let tree = use_index.then(|| {
            let envelopes: Vec<CellEnvelope> = grid
                .cells()
                .iter()
                .enumerate()
                .map(|(index, cell)| CellEnvelope::new(index, cell))
                .collect();
            RTree::bulk_load(envelopes)
        });

        for sample in samples {
            if !sample.has_finite_position() {
                report.skipped_malformed += 1;
                continue;
            }

            let position = sample.position();
            let hit = match &tree {
                Some(tree) => {
                    let query = AABB::from_point([position.x(), position.y()]);
                    let mut candidates: Vec<usize> = tree
                        .locate_in_envelope_intersecting(&query)
                        .map(|e| e.cell_index)
                        .collect();
                    // Ascending cell order keeps the first-match rule
                    // identical to the naive scan.
                    candidates.sort_unstable();
                    candidates
                        .into_iter()
                        .find(|&index| polygon_covers(&polygons[index], &position))
                }
                None => polygons
                    .iter()
                    .position(|polygon| polygon_covers(polygon, &position)),
            };

            match hit {
                Some(index) => {
                    grid.cells_mut()[index].stats.record(sample);
                    report.assigned += 1;
                }
                None => report.outside_grid += 1,
            }
        }

        report.cells_with_data = grid.cells_with_data();

        if report.skipped_malformed > 0 {
            log::warn!(
                "Skipped {} samples with non-finite coordinates",
                report.skipped_malformed
            );
        }
        log::info!(
            "Assigned {}/{} samples ({} outside grid), coverage {:.1}%",
            report.assigned,
            samples.len(),
            report.outside_grid,
            report.coverage() * 100.0
        );

        report
    }
}

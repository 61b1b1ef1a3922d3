//! CSV ingest for grids and batch locations.
//!
//! Grid files are headerless numeric matrices: one CSV row per grid row, one
//! column per node. The extent is not stored in the file and comes from the
//! command line. By default the first row is the southern edge (`ymin`);
//! `north_up` flips that for files written top-to-bottom.
//!
//! Location files have an `x,y` header and one location per row.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{Extent, Location};
use crate::error::AppError;
use crate::grid::Grid;

/// Where a grid comes from and how to interpret its coordinates.
#[derive(Debug, Clone)]
pub struct GridSource {
    pub path: PathBuf,
    /// Extent in file units.
    pub extent: Extent,
    /// Multiplier converting file coordinate units to km.
    pub scale: f64,
    /// First CSV row is the northern edge (`ymax`).
    pub north_up: bool,
}

/// Load a grid from a headerless numeric CSV.
pub fn load_grid_csv(source: &GridSource) -> Result<Grid, AppError> {
    if !(source.scale.is_finite() && source.scale > 0.0) {
        return Err(AppError::new(
            2,
            format!("Coordinate scale must be finite and > 0 (got {}).", source.scale),
        ));
    }

    let file = File::open(&source.path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open grid CSV '{}': {e}", source.path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result.map_err(|e| AppError::new(2, format!("Grid CSV parse error on line {line}: {e}")))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                field.parse::<f64>().map_err(|_| {
                    AppError::new(
                        2,
                        format!("Grid CSV line {line}, column {}: '{field}' is not a number", col + 1),
                    )
                })
            })
            .collect::<Result<Vec<f64>, AppError>>()?;
        rows.push(row);
    }

    if source.north_up {
        rows.reverse();
    }

    let grid = Grid::from_rows(&rows, source.extent.scaled(source.scale))?;
    info!(
        path = %source.path.display(),
        nx = grid.nx(),
        ny = grid.ny(),
        dx = grid.dx(),
        dy = grid.dy(),
        "loaded grid"
    );
    Ok(grid)
}

/// Write a grid as a headerless CSV, first row at `ymin`.
pub fn write_grid_csv(path: &Path, grid: &Grid) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create grid CSV '{}': {e}", path.display())))?;

    let data = grid.data();
    for j in 0..grid.ny() {
        let row: Vec<String> = data.row(j).iter().map(|v| format!("{v:.6}")).collect();
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write grid CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write grid CSV: {e}")))?;

    debug!(path = %path.display(), nx = grid.nx(), ny = grid.ny(), "wrote grid");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    x: f64,
    y: f64,
}

/// Load batch locations from a CSV with an `x,y` header.
///
/// Coordinates are multiplied by `scale`, the same factor applied to the
/// grid extent.
pub fn load_locations_csv(path: &Path, scale: f64) -> Result<Vec<Location>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open locations CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut locations = Vec::new();
    for (idx, result) in reader.deserialize::<LocationRow>().enumerate() {
        // +2: header line plus 1-based numbering.
        let line = idx + 2;
        let row = result.map_err(|e| AppError::new(2, format!("Locations CSV line {line}: {e}")))?;
        locations.push(Location {
            x: row.x * scale,
            y: row.y * scale,
        });
    }

    if locations.is_empty() {
        return Err(AppError::new(3, "Locations CSV contains no rows."));
    }
    Ok(locations)
}

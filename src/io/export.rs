//! Result exports.
//!
//! - batch results CSV: one row per input location, failures included
//! - radial spectrum CSV
//! - single-estimate JSON (estimate, spectrum and run metadata)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Estimate, EstimateConfig, Location, RadialSpectrum};
use crate::error::{AppError, CpdResult};

const BATCH_HEADER: [&str; 11] = ["x", "y", "zt", "dzt", "zo", "dzo", "zb", "ezb", "nx", "ny", "error"];

/// Write batch results to CSV, in input order.
///
/// Failed locations keep their row with empty numeric fields and the error
/// message in the last column.
pub fn write_batch_csv(path: &Path, locations: &[Location], results: &[CpdResult<Estimate>]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create batch CSV '{}': {e}", path.display())))?;
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write batch CSV row: {e}"));

    writer.write_record(BATCH_HEADER).map_err(write_err)?;
    for (loc, result) in locations.iter().zip(results) {
        let mut row = vec![format!("{:.6}", loc.x), format!("{:.6}", loc.y)];
        match result {
            Ok(est) => {
                let (top, centroid) = (&est.fit.top, &est.fit.centroid);
                row.extend(
                    [
                        top.depth,
                        top.uncertainty,
                        centroid.depth,
                        centroid.uncertainty,
                        est.curie.zb,
                        est.curie.ezb,
                    ]
                    .iter()
                    .map(|v| format!("{v:.6}")),
                );
                row.push(est.subgrid_shape.0.to_string());
                row.push(est.subgrid_shape.1.to_string());
                row.push(String::new());
            }
            Err(err) => {
                row.extend(std::iter::repeat_n(String::new(), 8));
                row.push(err.to_string());
            }
        }
        writer.write_record(&row).map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write batch CSV: {e}")))?;
    Ok(())
}

/// Write a radial spectrum to CSV (`k,phi,sigma,count,ln_phi`).
pub fn write_spectrum_csv(path: &Path, spectrum: &RadialSpectrum) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create spectrum CSV '{}': {e}", path.display())))?;
    write_spectrum_csv_to(file, spectrum)
}

/// Same as `write_spectrum_csv`, to any writer (e.g. stdout).
pub fn write_spectrum_csv_to<W: Write>(out: W, spectrum: &RadialSpectrum) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write spectrum CSV row: {e}"));

    writer
        .write_record(["k", "phi", "sigma", "count", "ln_phi"])
        .map_err(write_err)?;
    for i in 0..spectrum.len() {
        let phi = spectrum.phi[i];
        let ln_phi = if phi > 0.0 { format!("{:.10e}", phi.ln()) } else { String::new() };
        writer
            .write_record([
                format!("{:.10e}", spectrum.k[i]),
                format!("{phi:.10e}"),
                format!("{:.10e}", spectrum.sigma[i]),
                spectrum.counts[i].to_string(),
                ln_phi,
            ])
            .map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write spectrum CSV: {e}")))?;
    Ok(())
}

/// JSON document for one estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateFile {
    pub tool: String,
    /// RFC 3339 local time of the run.
    pub generated_at: String,
    pub config: EstimateConfig,
    pub estimate: Estimate,
    pub spectrum: RadialSpectrum,
}

impl EstimateFile {
    pub fn new(config: &EstimateConfig, estimate: &Estimate, spectrum: &RadialSpectrum) -> Self {
        Self {
            tool: format!("cpd {}", env!("CARGO_PKG_VERSION")),
            generated_at: chrono::Local::now().to_rfc3339(),
            config: config.clone(),
            estimate: estimate.clone(),
            spectrum: spectrum.clone(),
        }
    }
}

/// Write an estimate JSON file.
pub fn write_estimate_json(path: &Path, file: &EstimateFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create estimate JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write estimate JSON: {e}")))?;
    Ok(())
}

/// Read an estimate JSON file.
pub fn read_estimate_json(path: &Path) -> Result<EstimateFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open estimate JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid estimate JSON: {e}")))
}

//! Shared estimation pipeline used by every subcommand.
//!
//! Workflow for one location:
//! sub-grid -> 2D power spectrum (once) -> raw radial spectrum -> top/centroid
//! fits -> Curie depth
//!
//! The front-end only decides where inputs come from and how results are
//! printed or exported.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{Estimate, EstimateConfig, Location, RadialSpectrum, Taper};
use crate::error::CpdResult;
use crate::fit::{curie_depth, tanaka1999};
use crate::grid::Grid;
use crate::spectrum::PowerSpectrum2D;

/// Estimate plus the raw spectrum it was fitted on.
#[derive(Debug, Clone)]
pub struct EstimateOutput {
    pub estimate: Estimate,
    pub spectrum: RadialSpectrum,
}

/// Run the full estimation at one location.
pub fn estimate_at(grid: &Grid, location: Location, config: &EstimateConfig) -> CpdResult<EstimateOutput> {
    config.top_window.validate()?;
    config.centroid_window.validate()?;

    let subgrid = grid.subgrid(config.window_size, location.x, location.y)?;
    let spectrum2d = PowerSpectrum2D::compute(&subgrid, config.taper)?;
    let spectrum = spectrum2d.radial(0.0)?;

    let fit = tanaka1999(
        &spectrum.k,
        &spectrum.phi,
        &spectrum.sigma,
        config.top_window,
        config.centroid_window,
    )?;
    let curie = curie_depth(&fit);

    debug!(
        x = location.x,
        y = location.y,
        zb = curie.zb,
        ezb = curie.ezb,
        "estimated Curie depth"
    );

    Ok(EstimateOutput {
        estimate: Estimate {
            location,
            window_size: config.window_size,
            subgrid_shape: spectrum2d.shape(),
            fit,
            curie,
        },
        spectrum,
    })
}

/// Estimate at many locations in parallel.
///
/// Results come back in input order; a failure at one location is kept in
/// its slot and does not affect the others.
pub fn estimate_batch(grid: &Grid, locations: &[Location], config: &EstimateConfig) -> Vec<CpdResult<Estimate>> {
    let results: Vec<CpdResult<Estimate>> = locations
        .par_iter()
        .map(|&loc| estimate_at(grid, loc, config).map(|out| out.estimate))
        .collect();

    let mut failed = 0usize;
    for (loc, result) in locations.iter().zip(&results) {
        if let Err(err) = result {
            failed += 1;
            warn!(x = loc.x, y = loc.y, error = %err, "estimate failed");
        }
    }
    info!(total = locations.len(), failed, "batch finished");

    results
}

/// Radial spectrum at one location, weighted by `|k|^(2·power)`.
pub fn spectrum_at(
    grid: &Grid,
    location: Location,
    window_size: f64,
    taper: Taper,
    power: f64,
) -> CpdResult<RadialSpectrum> {
    let subgrid = grid.subgrid(window_size, location.x, location.y)?;
    PowerSpectrum2D::compute(&subgrid, taper)?.radial(power)
}

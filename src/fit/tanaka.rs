//! Tanaka et al. (1999) centroid method.
//!
//! Two segments of the same radial spectrum are fitted:
//!
//! 1. top: `ln Φ` at high wavenumbers, where the layer bottom no longer
//!    contributes, gives the depth to the top `Zt`
//! 2. centroid: `ln(Φ / |k|²)` at low wavenumbers gives the centroid depth
//!    `Zo` (the amplitude form `ln(Φ^½ / |k|)`, squared)
//!
//! The bottom of the magnetized layer, the Curie point depth, follows as
//! `Zb = 2·Zo − Zt`.

use tracing::debug;

use crate::domain::{CurieDepth, KWindow, TanakaFit};
use crate::error::CpdResult;
use crate::fit::fitter::{check_lengths, fit_segment};

/// Wavenumber-weighting exponent applied to the spectrum for the centroid fit
/// (`Φ · |k|^(2·p)`, i.e. `Φ / |k|²`).
///
/// A centroid "power" of `0.5` refers to the amplitude `Φ^0.5` in
/// `ln(Φ^0.5 / |k|)`; twice that is `ln(Φ / |k|²)`, fitted here with the
/// same `4π` slope factor as the top depth.
pub const CENTROID_POWER: f64 = -1.0;

/// Multiply each value by `|k|^(2·power)`.
///
/// Same convention as the `power` argument of the radial spectrum, applied
/// after binning.
pub fn weight_by_wavenumber(k: &[f64], values: &[f64], power: f64) -> Vec<f64> {
    k.iter()
        .zip(values)
        .map(|(k, v)| v * k.abs().powf(2.0 * power))
        .collect()
}

/// Fit top and centroid depths from a raw (`power = 0`) radial spectrum.
pub fn tanaka1999(
    k: &[f64],
    phi: &[f64],
    sigma: &[f64],
    window_top: KWindow,
    window_centroid: KWindow,
) -> CpdResult<TanakaFit> {
    check_lengths(k, phi, sigma)?;

    let top = fit_segment(k, phi, sigma, window_top)?;

    let phi_c = weight_by_wavenumber(k, phi, CENTROID_POWER);
    let sigma_c = weight_by_wavenumber(k, sigma, CENTROID_POWER);
    let centroid = fit_segment(k, &phi_c, &sigma_c, window_centroid)?;

    debug!(
        zt = top.depth,
        dzt = top.uncertainty,
        zo = centroid.depth,
        dzo = centroid.uncertainty,
        "tanaka fit"
    );

    Ok(TanakaFit { top, centroid })
}

/// Combine top and centroid depths into the Curie point depth.
///
/// Errors are assumed independent. The result is neither clamped nor rounded.
pub fn compute_tanaka(zt: f64, dzt: f64, zo: f64, dzo: f64) -> CurieDepth {
    let zb = 2.0 * zo - zt;
    let ezb = (2.0 * dzo).hypot(dzt);
    CurieDepth { zb, ezb }
}

/// `compute_tanaka` applied to a fit pair.
pub fn curie_depth(fit: &TanakaFit) -> CurieDepth {
    compute_tanaka(
        fit.top.depth,
        fit.top.uncertainty,
        fit.centroid.depth,
        fit.centroid.uncertainty,
    )
}
